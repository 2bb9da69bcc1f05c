//! Feature declarations and the values built from them.
//!
//! A [`FeatureSchema`] is the single ordered list of inputs a model was trained
//! on. Every [`FeatureVector`] and [`FeatureFrame`] is produced from a schema,
//! so their column order always matches it.

use std::collections::HashSet;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{InputError, SchemaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Float,
}

/// Advisory bound shown next to an input. Never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SafeRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SafeRange {
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub key: &'static str,
    /// Explicit label; falls back to the title-cased key.
    pub label: Option<&'static str>,
    pub description: &'static str,
    pub unit: &'static str,
    pub kind: FeatureKind,
    pub safe_range: SafeRange,
    pub default: f64,
}

impl FeatureSpec {
    pub fn display_label(&self) -> String {
        match self.label {
            Some(label) => label.to_string(),
            None => default_label(self.key),
        }
    }

    /// e.g. `Safe range: 2500–6000 kg/ha`
    pub fn range_hint(&self) -> String {
        let bounds = match (self.safe_range.min, self.safe_range.max) {
            (Some(min), Some(max)) => format!("{}–{}", min, max),
            (Some(min), None) => format!("≥ {}", min),
            (None, Some(max)) => format!("≤ {}", max),
            (None, None) => return "No safe range declared".to_string(),
        };
        format!("Safe range: {}{}", bounds, unit_suffix(self.unit))
    }

    pub fn help_text(&self) -> String {
        format!("{} | {}", self.description, self.range_hint())
    }

    pub fn is_within_safe_range(&self, value: f64) -> bool {
        self.safe_range.contains(value)
    }
}

fn unit_suffix(unit: &str) -> String {
    match unit {
        "" => String::new(),
        "%" => "%".to_string(),
        other => format!(" {}", other),
    }
}

/// `urb_pop_growth_perc` -> `Urb Pop Growth Perc`
pub fn default_label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Ordered, validated list of the features a model expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    specs: Vec<FeatureSpec>,
}

impl FeatureSchema {
    pub fn new(specs: Vec<FeatureSpec>) -> Result<Self, SchemaError> {
        if specs.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            if spec.key.trim().is_empty() {
                return Err(SchemaError::EmptyKey(position));
            }
            if !seen.insert(spec.key) {
                return Err(SchemaError::DuplicateKey(spec.key.to_string()));
            }
        }

        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.key)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.keys().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&FeatureSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Vector holding every spec's default value.
    pub fn defaults(&self) -> FeatureVector {
        self.vector_with(|spec| spec.default)
    }

    pub fn vector_with(&self, mut value_of: impl FnMut(&FeatureSpec) -> f64) -> FeatureVector {
        FeatureVector {
            entries: self.specs.iter().map(|s| (s.key, value_of(s))).collect(),
        }
    }

    /// Values given positionally, in schema order.
    pub fn vector(&self, values: &[f64]) -> Result<FeatureVector, InputError> {
        if values.len() != self.specs.len() {
            return Err(InputError::ValueCount {
                expected: self.specs.len(),
                actual: values.len(),
            });
        }
        let mut iter = values.iter().copied();
        Ok(self.vector_with(|_| iter.next().unwrap_or_default()))
    }
}

/// One submission's values, one entry per declared feature in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(&'static str, f64)>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Single-row table handed to a model.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    row: Vec<f64>,
}

impl FeatureFrame {
    pub fn from_vector(vector: &FeatureVector) -> Self {
        Self {
            columns: vector.keys().map(str::to_string).collect(),
            row: vector.values().collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row(&self) -> &[f64] {
        &self.row
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn spec(key: &'static str, default: f64) -> FeatureSpec {
        FeatureSpec {
            key,
            label: None,
            description: "test feature",
            unit: "",
            kind: FeatureKind::Float,
            safe_range: SafeRange::between(0.0, 10.0),
            default,
        }
    }

    pub(crate) fn schema(keys: &[&'static str]) -> FeatureSchema {
        FeatureSchema::new(keys.iter().map(|k| spec(*k, 1.0)).collect()).unwrap()
    }

    #[test]
    fn test_default_label() {
        assert_eq!(default_label("cereal_yield"), "Cereal Yield");
        assert_eq!(default_label("gni_per_cap"), "Gni Per Cap");
        assert_eq!(default_label("gdp"), "Gdp");
    }

    #[test]
    fn test_range_hint() {
        let mut s = spec("cereal_yield", 0.0);
        s.unit = "kg/ha";
        s.safe_range = SafeRange::between(2500.0, 6000.0);
        assert_eq!(s.range_hint(), "Safe range: 2500–6000 kg/ha");

        s.unit = "%";
        s.safe_range = SafeRange::between(1.0, 5.0);
        assert_eq!(s.range_hint(), "Safe range: 1–5%");

        s.unit = "USD";
        s.safe_range = SafeRange::at_least(0.0);
        assert_eq!(s.range_hint(), "Safe range: ≥ 0 USD");
    }

    #[test]
    fn test_safe_range_contains() {
        let range = SafeRange::between(10.0, 35.0);
        assert!(range.contains(10.0));
        assert!(range.contains(35.0));
        assert!(!range.contains(9.99));
        assert!(SafeRange::at_least(0.0).contains(1e12));
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let result = FeatureSchema::new(vec![spec("gdp", 0.0), spec("gdp", 1.0)]);
        assert_eq!(result, Err(SchemaError::DuplicateKey("gdp".to_string())));
    }

    #[test]
    fn test_schema_rejects_empty() {
        assert_eq!(FeatureSchema::new(vec![]), Err(SchemaError::Empty));
        assert_eq!(
            FeatureSchema::new(vec![spec("a", 0.0), spec(" ", 0.0)]),
            Err(SchemaError::EmptyKey(1))
        );
    }

    #[test]
    fn test_vector_preserves_schema_order() {
        let schema = schema(&["b", "a", "c"]);
        let vector = schema.vector(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(vector.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(vector.get("a"), Some(2.0));
    }

    #[test]
    fn test_vector_count_mismatch() {
        let schema = schema(&["a", "b"]);
        assert_eq!(
            schema.vector(&[1.0]),
            Err(InputError::ValueCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_vector_serializes_as_ordered_map() {
        let schema = schema(&["z", "a"]);
        let json = serde_json::to_string(&schema.vector(&[1.5, 2.0]).unwrap()).unwrap();
        assert_eq!(json, r#"{"z":1.5,"a":2.0}"#);
    }

    #[test]
    fn test_frame_from_vector() {
        let schema = schema(&["x", "y"]);
        let frame = FeatureFrame::from_vector(&schema.defaults());
        assert_eq!(frame.columns(), &["x".to_string(), "y".to_string()]);
        assert_eq!(frame.row(), &[1.0, 1.0]);
    }
}
