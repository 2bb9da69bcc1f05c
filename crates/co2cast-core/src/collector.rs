//! Input Collector - holds raw form drafts until the user submits.

use serde::Serialize;

use crate::error::InputError;
use crate::feature::{FeatureSchema, FeatureSpec, FeatureVector};

/// One rendered input: the spec plus whatever text the field currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub key: &'static str,
    pub label: String,
    pub description: &'static str,
    pub range_hint: String,
    pub help: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct InputCollector {
    schema: FeatureSchema,
    drafts: Vec<Option<String>>,
}

impl InputCollector {
    pub fn new(schema: FeatureSchema) -> Self {
        let drafts = vec![None; schema.len()];
        Self { schema, drafts }
    }

    /// Collector pre-filled from submitted `(key, text)` pairs.
    pub fn from_pairs<K, V>(
        schema: FeatureSchema,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, InputError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut collector = Self::new(schema);
        for (key, value) in pairs {
            collector.set(key.as_ref(), value)?;
        }
        Ok(collector)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn set(&mut self, key: &str, raw: impl Into<String>) -> Result<(), InputError> {
        let position = self
            .schema
            .position(key)
            .ok_or_else(|| InputError::UnknownField(key.to_string()))?;
        self.drafts[position] = Some(raw.into());
        Ok(())
    }

    pub fn reset(&mut self) {
        self.drafts.iter_mut().for_each(|d| *d = None);
    }

    pub fn fields(&self) -> Vec<FieldView> {
        self.schema
            .specs()
            .iter()
            .zip(&self.drafts)
            .map(|(spec, draft)| FieldView {
                key: spec.key,
                label: spec.display_label(),
                description: spec.description,
                range_hint: spec.range_hint(),
                help: spec.help_text(),
                value: draft.clone().unwrap_or_else(|| format_plain(spec.default)),
            })
            .collect()
    }

    /// Parse every draft. Blank fields take the spec default; out-of-range
    /// values are kept as entered.
    pub fn collect(&self) -> Result<FeatureVector, InputError> {
        let mut values = Vec::with_capacity(self.schema.len());
        for (spec, draft) in self.schema.specs().iter().zip(&self.drafts) {
            values.push(parse_draft(spec, draft.as_deref())?);
        }
        self.schema.vector(&values)
    }
}

fn parse_draft(spec: &FeatureSpec, draft: Option<&str>) -> Result<f64, InputError> {
    let text = match draft.map(str::trim) {
        None | Some("") => return Ok(spec.default),
        Some(text) => text,
    };

    let not_numeric = || InputError::NotNumeric {
        key: spec.key.to_string(),
        value: text.to_string(),
    };

    let value: f64 = text.replace(',', "").parse().map_err(|_| not_numeric())?;
    if !value.is_finite() {
        return Err(not_numeric());
    }
    Ok(value)
}

/// Number as a form field would show it: `3000`, `2.5`, `10000000000`.
pub fn format_plain(value: f64) -> String {
    format!("{}", value)
}
