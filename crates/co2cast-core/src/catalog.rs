//! The two front ends and the indicators each one asks for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::feature::{FeatureKind, FeatureSchema, FeatureSpec, SafeRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// CO₂ per capita in metric tons.
    #[default]
    PerCapita,
    /// Total CO₂ in million tonnes, with feature importances.
    Total,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::PerCapita, Variant::Total];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::PerCapita => "per-capita",
            Variant::Total => "total",
        }
    }

    pub fn profile(&self) -> &'static VariantProfile {
        match self {
            Variant::PerCapita => &PER_CAPITA_PROFILE,
            Variant::Total => &TOTAL_PROFILE,
        }
    }

    pub fn features(&self) -> &'static [FeatureSpec] {
        match self {
            Variant::PerCapita => PER_CAPITA_FEATURES,
            Variant::Total => TOTAL_FEATURES,
        }
    }

    pub fn schema(&self) -> Result<FeatureSchema, SchemaError> {
        FeatureSchema::new(self.features().to_vec())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-capita" | "per_capita" | "percapita" => Ok(Variant::PerCapita),
            "total" => Ok(Variant::Total),
            other => Err(format!(
                "Unknown variant: {} (expected per-capita or total)",
                other
            )),
        }
    }
}

/// Texts and display rules of one front end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantProfile {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub inputs_heading: &'static str,
    pub submit_label: &'static str,
    pub headline: &'static str,
    pub unit_label: &'static str,
    /// Render the value with thousands separators.
    pub group_thousands: bool,
    pub tip: Option<&'static str>,
    pub footer: &'static [&'static str],
    pub show_importances: bool,
    pub show_input_summary: bool,
    pub default_artifact: &'static str,
}

pub static PER_CAPITA_PROFILE: VariantProfile = VariantProfile {
    title: "🌍 CO₂ Emissions Predictor using Machine Learning",
    subtitle: "Predict CO₂ emissions per capita (metric tons) by entering country-level development indicators.",
    inputs_heading: "🔢 Enter Indicators",
    submit_label: "🚀 Predict CO₂ per Capita",
    headline: "🌿 Estimated CO₂ per Capita",
    unit_label: "metric tons",
    group_thousands: false,
    tip: Some(
        "CO₂ emissions per capita are strongly influenced by energy consumption and GDP. \
         To reduce emissions, consider improving energy efficiency and increasing green spaces.",
    ),
    footer: &[
        "🔬 Model trained on global indicators and country-level data.",
        "💡 Created by Krish Sharma",
    ],
    show_importances: false,
    show_input_summary: false,
    default_artifact: "models/co2_per_capita.json",
};

pub static TOTAL_PROFILE: VariantProfile = VariantProfile {
    title: "🌍 CO₂ Emission Predictor (Local Model)",
    subtitle: "Predict total CO₂ emissions using economic and environmental inputs.",
    inputs_heading: "🔧 Enter Input Features",
    submit_label: "🔍 Predict CO₂ Emissions",
    headline: "🔋 Predicted CO₂ Emissions",
    unit_label: "million tonnes",
    group_thousands: true,
    tip: None,
    footer: &[],
    show_importances: true,
    show_input_summary: true,
    default_artifact: "models/co2_total.json",
};

const fn float(
    key: &'static str,
    label: Option<&'static str>,
    description: &'static str,
    unit: &'static str,
    safe_range: SafeRange,
    default: f64,
) -> FeatureSpec {
    FeatureSpec {
        key,
        label,
        description,
        unit,
        kind: FeatureKind::Float,
        safe_range,
        default,
    }
}

/// Column order of the per-capita model.
pub static PER_CAPITA_FEATURES: &[FeatureSpec] = &[
    float(
        "cereal_yield",
        None,
        "Cereal yield (kg per hectare of harvested land)",
        "kg/ha",
        SafeRange::between(2500.0, 6000.0),
        0.0,
    ),
    float(
        "gni_per_cap",
        None,
        "Gross national income per capita (USD)",
        "USD",
        SafeRange::between(3000.0, 15000.0),
        0.0,
    ),
    float(
        "en_per_cap",
        None,
        "Energy use per capita (kg of oil equivalent)",
        "kg",
        SafeRange::between(1000.0, 4000.0),
        0.0,
    ),
    float(
        "pop_urb_aggl_perc",
        None,
        "Urban population in agglomerations over 1 million (%)",
        "%",
        SafeRange::between(10.0, 80.0),
        0.0,
    ),
    float(
        "prot_area_perc",
        None,
        "Protected areas (% of total land area)",
        "%",
        SafeRange::between(10.0, 35.0),
        0.0,
    ),
    float(
        "gdp",
        None,
        "Gross Domestic Product (in billion USD)",
        "billion",
        SafeRange::between(50.0, 2500.0),
        0.0,
    ),
    float(
        "urb_pop_growth_perc",
        None,
        "Urban population growth rate (%)",
        "%",
        SafeRange::between(1.0, 5.0),
        0.0,
    ),
];

/// Column order of the total-emissions model.
pub static TOTAL_FEATURES: &[FeatureSpec] = &[
    float(
        "cereal_yield",
        Some("Cereal yield (kg/ha)"),
        "Cereal yield (kg per hectare of harvested land)",
        "kg/ha",
        SafeRange::between(0.0, 10000.0),
        3000.0,
    ),
    float(
        "fdi_perc_gdp",
        Some("FDI (% of GDP)"),
        "Foreign direct investment, net inflows (% of GDP)",
        "%",
        SafeRange::between(0.0, 50.0),
        5.0,
    ),
    float(
        "en_per_gdp",
        Some("Energy per GDP"),
        "Energy use per unit of GDP",
        "",
        SafeRange::between(0.0, 1000.0),
        300.0,
    ),
    float(
        "en_per_cap",
        Some("Energy per capita"),
        "Energy use per capita (kg of oil equivalent)",
        "kg",
        SafeRange::between(0.0, 10000.0),
        500.0,
    ),
    float(
        "gdp",
        Some("GDP (USD)"),
        "Gross Domestic Product (USD)",
        "USD",
        SafeRange::at_least(0.0),
        1e10,
    ),
    float(
        "pop",
        Some("Population"),
        "Total population",
        "",
        SafeRange::at_least(0.0),
        5e7,
    ),
    float(
        "urb_pop_growth_perc",
        Some("Urban population growth (%)"),
        "Urban population growth rate (%)",
        "%",
        SafeRange::between(0.0, 10.0),
        2.5,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_build_valid_schemas() {
        for variant in Variant::ALL {
            let schema = variant.schema().unwrap();
            assert_eq!(schema.len(), 7);
        }
    }

    #[test]
    fn test_per_capita_order() {
        let schema = Variant::PerCapita.schema().unwrap();
        assert_eq!(
            schema.keys().collect::<Vec<_>>(),
            vec![
                "cereal_yield",
                "gni_per_cap",
                "en_per_cap",
                "pop_urb_aggl_perc",
                "prot_area_perc",
                "gdp",
                "urb_pop_growth_perc",
            ]
        );
        assert!(schema.specs().iter().all(|s| s.default == 0.0));
    }

    #[test]
    fn test_total_defaults() {
        let defaults = Variant::Total.schema().unwrap().defaults();
        assert_eq!(defaults.get("cereal_yield"), Some(3000.0));
        assert_eq!(defaults.get("gdp"), Some(1e10));
        assert_eq!(defaults.get("pop"), Some(5e7));
        assert_eq!(defaults.get("urb_pop_growth_perc"), Some(2.5));
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("per-capita".parse::<Variant>(), Ok(Variant::PerCapita));
        assert_eq!("TOTAL".parse::<Variant>(), Ok(Variant::Total));
        assert!("per-person".parse::<Variant>().is_err());
    }

    #[test]
    fn test_variant_labels() {
        let per_capita = Variant::PerCapita.schema().unwrap();
        assert_eq!(per_capita.specs()[1].display_label(), "Gni Per Cap");
        let total = Variant::Total.schema().unwrap();
        assert_eq!(total.specs()[1].display_label(), "FDI (% of GDP)");
    }
}
