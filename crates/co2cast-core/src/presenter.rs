//! Result Presenter - turns an [`Outcome`] into something a front end can show.

use serde::Serialize;

use crate::catalog::VariantProfile;
use crate::collector::format_plain;
use crate::cycle::Outcome;
use crate::feature::{FeatureSchema, FeatureVector};
use crate::gateway::FeatureImportance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceBar {
    pub key: String,
    pub label: String,
    pub weight: f64,
    /// Magnitude relative to the largest bar, `0.0..=1.0`.
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceChart {
    pub bars: Vec<ImportanceBar>,
    pub max_magnitude: f64,
}

impl ImportanceChart {
    /// One bar per schema key, in schema order.
    pub fn new(importances: &[FeatureImportance], schema: &FeatureSchema) -> Self {
        let max_magnitude = importances
            .iter()
            .map(|i| i.weight.abs())
            .fold(0.0_f64, f64::max);

        let bars = schema
            .specs()
            .iter()
            .map(|spec| {
                let weight = importances
                    .iter()
                    .find(|i| i.key == spec.key)
                    .map_or(0.0, |i| i.weight);
                let fraction = if max_magnitude > 0.0 {
                    weight.abs() / max_magnitude
                } else {
                    0.0
                };
                ImportanceBar {
                    key: spec.key.to_string(),
                    label: spec.display_label(),
                    weight,
                    fraction,
                }
            })
            .collect();

        Self {
            bars,
            max_magnitude,
        }
    }

    /// Horizontal text bars, longest bar `width` cells.
    pub fn render_text(&self, width: usize) -> String {
        let label_width = self.bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
        let mut out = String::new();
        for bar in &self.bars {
            let cells = (bar.fraction * width as f64).round() as usize;
            out.push_str(&format!(
                "  {:<lw$} │{:<w$}│ {:.4}\n",
                bar.label,
                "█".repeat(cells),
                bar.weight,
                lw = label_width,
                w = width
            ));
        }
        out.push_str(&format!("  {:<lw$}  Importance\n", "", lw = label_width));
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// Everything one render cycle needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub kind: ResultKind,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<&'static str>,
    pub advisories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importances: Option<ImportanceChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<SummaryRow>>,
}

impl ResultView {
    pub fn is_success(&self) -> bool {
        self.kind == ResultKind::Success
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        match self.kind {
            ResultKind::Success => out.push_str(&format!("{}\n", self.headline)),
            ResultKind::Error => out.push_str(&format!("Error: {}\n", self.headline)),
        }

        for note in &self.advisories {
            out.push_str(&format!("  note: {}\n", note));
        }

        if let Some(summary) = &self.summary {
            out.push_str("\nInput Summary:\n");
            let width = summary.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
            for row in summary {
                out.push_str(&format!("  {:<w$}  {}\n", row.label, row.value, w = width));
            }
        }

        if let Some(chart) = &self.importances {
            out.push_str("\nFeature Importance:\n");
            out.push_str(&chart.render_text(30));
        }

        if let Some(tip) = self.tip {
            out.push_str(&format!("\nTip: {}\n", tip));
        }
        out
    }
}

pub fn present(outcome: &Outcome, profile: &VariantProfile, schema: &FeatureSchema) -> ResultView {
    match outcome {
        Outcome::Succeeded { vector, result } => ResultView {
            kind: ResultKind::Success,
            headline: format!("{}: {}", profile.headline, format_value(result.value, profile)),
            value: Some(result.value),
            tip: profile.tip,
            advisories: advisories(vector, schema),
            importances: match (&result.importances, profile.show_importances) {
                (Some(importances), true) => Some(ImportanceChart::new(importances, schema)),
                _ => None,
            },
            summary: profile.show_input_summary.then(|| summary_rows(vector, schema)),
        },
        Outcome::Failed(e) => ResultView {
            kind: ResultKind::Error,
            headline: e.to_string(),
            value: None,
            tip: None,
            advisories: Vec::new(),
            importances: None,
            summary: None,
        },
    }
}

/// `7.42 metric tons`, or `1,234.57 million tonnes` for grouped profiles.
pub fn format_value(value: f64, profile: &VariantProfile) -> String {
    let number = if profile.group_thousands {
        group_thousands(value, 2)
    } else {
        format!("{:.2}", value)
    };
    format!("{} {}", number, profile.unit_label)
}

pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

fn advisories(vector: &FeatureVector, schema: &FeatureSchema) -> Vec<String> {
    vector
        .iter()
        .filter_map(|(key, value)| {
            let spec = schema.get(key)?;
            (!spec.is_within_safe_range(value)).then(|| {
                format!(
                    "{} = {} is outside the advisory range ({})",
                    spec.display_label(),
                    format_plain(value),
                    spec.range_hint()
                )
            })
        })
        .collect()
}

fn summary_rows(vector: &FeatureVector, schema: &FeatureSchema) -> Vec<SummaryRow> {
    vector
        .iter()
        .map(|(key, value)| SummaryRow {
            key: key.to_string(),
            label: schema
                .get(key)
                .map_or_else(|| key.to_string(), |s| s.display_label()),
            value: format_plain(value),
        })
        .collect()
}
