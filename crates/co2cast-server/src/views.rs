//! Server-rendered HTML for the form and its result.

use std::fmt::Write as _;

use co2cast_core::{FieldView, ImportanceChart, LoadError, ResultView, SummaryRow, VariantProfile};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:760px;margin:2rem auto;padding:0 1rem;color:#1f2933}\
label{display:block;font-weight:600;margin-top:1rem}\
input{width:100%;padding:.4rem;font-size:1rem;box-sizing:border-box}\
small{color:#616e7c}\
button{margin-top:1.5rem;padding:.6rem 1.2rem;font-size:1rem}\
.success{background:#e3f9e5;border-left:4px solid #31b237;padding:.8rem}\
.error{background:#ffe3e3;border-left:4px solid #e12d39;padding:.8rem}\
.info{background:#e6f6ff;border-left:4px solid #2186eb;padding:.8rem;margin-top:1rem}\
.advisory{color:#8d2b0b}\
footer{margin-top:2rem;color:#616e7c}";

const CHART_LABEL_WIDTH: usize = 220;
const CHART_BAR_WIDTH: usize = 300;
const CHART_ROW_HEIGHT: usize = 26;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full page: form with current field values, then an optional result.
/// Profiles with an input summary show it under the form on every render.
pub fn page(
    profile: &VariantProfile,
    fields: &[FieldView],
    load_error: Option<&LoadError>,
    result: Option<&ResultView>,
) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{style}</style></head><body><h1>{title}</h1><p>{subtitle}</p>",
        style = STYLE,
        title = escape(profile.title),
        subtitle = escape(profile.subtitle),
    );

    // Shown up front only when nothing was submitted; a submission renders the
    // same cause as its own result.
    if let (Some(e), None) = (load_error, result) {
        let _ = write!(
            html,
            "<div class=\"error\">Failed to load model: {}</div>",
            escape(&e.to_string())
        );
    }

    html.push_str(&form(profile, fields));

    if let Some(view) = result {
        html.push_str(&result_section(view));
    }

    if !profile.footer.is_empty() {
        html.push_str("<hr><footer>");
        for line in profile.footer {
            let _ = write!(html, "<p>{}</p>", escape(line));
        }
        html.push_str("</footer>");
    }

    html.push_str("</body></html>");
    html
}

fn form(profile: &VariantProfile, fields: &[FieldView]) -> String {
    let mut html = format!(
        "<h2>{}</h2><form method=\"post\" action=\"/predict\">",
        escape(profile.inputs_heading)
    );
    for field in fields {
        let _ = write!(
            html,
            "<label for=\"{key}\">{label}</label>\
             <input id=\"{key}\" name=\"{key}\" type=\"number\" step=\"any\" value=\"{value}\" title=\"{help}\">\
             <small>{description} · {hint}</small>",
            key = escape(field.key),
            label = escape(&field.label),
            value = escape(&field.value),
            help = escape(&field.help),
            description = escape(field.description),
            hint = escape(&field.range_hint),
        );
    }
    let _ = write!(
        html,
        "<button type=\"submit\">{}</button></form>",
        escape(profile.submit_label)
    );

    if profile.show_input_summary {
        let rows: Vec<SummaryRow> = fields
            .iter()
            .map(|f| SummaryRow {
                key: f.key.to_string(),
                label: f.label.clone(),
                value: f.value.clone(),
            })
            .collect();
        html.push_str(&summary_details(&rows));
    }
    html
}

fn result_section(view: &ResultView) -> String {
    let mut html = String::from("<section id=\"result\">");

    if !view.is_success() {
        let _ = write!(html, "<div class=\"error\">{}</div>", escape(&view.headline));
        html.push_str("</section>");
        return html;
    }

    let _ = write!(html, "<div class=\"success\">{}</div>", escape(&view.headline));

    if !view.advisories.is_empty() {
        html.push_str("<ul class=\"advisory\">");
        for note in &view.advisories {
            let _ = write!(html, "<li>{}</li>", escape(note));
        }
        html.push_str("</ul>");
    }

    if let Some(tip) = view.tip {
        let _ = write!(html, "<div class=\"info\">{}</div>", escape(tip));
    }

    if let Some(chart) = &view.importances {
        html.push_str("<h3>📊 Feature Importance</h3>");
        html.push_str(&importance_svg(chart));
    }

    html.push_str("</section>");
    html
}

/// Horizontal bar chart, one row per bar in chart order.
pub fn importance_svg(chart: &ImportanceChart) -> String {
    let width = CHART_LABEL_WIDTH + CHART_BAR_WIDTH + 80;
    let height = CHART_ROW_HEIGHT * chart.bars.len() + 30;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" \
         role=\"img\" aria-label=\"Feature importance\">",
        w = width,
        h = height
    );

    for (i, bar) in chart.bars.iter().enumerate() {
        let y = i * CHART_ROW_HEIGHT;
        let bar_width = (bar.fraction * CHART_BAR_WIDTH as f64).round();
        let _ = write!(
            svg,
            "<text x=\"{lx}\" y=\"{ty}\" text-anchor=\"end\" font-size=\"12\">{label}</text>\
             <rect x=\"{bx}\" y=\"{ry}\" width=\"{bw}\" height=\"{bh}\" fill=\"#2186eb\"><title>{weight:.4}</title></rect>\
             <text x=\"{vx}\" y=\"{ty}\" font-size=\"11\">{weight:.4}</text>",
            lx = CHART_LABEL_WIDTH - 8,
            ty = y + 17,
            label = escape(&bar.label),
            bx = CHART_LABEL_WIDTH,
            ry = y + 4,
            bw = bar_width,
            bh = CHART_ROW_HEIGHT - 8,
            weight = bar.weight,
            vx = CHART_LABEL_WIDTH as f64 + bar_width + 6.0,
        );
    }

    let _ = write!(
        svg,
        "<text x=\"{x}\" y=\"{y}\" font-size=\"12\" text-anchor=\"middle\">Importance</text></svg>",
        x = CHART_LABEL_WIDTH + CHART_BAR_WIDTH / 2,
        y = height - 8
    );
    svg
}

fn summary_details(rows: &[SummaryRow]) -> String {
    let mut html = String::from("<details><summary>🔎 Input Summary</summary><table>");
    for row in rows {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(&row.label),
            escape(&row.value)
        );
    }
    html.push_str("</table></details>");
    html
}

#[cfg(test)]
mod tests {
    use co2cast_core::{FeatureImportance, InputCollector, Variant};

    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_page_lists_every_field_with_hint() {
        let schema = Variant::PerCapita.schema().unwrap();
        let fields = InputCollector::new(schema.clone()).fields();
        let html = page(Variant::PerCapita.profile(), &fields, None, None);

        for key in schema.keys() {
            assert!(html.contains(&format!("name=\"{}\"", key)));
        }
        assert!(html.contains("Safe range: 2500–6000 kg/ha"));
        assert!(html.contains("Created by Krish Sharma"));
        assert!(!html.contains("id=\"result\""));
        assert_eq!(html.matches("type=\"number\" step=\"any\"").count(), schema.len());
        assert!(!html.contains("<details>"));
    }

    #[test]
    fn test_total_page_shows_input_summary_before_submit() {
        let schema = Variant::Total.schema().unwrap();
        let mut collector = InputCollector::new(schema);
        collector.set("pop", "123").unwrap();
        let html = page(Variant::Total.profile(), &collector.fields(), None, None);

        let summary = &html[html.find("<details>").unwrap()..];
        assert!(summary.contains("<td>10000000000</td>"));
        assert!(summary.contains("<td>123</td>"));
        assert!(!html.contains("id=\"result\""));
    }

    #[test]
    fn test_page_shows_load_error_banner() {
        let schema = Variant::Total.schema().unwrap();
        let fields = InputCollector::new(schema).fields();
        let err = LoadError::NotFound("models/co2_total.json".to_string());
        let html = page(Variant::Total.profile(), &fields, Some(&err), None);
        assert!(html.contains("Failed to load model: Model artifact not found: models/co2_total.json"));
    }

    #[test]
    fn test_svg_has_one_bar_per_feature() {
        let schema = Variant::Total.schema().unwrap();
        let importances: Vec<_> = schema
            .keys()
            .enumerate()
            .map(|(i, key)| FeatureImportance {
                key: key.to_string(),
                weight: i as f64,
            })
            .collect();
        let chart = ImportanceChart::new(&importances, &schema);
        let svg = importance_svg(&chart);
        assert_eq!(svg.matches("<rect").count(), schema.len());
        assert!(svg.contains("GDP (USD)"));
        assert!(svg.ends_with("</svg>"));
    }
}
