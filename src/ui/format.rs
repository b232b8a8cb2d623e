use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static DISALLOWED_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^A-Za-z0-9_\s.,!?;:'"()\-]"#).expect("Invalid output sanitizer regex")
});

/// Cosmetic cleanup for free-text model output: strips characters outside a
/// small printable set and spaces out paragraphs. The result is still
/// rendered as plain text.
pub fn format_output(output: &str) -> String {
    let sanitized = DISALLOWED_CHARS.replace_all(output, "");
    sanitized
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) | Value::Null => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

fn format_scrape_item(item: &Value) -> String {
    let selector = item.get("selector").and_then(Value::as_str).unwrap_or("");
    let results = item
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    if selector.to_lowercase().contains("article title") {
        let titles = results
            .iter()
            .map(|r| r.get("text").map(value_as_text).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n");
        format!("Article Titles:\n{}", titles)
    } else {
        let lines = results
            .iter()
            .map(value_as_text)
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}:\n{}", selector, lines)
    }
}

/// Renders a scrape response as `selector:` blocks separated by blank lines.
/// Returns `None` when the response carries no `data` array.
pub fn format_scrape_data(response: &Value) -> Option<String> {
    let items = response.get("data")?.as_array()?;
    Some(
        items
            .iter()
            .map(format_scrape_item)
            .collect::<Vec<_>>()
            .join("\n\n"),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryView {
    Text(String),
    Bullets(Vec<String>),
    Raw(Value),
}

impl SummaryView {
    pub fn from_response(response: &Value) -> Self {
        match response.get("summary") {
            Some(Value::String(text)) => SummaryView::Text(text.clone()),
            Some(Value::Array(points)) => {
                SummaryView::Bullets(points.iter().map(value_as_text).collect())
            }
            _ => SummaryView::Raw(response.clone()),
        }
    }
}
