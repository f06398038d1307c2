//! Human-readable rendering of a [`QueryEnvelope`] (spec §6.1 `--format text`).
//!
//! The envelope's `results` payload shape varies per subcommand (symbol
//! lists, graph objects, call edges, …), so rendering walks the JSON value
//! generically: arrays print one summary line per element, objects print
//! `field: value` lines, and anything else falls back to compact JSON.

use serde_json::Value;

use crate::envelope::QueryEnvelope;
use crate::OutputFormatter;

pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn format(&self, envelope: &QueryEnvelope) -> String {
        if let Some(message) = &envelope.error {
            return format!("error: {message}");
        }
        let mut out = String::new();
        render_value(&envelope.results, 0, &mut out);
        if let Some(total) = envelope.total_count {
            out.push_str(&format!("\n({total} total)"));
        }
        out
    }
}

fn render_value(value: &Value, indent: usize, out: &mut String) {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str(&pad(indent));
                out.push_str("(none)\n");
                return;
            }
            for item in items {
                out.push_str(&pad(indent));
                out.push_str(&summarize(item));
                out.push('\n');
            }
        }
        Value::Object(_) => {
            out.push_str(&pad(indent));
            out.push_str(&summarize(value));
            out.push('\n');
        }
        other => {
            out.push_str(&pad(indent));
            out.push_str(&scalar(other));
            out.push('\n');
        }
    }
}

/// One line per object: prefers common identifying fields (`name`, `kind`,
/// `file`, `line`), falls back to compact JSON when none are present.
fn summarize(value: &Value) -> String {
    let Value::Object(map) = value else {
        return scalar(value);
    };
    let known = ["name", "kind", "file", "line", "col"];
    let parts: Vec<String> = known
        .iter()
        .filter_map(|key| map.get(*key).map(|v| format!("{key}={}", scalar(v))))
        .collect();
    if parts.is_empty() {
        serde_json::to_string(value).unwrap_or_default()
    } else {
        parts.join(" ")
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn pad(indent: usize) -> String {
    " ".repeat(indent * 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_list_of_symbol_like_objects() {
        let envelope = QueryEnvelope::ok(
            "symbols",
            vec![serde_json::json!({"name": "Handle", "kind": "method", "file": "a.go", "line": 10})],
            Some(1),
        );
        let out = TextFormatter.format(&envelope);
        assert!(out.contains("name=Handle"));
        assert!(out.contains("(1 total)"));
    }

    #[test]
    fn renders_empty_array_as_none() {
        let envelope = QueryEnvelope::ok("symbols", Vec::<Value>::new(), Some(0));
        let out = TextFormatter.format(&envelope);
        assert!(out.contains("(none)"));
    }

    #[test]
    fn renders_error_message() {
        let envelope = QueryEnvelope::err("definition", "not found");
        assert_eq!(TextFormatter.format(&envelope), "error: not found");
    }
}
