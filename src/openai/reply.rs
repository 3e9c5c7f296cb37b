//! Decoding of the assistant's free-text reply into typed records.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parses a reply that should hold a JSON list of `T`.
///
/// A single JSON object is accepted as a one-element list. A surrounding
/// markdown code fence is ignored. Empty replies, empty lists and items that
/// don't deserialize are errors.
pub fn parse_reply_list<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, String> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err("assistant reply is empty".to_string());
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("assistant reply is not JSON: {e}"))?;
    let items = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        other => return Err(format!("expected a JSON list or object, got {other}")),
    };
    if items.is_empty() {
        return Err("assistant returned an empty list".to_string());
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| serde_json::from_value(item).map_err(|e| format!("item {}: {e}", i + 1)))
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
