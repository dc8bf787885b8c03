//! Extraction of JSON values from loose LLM replies.
//!
//! Models wrap JSON in prose or code fences even when told not to. These
//! helpers slice the widest brace/bracket span out of the text and parse it,
//! returning None on anything unparseable.

use openrouter_client::strip_code_fences;
use serde_json::Value;

/// First `{...}` span in the text, parsed as a JSON object.
pub fn extract_object(text: &str) -> Option<Value> {
    extract_span(strip_code_fences(text), '{', '}')
        .filter(|v| v.is_object())
}

/// First `[...]` span in the text, parsed as a JSON array.
pub fn extract_array(text: &str) -> Option<Value> {
    extract_span(strip_code_fences(text), '[', ']')
        .filter(|v| v.is_array())
}

fn extract_span(text: &str, open: char, close: char) -> Option<Value> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}
