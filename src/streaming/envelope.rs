//! Speculative unwrapping of JSON-wrapped streamed replies.
//!
//! Some endpoints stream a JSON document such as `{"response": "..."}`
//! instead of raw text. Until the stream completes the accumulated text is
//! almost always an incomplete document, so parse failure simply means
//! "render it raw for now".

use std::borrow::Cow;

use serde_json::Value;

/// Returns the string held in `field` if `raw` is a complete JSON object
/// carrying one, otherwise `raw` itself. Never fails.
pub fn unwrap_text<'a>(raw: &'a str, field: &str) -> Cow<'a, str> {
    let trimmed = raw.trim_start();
    if !trimmed.starts_with('{') {
        return Cow::Borrowed(raw);
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(mut map)) => match map.remove(field) {
            Some(Value::String(text)) => Cow::Owned(text),
            _ => Cow::Borrowed(raw),
        },
        _ => Cow::Borrowed(raw),
    }
}
