use serde_json::Value;

/// Extract the JSON object embedded in a model reply.
///
/// Models often wrap JSON in prose or code fences, so this takes the span
/// from the first `{` to the last `}` and parses it. Returns `None` when
/// there is no such span or it is not a JSON object.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Model output is not valid JSON: {}", e);
            None
        }
    }
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
