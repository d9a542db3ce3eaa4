//! JSON extraction from free-form model replies.
//!
//! Models are told to answer with bare JSON but regularly wrap it in a
//! markdown fence or surround it with prose. These functions are pure text
//! handling, no I/O.
//!
//! | Strategy | Example |
//! |----------|---------|
//! | Whole text | `{"findings": []}` |
//! | Fenced block | ```` ```json\n{...}\n``` ```` |
//! | Outermost braces | `Here you go: {...} Hope this helps` |

use serde_json::Value;

/// Parse a model reply as JSON, trying progressively looser strategies.
///
/// Returns `None` when no strategy yields valid JSON.
///
/// # Examples
///
/// ```
/// use secreview_domain::review::parsing::parse_json_with_fallbacks;
///
/// assert!(parse_json_with_fallbacks(r#"{"findings": []}"#).is_some());
/// assert!(parse_json_with_fallbacks("Result:\n```json\n{\"a\": 1}\n```").is_some());
/// assert!(parse_json_with_fallbacks("no json here").is_none());
/// ```
pub fn parse_json_with_fallbacks(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(block) = extract_fenced_block(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(block.trim())
    {
        return Some(value);
    }

    if let Some(start) = trimmed.find('{')
        && let Some(end) = trimmed.rfind('}')
        && end > start
        && let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end])
    {
        return Some(value);
    }

    None
}

/// Content of the first ```` ```json ```` block, or of the first bare fence.
fn extract_fenced_block(text: &str) -> Option<&str> {
    let (start, skip) = match text.find("```json") {
        Some(pos) => (pos, "```json".len()),
        None => (text.find("```")?, "```".len()),
    };
    let body = &text[start + skip..];
    let end = body.find("```")?;
    Some(&body[..end])
}
