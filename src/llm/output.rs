use serde::de::DeserializeOwned;

use crate::agents::OutputError;

const EXCERPT_CHARS: usize = 200;

/// Remove a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````) from model output.
///
/// Text without a leading fence is returned trimmed but otherwise unchanged.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = match trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    {
        Some(inner) => inner,
        None => return trimmed,
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Decode a model's final answer into `T`, tolerating a code fence around the JSON.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, OutputError> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).map_err(|e| OutputError::InvalidJson {
        reason: e.to_string(),
        excerpt: body.chars().take(EXCERPT_CHARS).collect(),
    })
}
