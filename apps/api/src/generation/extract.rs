//! Response Extractor — isolates the JSON object candidate in raw model output.
//!
//! Models occasionally wrap their answer in markdown code fences or surround
//! it with prose despite instructions. This pass is purely textual narrowing:
//! it cannot fail, and a candidate without braces is handed on unchanged so
//! the downstream parse surfaces the error.

/// Narrows raw model output to a single JSON object candidate.
///
/// Strategy: prefer the contents of the first fenced code block (with an
/// optional `json` language tag); then slice from the first `{` to the last
/// `}`. Idempotent on its own output for any input holding at most one JSON
/// object.
pub fn extract(raw: &str) -> &str {
    let candidate = fenced_block(raw).unwrap_or(raw).trim();

    match (candidate.find('{'), candidate.rfind('}')) {
        (Some(open), Some(close)) if close > open => &candidate[open..=close],
        _ => candidate,
    }
}

/// Returns the contents of the first ``` … ``` pair, if both fences exist.
fn fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find("```")?;
    let mut body = &raw[open + 3..];
    if let Some(tagged) = body.strip_prefix("json") {
        body = tagged;
    }
    let close = body.find("```")?;
    Some(&body[..close])
}
