//! Lenient JSON recovery from model output.
//!
//! Models asked for "JSON only" still wrap it in prose or markdown fences.
//! Recovery is two-tier: parse the whole response, and if that fails parse
//! the span from the first `{` to the last `}`. Anything beyond that is the
//! caller's failure to report.

use serde_json::Value;
use tracing::debug;

/// Parse a model response as JSON, falling back to the outermost `{...}` span.
///
/// On failure returns the error from the last attempt made.
pub fn parse_model_json(raw: &str) -> Result<Value, serde_json::Error> {
    let direct = match serde_json::from_str::<Value>(raw) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(direct);
    };
    if end < start {
        return Err(direct);
    }

    debug!(start, end, "direct JSON parse failed, retrying on brace span");
    serde_json::from_str(&raw[start..=end])
}
