//! Tolerant extraction of JSON payloads from free-form model output.
//!
//! Models are asked to respond with a JSON object but routinely wrap it in a
//! fenced code block or surround it with prose. [`parse`] is the single
//! chokepoint that turns whatever came back into a `serde_json::Value` or a
//! [`ParseFailure`] carrying the raw text for diagnostics. It never panics
//! and never loses the original response.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::AiResult;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Diagnostic record produced when a model response could not be decoded.
/// `raw_response` preserves the original input byte-for-byte so a human or a
/// retry path can inspect what the model actually said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub error: String,
    pub raw_response: String,
}

impl ParseFailure {
    pub fn new(error: impl Into<String>, raw_response: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            raw_response: raw_response.into(),
        }
    }
}

/// Extract and strictly decode the JSON payload embedded in `raw`.
///
/// Candidate selection, in order:
/// 1. the innermost content of the first ```json fenced block;
/// 2. if a fence marker is present without a clean match, the text with all
///    fence markers stripped;
/// 3. otherwise the trimmed raw text.
///
/// The decoded value is returned as-is. A bare number or array is a valid
/// result; callers guard with their own presence checks.
pub fn parse(raw: &str) -> Result<Value, ParseFailure> {
    let candidate = extract_candidate(raw);
    serde_json::from_str(candidate.trim())
        .map_err(|e| ParseFailure::new(format!("invalid JSON: {e}"), raw))
}

/// [`parse`] plus typed coercion. A shape mismatch degrades to the same
/// error record as a decode failure.
pub fn parse_as<T: DeserializeOwned>(raw: &str) -> AiResult<T> {
    match parse(raw) {
        Ok(value) => match serde_json::from_value(value) {
            Ok(typed) => AiResult::Ok(typed),
            Err(e) => AiResult::Err(ParseFailure::new(format!("unexpected shape: {e}"), raw)),
        },
        Err(failure) => AiResult::Err(failure),
    }
}

fn extract_candidate(raw: &str) -> Cow<'_, str> {
    if let Some(start) = raw.find(JSON_FENCE) {
        let body = &raw[start + JSON_FENCE.len()..];
        // First (innermost, non-greedy) fenced block only.
        if let Some(end) = body.find(FENCE) {
            return Cow::Borrowed(&body[..end]);
        }
    }
    if raw.contains(FENCE) {
        // Fence marker present but no clean open/close pair: strip every
        // literal marker and hope the remainder decodes.
        return Cow::Owned(raw.replace(JSON_FENCE, "").replace(FENCE, ""));
    }
    Cow::Borrowed(raw.trim())
}
