//! Parsing of raw extraction records.
//!
//! Extraction output is nominally a JSON array of `{"name", "info"}`
//! objects, but in practice it is often a Python-style repr with single
//! quotes, full-width colons, trailing commas, or prose around the array.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::store::ChunkKey;
use crate::error::ParseError;

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([\]}])").expect("static regex is valid"))
}

/// Rewrites Python-style quoting, full-width colons and trailing commas.
fn repair(body: &str) -> String {
    let body = body.replace('\'', "\"").replace('：', ":");
    trailing_comma_re().replace_all(&body, "$1").into_owned()
}

/// One `{name, info}` observation from one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionRecord {
    /// Surface form as extracted.
    pub name: String,
    /// Raw delimiter-separated tag text.
    pub info: String,
    /// Chunk the observation came from.
    pub chunk: ChunkKey,
}

/// Parses one raw record into `(name, info)` pairs.
///
/// Blank input and an empty array both yield no pairs. An element without a
/// string `name` invalidates the whole record. A missing `info` is treated
/// as empty; an `info` array is joined with commas.
///
/// # Errors
/// Returns `MissingBody` when no array is present, `MalformedJson` when the
/// array is neither JSON nor repairable into it, `MissingField` for an
/// element without `name`.
///
/// # Examples
///
/// ```
/// use namebook::extraction::parse_record;
///
/// let pairs = parse_record("[{'name': 'アツシ', 'info': '人名，男性'},]").unwrap();
/// assert_eq!(pairs, vec![("アツシ".to_string(), "人名，男性".to_string())]);
/// ```
pub fn parse_record(raw: &str) -> Result<Vec<(String, String)>, ParseError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) else {
        return Err(ParseError::MissingBody { expected: "array" });
    };
    if end < start {
        return Err(ParseError::MissingBody { expected: "array" });
    }

    let body = &raw[start..=end];
    let elements: Vec<Value> = match serde_json::from_str(body) {
        Ok(elements) => elements,
        Err(_) => serde_json::from_str(&repair(body))?,
    };

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let name = element
                .get("name")
                .and_then(Value::as_str)
                .ok_or(ParseError::MissingField { index, field: "name" })?;
            let info = match element.get("info") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
                _ => String::new(),
            };
            Ok((name.to_string(), info))
        })
        .collect()
}

/// Parses a record and tags every pair with the chunk it came from.
///
/// # Errors
/// Same as [`parse_record`].
pub fn parse_mentions(chunk: &str, raw: &str) -> Result<Vec<MentionRecord>, ParseError> {
    let key = ChunkKey::of(chunk);
    Ok(parse_record(raw)?
        .into_iter()
        .map(|(name, info)| MentionRecord {
            name,
            info,
            chunk: key,
        })
        .collect())
}
