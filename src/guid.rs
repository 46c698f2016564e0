use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static GUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("GUID pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid format: no GUID found in {input:?}")]
pub struct GuidError {
    pub input: String,
}

/// Pull the first GUID out of a raw ID or a match-history URL.
///
/// Surrounding text is ignored and the casing of the match is preserved.
pub fn extract_guid(value: &str) -> Result<String, GuidError> {
    GUID_PATTERN
        .find(value.trim())
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| GuidError {
            input: value.to_string(),
        })
}
