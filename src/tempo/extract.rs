//! Narrow field extraction from the playback response body
//!
//! The companion service answers with a small flat JSON object. Only a few
//! keys are needed, so they are scanned for directly instead of decoding
//! the whole document. [`FieldSource`] is the seam for a real decoder.

/// Value reported for an integer field that is absent or unreadable
pub const MISSING_INT: i64 = -1;

/// Value reported for a float field that is absent or unreadable
pub const MISSING_FLOAT: f32 = -1.0;

/// Source of named playback fields
pub trait FieldSource {
    /// Raw contents of a string field, without the quotes
    fn string(&self, key: &str) -> Option<&str>;

    /// Raw text of a numeric field
    fn number(&self, key: &str) -> Option<&str>;
}

/// Scans the body text for `"key"`, the following colon and the value
///
/// Strings end at the next quote (escapes are not interpreted). Numbers
/// are the longest run of digits, `-` and `.`.
#[derive(Debug, Clone, Copy)]
pub struct ScanExtractor<'a> {
    body: &'a str,
}

impl<'a> ScanExtractor<'a> {
    pub const fn new(body: &'a str) -> Self {
        Self { body }
    }

    /// Text following `"key"`, its colon and any whitespace
    ///
    /// Only the quoted key token is searched for, so quotes elsewhere in
    /// the body (including escaped ones inside values) never shift the
    /// match. A token not followed by a colon is a value and is skipped.
    fn value_start(&self, key: &str) -> Option<&'a str> {
        if key.is_empty() {
            return None;
        }
        let body = self.body;
        for (start, _) in body.match_indices(key) {
            if !body[..start].ends_with('"') {
                continue;
            }
            let Some(tail) = body[start + key.len()..].strip_prefix('"') else {
                continue;
            };
            if let Some(value) = tail.trim_start().strip_prefix(':') {
                return Some(value.trim_start());
            }
        }
        None
    }
}

impl FieldSource for ScanExtractor<'_> {
    fn string(&self, key: &str) -> Option<&str> {
        let value = self.value_start(key)?.strip_prefix('"')?;
        let end = value.find('"')?;
        Some(&value[..end])
    }

    fn number(&self, key: &str) -> Option<&str> {
        let value = self.value_start(key)?;
        let end = value
            .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '.'))
            .unwrap_or(value.len());
        if end == 0 {
            return None;
        }
        Some(&value[..end])
    }
}

/// String field, empty when absent
pub fn extract_string<'a, S: FieldSource + ?Sized>(source: &'a S, key: &str) -> &'a str {
    source.string(key).unwrap_or("")
}

/// Integer field, [`MISSING_INT`] when absent or unreadable
///
/// A fractional value is truncated toward zero.
#[allow(clippy::cast_possible_truncation)]
pub fn extract_int<S: FieldSource + ?Sized>(source: &S, key: &str) -> i64 {
    let Some(raw) = source.number(key) else {
        return MISSING_INT;
    };
    raw.parse::<i64>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| value as i64)
        })
        .unwrap_or(MISSING_INT)
}

/// Float field, [`MISSING_FLOAT`] when absent or unreadable
pub fn extract_float<S: FieldSource + ?Sized>(source: &S, key: &str) -> f32 {
    source
        .number(key)
        .and_then(|raw| raw.parse::<f32>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(MISSING_FLOAT)
}
