//! Helpers shared by the vendor parsers.

use crate::errors::LineError;
use crate::source::QuoteMap;

/// Result of parsing one batch body: the quotes that survived and the
/// records that were skipped, with the reason.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub quotes: QuoteMap,
    pub rejected: Vec<(String, LineError)>,
}

impl ParsedBatch {
    pub fn reject(&mut self, record: &str, err: LineError) {
        self.rejected.push((record.to_string(), err));
    }
}

/// Splits `prefix<code>="payload"` into `(code, payload)`.
pub(crate) fn split_record<'a>(record: &'a str, prefix: &str) -> Option<(&'a str, &'a str)> {
    let record = record.trim();
    let rest = record.strip_prefix(prefix)?;
    let (code, payload) = rest.split_once("=\"")?;
    let payload = payload.trim_end_matches(';').trim_end_matches('"');
    Some((code.trim(), payload))
}

/// Vendor feeds send an empty field instead of 0 for missing values.
pub(crate) fn number(field: &'static str, raw: &str) -> Result<f64, LineError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(LineError::BadNumber {
            field,
            value: raw.to_string(),
        }),
    }
}
