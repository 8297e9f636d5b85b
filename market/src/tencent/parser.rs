//! Parser for the Tencent `v_<code>="f0~f1~..."` record format.

use crate::errors::LineError;
use crate::parse::{ParsedBatch, number, split_record};
use crate::types::{Market, PriceSnapshot, Quote};

/// Records shorter than this are truncated or placeholder payloads.
pub const MIN_FIELDS: usize = 46;

const NAME: usize = 1;
const CURRENT: usize = 3;
const PREV_CLOSE: usize = 4;
const OPEN: usize = 5;
const HIGH: usize = 33;
const LOW: usize = 34;
const VOLUME: usize = 36;

/// A-share volume arrives in lots; reported in 10k lots.
const A_SHARE_VOLUME_DIVISOR: f64 = 10_000.0;
/// HK volume arrives in shares; reported in millions.
const HK_VOLUME_DIVISOR: f64 = 1_000_000.0;

/// Parses a whole response body. Unparsable records are rejected one by one.
pub fn parse_response(body: &str) -> ParsedBatch {
    let mut batch = ParsedBatch::default();

    for record in body.split(';') {
        let record = record.trim();
        if record.is_empty() {
            continue;
        }

        let Some((code, payload)) = split_record(record, "v_") else {
            batch.reject(record, LineError::MissingPayload);
            continue;
        };

        match parse_record(code, payload) {
            Ok(quote) => {
                batch.quotes.insert(code.to_string(), quote);
            }
            Err(e) => batch.reject(code, e),
        }
    }

    batch
}

pub fn parse_record(code: &str, payload: &str) -> Result<Quote, LineError> {
    let market = Market::from_code(code).ok_or_else(|| LineError::UnknownMarket(code.into()))?;

    let fields: Vec<&str> = payload.split('~').collect();
    if fields.len() < MIN_FIELDS {
        return Err(LineError::TooFewFields {
            expected: MIN_FIELDS,
            found: fields.len(),
        });
    }

    let divisor = match market {
        Market::AShare => A_SHARE_VOLUME_DIVISOR,
        Market::HongKong => HK_VOLUME_DIVISOR,
    };

    let snapshot = PriceSnapshot {
        name: fields[NAME].trim().to_string(),
        current: number("current", fields[CURRENT])?,
        prev_close: number("prev_close", fields[PREV_CLOSE])?,
        open: number("open", fields[OPEN])?,
        high: number("high", fields[HIGH])?,
        low: number("low", fields[LOW])?,
        volume: number("volume", fields[VOLUME])? / divisor,
    };

    Ok(Quote::new(market, snapshot))
}
