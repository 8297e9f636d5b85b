use crate::errors::LineError;
use crate::parse::{ParsedBatch, number, split_record};
use crate::types::{Market, PriceSnapshot, Quote};

pub const MIN_FIELDS: usize = 10;

const NAME: usize = 0;
const OPEN: usize = 1;
const PREV_CLOSE: usize = 2;
const CURRENT: usize = 3;
const HIGH: usize = 4;
const LOW: usize = 5;
const VOLUME: usize = 8;

/// Volume arrives in shares; 100 shares per lot, reported in 10k lots.
const VOLUME_DIVISOR: f64 = 1_000_000.0;

pub fn parse_response(body: &str) -> ParsedBatch {
    let mut batch = ParsedBatch::default();

    for record in body.split([';', '\n']) {
        let record = record.trim();
        if record.is_empty() {
            continue;
        }

        let Some((code, payload)) = split_record(record, "var hq_str_") else {
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
    match Market::from_code(code) {
        Some(Market::AShare) => {}
        _ => return Err(LineError::UnknownMarket(code.into())),
    }

    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return Err(LineError::TooFewFields {
            expected: MIN_FIELDS,
            found: fields.len(),
        });
    }

    let snapshot = PriceSnapshot {
        name: fields[NAME].trim().to_string(),
        open: number("open", fields[OPEN])?,
        prev_close: number("prev_close", fields[PREV_CLOSE])?,
        current: number("current", fields[CURRENT])?,
        high: number("high", fields[HIGH])?,
        low: number("low", fields[LOW])?,
        volume: number("volume", fields[VOLUME])? / VOLUME_DIVISOR,
    };

    Ok(Quote::new(Market::AShare, snapshot))
}
