use thiserror::Error;

/// Failure of a whole batch fetch. Any of these aborts the run that asked for
/// the batch.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from {source_name}: {reason}")]
    InvalidResponse {
        source_name: &'static str,
        reason: String,
    },

    #[error("{source_name} cannot serve any of the {requested} requested codes")]
    UnsupportedCodes {
        source_name: &'static str,
        requested: usize,
    },

    #[error("{source_name} returned no quotes for {requested} requested codes")]
    EmptyBatch {
        source_name: &'static str,
        requested: usize,
    },

    #[error("no quote source configured")]
    NoSources,

    #[error("all quote sources failed: {}", .0.join("; "))]
    AllSourcesFailed(Vec<String>),
}

/// Failure of a single record inside an otherwise healthy batch. The record
/// is skipped; the batch survives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    #[error("record has no quoted payload")]
    MissingPayload,

    #[error("unsupported market prefix in code {0:?}")]
    UnknownMarket(String),

    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("field {field} is not a number: {value:?}")]
    BadNumber { field: &'static str, value: String },
}
