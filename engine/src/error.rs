use std::path::PathBuf;

use thiserror::Error;

use market::QuoteError;

/// The only failure a run surfaces to its caller. Everything else degrades
/// locally to a safe default.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("quote fetch failed: {0}")]
    Fetch(#[from] QuoteError),
}

/// Why a configuration document was rejected. Callers normally fall back to
/// the disabled default rather than propagating this.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate watchlist code {0}")]
    DuplicateCode(String),

    #[error("unsupported market prefix in watchlist code {0:?}")]
    UnknownMarket(String),

    #[error("threshold {rule} for {code} is not a finite number")]
    NonFiniteThreshold { code: String, rule: &'static str },
}
