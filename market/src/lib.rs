pub mod errors;
pub mod hours;
pub mod parse;
pub mod sina;
pub mod source;
pub mod tencent;
pub mod types;

pub use errors::{LineError, QuoteError};
pub use hours::{MarketHoursGate, TradingSession};
pub use source::{FallbackQuoteSource, QuoteMap, QuoteSource};
pub use types::{Market, PriceSnapshot, Quote};
