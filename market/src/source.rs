use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::QuoteError;
use crate::types::Quote;

/// Quotes keyed by market-prefixed code.
pub type QuoteMap = BTreeMap<String, Quote>;

/// Batch quote provider.
///
/// A call either returns quotes for the whole batch (codes that the vendor
/// did not know are simply absent) or fails as a whole.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, codes: &[String]) -> Result<QuoteMap, QuoteError>;
}

/// Tries each source in order; the first non-empty batch wins. An empty
/// batch for a non-empty request counts as a failure.
///
/// Every failure is logged and kept, so an outage of all vendors reports
/// what each of them said.
pub struct FallbackQuoteSource {
    sources: Vec<Arc<dyn QuoteSource>>,
}

impl FallbackQuoteSource {
    pub fn new(sources: Vec<Arc<dyn QuoteSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl QuoteSource for FallbackQuoteSource {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn fetch(&self, codes: &[String]) -> Result<QuoteMap, QuoteError> {
        if self.sources.is_empty() {
            return Err(QuoteError::NoSources);
        }

        let mut failures = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            match source.fetch(codes).await {
                Ok(quotes) if quotes.is_empty() && !codes.is_empty() => {
                    let e = QuoteError::EmptyBatch {
                        source_name: source.name(),
                        requested: codes.len(),
                    };
                    warn!(source = source.name(), error = %e, "quote source served nothing; trying next");
                    failures.push(format!("{}: {}", source.name(), e));
                }
                Ok(quotes) => {
                    debug!(
                        source = source.name(),
                        count = quotes.len(),
                        "quote batch served"
                    );
                    return Ok(quotes);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "quote source failed; trying next");
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        Err(QuoteError::AllSourcesFailed(failures))
    }
}
