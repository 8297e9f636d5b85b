use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use market::{Market, PriceSnapshot, Quote, QuoteError, QuoteMap, QuoteSource};

/// Scripted source: either serves `quotes` or fails with `error`.
pub struct ScriptedSource {
    pub name: &'static str,
    pub quotes: Option<QuoteMap>,
    pub error: Option<String>,
    pub calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn ok(name: &'static str, quotes: QuoteMap) -> Self {
        Self {
            name,
            quotes: Some(quotes),
            error: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str, error: &str) -> Self {
        Self {
            name,
            quotes: None,
            error: Some(error.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for ScriptedSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _codes: &[String]) -> Result<QuoteMap, QuoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match (&self.quotes, &self.error) {
            (Some(q), _) => Ok(q.clone()),
            (None, Some(e)) => Err(QuoteError::InvalidResponse {
                source_name: self.name,
                reason: e.clone(),
            }),
            (None, None) => Ok(QuoteMap::new()),
        }
    }
}

pub fn quote(name: &str, current: f64, prev_close: f64) -> Quote {
    Quote::new(
        Market::AShare,
        PriceSnapshot {
            name: name.into(),
            current,
            open: prev_close,
            high: current.max(prev_close),
            low: current.min(prev_close),
            prev_close,
            volume: 1.0,
        },
    )
}
