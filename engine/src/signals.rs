use serde::Serialize;

use market::Quote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    PotentialBuy,
    ProfitTake,
    LimitUp,
    LimitDown,
}

impl SignalKind {
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::PotentialBuy => "potential buy point",
            SignalKind::ProfitTake => "profit-take",
            SignalKind::LimitUp => "limit-up",
            SignalKind::LimitDown => "limit-down",
        }
    }
}

/// Derived short-term observation. Stateless and never deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub code: String,
    pub name: String,
    pub signal: SignalKind,
    pub reason: String,
    pub price: f64,
}

/// Classifies quotes by shape alone, ignoring configured rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalGenerator;

impl SignalGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate<'a>(&self, quotes: impl IntoIterator<Item = (&'a String, &'a Quote)>) -> Vec<Signal> {
        quotes
            .into_iter()
            .flat_map(|(code, quote)| {
                Self::classify(quote)
                    .into_iter()
                    .map(move |(kind, reason)| Signal {
                        code: code.clone(),
                        name: quote.name.clone(),
                        signal: kind,
                        reason,
                        price: quote.current,
                    })
            })
            .collect()
    }

    /// Pullback and profit-take are exclusive; the limit checks are
    /// evaluated on top of them.
    pub fn classify(quote: &Quote) -> Vec<(SignalKind, String)> {
        let c = quote.change_pct;
        let amp = quote.amplitude;
        let mut out = Vec::with_capacity(2);

        if c > -5.0 && c < -2.0 && amp > 3.0 {
            out.push((
                SignalKind::PotentialBuy,
                format!("pullback {c:.2}% with amplitude {amp:.2}%, may rebound"),
            ));
        } else if c > 5.0 && amp > 4.0 {
            out.push((
                SignalKind::ProfitTake,
                format!("up {c:.2}%, consider trimming to lock in gains"),
            ));
        }

        if c > 9.5 {
            out.push((
                SignalKind::LimitUp,
                "at limit-up, may extend higher next session".to_string(),
            ));
        } else if c < -9.5 {
            out.push((
                SignalKind::LimitDown,
                "at limit-down, risk of a lower open next session".to_string(),
            ));
        }

        out
    }
}
