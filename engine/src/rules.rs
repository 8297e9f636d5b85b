use chrono::{DateTime, Utc};
use tracing::debug;

use cooldown::{AlertKey, CooldownStore, CooldownWindows};
use market::Quote;

use crate::alert::{AlertEvent, AlertKind};
use crate::config::WatchlistEntry;

/// Both conditions must hold for the volatile rule; it needs no threshold.
const VOLATILE_CHANGE_PCT: f64 = 3.0;
const VOLATILE_AMPLITUDE: f64 = 5.0;

/// Evaluates one watchlist entry against its fresh quote.
///
/// Rules run in a fixed order (breakout, breakdown, surge, plunge,
/// volatile). A firing that is not suppressed is recorded in the cooldown
/// store before it is returned, so suppression follows evaluation rather
/// than delivery.
#[derive(Debug, Clone, Default)]
pub struct AlertRuleEngine {
    windows: CooldownWindows,
}

impl AlertRuleEngine {
    pub fn new(windows: CooldownWindows) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> &CooldownWindows {
        &self.windows
    }

    pub fn evaluate(
        &self,
        entry: &WatchlistEntry,
        quote: &Quote,
        cooldowns: &mut CooldownStore,
        now: DateTime<Utc>,
    ) -> Vec<AlertEvent> {
        let code = entry.code.as_str();
        let name = display_name(entry, quote);
        let rules = &entry.alerts;
        let change_pct = quote.change_pct;
        let mut fired = Vec::new();

        if let Some(threshold) = rules.price_above {
            if quote.current >= threshold && change_pct > 0.0 {
                fired.push(Candidate {
                    kind: AlertKind::PriceBreakout,
                    key: AlertKey::price_above(code),
                    message: format!("{name} ({code}) broke above {threshold:.2}"),
                    detail: format!("price {:.2}, change {change_pct:+.2}%", quote.current),
                    action: None,
                });
            }
        }

        if let Some(threshold) = rules.price_below {
            if quote.current <= threshold && change_pct < 0.0 {
                fired.push(Candidate {
                    kind: AlertKind::PriceBreakdown,
                    key: AlertKey::price_below(code),
                    message: format!("{name} ({code}) fell below {threshold:.2}"),
                    detail: format!("price {:.2}, change {change_pct:+.2}%", quote.current),
                    action: None,
                });
            }
        }

        if let Some(threshold) = rules.change_pct_above {
            if change_pct >= threshold {
                fired.push(Candidate {
                    kind: AlertKind::Surge,
                    key: AlertKey::surge(code, change_pct),
                    message: format!("{name} ({code}) surging {change_pct:+.2}%"),
                    detail: format!(
                        "price {:.2}, volume {:.0} {}, amplitude {:.2}%",
                        quote.current,
                        quote.volume,
                        quote.market.volume_unit(),
                        quote.amplitude
                    ),
                    action: Some("watch for a short-term chase entry".to_string()),
                });
            }
        }

        if let Some(threshold) = rules.change_pct_below {
            if change_pct <= threshold {
                fired.push(Candidate {
                    kind: AlertKind::Plunge,
                    key: AlertKey::plunge(code, change_pct),
                    message: format!("{name} ({code}) plunging {change_pct:+.2}%"),
                    detail: format!(
                        "price {:.2}, volume {:.0} {}",
                        quote.current,
                        quote.volume,
                        quote.market.volume_unit()
                    ),
                    action: Some("check stop-loss, or watch for a bottom".to_string()),
                });
            }
        }

        if change_pct.abs() > VOLATILE_CHANGE_PCT && quote.amplitude > VOLATILE_AMPLITUDE {
            let tone = if change_pct > 0.0 { "strong" } else { "weak" };
            fired.push(Candidate {
                kind: AlertKind::Volatile,
                key: AlertKey::volatile(code),
                message: format!("{name} short-term {tone}, amplitude {:.2}%", quote.amplitude),
                detail: format!("change {change_pct:+.2}%, suited to short-term trading"),
                action: Some("follow the intraday chart for entry and exit points".to_string()),
            });
        }

        fired
            .into_iter()
            .filter_map(|c| self.admit(c, code, cooldowns, now))
            .collect()
    }

    fn admit(
        &self,
        candidate: Candidate,
        code: &str,
        cooldowns: &mut CooldownStore,
        now: DateTime<Utc>,
    ) -> Option<AlertEvent> {
        let window = self.windows.window_for(&candidate.key);
        if cooldowns.is_recently_fired(&candidate.key, window, now) {
            debug!(key = %candidate.key, "alert suppressed by cooldown");
            return None;
        }

        cooldowns.record(&candidate.key, now);

        Some(AlertEvent {
            kind: candidate.kind,
            level: candidate.kind.level(),
            code: code.to_string(),
            message: candidate.message,
            detail: candidate.detail,
            key: candidate.key.to_string(),
            action: candidate.action,
        })
    }
}

struct Candidate {
    kind: AlertKind,
    key: AlertKey,
    message: String,
    detail: String,
    action: Option<String>,
}

/// Feed name first, then the configured name, then the bare code.
fn display_name<'a>(entry: &'a WatchlistEntry, quote: &'a Quote) -> &'a str {
    if !quote.name.is_empty() {
        &quote.name
    } else {
        entry.name.as_deref().unwrap_or(&entry.code)
    }
}
