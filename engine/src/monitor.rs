//! One monitor run.
//!
//! Each invocation:
//!   1. Returns early when monitoring is disabled, the market gate is closed
//!      or the watchlist is empty. None of these touch the quote feed.
//!   2. Fetches quotes for the whole watchlist in one batch.
//!   3. Loads cooldowns and evaluates every entry that has a quote.
//!   4. Commits cooldowns once, then derives signals over all quotes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{Instrument, debug, error, info, warn};

use common::logger::{TraceId, child_span, root_span, warn_if_slow};
use cooldown::{CooldownPersistence, CooldownStore};
use market::{MarketHoursGate, QuoteMap, QuoteSource};

use crate::alert::AlertEvent;
use crate::config::MonitorConfig;
use crate::error::EngineError;
use crate::rules::AlertRuleEngine;
use crate::signals::{Signal, SignalGenerator};

const SLOW_FETCH: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Monitoring switched off in configuration.
    Disabled,
    NonTrading,
    EmptyWatchlist,
    Completed(RunReport),
}

/// Everything a renderer needs from a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub trace_id: String,
    pub quotes: QuoteMap,
    pub alerts: Vec<AlertEvent>,
    pub signals: Vec<Signal>,

    /// Watchlist codes the feed returned nothing for.
    pub missing: Vec<String>,

    /// False when the cooldown state could not be persisted. Alerts are still
    /// reported; they may repeat next run.
    pub cooldown_committed: bool,
}

pub struct MonitorRun {
    config: Arc<MonitorConfig>,
    gate: MarketHoursGate,
    source: Arc<dyn QuoteSource>,
    persistence: Arc<dyn CooldownPersistence>,
    rules: AlertRuleEngine,
    signals: SignalGenerator,
}

impl MonitorRun {
    pub fn new(
        config: Arc<MonitorConfig>,
        source: Arc<dyn QuoteSource>,
        persistence: Arc<dyn CooldownPersistence>,
    ) -> Self {
        Self {
            gate: config.gate(),
            rules: AlertRuleEngine::new(config.cooldown),
            signals: SignalGenerator::new(),
            config,
            source,
            persistence,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Executes one pass at `now`. Only a failed batch fetch is an error;
    /// in that case no alerts are produced and cooldowns are left untouched.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunOutcome, EngineError> {
        let trace_id = TraceId::new();
        let span = root_span("monitor_run", &trace_id);
        span.record("watchlist_len", self.config.watchlist.len());

        self.run_inner(now, trace_id).instrument(span).await
    }

    async fn run_inner(&self, now: DateTime<Utc>, trace_id: TraceId) -> Result<RunOutcome, EngineError> {
        let settings = &self.config.monitoring;

        if !settings.enabled {
            debug!("monitoring disabled");
            return Ok(RunOutcome::Disabled);
        }

        if !self
            .gate
            .is_open(&now, self.config.markets(), settings.market_hours_only)
        {
            info!("outside trading hours; skipping");
            return Ok(RunOutcome::NonTrading);
        }

        if self.config.watchlist.is_empty() {
            warn!("watchlist is empty; nothing to monitor");
            return Ok(RunOutcome::EmptyWatchlist);
        }

        let codes = self.config.codes();
        let quotes = warn_if_slow("quote_fetch", SLOW_FETCH, self.source.fetch(&codes)).await?;
        info!(requested = codes.len(), received = quotes.len(), "quotes fetched");

        let mut cooldowns = CooldownStore::load(self.persistence.as_ref()).await;
        let mut alerts = Vec::new();
        let mut missing = Vec::new();

        for entry in &self.config.watchlist {
            let Some(quote) = quotes.get(&entry.code) else {
                warn!(code = %entry.code, "no quote returned; entry skipped");
                missing.push(entry.code.clone());
                continue;
            };

            let span = child_span("evaluate");
            span.record("code", entry.code.as_str());

            let fired = span.in_scope(|| {
                let fired = self.rules.evaluate(entry, quote, &mut cooldowns, now);
                if !fired.is_empty() {
                    info!(alerts = fired.len(), "alerts fired");
                }
                fired
            });
            alerts.extend(fired);
        }

        let pruned = cooldowns.prune(self.rules.windows().horizon(), now);
        if pruned > 0 {
            debug!(pruned, "expired cooldowns dropped");
        }

        let cooldown_committed = match cooldowns.commit(self.persistence.as_ref()).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = ?e, "cooldown commit failed; alerts may repeat next run");
                false
            }
        };

        let signals = self.signals.evaluate(&quotes);

        info!(
            alerts = alerts.len(),
            signals = signals.len(),
            missing = missing.len(),
            "monitor run complete"
        );

        Ok(RunOutcome::Completed(RunReport {
            generated_at: now,
            trace_id: trace_id.to_string(),
            quotes,
            alerts,
            signals,
            missing,
            cooldown_committed,
        }))
    }
}
