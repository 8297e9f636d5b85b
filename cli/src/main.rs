pub mod cli;
mod report;

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use cli::*;
use common::logger::init_logger;
use cooldown::CooldownPersistence;
use cooldown::persistence::{JsonFileCooldownStore, SqliteCooldownStore};
use engine::{AppConfig, CooldownBackend, MonitorConfig, MonitorRun, RunOutcome};
use market::sina::SinaQuoteSource;
use market::tencent::TencentQuoteSource;
use market::{FallbackQuoteSource, QuoteSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = apply_overrides(&cli, AppConfig::from_env());

    init_logger("stock-monitor", app.json_logs);

    let config = Arc::new(MonitorConfig::load_or_default(&app.config_path));
    let source = build_source(&app)?;
    let persistence = build_persistence(&app).await?;

    let monitor = MonitorRun::new(config, source, persistence);

    let Some(period) = app.interval else {
        let outcome = monitor.run(Utc::now()).await.context("monitor run failed")?;
        print_outcome(&outcome, cli.json)?;
        return Ok(());
    };

    info!(interval_secs = period.as_secs(), "starting monitor loop");

    // Skipped ticks keep a slow run from overlapping the next one.
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match monitor.run(Utc::now()).await {
                    Ok(outcome) => print_outcome(&outcome, cli.json)?,
                    Err(e) => error!(error = %e, "monitor run failed; retrying next tick"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }

    Ok(())
}

/// Tencent first, Sina as the A-share fallback.
fn build_source(app: &AppConfig) -> anyhow::Result<Arc<dyn QuoteSource>> {
    let tencent = TencentQuoteSource::new(app.tencent_endpoint.clone(), app.fetch_timeout)
        .context("building tencent quote client")?;
    let sina = SinaQuoteSource::new(app.sina_endpoint.clone(), app.fetch_timeout)
        .context("building sina quote client")?;

    let sources: Vec<Arc<dyn QuoteSource>> = vec![Arc::new(tencent), Arc::new(sina)];
    Ok(Arc::new(FallbackQuoteSource::new(sources)))
}

async fn build_persistence(app: &AppConfig) -> anyhow::Result<Arc<dyn CooldownPersistence>> {
    Ok(match app.cooldown_backend {
        CooldownBackend::JsonFile => Arc::new(JsonFileCooldownStore::new(app.state_path.clone())),
        CooldownBackend::Sqlite => Arc::new(
            SqliteCooldownStore::open(&app.state_path)
                .await
                .with_context(|| format!("opening cooldown database {}", app.state_path.display()))?,
        ),
    })
}

fn print_outcome(outcome: &RunOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        println!("{}", report::render_text(outcome));
    }
    Ok(())
}
