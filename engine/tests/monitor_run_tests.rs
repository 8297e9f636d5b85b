use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tokio::test;

use engine::{AlertKind, EngineError, MonitorConfig, MonitorRun, RunOutcome, SignalKind};
use market::sina::SinaQuoteSource;
use market::tencent::TencentQuoteSource;
use market::{FallbackQuoteSource, QuoteError, QuoteMap, QuoteSource};

use mock_source::{FixedSource, quote};
use mock_store::{InMemoryCooldownPersistence, ReadOnlyPersistence};

/// Monday 2024-06-17 10:00 at the exchange.
fn trading_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 17, 2, 0, 0).single().unwrap()
}

/// Saturday 2024-06-15 10:00 at the exchange.
fn saturday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 2, 0, 0).single().unwrap()
}

fn config(raw: &str) -> Arc<MonitorConfig> {
    Arc::new(MonitorConfig::from_json(raw).unwrap())
}

const SURGE_WATCH: &str = r#"{
    "monitoring": { "enabled": true, "market_hours_only": true },
    "watchlist": [ { "code": "sh600000", "alerts": { "change_pct_above": 5 } } ]
}"#;

fn surging_quotes() -> QuoteMap {
    let mut quotes = QuoteMap::new();
    // +9.09% with a 6% range off an 11.00 open
    quotes.insert("sh600000".into(), quote("PF Bank", 12.0, 11.0, 12.0, 11.34, 11.0));
    quotes
}

#[test]
async fn disabled_monitor_is_a_no_op() -> anyhow::Result<()> {
    let source = Arc::new(FixedSource::new(surging_quotes()));
    let store = Arc::new(InMemoryCooldownPersistence::default());
    let run = MonitorRun::new(
        config(r#"{ "watchlist": [ { "code": "sh600000" } ] }"#),
        source.clone(),
        store.clone(),
    );

    assert_eq!(run.run(trading_now()).await?, RunOutcome::Disabled);
    assert_eq!(source.calls(), 0);
    assert_eq!(*store.saves.lock().await, 0);
    Ok(())
}

#[test]
async fn closed_market_skips_fetch() -> anyhow::Result<()> {
    let source = Arc::new(FixedSource::new(surging_quotes()));
    let run = MonitorRun::new(
        config(SURGE_WATCH),
        source.clone(),
        Arc::new(InMemoryCooldownPersistence::default()),
    );

    assert_eq!(run.run(saturday()).await?, RunOutcome::NonTrading);
    assert_eq!(source.calls(), 0);
    Ok(())
}

#[test]
async fn market_hours_only_off_runs_on_weekends() -> anyhow::Result<()> {
    let raw = SURGE_WATCH.replace("\"market_hours_only\": true", "\"market_hours_only\": false");
    let source = Arc::new(FixedSource::new(surging_quotes()));
    let run = MonitorRun::new(
        config(&raw),
        source.clone(),
        Arc::new(InMemoryCooldownPersistence::default()),
    );

    assert!(matches!(run.run(saturday()).await?, RunOutcome::Completed(_)));
    assert_eq!(source.calls(), 1);
    Ok(())
}

#[test]
async fn empty_watchlist_skips_fetch() -> anyhow::Result<()> {
    let source = Arc::new(FixedSource::new(QuoteMap::new()));
    let run = MonitorRun::new(
        config(r#"{ "monitoring": { "enabled": true }, "watchlist": [] }"#),
        source.clone(),
        Arc::new(InMemoryCooldownPersistence::default()),
    );

    assert_eq!(run.run(trading_now()).await?, RunOutcome::EmptyWatchlist);
    assert_eq!(source.calls(), 0);
    Ok(())
}

#[test]
async fn fetch_failure_leaves_cooldowns_untouched() -> anyhow::Result<()> {
    let before = [("sh600000_up_7", "2024-06-17T01:50:00.000Z")];
    let store = Arc::new(InMemoryCooldownPersistence::seeded(&before));
    let run = MonitorRun::new(config(SURGE_WATCH), Arc::new(FixedSource::failing()), store.clone());

    let err = run.run(trading_now()).await.unwrap_err();
    assert!(matches!(err, EngineError::Fetch(_)));

    assert_eq!(*store.saves.lock().await, 0);
    let persisted = store.map.lock().await.clone();
    assert_eq!(persisted.len(), 1);
    assert_eq!(
        persisted.get("sh600000_up_7").map(String::as_str),
        Some("2024-06-17T01:50:00.000Z")
    );
    Ok(())
}

#[test]
async fn end_to_end_surge_run() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryCooldownPersistence::default());
    let run = MonitorRun::new(
        config(SURGE_WATCH),
        Arc::new(FixedSource::new(surging_quotes())),
        store.clone(),
    );

    let RunOutcome::Completed(report) = run.run(trading_now()).await? else {
        panic!("expected a completed run");
    };

    let kinds: Vec<AlertKind> = report.alerts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AlertKind::Surge, AlertKind::Volatile]);
    assert_eq!(report.alerts[0].key, "sh600000_up_9");
    assert_eq!(report.alerts[1].key, "sh600000_volatile");

    let signals: Vec<SignalKind> = report.signals.iter().map(|s| s.signal).collect();
    assert_eq!(signals, vec![SignalKind::ProfitTake]);

    assert!(report.cooldown_committed);
    assert!(report.missing.is_empty());
    assert_eq!(report.quotes.len(), 1);

    assert_eq!(*store.saves.lock().await, 1);
    let persisted = store.map.lock().await.clone();
    assert!(persisted.contains_key("sh600000_up_9"));
    assert!(persisted.contains_key("sh600000_volatile"));
    Ok(())
}

#[test]
async fn second_run_inside_window_is_suppressed() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryCooldownPersistence::default());
    let run = MonitorRun::new(
        config(SURGE_WATCH),
        Arc::new(FixedSource::new(surging_quotes())),
        store.clone(),
    );

    run.run(trading_now()).await?;
    let RunOutcome::Completed(again) = run.run(trading_now() + TimeDelta::minutes(5)).await? else {
        panic!("expected a completed run");
    };

    assert!(again.alerts.is_empty());
    // signals are never deduplicated
    assert_eq!(again.signals.len(), 1);
    assert_eq!(*store.saves.lock().await, 2);
    Ok(())
}

#[test]
async fn missing_quotes_are_skipped_and_reported() -> anyhow::Result<()> {
    let raw = r#"{
        "monitoring": { "enabled": true },
        "watchlist": [
            { "code": "sz000001", "alerts": { "price_above": 1 } },
            { "code": "sh600000", "alerts": { "change_pct_above": 5 } }
        ]
    }"#;
    let run = MonitorRun::new(
        config(raw),
        Arc::new(FixedSource::new(surging_quotes())),
        Arc::new(InMemoryCooldownPersistence::default()),
    );

    let RunOutcome::Completed(report) = run.run(trading_now()).await? else {
        panic!("expected a completed run");
    };

    assert_eq!(report.missing, vec!["sz000001".to_string()]);
    assert!(report.alerts.iter().all(|a| a.code == "sh600000"));
    Ok(())
}

#[test]
async fn commit_failure_still_reports_alerts() -> anyhow::Result<()> {
    let run = MonitorRun::new(
        config(SURGE_WATCH),
        Arc::new(FixedSource::new(surging_quotes())),
        Arc::new(ReadOnlyPersistence),
    );

    let RunOutcome::Completed(report) = run.run(trading_now()).await? else {
        panic!("expected a completed run");
    };

    assert!(!report.cooldown_committed);
    assert_eq!(report.alerts.len(), 2);
    Ok(())
}

#[test]
async fn expired_records_are_pruned_on_commit() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryCooldownPersistence::seeded(&[
        ("sz000002_price_above", "2024-06-10T02:00:00.000Z"),
        ("sh600000_price_below", "2024-06-17T01:30:00.000Z"),
    ]));
    let run = MonitorRun::new(
        config(SURGE_WATCH),
        Arc::new(FixedSource::new(surging_quotes())),
        store.clone(),
    );

    run.run(trading_now()).await?;

    let persisted = store.map.lock().await.clone();
    assert!(!persisted.contains_key("sz000002_price_above"));
    assert!(persisted.contains_key("sh600000_price_below"));
    Ok(())
}

/// Real vendor clients pointed at a closed local port, behind the fallback.
fn unreachable_vendors() -> Arc<dyn QuoteSource> {
    let dead = "http://127.0.0.1:9".to_string();
    let timeout = Duration::from_secs(1);
    let sources: Vec<Arc<dyn QuoteSource>> = vec![
        Arc::new(TencentQuoteSource::new(dead.clone(), timeout).unwrap()),
        Arc::new(SinaQuoteSource::new(dead, timeout).unwrap()),
    ];
    Arc::new(FallbackQuoteSource::new(sources))
}

async fn assert_outage_keeps_state(raw: &str, seeded: &[(&str, &str)]) -> anyhow::Result<()> {
    let store = Arc::new(InMemoryCooldownPersistence::seeded(seeded));
    let run = MonitorRun::new(config(raw), unreachable_vendors(), store.clone());

    let err = run.run(trading_now()).await.unwrap_err();
    assert!(matches!(err, EngineError::Fetch(QuoteError::AllSourcesFailed(_))));

    assert_eq!(*store.saves.lock().await, 0);
    let persisted = store.map.lock().await.clone();
    assert_eq!(persisted.len(), seeded.len());
    for (key, ts) in seeded {
        assert_eq!(persisted.get(*key).map(String::as_str), Some(*ts));
    }
    Ok(())
}

#[test]
async fn hk_only_outage_through_fallback_is_a_fetch_error() -> anyhow::Result<()> {
    let raw = r#"{
        "monitoring": { "enabled": true, "market_hours_only": false },
        "watchlist": [ { "code": "hk00700", "alerts": { "change_pct_below": -4 } } ]
    }"#;
    assert_outage_keeps_state(raw, &[("hk00700_volatile", "2024-06-17T01:40:00.000Z")]).await
}

#[test]
async fn mixed_outage_through_fallback_is_a_fetch_error() -> anyhow::Result<()> {
    let raw = r#"{
        "monitoring": { "enabled": true, "market_hours_only": false },
        "watchlist": [
            { "code": "sh600000", "alerts": { "change_pct_above": 5 } },
            { "code": "hk00700" }
        ]
    }"#;
    assert_outage_keeps_state(
        raw,
        &[
            ("sh600000_up_7", "2024-06-17T01:50:00.000Z"),
            ("hk00700_volatile", "2024-06-17T01:40:00.000Z"),
        ],
    )
    .await
}
