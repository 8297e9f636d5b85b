use std::fmt::Write;

use engine::{AlertLevel, RunOutcome, RunReport, SignalKind};

const MAX_SIGNALS: usize = 5;

pub fn render_text(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Disabled => "monitoring disabled; nothing to do".to_string(),
        RunOutcome::NonTrading => "📅 outside trading hours, monitoring paused".to_string(),
        RunOutcome::EmptyWatchlist => {
            "⚠️ watchlist is empty; add codes to the monitor config".to_string()
        }
        RunOutcome::Completed(report) => render_report(report),
    }
}

fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    let local = report.generated_at.with_timezone(&market::hours::EXCHANGE_OFFSET);

    let _ = writeln!(out, "📈 Monitor report {}", local.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "{}", "═".repeat(40));

    if report.alerts.is_empty() {
        let _ = writeln!(out, "✅ no alerts, market steady");
    } else {
        let _ = writeln!(out, "🚨 Alerts");
        for alert in &report.alerts {
            let _ = writeln!(out, "{} {}", level_marker(alert.level), alert.message);
            let _ = writeln!(out, "   {}", alert.detail);
            if let Some(action) = &alert.action {
                let _ = writeln!(out, "   💡 {action}");
            }
        }
    }
    out.push('\n');

    if !report.signals.is_empty() {
        let _ = writeln!(out, "📊 Short-term signals");
        for sig in report.signals.iter().take(MAX_SIGNALS) {
            let marker = match sig.signal {
                SignalKind::PotentialBuy | SignalKind::LimitUp => "🟢",
                SignalKind::ProfitTake | SignalKind::LimitDown => "🔴",
            };
            let _ = writeln!(out, "{marker} {}({}) - {}", sig.name, sig.code, sig.signal.label());
            let _ = writeln!(out, "   price {:.2} | {}", sig.price, sig.reason);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "📋 Watchlist");
    for (code, q) in &report.quotes {
        let marker = if q.change_pct > 0.0 {
            "🟢"
        } else if q.change_pct < 0.0 {
            "🔴"
        } else {
            "⚪"
        };
        let name: String = q.name.chars().take(8).collect();
        let _ = writeln!(
            out,
            "{marker} {code:<9} {name:<8} {:>8.2} ({:>+5.2}%)",
            q.current, q.change_pct
        );
    }

    if !report.missing.is_empty() {
        let _ = writeln!(out, "⚠️ no quote for: {}", report.missing.join(", "));
    }
    if !report.cooldown_committed {
        let _ = writeln!(out, "⚠️ cooldown state not saved; alerts may repeat");
    }

    out
}

fn level_marker(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Danger => "🔴",
        AlertLevel::Warning => "🟠",
        AlertLevel::Opportunity => "🟢",
        AlertLevel::Important | AlertLevel::Info => "🔵",
    }
}
