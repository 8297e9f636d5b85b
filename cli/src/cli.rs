use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use engine::{AppConfig, CooldownBackend};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendCli {
    Json,
    Sqlite,
}

#[derive(Debug, Parser)]
#[clap(name = "stock-monitor", version, about = "Watchlist price alerts for A-share and HK stocks")]
pub struct Cli {
    /// Monitor configuration (JSON)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Cooldown state file or database
    #[clap(long)]
    pub state: Option<PathBuf>,

    /// Cooldown persistence backend
    #[clap(long, value_enum)]
    pub backend: Option<BackendCli>,

    /// Print the run result as JSON instead of text
    #[clap(long)]
    pub json: bool,

    /// Repeat every N seconds instead of running once
    #[clap(long)]
    pub interval_secs: Option<u64>,
}

/// Convert CLI backend selection → persistence backend
pub(crate) fn cli_to_backend(b: BackendCli) -> CooldownBackend {
    match b {
        BackendCli::Json => CooldownBackend::JsonFile,
        BackendCli::Sqlite => CooldownBackend::Sqlite,
    }
}

/// Flags win over environment.
pub(crate) fn apply_overrides(cli: &Cli, mut app: AppConfig) -> AppConfig {
    if let Some(path) = &cli.config {
        app.config_path = path.clone();
    }
    if let Some(path) = &cli.state {
        app.state_path = path.clone();
    }
    if let Some(b) = cli.backend {
        app.cooldown_backend = cli_to_backend(b);
    }
    if let Some(secs) = cli.interval_secs {
        app.interval = (secs > 0).then(|| Duration::from_secs(secs));
    }
    app
}
