use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::core::{
    alerts::{engine::AlertEngine, reconcile::RefreshSummary, store::SqliteAlertStore},
    config::ConfigManager,
    sources::json::JsonSourceDir,
};

/// Recompute HR alerts from the exported datasets and sync the alert table.
#[derive(Debug, Parser)]
#[command(name = "hr-alerts", version)]
pub struct Args {
    /// Directory holding settings.json; relative paths in it resolve here
    #[arg(long, env = "HR_ALERTS_CONFIG", default_value = ".")]
    pub config: PathBuf,

    /// Evaluate rules as of this date instead of the local date
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log: String,
}

pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new().parse_filters(&args.log).init();

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let summary = refresh_once(&args.config, today)?;
    println!("{}", summary.active);
    Ok(())
}

/// One refresh pass driven by the settings in `config_dir`.
///
/// A missing settings file is created with defaults so it can be edited.
pub fn refresh_once(config_dir: &Path, today: NaiveDate) -> anyhow::Result<RefreshSummary> {
    let config_manager = ConfigManager::new(config_dir.to_path_buf());
    let settings = config_manager.load();
    if !config_dir.join("settings.json").exists() {
        config_manager
            .save(&settings)
            .with_context(|| format!("failed to write default settings to {}", config_dir.display()))?;
        log::info!("Wrote default settings to {}", config_dir.display());
    }

    let reader = JsonSourceDir::new(config_manager.resolve(&settings.data_dir));
    let db_path = config_manager.resolve(&settings.alert_db);
    let mut store = SqliteAlertStore::open(&db_path)
        .with_context(|| format!("failed to open alert store {}", db_path.display()))?;

    let engine = AlertEngine::new(settings.alert_settings);
    engine
        .refresh(&reader, &mut store, today)
        .with_context(|| format!("alert refresh from {} failed", reader.data_dir().display()))
}
