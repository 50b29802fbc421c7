//! Dashcam simulator – serves a local card directory over the dashcam API.
//!
//! This binary:
//! 1. Reads configuration from `dashcam.conf` (if present)
//! 2. Creates the card directory with one folder per category
//! 3. Runs the axum HTTP server until Ctrl-C

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use dashcam_common::config::{self, Config};
use dashcam_common::Category;
use dashcam_sim::DeviceState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── load config ──────────────────────────────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => config::load(&PathBuf::from(path)).context("Config load failed")?,
        None if Path::new(Config::default_path()).exists() => {
            config::load(Path::new(Config::default_path())).context("Config load failed")?
        }
        None => Config::default(),
    };

    info!(
        "Dashcam simulator starting (listen={}, card={})",
        config.sim_listen_addr,
        config.sim_card_dir.display()
    );

    for category in Category::ALL {
        let dir = config.sim_card_dir.join(category.device_code());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create {}", dir.display()))?;
    }

    // ── ctrl-c ───────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_flag.store(true, Ordering::Relaxed);
        info!("Shutdown signal received");
    })
    .context("Cannot set Ctrl-C handler")?;

    // ── serve ────────────────────────────────────────────────────────
    let state =
        DeviceState::new(config.sim_card_dir.clone()).with_rec_settle(config.sim_rec_settle);
    dashcam_sim::run(state, &config.sim_listen_addr, shutdown).await?;

    info!("Dashcam simulator stopped");
    Ok(())
}
