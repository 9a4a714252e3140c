//! `tagnav` – AprilTag pose-fusion node.
//!
//! This binary wires the stack together:
//!
//! 1. Loads `~/.tagnav/config.toml` (defaults apply when it is absent).
//! 2. Builds the static [`FrameRegistry`] from the camera mount and the
//!    surveyed tag table.
//! 3. Starts the event bus and the fusion loop: raw detection batches in on
//!    `RawTags`, per-tag reports out on `VisibleTags`, absolute position
//!    estimates out on `VehiclePosition`.
//! 4. Runs until Ctrl-C.

mod config;
mod node;

use std::sync::Arc;

use tracing::{error, info};

use tagnav_geometry::registry::FrameRegistry;
use tagnav_middleware::EventBus;

#[tokio::main]
async fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // Initialise tracing-subscriber using RUST_LOG (defaults to "info").
    // Set TAGNAV_LOG_FORMAT=json to emit newline-delimited JSON logs
    // suitable for log aggregators.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("TAGNAV_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            info!(path = %config::config_path().display(), "config loaded");
            cfg
        }
        Ok(None) => {
            info!("no config file, using defaults");
            config::Config::default()
        }
        Err(e) => {
            error!(error = %e, "config unreadable");
            std::process::exit(1);
        }
    };

    // ── Frame registry ────────────────────────────────────────────────────
    let registry = match FrameRegistry::new(&cfg.nav_config()) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!(error = %e, "invalid camera mount or tag table");
            std::process::exit(1);
        }
    };
    info!(
        tags = cfg.nav_config().tag_truth.len(),
        "frame registry ready"
    );

    // The capture pipeline itself runs in the detector process; log the
    // connection string the configuration resolves to so a mismatch is
    // visible from this side.
    info!(pipeline = %cfg.capture_config().pipeline(), "capture configuration");

    // ── Fusion loop ───────────────────────────────────────────────────────
    let bus = EventBus::new(cfg.bus_capacity);
    let fusion = tokio::spawn(node::run(bus.clone(), registry));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
        _ = fusion => {
            error!("fusion loop exited unexpectedly");
        }
    }
}
