//! admute - Main entry point
//!
//! Startup sequencing: logging, CLI, configuration resolution, session-bus
//! subscription, then three tasks (watcher, transition engine, liveness poll)
//! until one of them asks for shutdown.
//!
//! Exit codes: 0 on normal shutdown, `--version`, or when the player process
//! disappears; 4 on configuration validation or bus subscription failure.

use std::path::{Path, PathBuf};

use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admute::config::{ConfigStore, EffectiveConfig};
use admute::engine::TrackTransitionEngine;
use admute::error::{ConfigError, Error};
use admute::liveness;
use admute::mixer::AmixerExecutor;
use admute::notify::DesktopNotifier;
use admute::strategy::{build_strategy, StrategyHooks};
use admute::watcher::PlaybackSignalWatcher;

const FATAL_EXIT_CODE: i32 = 4;

/// Command-line arguments for admute
#[derive(Parser, Debug)]
#[command(name = "admute")]
#[command(about = "Mute Spotify advertisements")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "ADMUTE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "admute=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments (--version is handled here, exit 0)
    let args = Args::parse();

    let config = load_configuration(args.config.as_deref());
    let effective = config.resolve();

    info!(
        "This is {} version {}.",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    log_effective_configuration(&effective);

    if let Err(err) = run(effective).await {
        error!("{err}. Exiting.");
        std::process::exit(FATAL_EXIT_CODE);
    }
}

/// Load the configuration, falling back to compiled-in defaults
///
/// A missing file (or no `--config` at all) degrades to defaults with a
/// warning; any validation failure is fatal with exit code 4.
fn load_configuration(path: Option<&Path>) -> ConfigStore {
    let Some(path) = path else {
        warn!("No configuration file specified. Using default configuration.");
        return ConfigStore::default();
    };

    match ConfigStore::parse(path) {
        Ok(store) => {
            info!("Loaded configuration from \"{}\"", path.display());
            store
        }
        Err(ConfigError::FileNotFound { .. }) => {
            warn!(
                "Configuration file \"{}\" not found. Using default configuration.",
                path.display()
            );
            ConfigStore::default()
        }
        Err(err) => {
            error!("{err}. Exiting.");
            std::process::exit(FATAL_EXIT_CODE);
        }
    }
}

fn log_effective_configuration(effective: &EffectiveConfig) {
    let entries = effective.entries();
    let width = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    info!("Current configuration is:");
    for (key, value) in entries {
        info!("  {key:<width$} = {value}");
    }
}

async fn run(effective: EffectiveConfig) -> admute::Result<()> {
    let conn = zbus::Connection::session()
        .await
        .map_err(|err| Error::Subscription(err.to_string()))?;

    let watcher = PlaybackSignalWatcher::connect(&conn).await?;
    let notifier = DesktopNotifier::new(&conn)
        .await
        .map_err(|err| Error::Subscription(err.to_string()))?;

    let strategy = build_strategy(effective.mode, Box::new(AmixerExecutor));
    let hooks = StrategyHooks::new(strategy, Box::new(notifier), &effective);
    let engine = TrackTransitionEngine::new(hooks);

    let (tx, rx) = mpsc::channel(64);
    let watch_task = tokio::spawn(watcher.watch(tx));
    let engine_task = tokio::spawn(engine.run(rx));

    tokio::select! {
        _ = liveness::player_exited(liveness::PLAYER_PROCESS_NAME) => {
            info!("Player exited, shutting down");
        }
        _ = shutdown_signal() => {}
        _ = watch_task => {
            info!("Property change stream ended, shutting down");
        }
    }

    // No unmute-on-exit guarantee: a pending delayed unmute is dropped here
    engine_task.abort();
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
