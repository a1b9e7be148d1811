//! Mixpla Console - headless player for Mixpla web radio.
//!
//! This binary tunes into a Mixpla station, keeps its status polled, wakes
//! it on demand and reports playback and station events to the terminal.
//! It uses the same core as richer UI shells, with the headless engine.

mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use mixpla_core::{
    bootstrap_services, AuthEvent, BroadcastEvent, DirectoryEvent, PlayerEvent, PlayerPrefs,
    RadioServices, StationEvent, StationPhase, StationView,
};
use tokio::signal;
use tokio::sync::broadcast;

use crate::config::ConsoleConfig;

/// Mixpla Console - headless web radio player.
#[derive(Parser, Debug)]
#[command(name = "mixpla-console")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "MIXPLA_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Backend base URL (overrides config file).
    #[arg(short, long)]
    base_url: Option<String>,

    /// Station slug to tune into (overrides config file).
    #[arg(short, long, env = "MIXPLA_STATION")]
    station: Option<String>,

    /// Data directory for persistent state (player preferences).
    #[arg(short, long, env = "MIXPLA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Wake the station if it is asleep.
    #[arg(short, long)]
    wake: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Mixpla Console v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        ConsoleConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(station) = args.station {
        config.station = Some(station);
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = Some(data_dir);
    }

    log::info!("Configuration: base_url={}", config.base_url);

    let prefs = match &config.data_dir {
        Some(data_dir) => {
            log::info!("Using data directory: {}", data_dir.display());
            PlayerPrefs::load(data_dir)
        }
        None => {
            log::info!("No data directory configured - preferences will not persist");
            PlayerPrefs::default()
        }
    };

    // Bootstrap services
    let core_config = config.to_core_config();
    let services = bootstrap_services(&core_config).context("Failed to bootstrap services")?;

    log::info!("Services bootstrapped successfully");

    // Subscribe before starting background tasks so the initial directory
    // refresh cannot be missed.
    let directory_events = services.broadcast_tx.subscribe();
    spawn_event_reporter(&services);
    spawn_view_reporter(&services);

    services.start_background_tasks();

    // Resolve which station to tune into: CLI/config, then persisted
    // preference, then the first directory entry.
    let station = resolve_station(&services, config.station.clone(), &prefs, directory_events)
        .await
        .context("No station available to tune into")?;

    log::info!("Tuning into station '{}'", station);
    services
        .select_station(&station)
        .context("Failed to select station")?;

    if let Some(ref data_dir) = config.data_dir {
        if let Err(err) = PlayerPrefs::set_last_station_atomic(data_dir, &station) {
            log::warn!("Failed to persist last station: {}", err);
        }
    }

    // Act on the first status: play, or report that the station sleeps.
    match wait_for_first_status(&services, Duration::from_secs(10)).await {
        Some(view) if view.phase == StationPhase::Asleep && !args.wake => {
            log::info!(
                "Station '{}' is asleep. Run with --wake to wake it up.",
                station
            );
        }
        Some(_) => {
            if let Err(err) = services.press_play().await {
                log::error!("Play failed: {}", err);
            }
        }
        None => {
            log::warn!("No station status received yet, continuing in the background");
        }
    }

    // Wait for shutdown signal
    shutdown_signal().await;

    log::info!("Shutdown signal received, cleaning up...");

    // Graceful shutdown
    services.shutdown().await;

    log::info!("Shutdown complete");
    Ok(())
}

/// Picks the station to tune into.
///
/// Without an explicit or remembered station, waits for the first directory
/// refresh and takes its first entry.
async fn resolve_station(
    services: &RadioServices,
    configured: Option<String>,
    prefs: &PlayerPrefs,
    mut events: broadcast::Receiver<BroadcastEvent>,
) -> Option<String> {
    if let Some(slug) = configured {
        return Some(slug);
    }
    if let Some(last) = &prefs.last_station {
        log::info!("Resuming last station '{}'", last);
        return Some(last.clone());
    }

    if let Some(first) = services.directory.all().first() {
        return Some(first.slug_name.clone());
    }

    log::info!("Waiting for the station directory...");
    let refreshed = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match events.recv().await {
                Ok(BroadcastEvent::Directory(DirectoryEvent::Updated { .. })) => break,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
    .await;

    if refreshed.is_err() {
        log::warn!("Station directory did not load within 10s");
    }
    services
        .directory
        .all()
        .first()
        .map(|summary| summary.slug_name.clone())
}

/// Waits until the store holds a real status, or the limit passes.
async fn wait_for_first_status(services: &RadioServices, limit: Duration) -> Option<StationView> {
    let mut rx = services.store.subscribe();
    tokio::time::timeout(limit, async move {
        loop {
            {
                let view = rx.borrow().clone();
                if view.last_updated_ms > 0 {
                    return view;
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    })
    .await
    .ok()
}

/// Forwards broadcast events to the log at sensible levels.
fn spawn_event_reporter(services: &RadioServices) {
    let mut events = services.broadcast_tx.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => report_event(&event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    log::warn!("Event stream lagged, {} events dropped", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// Prints the station line whenever the observed state changes.
fn spawn_view_reporter(services: &RadioServices) {
    let mut rx = services.store.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let view = rx.borrow().clone();
            if view.last_updated_ms == 0 {
                continue;
            }
            match &view.now_playing {
                Some(title) => {
                    log::info!("[{}] {} | {} | {}", view.slug, view.phase, title, view.status_line)
                }
                None => log::info!("[{}] {} | {}", view.slug, view.phase, view.status_line),
            }
        }
    });
}

fn report_event(event: &BroadcastEvent) {
    match event {
        BroadcastEvent::Station(station) => match station {
            StationEvent::WakeRequested { slug, .. } => {
                log::info!("Wake-up requested for '{}'", slug);
            }
            StationEvent::WakeFailed { slug, error, .. } => {
                log::warn!("Wake-up for '{}' failed: {}", slug, error);
            }
            StationEvent::WarmupTimedOut { slug, .. } => {
                log::warn!("Station '{}' did not come on air in time", slug);
            }
            StationEvent::PollingStopped { slug, reason, .. } => {
                log::info!("Stopped watching '{}' ({})", slug, reason);
            }
            // The view reporter already covers phase and title changes.
            StationEvent::PhaseChanged { .. } | StationEvent::NowPlayingChanged { .. } => {
                log::debug!("{:?}", station);
            }
        },
        BroadcastEvent::Player(player) => match player {
            PlayerEvent::PhaseChanged {
                phase,
                message: Some(message),
                ..
            } => log::warn!("Playback {}: {}", phase, message),
            PlayerEvent::PhaseChanged { phase, .. } => log::info!("Playback {}", phase),
            PlayerEvent::TrackTitle { title, .. } => log::info!("Now playing: {}", title),
            PlayerEvent::RecoveryScheduled {
                attempt, delay_ms, ..
            } => log::info!("Stream recovery attempt {} in {}ms", attempt, delay_ms),
            PlayerEvent::RecoveryExhausted { message, .. } => {
                log::error!("Stream recovery exhausted: {}", message);
            }
            PlayerEvent::MediaRecovery { .. } => log::info!("Recovered from a media error"),
            PlayerEvent::StallRecovery { trigger, .. } => {
                log::info!("Restarted stream loading ({})", trigger);
            }
            PlayerEvent::ManifestLoaded { .. } => log::debug!("Stream manifest loaded"),
        },
        BroadcastEvent::Directory(DirectoryEvent::Updated { stations, .. }) => {
            log::info!("Station directory updated: {} stations", stations.len());
        }
        BroadcastEvent::Auth(AuthEvent::LoginRequired { reason, .. }) => {
            log::error!("Authentication required: {}", reason);
        }
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
