//! Tournament poker server for network bots and spectators.
//!
//! Spawns one coordinator task over the configured table and puts an
//! HTTP/WebSocket face on it.

use anyhow::Error;
use ctrlc::set_handler;
use log::{error, info};
use pico_args::Arguments;
use std::net::SocketAddr;
use tourney_poker::{AutoCaller, Coordinator, CoordinatorHandle, RankScorer};

use tp_server::api;
use tp_server::config::ServerConfig;

const HELP: &str = "\
Run a multi-tournament poker coordinator for network bots

USAGE:
  tp_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT    Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]

FLAGS:
  -h, --help              Print help information

ENVIRONMENT:
  SERVER_BIND             Server bind address (e.g., 0.0.0.0:8080)
  TABLE_SEATS             Players required before play starts  [default: 3]
  MIN_SPECTATORS          Spectators required before play starts  [default: 0]
  TOURNAMENTS             Tournaments played back to back  [default: 1]
  STARTING_CHIPS          Chips per player per tournament  [default: 10000]
  MIN_RAISE               Base per-street wager  [default: 200]
  RAISE_RATE              Hands between blind doublings  [default: 20]
  ACK_TIMEOUT_SECS        Seconds before a silent spectator is dropped  [default: 30]
";

struct Args {
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
    };

    // Catching signals for exit; the termination feature covers
    // SIGTERM as well as Ctrl+C.
    let (stop_tx, stop_rx) = std::sync::mpsc::channel::<()>();
    set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    env_logger::builder().format_target(false).init();

    let config = ServerConfig::from_env(args.bind)?;
    config.validate()?;
    info!(
        "starting coordinator: {} seats, {} tournament(s), {} starting chips",
        config.game.seats, config.game.tournaments, config.game.starting_chips
    );

    let (coordinator, handle) = Coordinator::new(
        config.game.clone(),
        Box::new(AutoCaller),
        Box::new(RankScorer),
    );
    let coordinator_task = tokio::spawn(async move {
        if let Err(e) = coordinator.run().await {
            error!("coordinator failed: {e}");
        }
    });

    let state = api::AppState {
        handle: handle.clone(),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(handle, stop_rx))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    // Give the coordinator its chance to broadcast the shutdown notice.
    let _ = coordinator_task.await;
    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown: tell the coordinator first so spectators get
/// their shutdown notice before sockets drop.
async fn shutdown_signal(handle: CoordinatorHandle, stop: std::sync::mpsc::Receiver<()>) {
    let _ = tokio::task::spawn_blocking(move || stop.recv()).await;
    handle.shutdown().await;
}
