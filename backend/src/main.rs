//! Wayfare backend server.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use wayfare::{config::Config, create_app_with_state, state::AppState};

/// Wayfare - Travel planning tool gateway
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Heartbeat interval for streaming connections, in seconds
    #[arg(long)]
    keepalive_secs: Option<u64>,

    /// Return tool results in the POST response instead of pushing them
    /// onto the session stream
    #[arg(long)]
    sync_messages: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_figment(
        args.port,
        args.keepalive_secs,
        args.sync_messages.then_some(true),
    )?;

    // Diagnostics go to the subscriber only; the SSE data stream is never
    // shared with log output.
    let default_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    info!("Starting Wayfare gateway...");
    info!(
        "Keepalive interval: {}s, sync messages: {}",
        config.keepalive_secs, config.sync_messages
    );

    let state = AppState::new(&config);

    // Backstop sweep for sessions whose teardown never ran.
    let sweeper_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        interval.tick().await;
        loop {
            interval.tick().await;
            let swept = sweeper_state
                .sessions()
                .cleanup_stale(sweeper_state.settings().session_max_age_secs);
            if swept > 0 {
                info!("Swept {} stale sessions", swept);
            }
        }
    });

    let app = create_app_with_state(state).await;

    // Bind to 0.0.0.0 to be accessible from all interfaces (Docker, etc.)
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down gracefully...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}
