//! Lobby demo driver.
//!
//! Simulates the traffic a master server's transport layer would feed into
//! the presence subsystem: concurrent producers connect players, move them
//! in and out of sessions, and mirror the lifecycle into the stats
//! counters. Published snapshots and a final friend query are printed as
//! JSON so the debounce behavior is visible from a terminal.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use lobby_core::{LobbyConfig, StatsConfig, StatsSnapshot};
use lobby_runtime::{LobbyRuntime, SessionRef};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(
    name = "lobby",
    about = "Drive synthetic traffic through the lobby presence subsystem"
)]
struct Cli {
    /// Number of simulated players
    #[arg(long, default_value_t = 200)]
    players: usize,

    /// Number of concurrent producer tasks
    #[arg(long, default_value_t = 8)]
    producers: usize,

    /// Stats debounce window in milliseconds
    #[arg(long, default_value_t = 250)]
    publish_interval_ms: u64,

    /// How long to let the simulation settle, in milliseconds
    #[arg(long, default_value_t = 2000)]
    duration_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = LobbyConfig {
        stats: StatsConfig {
            publish_interval_ms: cli.publish_interval_ms,
        },
        ..LobbyConfig::default()
    };

    let (snapshot_tx, mut snapshot_rx) =
        mpsc::channel::<StatsSnapshot>(config.channels.snapshot_buffer_size);
    let runtime = LobbyRuntime::builder()
        .config(config)
        .stats_sink(snapshot_tx)
        .build()?;
    let runtime = Arc::new(runtime);

    info!(
        players = cli.players,
        producers = cli.producers,
        "starting simulation"
    );

    let printer = tokio::spawn(async move {
        let mut published = 0usize;
        while let Some(snapshot) = snapshot_rx.recv().await {
            published += 1;
            println!(
                "{}",
                serde_json::json!({
                    "event": "stats",
                    "peer_count": snapshot.peer_count,
                    "game_count": snapshot.game_count,
                })
            );
        }
        published
    });

    drive_traffic(runtime.clone(), cli.players, cli.producers).await;
    tokio::time::sleep(Duration::from_millis(cli.duration_ms)).await;

    // Sample a handful of players to show the friend-query path.
    let sample: Vec<String> = (0..5.min(cli.players))
        .map(|i| format!("player-{:04}", i))
        .collect();
    let response = runtime.presence().query_presence(sample.clone()).await?;
    println!(
        "{}",
        serde_json::json!({
            "event": "friends",
            "ids": sample,
            "online": response.online,
            "session_ids": response.session_ids,
        })
    );

    let mut runtime = Arc::try_unwrap(runtime)
        .map_err(|_| anyhow::anyhow!("runtime still shared at shutdown"))?;
    runtime.shutdown();
    // Dropping the runtime releases the snapshot sender so the printer can
    // drain and exit.
    drop(runtime);

    let published = printer.await?;
    info!(published, "simulation finished");
    Ok(())
}

/// Spread the player population across producer tasks; each producer owns
/// a disjoint slice so per-player event order is preserved while the
/// producers race each other, the same shape as real transport callbacks.
async fn drive_traffic(runtime: Arc<LobbyRuntime>, players: usize, producers: usize) {
    let producers = producers.max(1);
    let chunk = players.div_ceil(producers);
    let mut tasks = Vec::new();
    for p in 0..producers {
        let runtime = runtime.clone();
        tasks.push(tokio::spawn(async move {
            let start = p * chunk;
            let end = (start + chunk).min(players);
            for i in start..end {
                let player = format!("player-{:04}", i);
                let session = SessionRef::new(format!("game-{}", Uuid::new_v4()));
                runtime.presence().on_connected_to_master(player.clone());
                runtime.stats().increment_peer_count();
                if i % 2 == 0 {
                    runtime.presence().on_joined_session(player.clone(), session);
                    runtime.stats().increment_game_count();
                }
                if i % 5 == 0 {
                    runtime.presence().on_disconnected_from_master(player);
                    runtime.stats().decrement_peer_count();
                }
                tokio::task::yield_now().await;
            }
        }));
    }
    for task in tasks {
        let _ = task.await;
    }
}

/// Logging setup mirrors the library convention: the subscriber is owned
/// by the binary, the libraries only emit `tracing` events.
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}
