//! mdcast - Synthetic Market Data Multicaster
//!
//! Walks a small universe of instrument prices and emits fixed 72-byte
//! binary tick datagrams over UDP multicast, for exercising feed handlers
//! without a live exchange connection.
//!
//! Usage:
//!   mdcast --rate 100 --duration 60
//!
//! Environment:
//!   MDCAST_GROUP    - Multicast group address (default: 239.255.0.1)
//!   MDCAST_PORT     - Destination port (default: 12345)
//!   MDCAST_RATE     - Ticks per second (default: 10)
//!   MDCAST_DURATION - Run length in seconds, 0 = unbounded (default: 0)
//!   MDCAST_TTL      - Multicast hop limit (default: 2)
//!   MDCAST_SEED     - RNG seed for reproducible runs (optional)

use std::net::IpAddr;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use mdcast::feed::{default_universe, Emitter, EmitterConfig};

#[derive(Parser, Debug)]
#[command(name = "mdcast")]
#[command(about = "Synthetic market data generator - multicast binary ticks")]
struct Args {
    /// Multicast group address
    #[arg(long, env = "MDCAST_GROUP", default_value = "239.255.0.1")]
    group: IpAddr,

    /// Destination port
    #[arg(long, env = "MDCAST_PORT", default_value = "12345")]
    port: u16,

    /// Ticks per second
    #[arg(long, env = "MDCAST_RATE", default_value = "10")]
    rate: u32,

    /// Duration in seconds (0 = unbounded)
    #[arg(long, env = "MDCAST_DURATION", default_value = "0")]
    duration: u64,

    /// Multicast hop limit
    #[arg(long, env = "MDCAST_TTL", default_value = "2")]
    ttl: u32,

    /// RNG seed for reproducible runs
    #[arg(long, env = "MDCAST_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("mdcast=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    info!("Starting market data generator");
    info!("  Multicast: {}:{}", args.group, args.port);
    info!("  Rate: {} ticks/sec", args.rate);
    info!(
        "  Duration: {}",
        if args.duration == 0 {
            "unbounded".to_string()
        } else {
            format!("{}s", args.duration)
        }
    );

    let config = EmitterConfig {
        group: args.group,
        port: args.port,
        rate: args.rate,
        duration_secs: args.duration,
        multicast_ttl: args.ttl,
        seed: args.seed,
    };

    let emitter = Emitter::new(config, default_universe())?;

    // Ctrl-C requests cooperative interruption; the loop finalizes itself.
    let emitter_for_signal = emitter.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        emitter_for_signal.stop();
    });

    let summary = emitter.run().await?;

    info!(
        "Total ticks sent: {} ({:.1} ticks/sec average)",
        summary.ticks_sent, summary.avg_rate
    );

    Ok(())
}
