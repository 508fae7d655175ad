//! Tick emitter.
//!
//! Owns the instrument universe and the UDP socket, and drives the timed
//! emission loop: pick an instrument, walk its price, encode a tick, send
//! one datagram. Delivery is best-effort multicast; send failures are
//! counted, never fatal.

use std::{
    net::{IpAddr, SocketAddr, UdpSocket},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::time::{interval, Instant};
use tracing::{debug, info};

use super::instrument::{ConfigError, Instrument};
use super::wire::{MarketTick, TICK_SIZE};

/// Configuration for the emitter
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Destination group address (multicast by default)
    pub group: IpAddr,
    /// Destination port
    pub port: u16,
    /// Ticks per second
    pub rate: u32,
    /// Run length in seconds (0 = unbounded)
    pub duration_secs: u64,
    /// Multicast hop limit, keeps test traffic on the local segment
    pub multicast_ttl: u32,
    /// RNG seed for reproducible runs (entropy-seeded when unset)
    pub seed: Option<u64>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            group: "239.255.0.1".parse().unwrap(),
            port: 12345,
            rate: 10,
            duration_secs: 0,
            multicast_ttl: 2,
            seed: None,
        }
    }
}

/// Emitter lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum EmitterState {
    Idle,
    Running,
    /// Duration bound reached, loop exited on its own.
    Stopped,
    /// External stop request observed mid-run.
    Interrupted,
}

/// Emitter statistics
#[derive(Debug, Default)]
pub struct EmitterStats {
    pub ticks_sent: AtomicU64,
    pub send_errors: AtomicU64,
    pub bytes_sent: AtomicU64,
}

impl EmitterStats {
    pub fn snapshot(&self) -> EmitterStatsSnapshot {
        EmitterStatsSnapshot {
            ticks_sent: self.ticks_sent.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct EmitterStatsSnapshot {
    pub ticks_sent: u64,
    pub send_errors: u64,
    pub bytes_sent: u64,
}

/// Final run summary, reported on every exit path
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    pub outcome: EmitterState,
    pub ticks_sent: u64,
    pub send_errors: u64,
    pub elapsed_secs: f64,
    pub avg_rate: f64,
}

/// The tick emitter
pub struct Emitter {
    config: EmitterConfig,
    dest: SocketAddr,
    instruments: RwLock<Vec<Instrument>>,
    // Opened eagerly at construction, released exactly once in finalization.
    socket: Mutex<Option<UdpSocket>>,
    running: Arc<AtomicBool>,
    state: RwLock<EmitterState>,
    stats: Arc<EmitterStats>,
}

impl Emitter {
    /// Create an emitter, validating the configuration and opening the
    /// transport eagerly.
    pub fn new(config: EmitterConfig, instruments: Vec<Instrument>) -> anyhow::Result<Arc<Self>> {
        if config.rate == 0 {
            return Err(ConfigError::ZeroRate.into());
        }
        if instruments.is_empty() {
            return Err(ConfigError::EmptyUniverse.into());
        }

        let dest = SocketAddr::new(config.group, config.port);
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        if config.group.is_multicast() {
            socket.set_multicast_ttl_v4(config.multicast_ttl)?;
        }

        Ok(Arc::new(Self {
            config,
            dest,
            instruments: RwLock::new(instruments),
            socket: Mutex::new(Some(socket)),
            running: Arc::new(AtomicBool::new(false)),
            state: RwLock::new(EmitterState::Idle),
            stats: Arc::new(EmitterStats::default()),
        }))
    }

    #[inline]
    pub fn stats(&self) -> &EmitterStats {
        &self.stats
    }

    #[inline]
    pub fn state(&self) -> EmitterState {
        *self.state.read()
    }

    /// Whether the socket has been released yet.
    pub fn transport_open(&self) -> bool {
        self.socket.lock().is_some()
    }

    /// Request cooperative interruption; the loop exits at its next check.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the emission loop to completion (duration bound or interruption).
    pub async fn run(self: Arc<Self>) -> anyhow::Result<RunSummary> {
        self.running.store(true, Ordering::SeqCst);
        *self.state.write() = EmitterState::Running;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let tick_interval = Duration::from_nanos(1_000_000_000 / self.config.rate as u64);
        let duration = Duration::from_secs(self.config.duration_secs);
        let mut ticker = interval(tick_interval);
        let started = Instant::now();

        info!(
            "Emitting to {} at {} ticks/sec ({})",
            self.dest,
            self.config.rate,
            if self.config.duration_secs == 0 {
                "unbounded".to_string()
            } else {
                format!("{}s", self.config.duration_secs)
            }
        );

        let outcome = loop {
            // First tick fires immediately, the rest pace the loop.
            ticker.tick().await;

            if !self.running.load(Ordering::Relaxed) {
                break EmitterState::Interrupted;
            }
            if !duration.is_zero() && started.elapsed() >= duration {
                break EmitterState::Stopped;
            }

            let (symbol, price, tick) = {
                let mut instruments = self.instruments.write();
                let idx = rng.gen_range(0..instruments.len());
                let inst = &mut instruments[idx];
                inst.update(&mut rng);

                let (bid, ask) = inst.quote();
                let tick = MarketTick::new(
                    bid,
                    ask,
                    inst.price(),
                    rng.gen_range(100..=10_000),
                    rng.gen_range(100..=10_000),
                    rng.gen_range(10_000..=1_000_000),
                    Utc::now().timestamp_nanos_opt().unwrap_or(0) as u64,
                    inst.wire_symbol(),
                );
                (inst.symbol().to_string(), inst.price(), tick)
            };

            let sent = {
                let socket = self.socket.lock();
                // Held for the run's lifetime; released only in finalization.
                let socket = socket.as_ref().expect("socket open while running");
                socket.send_to(&tick.to_bytes(), self.dest)
            };

            match sent {
                Ok(_) => {
                    let ticks = self.stats.ticks_sent.fetch_add(1, Ordering::Relaxed) + 1;
                    self.stats
                        .bytes_sent
                        .fetch_add(TICK_SIZE as u64, Ordering::Relaxed);
                    if ticks % 100 == 0 {
                        info!("Sent {} ticks - last: {} @ ${:.2}", ticks, symbol, price);
                    }
                }
                Err(e) => {
                    debug!("Send error: {}", e);
                    self.stats.send_errors.fetch_add(1, Ordering::Relaxed);
                }
            }
        };

        Ok(self.finalize(outcome, started))
    }

    /// Runs on every exit path: record the outcome, log the summary, and
    /// release the transport.
    fn finalize(&self, outcome: EmitterState, started: Instant) -> RunSummary {
        self.running.store(false, Ordering::SeqCst);
        *self.state.write() = outcome;

        let elapsed = started.elapsed().as_secs_f64();
        let snapshot = self.stats.snapshot();
        let summary = RunSummary {
            outcome,
            ticks_sent: snapshot.ticks_sent,
            send_errors: snapshot.send_errors,
            elapsed_secs: elapsed,
            avg_rate: if elapsed > 0.0 {
                snapshot.ticks_sent as f64 / elapsed
            } else {
                0.0
            },
        };

        drop(self.socket.lock().take());

        info!(
            "Emitter {:?}: {} ticks in {:.1}s ({:.1} ticks/sec, {} send errors)",
            summary.outcome,
            summary.ticks_sent,
            summary.elapsed_secs,
            summary.avg_rate,
            summary.send_errors
        );
        summary
    }
}
