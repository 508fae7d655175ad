//! mdcast library
//!
//! Synthetic market-data source: instrument price walks, the 72-byte tick
//! wire format, and the UDP multicast emitter. The `mdcast` binary is a
//! thin CLI over this.

pub mod feed;

pub use feed::{Emitter, EmitterConfig, EmitterState, Instrument, MarketTick, RunSummary};
