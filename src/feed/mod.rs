//! Synthetic market-data feed.
//!
//! Three layers:
//! - `instrument`: per-symbol random-walk price state and quote derivation
//! - `wire`: the fixed 72-byte binary tick record
//! - `emitter`: the timed loop that walks, encodes, and multicasts ticks

pub mod emitter;
pub mod instrument;
pub mod wire;

pub use emitter::{Emitter, EmitterConfig, EmitterState, EmitterStats, RunSummary};
pub use instrument::{default_universe, ConfigError, Instrument};
pub use wire::{pad_symbol, MarketTick, WireError, SYMBOL_LEN, TICK_SIZE};
