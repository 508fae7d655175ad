//! Instrument price model.
//!
//! Each instrument carries its own gaussian random-walk price state. The
//! step standard deviation is `volatility * price`, so the walk is additive
//! per step but roughly log-normal over long horizons.

use std::f64::consts::PI;
use std::fmt;

use rand::Rng;

use super::wire::{self, WireError, SYMBOL_LEN};

/// Spread is fixed at construction as this fraction of the base price.
pub const SPREAD_FRACTION: f64 = 0.001;

/// Lowest price a walk step can reach.
pub const PRICE_FLOOR: f64 = 0.01;

/// A simulated tradable symbol.
#[derive(Debug, Clone)]
pub struct Instrument {
    symbol: String,
    wire_symbol: [u8; SYMBOL_LEN],
    price: f64,
    volatility: f64,
    spread: f64,
}

impl Instrument {
    /// Create an instrument, validating everything the wire format and the
    /// price model require. The spread is derived from the *initial* price
    /// and never recomputed.
    pub fn new(symbol: &str, base_price: f64, volatility: f64) -> Result<Self, ConfigError> {
        let wire_symbol = wire::pad_symbol(symbol)?;
        if !(base_price > 0.0) {
            return Err(ConfigError::NonPositivePrice(base_price));
        }
        if !(volatility >= 0.0) {
            return Err(ConfigError::NegativeVolatility(volatility));
        }
        Ok(Self {
            symbol: symbol.to_string(),
            wire_symbol,
            price: base_price,
            volatility,
            spread: base_price * SPREAD_FRACTION,
        })
    }

    /// Advance the price one random-walk step, clamped at the floor.
    pub fn update(&mut self, rng: &mut impl Rng) {
        let change = sample_normal(rng, 0.0, self.volatility * self.price);
        self.price = (self.price + change).max(PRICE_FLOOR);
    }

    /// Current two-sided quote `(bid, ask)`.
    #[inline]
    pub fn quote(&self) -> (f64, f64) {
        (
            self.price - self.spread / 2.0,
            self.price + self.spread / 2.0,
        )
    }

    #[inline]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[inline]
    pub fn wire_symbol(&self) -> [u8; SYMBOL_LEN] {
        self.wire_symbol
    }

    #[inline]
    pub fn price(&self) -> f64 {
        self.price
    }

    #[inline]
    pub fn spread(&self) -> f64 {
        self.spread
    }
}

/// The default simulated universe.
pub fn default_universe() -> Vec<Instrument> {
    [
        ("AAPL", 150.0, 0.015),
        ("GOOGL", 2800.0, 0.020),
        ("MSFT", 300.0, 0.012),
        ("AMZN", 3200.0, 0.018),
        ("TSLA", 700.0, 0.030),
    ]
    .into_iter()
    .map(|(sym, price, vol)| {
        Instrument::new(sym, price, vol).expect("default universe is valid")
    })
    .collect()
}

/// Sample from a normal distribution using the Box-Muller transform.
fn sample_normal(rng: &mut impl Rng, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.gen();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std * z
}

/// Configuration errors, rejected at startup rather than mid-run.
#[derive(Debug, Clone)]
pub enum ConfigError {
    Symbol(WireError),
    NonPositivePrice(f64),
    NegativeVolatility(f64),
    ZeroRate,
    EmptyUniverse,
}

impl From<WireError> for ConfigError {
    fn from(err: WireError) -> Self {
        Self::Symbol(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(e) => write!(f, "invalid symbol: {}", e),
            Self::NonPositivePrice(p) => write!(f, "base price must be positive, got {}", p),
            Self::NegativeVolatility(v) => write!(f, "volatility must be non-negative, got {}", v),
            Self::ZeroRate => write!(f, "tick rate must be positive"),
            Self::EmptyUniverse => write!(f, "instrument set must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_price_floor_holds_under_extreme_volatility() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut inst = Instrument::new("WILD", 0.05, 50.0).unwrap();
        for _ in 0..10_000 {
            inst.update(&mut rng);
            assert!(inst.price() > 0.0);
            assert!(inst.price() >= PRICE_FLOOR);
        }
    }

    #[test]
    fn test_zero_volatility_walk_is_noop() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut inst = Instrument::new("TEST", 100.0, 0.0).unwrap();
        for _ in 0..1_000 {
            inst.update(&mut rng);
        }
        assert_eq!(inst.price(), 100.0);
    }

    #[test]
    fn test_quote_scenario() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut inst = Instrument::new("TEST", 100.0, 0.0).unwrap();
        inst.update(&mut rng);

        assert_eq!(inst.price(), 100.0);
        assert!((inst.spread() - 0.1).abs() < 1e-12);

        let (bid, ask) = inst.quote();
        assert_eq!(bid, 100.0 - inst.spread() / 2.0);
        assert_eq!(ask, 100.0 + inst.spread() / 2.0);
    }

    #[test]
    fn test_quote_brackets_price_after_walk() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut inst = Instrument::new("AAPL", 150.0, 0.015).unwrap();
        for _ in 0..500 {
            inst.update(&mut rng);
            let (bid, ask) = inst.quote();
            assert!(bid < inst.price());
            assert!(inst.price() < ask);
            assert!((ask - bid - inst.spread()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_spread_fixed_from_initial_price() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut inst = Instrument::new("TSLA", 700.0, 0.030).unwrap();
        let spread_at_creation = inst.spread();
        for _ in 0..200 {
            inst.update(&mut rng);
        }
        assert_eq!(inst.spread(), spread_at_creation);
    }

    #[test]
    fn test_invalid_construction_rejected() {
        assert!(matches!(
            Instrument::new("TOOLONGFORTHEWIRE", 100.0, 0.01),
            Err(ConfigError::Symbol(_))
        ));
        assert!(matches!(
            Instrument::new("X", 0.0, 0.01),
            Err(ConfigError::NonPositivePrice(_))
        ));
        assert!(matches!(
            Instrument::new("X", 100.0, -0.5),
            Err(ConfigError::NegativeVolatility(_))
        ));
    }

    #[test]
    fn test_default_universe() {
        let universe = default_universe();
        assert_eq!(universe.len(), 5);
        assert_eq!(universe[0].symbol(), "AAPL");
        assert_eq!(universe[0].price(), 150.0);
    }
}
