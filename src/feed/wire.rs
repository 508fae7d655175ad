//! Wire format for synthetic market ticks.
//!
//! Fixed 72-byte binary record, one tick per UDP datagram. The layout is a
//! versionless schema agreed with consumers out of band: no length prefix,
//! no magic, no checksum.

use std::fmt;

/// Width of the NUL-padded symbol field.
pub const SYMBOL_LEN: usize = 16;

/// Total record size in bytes
/// 8+8+8+8+8+8+8+16 = 72 bytes
pub const TICK_SIZE: usize = 72;

/// A single market tick (72 bytes on the wire)
///
/// Layout (all fields little-endian):
/// ```text
/// Offset  Size  Field
/// 0       8     bid (f64)
/// 8       8     ask (f64)
/// 16      8     price (f64, mid)
/// 24      8     bid_size (u64)
/// 32      8     ask_size (u64)
/// 40      8     volume (u64)
/// 48      8     timestamp_ns (u64, epoch nanos)
/// 56      16    symbol (NUL-padded UTF-8)
/// Total: 72 bytes
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketTick {
    pub bid: f64,
    pub ask: f64,
    pub price: f64,
    pub bid_size: u64,
    pub ask_size: u64,
    pub volume: u64,
    pub timestamp_ns: u64,
    pub symbol: [u8; SYMBOL_LEN],
}

impl MarketTick {
    /// Create a tick from already-validated fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bid: f64,
        ask: f64,
        price: f64,
        bid_size: u64,
        ask_size: u64,
        volume: u64,
        timestamp_ns: u64,
        symbol: [u8; SYMBOL_LEN],
    ) -> Self {
        Self {
            bid,
            ask,
            price,
            bid_size,
            ask_size,
            volume,
            timestamp_ns,
            symbol,
        }
    }

    /// Serialize to the fixed wire layout.
    pub fn to_bytes(&self) -> [u8; TICK_SIZE] {
        let mut buf = [0u8; TICK_SIZE];
        buf[0..8].copy_from_slice(&self.bid.to_le_bytes());
        buf[8..16].copy_from_slice(&self.ask.to_le_bytes());
        buf[16..24].copy_from_slice(&self.price.to_le_bytes());
        buf[24..32].copy_from_slice(&self.bid_size.to_le_bytes());
        buf[32..40].copy_from_slice(&self.ask_size.to_le_bytes());
        buf[40..48].copy_from_slice(&self.volume.to_le_bytes());
        buf[48..56].copy_from_slice(&self.timestamp_ns.to_le_bytes());
        buf[56..72].copy_from_slice(&self.symbol);
        buf
    }

    /// Deserialize from a slice, validating the record length.
    pub fn try_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() != TICK_SIZE {
            return Err(WireError::InvalidSize(buf.len()));
        }

        let f64_at = |at: usize| f64::from_le_bytes(buf[at..at + 8].try_into().unwrap());
        let u64_at = |at: usize| u64::from_le_bytes(buf[at..at + 8].try_into().unwrap());

        let mut symbol = [0u8; SYMBOL_LEN];
        symbol.copy_from_slice(&buf[56..72]);

        Ok(Self {
            bid: f64_at(0),
            ask: f64_at(8),
            price: f64_at(16),
            bid_size: u64_at(24),
            ask_size: u64_at(32),
            volume: u64_at(40),
            timestamp_ns: u64_at(48),
            symbol,
        })
    }

    /// Symbol with the NUL padding trimmed.
    pub fn symbol_str(&self) -> &str {
        let end = self
            .symbol
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(SYMBOL_LEN);
        std::str::from_utf8(&self.symbol[..end]).unwrap_or("")
    }

    /// Mid price as quoted by bid/ask.
    #[inline]
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }
}

/// Pad a symbol into the fixed 16-byte field.
///
/// Oversized symbols are a configuration error, rejected here rather than
/// silently truncated on the wire.
pub fn pad_symbol(symbol: &str) -> Result<[u8; SYMBOL_LEN], WireError> {
    let bytes = symbol.as_bytes();
    if bytes.is_empty() {
        return Err(WireError::EmptySymbol);
    }
    if bytes.len() > SYMBOL_LEN {
        return Err(WireError::SymbolTooLong {
            symbol: symbol.to_string(),
            len: bytes.len(),
        });
    }
    let mut padded = [0u8; SYMBOL_LEN];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(padded)
}

/// Errors in the wire layer
#[derive(Debug, Clone)]
pub enum WireError {
    InvalidSize(usize),
    EmptySymbol,
    SymbolTooLong { symbol: String, len: usize },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize(s) => {
                write!(f, "invalid record size: {} (expected {})", s, TICK_SIZE)
            }
            Self::EmptySymbol => write!(f, "symbol must not be empty"),
            Self::SymbolTooLong { symbol, len } => write!(
                f,
                "symbol {:?} is {} bytes (max {})",
                symbol, len, SYMBOL_LEN
            ),
        }
    }
}

impl std::error::Error for WireError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_roundtrip() {
        let tick = MarketTick::new(
            149.95,
            150.05,
            150.0,
            4200,
            3100,
            523_000,
            1_700_000_000_000_000_000,
            pad_symbol("AAPL").unwrap(),
        );

        let bytes = tick.to_bytes();
        assert_eq!(bytes.len(), TICK_SIZE);

        let restored = MarketTick::try_from_slice(&bytes).unwrap();
        assert_eq!(restored.bid, 149.95);
        assert_eq!(restored.ask, 150.05);
        assert_eq!(restored.price, 150.0);
        assert_eq!(restored.bid_size, 4200);
        assert_eq!(restored.ask_size, 3100);
        assert_eq!(restored.volume, 523_000);
        assert_eq!(restored.timestamp_ns, 1_700_000_000_000_000_000);
        assert_eq!(restored.symbol_str(), "AAPL");
    }

    #[test]
    fn test_record_size_fixed_for_all_symbol_lengths() {
        for len in 1..=SYMBOL_LEN {
            let symbol = "X".repeat(len);
            let tick = MarketTick::new(1.0, 1.1, 1.05, 100, 100, 10_000, 0, pad_symbol(&symbol).unwrap());
            assert_eq!(tick.to_bytes().len(), TICK_SIZE);
        }
    }

    #[test]
    fn test_symbol_nul_padding() {
        let padded = pad_symbol("AAPL").unwrap();
        assert_eq!(&padded[..4], b"AAPL");
        assert_eq!(&padded[4..], &[0u8; 12]);
    }

    #[test]
    fn test_oversized_symbol_rejected() {
        let err = pad_symbol("SEVENTEENBYTESYMX").unwrap_err();
        assert!(matches!(err, WireError::SymbolTooLong { len: 17, .. }));
    }

    #[test]
    fn test_empty_symbol_rejected() {
        assert!(matches!(pad_symbol(""), Err(WireError::EmptySymbol)));
    }

    #[test]
    fn test_invalid_size_rejected() {
        let buf = [0u8; TICK_SIZE - 1];
        assert!(matches!(
            MarketTick::try_from_slice(&buf),
            Err(WireError::InvalidSize(71))
        ));
    }

    #[test]
    fn test_little_endian_layout() {
        let tick = MarketTick::new(0.0, 0.0, 0.0, 0x0102030405060708, 0, 0, 0, pad_symbol("A").unwrap());
        let bytes = tick.to_bytes();
        // bid_size sits at offset 24, least significant byte first
        assert_eq!(&bytes[24..32], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
    }
}
