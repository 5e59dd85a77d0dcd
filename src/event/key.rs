//! Routing key types
//!
//! Fixed-size chain identifiers and the `(address, topic)` pair used to
//! route logs to subscribers.

use std::fmt;
use std::str::FromStr;

/// Error returned when parsing a hex identifier fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseHexError {
    /// More hex digits than the identifier can hold
    TooLong { max: usize, actual: usize },
    /// Character outside `[0-9a-fA-F]`
    InvalidDigit(char),
}

impl fmt::Display for ParseHexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseHexError::TooLong { max, actual } => {
                write!(f, "Hex string too long: {} digits (max {})", actual, max)
            }
            ParseHexError::InvalidDigit(c) => write!(f, "Invalid hex digit: {:?}", c),
        }
    }
}

impl std::error::Error for ParseHexError {}

/// Decode hex into `N` bytes, left-padding short input with zeros.
fn decode_padded<const N: usize>(input: &str) -> Result<[u8; N], ParseHexError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    if digits.len() > N * 2 {
        return Err(ParseHexError::TooLong {
            max: N * 2,
            actual: digits.len(),
        });
    }

    let pad = N * 2 - digits.len();
    let mut padded = vec![b'0'; N * 2];
    padded[pad..].copy_from_slice(digits.as_bytes());

    let mut out = [0u8; N];
    hex::decode_to_slice(&padded, &mut out).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { index, .. } => {
            ParseHexError::InvalidDigit(char_at(digits, index - pad))
        }
        // Padding makes the length exact
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            ParseHexError::TooLong {
                max: N * 2,
                actual: digits.len(),
            }
        }
    })?;

    Ok(out)
}

/// Character of `s` that contains byte `offset`
fn char_at(s: &str, offset: usize) -> char {
    s.char_indices()
        .take_while(|(start, _)| *start <= offset)
        .last()
        .map_or(char::REPLACEMENT_CHARACTER, |(_, c)| c)
}

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name([u8; $len]);

        impl $name {
            /// Length in bytes
            pub const LEN: usize = $len;

            /// The all-zero value
            pub const ZERO: Self = Self([0u8; $len]);

            /// Wrap raw bytes
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Build a value whose low 8 bytes hold `value` (big-endian)
            pub fn from_low_u64_be(value: u64) -> Self {
                let mut bytes = [0u8; $len];
                bytes[$len - 8..].copy_from_slice(&value.to_be_bytes());
                Self(bytes)
            }

            /// Raw bytes
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Whether every byte is zero
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl FromStr for $name {
            type Err = ParseHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_padded::<$len>(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

fixed_bytes!(
    /// 20-byte contract address
    Address,
    20
);

fixed_bytes!(
    /// 32-byte hash (topics, transaction hashes)
    Hash,
    32
);

/// Routing key for a class of on-chain events (contract address + topic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    /// Emitting contract
    pub address: Address,
    /// Event topic (usually the event signature hash)
    pub topic: Hash,
}

impl EventKey {
    /// Create a new event key
    pub fn new(address: Address, topic: Hash) -> Self {
        Self { address, topic }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_address() {
        let addr: Address = "0x1234567890abcdef1234567890abcdef12345678".parse().unwrap();
        assert_eq!(addr.as_bytes()[0], 0x12);
        assert_eq!(addr.as_bytes()[19], 0x78);
        assert_eq!(
            addr.to_string(),
            "0x1234567890abcdef1234567890abcdef12345678"
        );
    }

    #[test]
    fn test_parse_short_input_is_left_padded() {
        let addr: Address = "0x1".parse().unwrap();
        assert_eq!(addr, Address::from_low_u64_be(1));

        let topic: Hash = "ab".parse().unwrap();
        assert_eq!(topic, Hash::from_low_u64_be(0xAB));

        let odd: Hash = "0xabc".parse().unwrap();
        assert_eq!(odd.as_bytes()[30], 0x0a);
        assert_eq!(odd.as_bytes()[31], 0xbc);
    }

    #[test]
    fn test_parse_errors() {
        let too_long = "0x".to_string() + &"1".repeat(41);
        assert_eq!(
            too_long.parse::<Address>(),
            Err(ParseHexError::TooLong { max: 40, actual: 41 })
        );
        assert_eq!(
            "0xzz".parse::<Hash>(),
            Err(ParseHexError::InvalidDigit('z'))
        );
    }

    #[test]
    fn test_parse_error_reports_multibyte_char() {
        assert_eq!(
            "0xé".parse::<Address>(),
            Err(ParseHexError::InvalidDigit('é'))
        );
        assert_eq!(
            "12€4".parse::<Hash>(),
            Err(ParseHexError::InvalidDigit('€'))
        );
    }

    #[test]
    fn test_zero_values() {
        assert!(Address::ZERO.is_zero());
        assert!(Hash::default().is_zero());
        assert!("0x".parse::<Address>().unwrap().is_zero());
        assert!(!Hash::from_low_u64_be(1).is_zero());
    }

    #[test]
    fn test_event_key_equality() {
        let a = EventKey::new(Address::from_low_u64_be(1), Hash::from_low_u64_be(0xAB));
        let b = EventKey::new(Address::from_low_u64_be(1), Hash::from_low_u64_be(0xAB));
        let c = EventKey::new(Address::from_low_u64_be(1), Hash::from_low_u64_be(0xAC));

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }
}
