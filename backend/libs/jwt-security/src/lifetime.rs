//! Token lifetime strings
//!
//! A lifetime is written as `<magnitude><unit>` where the unit is one of
//! `s`, `m`, `h` or `d` (either case). Without a unit suffix the magnitude is
//! taken as seconds, so `"90"` and `"90s"` are the same lifetime.

use crate::error::LifetimeError;
use chrono::Duration;
use std::fmt;
use std::str::FromStr;

/// A parsed, non-negative token lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenLifetime {
    millis: i64,
}

impl TokenLifetime {
    pub fn as_millis(&self) -> i64 {
        self.millis
    }

    pub fn as_duration(&self) -> Duration {
        Duration::milliseconds(self.millis)
    }
}

impl FromStr for TokenLifetime {
    type Err = LifetimeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err(LifetimeError::Empty);
        }

        let (magnitude, unit_millis) = match value.char_indices().last() {
            Some((idx, unit)) => match unit.to_ascii_lowercase() {
                's' => (&value[..idx], 1_000),
                'm' => (&value[..idx], 60 * 1_000),
                'h' => (&value[..idx], 60 * 60 * 1_000),
                'd' => (&value[..idx], 24 * 60 * 60 * 1_000),
                _ => (value, 1_000),
            },
            None => return Err(LifetimeError::Empty),
        };

        if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LifetimeError::InvalidMagnitude(value.to_string()));
        }

        let millis = magnitude
            .parse::<i64>()
            .ok()
            .and_then(|n| n.checked_mul(unit_millis))
            .ok_or_else(|| LifetimeError::Overflow(value.to_string()))?;

        Ok(Self { millis })
    }
}

impl fmt::Display for TokenLifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.millis)
    }
}

/// Parse a lifetime string such as `"15m"`, `"24h"` or `"7d"`.
pub fn parse_lifetime(value: &str) -> Result<TokenLifetime, LifetimeError> {
    value.parse()
}
