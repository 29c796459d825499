//! Base-36 seed text.
//!
//! Seeds travel in URLs and are typed by hand, so the textual form is
//! base-36 (`0-9a-z`). Parsing is case-insensitive; the canonical form is
//! lowercase without leading zeros, and `Seed::parse(seed.to_string())`
//! always yields the same numeric value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const RADIX: u64 = 36;
const MAX_DIGITS: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    #[error("seed is empty")]
    Empty,

    #[error("seed has {len} characters, at most {MAX_DIGITS} are allowed")]
    TooLong { len: usize },

    #[error("seed contains invalid character '{ch}' (use 0-9 and a-z)")]
    InvalidChar { ch: char },

    #[error("seed does not fit in 64 bits")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Seed(u64);

impl Seed {
    pub const fn from_value(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn parse(text: &str) -> Result<Self, SeedError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SeedError::Empty);
        }
        if trimmed.len() > MAX_DIGITS {
            return Err(SeedError::TooLong { len: trimmed.len() });
        }

        let mut value: u64 = 0;
        for ch in trimmed.chars() {
            let digit = ch.to_digit(RADIX as u32).ok_or(SeedError::InvalidChar { ch })? as u64;
            value = value
                .checked_mul(RADIX)
                .and_then(|v| v.checked_add(digit))
                .ok_or(SeedError::Overflow)?;
        }
        Ok(Self(value))
    }

    /// A fresh seed for a new game. This is the only place entropy enters.
    pub fn random() -> Self {
        Self(rand::random::<u64>())
    }

    pub fn to_base36(self) -> String {
        if self.0 == 0 {
            return "0".to_string();
        }
        let mut digits = Vec::with_capacity(MAX_DIGITS);
        let mut n = self.0;
        while n > 0 {
            let d = (n % RADIX) as u32;
            digits.push(std::char::from_digit(d, RADIX as u32).unwrap_or('0'));
            n /= RADIX;
        }
        digits.iter().rev().collect()
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base36())
    }
}

impl FromStr for Seed {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base36())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Seed::parse(&text).map_err(serde::de::Error::custom)
    }
}
