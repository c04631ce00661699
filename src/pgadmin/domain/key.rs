//! Positional keys of the `Servers` map.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 1-based key of one entry in the `Servers` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerKey(u32);

impl ServerKey {
    /// First key handed out by a [`KeyCounter`].
    pub const FIRST: Self = Self(1);

    /// Creates a key from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ServerKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Error returned when a `Servers` map key is not a positive integer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("server key '{0}' is not a positive integer")]
pub struct ParseServerKeyError(pub String);

impl FromStr for ServerKey {
    type Err = ParseServerKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.parse::<u32>() {
            Ok(number) if number > 0 => Ok(Self(number)),
            _ => Err(ParseServerKeyError(value.to_owned())),
        }
    }
}

/// How keys are assigned when some servers are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyNumbering {
    /// Every enumerated server consumes a key, emitted or not. Keys equal
    /// the server's 1-based enumeration position and may have gaps.
    #[default]
    Positional,
    /// Only emitted servers consume keys, so keys run `1..=n` without gaps.
    Contiguous,
}

/// Hands out keys during one enumeration pass.
#[derive(Debug, Clone)]
pub struct KeyCounter {
    next: u32,
    numbering: KeyNumbering,
}

impl KeyCounter {
    /// Creates a counter starting at [`ServerKey::FIRST`].
    #[must_use]
    pub const fn new(numbering: KeyNumbering) -> Self {
        Self {
            next: ServerKey::FIRST.0,
            numbering,
        }
    }

    /// Returns the key for an emitted server and advances.
    pub const fn claim(&mut self) -> ServerKey {
        let key = ServerKey(self.next);
        self.next += 1;
        key
    }

    /// Records a server that was not emitted.
    pub const fn skip(&mut self) {
        if matches!(self.numbering, KeyNumbering::Positional) {
            self.next += 1;
        }
    }
}
