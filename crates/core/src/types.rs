//! Core identifier types for the record store
//!
//! This module defines the foundational identifiers:
//! - RecordId: Stable external identifier of a record (positive integer)
//! - Sequence: Store-assigned insertion order of a single version

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Stable external identifier of a record
///
/// A RecordId is always strictly positive. The only way to obtain one is
/// through [`RecordId::new`] or [`str::parse`], both of which reject zero,
/// negative and non-numeric input with [`Error::InvalidId`].
///
/// The same RecordId is shared by every version of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Validate and wrap a raw identifier
    ///
    /// # Errors
    /// Returns `Error::InvalidId` if `raw <= 0`.
    pub fn new(raw: i64) -> Result<Self> {
        if raw <= 0 {
            return Err(Error::InvalidId { id: raw.to_string() });
        }
        Ok(Self(raw))
    }

    /// Get the raw integer value
    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw: i64 = s.trim().parse().map_err(|_| Error::InvalidId {
            id: s.to_string(),
        })?;
        Self::new(raw)
    }
}

impl TryFrom<i64> for RecordId {
    type Error = Error;

    fn try_from(raw: i64) -> Result<Self> {
        Self::new(raw)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        RecordId::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Insertion sequence of a version
///
/// Sequences are assigned by the store, strictly increasing store-wide, and
/// never reused. They order the versions of one record; they are not part of
/// the public record identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(u64);

impl Sequence {
    /// Sequence value before any write
    pub const ZERO: Sequence = Sequence(0);

    /// Wrap a raw sequence value
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
