//! The 64-bit index exchanged with the native library.
//!
//! The bridge does not interpret digits; it only guarantees that a value
//! crosses the boundary bit for bit. The string form is lowercase hex.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Bit offset of the resolution field
pub const RES_OFFSET: u32 = 52;

/// Mask of the 4-bit resolution field
pub const RES_MASK: u64 = 0xf << RES_OFFSET;

/// Opaque packed index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackedIndex(pub u64);

impl PackedIndex {
  /// The null index; native calls use it to mean "no cell"
  pub const INVALID: PackedIndex = PackedIndex(0);

  pub const fn new(raw: u64) -> Self {
    Self(raw)
  }

  pub const fn raw(&self) -> u64 {
    self.0
  }

  pub const fn is_invalid(&self) -> bool {
    self.0 == 0
  }

  /// Value of the resolution field (0..=15)
  pub const fn resolution(&self) -> u8 {
    ((self.0 & RES_MASK) >> RES_OFFSET) as u8
  }
}

impl From<u64> for PackedIndex {
  fn from(raw: u64) -> Self {
    Self(raw)
  }
}

impl From<PackedIndex> for u64 {
  fn from(index: PackedIndex) -> Self {
    index.0
  }
}

impl fmt::Display for PackedIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:x}", self.0)
  }
}

impl fmt::LowerHex for PackedIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::LowerHex::fmt(&self.0, f)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid index string {input:?}: {reason}")]
pub struct ParseIndexError {
  input: String,
  reason: String,
}

impl FromStr for PackedIndex {
  type Err = ParseIndexError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let digits = s
      .strip_prefix("0x")
      .or_else(|| s.strip_prefix("0X"))
      .unwrap_or(s);

    u64::from_str_radix(digits, 16)
      .map(Self)
      .map_err(|e| ParseIndexError {
        input: s.to_string(),
        reason: e.to_string(),
      })
  }
}
