//! Translation of native error codes.
//!
//! Every native call returns a small integer. `0` means success; `1..=19`
//! name a specific failure; anything else is reported as [`FailureKind::Unknown`].

use std::fmt;

/// Failure taxonomy of the native library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
  Success,
  Failed,
  Domain,
  LatLngDomain,
  ResDomain,
  CellInvalid,
  DirEdgeInvalid,
  UndirEdgeInvalid,
  VertexInvalid,
  Pentagon,
  DuplicateInput,
  NotNeighbors,
  ResMismatch,
  MemoryAlloc,
  MemoryBounds,
  OptionInvalid,
  IndexInvalid,
  BaseCellDomain,
  DigitDomain,
  DeletedDigit,
  Unknown(u32),
}

impl FailureKind {
  /// Highest code with a dedicated kind
  pub const MAX_KNOWN_CODE: u32 = 19;

  /// Map a native code to its kind. Total; never panics.
  pub const fn from_code(code: u32) -> Self {
    match code {
      0 => Self::Success,
      1 => Self::Failed,
      2 => Self::Domain,
      3 => Self::LatLngDomain,
      4 => Self::ResDomain,
      5 => Self::CellInvalid,
      6 => Self::DirEdgeInvalid,
      7 => Self::UndirEdgeInvalid,
      8 => Self::VertexInvalid,
      9 => Self::Pentagon,
      10 => Self::DuplicateInput,
      11 => Self::NotNeighbors,
      12 => Self::ResMismatch,
      13 => Self::MemoryAlloc,
      14 => Self::MemoryBounds,
      15 => Self::OptionInvalid,
      16 => Self::IndexInvalid,
      17 => Self::BaseCellDomain,
      18 => Self::DigitDomain,
      19 => Self::DeletedDigit,
      other => Self::Unknown(other),
    }
  }

  pub const fn code(&self) -> u32 {
    match self {
      Self::Success => 0,
      Self::Failed => 1,
      Self::Domain => 2,
      Self::LatLngDomain => 3,
      Self::ResDomain => 4,
      Self::CellInvalid => 5,
      Self::DirEdgeInvalid => 6,
      Self::UndirEdgeInvalid => 7,
      Self::VertexInvalid => 8,
      Self::Pentagon => 9,
      Self::DuplicateInput => 10,
      Self::NotNeighbors => 11,
      Self::ResMismatch => 12,
      Self::MemoryAlloc => 13,
      Self::MemoryBounds => 14,
      Self::OptionInvalid => 15,
      Self::IndexInvalid => 16,
      Self::BaseCellDomain => 17,
      Self::DigitDomain => 18,
      Self::DeletedDigit => 19,
      Self::Unknown(code) => *code,
    }
  }

  pub const fn message(&self) -> &'static str {
    match self {
      Self::Success => "Success",
      Self::Failed => "The operation failed but a more specific error is not available",
      Self::Domain => "Argument was outside of acceptable range",
      Self::LatLngDomain => "Latitude or longitude arguments were outside of acceptable range",
      Self::ResDomain => "Resolution argument was outside of acceptable range",
      Self::CellInvalid => "Cell argument was not valid",
      Self::DirEdgeInvalid => "Directed edge argument was not valid",
      Self::UndirEdgeInvalid => "Undirected edge argument was not valid",
      Self::VertexInvalid => "Vertex argument was not valid",
      Self::Pentagon => "Pentagon distortion was encountered",
      Self::DuplicateInput => "Duplicate input",
      Self::NotNeighbors => "Cell arguments were not neighbors",
      Self::ResMismatch => "Cell arguments had incompatible resolutions",
      Self::MemoryAlloc => "Memory allocation failed",
      Self::MemoryBounds => "Bounds of provided memory were insufficient",
      Self::OptionInvalid => "Mode or flags argument was not valid",
      Self::IndexInvalid => "Index argument was not valid",
      Self::BaseCellDomain => "Base cell number was outside of acceptable range",
      Self::DigitDomain => "Child indexing digits invalid",
      Self::DeletedDigit => "Child indexing digits refer to a deleted subsequence",
      Self::Unknown(_) => "Unknown error",
    }
  }

  pub const fn is_success(&self) -> bool {
    matches!(self, Self::Success)
  }
}

impl fmt::Display for FailureKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.message())
  }
}

/// A failed native call, carrying the code it returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (code {code})")]
pub struct H3Error {
  code: u32,
  kind: FailureKind,
}

impl H3Error {
  /// Build the error for a non-zero code
  ///
  /// Outside the crate, errors come from [`check`], which never wraps `0`.
  pub(crate) const fn new(code: u32) -> Self {
    debug_assert!(code != 0, "code 0 is success, not an error");
    Self {
      code,
      kind: FailureKind::from_code(code),
    }
  }

  pub(crate) const fn from_kind(kind: FailureKind) -> Self {
    debug_assert!(!kind.is_success(), "success is not an error");
    Self { code: kind.code(), kind }
  }

  pub const fn code(&self) -> u32 {
    self.code
  }

  pub const fn kind(&self) -> FailureKind {
    self.kind
  }

  pub const fn message(&self) -> &'static str {
    self.kind.message()
  }
}

/// Check a native return code. `0` is success; anything else is an error.
pub fn check(code: u32) -> Result<(), H3Error> {
  if code == 0 { Ok(()) } else { Err(H3Error::new(code)) }
}
