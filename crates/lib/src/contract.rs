//! The calling convention shared by every native operation.
//!
//! A native call returns a code. `0` means the output is populated. The
//! "insufficient memory bounds" code means the caller's buffer was too small
//! and the call must be repeated with a larger one; the native side never
//! grows a buffer itself. Any other code is a failure for the caller.

use tracing::{debug, warn};

use crate::consts::MAX_BUFFER_CAPACITY;
use crate::error_code::{FailureKind, H3Error};

/// What the caller must do after a native call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
  /// Output fully populated
  Complete,
  /// Output buffer too small; call again with a larger one
  RetryWithLargerBuffer,
  /// Hard failure
  Failed(H3Error),
}

/// Classify a native return code
pub fn outcome(code: u32) -> CallOutcome {
  match FailureKind::from_code(code) {
    FailureKind::Success => CallOutcome::Complete,
    FailureKind::MemoryBounds => CallOutcome::RetryWithLargerBuffer,
    _ => CallOutcome::Failed(H3Error::new(code)),
  }
}

/// Convert a native size report into a buffer capacity
///
/// Negative sizes are a domain failure; sizes past [`MAX_BUFFER_CAPACITY`]
/// are reported as an allocation failure instead of being attempted.
pub fn capacity(size: i64) -> Result<usize, H3Error> {
  let size = usize::try_from(size).map_err(|_| H3Error::from_kind(FailureKind::Domain))?;
  if size > MAX_BUFFER_CAPACITY {
    return Err(H3Error::from_kind(FailureKind::MemoryAlloc));
  }
  Ok(size)
}

/// Call `f` once with a zeroed buffer of exactly `capacity` elements
///
/// For calls whose size is known up front. A "too small" report here is a
/// failure like any other.
pub fn fill<T, F>(capacity: usize, mut f: F) -> Result<Vec<T>, H3Error>
where
  T: Default + Clone,
  F: FnMut(&mut [T]) -> u32,
{
  let mut buf = vec![T::default(); capacity];
  match outcome(f(&mut buf)) {
    CallOutcome::Complete => Ok(buf),
    CallOutcome::RetryWithLargerBuffer => Err(H3Error::from_kind(FailureKind::MemoryBounds)),
    CallOutcome::Failed(err) => Err(err),
  }
}

/// Call `f` with a buffer, doubling it while the native side reports it as
/// too small
///
/// Starts at `initial` elements (at least one) and gives up with the
/// "insufficient memory bounds" failure once a buffer of `max` elements was
/// still too small.
pub fn fill_growable<T, F>(initial: usize, max: usize, mut f: F) -> Result<Vec<T>, H3Error>
where
  T: Default + Clone,
  F: FnMut(&mut [T]) -> u32,
{
  let max = max.min(MAX_BUFFER_CAPACITY);
  let mut capacity = initial.clamp(1, max.max(1));

  loop {
    let mut buf = vec![T::default(); capacity];
    match outcome(f(&mut buf)) {
      CallOutcome::Complete => return Ok(buf),
      CallOutcome::Failed(err) => return Err(err),
      CallOutcome::RetryWithLargerBuffer => {
        if capacity >= max {
          warn!(capacity, "native call still needs a larger buffer at the maximum capacity");
          return Err(H3Error::from_kind(FailureKind::MemoryBounds));
        }
        let next = capacity.saturating_mul(2).min(max);
        debug!(from = capacity, to = next, "growing result buffer");
        capacity = next;
      }
    }
  }
}

/// Collect the non-zero entries of a filled index buffer
///
/// Fixed-size native outputs leave unused slots as the invalid index `0`.
pub fn non_zero(buf: Vec<u64>) -> Vec<u64> {
  buf.into_iter().filter(|&h| h != 0).collect()
}
