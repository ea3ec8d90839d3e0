//! Errors raised while getting the native library into the process.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::platform::PlatformKey;

/// Coarse classification of a [`LoadError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
  ResourceNotFound,
  Linkage,
  Io,
  SecurityDenied,
}

/// A failed attempt to load the native library
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("No packaged native library for platform {key} (looked for {path})")]
  ResourceNotFound { key: PlatformKey, path: String },

  #[error("Failed to load native library {target}: {source}")]
  Linkage {
    target: String,
    #[source]
    source: libloading::Error,
  },

  #[error("Native library {target} does not export {symbol}: {source}")]
  MissingSymbol {
    target: String,
    symbol: &'static str,
    #[source]
    source: libloading::Error,
  },

  #[error("I/O error while extracting native library to {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Loading native code was denied: {reason}")]
  SecurityDenied { reason: String },
}

impl LoadError {
  pub fn kind(&self) -> LoadErrorKind {
    match self {
      Self::ResourceNotFound { .. } => LoadErrorKind::ResourceNotFound,
      Self::Linkage { .. } | Self::MissingSymbol { .. } => LoadErrorKind::Linkage,
      Self::Io { .. } => LoadErrorKind::Io,
      Self::SecurityDenied { .. } => LoadErrorKind::SecurityDenied,
    }
  }

  /// Wrap an I/O error, reporting permission failures as a denial
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    let path = path.into();
    if source.kind() == io::ErrorKind::PermissionDenied {
      Self::SecurityDenied {
        reason: format!("{}: {}", path.display(), source),
      }
    } else {
      Self::Io { path, source }
    }
  }
}
