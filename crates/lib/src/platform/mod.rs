//! Platform detection.
//!
//! Maps the raw strings a host reports about itself to a [`PlatformKey`],
//! which names the directory a packaged native library is looked up in.

pub mod arch;
pub mod os;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use arch::{Architecture, detect_architecture};
pub use os::{OperatingSystem, detect_operating_system};

/// Platform key combining OS and architecture (e.g., "linux-x64")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformKey {
  pub os: OperatingSystem,
  pub arch: Architecture,
}

impl PlatformKey {
  /// Create a platform key from an OS and an already-normalized architecture
  pub fn new(os: OperatingSystem, arch: impl Into<Architecture>) -> Self {
    Self { os, arch: arch.into() }
  }

  /// Detect the platform key from the given system properties
  pub fn detect(props: &SystemProperties) -> Self {
    Self {
      os: detect_operating_system(&props.vendor, &props.os_name),
      arch: detect_architecture(&props.arch),
    }
  }

  /// Returns the resource directory name (e.g., "darwin-arm64")
  pub fn dir_name(&self) -> String {
    format!("{}-{}", self.os.dir_name(), self.arch)
  }
}

impl fmt::Display for PlatformKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.dir_name())
  }
}

/// The raw strings platform detection works from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemProperties {
  pub vendor: String,
  pub os_name: String,
  pub arch: String,
}

impl SystemProperties {
  /// Read the properties of the running process
  ///
  /// Values are read on every call; nothing is cached here.
  pub fn current() -> Self {
    Self {
      vendor: target_vendor().to_string(),
      os_name: std::env::consts::OS.to_string(),
      arch: std::env::consts::ARCH.to_string(),
    }
  }
}

fn target_vendor() -> &'static str {
  if cfg!(target_os = "android") {
    "The Android Project"
  } else if cfg!(target_vendor = "apple") {
    "apple"
  } else if cfg!(target_vendor = "pc") {
    "pc"
  } else {
    "unknown"
  }
}
