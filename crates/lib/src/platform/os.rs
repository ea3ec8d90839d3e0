use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating systems with packaged native libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
  Android,
  Darwin,
  FreeBsd,
  Windows,
  Linux,
}

impl OperatingSystem {
  /// Every supported operating system
  pub const ALL: [OperatingSystem; 5] = [
    Self::Android,
    Self::Darwin,
    Self::FreeBsd,
    Self::Windows,
    Self::Linux,
  ];

  /// Returns the lowercase directory name used for resource lookup
  ///
  /// These are literals rather than a case conversion of the variant name so
  /// the result never depends on the host's locale rules.
  pub const fn dir_name(&self) -> &'static str {
    match self {
      Self::Android => "android",
      Self::Darwin => "darwin",
      Self::FreeBsd => "freebsd",
      Self::Windows => "windows",
      Self::Linux => "linux",
    }
  }

  /// Returns the file suffix of shared libraries on this OS
  pub const fn library_suffix(&self) -> &'static str {
    match self {
      Self::Darwin => ".dylib",
      Self::Windows => ".dll",
      Self::Android | Self::FreeBsd | Self::Linux => ".so",
    }
  }
}

impl fmt::Display for OperatingSystem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.dir_name())
  }
}

/// Detect the operating system from a vendor string and an OS name
///
/// The vendor is checked first because Android reports an OS name that
/// otherwise reads as Linux. Anything unrecognized is treated as Linux.
pub fn detect_operating_system(vendor: &str, os_name: &str) -> OperatingSystem {
  if contains_folded(vendor, "android") {
    return OperatingSystem::Android;
  }

  if contains_folded(os_name, "mac") {
    OperatingSystem::Darwin
  } else if contains_folded(os_name, "win") {
    OperatingSystem::Windows
  } else if contains_folded(os_name, "freebsd") {
    OperatingSystem::FreeBsd
  } else {
    OperatingSystem::Linux
  }
}

/// Case-insensitive substring match using ASCII folding only.
///
/// `needle` must already be lowercase ASCII.
fn contains_folded(haystack: &str, needle: &str) -> bool {
  haystack.to_ascii_lowercase().contains(needle)
}
