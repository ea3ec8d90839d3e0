use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized CPU architecture token
///
/// Known raw values are mapped to `x64`, `x86` or `arm64`. Anything else is
/// kept verbatim so new architectures can be packaged without a code change;
/// a missing package then surfaces as a resource lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Architecture(String);

impl Architecture {
  pub const X64: &'static str = "x64";
  pub const X86: &'static str = "x86";
  pub const ARM64: &'static str = "arm64";

  /// Wrap an already-normalized token without applying the detection table
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Architecture {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<&str> for Architecture {
  fn from(token: &str) -> Self {
    Self::new(token)
  }
}

/// Normalize a raw, OS-reported architecture string
///
/// Matching is exact. This function is total: unknown input comes back
/// unchanged.
pub fn detect_architecture(raw: &str) -> Architecture {
  let token = match raw {
    "amd64" | "x86_64" => Architecture::X64,
    "i386" | "i486" | "i586" | "i686" | "i786" | "i886" => Architecture::X86,
    "aarch64" => Architecture::ARM64,
    other => other,
  };
  Architecture::new(token)
}
