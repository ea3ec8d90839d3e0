//! Loader configuration.
//!
//! Defaults suit embedded payloads extracted to the system temp directory.
//! Each setting can be overridden from the environment (see
//! [`LoaderConfig::from_env`]) or deserialized from a host application's own
//! configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::consts::{
  ENV_ARCH, ENV_DISABLE, ENV_EXTRACT_DIR, ENV_OS_NAME, ENV_RESOURCE_DIR, ENV_VENDOR, LIBRARY_NAME,
};
use crate::platform::SystemProperties;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
  /// Logical module name; the file looked up is `lib<name><suffix>`
  pub library_name: String,
  /// Directory extracted libraries are written to (system temp dir if unset)
  pub extract_dir: Option<PathBuf>,
  /// Read payloads from this directory instead of the embedded ones
  pub resource_dir: Option<PathBuf>,
  /// When false, every load attempt is refused
  pub allow_native: bool,
  pub vendor: Option<String>,
  pub os_name: Option<String>,
  pub arch: Option<String>,
}

impl Default for LoaderConfig {
  fn default() -> Self {
    Self {
      library_name: LIBRARY_NAME.to_string(),
      extract_dir: None,
      resource_dir: None,
      allow_native: true,
      vendor: None,
      os_name: None,
      arch: None,
    }
  }
}

impl LoaderConfig {
  /// Defaults with environment overrides applied
  pub fn from_env() -> Self {
    Self::default().with_env_overrides()
  }

  /// Apply the `H3NATIVE_*` environment variables on top of `self`
  pub fn with_env_overrides(mut self) -> Self {
    if let Some(dir) = env_var(ENV_EXTRACT_DIR) {
      self.extract_dir = Some(PathBuf::from(dir));
    }
    if let Some(dir) = env_var(ENV_RESOURCE_DIR) {
      self.resource_dir = Some(PathBuf::from(dir));
    }
    if let Some(value) = env_var(ENV_DISABLE) {
      self.allow_native = !is_truthy(&value);
    }
    if let Some(vendor) = env_var(ENV_VENDOR) {
      self.vendor = Some(vendor);
    }
    if let Some(os_name) = env_var(ENV_OS_NAME) {
      self.os_name = Some(os_name);
    }
    if let Some(arch) = env_var(ENV_ARCH) {
      self.arch = Some(arch);
    }
    self
  }

  /// Properties of the running process with configured overrides applied
  pub fn system_properties(&self) -> SystemProperties {
    let mut props = SystemProperties::current();
    if let Some(vendor) = &self.vendor {
      props.vendor.clone_from(vendor);
    }
    if let Some(os_name) = &self.os_name {
      props.os_name.clone_from(os_name);
    }
    if let Some(arch) = &self.arch {
      props.arch.clone_from(arch);
    }
    props
  }

  /// Directory extracted libraries are written to
  pub fn extract_dir(&self) -> PathBuf {
    self.extract_dir.clone().unwrap_or_else(std::env::temp_dir)
  }
}

/// Non-empty value of an environment variable
fn env_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn is_truthy(value: &str) -> bool {
  matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
