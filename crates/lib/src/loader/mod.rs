//! Getting the native library into the process, exactly once.
//!
//! The first successful call to [`load`], [`load_explicit`] or
//! [`load_from_system_path`] detects the platform (unless told), extracts the
//! matching payload and links it. Every later call, from any thread, gets a
//! handle to that same module; nothing is extracted or linked again.
//!
//! A failed attempt leaves the process unloaded, and the next call tries
//! again from scratch. A loaded module is never unloaded.

mod cell;
mod linker;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

pub use cell::LoadCell;
pub use linker::{DynamicLinker, LinkTarget, Linker};

use crate::config::LoaderConfig;
use crate::consts::ENV_DISABLE;
use crate::error::LoadError;
use crate::h3::H3;
use crate::native::H3Api;
use crate::platform::PlatformKey;
use crate::resource::{DirectoryResources, EmbeddedResources, Extractor, ResourceSource};

/// How the loaded module got into the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
  /// Extracted from the packaged payload for `key` to `path`
  Extracted { key: PlatformKey, path: PathBuf },
  /// Resolved by the OS loader from its search path
  SystemPath { name: String },
}

/// A linked native module
pub struct LoadedLibrary {
  api: Arc<dyn H3Api>,
  origin: LoadOrigin,
}

impl LoadedLibrary {
  pub fn api(&self) -> &Arc<dyn H3Api> {
    &self.api
  }

  pub fn origin(&self) -> &LoadOrigin {
    &self.origin
  }

  fn extracted_path(&self) -> Option<&Path> {
    match &self.origin {
      LoadOrigin::Extracted { path, .. } => Some(path),
      LoadOrigin::SystemPath { .. } => None,
    }
  }
}

impl std::fmt::Debug for LoadedLibrary {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LoadedLibrary").field("origin", &self.origin).finish_non_exhaustive()
  }
}

/// One detect → extract → link sequence, without any once-only guard
///
/// The process-wide entry points run a `Loader` inside the singleton's
/// critical section. On its own it is useful for wiring in a different
/// resource source or linker.
pub struct Loader<'a> {
  config: &'a LoaderConfig,
  source: &'a dyn ResourceSource,
  linker: &'a dyn Linker,
}

impl<'a> Loader<'a> {
  pub fn new(config: &'a LoaderConfig, source: &'a dyn ResourceSource, linker: &'a dyn Linker) -> Self {
    Self { config, source, linker }
  }

  /// Detect the platform and load its packaged library
  pub fn load(&self) -> Result<LoadedLibrary, LoadError> {
    let props = self.config.system_properties();
    let key = PlatformKey::detect(&props);
    debug!(
      vendor = %props.vendor,
      os_name = %props.os_name,
      arch = %props.arch,
      key = %key,
      "detected platform"
    );
    self.load_key(&key)
  }

  /// Load the packaged library for an explicit platform key
  pub fn load_key(&self, key: &PlatformKey) -> Result<LoadedLibrary, LoadError> {
    self.ensure_allowed()?;

    let extractor = Extractor::new(self.source, &self.config.library_name, self.config.extract_dir());
    let extracted = extractor.materialize(key)?;

    // On failure `extracted` is dropped here, which removes the file.
    let api = self.linker.link(LinkTarget::Path(extracted.path()))?;
    let path = extracted.keep()?;

    info!(key = %key, path = ?path, "loaded native library");
    Ok(LoadedLibrary {
      api,
      origin: LoadOrigin::Extracted { key: key.clone(), path },
    })
  }

  /// Load the library from the system search path
  pub fn load_system(&self) -> Result<LoadedLibrary, LoadError> {
    self.ensure_allowed()?;

    let name = self.config.library_name.clone();
    let api = self.linker.link(LinkTarget::System(&name))?;

    info!(name = %name, "loaded native library from system path");
    Ok(LoadedLibrary {
      api,
      origin: LoadOrigin::SystemPath { name },
    })
  }

  fn ensure_allowed(&self) -> Result<(), LoadError> {
    if self.config.allow_native {
      Ok(())
    } else {
      Err(LoadError::SecurityDenied {
        reason: format!("native code loading is disabled ({ENV_DISABLE})"),
      })
    }
  }
}

static LIBRARY: LoadCell<LoadedLibrary> = LoadCell::new();

/// Load the library for the detected platform
///
/// Configuration comes from [`LoaderConfig::from_env`].
pub fn load() -> Result<H3, LoadError> {
  load_with_config(&LoaderConfig::from_env())
}

pub fn load_with_config(config: &LoaderConfig) -> Result<H3, LoadError> {
  singleton(config, &DynamicLinker, None, |loader| loader.load())
}

/// Load the library packaged for `key`, skipping detection
///
/// If a module is already loaded it is returned as is, even when it was
/// loaded for a different key; one process holds one module.
pub fn load_explicit(key: PlatformKey) -> Result<H3, LoadError> {
  load_explicit_with_config(key, &LoaderConfig::from_env())
}

pub fn load_explicit_with_config(key: PlatformKey, config: &LoaderConfig) -> Result<H3, LoadError> {
  singleton(config, &DynamicLinker, Some(&key), |loader| loader.load_key(&key))
}

/// Load the library installed on the system instead of a packaged one
pub fn load_from_system_path() -> Result<H3, LoadError> {
  load_from_system_path_with_config(&LoaderConfig::from_env())
}

pub fn load_from_system_path_with_config(config: &LoaderConfig) -> Result<H3, LoadError> {
  singleton(config, &DynamicLinker, None, |loader| loader.load_system())
}

/// Handle to the loaded module, if any, without attempting a load
pub fn loaded() -> Option<H3> {
  LIBRARY.get().map(H3::from_loaded)
}

/// How the loaded module got into the process, if one is loaded
pub fn origin() -> Option<&'static LoadOrigin> {
  LIBRARY.get().map(LoadedLibrary::origin)
}

fn singleton<F>(
  config: &LoaderConfig,
  linker: &dyn Linker,
  requested: Option<&PlatformKey>,
  op: F,
) -> Result<H3, LoadError>
where
  F: FnOnce(&Loader<'_>) -> Result<LoadedLibrary, LoadError>,
{
  let library = LIBRARY.get_or_try_init(|| {
    let source: Box<dyn ResourceSource> = match &config.resource_dir {
      Some(dir) => Box::new(DirectoryResources::new(dir)),
      None => Box::new(EmbeddedResources),
    };
    let loaded = op(&Loader::new(config, source.as_ref(), linker))?;
    if loaded.extracted_path().is_some() {
      remove_extracted_at_exit();
    }
    Ok(loaded)
  })?;

  if let Some(requested) = requested
    && let LoadOrigin::Extracted { key, .. } = library.origin()
    && key != requested
  {
    warn!(requested = %requested, loaded = %key, "native library already loaded for another platform");
  }

  Ok(H3::from_loaded(library))
}

/// Best-effort removal of the extracted file when the process exits.
///
/// Runs only for normal exits; an abruptly terminated process leaves the
/// file behind. Removal can also fail where the OS keeps loaded modules
/// locked.
fn remove_extracted_at_exit() {
  extern "C" fn remove() {
    if let Some(path) = LIBRARY.get().and_then(LoadedLibrary::extracted_path) {
      let _ = std::fs::remove_file(path);
    }
  }

  // SAFETY: `remove` is a plain function that neither panics nor unwinds.
  let status = unsafe { libc::atexit(remove) };
  if status != 0 {
    warn!("could not register removal of the extracted native library at exit");
  }
}
