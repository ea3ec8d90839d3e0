use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use libloading::Library;
use tracing::debug;

use crate::error::LoadError;
use crate::native::{DynamicH3, H3Api};

/// What to ask the OS loader for
#[derive(Debug, Clone, Copy)]
pub enum LinkTarget<'a> {
  /// A specific file, usually a freshly extracted payload
  Path(&'a Path),
  /// A logical module name resolved through the system library search path
  System(&'a str),
}

impl fmt::Display for LinkTarget<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Path(path) => write!(f, "{}", path.display()),
      Self::System(name) => write!(f, "{}", libloading::library_filename(name).to_string_lossy()),
    }
  }
}

/// The step that maps a native module into the process
pub trait Linker: Send + Sync {
  fn link(&self, target: LinkTarget<'_>) -> Result<Arc<dyn H3Api>, LoadError>;
}

/// Links through the platform's dynamic loader
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicLinker;

impl Linker for DynamicLinker {
  fn link(&self, target: LinkTarget<'_>) -> Result<Arc<dyn H3Api>, LoadError> {
    let name = target.to_string();
    let file: OsString = match target {
      LinkTarget::Path(path) => {
        check_readable(path)?;
        path.as_os_str().to_owned()
      }
      LinkTarget::System(module) => libloading::library_filename(module),
    };

    debug!(target = %name, "opening native library");

    // SAFETY: loading runs the module's initializers. The target is either a
    // payload packaged for this platform or the module the host installed
    // under the library's own name.
    let library = unsafe { Library::new(&file) }.map_err(|source| classify(name.clone(), source))?;

    // SAFETY: as above, the module is the H3 C library.
    let api = unsafe { DynamicH3::new(library, &name)? };
    Ok(Arc::new(api))
  }
}

/// Open `path` once before the OS loader does
///
/// A refused open surfaces as an [`std::io::ErrorKind::PermissionDenied`], which
/// does not depend on the language the OS reports errors in.
fn check_readable(path: &Path) -> Result<(), LoadError> {
  File::open(path).map(drop).map_err(|e| LoadError::io(path, e))
}

/// Sort a loader failure into a denial or a linkage error
///
/// The loader only reports text. Denials past [`check_readable`] (a `noexec`
/// mount, a code-signing policy) are recognized in English messages only and
/// otherwise come back as linkage failures.
fn classify(target: String, source: libloading::Error) -> LoadError {
  let message = source.to_string();
  let denied = ["Operation not permitted", "Permission denied", "Access is denied"]
    .iter()
    .any(|needle| message.contains(needle));

  if denied {
    LoadError::SecurityDenied {
      reason: format!("{target}: {message}"),
    }
  } else {
    LoadError::Linkage { target, source }
  }
}
