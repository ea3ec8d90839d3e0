use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

use rust_embed::RustEmbed;

use crate::platform::PlatformKey;

/// Where packaged payloads are read from
pub trait ResourceSource: Send + Sync {
  /// Open the payload at `path` (`/`-separated, relative to the source root)
  ///
  /// Returns `Ok(None)` when there is no such payload.
  fn open(&self, path: &str) -> io::Result<Option<Box<dyn Read + Send>>>;

  /// Short description for logs and diagnostics
  fn describe(&self) -> String;
}

/// Resource path of the library for `key`: `{os}-{arch}/lib{name}{suffix}`
pub fn resource_path(key: &PlatformKey, library_name: &str) -> String {
  format!("{}/lib{}{}", key.dir_name(), library_name, key.os.library_suffix())
}

#[derive(RustEmbed)]
#[folder = "native/"]
#[exclude = "*.md"]
struct Payloads;

/// Payloads compiled into the crate from its `native/` directory
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedResources;

impl ResourceSource for EmbeddedResources {
  fn open(&self, path: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
    Ok(Payloads::get(path).map(|file| Box::new(Cursor::new(file.data)) as Box<dyn Read + Send>))
  }

  fn describe(&self) -> String {
    "embedded payloads".to_string()
  }
}

/// Payloads laid out on disk under a root directory
#[derive(Debug, Clone)]
pub struct DirectoryResources {
  root: PathBuf,
}

impl DirectoryResources {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl ResourceSource for DirectoryResources {
  fn open(&self, path: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
    let relative = Path::new(path);
    // Architecture tokens can come from the environment; never leave the root.
    if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
      return Ok(None);
    }

    match File::open(self.root.join(relative)) {
      Ok(file) => Ok(Some(Box::new(file))),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  fn describe(&self) -> String {
    format!("directory {}", self.root.display())
  }
}
