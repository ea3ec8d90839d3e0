use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, info};

use super::source::{ResourceSource, resource_path};
use crate::consts::COPY_BUFFER_SIZE;
use crate::error::LoadError;
use crate::platform::PlatformKey;

/// Copies packaged payloads to files the OS loader can open
pub struct Extractor<'a> {
  source: &'a dyn ResourceSource,
  library_name: &'a str,
  extract_dir: PathBuf,
}

impl<'a> Extractor<'a> {
  pub fn new(source: &'a dyn ResourceSource, library_name: &'a str, extract_dir: impl Into<PathBuf>) -> Self {
    Self {
      source,
      library_name,
      extract_dir: extract_dir.into(),
    }
  }

  /// Write the payload for `key` to a new temporary file
  ///
  /// The file is owner read/write/execute only. It is removed again when the
  /// returned value is dropped unless [`ExtractedLibrary::keep`] is called.
  pub fn materialize(&self, key: &PlatformKey) -> Result<ExtractedLibrary, LoadError> {
    let resource = resource_path(key, self.library_name);

    let mut reader = self
      .source
      .open(&resource)
      .map_err(|e| LoadError::io(&resource, e))?
      .ok_or_else(|| LoadError::ResourceNotFound {
        key: key.clone(),
        path: resource.clone(),
      })?;

    fs::create_dir_all(&self.extract_dir).map_err(|e| LoadError::io(&self.extract_dir, e))?;

    let temp = tempfile::Builder::new()
      .prefix(&format!("lib{}", self.library_name))
      .suffix(key.os.library_suffix())
      .tempfile_in(&self.extract_dir)
      .map_err(|e| LoadError::io(&self.extract_dir, e))?;

    debug!(path = ?temp.path(), "created extraction target");
    restrict_permissions(temp.path()).map_err(|e| LoadError::io(temp.path(), e))?;

    let (mut file, path) = temp.into_parts();
    let written = copy_stream(&mut reader, &mut file).map_err(|e| LoadError::io(&*path, e))?;
    file.sync_all().map_err(|e| LoadError::io(&*path, e))?;
    // Close the handle so the OS loader can open the file everywhere.
    drop(file);

    info!(
      resource = %resource,
      source = %self.source.describe(),
      path = ?&*path,
      bytes = written,
      "extracted native library"
    );

    Ok(ExtractedLibrary { path })
  }
}

/// An extracted library file
#[derive(Debug)]
pub struct ExtractedLibrary {
  path: TempPath,
}

impl ExtractedLibrary {
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Stop deleting the file on drop and return its path
  pub fn keep(self) -> Result<PathBuf, LoadError> {
    self.path.keep().map_err(|e| LoadError::io(e.path.to_path_buf(), e.error))
  }
}

/// Owner read, write and execute. Never group or world executable.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
  use std::os::unix::fs::PermissionsExt;

  fs::set_permissions(path, fs::Permissions::from_mode(0o700))
}

// Files created by tempfile on Windows are already private to the owner.
#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
  Ok(())
}

/// Copy `reader` into `writer` through a fixed-size buffer
pub(crate) fn copy_stream<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
  R: Read + ?Sized,
  W: Write + ?Sized,
{
  let mut buf = [0u8; COPY_BUFFER_SIZE];
  let mut total = 0u64;

  loop {
    let read = match reader.read(&mut buf) {
      Ok(0) => break,
      Ok(n) => n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(e) => return Err(e),
    };
    writer.write_all(&buf[..read])?;
    total += read as u64;
  }

  writer.flush()?;
  Ok(total)
}
