//! Typed handle over the loaded native library.
//!
//! Every fallible method makes its native call(s) through [`crate::contract`]:
//! outputs are sized up front where the library reports a size, grown on an
//! "insufficient memory bounds" report where it does not, and any other code
//! comes back as an [`H3Error`]. Coordinates are in degrees on this side of
//! the boundary and radians on the other.

use std::ffi::CString;
use std::fmt;
use std::sync::Arc;

use crate::consts::{INDEX_STRING_CAPACITY, MAX_BUFFER_CAPACITY, MAX_RESOLUTION};
use crate::contract::{capacity, fill, fill_growable, non_zero};
use crate::error::LoadError;
use crate::error_code::{FailureKind, H3Error, check};
use crate::index::PackedIndex;
use crate::loader::{self, LoadedLibrary};
use crate::native::{CellBoundary, H3Api, LatLng};
use crate::platform::PlatformKey;

/// Cheap to clone; all clones share the one loaded module.
#[derive(Clone)]
pub struct H3 {
  api: Arc<dyn H3Api>,
}

impl fmt::Debug for H3 {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("H3").finish_non_exhaustive()
  }
}

impl H3 {
  /// Load (or reuse) the library for the detected platform
  pub fn new() -> Result<Self, LoadError> {
    loader::load()
  }

  /// Load (or reuse) the library packaged for `key`
  pub fn with_platform(key: PlatformKey) -> Result<Self, LoadError> {
    loader::load_explicit(key)
  }

  /// Load (or reuse) the library from the system search path
  pub fn system() -> Result<Self, LoadError> {
    loader::load_from_system_path()
  }

  /// Wrap any implementation of the native function table
  pub fn from_api(api: Arc<dyn H3Api>) -> Self {
    Self { api }
  }

  pub(crate) fn from_loaded(library: &LoadedLibrary) -> Self {
    Self::from_api(Arc::clone(library.api()))
  }

  pub fn api(&self) -> &dyn H3Api {
    self.api.as_ref()
  }

  pub fn is_valid_cell(&self, cell: PackedIndex) -> bool {
    self.api.is_valid_cell(cell.raw())
  }

  pub fn resolution(&self, cell: PackedIndex) -> i32 {
    self.api.get_resolution(cell.raw())
  }

  pub fn base_cell_number(&self, cell: PackedIndex) -> i32 {
    self.api.get_base_cell_number(cell.raw())
  }

  pub fn is_pentagon(&self, cell: PackedIndex) -> bool {
    self.api.is_pentagon(cell.raw())
  }

  /// Cell containing the point `(lat, lng)`, in degrees
  pub fn lat_lng_to_cell(&self, lat: f64, lng: f64, res: i32) -> Result<PackedIndex, H3Error> {
    check_resolution(res)?;
    let point = LatLng::new(lat.to_radians(), lng.to_radians());
    let mut out = 0;
    check(self.api.lat_lng_to_cell(&point, res, &mut out))?;
    Ok(PackedIndex(out))
  }

  /// Center of `cell` as `(lat, lng)` in degrees
  pub fn cell_to_lat_lng(&self, cell: PackedIndex) -> Result<(f64, f64), H3Error> {
    let mut out = LatLng::default();
    check(self.api.cell_to_lat_lng(cell.raw(), &mut out))?;
    Ok(degrees(&out))
  }

  /// Boundary vertices of `cell` as `(lat, lng)` pairs in degrees
  pub fn cell_to_boundary(&self, cell: PackedIndex) -> Result<Vec<(f64, f64)>, H3Error> {
    let mut out = CellBoundary::default();
    check(self.api.cell_to_boundary(cell.raw(), &mut out))?;
    Ok(out.vertices().iter().map(degrees).collect())
  }

  pub fn cell_to_parent(&self, cell: PackedIndex, parent_res: i32) -> Result<PackedIndex, H3Error> {
    let mut out = 0;
    check(self.api.cell_to_parent(cell.raw(), parent_res, &mut out))?;
    Ok(PackedIndex(out))
  }

  pub fn cell_to_children(&self, cell: PackedIndex, child_res: i32) -> Result<Vec<PackedIndex>, H3Error> {
    let mut size = 0;
    check(self.api.cell_to_children_size(cell.raw(), child_res, &mut size))?;
    let buf = fill(capacity(size)?, |out: &mut [u64]| {
      self.api.cell_to_children(cell.raw(), child_res, out)
    })?;
    Ok(indexes(non_zero(buf)))
  }

  /// All cells within `k` steps of `origin`, in no particular order
  pub fn grid_disk(&self, origin: PackedIndex, k: i32) -> Result<Vec<PackedIndex>, H3Error> {
    let mut size = 0;
    check(self.api.max_grid_disk_size(k, &mut size))?;
    let buf = fill(capacity(size)?, |out: &mut [u64]| self.api.grid_disk(origin.raw(), k, out))?;
    Ok(indexes(non_zero(buf)))
  }

  pub fn grid_distance(&self, origin: PackedIndex, destination: PackedIndex) -> Result<i64, H3Error> {
    let mut out = 0;
    check(self.api.grid_distance(origin.raw(), destination.raw(), &mut out))?;
    Ok(out)
  }

  pub fn compact_cells(&self, cells: &[PackedIndex]) -> Result<Vec<PackedIndex>, H3Error> {
    let raw = raw_indexes(cells);
    let buf = fill(raw.len(), |out: &mut [u64]| self.api.compact_cells(&raw, out))?;
    Ok(indexes(non_zero(buf)))
  }

  pub fn uncompact_cells(&self, cells: &[PackedIndex], res: i32) -> Result<Vec<PackedIndex>, H3Error> {
    let raw = raw_indexes(cells);
    let mut size = 0;
    check(self.api.uncompact_cells_size(&raw, res, &mut size))?;
    // The reported size is a starting point; the call itself says if it needs more.
    let buf = fill_growable(capacity(size)?, MAX_BUFFER_CAPACITY, |out: &mut [u64]| {
      self.api.uncompact_cells(&raw, res, out)
    })?;
    Ok(indexes(non_zero(buf)))
  }

  /// Lowercase hex form of `index`, as produced by the native library
  pub fn cell_to_string(&self, index: PackedIndex) -> Result<String, H3Error> {
    let buf = fill_growable(INDEX_STRING_CAPACITY, MAX_BUFFER_CAPACITY, |out: &mut [u8]| {
      self.api.h3_to_string(index.raw(), out)
    })?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
  }

  pub fn string_to_cell(&self, text: &str) -> Result<PackedIndex, H3Error> {
    let text = CString::new(text).map_err(|_| H3Error::from_kind(FailureKind::Failed))?;
    let mut out = 0;
    check(self.api.string_to_h3(&text, &mut out))?;
    Ok(PackedIndex(out))
  }

  /// Number of cells at resolution `res`
  pub fn num_cells(&self, res: i32) -> Result<i64, H3Error> {
    let mut out = 0;
    check(self.api.get_num_cells(res, &mut out))?;
    Ok(out)
  }
}

fn check_resolution(res: i32) -> Result<(), H3Error> {
  if (0..=MAX_RESOLUTION).contains(&res) {
    Ok(())
  } else {
    Err(H3Error::from_kind(FailureKind::ResDomain))
  }
}

fn degrees(point: &LatLng) -> (f64, f64) {
  (point.lat.to_degrees(), point.lng.to_degrees())
}

fn raw_indexes(cells: &[PackedIndex]) -> Vec<u64> {
  cells.iter().map(PackedIndex::raw).collect()
}

fn indexes(raw: Vec<u64>) -> Vec<PackedIndex> {
  raw.into_iter().map(PackedIndex).collect()
}
