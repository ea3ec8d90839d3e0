use std::ffi::CStr;

use crate::consts::MAX_CELL_BOUNDARY_VERTS;

/// A coordinate in radians, laid out as the native `LatLng`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatLng {
  pub lat: f64,
  pub lng: f64,
}

impl LatLng {
  pub const fn new(lat: f64, lng: f64) -> Self {
    Self { lat, lng }
  }
}

/// Cell boundary, laid out as the native `CellBoundary`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBoundary {
  pub num_verts: i32,
  pub verts: [LatLng; MAX_CELL_BOUNDARY_VERTS],
}

impl Default for CellBoundary {
  fn default() -> Self {
    Self {
      num_verts: 0,
      verts: [LatLng::default(); MAX_CELL_BOUNDARY_VERTS],
    }
  }
}

impl CellBoundary {
  /// The populated vertices, clamped to the array size
  pub fn vertices(&self) -> &[LatLng] {
    let n = usize::try_from(self.num_verts).unwrap_or(0).min(MAX_CELL_BOUNDARY_VERTS);
    &self.verts[..n]
  }
}

/// Function table of the native library.
///
/// Methods mirror the C functions one to one: indexes are raw `u64`,
/// coordinates are radians, and fallible functions return the native error
/// code (`0` on success) after writing into the given output. Callers go
/// through [`crate::contract`] rather than inspecting codes themselves.
///
/// Output slices are sized by the caller. Implementations must not write past
/// the end of a slice; when a slice is too short for a function that has no
/// capacity argument, they return the "insufficient memory bounds" code.
pub trait H3Api: Send + Sync {
  fn is_valid_cell(&self, cell: u64) -> bool;

  fn get_resolution(&self, cell: u64) -> i32;

  fn get_base_cell_number(&self, cell: u64) -> i32;

  fn is_pentagon(&self, cell: u64) -> bool;

  fn lat_lng_to_cell(&self, point: &LatLng, res: i32, out: &mut u64) -> u32;

  fn cell_to_lat_lng(&self, cell: u64, out: &mut LatLng) -> u32;

  fn cell_to_boundary(&self, cell: u64, out: &mut CellBoundary) -> u32;

  fn cell_to_parent(&self, cell: u64, parent_res: i32, out: &mut u64) -> u32;

  fn cell_to_children_size(&self, cell: u64, child_res: i32, out: &mut i64) -> u32;

  fn cell_to_children(&self, cell: u64, child_res: i32, out: &mut [u64]) -> u32;

  fn max_grid_disk_size(&self, k: i32, out: &mut i64) -> u32;

  fn grid_disk(&self, origin: u64, k: i32, out: &mut [u64]) -> u32;

  fn grid_distance(&self, origin: u64, destination: u64, out: &mut i64) -> u32;

  /// `out` must be at least as long as `cells`
  fn compact_cells(&self, cells: &[u64], out: &mut [u64]) -> u32;

  fn uncompact_cells_size(&self, cells: &[u64], res: i32, out: &mut i64) -> u32;

  /// Has a capacity argument: the native side reports a too-small `out`
  fn uncompact_cells(&self, cells: &[u64], res: i32, out: &mut [u64]) -> u32;

  fn string_to_h3(&self, text: &CStr, out: &mut u64) -> u32;

  /// Writes a NUL-terminated string; a too-small `out` is reported
  fn h3_to_string(&self, index: u64, out: &mut [u8]) -> u32;

  fn get_num_cells(&self, res: i32, out: &mut i64) -> u32;
}
