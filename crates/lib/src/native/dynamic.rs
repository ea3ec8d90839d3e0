//! [`H3Api`] backed by a dynamically loaded shared library.

use std::ffi::{CStr, c_char, c_int};

use libloading::Library;
use tracing::debug;

use super::api::{CellBoundary, H3Api, LatLng};
use crate::error::LoadError;
use crate::error_code::FailureKind;

type H3Error = u32;

type CellPredicateFn = unsafe extern "C" fn(u64) -> c_int;
type CellIntFn = unsafe extern "C" fn(u64) -> c_int;
type LatLngToCellFn = unsafe extern "C" fn(*const LatLng, c_int, *mut u64) -> H3Error;
type CellToLatLngFn = unsafe extern "C" fn(u64, *mut LatLng) -> H3Error;
type CellToBoundaryFn = unsafe extern "C" fn(u64, *mut CellBoundary) -> H3Error;
type CellToParentFn = unsafe extern "C" fn(u64, c_int, *mut u64) -> H3Error;
type CellToChildrenSizeFn = unsafe extern "C" fn(u64, c_int, *mut i64) -> H3Error;
type CellToChildrenFn = unsafe extern "C" fn(u64, c_int, *mut u64) -> H3Error;
type MaxGridDiskSizeFn = unsafe extern "C" fn(c_int, *mut i64) -> H3Error;
type GridDiskFn = unsafe extern "C" fn(u64, c_int, *mut u64) -> H3Error;
type GridDistanceFn = unsafe extern "C" fn(u64, u64, *mut i64) -> H3Error;
type CompactCellsFn = unsafe extern "C" fn(*const u64, *mut u64, i64) -> H3Error;
type UncompactCellsSizeFn = unsafe extern "C" fn(*const u64, i64, c_int, *mut i64) -> H3Error;
type UncompactCellsFn = unsafe extern "C" fn(*const u64, i64, *mut u64, i64, c_int) -> H3Error;
type StringToH3Fn = unsafe extern "C" fn(*const c_char, *mut u64) -> H3Error;
type H3ToStringFn = unsafe extern "C" fn(u64, *mut c_char, usize) -> H3Error;
type GetNumCellsFn = unsafe extern "C" fn(c_int, *mut i64) -> H3Error;

const MEMORY_BOUNDS: H3Error = FailureKind::MemoryBounds.code();
const DOMAIN: H3Error = FailureKind::Domain.code();

struct FunctionTable {
  is_valid_cell: CellPredicateFn,
  get_resolution: CellIntFn,
  get_base_cell_number: CellIntFn,
  is_pentagon: CellPredicateFn,
  lat_lng_to_cell: LatLngToCellFn,
  cell_to_lat_lng: CellToLatLngFn,
  cell_to_boundary: CellToBoundaryFn,
  cell_to_parent: CellToParentFn,
  cell_to_children_size: CellToChildrenSizeFn,
  cell_to_children: CellToChildrenFn,
  max_grid_disk_size: MaxGridDiskSizeFn,
  grid_disk: GridDiskFn,
  grid_distance: GridDistanceFn,
  compact_cells: CompactCellsFn,
  uncompact_cells_size: UncompactCellsSizeFn,
  uncompact_cells: UncompactCellsFn,
  string_to_h3: StringToH3Fn,
  h3_to_string: H3ToStringFn,
  get_num_cells: GetNumCellsFn,
}

impl FunctionTable {
  /// # Safety
  ///
  /// `library` must be the H3 C library, so every resolved symbol has the
  /// signature declared for it above.
  unsafe fn resolve(library: &Library, target: &str) -> Result<Self, LoadError> {
    // SAFETY: guaranteed by the caller.
    unsafe {
      Ok(Self {
        is_valid_cell: symbol(library, target, "isValidCell")?,
        get_resolution: symbol(library, target, "getResolution")?,
        get_base_cell_number: symbol(library, target, "getBaseCellNumber")?,
        is_pentagon: symbol(library, target, "isPentagon")?,
        lat_lng_to_cell: symbol(library, target, "latLngToCell")?,
        cell_to_lat_lng: symbol(library, target, "cellToLatLng")?,
        cell_to_boundary: symbol(library, target, "cellToBoundary")?,
        cell_to_parent: symbol(library, target, "cellToParent")?,
        cell_to_children_size: symbol(library, target, "cellToChildrenSize")?,
        cell_to_children: symbol(library, target, "cellToChildren")?,
        max_grid_disk_size: symbol(library, target, "maxGridDiskSize")?,
        grid_disk: symbol(library, target, "gridDisk")?,
        grid_distance: symbol(library, target, "gridDistance")?,
        compact_cells: symbol(library, target, "compactCells")?,
        uncompact_cells_size: symbol(library, target, "uncompactCellsSize")?,
        uncompact_cells: symbol(library, target, "uncompactCells")?,
        string_to_h3: symbol(library, target, "stringToH3")?,
        h3_to_string: symbol(library, target, "h3ToString")?,
        get_num_cells: symbol(library, target, "getNumCells")?,
      })
    }
  }
}

/// # Safety
///
/// `T` must be the function pointer type of the exported symbol.
unsafe fn symbol<T: Copy>(library: &Library, target: &str, name: &'static str) -> Result<T, LoadError> {
  // SAFETY: guaranteed by the caller.
  let sym = unsafe { library.get::<T>(name.as_bytes()) }.map_err(|source| LoadError::MissingSymbol {
    target: target.to_string(),
    symbol: name,
    source,
  })?;
  Ok(*sym)
}

/// The native function table of a loaded module
pub struct DynamicH3 {
  fns: FunctionTable,
  // Keeps the module mapped for as long as `fns` is reachable.
  _library: Library,
}

impl DynamicH3 {
  /// Resolve the function table from a loaded library
  ///
  /// `target` names the library in error messages.
  ///
  /// # Safety
  ///
  /// `library` must be a build of the H3 C library (v4 API).
  pub unsafe fn new(library: Library, target: &str) -> Result<Self, LoadError> {
    // SAFETY: guaranteed by the caller.
    let fns = unsafe { FunctionTable::resolve(&library, target)? };
    debug!(target = %target, "resolved native function table");
    Ok(Self { fns, _library: library })
  }
}

fn len_i64(len: usize) -> Option<i64> {
  i64::try_from(len).ok()
}

/// Whether `out` can hold the `required` elements the native side will write
fn fits(out: usize, required: i64) -> bool {
  usize::try_from(required).is_ok_and(|required| required <= out)
}

// SAFETY (all calls below): the function pointers were resolved from the H3
// library with matching signatures, the library outlives `self`, and every
// pointer passed refers to a live Rust value or a slice whose length is at
// least what the native function writes.
impl H3Api for DynamicH3 {
  fn is_valid_cell(&self, cell: u64) -> bool {
    unsafe { (self.fns.is_valid_cell)(cell) != 0 }
  }

  fn get_resolution(&self, cell: u64) -> i32 {
    unsafe { (self.fns.get_resolution)(cell) }
  }

  fn get_base_cell_number(&self, cell: u64) -> i32 {
    unsafe { (self.fns.get_base_cell_number)(cell) }
  }

  fn is_pentagon(&self, cell: u64) -> bool {
    unsafe { (self.fns.is_pentagon)(cell) != 0 }
  }

  fn lat_lng_to_cell(&self, point: &LatLng, res: i32, out: &mut u64) -> u32 {
    unsafe { (self.fns.lat_lng_to_cell)(point, res, out) }
  }

  fn cell_to_lat_lng(&self, cell: u64, out: &mut LatLng) -> u32 {
    unsafe { (self.fns.cell_to_lat_lng)(cell, out) }
  }

  fn cell_to_boundary(&self, cell: u64, out: &mut CellBoundary) -> u32 {
    unsafe { (self.fns.cell_to_boundary)(cell, out) }
  }

  fn cell_to_parent(&self, cell: u64, parent_res: i32, out: &mut u64) -> u32 {
    unsafe { (self.fns.cell_to_parent)(cell, parent_res, out) }
  }

  fn cell_to_children_size(&self, cell: u64, child_res: i32, out: &mut i64) -> u32 {
    unsafe { (self.fns.cell_to_children_size)(cell, child_res, out) }
  }

  fn cell_to_children(&self, cell: u64, child_res: i32, out: &mut [u64]) -> u32 {
    let mut required = 0i64;
    let err = self.cell_to_children_size(cell, child_res, &mut required);
    if err != 0 {
      return err;
    }
    if !fits(out.len(), required) {
      return MEMORY_BOUNDS;
    }
    unsafe { (self.fns.cell_to_children)(cell, child_res, out.as_mut_ptr()) }
  }

  fn max_grid_disk_size(&self, k: i32, out: &mut i64) -> u32 {
    unsafe { (self.fns.max_grid_disk_size)(k, out) }
  }

  fn grid_disk(&self, origin: u64, k: i32, out: &mut [u64]) -> u32 {
    let mut required = 0i64;
    let err = self.max_grid_disk_size(k, &mut required);
    if err != 0 {
      return err;
    }
    if !fits(out.len(), required) {
      return MEMORY_BOUNDS;
    }
    unsafe { (self.fns.grid_disk)(origin, k, out.as_mut_ptr()) }
  }

  fn grid_distance(&self, origin: u64, destination: u64, out: &mut i64) -> u32 {
    unsafe { (self.fns.grid_distance)(origin, destination, out) }
  }

  fn compact_cells(&self, cells: &[u64], out: &mut [u64]) -> u32 {
    if out.len() < cells.len() {
      return MEMORY_BOUNDS;
    }
    let Some(num_cells) = len_i64(cells.len()) else {
      return DOMAIN;
    };
    unsafe { (self.fns.compact_cells)(cells.as_ptr(), out.as_mut_ptr(), num_cells) }
  }

  fn uncompact_cells_size(&self, cells: &[u64], res: i32, out: &mut i64) -> u32 {
    let Some(num_cells) = len_i64(cells.len()) else {
      return DOMAIN;
    };
    unsafe { (self.fns.uncompact_cells_size)(cells.as_ptr(), num_cells, res, out) }
  }

  fn uncompact_cells(&self, cells: &[u64], res: i32, out: &mut [u64]) -> u32 {
    let (Some(num_cells), Some(num_out)) = (len_i64(cells.len()), len_i64(out.len())) else {
      return DOMAIN;
    };
    unsafe { (self.fns.uncompact_cells)(cells.as_ptr(), num_cells, out.as_mut_ptr(), num_out, res) }
  }

  fn string_to_h3(&self, text: &CStr, out: &mut u64) -> u32 {
    unsafe { (self.fns.string_to_h3)(text.as_ptr(), out) }
  }

  fn h3_to_string(&self, index: u64, out: &mut [u8]) -> u32 {
    unsafe { (self.fns.h3_to_string)(index, out.as_mut_ptr().cast::<c_char>(), out.len()) }
  }

  fn get_num_cells(&self, res: i32, out: &mut i64) -> u32 {
    unsafe { (self.fns.get_num_cells)(res, out) }
  }
}
