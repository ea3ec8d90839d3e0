//! Test doubles for the native function table and the linker.
//!
//! `FakeH3` answers like the native library does, closely enough to drive
//! every branch of the calling convention: sizes, "too small" reports and
//! failure codes. Its indexes are not real cells.

use std::collections::{HashMap, HashSet};
use std::ffi::CStr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::error::LoadError;
use crate::error_code::FailureKind;
use crate::index::{PackedIndex, RES_MASK, RES_OFFSET};
use crate::loader::{LinkTarget, Linker};
use crate::native::{CellBoundary, H3Api, LatLng};

const OK: u32 = 0;

fn code(kind: FailureKind) -> u32 {
  kind.code()
}

fn with_resolution(cell: u64, res: i32) -> u64 {
  (cell & !RES_MASK) | ((res as u64) << RES_OFFSET)
}

fn resolution(cell: u64) -> i32 {
  i32::from(PackedIndex(cell).resolution())
}

fn descendants(count: usize, res: i32, child_res: i32) -> Option<usize> {
  let depth = u32::try_from(child_res - res).ok()?;
  7usize.checked_pow(depth)?.checked_mul(count)
}

#[derive(Default)]
pub struct FakeH3 {
  uncompact_size_shortfall: usize,
  min_string_capacity: usize,
  calls: Mutex<HashMap<&'static str, usize>>,
  last_point: Mutex<Option<LatLng>>,
}

impl FakeH3 {
  /// Under-report the uncompact size by `n` to force retries
  pub fn with_uncompact_shortfall(mut self, n: usize) -> Self {
    self.uncompact_size_shortfall = n;
    self
  }

  /// Refuse string buffers shorter than `n`
  pub fn with_min_string_capacity(mut self, n: usize) -> Self {
    self.min_string_capacity = n;
    self
  }

  pub fn calls(&self, name: &str) -> usize {
    self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
  }

  pub fn last_point(&self) -> Option<LatLng> {
    *self.last_point.lock().unwrap()
  }

  fn record(&self, name: &'static str) {
    *self.calls.lock().unwrap().entry(name).or_default() += 1;
  }
}

impl H3Api for FakeH3 {
  fn is_valid_cell(&self, cell: u64) -> bool {
    cell != 0
  }

  fn get_resolution(&self, cell: u64) -> i32 {
    resolution(cell)
  }

  fn get_base_cell_number(&self, cell: u64) -> i32 {
    ((cell >> 45) & 0x7f) as i32
  }

  fn is_pentagon(&self, _cell: u64) -> bool {
    false
  }

  fn lat_lng_to_cell(&self, point: &LatLng, res: i32, out: &mut u64) -> u32 {
    self.record("lat_lng_to_cell");
    *self.last_point.lock().unwrap() = Some(*point);
    if !(0..=15).contains(&res) {
      return code(FailureKind::ResDomain);
    }
    if !point.lat.is_finite() || !point.lng.is_finite() {
      return code(FailureKind::LatLngDomain);
    }
    let digits = (point.lat.abs() * 1e6) as u64 & 0xffff_ffff;
    *out = with_resolution(0x0800_0000_0000_0000 | digits, res);
    OK
  }

  fn cell_to_lat_lng(&self, cell: u64, out: &mut LatLng) -> u32 {
    if cell == 0 {
      return code(FailureKind::CellInvalid);
    }
    *out = LatLng::new(30f64.to_radians(), (-60f64).to_radians());
    OK
  }

  fn cell_to_boundary(&self, cell: u64, out: &mut CellBoundary) -> u32 {
    if cell == 0 {
      return code(FailureKind::CellInvalid);
    }
    out.num_verts = 6;
    for (i, vert) in out.verts.iter_mut().take(6).enumerate() {
      *vert = LatLng::new(30f64.to_radians(), (i as f64).to_radians());
    }
    OK
  }

  fn cell_to_parent(&self, cell: u64, parent_res: i32, out: &mut u64) -> u32 {
    if !(0..=15).contains(&parent_res) {
      return code(FailureKind::ResDomain);
    }
    if parent_res > resolution(cell) {
      return code(FailureKind::ResMismatch);
    }
    *out = with_resolution(cell, parent_res);
    OK
  }

  fn cell_to_children_size(&self, cell: u64, child_res: i32, out: &mut i64) -> u32 {
    match descendants(1, resolution(cell), child_res) {
      Some(n) if child_res <= 15 => {
        *out = n as i64;
        OK
      }
      _ => code(FailureKind::ResDomain),
    }
  }

  fn cell_to_children(&self, cell: u64, child_res: i32, out: &mut [u64]) -> u32 {
    self.record("cell_to_children");
    let Some(n) = descendants(1, resolution(cell), child_res) else {
      return code(FailureKind::ResDomain);
    };
    if out.len() < n {
      return code(FailureKind::MemoryBounds);
    }
    let base = with_resolution(cell, child_res);
    for (i, slot) in out.iter_mut().take(n).enumerate() {
      *slot = base + i as u64;
    }
    OK
  }

  fn max_grid_disk_size(&self, k: i32, out: &mut i64) -> u32 {
    if k < 0 {
      return code(FailureKind::Domain);
    }
    let k = i64::from(k);
    *out = 3 * k * (k + 1) + 1;
    OK
  }

  /// Leaves the last slot empty, as the native side does near pentagons
  fn grid_disk(&self, origin: u64, k: i32, out: &mut [u64]) -> u32 {
    self.record("grid_disk");
    let mut size = 0;
    let status = self.max_grid_disk_size(k, &mut size);
    if status != OK {
      return status;
    }
    let size = size as usize;
    if out.len() < size {
      return code(FailureKind::MemoryBounds);
    }
    for (i, slot) in out.iter_mut().take(size - 1).enumerate() {
      *slot = origin + i as u64;
    }
    OK
  }

  fn grid_distance(&self, origin: u64, destination: u64, out: &mut i64) -> u32 {
    if resolution(origin) != resolution(destination) {
      return code(FailureKind::ResMismatch);
    }
    *out = i64::from((origin ^ destination).count_ones());
    OK
  }

  fn compact_cells(&self, cells: &[u64], out: &mut [u64]) -> u32 {
    if out.len() < cells.len() {
      return code(FailureKind::MemoryBounds);
    }
    let mut seen = HashSet::new();
    for (cell, slot) in cells.iter().zip(out.iter_mut()) {
      if !seen.insert(*cell) {
        return code(FailureKind::DuplicateInput);
      }
      *slot = *cell;
    }
    OK
  }

  fn uncompact_cells_size(&self, cells: &[u64], res: i32, out: &mut i64) -> u32 {
    let Some(total) = self.uncompacted_len(cells, res) else {
      return code(FailureKind::ResDomain);
    };
    *out = total.saturating_sub(self.uncompact_size_shortfall) as i64;
    OK
  }

  fn uncompact_cells(&self, cells: &[u64], res: i32, out: &mut [u64]) -> u32 {
    self.record("uncompact_cells");
    let Some(total) = self.uncompacted_len(cells, res) else {
      return code(FailureKind::ResDomain);
    };
    if out.len() < total {
      return code(FailureKind::MemoryBounds);
    }
    let mut slots = out.iter_mut();
    for &cell in cells {
      let base = with_resolution(cell, res);
      let n = descendants(1, resolution(cell), res).unwrap_or(0);
      for (i, slot) in slots.by_ref().take(n).enumerate() {
        *slot = base + i as u64;
      }
    }
    OK
  }

  fn string_to_h3(&self, text: &CStr, out: &mut u64) -> u32 {
    self.record("string_to_h3");
    match text.to_str().ok().and_then(|s| s.parse::<PackedIndex>().ok()) {
      Some(index) => {
        *out = index.raw();
        OK
      }
      None => code(FailureKind::Failed),
    }
  }

  fn h3_to_string(&self, index: u64, out: &mut [u8]) -> u32 {
    self.record("h3_to_string");
    let text = format!("{index:x}");
    if out.len() < (text.len() + 1).max(self.min_string_capacity) {
      return code(FailureKind::MemoryBounds);
    }
    out[..text.len()].copy_from_slice(text.as_bytes());
    out[text.len()] = 0;
    OK
  }

  fn get_num_cells(&self, res: i32, out: &mut i64) -> u32 {
    match u32::try_from(res) {
      Ok(res) if res <= 15 => {
        *out = 2 + 120 * 7i64.pow(res);
        OK
      }
      _ => code(FailureKind::ResDomain),
    }
  }
}

impl FakeH3 {
  fn uncompacted_len(&self, cells: &[u64], res: i32) -> Option<usize> {
    if res > 15 {
      return None;
    }
    cells
      .iter()
      .try_fold(0usize, |acc, &cell| acc.checked_add(descendants(1, resolution(cell), res)?))
  }
}

/// Links every target to a fresh [`FakeH3`] and records what it was asked for
#[derive(Default)]
pub struct CountingLinker {
  calls: AtomicUsize,
  paths: Mutex<Vec<PathBuf>>,
  system_names: Mutex<Vec<String>>,
}

impl CountingLinker {
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn last_path(&self) -> Option<PathBuf> {
    self.paths.lock().unwrap().last().cloned()
  }

  pub fn system_names(&self) -> Vec<String> {
    self.system_names.lock().unwrap().clone()
  }
}

impl Linker for CountingLinker {
  fn link(&self, target: LinkTarget<'_>) -> Result<Arc<dyn H3Api>, LoadError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    // Widen the window for racing callers.
    thread::sleep(Duration::from_millis(10));
    match target {
      LinkTarget::Path(path) => self.paths.lock().unwrap().push(path.to_path_buf()),
      LinkTarget::System(name) => self.system_names.lock().unwrap().push(name.to_string()),
    }
    Ok(Arc::new(FakeH3::default()))
  }
}
