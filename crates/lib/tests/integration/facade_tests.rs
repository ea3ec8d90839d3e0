use std::sync::Arc;

use h3native_lib::{FailureKind, H3, PackedIndex};

use super::common::EchoH3;

fn echo() -> H3 {
  H3::from_api(Arc::new(EchoH3))
}

#[test]
fn indexes_cross_the_boundary_bit_for_bit() {
  let h3 = echo();

  for raw in [0x8928308280fffffu64, 0x8029fffffffffff, u64::MAX, 1] {
    let index = PackedIndex(raw);
    let text = h3.cell_to_string(index).unwrap();
    assert_eq!(text, index.to_string());
    assert_eq!(h3.string_to_cell(&text).unwrap(), index);
    assert_eq!(text.parse::<PackedIndex>().unwrap(), index);
  }
}

#[test]
fn native_codes_become_typed_errors() {
  let err = echo().cell_to_lat_lng(PackedIndex::INVALID).unwrap_err();

  assert_eq!(err.kind(), FailureKind::CellInvalid);
  assert_eq!(err.code(), 5);
  assert_eq!(err.message(), "Cell argument was not valid");
  assert!(err.to_string().contains("code 5"));
}

#[test]
fn resolution_is_validated_before_the_call() {
  let err = echo().lat_lng_to_cell(0.0, 0.0, 16).unwrap_err();
  assert_eq!(err.kind(), FailureKind::ResDomain);

  let cell = echo().lat_lng_to_cell(0.0, 0.0, 15).unwrap();
  assert_eq!(cell.resolution(), 15);
}

#[test]
fn buffer_operations_return_only_populated_slots() {
  let h3 = echo();
  let cell = PackedIndex(0x8928308280fffff);

  assert_eq!(h3.cell_to_children(cell, 10).unwrap(), vec![cell]);
  assert_eq!(h3.grid_disk(cell, 0).unwrap(), vec![cell]);
  assert_eq!(h3.compact_cells(&[cell]).unwrap(), vec![cell]);
  assert_eq!(h3.uncompact_cells(&[cell], 9).unwrap(), vec![cell]);
  assert!(h3.compact_cells(&[]).unwrap().is_empty());
}
