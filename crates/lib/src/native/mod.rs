//! The native function table.
//!
//! [`H3Api`] is the only way the rest of the crate reaches native code. The
//! loader produces a [`DynamicH3`]; tests substitute their own implementation.

pub mod api;
pub mod dynamic;

pub use api::{CellBoundary, H3Api, LatLng};
pub use dynamic::DynamicH3;
