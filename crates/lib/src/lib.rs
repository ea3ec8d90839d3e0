//! h3native-lib: loads the H3 geospatial C library and calls into it
//!
//! The crate ships prebuilt copies of the native library for several
//! platforms. At first use it:
//! - detects the running platform (`platform`)
//! - extracts the matching payload to a private temporary file (`resource`)
//! - links it exactly once per process (`loader`)
//!
//! Calls then go through [`H3`], which turns native return codes into
//! [`H3Error`]s and sizes output buffers the way the library expects
//! (`contract`).

pub mod config;
pub mod consts;
pub mod contract;
pub mod error;
pub mod error_code;
pub mod h3;
pub mod index;
pub mod loader;
pub mod native;
pub mod platform;
pub mod resource;
pub(crate) mod util;

pub use config::LoaderConfig;
pub use error::{LoadError, LoadErrorKind};
pub use error_code::{FailureKind, H3Error};
pub use h3::H3;
pub use index::PackedIndex;
pub use loader::{LoadOrigin, load, load_explicit, load_from_system_path, loaded};
pub use platform::{Architecture, OperatingSystem, PlatformKey};
