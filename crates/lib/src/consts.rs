//! Crate-wide constants.

/// Logical name of the packaged native module (`lib<name><suffix>` on disk)
pub const LIBRARY_NAME: &str = "h3";

/// Buffer size for streaming a payload into the extracted file
pub const COPY_BUFFER_SIZE: usize = 4096;

/// Maximum number of vertices in a cell boundary
pub const MAX_CELL_BOUNDARY_VERTS: usize = 10;

/// Largest valid resolution
pub const MAX_RESOLUTION: i32 = 15;

/// Buffer size for the string form of an index: 16 hex digits plus NUL
pub const INDEX_STRING_CAPACITY: usize = 17;

/// Upper bound on any result buffer the contract will allocate
pub const MAX_BUFFER_CAPACITY: usize = 1 << 28;

pub const ENV_EXTRACT_DIR: &str = "H3NATIVE_EXTRACT_DIR";
pub const ENV_RESOURCE_DIR: &str = "H3NATIVE_RESOURCE_DIR";
pub const ENV_DISABLE: &str = "H3NATIVE_DISABLE";
pub const ENV_VENDOR: &str = "H3NATIVE_VENDOR";
pub const ENV_OS_NAME: &str = "H3NATIVE_OS_NAME";
pub const ENV_ARCH: &str = "H3NATIVE_ARCH";
