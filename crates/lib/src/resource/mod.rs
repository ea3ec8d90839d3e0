//! Packaged native libraries and their extraction.
//!
//! Payloads are laid out as `{os}-{arch}/lib<name><suffix>`, either embedded
//! in the crate or in a directory on disk. The extractor streams the payload
//! for a platform key into a fresh, owner-only temporary file.

pub mod extract;
pub mod source;

pub use extract::{ExtractedLibrary, Extractor};
pub use source::{DirectoryResources, EmbeddedResources, ResourceSource, resource_path};
