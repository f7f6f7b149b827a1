//! Store abstractions the pipeline depends on.
//!
//! Both collaborators are injected as trait objects so tests can substitute
//! fakes and deployments can swap backends without touching the pipeline:
//! - **media**: asset enumeration and file lookup
//! - **metadata**: persisted hash records, one per asset

pub mod media;
pub mod metadata;

pub use media::{DirMediaStore, MediaStore};
pub use metadata::{JsonMetadataStore, MemoryMetadataStore, MetadataStore};
