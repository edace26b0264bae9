//! Storage backends for wind tile artifacts.
//!
//! Everything the pipeline publishes goes through [`ArtifactSink`]:
//! - [`FilesystemSink`] writes under a local output root
//! - [`ObjectStorage`] writes to an S3-compatible bucket
//! - [`FanoutSink`] forwards each write to several sinks
//! - [`MemorySink`] keeps artifacts in memory

pub mod error;
pub mod fanout;
pub mod filesystem;
pub mod memory;
pub mod object_store;
pub mod sink;

pub use self::object_store::{ObjectStorage, ObjectStorageConfig};
pub use error::{StorageError, StorageResult};
pub use fanout::FanoutSink;
pub use filesystem::FilesystemSink;
pub use memory::MemorySink;
pub use sink::{content_type_for, ArtifactSink};
