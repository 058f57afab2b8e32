//! Filesystem primitives for cfgsync
//!
//! Provides path handling, line-preserving text I/O with atomic writes,
//! content checksums, format-agnostic settings loading and the run lock
//! that keeps two sync runs from overlapping.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use lock::RunLock;
pub use path::NormalizedPath;
