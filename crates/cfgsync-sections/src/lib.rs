//! Section location, extraction, merging and validation for cfgsync.
//!
//! A configuration file is handled as a plain sequence of lines. A *section*
//! is the body between a header line and its closing line:
//!
//! ```text
//!   keybind: [        <- header, excluded
//!     (command: ...), <- body, the half-open range [start, end)
//!   ],                <- closing line, excluded
//! ```
//!
//! The crate never parses the configuration format itself. It finds the
//! header by a full-line match on `<name>: [`, takes the first following line
//! that trims to `],` as the end, and copies bodies around verbatim, line
//! terminators included.
//!
//! - [`locator`] finds a section's bounds
//! - [`extract`] copies a body out of the active document
//! - [`merge`] splices a body into a target document
//! - [`validate`] compares merged bodies against the active document

pub mod document;
pub mod error;
pub mod extract;
pub mod locator;
pub mod merge;
pub mod validate;

pub use document::ConfigDocument;
pub use error::{Error, Result};
pub use extract::extract;
pub use locator::{Section, SectionStatus, locate, probe, validate_section_name};
pub use merge::{MergeOutcome, Merged, MissingSectionPolicy, merge};
pub use validate::{ValidationError, validate_all, validate_section};
