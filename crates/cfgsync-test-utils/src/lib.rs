//! Shared test utilities for the cfgsync workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`dir`]: [`TestConfigDir`], a temporary configuration directory builder
//! - [`fixtures`]: sample configuration variants

pub mod dir;
pub mod fixtures;

pub use dir::TestConfigDir;
