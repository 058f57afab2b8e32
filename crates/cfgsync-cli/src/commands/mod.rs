//! Command implementations for cfgsync-cli

pub mod backups;
pub mod status;
pub mod sync;

pub use backups::{run_list, run_prune, run_restore};
pub use status::run_status;
pub use sync::{run_check, run_sync};
