//! Application layer: running step trees
//!
//! Adapts the domain's async traversal to external callers, sync or async.

pub mod entry_point;
pub mod error;

pub use entry_point::{build_runtime, run_blocking, EntryPoint};
pub use error::{ApplicationError, ApplicationResult};
