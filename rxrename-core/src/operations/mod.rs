//! High-level operations that correspond to CLI invocations
//!
//! These modules tie pattern and template loading, candidate discovery, planning and
//! execution together, separated from CLI concerns like argument parsing and output
//! formatting.

pub mod plan;
pub mod rename;

pub use plan::{plan_operation, RenameRequest};
pub use rename::rename_operation;
