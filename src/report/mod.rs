//! Terminal output for runs and dry-run plans.

pub mod format;

pub use format::*;
