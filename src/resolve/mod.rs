//! Chart resolution.
//!
//! Responsibilities:
//!
//! - fetch one candidate and validate the payload (`fetcher`)
//! - reject overwritten-in-place charts that have not been refreshed (`freshness`)
//! - walk the candidate list until something resolves (`resolver`)

pub mod fetcher;
pub mod freshness;
pub mod resolver;

pub use fetcher::*;
pub use freshness::*;
pub use resolver::*;
