//! Remote chart source access.
//!
//! - `HttpSource` is the capability the resolver depends on
//! - `JmaClient` is the blocking reqwest implementation used by the binary

pub mod jma;
#[cfg(test)]
pub(crate) mod scripted;

pub use jma::*;
