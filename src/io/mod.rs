//! Input/output collaborators.
//!
//! - file-store capability + directory and in-memory backends (`store`)
//! - PDF rasterizing and PNG encode/decode (`convert`)

pub mod convert;
pub mod store;

pub use convert::*;
pub use store::*;
