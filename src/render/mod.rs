//! Raster work on resolved charts.
//!
//! - overlay compositing onto every page of a chart (`composite`)
//! - page normalization and combined-document assembly (`assemble`)
//! - the PDF writer behind the combined document (`pdf`)

pub mod assemble;
pub mod composite;
pub mod pdf;

pub use assemble::*;
pub use composite::*;
pub use pdf::*;
