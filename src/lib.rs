//! `briefwx` library crate.
//!
//! The binary (`briefwx`) is a thin wrapper around this library so that:
//!
//! - the resolver and raster code is testable without network or processes
//! - every external effect (HTTP, files, PDF rasterizing) sits behind a trait

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod render;
pub mod report;
pub mod resolve;
pub mod schedule;
