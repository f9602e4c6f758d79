//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - chart family configuration (`ChartFamily`, `Schedule`, `Outputs`)
//! - remote identifier templates (`RemoteName`)
//! - transient resolution values (`Candidate`, `Payload`, `FetchResult`, `Miss`)
//! - the static JMA catalog (`catalog`)

pub mod catalog;
pub mod remote;
pub mod types;

pub use remote::*;
pub use types::*;
