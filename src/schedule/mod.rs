//! Schedule model: which issuance instants to try, in which order.
//!
//! Everything here is a pure function of `now` and the family configuration, so
//! the candidate list can be regenerated at any time (e.g. by `briefwx plan`).

pub mod candidates;

pub use candidates::*;
