//! Freshness validation for charts overwritten in place.
//!
//! The hourly aviation chart reuses one URL per hour slot, so yesterday's file
//! answers with a success status until today's is published. The remote
//! `Last-Modified` is the only signal that tells them apart.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::data::HttpSource;
use crate::domain::{Candidate, ChartFamily};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale { age: TimeDelta },
    /// No usable `Last-Modified`; the candidate is skipped rather than risked.
    Unverifiable,
}

/// `now - last_modified <= bound`.
pub fn within_bound(last_modified: DateTime<Utc>, bound: TimeDelta, now: DateTime<Utc>) -> bool {
    now - last_modified <= bound
}

pub struct FreshnessValidator<'a> {
    http: &'a dyn HttpSource,
}

impl<'a> FreshnessValidator<'a> {
    pub fn new(http: &'a dyn HttpSource) -> Self {
        Self { http }
    }

    /// Metadata-only check of `url` against `bound`.
    pub fn assess(&self, url: &str, bound: TimeDelta, now: DateTime<Utc>) -> Freshness {
        match self.http.last_modified(url) {
            Ok(Some(last_modified)) if within_bound(last_modified, bound, now) => Freshness::Fresh,
            Ok(Some(last_modified)) => Freshness::Stale {
                age: now - last_modified,
            },
            Ok(None) => Freshness::Unverifiable,
            Err(err) => {
                debug!(url, error = %err, "metadata request failed");
                Freshness::Unverifiable
            }
        }
    }

    /// Freshness of `candidate`: fresh iff `now - last_modified <= bound`.
    pub fn check(
        &self,
        family: &ChartFamily,
        candidate: &Candidate,
        bound: TimeDelta,
        now: DateTime<Utc>,
    ) -> Freshness {
        self.assess(&family.remote.url(candidate.at), bound, now)
    }
}
