//! Single-candidate fetch.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::data::HttpSource;
use crate::domain::{Candidate, ChartFamily, FetchResult, Miss, Payload};
use crate::io::FileStore;
use crate::resolve::{Freshness, FreshnessValidator};

pub struct Fetcher<'a> {
    http: &'a dyn HttpSource,
    store: &'a dyn FileStore,
}

impl<'a> Fetcher<'a> {
    pub fn new(http: &'a dyn HttpSource, store: &'a dyn FileStore) -> Self {
        Self { http, store }
    }

    /// Fetch `candidate`, validate it, and write the raw payload to the store.
    ///
    /// Every failure is a `Miss`: the caller moves on to the next candidate.
    /// Only payloads that pass validation are ever written.
    pub fn fetch(&self, family: &ChartFamily, candidate: &Candidate, now: DateTime<Utc>) -> FetchResult {
        let url = family.remote.url(candidate.at);

        if let Some(bound) = family.staleness_bound() {
            match FreshnessValidator::new(self.http).check(family, candidate, bound, now) {
                Freshness::Fresh => {}
                Freshness::Stale { age } => {
                    return FetchResult::Miss(Miss::Stale {
                        age_minutes: age.num_minutes(),
                    });
                }
                Freshness::Unverifiable => return FetchResult::Miss(Miss::Unverifiable),
            }
        }

        let resp = match self.http.get(&url) {
            Ok(resp) => resp,
            Err(err) => return FetchResult::Miss(Miss::Transport(err.message().to_string())),
        };
        if !resp.is_success() {
            return FetchResult::Miss(Miss::Status(resp.status));
        }
        if resp.body.len() < family.min_payload_bytes {
            return FetchResult::Miss(Miss::TooSmall {
                len: resp.body.len(),
                min: family.min_payload_bytes,
            });
        }

        let stored_as = family.remote.scratch_name(candidate.at);
        if let Err(err) = self.store.put(&stored_as, &resp.body) {
            return FetchResult::Miss(Miss::Store(err.message().to_string()));
        }

        info!(
            family = family.key,
            at = %candidate.at,
            bytes = resp.body.len(),
            stored_as = %stored_as,
            "fetched chart"
        );

        FetchResult::Hit(Payload {
            candidate: *candidate,
            bytes: resp.body,
            stored_as,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::data::scripted::ScriptedSource;
    use crate::domain::catalog;
    use crate::io::MemoryStore;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, h, 0, 0).unwrap()
    }

    fn candidate(family: &ChartFamily, h: u32) -> Candidate {
        Candidate {
            family: family.key,
            at: at(h),
        }
    }

    #[test]
    fn hit_is_written_under_scratch_name() {
        let family = catalog::find("aupq35").unwrap();
        let c = candidate(&family, 12);
        let http = ScriptedSource::new().with_body(family.remote.url(c.at), b"%PDF-chart".to_vec());
        let store = MemoryStore::new();

        let payload = Fetcher::new(&http, &store)
            .fetch(&family, &c, at(14))
            .into_hit()
            .unwrap();
        assert_eq!(payload.stored_as, "AUPQ35_202605101200.pdf");
        assert_eq!(store.get("AUPQ35_202605101200.pdf").unwrap(), Some(b"%PDF-chart".to_vec()));
    }

    #[test]
    fn error_status_is_a_miss() {
        let family = catalog::find("aupq35").unwrap();
        let c = candidate(&family, 12);
        let http = ScriptedSource::new().with_status(family.remote.url(c.at), 503);
        let store = MemoryStore::new();
        match Fetcher::new(&http, &store).fetch(&family, &c, at(14)) {
            FetchResult::Miss(miss) => assert_eq!(miss, Miss::Status(503)),
            FetchResult::Hit(_) => panic!("expected miss"),
        }
    }

    #[test]
    fn undersized_payload_is_never_stored() {
        let family = catalog::find("ashfall-sakurajima").unwrap();
        let c = candidate(&family, 11);
        let http = ScriptedSource::new().with_body(family.remote.url(c.at), vec![0u8; 2048]);
        let store = MemoryStore::new();

        match Fetcher::new(&http, &store).fetch(&family, &c, at(12)) {
            FetchResult::Miss(miss) => assert_eq!(
                miss,
                Miss::TooSmall {
                    len: 2048,
                    min: catalog::ASHFALL_MIN_BYTES
                }
            ),
            FetchResult::Hit(_) => panic!("expected miss"),
        }
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn payload_at_minimum_size_is_accepted_one_byte_less_is_not() {
        let family = catalog::find("ashfall-sakurajima").unwrap();
        let c = candidate(&family, 11);
        let url = family.remote.url(c.at);
        let store = MemoryStore::new();

        let http = ScriptedSource::new().with_body(url.clone(), vec![0u8; catalog::ASHFALL_MIN_BYTES]);
        assert!(Fetcher::new(&http, &store).fetch(&family, &c, at(12)).into_hit().is_some());

        let http = ScriptedSource::new().with_body(url, vec![0u8; catalog::ASHFALL_MIN_BYTES - 1]);
        match Fetcher::new(&http, &store).fetch(&family, &c, at(12)) {
            FetchResult::Miss(miss) => assert_eq!(
                miss,
                Miss::TooSmall {
                    len: catalog::ASHFALL_MIN_BYTES - 1,
                    min: catalog::ASHFALL_MIN_BYTES
                }
            ),
            FetchResult::Hit(_) => panic!("expected miss"),
        }
    }

    #[test]
    fn transport_failure_is_a_miss() {
        let family = catalog::find("fbjp").unwrap();
        let c = Candidate {
            family: family.key,
            at: at(3),
        };
        let http = ScriptedSource::new().with_transport_error(family.remote.url(c.at), "timed out");
        let store = MemoryStore::new();
        match Fetcher::new(&http, &store).fetch(&family, &c, at(3)) {
            FetchResult::Miss(Miss::Transport(msg)) => assert_eq!(msg, "timed out"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn stale_candidate_is_not_downloaded() {
        let family = catalog::find("fxjp106").unwrap();
        let c = candidate(&family, 9);
        let url = family.remote.url(c.at);
        let http = ScriptedSource::new()
            .with_body(url.clone(), b"png".to_vec())
            .with_last_modified(url, at(10) - TimeDelta::hours(13));
        let store = MemoryStore::new();

        match Fetcher::new(&http, &store).fetch(&family, &c, at(10)) {
            FetchResult::Miss(miss) => assert_eq!(miss, Miss::Stale { age_minutes: 13 * 60 }),
            FetchResult::Hit(_) => panic!("expected miss"),
        }
        assert!(http.gets().is_empty());
    }

    #[test]
    fn fresh_candidate_is_downloaded() {
        let family = catalog::find("fxjp106").unwrap();
        let c = candidate(&family, 9);
        let url = family.remote.url(c.at);
        let http = ScriptedSource::new()
            .with_body(url.clone(), b"png".to_vec())
            .with_last_modified(url, at(10) - TimeDelta::hours(11));
        let store = MemoryStore::new();

        assert!(Fetcher::new(&http, &store).fetch(&family, &c, at(10)).into_hit().is_some());
    }
}
