//! Candidate walking: first success wins, exhaustion is not an error.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::data::HttpSource;
use crate::domain::{Candidate, ChartFamily, FetchResult, Payload};
use crate::io::FileStore;
use crate::resolve::Fetcher;
use crate::schedule::{candidates, previous_issuance};

pub struct Resolver<'a> {
    fetcher: Fetcher<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(http: &'a dyn HttpSource, store: &'a dyn FileStore) -> Self {
        Self {
            fetcher: Fetcher::new(http, store),
        }
    }

    /// Most recent available issuance of `family`, or `None` once the lookback window is exhausted.
    pub fn resolve(&self, family: &ChartFamily, now: DateTime<Utc>) -> Option<Payload> {
        let mut tried = 0usize;
        for candidate in candidates(family, now) {
            tried += 1;
            match self.fetcher.fetch(family, &candidate, now) {
                FetchResult::Hit(payload) => return Some(payload),
                FetchResult::Miss(miss) => {
                    debug!(family = family.key, at = %candidate.at, reason = %miss, "candidate missed");
                }
            }
        }
        warn!(family = family.key, tried, "no issuance available in lookback window");
        None
    }

    /// Latest issuance plus the scheduled issuance immediately before it.
    ///
    /// The previous one is computed from the schedule, not searched: if that
    /// exact issuance fails, the pair is `(latest, None)`.
    pub fn resolve_pair(
        &self,
        family: &ChartFamily,
        now: DateTime<Utc>,
    ) -> (Option<Payload>, Option<Payload>) {
        let Some(latest) = self.resolve(family, now) else {
            return (None, None);
        };

        let prior = previous_issuance(family, latest.candidate.at)
            .filter(|at| *at <= now)
            .and_then(|at| {
                let candidate = Candidate {
                    family: family.key,
                    at,
                };
                match self.fetcher.fetch(family, &candidate, now) {
                    FetchResult::Hit(payload) => Some(payload),
                    FetchResult::Miss(miss) => {
                        warn!(family = family.key, at = %at, reason = %miss, "previous issuance unavailable");
                        None
                    }
                }
            });

        if let Some(prior) = &prior {
            info!(
                family = family.key,
                latest = %latest.candidate.at,
                prior = %prior.candidate.at,
                "resolved issuance pair"
            );
        }
        (Some(latest), prior)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::data::scripted::ScriptedSource;
    use crate::domain::catalog;
    use crate::io::MemoryStore;

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, d, h, 0, 0).unwrap()
    }

    #[test]
    fn resolve_walks_candidates_until_first_hit() {
        let family = catalog::find("asas").unwrap();
        let url = |at| family.remote.url(at);
        let http = ScriptedSource::new()
            .with_status(url(utc(10, 12)), 404)
            .with_transport_error(url(utc(10, 6)), "connection reset")
            .with_body(url(utc(10, 0)), b"%PDF".to_vec());
        let store = MemoryStore::new();

        let payload = Resolver::new(&http, &store)
            .resolve(&family, utc(10, 13))
            .unwrap();
        assert_eq!(payload.candidate.at, utc(10, 0));
        assert_eq!(
            http.gets(),
            vec![url(utc(10, 12)), url(utc(10, 6)), url(utc(10, 0))]
        );
    }

    #[test]
    fn exhaustion_yields_none_and_writes_nothing() {
        let family = catalog::find("ashfall-kirishimayama").unwrap();
        let http = ScriptedSource::new();
        let store = MemoryStore::new();

        assert!(Resolver::new(&http, &store).resolve(&family, utc(10, 9)).is_none());
        assert_eq!(http.gets().len(), 11);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn ashfall_skips_placeholder_and_takes_older_real_chart() {
        let family = catalog::find("ashfall-sakurajima").unwrap();
        let url = |at| family.remote.url(at);
        let http = ScriptedSource::new()
            .with_body(url(utc(10, 8)), vec![1u8; 512])
            .with_body(url(utc(10, 5)), vec![1u8; catalog::ASHFALL_MIN_BYTES + 1]);
        let store = MemoryStore::new();

        let payload = Resolver::new(&http, &store)
            .resolve(&family, utc(10, 9))
            .unwrap();
        assert_eq!(payload.candidate.at, utc(10, 5));
        assert_eq!(store.list().unwrap(), vec!["ASHFALL_Sakurajima_20260510050000.pdf"]);
    }

    #[test]
    fn pair_previous_of_six_is_midnight_same_day() {
        let family = catalog::find("asas").unwrap();
        let url = |at| family.remote.url(at);
        let http = ScriptedSource::new()
            .with_body(url(utc(10, 6)), b"latest".to_vec())
            .with_body(url(utc(10, 0)), b"prior".to_vec());
        let store = MemoryStore::new();

        let (latest, prior) = Resolver::new(&http, &store).resolve_pair(&family, utc(10, 9));
        assert_eq!(latest.unwrap().candidate.at, utc(10, 6));
        assert_eq!(prior.unwrap().candidate.at, utc(10, 0));
    }

    #[test]
    fn pair_previous_of_midnight_is_eighteen_the_day_before() {
        let family = catalog::find("asas").unwrap();
        let url = |at| family.remote.url(at);
        let http = ScriptedSource::new()
            .with_body(url(utc(10, 0)), b"latest".to_vec())
            .with_body(url(utc(9, 18)), b"prior".to_vec());
        let store = MemoryStore::new();

        let (latest, prior) = Resolver::new(&http, &store).resolve_pair(&family, utc(10, 3));
        assert_eq!(latest.unwrap().candidate.at, utc(10, 0));
        assert_eq!(prior.unwrap().candidate.at, utc(9, 18));
    }

    #[test]
    fn pair_does_not_search_past_a_missing_previous() {
        let family = catalog::find("asas").unwrap();
        let url = |at| family.remote.url(at);
        // 06:00 exists, 00:00 is missing, yesterday's 18:00 exists but must not be used.
        let http = ScriptedSource::new()
            .with_body(url(utc(10, 6)), b"latest".to_vec())
            .with_body(url(utc(9, 18)), b"older".to_vec());
        let store = MemoryStore::new();

        let (latest, prior) = Resolver::new(&http, &store).resolve_pair(&family, utc(10, 9));
        assert_eq!(latest.unwrap().candidate.at, utc(10, 6));
        assert!(prior.is_none());
        assert!(!http.gets().contains(&url(utc(9, 18))));
    }

    #[test]
    fn pair_with_nothing_published_is_empty() {
        let family = catalog::find("asas").unwrap();
        let http = ScriptedSource::new();
        let store = MemoryStore::new();
        let (latest, prior) = Resolver::new(&http, &store).resolve_pair(&family, utc(10, 9));
        assert!(latest.is_none() && prior.is_none());
    }

    #[test]
    fn freshness_validated_family_skips_stale_slots() {
        let family = catalog::find("fxjp106").unwrap();
        let url = |at| family.remote.url(at);
        let now = utc(10, 10);
        // 09:00 slot still holds yesterday's chart; 06:00 was refreshed this morning.
        let http = ScriptedSource::new()
            .with_body(url(utc(10, 9)), b"old".to_vec())
            .with_last_modified(url(utc(10, 9)), utc(9, 9))
            .with_body(url(utc(10, 6)), b"new".to_vec())
            .with_last_modified(url(utc(10, 6)), utc(10, 6));
        let store = MemoryStore::new();

        let payload = Resolver::new(&http, &store).resolve(&family, now).unwrap();
        assert_eq!(payload.candidate.at, utc(10, 6));
        assert_eq!(payload.bytes, b"new".to_vec());
        assert_eq!(http.gets(), vec![url(utc(10, 6))]);
    }
}
