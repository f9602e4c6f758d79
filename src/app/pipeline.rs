//! Shared batch pipeline used by the `run`, `plan`, and `assemble` commands.
//!
//! resolve (network) -> normalize to PNG (+ overlay) -> file store -> combined document
//!
//! All I/O goes through the `Services` capabilities, so a whole run can be
//! driven by a fixed clock, a scripted remote, and in-memory stores.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::data::HttpSource;
use crate::domain::{ChartFamily, Outputs, Payload, PayloadKind, ResolvedOutput, RunConfig};
use crate::error::AppError;
use crate::io::{FileStore, Rasterizer, decode_image, encode_png};
use crate::render::{CanvasPolicy, CompositeOutcome, assemble_into, overlay};
use crate::resolve::Resolver;
use crate::schedule::candidates;

/// Capabilities a run needs from the outside world.
pub struct Services<'a> {
    pub http: &'a dyn HttpSource,
    /// Output store: scratch payloads, per-chart PNGs, combined document.
    pub store: &'a dyn FileStore,
    /// Read-only overlay assets.
    pub layers: &'a dyn FileStore,
    pub rasterizer: &'a dyn Rasterizer,
}

/// Resolved payloads keyed by logical output name, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedOutputs {
    pub entries: Vec<ResolvedOutput>,
}

impl ResolvedOutputs {
    pub fn get(&self, name: &str) -> Option<&ResolvedOutput> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    fn push(&mut self, name: &'static str, family: &ChartFamily, payload: Option<Payload>) {
        if let Some(payload) = payload {
            self.entries.push(ResolvedOutput {
                name,
                family: family.key,
                payload,
            });
        }
    }
}

/// Resolve every family at `now`. Families that resolve to nothing are absent.
pub fn resolve_all(
    families: &[ChartFamily],
    now: DateTime<Utc>,
    http: &dyn HttpSource,
    store: &dyn FileStore,
) -> ResolvedOutputs {
    let resolver = Resolver::new(http, store);
    let mut resolved = ResolvedOutputs::default();

    for family in families {
        match family.outputs {
            Outputs::Single { name } => {
                resolved.push(name, family, resolver.resolve(family, now));
            }
            Outputs::Pair { latest, prior } => {
                let (latest_payload, prior_payload) = resolver.resolve_pair(family, now);
                resolved.push(latest, family, latest_payload);
                resolved.push(prior, family, prior_payload);
            }
        }
    }

    info!(resolved = resolved.entries.len(), "resolution finished");
    resolved
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStatus {
    /// PNG written under the logical name.
    Stored,
    /// Nothing resolved within the lookback window.
    Missing,
    /// Resolved, but could not be normalized or stored.
    Failed,
}

/// What happened to one logical output during a run.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub name: &'static str,
    pub family: &'static str,
    pub issued: Option<DateTime<Utc>>,
    pub status: OutputStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<CompositeOutcome>,
}

/// Normalize every resolved payload to PNG under its logical name and drop the scratch copies.
pub fn publish(
    resolved: &ResolvedOutputs,
    families: &[ChartFamily],
    dpi: u32,
    services: &Services<'_>,
) -> Vec<OutputRecord> {
    let mut records = Vec::new();

    for family in families {
        for name in family.output_names() {
            let Some(entry) = resolved.get(name) else {
                records.push(OutputRecord {
                    name,
                    family: family.key,
                    issued: None,
                    status: OutputStatus::Missing,
                    detail: None,
                    overlay: None,
                });
                continue;
            };

            let issued = Some(entry.payload.candidate.at);
            let stored = normalize(family, &entry.payload, dpi, services)
                .and_then(|(png, outcome)| services.store.put(name, &png).map(|()| outcome));
            let record = match stored {
                Ok(outcome) => {
                    info!(name, family = family.key, "chart stored");
                    OutputRecord {
                        name,
                        family: family.key,
                        issued,
                        status: OutputStatus::Stored,
                        detail: None,
                        overlay: outcome,
                    }
                }
                Err(err) => {
                    warn!(name, family = family.key, error = %err, "chart could not be normalized");
                    OutputRecord {
                        name,
                        family: family.key,
                        issued,
                        status: OutputStatus::Failed,
                        detail: Some(err.message().to_string()),
                        overlay: None,
                    }
                }
            };
            records.push(record);

            if entry.payload.stored_as != name {
                if let Err(err) = services.store.delete(&entry.payload.stored_as) {
                    warn!(scratch = %entry.payload.stored_as, error = %err, "scratch payload not removed");
                }
            }
        }
    }

    records
}

/// Raw payload -> PNG bytes, compositing the family overlay when configured.
fn normalize(
    family: &ChartFamily,
    payload: &Payload,
    dpi: u32,
    services: &Services<'_>,
) -> Result<(Vec<u8>, Option<CompositeOutcome>), AppError> {
    match family.payload {
        PayloadKind::Png => {
            decode_image(&payload.bytes)?;
            Ok((payload.bytes.clone(), None))
        }
        PayloadKind::Pdf => {
            let document = services.rasterizer.rasterize(&payload.bytes, dpi)?;
            let (document, outcome) = match family.overlay {
                Some(asset) => {
                    let (document, outcome) = overlay(document, asset, services.layers);
                    (document, Some(outcome))
                }
                None => (document, None),
            };
            let first = document
                .first_page()
                .ok_or_else(|| AppError::new(4, "Rasterized document has no pages."))?;
            Ok((encode_png(first)?, outcome))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedSummary {
    pub name: String,
    pub pages: Vec<String>,
    pub bytes: usize,
}

/// All outputs of a single `briefwx run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub now: DateTime<Utc>,
    pub outputs: Vec<OutputRecord>,
    pub combined: Option<CombinedSummary>,
}

/// Execute the full batch: resolve, publish, assemble.
///
/// Never fails as a whole; per-family and assembly failures are logged and
/// reflected in the returned records.
pub fn run_batch(
    families: &[ChartFamily],
    order: &[&str],
    config: &RunConfig,
    policy: &CanvasPolicy,
    now: DateTime<Utc>,
    services: &Services<'_>,
) -> RunOutput {
    let resolved = resolve_all(families, now, services.http, services.store);
    let outputs = publish(&resolved, families, config.dpi, services);
    let combined = assemble_combined(services.store, order, policy, &config.combined_name);

    RunOutput {
        now,
        outputs,
        combined,
    }
}

/// Rebuild the combined document from whatever is in the store.
pub fn assemble_combined(
    store: &dyn FileStore,
    order: &[&str],
    policy: &CanvasPolicy,
    artifact: &str,
) -> Option<CombinedSummary> {
    match assemble_into(store, order, policy, artifact) {
        Ok(combined) => combined.map(|combined| CombinedSummary {
            name: artifact.to_string(),
            pages: combined.pages,
            bytes: combined.pdf.len(),
        }),
        Err(err) => {
            error!(artifact, error = %err, "combined document could not be written");
            None
        }
    }
}

/// One family's candidate list, for dry runs.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub family: &'static str,
    pub schedule: &'static str,
    pub candidates: Vec<PlannedCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedCandidate {
    pub at: DateTime<Utc>,
    pub url: String,
}

/// Candidate lists for `families` at `now`, without touching the network.
pub fn plan(families: &[ChartFamily], now: DateTime<Utc>) -> Vec<PlanEntry> {
    families
        .iter()
        .map(|family| PlanEntry {
            family: family.key,
            schedule: family.schedule.label(),
            candidates: candidates(family, now)
                .map(|candidate| PlannedCandidate {
                    at: candidate.at,
                    url: family.remote.url(candidate.at),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::data::scripted::ScriptedSource;
    use crate::domain::catalog::{self, COMBINED_ORDER, JAPAN_OVERLAY_AUPQ};
    use crate::io::{MemoryStore, RasterDocument};

    const SMALL: CanvasPolicy = CanvasPolicy {
        portrait_px: (40, 56),
        portrait_pt: (595, 842),
        background: [255, 255, 255],
        jpeg_quality: 90,
    };

    /// Two white pages for anything that looks like a PDF.
    struct FakeRasterizer;

    impl Rasterizer for FakeRasterizer {
        fn rasterize(&self, pdf: &[u8], _dpi: u32) -> Result<RasterDocument, AppError> {
            if !pdf.starts_with(b"%PDF") {
                return Err(AppError::new(4, "not a PDF"));
            }
            let page = RgbaImage::from_pixel(30, 20, Rgba([255, 255, 255, 255]));
            Ok(RasterDocument {
                pages: vec![page.clone(), page],
            })
        }
    }

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, d, h, 0, 0).unwrap()
    }

    fn config() -> RunConfig {
        RunConfig {
            out_dir: PathBuf::from("images"),
            layers_dir: PathBuf::from("layer"),
            combined_name: catalog::COMBINED_NAME.to_string(),
            dpi: 200,
            timeout_secs: 15,
            now: None,
            pdftoppm: PathBuf::from("pdftoppm"),
        }
    }

    fn families(keys: &[&str]) -> Vec<ChartFamily> {
        keys.iter().map(|key| catalog::find(key).unwrap()).collect()
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(w, h, Rgba([0, 0, 255, 255]))).unwrap()
    }

    #[test]
    fn full_run_stores_outputs_and_cleans_scratch() {
        let fams = families(&["asas", "aupq35", "fbjp", "ashfall-sakurajima"]);
        let asas = &fams[0];
        let aupq35 = &fams[1];
        let fbjp = &fams[2];
        let now = utc(10, 9);

        let http = ScriptedSource::new()
            .with_body(asas.remote.url(utc(10, 6)), b"%PDF latest".to_vec())
            .with_body(asas.remote.url(utc(10, 0)), b"%PDF prior".to_vec())
            .with_body(aupq35.remote.url(utc(10, 0)), b"%PDF aupq".to_vec())
            .with_body(fbjp.remote.url(now), png(12, 8));
        let store = MemoryStore::new();
        let overlay_png = encode_png(&RgbaImage::from_pixel(3, 2, Rgba([255, 0, 0, 128]))).unwrap();
        let layers = MemoryStore::new().with_entry(JAPAN_OVERLAY_AUPQ, overlay_png);
        let services = Services {
            http: &http,
            store: &store,
            layers: &layers,
            rasterizer: &FakeRasterizer,
        };

        let run = run_batch(&fams, &COMBINED_ORDER, &config(), &SMALL, now, &services);

        let status: Vec<(&str, OutputStatus)> = run.outputs.iter().map(|r| (r.name, r.status)).collect();
        assert_eq!(
            status,
            vec![
                ("ASAS_Latest.png", OutputStatus::Stored),
                ("ASAS_Prior.png", OutputStatus::Stored),
                ("AUPQ35_Latest.png", OutputStatus::Stored),
                ("FBJP_Latest.png", OutputStatus::Stored),
                ("Sakurajima_Ashfall_Latest.png", OutputStatus::Missing),
            ]
        );
        assert_eq!(run.outputs[0].issued, Some(utc(10, 6)));
        assert_eq!(run.outputs[1].issued, Some(utc(10, 0)));
        assert_eq!(run.outputs[2].overlay, Some(CompositeOutcome::Applied { pages: 2 }));

        assert_eq!(
            store.list().unwrap(),
            vec![
                "ASAS_Latest.png",
                "ASAS_Prior.png",
                "AUPQ35_Latest.png",
                "FBJP_Latest.png",
                "all_weather_charts.pdf",
            ]
        );
        let combined = run.combined.unwrap();
        assert_eq!(
            combined.pages,
            vec!["ASAS_Prior.png", "ASAS_Latest.png", "AUPQ35_Latest.png", "FBJP_Latest.png"]
        );
    }

    #[test]
    fn one_broken_family_does_not_stop_the_others() {
        let fams = families(&["fsas24", "fbos39", "fbjp"]);
        let now = utc(10, 9);
        let http = ScriptedSource::new()
            .with_body(fams[0].remote.url(now), b"<html>not a pdf</html>".to_vec())
            .with_body(fams[1].remote.url(now), b"not a png".to_vec())
            .with_body(fams[2].remote.url(now), png(5, 5));
        let store = MemoryStore::new();
        let layers = MemoryStore::new();
        let services = Services {
            http: &http,
            store: &store,
            layers: &layers,
            rasterizer: &FakeRasterizer,
        };

        let run = run_batch(&fams, &COMBINED_ORDER, &config(), &SMALL, now, &services);
        let status: Vec<OutputStatus> = run.outputs.iter().map(|r| r.status).collect();
        assert_eq!(
            status,
            vec![OutputStatus::Failed, OutputStatus::Failed, OutputStatus::Stored]
        );
        assert!(run.outputs[0].detail.is_some());
        assert!(!store.exists("FSAS24_COLOR_ASIA.pdf"));
        assert!(!store.exists("fbos39.png"));
        assert_eq!(run.combined.unwrap().pages, vec!["FBJP_Latest.png"]);
    }

    #[test]
    fn missing_overlay_still_stores_chart() {
        let fams = families(&["fxfe502"]);
        let now = utc(10, 13);
        let http = ScriptedSource::new().with_body(fams[0].remote.url(utc(10, 12)), b"%PDF".to_vec());
        let store = MemoryStore::new();
        let layers = MemoryStore::new();
        let services = Services {
            http: &http,
            store: &store,
            layers: &layers,
            rasterizer: &FakeRasterizer,
        };

        let records = publish(
            &resolve_all(&fams, now, &http, &store),
            &fams,
            200,
            &services,
        );
        assert_eq!(records[0].status, OutputStatus::Stored);
        assert_eq!(records[0].overlay, Some(CompositeOutcome::Skipped));
        assert!(store.exists("FXFE502_Latest.png"));
    }

    #[test]
    fn nothing_published_produces_no_combined_document() {
        let fams = catalog::jma_families();
        let http = ScriptedSource::new();
        let store = MemoryStore::new();
        let layers = MemoryStore::new();
        let services = Services {
            http: &http,
            store: &store,
            layers: &layers,
            rasterizer: &FakeRasterizer,
        };

        let run = run_batch(&fams, &COMBINED_ORDER, &config(), &SMALL, utc(10, 9), &services);
        assert_eq!(run.outputs.len(), COMBINED_ORDER.len());
        assert!(run.outputs.iter().all(|r| r.status == OutputStatus::Missing));
        assert!(run.combined.is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn plan_lists_candidates_with_urls() {
        let fams = families(&["asas", "fbjp"]);
        let entries = plan(&fams, utc(10, 7));
        assert_eq!(entries[0].schedule, "fixed-hours");
        assert_eq!(entries[0].candidates[0].at, utc(10, 6));
        assert!(entries[0].candidates[0].url.ends_with("ASAS_COLOR_202605100600.pdf"));
        assert_eq!(entries[1].candidates.len(), 1);
    }
}
