//! Overlay compositing.
//!
//! Some prediction charts ship as monochrome line art; a static semi-transparent
//! layer with coastlines and reference lines is blended over every page. The
//! overlay is optional: a missing or broken asset leaves the chart untouched.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::Serialize;
use tracing::{info, warn};

use crate::io::{FileStore, RasterDocument, decode_image};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompositeOutcome {
    /// Overlay asset not present in the layer store.
    Skipped,
    Applied { pages: usize },
    /// Something went wrong; the original document was kept.
    Failed { reason: String },
}

/// Blend `overlay_name` from `layers` over every page of `document`.
///
/// Never fails: on any problem the input document is returned unchanged
/// together with the reason.
pub fn overlay(
    document: RasterDocument,
    overlay_name: &str,
    layers: &dyn FileStore,
) -> (RasterDocument, CompositeOutcome) {
    let bytes = match layers.get(overlay_name) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            warn!(overlay = overlay_name, "overlay asset missing, compositing skipped");
            return (document, CompositeOutcome::Skipped);
        }
        Err(err) => return failed(document, overlay_name, err.message().to_string()),
    };

    let layer = match decode_image(&bytes) {
        Ok(layer) => layer,
        Err(err) => return failed(document, overlay_name, err.message().to_string()),
    };
    if document.pages.is_empty() {
        return failed(document, overlay_name, "document has no pages".to_string());
    }
    if let Some(page) = document
        .pages
        .iter()
        .find(|page| page.width() == 0 || page.height() == 0)
    {
        let reason = format!("page has empty dimensions {}x{}", page.width(), page.height());
        return failed(document, overlay_name, reason);
    }

    let pages: Vec<RgbaImage> = document
        .pages
        .iter()
        .map(|page| overlay_page(page, &layer))
        .collect();
    info!(overlay = overlay_name, pages = pages.len(), "overlay composited");

    let outcome = CompositeOutcome::Applied { pages: pages.len() };
    (RasterDocument { pages }, outcome)
}

/// Scale `layer` to exactly the page size and alpha-composite it on top.
pub fn overlay_page(page: &RgbaImage, layer: &RgbaImage) -> RgbaImage {
    let (width, height) = page.dimensions();
    let mut out = page.clone();
    if layer.dimensions() == (width, height) {
        imageops::overlay(&mut out, layer, 0, 0);
    } else {
        let scaled = imageops::resize(layer, width, height, FilterType::Triangle);
        imageops::overlay(&mut out, &scaled, 0, 0);
    }
    out
}

fn failed(
    document: RasterDocument,
    overlay_name: &str,
    reason: String,
) -> (RasterDocument, CompositeOutcome) {
    warn!(overlay = overlay_name, %reason, "compositing failed, keeping original chart");
    (document, CompositeOutcome::Failed { reason })
}
