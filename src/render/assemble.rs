//! Combined-document assembly.
//!
//! Reads the per-chart PNGs back from the store in a fixed order, normalizes
//! each onto a page canvas, and writes one multi-page PDF. Missing charts are
//! simply left out; no placeholder pages.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage, RgbImage};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::io::{FileStore, decode_image};
use crate::render::{PdfPage, write_image_pdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape only for images wider than tall.
    pub fn for_size(width: u32, height: u32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Page canvas used for every page of the combined document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPolicy {
    /// Canvas in pixels, portrait orientation.
    pub portrait_px: (u32, u32),
    /// MediaBox in points, portrait orientation.
    pub portrait_pt: (u32, u32),
    pub background: [u8; 3],
    pub jpeg_quality: u8,
}

impl CanvasPolicy {
    /// A4 at 300 DPI (8.27in x 11.69in), white padding.
    pub const A4_300DPI: CanvasPolicy = CanvasPolicy {
        portrait_px: (2481, 3508),
        portrait_pt: (595, 842),
        background: [255, 255, 255],
        jpeg_quality: 95,
    };

    pub fn canvas_px(&self, orientation: Orientation) -> (u32, u32) {
        oriented(self.portrait_px, orientation)
    }

    pub fn page_pt(&self, orientation: Orientation) -> (u32, u32) {
        oriented(self.portrait_pt, orientation)
    }
}

impl Default for CanvasPolicy {
    fn default() -> Self {
        Self::A4_300DPI
    }
}

fn oriented((w, h): (u32, u32), orientation: Orientation) -> (u32, u32) {
    match orientation {
        Orientation::Portrait => (w.min(h), w.max(h)),
        Orientation::Landscape => (w.max(h), w.min(h)),
    }
}

/// Largest size with the source aspect ratio that fits `bounds`.
///
/// Images that already fit are left at their native size (never enlarged).
pub fn fit_within((w, h): (u32, u32), (max_w, max_h): (u32, u32)) -> (u32, u32) {
    if w <= max_w && h <= max_h {
        return (w, h);
    }
    let scale = (f64::from(max_w) / f64::from(w)).min(f64::from(max_h) / f64::from(h));
    let fit = |v: u32, max: u32| ((f64::from(v) * scale).round() as u32).clamp(1, max);
    (fit(w, max_w), fit(h, max_h))
}

/// Scale `img` into the policy canvas for its orientation and center it.
pub fn normalize_page(img: &RgbaImage, policy: &CanvasPolicy) -> (RgbImage, Orientation) {
    let orientation = Orientation::for_size(img.width(), img.height());
    let (canvas_w, canvas_h) = policy.canvas_px(orientation);
    let (fit_w, fit_h) = fit_within(img.dimensions(), (canvas_w, canvas_h));

    let [r, g, b] = policy.background;
    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, Rgba([r, g, b, 255]));
    let x = i64::from((canvas_w - fit_w) / 2);
    let y = i64::from((canvas_h - fit_h) / 2);
    if (fit_w, fit_h) == img.dimensions() {
        imageops::overlay(&mut canvas, img, x, y);
    } else {
        let scaled = imageops::resize(img, fit_w, fit_h, FilterType::Lanczos3);
        imageops::overlay(&mut canvas, &scaled, x, y);
    }

    (DynamicImage::ImageRgba8(canvas).to_rgb8(), orientation)
}

/// A combined document and the logical names that made it in, in page order.
#[derive(Debug, Clone)]
pub struct Combined {
    pub pages: Vec<String>,
    pub pdf: Vec<u8>,
}

/// Build the combined document from whichever of `names` exist in `store`.
///
/// `Ok(None)` (with a warning) when none of them are available.
pub fn assemble(
    store: &dyn FileStore,
    names: &[&str],
    policy: &CanvasPolicy,
) -> Result<Option<Combined>, AppError> {
    let mut pages = Vec::new();
    let mut included = Vec::new();

    for &name in names {
        let bytes = match store.get(name) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(name, "chart not in store, skipped");
                continue;
            }
            Err(err) => {
                warn!(name, error = %err, "chart unreadable, skipped");
                continue;
            }
        };
        let img = match decode_image(&bytes) {
            Ok(img) => img,
            Err(err) => {
                warn!(name, error = %err, "chart undecodable, skipped");
                continue;
            }
        };

        let (canvas, orientation) = normalize_page(&img, policy);
        pages.push(PdfPage {
            image: canvas,
            size_pt: policy.page_pt(orientation),
        });
        included.push(name.to_string());
        debug!(name, ?orientation, "page added");
    }

    if pages.is_empty() {
        warn!("no chart images available, combined document not produced");
        return Ok(None);
    }

    let pdf = write_image_pdf(&pages, policy.jpeg_quality)?;
    Ok(Some(Combined {
        pages: included,
        pdf,
    }))
}

/// `assemble`, then write the result to `store` as `artifact`, replacing any previous one.
pub fn assemble_into(
    store: &dyn FileStore,
    names: &[&str],
    policy: &CanvasPolicy,
    artifact: &str,
) -> Result<Option<Combined>, AppError> {
    let Some(combined) = assemble(store, names, policy)? else {
        return Ok(None);
    };
    store.put(artifact, &combined.pdf)?;
    info!(
        artifact,
        pages = combined.pages.len(),
        bytes = combined.pdf.len(),
        "combined document written"
    );
    Ok(Some(combined))
}
