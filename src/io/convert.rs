//! Format conversion: PDF pages to RGBA rasters, and PNG encode/decode.
//!
//! PDF rendering itself is delegated to an external `Rasterizer`; the default
//! implementation shells out to poppler's `pdftoppm`.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::AppError;

/// Pages of a rasterized document, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterDocument {
    pub pages: Vec<RgbaImage>,
}

impl RasterDocument {
    pub fn first_page(&self) -> Option<&RgbaImage> {
        self.pages.first()
    }
}

/// Renders every page of a PDF at a given resolution.
pub trait Rasterizer {
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<RasterDocument, AppError>;
}

/// `Rasterizer` backed by the `pdftoppm` command-line tool.
#[derive(Debug, Clone)]
pub struct Pdftoppm {
    program: PathBuf,
}

impl Pdftoppm {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Pdftoppm {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl Rasterizer for Pdftoppm {
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<RasterDocument, AppError> {
        let scratch = tempfile::tempdir()
            .map_err(|e| AppError::new(2, format!("Failed to create scratch directory: {e}")))?;
        let input = scratch.path().join("input.pdf");
        fs::write(&input, pdf)
            .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", input.display())))?;

        let output = Command::new(&self.program)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(&input)
            .arg(scratch.path().join("page"))
            .output()
            .map_err(|e| AppError::new(4, format!("Failed to run '{}': {e}", self.program.display())))?;

        if !output.status.success() {
            return Err(AppError::new(
                4,
                format!(
                    "'{}' exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        let page_files = page_files(scratch.path())?;
        if page_files.is_empty() {
            return Err(AppError::new(4, "PDF rasterizing produced no pages."));
        }
        debug!(pages = page_files.len(), dpi, "rasterized PDF");

        let mut pages = Vec::with_capacity(page_files.len());
        for path in page_files {
            let img = image::open(&path)
                .map_err(|e| AppError::new(4, format!("Failed to decode '{}': {e}", path.display())))?;
            pages.push(img.to_rgba8());
        }
        Ok(RasterDocument { pages })
    }
}

/// `page-N.png` files in page order (pdftoppm zero-pads N consistently).
fn page_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", dir.display())))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let is_png = path.extension().is_some_and(|ext| ext == "png");
            let is_page = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("page"));
            is_png && is_page
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Decode any supported raster format to RGBA.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::new(4, format!("Failed to decode image: {e}")))?;
    Ok(img.to_rgba8())
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| AppError::new(4, format!("Failed to encode PNG: {e}")))?;
    Ok(buf)
}
