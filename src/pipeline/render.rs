//! PDF rasterisation: render every page of a document to a `DynamicImage`.
//!
//! The [`Rasterizer`] trait is the seam between the pipeline and the
//! rendering backend. [`PdfiumRasterizer`] is the production adapter; tests
//! use `testing::StubRasterizer`.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.

use crate::error::ExtractError;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One rendered page, held in memory only until its text is recognised.
pub type PageImage = DynamicImage;

/// Converts a PDF on disk into an ordered list of page images.
///
/// Rendering is all-or-nothing: an error on any page fails the whole call
/// and no partial result is returned.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<PageImage>, ExtractError>;
}

/// Rasterizer backed by the pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// Use the pdfium shared library at `library_path`, or the system
    /// library when `None`.
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }
}

#[async_trait]
impl Rasterizer for PdfiumRasterizer {
    async fn rasterize(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<PageImage>, ExtractError> {
        let path = pdf_path.to_path_buf();
        let library = self.library_path.clone();

        tokio::task::spawn_blocking(move || render_pages_blocking(&path, dpi, library.as_deref()))
            .await
            .map_err(|e| ExtractError::Internal(format!("Render task panicked: {}", e)))?
    }
}

/// Bind to pdfium, preferring an explicit library path.
fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, ExtractError> {
    let bindings = match library_path {
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// pdfium measures pages in points (1/72 inch).
fn scale_for_dpi(dpi: u32) -> f32 {
    dpi as f32 / 72.0
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    pdf_path: &Path,
    dpi: u32,
    library_path: Option<&Path>,
) -> Result<Vec<PageImage>, ExtractError> {
    let pdfium = bind_pdfium(library_path)?;

    let rasterisation_failed = |detail: String| ExtractError::RasterisationFailed {
        path: pdf_path.to_path_buf(),
        detail,
    };

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| rasterisation_failed(format!("{:?}", e)))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages, rendering at {} DPI", total_pages, dpi);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale_for_dpi(dpi));

    let mut images = Vec::with_capacity(total_pages);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| rasterisation_failed(format!("page {}: {:?}", idx + 1, e)))?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}
