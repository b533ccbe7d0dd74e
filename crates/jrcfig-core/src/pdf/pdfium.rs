//! Page rasterization through a dynamically bound PDFium library.

use image::{DynamicImage, RgbImage, RgbaImage};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, trace};

use super::{PageRaster, RenderBackend};
use crate::error::RenderError;

/// Directories searched for the PDFium shared library before the system
/// library paths.
const LIBRARY_DIRS: &[&str] = &["./", "./vendor/pdfium/lib/"];

/// Environment variable naming an extra directory holding libpdfium.
pub const LIBRARY_DIR_ENV: &str = "PDFIUM_DYNAMIC_LIB_PATH";

/// Rendering backend bound to libpdfium.
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl PdfiumBackend {
    /// Bind libpdfium from `$PDFIUM_DYNAMIC_LIB_PATH`, the working
    /// directory, `./vendor/pdfium/lib/` or the system library paths.
    pub fn bind() -> Result<Self, RenderError> {
        let mut dirs: Vec<String> = Vec::new();
        if let Ok(dir) = std::env::var(LIBRARY_DIR_ENV) {
            dirs.push(dir);
        }
        dirs.extend(LIBRARY_DIRS.iter().map(|dir| dir.to_string()));

        for dir in &dirs {
            match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)) {
                Ok(bindings) => {
                    debug!("Bound PDFium from {}", dir);
                    return Ok(Self {
                        pdfium: Pdfium::new(bindings),
                    });
                }
                Err(e) => trace!("PDFium not found in {}: {:?}", dir, e),
            }
        }

        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| RenderError::BackendUnavailable(format!("{:?}", e)))?;
        debug!("Bound system PDFium");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl RenderBackend for PdfiumBackend {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn PageRaster + 'a>, RenderError> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| RenderError::Load(format!("{}: {:?}", path.display(), e)))?;
        Ok(Box::new(PdfiumRaster { document }))
    }
}

struct PdfiumRaster<'a> {
    document: PdfDocument<'a>,
}

impl PageRaster for PdfiumRaster<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, page: usize, zoom: f32) -> Result<RgbImage, RenderError> {
        let page_error = |reason: String| RenderError::Page { page, reason };

        let index = page
            .try_into()
            .map_err(|_| page_error("page index exceeds PDFium limits".to_string()))?;
        let pdf_page = self
            .document
            .pages()
            .get(index)
            .map_err(|e| page_error(format!("{:?}", e)))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(zoom);
        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| page_error(format!("{:?}", e)))?;

        let width = u32::try_from(bitmap.width())
            .map_err(|_| page_error("negative bitmap width".to_string()))?;
        let height = u32::try_from(bitmap.height())
            .map_err(|_| page_error("negative bitmap height".to_string()))?;
        let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .ok_or_else(|| page_error("bitmap buffer size mismatch".to_string()))?;

        trace!("Rendered page index {} at {}x: {}x{}", page, zoom, width, height);
        Ok(DynamicImage::ImageRgba8(rgba).to_rgb8())
    }
}
