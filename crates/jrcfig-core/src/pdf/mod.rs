//! PDF processing module.
//!
//! Structure (which images a page uses, and where it draws them) is read
//! with lopdf; pixels come from a [`RenderBackend`], PDFium by default.

mod geometry;
mod inspector;
#[cfg(feature = "pdfium")]
mod pdfium;

#[cfg(test)]
pub(crate) mod fixtures;

pub use geometry::{Matrix, PageBox, Rect};
pub use inspector::{PageImage, PdfInspector};
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumBackend;

use image::RgbImage;
use std::path::Path;

use crate::error::{PdfError, RenderError};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Source of embedded images and their placements on each page.
pub trait ImageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Images used by a zero-based page, in resource order.
    fn page_images(&self, page: usize) -> Result<Vec<PageImage>>;

    /// Every rectangle where `image` is drawn on the page.
    fn image_rects(&self, page: usize, image: &PageImage) -> Result<Vec<Rect>>;
}

/// A rasterization library able to open documents.
pub trait RenderBackend {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Open a document. The returned handle is dropped to close it.
    fn open<'a>(&'a self, path: &Path) -> std::result::Result<Box<dyn PageRaster + 'a>, RenderError>;
}

/// An open document that can be rasterized page by page.
pub trait PageRaster {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Render a whole zero-based page at `zoom` times its size in points,
    /// composited onto an opaque background.
    fn render_page(&self, page: usize, zoom: f32) -> std::result::Result<RgbImage, RenderError>;
}

/// Cut the pixels of a page-space rectangle out of a page rendered at
/// `zoom`. Returns `None` if the rectangle lies entirely off the page.
pub fn crop_region(page_image: &RgbImage, rect: &Rect, zoom: f32) -> Option<RgbImage> {
    let (x, y, width, height) = rect
        .scaled(zoom)
        .pixel_bounds(page_image.width(), page_image.height())?;
    Some(image::imageops::crop_imm(page_image, x, y, width, height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_crop_region_scales_rect() {
        let page = RgbImage::from_fn(200, 300, |x, y| Rgb([x as u8, y as u8, 0]));
        let crop = crop_region(&page, &Rect::new(10.0, 20.0, 60.0, 45.0), 2.0).unwrap();
        assert_eq!(crop.dimensions(), (100, 50));
        assert_eq!(crop.get_pixel(0, 0), &Rgb([20, 40, 0]));
    }

    #[test]
    fn test_crop_region_off_page() {
        let page = RgbImage::new(100, 100);
        assert!(crop_region(&page, &Rect::new(200.0, 0.0, 300.0, 50.0), 1.0).is_none());
    }
}
