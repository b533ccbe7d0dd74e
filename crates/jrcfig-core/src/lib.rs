//! Core library for extracting the figures and tables of JRC141259.
//!
//! This crate provides:
//! - the curated page -> figure/table catalog
//! - PDF inspection (embedded images and their placements) via lopdf
//! - page rasterization behind [`pdf::RenderBackend`], PDFium by default
//! - the two-pass extractor writing PNG files

pub mod catalog;
pub mod error;
pub mod extract;
pub mod models;
pub mod naming;
pub mod pdf;

pub use catalog::FigureCatalog;
pub use error::{JrcfigError, PdfError, RenderError, Result};
pub use extract::{ExtractionReport, FigureExtractor, Pass, Progress};
pub use models::config::JrcfigConfig;
pub use naming::FigureNamer;
pub use pdf::{ImageSource, PageRaster, PdfInspector, RenderBackend};

#[cfg(feature = "pdfium")]
pub use pdf::PdfiumBackend;
