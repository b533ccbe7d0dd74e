//! Two-pass figure extraction.
//!
//! Pass 1 crops every sufficiently large placement of every embedded image
//! and names it after the catalog's figure numbers. Pass 2 renders whole
//! pages known to hold figures or tables, which captures vector charts
//! that have no embedded raster.

use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::models::config::JrcfigConfig;
use crate::naming::FigureNamer;
use crate::pdf::{crop_region, ImageSource, PageRaster, PdfInspector, RenderBackend};

/// Which pass a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    EmbeddedImages,
    FullPages,
}

/// Progress update emitted once per page visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub pass: Pass,
    /// Pages finished so far in this pass.
    pub done: usize,
    /// Pages this pass will visit.
    pub total: usize,
}

/// Outcome of an extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Directory the files were written to.
    pub out_dir: PathBuf,
    /// File names in write order. A name written twice appears twice.
    pub saved: Vec<String>,
    /// Images whose placements could not be determined.
    pub skipped_images: usize,
}

impl ExtractionReport {
    /// Saved file names sorted lexicographically.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.saved.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Extracts figures and page renders from one PDF into one directory.
pub struct FigureExtractor<'a> {
    config: &'a JrcfigConfig,
    pdf_path: PathBuf,
    out_dir: PathBuf,
}

impl<'a> FigureExtractor<'a> {
    pub fn new(config: &'a JrcfigConfig, pdf_path: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            pdf_path: pdf_path.into(),
            out_dir: out_dir.into(),
        }
    }

    /// Resolve the configured input and output paths against `root`.
    pub fn from_root(config: &'a JrcfigConfig, root: &Path) -> Self {
        let (pdf_path, out_dir) = config.resolve_paths(root);
        Self::new(config, pdf_path, out_dir)
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Run both passes.
    pub fn run(&self, backend: &dyn RenderBackend) -> Result<ExtractionReport> {
        self.run_with_progress(backend, |_| {})
    }

    /// Run both passes, reporting each visited page to `progress`.
    pub fn run_with_progress(
        &self,
        backend: &dyn RenderBackend,
        mut progress: impl FnMut(Progress),
    ) -> Result<ExtractionReport> {
        self.config.validate()?;
        std::fs::create_dir_all(&self.out_dir)?;

        info!(
            "Extracting figures from {} into {} using {}",
            self.pdf_path.display(),
            self.out_dir.display(),
            backend.name()
        );

        let mut namer = FigureNamer::new(&self.config.catalog, self.config.output.prefix.as_str());
        let mut report = ExtractionReport {
            out_dir: self.out_dir.clone(),
            ..Default::default()
        };

        {
            let inspector = PdfInspector::open(&self.pdf_path)?;
            let raster = backend.open(&self.pdf_path)?;
            self.extract_embedded(&inspector, raster.as_ref(), &mut namer, &mut report, &mut progress)?;
        }
        let embedded = report.saved.len();
        info!("Saved {} embedded images", embedded);

        if self.config.render.render_full_pages {
            let raster = backend.open(&self.pdf_path)?;
            self.render_full_pages(raster.as_ref(), &namer, &mut report, &mut progress)?;
            info!("Saved {} page renders", report.saved.len() - embedded);
        }

        Ok(report)
    }

    fn extract_embedded(
        &self,
        source: &dyn ImageSource,
        raster: &dyn PageRaster,
        namer: &mut FigureNamer<'_>,
        report: &mut ExtractionReport,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<()> {
        let zoom = self.config.render.crop_zoom;
        let min_size = self.config.filter.min_placement_size;
        let min_pixels = self.config.filter.min_pixel_size;
        let total = source.page_count();

        for page in 0..total {
            progress(Progress {
                pass: Pass::EmbeddedImages,
                done: page,
                total,
            });

            let images = source.page_images(page)?;
            if images.is_empty() {
                continue;
            }
            debug!("Page {}: {} images", page + 1, images.len());

            // rasterized on first accepted placement
            let mut page_pixels: Option<RgbImage> = None;

            for (index, image) in images.iter().enumerate() {
                let rects = match source.image_rects(page, image) {
                    Ok(rects) => rects,
                    Err(e) => {
                        warn!("Skipping image {} on page {}: {}", image.name, page + 1, e);
                        report.skipped_images += 1;
                        continue;
                    }
                };

                for rect in rects {
                    if rect.width() < min_size || rect.height() < min_size {
                        trace!(
                            "Ignoring {} on page {}: {:.1}x{:.1} placement",
                            image.name,
                            page + 1,
                            rect.width(),
                            rect.height()
                        );
                        continue;
                    }

                    if page_pixels.is_none() {
                        page_pixels = Some(raster.render_page(page, zoom)?);
                    }
                    let Some(cropped) = page_pixels
                        .as_ref()
                        .and_then(|pixels| crop_region(pixels, &rect, zoom))
                    else {
                        continue;
                    };

                    if cropped.width() < min_pixels || cropped.height() < min_pixels {
                        trace!(
                            "Ignoring {} on page {}: {}x{} px after cropping",
                            image.name,
                            page + 1,
                            cropped.width(),
                            cropped.height()
                        );
                        continue;
                    }

                    let name = namer.image_name(page, index);
                    self.save(&cropped, &name, report)?;
                }
            }
        }

        progress(Progress {
            pass: Pass::EmbeddedImages,
            done: total,
            total,
        });
        Ok(())
    }

    fn render_full_pages(
        &self,
        raster: &dyn PageRaster,
        namer: &FigureNamer<'_>,
        report: &mut ExtractionReport,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<()> {
        let pages = self.config.catalog.render_pages();
        let page_count = raster.page_count();
        let total = pages.len();

        for (done, page) in pages.into_iter().enumerate() {
            progress(Progress {
                pass: Pass::FullPages,
                done,
                total,
            });

            if page >= page_count {
                debug!(
                    "Page index {} is beyond the document ({} pages), skipping",
                    page, page_count
                );
                continue;
            }

            let rendered = raster.render_page(page, self.config.render.page_zoom)?;
            self.save(&rendered, &namer.page_name(page), report)?;
        }

        progress(Progress {
            pass: Pass::FullPages,
            done: total,
            total,
        });
        Ok(())
    }

    fn save(&self, image: &RgbImage, stem: &str, report: &mut ExtractionReport) -> Result<()> {
        let file_name = format!("{}.png", stem);
        let path = self.out_dir.join(&file_name);
        image.save_with_format(&path, ImageFormat::Png)?;
        debug!("Saved {} ({}x{})", path.display(), image.width(), image.height());
        report.saved.push(file_name);
        Ok(())
    }
}
