//! Configuration structures for the extraction run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::FigureCatalog;
use crate::error::{JrcfigError, Result};

/// Main configuration for jrcfig.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JrcfigConfig {
    /// Input document.
    pub input: InputConfig,

    /// Rasterization settings.
    pub render: RenderConfig,

    /// Size thresholds for embedded images.
    pub filter: FilterConfig,

    /// Output location and naming.
    pub output: OutputConfig,

    /// Figure and table page tables.
    pub catalog: FigureCatalog,
}

/// Input document configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// PDF path, relative to the project root unless absolute.
    pub pdf_path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pdf_path: PathBuf::from("JRC141259_01.pdf"),
        }
    }
}

/// Rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Magnification for cropped embedded images.
    pub crop_zoom: f32,

    /// Magnification for full-page renders.
    pub page_zoom: f32,

    /// Render full pages for figure and table pages.
    pub render_full_pages: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            crop_zoom: 2.0,
            page_zoom: 1.5,
            render_full_pages: true,
        }
    }
}

/// Thresholds below which embedded images are discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum placement width and height in PDF units (icons, logos).
    pub min_placement_size: f32,

    /// Minimum rendered width and height in pixels.
    pub min_pixel_size: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_placement_size: 80.0,
            min_pixel_size: 100,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory, relative to the project root unless absolute.
    pub dir: PathBuf,

    /// File name prefix.
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets").join("img").join("jrc141259"),
            prefix: "jrc".to_string(),
        }
    }
}

impl JrcfigConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| JrcfigError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| JrcfigError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the input PDF and output directory against a project root.
    pub fn resolve_paths(&self, root: &Path) -> (PathBuf, PathBuf) {
        (root.join(&self.input.pdf_path), root.join(&self.output.dir))
    }

    /// Reject settings that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        for (name, zoom) in [
            ("render.crop_zoom", self.render.crop_zoom),
            ("render.page_zoom", self.render.page_zoom),
        ] {
            if !zoom.is_finite() || zoom <= 0.0 {
                return Err(JrcfigError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, zoom
                )));
            }
        }
        if self.output.prefix.is_empty() {
            return Err(JrcfigError::Config("output.prefix must not be empty".into()));
        }
        Ok(())
    }
}
