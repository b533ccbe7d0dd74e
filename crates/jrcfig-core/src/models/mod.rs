//! Data models.

pub mod config;

pub use config::{FilterConfig, InputConfig, JrcfigConfig, OutputConfig, RenderConfig};
