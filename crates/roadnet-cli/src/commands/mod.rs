//! CLI command implementations

pub mod config;
pub mod replay;
pub mod synthesize;

use anyhow::{Context, Result};
use roadnet_edit::EditorConfig;
use std::path::Path;

/// Explicit `--config` file, or the layered global/project/env config.
pub fn load_config(path: Option<&str>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path)),
        None => EditorConfig::load().context("Failed to load layered config"),
    }
}
