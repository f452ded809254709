//! Site configuration (folio.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What the build does when a document fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Log the failure and leave the page out
    #[default]
    Skip,
    /// Fail the whole build before any page is written
    Abort,
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub url: String,
    pub author: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub layout_dir: String,

    // Rendering
    pub default_layout: String,
    pub date_format: String,
    pub extensions: Vec<String>,

    // Build
    pub on_error: OnError,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            url: "http://example.com".to_string(),
            author: String::new(),

            source_dir: "content".to_string(),
            public_dir: "public".to_string(),
            layout_dir: "layouts".to_string(),

            default_layout: "post".to_string(),
            date_format: "%B %d, %Y".to_string(),
            extensions: vec!["md".to_string(), "markdown".to_string()],

            on_error: OnError::Skip,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }
}
