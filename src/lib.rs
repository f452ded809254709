//! folio: a front-matter driven static page builder
//!
//! Each Markdown document opens with a `---` delimited YAML block. Documents
//! are parsed into [`content::ContentRecord`]s, validated into
//! [`content::PublishableRecord`]s and rendered through a named layout from
//! an explicit [`templates::LayoutRegistry`].

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::loader::ContentLoader;
use generator::BuildReport;
use templates::LayoutRegistry;

/// A site rooted at a directory
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source (document) directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// User layout directory
    pub layout_dir: PathBuf,
}

impl Folio {
    /// Create a new site from a directory, reading `folio.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(config::CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let layout_dir = base_dir.join(&config.layout_dir);

        Self {
            config,
            base_dir,
            source_dir,
            public_dir,
            layout_dir,
        }
    }

    /// Built-in layouts plus everything in the layout directory
    pub fn layouts(&self) -> Result<LayoutRegistry> {
        let mut layouts = LayoutRegistry::with_builtin(&self.config.date_format)?;
        if self.layout_dir.is_dir() {
            let count = layouts.load_dir(&self.layout_dir)?;
            tracing::debug!("Loaded {} layouts from {:?}", count, self.layout_dir);
        }
        Ok(layouts)
    }

    /// Loader for the source directory
    pub fn loader(&self) -> ContentLoader {
        ContentLoader::new(&self.source_dir, &self.config.extensions)
    }

    /// Build the site
    pub async fn build(&self) -> Result<BuildReport> {
        commands::build::run(self).await
    }

    /// Run the pipeline without writing anything
    pub async fn check(&self) -> Result<BuildReport> {
        commands::check::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new document
    pub fn new_post(&self, title: &str, layout: Option<&str>) -> Result<PathBuf> {
        commands::new::create_post(self, title, layout, None)
    }
}
