//! folio-rs: content bundler and markdown renderer for a single-page personal site
//!
//! The bundler turns a directory of markdown documents into one generated
//! data module; the renderer turns one document into markup for the page's
//! content viewer.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod prefs;
pub mod remote;
pub mod server;
pub mod viewer;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{ContentBundle, MarkdownRenderer};

/// The main application: a site root and its configuration
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory (site root)
    pub base_dir: PathBuf,
    /// Content directory
    pub content_dir: PathBuf,
    /// Generated artifact path
    pub output_path: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let output_path = base_dir.join(&config.output);

        Self {
            config,
            base_dir,
            content_dir,
            output_path,
        }
    }

    /// Bundle the content directory into the artifact
    pub fn bundle(&self) -> Result<usize> {
        commands::bundle::run(self)
    }

    /// Remove the generated artifact
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Load the bundle from the generated artifact
    pub fn load_bundle(&self) -> Result<ContentBundle> {
        if !self.output_path.exists() {
            anyhow::bail!(
                "No content artifact at {:?}; run `folio bundle` first",
                self.output_path
            );
        }
        Ok(content::artifact::read(&self.output_path, self.config.format)?)
    }

    /// Renderer configured for this site
    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::with_options(self.config.markdown.clone())
    }

    /// Path of the preferences store
    pub fn prefs_path(&self) -> PathBuf {
        self.base_dir.join(&self.config.prefs_file)
    }
}
