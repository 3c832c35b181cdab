//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::Catalog;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,

    // Bundling
    pub content_dir: String,
    pub output: String,
    pub format: ArtifactFormat,
    pub extensions: Vec<String>,
    pub global_name: String,

    // Rendering
    pub preview_length: usize,
    #[serde(default)]
    pub markdown: MarkdownConfig,

    // Remote fallback
    #[serde(default)]
    pub remote: RemoteConfig,

    // Preferences store, relative to the site root
    pub prefs_file: String,

    // Content catalog
    #[serde(default)]
    pub catalog: Catalog,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Website".to_string(),
            author: String::new(),

            content_dir: "content".to_string(),
            output: "js/content-data.js".to_string(),
            format: ArtifactFormat::default(),
            extensions: vec!["md".to_string()],
            global_name: "markdownContent".to_string(),

            preview_length: 150,
            markdown: MarkdownConfig::default(),

            remote: RemoteConfig::default(),

            prefs_file: ".folio/prefs.json".to_string(),

            catalog: Catalog::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Whether a file extension counts as a text document
    pub fn is_recognized_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Serialization of the generated content artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// `window.<global> = { ... };` script
    #[default]
    Js,
    /// Plain JSON object
    Json,
}

/// Markdown renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub hard_breaks: bool,
    pub external_links_new_tab: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            hard_breaks: false,
            external_links_new_tab: true,
        }
    }
}

/// Remote content source (GitHub contents API layout)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
        }
    }
}
