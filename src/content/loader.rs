//! Content loader - walks the content directory into a bundle

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::{BundleError, ContentBundle, ContentEntry};
use crate::config::SiteConfig;
use crate::Folio;

/// Loads every recognized document under the content directory
pub struct ContentLoader<'a> {
    config: &'a SiteConfig,
    root: PathBuf,
}

impl<'a> ContentLoader<'a> {
    /// Create a loader for the site's configured content directory
    pub fn new(folio: &'a Folio) -> Self {
        Self::with_root(&folio.config, folio.content_dir.clone())
    }

    /// Create a loader for an explicit root
    pub fn with_root(config: &'a SiteConfig, root: PathBuf) -> Self {
        Self { config, root }
    }

    /// Read every document. Any unreadable file or directory aborts the load.
    pub fn load(&self) -> Result<ContentBundle, BundleError> {
        let mut sources: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|source| BundleError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone()),
                source,
            })?;

            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_content_file(path) {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            let key =
                content_key(relative).ok_or_else(|| BundleError::NonUtf8Path(path.to_path_buf()))?;

            let text = fs::read_to_string(path).map_err(|source| BundleError::Read {
                path: path.to_path_buf(),
                source,
            })?;

            if let Some(first) = sources.insert(key.clone(), path.to_path_buf()) {
                return Err(BundleError::DuplicateKey {
                    key,
                    first,
                    second: path.to_path_buf(),
                });
            }

            tracing::debug!("Bundled {} from {:?}", key, path);
            entries.push(ContentEntry { key, text });
        }

        Ok(entries.into_iter().collect())
    }

    fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.config.is_recognized_extension(e))
            .unwrap_or(false)
    }
}

/// Derive the logical key for a path relative to the content root:
/// components joined with `/`, final extension removed.
pub fn content_key(relative: &Path) -> Option<String> {
    let stem = relative.file_stem()?.to_str()?;

    let mut parts = Vec::new();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }
    }
    parts.push(stem);

    Some(parts.join("/"))
}
