//! Content catalog - the hand-maintained list of cards per category

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::loader::content_key;
use super::ContentBundle;

/// Categories in display order, each with its entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: IndexMap<String, Vec<CatalogEntry>>,
}

/// A single card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    /// File name inside the category directory, e.g. `2024.10.6.md`
    pub file: Option<String>,
    pub title: String,
    pub date: Option<String>,
    /// Card image, relative to the image directory
    pub image: Option<String>,
    /// Inline text for entries with no backing file
    pub content: Option<String>,
}

impl CatalogEntry {
    /// Logical content key (`category/file-without-extension`)
    pub fn key(&self, category: &str) -> Option<String> {
        let file = self.file.as_deref()?;
        content_key(&Path::new(category).join(file))
    }

    /// How this entry resolves against a bundle. A file reference that does
    /// not map to a key is reported missing under its raw `category/file` form.
    pub fn resolution(&self, category: &str, bundle: &ContentBundle) -> Resolution {
        let Some(file) = self.file.as_deref() else {
            return Resolution::Inline;
        };
        match self.key(category) {
            Some(key) if bundle.contains(&key) => Resolution::Bundled(key),
            Some(key) => Resolution::Missing(key),
            None => Resolution::Missing(format!("{}/{}", category, file)),
        }
    }

    /// Site-relative path of the source document, used for fallback links
    pub fn source_path(&self, content_dir: &str, category: &str) -> Option<String> {
        let file = self.file.as_deref()?;
        Some(format!(
            "{}/{}/{}",
            content_dir.trim_end_matches('/'),
            category,
            file
        ))
    }
}

/// How a catalog entry resolves against a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Backed by a bundled document
    Bundled(String),
    /// Has no backing file
    Inline,
    /// Names a document the bundle does not contain
    Missing(String),
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn entries(&self, category: &str) -> &[CatalogEntry] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.categories
            .iter()
            .flat_map(|(category, entries)| entries.iter().map(move |e| (category.as_str(), e)))
    }

    pub fn insert(&mut self, category: impl Into<String>, entry: CatalogEntry) {
        self.categories.entry(category.into()).or_default().push(entry);
    }

    /// Resolve every entry against a bundle, in catalog order
    pub fn resolve<'a>(
        &'a self,
        bundle: &ContentBundle,
    ) -> Vec<(&'a str, &'a CatalogEntry, Resolution)> {
        self.iter()
            .map(|(category, entry)| (category, entry, entry.resolution(category, bundle)))
            .collect()
    }

    /// Keys that the catalog references but the bundle lacks
    pub fn missing_keys(&self, bundle: &ContentBundle) -> Vec<String> {
        self.resolve(bundle)
            .into_iter()
            .filter_map(|(_, _, r)| match r {
                Resolution::Missing(key) => Some(key),
                _ => None,
            })
            .collect()
    }
}
