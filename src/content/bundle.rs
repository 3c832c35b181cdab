//! Bundled content: logical key to raw document text

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a bundling run
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to walk {path:?}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Content path {0:?} is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error("Duplicate content key '{key}' from {first:?} and {second:?}")]
    DuplicateKey {
        key: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// One document in the bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntry {
    /// Relative path with `/` separators and no extension, e.g. `articles/hello`
    pub key: String,
    /// Raw document text
    pub text: String,
}

impl ContentEntry {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Immutable key-ordered set of content entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentBundle {
    entries: Vec<ContentEntry>,
}

impl ContentBundle {
    /// Look up a document by key. `None` is the absent-value sentinel.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .binary_search_by(|e| e.key.as_str().cmp(key))
            .ok()
            .map(|i| self.entries[i].text.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentEntry> {
        self.entries.iter()
    }
}

/// Later entries win when keys repeat; the loader rejects duplicates before this point.
impl FromIterator<ContentEntry> for ContentBundle {
    fn from_iter<I: IntoIterator<Item = ContentEntry>>(iter: I) -> Self {
        let mut entries: Vec<ContentEntry> = iter.into_iter().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries.dedup_by(|later, earlier| {
            if later.key == earlier.key {
                std::mem::swap(later, earlier);
                true
            } else {
                false
            }
        });
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a ContentBundle {
    type Item = &'a ContentEntry;
    type IntoIter = std::slice::Iter<'a, ContentEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
