//! Content module - bundling, catalog, and markdown rendering

pub mod artifact;
mod bundle;
mod catalog;
pub mod loader;
mod markdown;
pub mod preview;

pub use artifact::ArtifactError;
pub use bundle::{BundleError, ContentBundle, ContentEntry};
pub use catalog::{Catalog, CatalogEntry, Resolution};
pub use markdown::MarkdownRenderer;
