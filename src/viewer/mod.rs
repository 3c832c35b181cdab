//! Content viewer - the modal that shows one rendered document

use crate::content::{CatalogEntry, ContentBundle, MarkdownRenderer, Resolution};
use crate::helpers::{html_escape, link_to};
use crate::remote::RemoteSource;

/// What the viewer currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewerState {
    #[default]
    Closed,
    Open {
        title: String,
        markup: String,
    },
}

/// Modal viewer. Opening never fails: lookups that miss show a placeholder.
#[derive(Debug, Default)]
pub struct Viewer {
    state: ViewerState,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ViewerState::Open { .. })
    }

    /// Open a bundled document by key
    pub fn open_key(
        &mut self,
        title: &str,
        key: &str,
        bundle: &ContentBundle,
        renderer: &MarkdownRenderer,
    ) -> &ViewerState {
        let markup = match bundle.get(key) {
            Some(text) => renderer.render(text),
            None => {
                tracing::debug!("Content key not bundled: {}", key);
                not_found_markup(key)
            }
        };
        self.show(title, markup)
    }

    /// Open a catalog card: bundled document or inline text
    pub fn open_entry(
        &mut self,
        category: &str,
        entry: &CatalogEntry,
        bundle: &ContentBundle,
        renderer: &MarkdownRenderer,
    ) -> &ViewerState {
        match (entry.resolution(category, bundle), entry.content.as_deref()) {
            (Resolution::Bundled(key), _) | (Resolution::Missing(key), _) => {
                self.open_key(&entry.title, &key, bundle, renderer)
            }
            (Resolution::Inline, Some(text)) => {
                let markup = renderer.render(text);
                self.show(&entry.title, markup)
            }
            (Resolution::Inline, None) => {
                let markup = not_found_markup(&format!("{}/{}", category, entry.title));
                self.show(&entry.title, markup)
            }
        }
    }

    /// Open a document fetched from the remote source; on any failure show a
    /// plain link to `path` instead
    pub async fn open_remote(
        &mut self,
        title: &str,
        path: &str,
        remote: &RemoteSource,
        renderer: &MarkdownRenderer,
    ) -> &ViewerState {
        let markup = match remote.fetch(path).await {
            Ok(text) => renderer.render(&text),
            Err(e) => {
                tracing::warn!("Failed to load remote content {}: {}", path, e);
                fallback_markup(path)
            }
        };
        self.show(title, markup)
    }

    pub fn close(&mut self) {
        self.state = ViewerState::Closed;
    }

    fn show(&mut self, title: &str, markup: String) -> &ViewerState {
        self.state = ViewerState::Open {
            title: title.to_string(),
            markup,
        };
        &self.state
    }
}

/// Placeholder for a key the bundle does not contain
pub fn not_found_markup(key: &str) -> String {
    format!(
        r#"<p class="not-found">Content not found: {}</p>"#,
        html_escape(key)
    )
}

/// Plain link to the original document
pub fn fallback_markup(path: &str) -> String {
    format!(
        r#"<p class="fallback">Unable to load this content here. Open the original: {}</p>"#,
        link_to(path, path, true)
    )
}
