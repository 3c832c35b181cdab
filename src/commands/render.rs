//! Render one bundled document

use anyhow::Result;

use crate::viewer::{Viewer, ViewerState};
use crate::Folio;

/// Render the document stored under `key`, or the not-found placeholder
pub fn run(folio: &Folio, key: &str) -> Result<()> {
    let bundle = folio.load_bundle()?;
    let renderer = folio.renderer();

    let mut viewer = Viewer::new();
    if let ViewerState::Open { markup, .. } = viewer.open_key(key, key, &bundle, &renderer) {
        println!("{}", markup);
    }
    viewer.close();

    Ok(())
}
