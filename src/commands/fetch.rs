//! Load a document through the remote fallback path

use anyhow::Result;

use crate::remote::RemoteSource;
use crate::viewer::{Viewer, ViewerState};
use crate::Folio;

/// Fetch `path` from the configured remote and print the rendered markup.
/// Failures print the fallback link instead.
pub async fn run(folio: &Folio, path: &str) -> Result<()> {
    let remote = RemoteSource::new(folio.config.remote.clone());
    let renderer = folio.renderer();

    let mut viewer = Viewer::new();
    if let ViewerState::Open { markup, .. } =
        viewer.open_remote(path, path, &remote, &renderer).await
    {
        println!("{}", markup);
    }
    viewer.close();

    Ok(())
}
