//! Show or change the stored theme preference

use anyhow::Result;

use crate::prefs::{FileStore, Preferences, Theme};
use crate::Folio;

/// `None` prints the current theme; `toggle`, `light` or `dark` change it
pub fn run(folio: &Folio, action: Option<&str>) -> Result<Theme> {
    let store = FileStore::open(folio.prefs_path())?;
    let mut prefs = Preferences::load(store)?;

    let theme = match action {
        None => prefs.theme(),
        Some("toggle") => prefs.toggle_theme()?,
        Some(name) => {
            let theme = Theme::parse(name).ok_or_else(|| {
                anyhow::anyhow!("Unknown theme: {}. Available: light, dark, toggle", name)
            })?;
            prefs.set_theme(theme)?;
            theme
        }
    };

    tracing::debug!("Theme preference stored in {:?}", folio.prefs_path());
    Ok(theme)
}
