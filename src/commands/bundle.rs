//! Bundle the content directory

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::content::artifact;
use crate::content::loader::ContentLoader;
use crate::Folio;

/// Read every document and write the artifact. Returns the number of files.
///
/// Nothing is written unless every file was read.
pub fn run(folio: &Folio) -> Result<usize> {
    let start = std::time::Instant::now();

    let bundle = ContentLoader::new(folio).load()?;
    tracing::info!("Loaded {} documents from {:?}", bundle.len(), folio.content_dir);

    let missing = folio.config.catalog.missing_keys(&bundle);
    for key in &missing {
        tracing::warn!("Catalog references missing content: {}", key);
    }

    let encoded = artifact::encode(&bundle, folio.config.format, &folio.config.global_name)?;
    artifact::write(&folio.output_path, &encoded)?;

    let duration = start.elapsed();
    tracing::info!("Bundled in {:.2}s", duration.as_secs_f64());

    Ok(bundle.len())
}

/// Watch the content directory and config, rebundling on change
pub async fn watch(folio: &Folio) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&folio.content_dir, notify::RecursiveMode::Recursive)?;

    let config_path = folio.base_dir.join("_config.yml");
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("Content changed, rebundling...");
                    // Config edits take effect on the next run
                    let result = Folio::new(&folio.base_dir).and_then(|f| run(&f));
                    match result {
                        Ok(count) => tracing::info!("Bundled {} files", count),
                        Err(e) => tracing::error!("Bundling failed: {}", e),
                    }
                    last_rebuild = std::time::Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArtifactFormat, SiteConfig};
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("content");
        fs::create_dir_all(content.join("articles")).unwrap();
        fs::create_dir_all(content.join("notes")).unwrap();
        fs::write(content.join("articles/b.md"), "# B\n\n'quoted' \"text\"").unwrap();
        fs::write(content.join("notes/a.md"), "line\r\nbreak\ttab").unwrap();
        fs::write(content.join("notes/pic.png"), [0x89, 0x50, 0x4e, 0x47]).unwrap();
        dir
    }

    #[test]
    fn test_bundle_writes_artifact() {
        let dir = site();
        let folio = Folio::new(dir.path()).unwrap();

        assert_eq!(run(&folio).unwrap(), 2);
        let bundle = folio.load_bundle().unwrap();
        assert_eq!(bundle.get("articles/b"), Some("# B\n\n'quoted' \"text\""));
        assert_eq!(bundle.get("notes/a"), Some("line\r\nbreak\ttab"));
        assert_eq!(bundle.get("notes/pic"), None);
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = site();
        let folio = Folio::new(dir.path()).unwrap();

        run(&folio).unwrap();
        let first = fs::read(&folio.output_path).unwrap();
        run(&folio).unwrap();
        let second = fs::read(&folio.output_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_format() {
        let dir = site();
        let config = SiteConfig {
            format: ArtifactFormat::Json,
            output: "data/content.json".to_string(),
            ..SiteConfig::default()
        };
        let folio = Folio::with_config(dir.path().to_path_buf(), config);

        run(&folio).unwrap();
        let raw = fs::read_to_string(dir.path().join("data/content.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["notes/a"], "line\r\nbreak\ttab");
    }

    #[test]
    fn test_unreadable_file_leaves_no_artifact() {
        let dir = site();
        fs::write(dir.path().join("content/notes/bad.md"), [0xff, 0xfe]).unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        assert!(run(&folio).is_err());
        assert!(!folio.output_path.exists());
    }

    #[test]
    fn test_missing_content_dir_fails() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        assert!(run(&folio).is_err());
    }
}
