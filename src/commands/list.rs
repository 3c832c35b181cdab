//! List site content

use anyhow::Result;

use crate::content::{preview, ContentBundle, Resolution};
use crate::Folio;

/// List bundled documents or catalog entries
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let bundle = folio.load_bundle()?;

    match content_type {
        "content" | "keys" => {
            println!("Content ({}):", bundle.len());
            for entry in &bundle {
                println!("  {} ({} chars)", entry.key, entry.text.chars().count());
            }
        }
        "catalog" | "cards" => {
            for line in catalog_lines(folio, &bundle) {
                println!("{}", line);
            }
        }
        "missing" => {
            let missing = folio.config.catalog.missing_keys(&bundle);
            println!("Missing ({}):", missing.len());
            for key in missing {
                println!("  {}", key);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: content, catalog, missing",
                content_type
            );
        }
    }

    Ok(())
}

/// One header line per category, one line per card with its status and preview
fn catalog_lines(folio: &Folio, bundle: &ContentBundle) -> Vec<String> {
    let catalog = &folio.config.catalog;
    let max = folio.config.preview_length;
    let resolved = catalog.resolve(bundle);
    let mut lines = Vec::new();

    for category in catalog.categories() {
        lines.push(format!("{} ({}):", category, catalog.entries(category).len()));
        for (_, entry, resolution) in resolved.iter().filter(|(c, _, _)| *c == category) {
            let date = entry
                .date
                .as_deref()
                .map(|d| format!(" - {}", d))
                .unwrap_or_default();
            let (status, text) = match resolution {
                Resolution::Bundled(key) => (key.clone(), bundle.get(key)),
                Resolution::Inline => ("inline".to_string(), entry.content.as_deref()),
                Resolution::Missing(key) => (format!("MISSING {}", key), None),
            };
            lines.push(format!("  {}{} [{}]", entry.title, date, status));
            if let Some(text) = text {
                let excerpt = preview::excerpt(text, max).replace('\n', " ");
                if !excerpt.is_empty() {
                    lines.push(format!("      {}", excerpt));
                }
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{CatalogEntry, ContentEntry};

    #[test]
    fn test_catalog_lines() {
        let mut config = SiteConfig::default();
        config.preview_length = 5;
        config.catalog.insert(
            "articles",
            CatalogEntry {
                file: Some("a.md".to_string()),
                title: "A".to_string(),
                date: Some("2024.11.17".to_string()),
                ..CatalogEntry::default()
            },
        );
        config.catalog.insert(
            "articles",
            CatalogEntry {
                file: Some("gone.md".to_string()),
                title: "Gone".to_string(),
                ..CatalogEntry::default()
            },
        );
        let folio = Folio::with_config(std::env::temp_dir(), config);
        let bundle: ContentBundle = vec![ContentEntry::new("articles/a", "# Heading text")]
            .into_iter()
            .collect();

        assert_eq!(
            catalog_lines(&folio, &bundle),
            vec![
                "articles (2):",
                "  A - 2024.11.17 [articles/a]",
                "      Headi...",
                "  Gone [MISSING articles/gone]",
            ]
        );
    }
}
