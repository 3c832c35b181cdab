//! Remove the generated artifact

use anyhow::Result;
use std::fs;

use crate::Folio;

/// Delete the content artifact if present
pub fn run(folio: &Folio) -> Result<()> {
    if folio.output_path.exists() {
        fs::remove_file(&folio.output_path)?;
        tracing::info!("Deleted: {:?}", folio.output_path);
    } else {
        tracing::debug!("Nothing to clean at {:?}", folio.output_path);
    }

    Ok(())
}
