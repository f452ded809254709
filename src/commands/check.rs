//! Check documents without writing output

use anyhow::Result;

use crate::generator::{BuildReport, Generator};
use crate::Folio;

/// Parse, validate and render every document, then report
pub async fn run(folio: &Folio) -> Result<BuildReport> {
    let generator = Generator::new(folio)?;
    let report = generator.render_all().await?;

    for page in &report.pages {
        tracing::debug!("ok {} ({})", page.source, page.layout);
    }
    for failure in &report.failures {
        tracing::warn!("{} [{}]: {}", failure.source, failure.error.kind(), failure.error);
    }

    tracing::info!(
        "Checked {} documents: {} ok, {} failed",
        report.total(),
        report.pages.len(),
        report.failures.len()
    );

    Ok(report)
}
