//! Build the site

use anyhow::Result;

use crate::config::OnError;
use crate::generator::{BuildReport, Generator};
use crate::Folio;

/// Render every document and write the pages.
///
/// With `on_error: abort`, a single failed document fails the build before
/// any page is written.
pub async fn run(folio: &Folio) -> Result<BuildReport> {
    let start = std::time::Instant::now();

    let generator = Generator::new(folio)?;
    tracing::debug!("Layouts: {}", generator.layouts().names().join(", "));

    let report = generator.render_all().await?;

    for failure in &report.failures {
        tracing::warn!("Skipping {}: {}", failure.source, failure.error);
    }

    if !report.is_clean() && folio.config.on_error == OnError::Abort {
        anyhow::bail!(
            "{} of {} documents failed, nothing was written:\n{}",
            report.failures.len(),
            report.total(),
            report.failure_summary()
        );
    }

    generator.write(&report, &folio.public_dir).await?;

    tracing::info!(
        "Rendered {} pages ({} skipped) in {:.2}s",
        report.pages.len(),
        report.failures.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;

    fn site(on_error: OnError) -> (tempfile::TempDir, Folio) {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig {
            on_error,
            ..Default::default()
        };
        let folio = Folio::with_config(dir.path(), config);
        fs::create_dir_all(&folio.source_dir).unwrap();
        fs::write(
            folio.source_dir.join("good.md"),
            "---\ntitle: Good\npublishedAt: 2023-11-18\n---\nFine",
        )
        .unwrap();
        fs::write(
            folio.source_dir.join("bad.md"),
            "---\ntitle: Bad\npublishedAt: \"not-a-date\"\n---\n",
        )
        .unwrap();
        (dir, folio)
    }

    #[tokio::test]
    async fn test_skip_failed_documents() {
        let (_dir, folio) = site(OnError::Skip);
        let report = run(&folio).await.unwrap();
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.failures[0].error.kind(), "InvalidTimestamp");
        assert!(folio.public_dir.join("good/index.html").exists());
        assert!(!folio.public_dir.join("bad/index.html").exists());
    }

    #[tokio::test]
    async fn test_abort_writes_nothing() {
        let (_dir, folio) = site(OnError::Abort);
        let err = run(&folio).await.unwrap_err();
        assert!(err.to_string().contains("bad.md"));
        assert!(!folio.public_dir.exists());
    }
}
