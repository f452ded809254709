//! Generator module - runs each document through parse, validate and render
//!
//! Documents share nothing but the read-only layout registry, so each one is
//! processed on its own blocking task. Rendered pages are kept in memory
//! until the caller decides whether to write them.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::content::loader::{self, ContentLoader};
use crate::content::ContentError;
use crate::templates::{LayoutRegistry, PageRenderer, SiteContext};
use crate::Folio;

/// A page ready to be written
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Source path relative to the source directory
    pub source: String,
    /// Output path relative to the public directory
    pub output: PathBuf,
    pub title: String,
    pub published_at: DateTime<FixedOffset>,
    pub layout: String,
    pub html: String,
}

/// A document that could not be rendered
#[derive(Debug)]
pub struct Failure {
    pub source: String,
    pub error: ContentError,
}

/// Outcome of running every document through the pipeline
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<RenderedPage>,
    pub failures: Vec<Failure>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.pages.len() + self.failures.len()
    }

    /// One line per failure, `source: error`
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.source, f.error))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Static page generator
#[derive(Clone)]
pub struct Generator {
    loader: Arc<ContentLoader>,
    layouts: Arc<LayoutRegistry>,
    renderer: Arc<PageRenderer>,
    default_layout: String,
}

impl Generator {
    /// Create a generator for a site, loading its layouts
    pub fn new(folio: &Folio) -> Result<Self> {
        let layouts = folio.layouts()?;
        let renderer = PageRenderer::new(SiteContext::from(&folio.config));

        Ok(Self::with_parts(
            folio.loader(),
            layouts,
            renderer,
            &folio.config.default_layout,
        ))
    }

    pub fn with_parts(
        loader: ContentLoader,
        layouts: LayoutRegistry,
        renderer: PageRenderer,
        default_layout: &str,
    ) -> Self {
        Self {
            loader: Arc::new(loader),
            layouts: Arc::new(layouts),
            renderer: Arc::new(renderer),
            default_layout: default_layout.to_string(),
        }
    }

    pub fn layouts(&self) -> &LayoutRegistry {
        &self.layouts
    }

    /// Parse, validate and render a single document
    pub fn process(&self, path: &Path) -> Result<RenderedPage, ContentError> {
        let source = self.loader.relative_source(path);
        let record = self.loader.load(path)?.validate()?;

        let layout = match record.meta().layout.as_deref() {
            Some(value) => self.layouts.resolve(value),
            None => self.default_layout.clone(),
        };

        let html = self.renderer.render(&record, &layout, &self.layouts)?;
        tracing::debug!("Rendered {} with layout `{}`", source, layout);

        let meta = record.meta();
        Ok(RenderedPage {
            output: loader::output_path(&source),
            source,
            title: meta.title.clone(),
            published_at: meta.published_at,
            layout,
            html,
        })
    }

    /// Render every document in the source directory
    pub async fn render_all(&self) -> Result<BuildReport> {
        let paths = self.loader.discover();
        let mut tasks = JoinSet::new();

        for path in paths {
            let generator = self.clone();
            tasks.spawn_blocking(move || {
                let source = generator.loader.relative_source(&path);
                (source, generator.process(&path))
            });
        }

        let mut report = BuildReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined? {
                (_, Ok(page)) => report.pages.push(page),
                (source, Err(error)) => report.failures.push(Failure { source, error }),
            }
        }

        report.pages.sort_by(|a, b| a.source.cmp(&b.source));
        report.failures.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(report)
    }

    /// Write rendered pages below `public_dir`
    pub async fn write(&self, report: &BuildReport, public_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(public_dir).await?;

        for page in &report.pages {
            let target = public_dir.join(&page.output);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, &page.html).await?;
            tracing::debug!("Wrote {:?}", target);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::DEFAULT_DATE_FORMAT;
    use std::fs;

    fn generator(source_dir: &Path) -> Generator {
        let mut layouts = LayoutRegistry::with_builtin(DEFAULT_DATE_FORMAT).unwrap();
        layouts
            .register("BlogPostLayout", "<h1>{{ title }}</h1>{{ body }}")
            .unwrap();
        Generator::with_parts(
            ContentLoader::new(source_dir, &["md".to_string()]),
            layouts,
            PageRenderer::default(),
            "post",
        )
    }

    #[tokio::test]
    async fn test_render_all_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("blog")).unwrap();
        fs::write(
            root.join("blog/shakshuka.md"),
            "---\nlayout: ../../layouts/BlogPostLayout.astro\ntitle: Shakshuka\npublishedAt: 2023-11-18T10:00:00+00:00\n---\nEggs.",
        )
        .unwrap();
        fs::write(
            root.join("index.md"),
            "---\ntitle: Home\npublishedAt: 2023-01-01\n---\nWelcome",
        )
        .unwrap();
        fs::write(root.join("untitled.md"), "---\npublishedAt: 2023-01-01\n---\n").unwrap();
        fs::write(
            root.join("themed.md"),
            "---\ntitle: T\npublishedAt: 2023-01-01\nlayout: fancy\n---\n",
        )
        .unwrap();
        fs::write(root.join("plain.md"), "no front-matter").unwrap();

        let report = generator(root).render_all().await.unwrap();
        assert_eq!(report.total(), 5);

        let sources: Vec<_> = report.pages.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(sources, vec!["blog/shakshuka.md", "index.md"]);
        assert_eq!(report.pages[0].layout, "BlogPostLayout");
        assert_eq!(report.pages[0].html, "<h1>Shakshuka</h1><p>Eggs.</p>\n");
        assert_eq!(report.pages[0].output, PathBuf::from("blog/shakshuka/index.html"));
        assert_eq!(report.pages[1].layout, "post");

        let kinds: Vec<_> = report
            .failures
            .iter()
            .map(|f| (f.source.as_str(), f.error.kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("plain.md", "MalformedDocument"),
                ("themed.md", "UnknownLayout"),
                ("untitled.md", "MissingField"),
            ]
        );
    }

    #[test]
    fn test_nested_user_layout_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let layout_dir = dir.path().join("layouts");
        let source_dir = dir.path().join("content");
        fs::create_dir_all(layout_dir.join("blog")).unwrap();
        fs::create_dir_all(&source_dir).unwrap();
        fs::write(layout_dir.join("blog/post.html"), "USER:{{ title }}").unwrap();

        let mut layouts = LayoutRegistry::with_builtin(DEFAULT_DATE_FORMAT).unwrap();
        layouts.load_dir(&layout_dir).unwrap();
        let generator = Generator::with_parts(
            ContentLoader::new(&source_dir, &["md".to_string()]),
            layouts,
            PageRenderer::default(),
            "post",
        );

        let nested = source_dir.join("nested.md");
        fs::write(
            &nested,
            "---\ntitle: Nested\npublishedAt: 2023-11-18\nlayout: blog/post\n---\nBody",
        )
        .unwrap();
        let page = generator.process(&nested).unwrap();
        assert_eq!(page.layout, "blog/post");
        assert_eq!(page.html, "USER:Nested");

        let missing = source_dir.join("missing.md");
        fs::write(
            &missing,
            "---\ntitle: Missing\npublishedAt: 2023-11-18\nlayout: recipes/post\n---\nBody",
        )
        .unwrap();
        let err = generator.process(&missing).unwrap_err();
        assert!(matches!(err, ContentError::UnknownLayout(ref n) if n == "recipes/post"));
    }

    #[tokio::test]
    async fn test_write_pages() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("content");
        let public = dir.path().join("public");
        fs::create_dir_all(&source).unwrap();
        fs::write(
            source.join("hello.md"),
            "---\ntitle: X\npublishedAt: \"2023-11-18T10:00:00+00:00\"\n---\nHello",
        )
        .unwrap();

        let generator = generator(&source);
        let report = generator.render_all().await.unwrap();
        assert!(report.is_clean());
        generator.write(&report, &public).await.unwrap();

        let html = fs::read_to_string(public.join("hello/index.html")).unwrap();
        assert!(html.contains("<h1>X</h1>"));
        assert!(html.contains("<p>Hello</p>"));
    }
}
