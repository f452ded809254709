//! Page rendering: record + layout -> HTML

use indexmap::IndexMap;
use serde::Serialize;
use tera::Context;

use super::LayoutRegistry;
use crate::config::SiteConfig;
use crate::content::{ContentError, MarkdownRenderer, PublishableRecord};

/// Site-wide values exposed to layouts as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub url: String,
    pub author: String,
}

impl From<&SiteConfig> for SiteContext {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            url: config.url.clone(),
            author: config.author.clone(),
        }
    }
}

#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    #[serde(rename = "publishedAt")]
    published_at: String,
    #[serde(rename = "updatedAt")]
    updated_at: Option<String>,
    body: String,
    raw: &'a str,
    prelude: Option<&'a str>,
    excerpt: Option<String>,
    meta: IndexMap<&'a str, String>,
    site: &'a SiteContext,
}

/// Renders validated records through named layouts
#[derive(Debug, Clone)]
pub struct PageRenderer {
    markdown: MarkdownRenderer,
    site: SiteContext,
}

impl PageRenderer {
    pub fn new(site: SiteContext) -> Self {
        Self {
            markdown: MarkdownRenderer::new(),
            site,
        }
    }

    /// Substitute the record into `layout`. An unregistered layout is an
    /// error; there is no fallback.
    pub fn render(
        &self,
        record: &PublishableRecord,
        layout: &str,
        layouts: &LayoutRegistry,
    ) -> Result<String, ContentError> {
        if !layouts.contains(layout) {
            return Err(ContentError::UnknownLayout(layout.to_string()));
        }

        let context = self.build_context(record, layout)?;
        layouts.render(layout, &context)
    }

    fn build_context(
        &self,
        record: &PublishableRecord,
        layout: &str,
    ) -> Result<Context, ContentError> {
        let meta = record.meta();
        let body = record.body();

        let excerpt = meta
            .prelude
            .as_deref()
            .or_else(|| MarkdownRenderer::excerpt(body))
            .map(|md| self.markdown.render(md));

        let page = PageContext {
            title: &meta.title,
            published_at: meta.published_at.to_rfc3339(),
            updated_at: meta.updated_at.map(|ts| ts.to_rfc3339()),
            body: self.markdown.render(body),
            raw: body,
            prelude: meta.prelude.as_deref(),
            excerpt,
            meta: record
                .record()
                .metadata()
                .iter()
                .map(|(key, value)| (key.as_str(), value.to_string()))
                .collect(),
            site: &self.site,
        };

        Context::from_serialize(&page).map_err(|e| ContentError::Template {
            layout: layout.to_string(),
            message: format!("cannot build page context: {}", e),
        })
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(SiteContext::from(&SiteConfig::default()))
    }
}

/// Render a record through `layout` with default site values
pub fn render(
    record: &PublishableRecord,
    layout: &str,
    layouts: &LayoutRegistry,
) -> Result<String, ContentError> {
    PageRenderer::default().render(record, layout, layouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentRecord;
    use crate::templates::DEFAULT_DATE_FORMAT;

    fn publishable(doc: &str) -> PublishableRecord {
        ContentRecord::parse(doc).unwrap().validate().unwrap()
    }

    const DOC: &str = "---\ntitle: \"X & Y\"\npublishedAt: \"2023-11-18T10:00:00+00:00\"\n---\nHello";

    #[test]
    fn test_render_builtin_post() {
        let layouts = LayoutRegistry::with_builtin(DEFAULT_DATE_FORMAT).unwrap();
        let html = render(&publishable(DOC), "post", &layouts).unwrap();
        assert!(html.contains("<h1>X &amp; Y</h1>"));
        assert!(html.contains(r#"<time datetime="2023-11-18T10:00:00+00:00">November 18, 2023</time>"#));
        assert!(html.contains("<p>Hello</p>"));
        assert!(!html.contains("---"));
    }

    #[test]
    fn test_render_substitutes_fields() {
        let mut layouts = LayoutRegistry::default();
        layouts
            .register("plain", "{{ title }}|{{ publishedAt }}|{{ body }}")
            .unwrap();
        let html = render(&publishable(DOC), "plain", &layouts).unwrap();
        assert_eq!(html, "X & Y|2023-11-18T10:00:00+00:00|<p>Hello</p>\n");
    }

    #[test]
    fn test_unknown_layout_never_falls_back() {
        let layouts = LayoutRegistry::with_builtin(DEFAULT_DATE_FORMAT).unwrap();
        let err = render(&publishable(DOC), "BlogPostLayout", &layouts).unwrap_err();
        assert!(matches!(err, ContentError::UnknownLayout(ref n) if n == "BlogPostLayout"));

        let empty = LayoutRegistry::default();
        let err = render(&publishable(DOC), "post", &empty).unwrap_err();
        assert!(matches!(err, ContentError::UnknownLayout(_)));
    }

    #[test]
    fn test_context_extras() {
        let mut layouts = LayoutRegistry::default();
        layouts
            .register(
                "extras",
                "{{ site.title }}|{{ meta.series }}|{{ excerpt }}|{{ raw }}",
            )
            .unwrap();

        let record = publishable(
            "---\ntitle: T\npublishedAt: 2023-11-18\nseries: Breakfast\n---\nShort intro.\n<!-- more -->\nRest.",
        );
        let renderer = PageRenderer::new(SiteContext {
            title: "Kitchen".to_string(),
            url: "https://example.org".to_string(),
            author: String::new(),
        });
        let html = renderer.render(&record, "extras", &layouts).unwrap();
        assert_eq!(
            html,
            "Kitchen|Breakfast|<p>Short intro.</p>\n|Short intro.\n<!-- more -->\nRest."
        );
    }

    #[test]
    fn test_prelude_is_excerpt() {
        let mut layouts = LayoutRegistry::default();
        layouts.register("ex", "{{ prelude }}|{{ excerpt }}").unwrap();
        let record = publishable("---\ntitle: T\npublishedAt: 2023-11-18\nprelude: Quick eggs\n---\nBody");
        let html = render(&record, "ex", &layouts).unwrap();
        assert_eq!(html, "Quick eggs|<p>Quick eggs</p>\n");
    }

    #[test]
    fn test_template_runtime_error() {
        let mut layouts = LayoutRegistry::default();
        layouts.register("strict", "{{ nope.field }}").unwrap();
        let err = render(&publishable(DOC), "strict", &layouts).unwrap_err();
        assert!(matches!(err, ContentError::Template { ref layout, .. } if layout == "strict"));
    }
}
