//! Layout registry backed by the Tera template engine
//!
//! A [`LayoutRegistry`] maps layout identifiers to templates. It is built
//! once per build and handed to the renderer explicitly; there is no
//! process-wide registry.

mod render;

pub use render::{render, PageRenderer, SiteContext};

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};
use walkdir::WalkDir;

use crate::content::ContentError;

/// Date format used when the `date_format` filter gets no argument
pub const DEFAULT_DATE_FORMAT: &str = "%B %d, %Y";

const BUILTIN_LAYOUTS: &[(&str, &str)] = &[
    ("post", include_str!("builtin/post.html")),
    ("page", include_str!("builtin/page.html")),
];

/// Named layout templates
pub struct LayoutRegistry {
    tera: Tera,
}

impl LayoutRegistry {
    /// Create an empty registry
    pub fn new(date_format: &str) -> Self {
        let mut tera = Tera::default();

        // Layouts emit HTML directly; templates escape text with `| escape`
        tera.autoescape_on(vec![]);

        tera.register_filter("date_format", date_format_filter(date_format));
        tera.register_filter("strip_html", strip_html_filter);

        Self { tera }
    }

    /// Create a registry holding the built-in `post` and `page` layouts
    pub fn with_builtin(date_format: &str) -> Result<Self, ContentError> {
        let mut registry = Self::new(date_format);
        registry.register_all(
            BUILTIN_LAYOUTS
                .iter()
                .map(|(name, source)| (name.to_string(), source.to_string()))
                .collect(),
        )?;
        Ok(registry)
    }

    /// Register a single layout, replacing any layout of the same name
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), ContentError> {
        self.tera
            .add_raw_template(name, source)
            .map_err(|e| template_error(name, &e))
    }

    /// Register several layouts at once so they may extend or include each other
    pub fn register_all(&mut self, layouts: Vec<(String, String)>) -> Result<(), ContentError> {
        let names = layouts
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.tera
            .add_raw_templates(layouts.iter().map(|(n, s)| (n.as_str(), s.as_str())))
            .map_err(|e| template_error(&names, &e))
    }

    /// Load every `*.html` / `*.tera` file below `dir`. A file's identifier is
    /// its path relative to `dir` without extension (`partials/head`).
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, ContentError> {
        let mut layouts = Vec::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("Skipping unreadable layout entry: {}", err);
                    None
                }
            })
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_layout_file(path) {
                continue;
            }

            let relative = path.strip_prefix(dir).unwrap_or(path).with_extension("");
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let source = fs::read_to_string(path)?;
            tracing::debug!("Loaded layout `{}` from {:?}", name, path);
            layouts.push((name, source));
        }

        let count = layouts.len();
        if count > 0 {
            self.register_all(layouts)?;
        }
        Ok(count)
    }

    /// Layout identifier for a front-matter `layout` value.
    ///
    /// The value names a layout as written, minus its extension
    /// (`blog/post.html` is `blog/post`). Only values pointing outside the
    /// layout directory, like `../../layouts/BlogPost.astro`, fall back to
    /// their file stem. The result may still be unregistered.
    pub fn resolve(&self, value: &str) -> String {
        let normalized = value.trim().replace('\\', "/");
        let normalized = normalized.trim_start_matches("./");
        let candidate = strip_extension(normalized);

        if self.contains(candidate) || !is_external(candidate) {
            return candidate.to_string();
        }

        let stem = candidate.rsplit('/').next().unwrap_or(candidate);
        stem.to_string()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Registered layout identifiers, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tera.get_template_names().map(String::from).collect();
        names.sort();
        names
    }

    /// Render a registered layout with the given context
    pub fn render(&self, name: &str, context: &Context) -> Result<String, ContentError> {
        if !self.contains(name) {
            return Err(ContentError::UnknownLayout(name.to_string()));
        }
        self.tera
            .render(name, context)
            .map_err(|e| template_error(name, &e))
    }
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

/// Identifier without the extension of its last path component
fn strip_extension(value: &str) -> &str {
    let file_start = value.rfind('/').map(|pos| pos + 1).unwrap_or(0);
    match value[file_start..].rfind('.') {
        Some(pos) if pos > 0 => &value[..file_start + pos],
        _ => value,
    }
}

/// Whether a layout value points outside the layout directory
fn is_external(value: &str) -> bool {
    value.starts_with('/') || value.split('/').any(|part| part == "..")
}

fn is_layout_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "html" || e == "tera")
        .unwrap_or(false)
}

/// Flatten a Tera error and its causes into one message
fn template_error(layout: &str, error: &tera::Error) -> ContentError {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    ContentError::Template {
        layout: layout.to_string(),
        message,
    }
}

/// Tera filter: format an RFC 3339 timestamp with a chrono format string
fn date_format_filter(default_format: &str) -> impl tera::Filter + 'static {
    let default_format = default_format.to_string();
    move |value: &tera::Value, args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
        let s = tera::try_get_value!("date_format", "value", String, value);
        let format = match args.get("format") {
            Some(val) => tera::try_get_value!("date_format", "format", String, val),
            None => default_format.clone(),
        };

        match chrono::DateTime::parse_from_rfc3339(&s) {
            Ok(date) => Ok(tera::Value::String(date.format(&format).to_string())),
            // Not a timestamp: leave it as-is
            Err(_) => Ok(tera::Value::String(s)),
        }
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layouts() {
        let registry = LayoutRegistry::with_builtin(DEFAULT_DATE_FORMAT).unwrap();
        assert!(registry.contains("post"));
        assert!(registry.contains("page"));
        assert!(!registry.contains("BlogPostLayout"));
        assert_eq!(registry.names(), vec!["page", "post"]);
    }

    #[test]
    fn test_unknown_layout() {
        let registry = LayoutRegistry::with_builtin(DEFAULT_DATE_FORMAT).unwrap();
        let err = registry.render("missing", &Context::new()).unwrap_err();
        assert!(matches!(err, ContentError::UnknownLayout(ref n) if n == "missing"));
    }

    #[test]
    fn test_register_invalid_template() {
        let mut registry = LayoutRegistry::default();
        let err = registry.register("broken", "{% if %}").unwrap_err();
        assert!(matches!(err, ContentError::Template { ref layout, .. } if layout == "broken"));
        assert!(!registry.contains("broken"));
    }

    #[test]
    fn test_filters() {
        let mut registry = LayoutRegistry::new("%Y-%m-%d");
        registry
            .register(
                "dates",
                "{{ when | date_format }}|{{ when | date_format(format=\"%Y\") }}|{{ html | strip_html }}",
            )
            .unwrap();

        let mut context = Context::new();
        context.insert("when", "2023-11-18T10:00:00+00:00");
        context.insert("html", "<p>Hi <b>there</b></p>");
        let out = registry.render("dates", &context).unwrap();
        assert_eq!(out, "2023-11-18|2023|Hi there");
    }

    #[test]
    fn test_load_dir_with_inheritance() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("partials")).unwrap();
        fs::write(
            dir.path().join("base.html"),
            "<main>{% block content %}{% endblock content %}</main>",
        )
        .unwrap();
        fs::write(
            dir.path().join("BlogPostLayout.html"),
            "{% extends \"base\" %}{% block content %}{% include \"partials/title\" %}{% endblock content %}",
        )
        .unwrap();
        fs::write(dir.path().join("partials/title.tera"), "<h1>{{ title }}</h1>").unwrap();
        fs::write(dir.path().join("README.md"), "not a layout").unwrap();

        let mut registry = LayoutRegistry::default();
        assert_eq!(registry.load_dir(dir.path()).unwrap(), 3);
        assert!(registry.contains("partials/title"));

        let mut context = Context::new();
        context.insert("title", "X");
        let out = registry.render("BlogPostLayout", &context).unwrap();
        assert_eq!(out, "<main><h1>X</h1></main>");
    }

    #[cfg(unix)]
    #[test]
    fn test_load_dir_skips_broken_link() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("card.html"), "<p>{{ title }}</p>").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling.html"))
            .unwrap();

        let mut registry = LayoutRegistry::default();
        assert_eq!(registry.load_dir(dir.path()).unwrap(), 1);
        assert_eq!(registry.names(), vec!["card"]);
    }

    #[test]
    fn test_resolve() {
        let mut registry = LayoutRegistry::with_builtin(DEFAULT_DATE_FORMAT).unwrap();
        registry.register("blog/post", "USER:{{ title }}").unwrap();

        assert_eq!(registry.resolve("../../layouts/BlogPostLayout.astro"), "BlogPostLayout");
        assert_eq!(registry.resolve("/srv/layouts/page.astro"), "page");
        assert_eq!(registry.resolve("post"), "post");
        assert_eq!(registry.resolve(" page.html "), "page");
        assert_eq!(registry.resolve("./blog/post.html"), "blog/post");
        assert_eq!(registry.resolve("blog\\post"), "blog/post");
        assert_eq!(registry.resolve(".hidden"), ".hidden");
    }

    #[test]
    fn test_resolve_keeps_unregistered_nested_name() {
        let registry = LayoutRegistry::with_builtin(DEFAULT_DATE_FORMAT).unwrap();
        // A nested name never collapses onto a built-in of the same stem
        assert_eq!(registry.resolve("recipes/post"), "recipes/post");
        assert!(!registry.contains("recipes/post"));
    }
}
