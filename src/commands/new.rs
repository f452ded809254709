//! Create a new document

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::{ContentRecord, MetaValue, Metadata};
use crate::Folio;

/// Scaffold a document with `title` and `publishedAt` set to now
pub fn create_post(
    folio: &Folio,
    title: &str,
    layout: Option<&str>,
    path: Option<&str>,
) -> Result<PathBuf> {
    let now = chrono::Local::now().fixed_offset();

    let filename = match path {
        Some(p) => format!("{}.md", p.trim_end_matches(".md")),
        None => format!("{}.md", slug::slugify(title)),
    };
    let file_path = folio.source_dir.join(filename);

    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let mut metadata = Metadata::new();
    metadata.insert("title".to_string(), MetaValue::Text(title.to_string()));
    metadata.insert("publishedAt".to_string(), MetaValue::Timestamp(now));
    if let Some(layout) = layout {
        metadata.insert("layout".to_string(), MetaValue::Text(layout.to_string()));
    }
    let document = ContentRecord::new(metadata, String::new()).to_document()?;

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, document)?;

    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
