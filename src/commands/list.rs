//! List site content

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::Folio;

/// One document as shown by `list`
#[derive(Debug, Serialize)]
pub struct ListEntry {
    pub source: String,
    pub title: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<FixedOffset>>,
    pub layout: Option<String>,
    pub error: Option<String>,
}

/// Parse and validate every document, newest first; invalid ones last
pub fn entries(folio: &Folio) -> Vec<ListEntry> {
    let loader = folio.loader();
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for path in loader.discover() {
        let source = loader.relative_source(&path);
        match loader.load(&path).and_then(|record| record.validate()) {
            Ok(record) => {
                let meta = record.meta();
                valid.push(ListEntry {
                    source,
                    title: Some(meta.title.clone()),
                    published_at: Some(meta.published_at),
                    layout: meta.layout.clone(),
                    error: None,
                });
            }
            Err(e) => invalid.push(ListEntry {
                source,
                title: None,
                published_at: None,
                layout: None,
                error: Some(e.to_string()),
            }),
        }
    }

    valid.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    valid.into_iter().chain(invalid).collect()
}

/// Text line of one entry
fn line(entry: &ListEntry) -> String {
    match (&entry.title, &entry.published_at, &entry.error) {
        (Some(title), Some(date), _) => {
            format!("  {} - {} [{}]", date.format("%Y-%m-%d"), title, entry.source)
        }
        (_, _, Some(error)) => format!("  !! {} [{}]", error, entry.source),
        _ => format!("  ?? [{}]", entry.source),
    }
}

/// Print documents as text or JSON
pub fn run(folio: &Folio, json: bool) -> Result<()> {
    let entries = entries(folio);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Documents ({}):", entries.len());
    for entry in &entries {
        println!("{}", line(entry));
    }

    Ok(())
}
