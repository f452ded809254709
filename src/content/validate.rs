//! Metadata validation

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::error::ContentError;
use super::frontmatter::parse_timestamp;
use super::record::{ContentRecord, MetaValue, Metadata};

/// Typed metadata of a record that passed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidMetadata {
    pub title: String,
    pub published_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub layout: Option<String>,
    pub prelude: Option<String>,
}

/// A record whose metadata is known to be renderable
#[derive(Debug, Clone)]
pub struct PublishableRecord {
    record: ContentRecord,
    meta: ValidMetadata,
}

impl PublishableRecord {
    pub(crate) fn new(record: ContentRecord, meta: ValidMetadata) -> Self {
        Self { record, meta }
    }

    pub fn record(&self) -> &ContentRecord {
        &self.record
    }

    pub fn meta(&self) -> &ValidMetadata {
        &self.meta
    }

    pub fn body(&self) -> &str {
        self.record.body()
    }
}

/// Check that `title` and `publishedAt` are present and well-typed
pub fn validate(metadata: &Metadata) -> Result<ValidMetadata, ContentError> {
    let title = match metadata.get("title") {
        Some(MetaValue::Text(_)) | None => text_field(metadata, "title")
            .ok_or_else(|| ContentError::MissingField("title".to_string()))?,
        Some(_) => {
            return Err(ContentError::InvalidField {
                field: "title".to_string(),
                expected: "single-line text",
            })
        }
    };

    let published_at = match metadata.get("publishedAt") {
        Some(value) => timestamp_field("publishedAt", value)?
            .ok_or_else(|| ContentError::MissingField("publishedAt".to_string()))?,
        None => return Err(ContentError::MissingField("publishedAt".to_string())),
    };

    let updated_at = match metadata.get("updatedAt") {
        Some(value) => timestamp_field("updatedAt", value)?,
        None => None,
    };

    Ok(ValidMetadata {
        title,
        published_at,
        updated_at,
        layout: text_field(metadata, "layout"),
        prelude: text_field(metadata, "prelude"),
    })
}

/// Non-blank text value of a field
fn text_field(metadata: &Metadata, key: &str) -> Option<String> {
    let value = metadata.get(key)?.to_string();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Timestamp of a field; `Ok(None)` when the field is blank
fn timestamp_field(
    field: &str,
    value: &MetaValue,
) -> Result<Option<DateTime<FixedOffset>>, ContentError> {
    match value {
        MetaValue::Timestamp(ts) => Ok(Some(*ts)),
        other => {
            let text = other.to_string();
            if text.trim().is_empty() {
                return Ok(None);
            }
            // Hand-built metadata may carry a date as plain text
            match parse_timestamp(&text) {
                Some(ts) => Ok(Some(ts)),
                None => Err(ContentError::InvalidTimestamp {
                    field: field.to_string(),
                    value: text,
                }),
            }
        }
    }
}
