//! Content records: one parsed source document

use chrono::{DateTime, FixedOffset, SecondsFormat};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

use super::error::ContentError;
use super::frontmatter;
use super::validate::{self, PublishableRecord};

/// Front-matter fields keyed by name. Equality ignores key order.
pub type Metadata = IndexMap<String, MetaValue>;

/// A single front-matter value, typed when the document is parsed
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    /// Single-line scalar (numbers and booleans keep their literal text)
    Text(String),
    /// Date-time value of a timestamp field
    Timestamp(DateTime<FixedOffset>),
    /// Multi-line scalar or nested structure, kept as literal text
    FreeText(String),
}

impl MetaValue {
    /// Textual content, if this is not a timestamp
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) | MetaValue::FreeText(s) => Some(s),
            MetaValue::Timestamp(_) => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            MetaValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Text(s) | MetaValue::FreeText(s) => f.write_str(s),
            MetaValue::Timestamp(ts) => {
                f.write_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
        }
    }
}

impl Serialize for MetaValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A parsed document: front-matter metadata plus the raw markup body
///
/// Records are immutable once parsed; validation consumes the record and
/// produces a [`PublishableRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRecord {
    metadata: Metadata,
    body: String,
}

impl ContentRecord {
    pub fn new(metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
        }
    }

    /// Parse a document that opens with a `---` front-matter block
    pub fn parse(content: &str) -> Result<Self, ContentError> {
        let (block, body) = frontmatter::split(content)?;
        let metadata = frontmatter::decode(block)?;
        Ok(Self::new(metadata, body))
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.metadata.get(key)
    }

    /// Serialize back into document form
    pub fn to_document(&self) -> serde_yaml::Result<String> {
        let yaml = serde_yaml::to_string(&self.metadata)?;

        let mut out = String::with_capacity(yaml.len() + self.body.len() + 8);
        out.push_str(frontmatter::DELIMITER);
        out.push('\n');
        out.push_str(&yaml);
        if !yaml.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(frontmatter::DELIMITER);
        out.push('\n');
        out.push_str(&self.body);
        Ok(out)
    }

    /// Check required fields and pair the record with its typed metadata
    pub fn validate(self) -> Result<PublishableRecord, ContentError> {
        let meta = validate::validate(&self.metadata)?;
        Ok(PublishableRecord::new(self, meta))
    }
}
