//! Content module - parsing, validating and loading source documents

mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod record;
mod validate;

pub use error::ContentError;
pub use frontmatter::{parse_timestamp, DELIMITER, TIMESTAMP_FIELDS};
pub use markdown::MarkdownRenderer;
pub use record::{ContentRecord, MetaValue, Metadata};
pub use validate::{validate, PublishableRecord, ValidMetadata};
