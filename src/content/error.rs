//! Errors raised while turning a source document into a page

use thiserror::Error;

/// Failure of one document at some stage of parse, validate or render
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field `{field}` must be {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    #[error("Invalid timestamp in `{field}`: {value:?}")]
    InvalidTimestamp { field: String, value: String },

    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    #[error("Template error in layout `{layout}`: {message}")]
    Template { layout: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContentError {
    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ContentError::MalformedDocument(_) => "MalformedDocument",
            ContentError::MissingField(_) => "MissingField",
            ContentError::InvalidField { .. } => "InvalidField",
            ContentError::InvalidTimestamp { .. } => "InvalidTimestamp",
            ContentError::UnknownLayout(_) => "UnknownLayout",
            ContentError::Template { .. } => "Template",
            ContentError::Io(_) => "Io",
        }
    }
}
