//! Front-matter splitting and decoding

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::de::{Deserializer as _, IgnoredAny, MapAccess, Visitor};
use serde_yaml::Value;
use std::fmt;

use super::error::ContentError;
use super::record::{MetaValue, Metadata};

/// Marker line that opens and closes the front-matter block
pub const DELIMITER: &str = "---";

/// Keys decoded as timestamps when their value parses as one
pub const TIMESTAMP_FIELDS: &[&str] = &["publishedAt", "updatedAt"];

/// Split a document into its raw front-matter block and its body.
///
/// The opening delimiter must be the first line. The body starts after the
/// closing delimiter, minus any blank lines directly following it.
pub fn split(content: &str) -> Result<(&str, &str), ContentError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let (first, rest) = next_line(content);
    if first.trim_end() != DELIMITER {
        return Err(ContentError::MalformedDocument(
            "document must open with a `---` line".to_string(),
        ));
    }

    let mut consumed = 0;
    let mut remaining = rest;
    while !remaining.is_empty() {
        let (line, after) = next_line(remaining);
        if line.trim_end() == DELIMITER {
            let block = &rest[..consumed];
            let body = after.trim_start_matches(['\n', '\r']);
            return Ok((block, body));
        }
        consumed += remaining.len() - after.len();
        remaining = after;
    }

    Err(ContentError::MalformedDocument(
        "front-matter block has no closing `---` line".to_string(),
    ))
}

fn next_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(pos) => (&s[..pos], &s[pos + 1..]),
        None => (s, ""),
    }
}

/// Decode a raw front-matter block into typed metadata
pub fn decode(block: &str) -> Result<Metadata, ContentError> {
    let mut metadata = Metadata::new();
    if block.trim().is_empty() {
        return Ok(metadata);
    }

    let value: Value = serde_yaml::from_str(block).map_err(|e| {
        ContentError::MalformedDocument(format!("front-matter is not valid YAML: {}", e))
    })?;

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(metadata),
        other => {
            return Err(ContentError::MalformedDocument(format!(
                "front-matter must be a key-value mapping, found {}",
                kind_of(&other)
            )))
        }
    };

    // Numbers and booleans keep the text they were written with
    let wanted: Vec<bool> = mapping
        .values()
        .map(|v| matches!(v, Value::Number(_) | Value::Bool(_)))
        .collect();
    let mut literals = if wanted.iter().any(|w| *w) {
        literal_scalars(block, wanted).map_err(|e| {
            ContentError::MalformedDocument(format!("front-matter is not valid YAML: {}", e))
        })?
    } else {
        Vec::new()
    }
    .into_iter();

    for (key, value) in mapping {
        let literal = literals.next().flatten();
        let key = match key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(ContentError::MalformedDocument(format!(
                    "front-matter key must be a scalar, found {}",
                    kind_of(&other)
                )))
            }
        };
        let value = match literal {
            Some(text) => MetaValue::Text(text),
            None => decode_value(&key, value)?,
        };
        metadata.insert(key, value);
    }

    Ok(metadata)
}

/// Source text of the top-level values flagged in `wanted`, in mapping order
fn literal_scalars(
    block: &str,
    wanted: Vec<bool>,
) -> Result<Vec<Option<String>>, serde_yaml::Error> {
    struct Literals(Vec<bool>);

    impl<'de> Visitor<'de> for Literals {
        type Value = Vec<Option<String>>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a front-matter mapping")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut literals = Vec::with_capacity(self.0.len());
            for wanted in self.0 {
                if map.next_key::<IgnoredAny>()?.is_none() {
                    break;
                }
                if wanted {
                    literals.push(Some(map.next_value::<String>()?));
                } else {
                    map.next_value::<IgnoredAny>()?;
                    literals.push(None);
                }
            }
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(literals)
        }
    }

    serde_yaml::Deserializer::from_str(block).deserialize_map(Literals(wanted))
}

fn decode_value(key: &str, value: Value) -> Result<MetaValue, ContentError> {
    match value {
        Value::Tagged(tagged) => decode_value(key, tagged.value),
        Value::Null => Ok(MetaValue::Text(String::new())),
        Value::Bool(b) => Ok(MetaValue::Text(b.to_string())),
        Value::Number(n) => Ok(MetaValue::Text(n.to_string())),
        Value::String(s) => Ok(classify(key, s)),
        nested @ (Value::Sequence(_) | Value::Mapping(_)) => {
            // Nested structures are kept verbatim and never decoded further
            let text = serde_yaml::to_string(&nested).map_err(|e| {
                ContentError::MalformedDocument(format!("cannot read `{}`: {}", key, e))
            })?;
            Ok(MetaValue::FreeText(text))
        }
    }
}

fn classify(key: &str, s: String) -> MetaValue {
    if TIMESTAMP_FIELDS.contains(&key) {
        if let Some(ts) = parse_timestamp(&s) {
            return MetaValue::Timestamp(ts);
        }
    }
    if s.contains('\n') {
        MetaValue::FreeText(s)
    } else {
        MetaValue::Text(s)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Parse an ISO-8601 date-time. Values without an offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let offset_formats = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let naive_formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in naive_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().fixed_offset())
}
