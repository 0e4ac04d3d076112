//! Issue-form parsing into a typed submission.
//!
//! Issue forms render each field as a `### <label>` header followed by the
//! response lines. The mapping from header label to field key is a fixed
//! finite table consulted by exact lowercase match; content under any other
//! header is consumed and discarded so stray headers cannot bleed into the
//! next recognized field.

use std::collections::BTreeMap;

/// Marker prefix for a form field header line.
const HEADER_PREFIX: &str = "### ";

/// Placeholder the form inserts for an unanswered optional field.
const NO_RESPONSE: &str = "_No response_";

/// Required field keys, in form order.
const REQUIRED_FIELDS: [&str; 4] = ["place_name", "city", "category", "description"];

/// Map a form header label (already lowercased) to its canonical field key.
fn field_key(label: &str) -> Option<&'static str> {
    match label {
        "place name" => Some("place_name"),
        "city" => Some("city"),
        "category" => Some("category"),
        "description" => Some("description"),
        "address" | "address (optional)" => Some("address"),
        "website" | "website (optional)" => Some("website"),
        _ => None,
    }
}

/// Parse raw issue body text into a field-key to trimmed-content mapping.
///
/// Content lines under a recognized header are joined by newlines; a line
/// equal to the no-response sentinel is dropped. A body with no headers
/// yields an empty mapping; a header with no content yields an empty string.
pub fn parse_form(body: &str) -> BTreeMap<&'static str, String> {
    let mut fields = BTreeMap::new();
    let mut current: Option<&'static str> = None;
    let mut value: Vec<&str> = Vec::new();

    for raw_line in body.lines() {
        let line = raw_line.trim();
        if let Some(label) = line.strip_prefix(HEADER_PREFIX) {
            if let Some(key) = current.take() {
                fields.insert(key, value.join("\n").trim().to_string());
            }
            value.clear();
            current = field_key(&label.trim().to_lowercase());
        } else if current.is_some() && !line.is_empty() && line != NO_RESPONSE {
            value.push(line);
        }
    }
    if let Some(key) = current {
        fields.insert(key, value.join("\n").trim().to_string());
    }
    fields
}

/// A single place proposal parsed from issue text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub place_name: String,
    pub city: String,
    /// Carried verbatim; used as a directory segment downstream.
    pub category: String,
    pub description: String,
    pub address: Option<String>,
    pub website: Option<String>,
}

impl Submission {
    /// Build a submission from parsed fields, reporting missing required
    /// field keys in form order.
    pub fn from_form(fields: &BTreeMap<&'static str, String>) -> Result<Self, Vec<&'static str>> {
        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|key| fields.get(*key).is_none_or(String::is_empty))
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }
        let required = |key: &str| fields.get(key).cloned().unwrap_or_default();
        let optional = |key: &str| fields.get(key).cloned().filter(|value| !value.is_empty());
        Ok(Self {
            place_name: required("place_name"),
            city: required("city"),
            category: required("category"),
            description: required("description"),
            address: optional("address"),
            website: optional("website"),
        })
    }

    /// Parse an issue body directly into a submission.
    pub fn parse(body: &str) -> Result<Self, Vec<&'static str>> {
        Self::from_form(&parse_form(body))
    }
}
