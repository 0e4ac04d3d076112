//! Place-record rendering and filesystem naming rules.
//!
//! Path segments are derived deterministically from user text so that
//! reprocessing the same submission always lands on the same file.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension for every generated document.
pub const DOC_EXT: &str = "md";

/// Stem used when a place name sanitizes to nothing.
const FALLBACK_STEM: &str = "unnamed";

/// Keep word characters, whitespace, and hyphens; drop the rest.
fn strip_special(name: &str) -> String {
    let specials = Regex::new(r"[^\w\s-]").unwrap();
    specials.replace_all(name.trim(), "").into_owned()
}

/// Collapse whitespace/hyphen runs into single underscores.
fn collapse_separators(name: &str) -> String {
    let runs = Regex::new(r"[\s-]+").unwrap();
    runs.replace_all(name, "_").into_owned()
}

/// Capitalize one word: first character uppercased, the rest lowercased.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Sanitize a country or city name into a directory segment.
///
/// The result is empty only if the input is empty after stripping; callers
/// pass names that already survived validation.
pub fn sanitize_dirname(name: &str) -> String {
    collapse_separators(&strip_special(name))
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("_")
}

/// Sanitize a place name into a filename stem: restricted charset, separator
/// runs collapsed to underscores, lowercased, outer underscores trimmed.
/// Idempotent on its own output; an empty result falls back to a fixed stem.
pub fn sanitize_filename(name: &str) -> String {
    let collapsed = collapse_separators(&strip_special(name)).to_lowercase();
    let stem = collapsed.trim_matches('_');
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// A fully resolved place ready to be written into the tree.
#[derive(Debug, Clone)]
pub struct Place {
    pub country: String,
    pub city: String,
    /// Used verbatim as a directory segment.
    pub category: String,
    pub place_name: String,
    pub description: String,
    pub address: Option<String>,
    pub website: Option<String>,
    pub issue_number: u64,
}

/// Canonical path for a place record under the tree root.
pub fn place_path(root: &Path, place: &Place) -> PathBuf {
    root.join(sanitize_dirname(&place.country))
        .join(sanitize_dirname(&place.city))
        .join(&place.category)
        .join(format!(
            "{}.{DOC_EXT}",
            sanitize_filename(&place.place_name)
        ))
}

/// Render the Markdown body for a place record.
///
/// Fixed block order: title, description, optional address, optional website,
/// separator, attribution back to the source issue.
pub fn render_place(place: &Place) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# {}\n\n{}\n\n",
        place.place_name, place.description
    ));
    if let Some(address) = &place.address {
        out.push_str(&format!("**📍 Address:** {address}\n\n"));
    }
    if let Some(website) = &place.website {
        out.push_str(&format!("**🔗 Website:** [{website}]({website})\n\n"));
    }
    out.push_str(&format!(
        "---\n\n> Added via [Issue #{number}](../../../../../../issues/{number})\n",
        number = place.issue_number
    ));
    out
}

/// Write (or overwrite) the place record, creating missing directories.
/// Identical inputs produce byte-identical files.
pub fn write_place(root: &Path, place: &Place) -> Result<PathBuf> {
    let path = place_path(root, place);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&path, render_place(place)).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote place record");
    Ok(path)
}
