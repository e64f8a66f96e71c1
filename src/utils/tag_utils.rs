//! Tag display utilities
//!
//! Turns materialized tags into the rows shown by the CLI, resolving names
//! and enum labels through a registry.

use serde::Serialize;

use crate::tiff::collection::{TagCollection, TagEntry};
use crate::tiff::registry::TagRegistry;
use crate::tiff::types::{MetadataProfile, TagValue};

/// Longest rendered value before it is shortened
const MAX_DISPLAY_LEN: usize = 120;

/// One tag as presented to a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRow {
    pub profile: MetadataProfile,
    pub tag: u16,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub value: String,
}

/// Renders a value, using the registry label for enum tags
///
/// # Arguments
/// * `registry` - Registry holding the tag's definition
/// * `entry` - The materialized tag
///
/// # Returns
/// The label as "label (code)" for known enum values, the plain value otherwise
pub fn describe_value(registry: &TagRegistry, entry: &TagEntry) -> String {
    match entry.value {
        TagValue::Enum(code) => match registry.enum_label(entry.profile, entry.tag, code) {
            Some(label) => format!("{} ({})", label, code),
            None => code.to_string(),
        },
        ref value => value.to_string(),
    }
}

/// Shortens long renderings such as maker notes on a char boundary
pub fn truncate_for_display(text: &str) -> String {
    match text.char_indices().nth(MAX_DISPLAY_LEN) {
        Some((end, _)) => format!("{}... ({} bytes)", &text[..end], text.len()),
        None => text.to_string(),
    }
}

/// Rows for every tag of a collection, in collection order
pub fn tag_rows(registry: &TagRegistry, tags: &TagCollection) -> Vec<TagRow> {
    tags.iter()
        .map(|entry| TagRow {
            profile: entry.profile,
            tag: entry.tag,
            name: registry.tag_name(entry.profile, entry.tag),
            type_name: entry.value.type_name(),
            value: describe_value(registry, entry),
        })
        .collect()
}
