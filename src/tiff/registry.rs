//! EXIF tag definitions and lookups
//!
//! The registry maps a `(profile, tag)` pair to the tag's name, description,
//! the kind of value it decodes to and, for enum tags, the display labels of
//! its values. A built-in table is compiled from `exif_tags.toml`; callers
//! may load their own from a file with the same layout.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use lazy_static::lazy_static;
use log::{debug, error, warn};

use crate::errors::{DecodeError, DecodeResult};
use crate::io::StringEncoding;
use crate::tiff::types::MetadataProfile;

lazy_static! {
    // Parsed once, on first use
    static ref BUILTIN_REGISTRY: TagRegistry = {
        let content = include_str!("../../exif_tags.toml");
        TagRegistry::from_str(content).unwrap_or_else(|e| {
            error!("Failed to parse built-in tag definitions: {}", e);
            TagRegistry::default()
        })
    };
}

/// How a tag's wire value is turned into a `TagValue`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Rational,
    URational,
    Float,
    Double,
    String(StringEncoding),
    /// Text behind the 8-byte character code header
    Comment,
    Date,
    DateTime,
    Enum,
}

impl TagKind {
    /// Parses a kind name as written in a definition file
    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name.trim().to_ascii_lowercase().as_str() {
            "byte" => TagKind::Byte,
            "short" => TagKind::Short,
            "ushort" => TagKind::UShort,
            "int" => TagKind::Int,
            "uint" => TagKind::UInt,
            "rational" => TagKind::Rational,
            "urational" => TagKind::URational,
            "float" => TagKind::Float,
            "double" => TagKind::Double,
            "string" | "string:ascii" => TagKind::String(StringEncoding::Ascii),
            "string:utf8" => TagKind::String(StringEncoding::Utf8),
            "string:utf16le" => TagKind::String(StringEncoding::Utf16Le),
            "string:utf16be" => TagKind::String(StringEncoding::Utf16Be),
            "string:undefined" => TagKind::String(StringEncoding::Undefined),
            "comment" => TagKind::Comment,
            "date" => TagKind::Date,
            "datetime" => TagKind::DateTime,
            "enum" => TagKind::Enum,
            _ => return None,
        };
        Some(kind)
    }
}

/// Definition of a single tag
#[derive(Debug, Clone, PartialEq)]
pub struct TagDefinition {
    pub name: String,
    pub description: String,
    pub kind: TagKind,
    /// Display labels for enum values
    pub values: HashMap<u16, String>,
}

/// Read-only table of tag definitions, shareable across threads
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    definitions: HashMap<(MetadataProfile, u16), TagDefinition>,
}

impl TagRegistry {
    /// The registry compiled into the crate
    pub fn builtin() -> &'static TagRegistry {
        &BUILTIN_REGISTRY
    }

    /// Load definitions from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DecodeResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        debug!("Loading tag definitions from {}", path.as_ref().display());
        contents.parse()
    }

    /// Adds or replaces a definition
    pub fn define(&mut self, profile: MetadataProfile, tag: u16, definition: TagDefinition) {
        self.definitions.insert((profile, tag), definition);
    }

    pub fn lookup(&self, profile: MetadataProfile, tag: u16) -> Option<&TagDefinition> {
        self.definitions.get(&(profile, tag))
    }

    /// Tag name, or `Unknown-0x....` for unregistered tags
    pub fn tag_name(&self, profile: MetadataProfile, tag: u16) -> String {
        self.lookup(profile, tag)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| format!("Unknown-{:#06x}", tag))
    }

    /// Display label of an enum value, if the tag defines one
    pub fn enum_label(&self, profile: MetadataProfile, tag: u16, value: u16) -> Option<&str> {
        self.lookup(profile, tag)
            .and_then(|def| def.values.get(&value))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn parse_profile_table(&mut self, profile: MetadataProfile, table: &toml::value::Table) -> DecodeResult<()> {
        for (key, entry) in table {
            let tag = parse_tag_id(key).ok_or_else(|| {
                DecodeError::Registry(format!("Invalid tag id '{}' in [{}]", key, profile.table_name()))
            })?;

            let entry = entry.as_table().ok_or_else(|| {
                DecodeError::Registry(format!("Tag {} in [{}] is not a table", key, profile.table_name()))
            })?;

            let name = entry.get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| DecodeError::Registry(format!("Tag {} has no name", key)))?;

            let kind_name = entry.get("kind")
                .and_then(|v| v.as_str())
                .ok_or_else(|| DecodeError::Registry(format!("Tag {} has no kind", key)))?;
            let kind = TagKind::parse(kind_name).ok_or_else(|| {
                DecodeError::Registry(format!("Tag {} has unknown kind '{}'", key, kind_name))
            })?;

            let description = entry.get("description")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            let mut values = HashMap::new();
            if let Some(labels) = entry.get("values").and_then(|v| v.as_table()) {
                for (k, v) in labels {
                    match (k.parse::<u16>(), v.as_str()) {
                        (Ok(value), Some(label)) => {
                            values.insert(value, label.to_string());
                        }
                        _ => warn!("Ignoring value label '{}' of tag {}", k, name),
                    }
                }
            }

            self.define(profile, tag, TagDefinition {
                name: name.to_string(),
                description,
                kind,
                values,
            });
        }

        Ok(())
    }
}

impl FromStr for TagRegistry {
    type Err = DecodeError;

    /// Parse definitions from a TOML string
    fn from_str(content: &str) -> DecodeResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| DecodeError::Registry(format!("Failed to parse TOML: {}", e)))?;

        let mut registry = TagRegistry::default();

        for profile in MetadataProfile::ALL {
            if let Some(table) = toml_value.get(profile.table_name()).and_then(|v| v.as_table()) {
                registry.parse_profile_table(profile, table)?;
            }
        }

        debug!("Parsed {} tag definitions", registry.len());
        Ok(registry)
    }
}

fn parse_tag_id(key: &str) -> Option<u16> {
    match key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => key.parse().ok(),
    }
}
