//! Insertion-ordered tag storage keyed by profile and tag

use std::collections::HashMap;

use log::trace;
use serde::{Serialize, Serializer};

use crate::tiff::types::{MetadataProfile, TagValue};

/// One materialized tag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagEntry {
    pub profile: MetadataProfile,
    pub tag: u16,
    pub value: TagValue,
}

/// Materialized tags of one decode session
///
/// Iteration follows insertion order. The first value stored for a
/// `(profile, tag)` pair wins; later ones are discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagCollection {
    entries: Vec<TagEntry>,
    index: HashMap<(MetadataProfile, u16), usize>,
}

impl TagCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value unless the pair is already present
    ///
    /// Returns whether the value was stored.
    pub fn insert(&mut self, profile: MetadataProfile, tag: u16, value: TagValue) -> bool {
        if self.index.contains_key(&(profile, tag)) {
            trace!("Discarding duplicate {} tag {:#06x}", profile, tag);
            return false;
        }

        self.index.insert((profile, tag), self.entries.len());
        self.entries.push(TagEntry { profile, tag, value });
        true
    }

    pub fn contains(&self, profile: MetadataProfile, tag: u16) -> bool {
        self.index.contains_key(&(profile, tag))
    }

    pub fn get(&self, profile: MetadataProfile, tag: u16) -> Option<&TagValue> {
        self.index.get(&(profile, tag)).map(|&i| &self.entries[i].value)
    }

    /// Tags of one profile, in insertion order
    pub fn get_by_profile(&self, profile: MetadataProfile) -> impl Iterator<Item = &TagEntry> {
        self.entries.iter().filter(move |entry| entry.profile == profile)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves every entry of `other` in, keeping existing values on conflict
    pub fn merge(&mut self, other: TagCollection) {
        for entry in other.entries {
            self.insert(entry.profile, entry.tag, entry.value);
        }
    }
}

impl Serialize for TagCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let mut tags = TagCollection::new();

        assert!(tags.insert(MetadataProfile::Exif, 0x0112, TagValue::Enum(6)));
        assert!(!tags.insert(MetadataProfile::Exif, 0x0112, TagValue::Enum(1)));

        assert_eq!(tags.get(MetadataProfile::Exif, 0x0112), Some(&TagValue::Enum(6)));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_profiles_do_not_collide() {
        let mut tags = TagCollection::new();
        tags.insert(MetadataProfile::Gps, 0x0001, TagValue::String("N".to_string()));
        tags.insert(MetadataProfile::Interoperability, 0x0001, TagValue::String("R98".to_string()));

        assert_eq!(tags.get(MetadataProfile::Gps, 0x0001).and_then(TagValue::as_str), Some("N"));
        assert_eq!(tags.get(MetadataProfile::Interoperability, 0x0001).and_then(TagValue::as_str), Some("R98"));
        assert!(tags.get(MetadataProfile::Exif, 0x0001).is_none());
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut tags = TagCollection::new();
        tags.insert(MetadataProfile::Exif, 0x0110, TagValue::String("b".to_string()));
        tags.insert(MetadataProfile::Gps, 0x0002, TagValue::UInt(vec![1]));
        tags.insert(MetadataProfile::Exif, 0x010F, TagValue::String("a".to_string()));

        let order: Vec<u16> = tags.iter().map(|e| e.tag).collect();
        assert_eq!(order, vec![0x0110, 0x0002, 0x010F]);

        let exif: Vec<u16> = tags.get_by_profile(MetadataProfile::Exif).map(|e| e.tag).collect();
        assert_eq!(exif, vec![0x0110, 0x010F]);
    }

    #[test]
    fn test_merge_keeps_existing_values() {
        let mut first = TagCollection::new();
        first.insert(MetadataProfile::Exif, 0x011A, TagValue::UInt(vec![72]));

        let mut second = TagCollection::new();
        second.insert(MetadataProfile::Exif, 0x011A, TagValue::UInt(vec![300]));
        second.insert(MetadataProfile::Exif, 0x011B, TagValue::UInt(vec![300]));

        first.merge(second);
        assert_eq!(first.get(MetadataProfile::Exif, 0x011A), Some(&TagValue::UInt(vec![72])));
        assert_eq!(first.len(), 2);
    }
}
