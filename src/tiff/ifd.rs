//! Image File Directory entry structures
//!
//! A directory is an entry count, that many 12-byte entries and a 4-byte
//! offset to the next directory. Entries are parsed from their raw bytes and
//! only live as long as the scan of the directory that holds them.

use std::fmt;

use log::trace;

use crate::errors::DecodeResult;
use crate::io::{codec, ByteOrder};
use crate::tiff::constants::{layout, pointer_tags};
use crate::tiff::types::{component_size_of, MetadataProfile, WireType};

/// One 12-byte directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Tag identifier
    pub tag: u16,
    /// Raw field type code
    pub wire_type: u16,
    /// Number of components
    pub component_count: u32,
    /// Inline value or offset to the value, still in file byte order
    pub value_slot: [u8; 4],
}

impl DirectoryEntry {
    /// Parses an entry from its 12 raw bytes
    pub fn parse(bytes: &[u8; 12], order: ByteOrder) -> DecodeResult<Self> {
        let entry = DirectoryEntry {
            tag: codec::read_u16(bytes, 0, order)?,
            wire_type: codec::read_u16(bytes, 2, order)?,
            component_count: codec::read_u32(bytes, 4, order)?,
            value_slot: [bytes[8], bytes[9], bytes[10], bytes[11]],
        };

        trace!("Parsed directory entry: {}", entry);
        Ok(entry)
    }

    /// The recognized wire type, if any
    pub fn wire_type(&self) -> Option<WireType> {
        WireType::from_raw(self.wire_type)
    }

    /// Total payload size in bytes, `None` for unknown types or overflow
    pub fn byte_len(&self) -> Option<u64> {
        component_size_of(self.wire_type)
            .and_then(|size| (size as u64).checked_mul(self.component_count as u64))
    }

    /// The value slot read as a 32-bit offset or value
    pub fn slot_u32(&self, order: ByteOrder) -> u32 {
        match order {
            ByteOrder::LittleEndian => u32::from_le_bytes(self.value_slot),
            ByteOrder::BigEndian => u32::from_be_bytes(self.value_slot),
        }
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = self.wire_type().map_or("Unknown", WireType::name);
        write!(f, "tag={:#06x}, type={} ({}), count={}, slot={:02x?}",
               self.tag, self.wire_type, type_name, self.component_count, self.value_slot)
    }
}

/// A byte range relative to the TIFF header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub offset: u32,
    pub length: u32,
}

/// Sub-structures announced by pointer tags, awaiting a later pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IfdPointers {
    pub exif: Option<u32>,
    pub gps: Option<u32>,
    pub interoperability: Option<u32>,
    pub iptc: Option<BlockRef>,
    pub xmp: Option<BlockRef>,
}

impl IfdPointers {
    /// Records `entry` if it is a pointer tag
    ///
    /// Returns `false` for ordinary tags. The first pointer of each kind is
    /// kept; later duplicates are ignored.
    pub fn record(&mut self, entry: &DirectoryEntry, order: ByteOrder) -> bool {
        let slot = entry.slot_u32(order);
        match entry.tag {
            pointer_tags::EXIF_IFD => {
                self.exif.get_or_insert(slot);
            }
            pointer_tags::GPS_IFD => {
                self.gps.get_or_insert(slot);
            }
            pointer_tags::INTEROPERABILITY_IFD => {
                self.interoperability.get_or_insert(slot);
            }
            pointer_tags::IPTC => {
                if let Some(block) = Self::block(entry, slot) {
                    self.iptc.get_or_insert(block);
                }
            }
            pointer_tags::XMP => {
                if let Some(block) = Self::block(entry, slot) {
                    self.xmp.get_or_insert(block);
                }
            }
            _ => return false,
        }
        true
    }

    /// Removes and returns the pending sub-IFD offset for `profile`
    ///
    /// The primary chain belongs to the Exif profile too; its Exif sub-IFD
    /// is the pending offset returned here.
    pub fn take_chain(&mut self, profile: MetadataProfile) -> Option<u32> {
        match profile {
            MetadataProfile::Exif => self.exif.take(),
            MetadataProfile::Gps => self.gps.take(),
            MetadataProfile::Interoperability => self.interoperability.take(),
        }
    }

    fn block(entry: &DirectoryEntry, slot: u32) -> Option<BlockRef> {
        let length = entry.byte_len()?;
        if length as usize <= layout::INLINE_VALUE_SIZE {
            trace!("Ignoring inline embedded block for tag {:#06x}", entry.tag);
            return None;
        }
        Some(BlockRef { offset: slot, length: u32::try_from(length).ok()? })
    }
}
