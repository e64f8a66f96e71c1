//! TIFF directory graph decoder
//!
//! Walks the primary IFD chain of an embedded TIFF structure, then the Exif,
//! GPS and Interoperability sub-chains it points to, materializing every
//! registered tag into a `TagCollection`. Offsets inside the structure are
//! relative to the TIFF header (`segment_start`).
//!
//! Structural damage inside a chain is recovered locally: the chain stops
//! and whatever was already parsed is kept. Only a broken header is fatal.

use std::cmp;
use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::errors::{DecodeError, DecodeResult};
use crate::io::seekable::{read_array, read_bytes_at, seek_checked, SeekableReader};
use crate::io::{codec, ByteOrder};
use crate::tiff::collection::TagCollection;
use crate::tiff::constants::{header, layout};
use crate::tiff::ifd::{BlockRef, DirectoryEntry, IfdPointers};
use crate::tiff::materializer::TagValueMaterializer;
use crate::tiff::registry::TagRegistry;
use crate::tiff::types::MetadataProfile;

/// The 8-byte TIFF header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    pub byte_order: ByteOrder,
    /// Offset of the first IFD, relative to the header
    pub first_ifd_offset: u32,
}

/// Everything decoded from one TIFF structure
#[derive(Debug, Clone)]
pub struct TiffSegment {
    pub byte_order: ByteOrder,
    pub tags: TagCollection,
    /// Raw IPTC records referenced by the NAA tag
    pub iptc: Option<Vec<u8>>,
    /// Raw XMP packet referenced by the XMP tag
    pub xmp: Option<Vec<u8>>,
    /// Number of distinct directory offsets visited
    pub directories: usize,
}

/// Whether the `Exif\0\0` signature starts at `offset`
///
/// Leaves the cursor just after the signature when it matches.
pub fn check_exif_signature(reader: &mut dyn SeekableReader, offset: u64, stream_len: u64) -> DecodeResult<bool> {
    let len = header::EXIF_SIGNATURE.len();
    if offset.saturating_add(len as u64) > stream_len {
        return Ok(false);
    }
    let bytes = read_bytes_at(reader, offset, len, stream_len)?;
    Ok(bytes.as_slice() == header::EXIF_SIGNATURE)
}

/// Reads and validates the TIFF header at `segment_start`
pub fn read_header(reader: &mut dyn SeekableReader, segment_start: u64, stream_len: u64) -> DecodeResult<TiffHeader> {
    let bytes = read_bytes_at(reader, segment_start, header::TIFF_HEADER_SIZE, stream_len)?;

    let byte_order = ByteOrder::detect(&bytes[0..2])?;
    let version = codec::read_u16(&bytes, 2, byte_order)?;
    if version != header::TIFF_VERSION {
        return Err(DecodeError::InvalidFormat(format!(
            "TIFF signature is {} instead of {}", version, header::TIFF_VERSION
        )));
    }

    let first_ifd_offset = codec::read_u32(&bytes, 4, byte_order)?;
    debug!("TIFF header at {}: {}, first IFD at +{}", segment_start, byte_order.name(), first_ifd_offset);

    Ok(TiffHeader { byte_order, first_ifd_offset })
}

/// Decoder for the IFD graph of one TIFF structure
///
/// Holds no per-decode state, so one decoder can serve many decodes.
#[derive(Debug, Clone, Copy)]
pub struct TiffDirectoryDecoder<'a> {
    registry: &'a TagRegistry,
    max_ifd_hops: usize,
}

impl<'a> TiffDirectoryDecoder<'a> {
    pub fn new(registry: &'a TagRegistry) -> Self {
        TiffDirectoryDecoder { registry, max_ifd_hops: layout::DEFAULT_MAX_IFD_HOPS }
    }

    /// Bounds the number of directories followed in each chain
    pub fn with_max_ifd_hops(mut self, max_ifd_hops: usize) -> Self {
        self.max_ifd_hops = max_ifd_hops;
        self
    }

    /// Decodes the TIFF structure whose header starts at `segment_start`
    ///
    /// Fails only if the header is unreadable or invalid.
    pub fn decode(&self, reader: &mut dyn SeekableReader, segment_start: u64, stream_len: u64) -> DecodeResult<TiffSegment> {
        let header = read_header(reader, segment_start, stream_len)?;

        let mut session = Session {
            decoder: self,
            segment_start,
            stream_len,
            byte_order: header.byte_order,
            tags: TagCollection::new(),
            pointers: IfdPointers::default(),
            visited: HashSet::new(),
        };

        session.walk_chain(reader, MetadataProfile::Exif, header.first_ifd_offset);

        for profile in MetadataProfile::ALL {
            if let Some(offset) = session.pointers.take_chain(profile) {
                debug!("Following {} IFD pointer to +{}", profile, offset);
                session.walk_chain(reader, profile, offset);
            }
        }

        let iptc = session.pointers.iptc.and_then(|block| session.read_block(reader, "IPTC", block));
        let xmp = session.pointers.xmp.and_then(|block| session.read_block(reader, "XMP", block));

        debug!("Decoded {} tags from {} directories", session.tags.len(), session.visited.len());

        Ok(TiffSegment {
            byte_order: header.byte_order,
            directories: session.visited.len(),
            tags: session.tags,
            iptc,
            xmp,
        })
    }
}

/// State of one decode
struct Session<'d, 'a> {
    decoder: &'d TiffDirectoryDecoder<'a>,
    segment_start: u64,
    stream_len: u64,
    byte_order: ByteOrder,
    tags: TagCollection,
    pointers: IfdPointers,
    /// Absolute offsets of every directory read so far, across all chains
    visited: HashSet<u64>,
}

impl Session<'_, '_> {
    fn walk_chain(&mut self, reader: &mut dyn SeekableReader, profile: MetadataProfile, first_offset: u32) {
        let mut offset = first_offset;
        let mut hops = 0;

        while offset != 0 {
            if hops >= self.decoder.max_ifd_hops {
                warn!("{} chain exceeds {} directories, stopping", profile, self.decoder.max_ifd_hops);
                break;
            }

            let absolute = self.segment_start + offset as u64;
            if !self.visited.insert(absolute) {
                warn!("{} chain revisits directory at {}, stopping", profile, absolute);
                break;
            }
            hops += 1;

            match self.read_directory(reader, profile, absolute) {
                Ok(Some(next)) => offset = next,
                Ok(None) => break,
                Err(e) => {
                    warn!("Stopping {} chain at directory {}: {}", profile, absolute, e);
                    break;
                }
            }
        }
    }

    /// Reads one directory, returning the next offset
    ///
    /// `Ok(None)` means the directory was truncated; its in-bounds entries
    /// have been kept.
    fn read_directory(&mut self, reader: &mut dyn SeekableReader, profile: MetadataProfile, absolute: u64) -> DecodeResult<Option<u32>> {
        seek_checked(reader, absolute, layout::ENTRY_COUNT_SIZE, self.stream_len)?;
        let count = self.byte_order.read_u16(reader)? as u64;

        let entries_start = absolute + layout::ENTRY_COUNT_SIZE;
        let available = self.stream_len.saturating_sub(entries_start);
        let readable = cmp::min(count, available / layout::ENTRY_SIZE);
        trace!("{} directory at {}: {} entries declared, {} readable", profile, absolute, count, readable);

        for index in 0..readable {
            let raw: [u8; 12] = read_array(reader, self.stream_len)?;
            let entry = DirectoryEntry::parse(&raw, self.byte_order)?;
            match self.process_entry(reader, profile, entry) {
                Ok(()) => {}
                // The materializer restores the cursor, so later entries stay readable
                Err(e) if e.is_bounds_error() => {
                    warn!("Skipping {} tag {:#06x} (entry {} of directory at {}): {}", profile, entry.tag, index, absolute, e);
                }
                Err(e) => return Err(e),
            }
        }

        if readable < count || available < count * layout::ENTRY_SIZE + layout::NEXT_OFFSET_SIZE {
            warn!("{} directory at {} is truncated, keeping {} of {} entries", profile, absolute, readable, count);
            return Ok(None);
        }

        Ok(Some(self.byte_order.read_u32(reader)?))
    }

    fn process_entry(&mut self, reader: &mut dyn SeekableReader, profile: MetadataProfile, entry: DirectoryEntry) -> DecodeResult<()> {
        if self.pointers.record(&entry, self.byte_order) {
            trace!("Recorded pointer tag {:#06x}", entry.tag);
            return Ok(());
        }

        if self.tags.contains(profile, entry.tag) {
            trace!("Skipping duplicate {} tag {:#06x}", profile, entry.tag);
            return Ok(());
        }

        let definition = match self.decoder.registry.lookup(profile, entry.tag) {
            Some(definition) => definition,
            None => {
                trace!("Skipping unregistered {} tag {:#06x}", profile, entry.tag);
                return Ok(());
            }
        };

        if entry.wire_type().is_none() {
            debug!("Skipping {} with unknown wire type {}", definition.name, entry.wire_type);
            return Ok(());
        }

        let materializer = TagValueMaterializer::new(entry, self.segment_start, self.byte_order);
        if let Some(value) = materializer.materialize(reader, self.stream_len, definition.kind)? {
            trace!("{} = {}", definition.name, value);
            self.tags.insert(profile, entry.tag, value);
        }

        Ok(())
    }

    fn read_block(&self, reader: &mut dyn SeekableReader, label: &str, block: BlockRef) -> Option<Vec<u8>> {
        let offset = self.segment_start + block.offset as u64;
        match read_bytes_at(reader, offset, block.length as usize, self.stream_len) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Ignoring {} block: {}", label, e);
                None
            }
        }
    }
}
