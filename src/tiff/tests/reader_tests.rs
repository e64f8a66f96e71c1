//! Tests for the TIFF directory decoder

extern crate std;

use std::io::{Seek, SeekFrom};

use assert_matches::assert_matches;

use super::test_utils::{CountingReader, TestEntry, TiffWriter};
use crate::errors::DecodeError;
use crate::io::seekable::stream_len;
use crate::io::ByteOrder;
use crate::tiff::constants::{field_types, pointer_tags, tags};
use crate::tiff::ifd::DirectoryEntry;
use crate::tiff::materializer::TagValueMaterializer;
use crate::tiff::reader::{check_exif_signature, read_header, TiffDirectoryDecoder, TiffSegment};
use crate::tiff::registry::{TagKind, TagRegistry};
use crate::tiff::resolution::{RawResolution, DEFAULT_DPI};
use crate::tiff::types::{MetadataProfile, TagValue, URational};

const MAKE: u16 = 0x010F;
const ORIENTATION: u16 = 0x0112;
const DATE_TIME_ORIGINAL: u16 = 0x9003;
const EXIF_VERSION: u16 = 0x9000;
const GPS_LATITUDE_REF: u16 = 0x0001;
const GPS_DATE_STAMP: u16 = 0x001D;
const INTEROP_INDEX: u16 = 0x0001;

fn decode(bytes: Vec<u8>) -> TiffSegment {
    decode_at(bytes, 0)
}

fn decode_at(bytes: Vec<u8>, segment_start: u64) -> TiffSegment {
    let len = bytes.len() as u64;
    let mut cursor = std::io::Cursor::new(bytes);
    TiffDirectoryDecoder::new(TagRegistry::builtin())
        .decode(&mut cursor, segment_start, len)
        .unwrap()
}

/// IFD0 with resolution tags and pointers to Exif and GPS directories,
/// the Exif directory pointing on to an Interoperability directory
fn camera_exif(order: ByteOrder) -> Vec<u8> {
    let mut w = TiffWriter::new(order, 8);

    let make = w.ascii(MAKE, "Canon", 200);
    let x_res = w.rational(tags::X_RESOLUTION, 72, 1, 208);
    let y_res = w.rational(tags::Y_RESOLUTION, 72, 1, 216);
    let unit = w.short(tags::RESOLUTION_UNIT, 2);
    let exif = w.long(pointer_tags::EXIF_IFD, 100);
    let gps = w.long(pointer_tags::GPS_IFD, 300);
    w.directory(8, &[make, x_res, y_res, unit, exif, gps], 0);

    let original = w.ascii(DATE_TIME_ORIGINAL, "2024:05:01 10:20:30", 400);
    let version = w.raw(EXIF_VERSION, field_types::UNDEFINED, 4, 0);
    let version = TestEntry { slot: *b"0232", ..version };
    let interop = w.long(pointer_tags::INTEROPERABILITY_IFD, 500);
    w.directory(100, &[original, version, interop], 0);

    let lat_ref = w.short_ascii(GPS_LATITUDE_REF, b"N\0");
    let stamp = w.ascii(GPS_DATE_STAMP, "2024:05:01", 420);
    w.directory(300, &[lat_ref, stamp], 0);

    let index = w.short_ascii(INTEROP_INDEX, b"R98\0");
    w.directory(500, &[index], 0);

    w.finish()
}

#[test]
fn test_decodes_all_profiles() {
    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let segment = decode(camera_exif(order));
        let tags = &segment.tags;

        std::assert_eq!(segment.byte_order, order);
        std::assert_eq!(segment.directories, 4);
        std::assert_eq!(tags.get(MetadataProfile::Exif, MAKE).and_then(TagValue::as_str), Some("Canon"));
        std::assert_eq!(tags.get(MetadataProfile::Exif, EXIF_VERSION).and_then(TagValue::as_str), Some("0232"));
        assert_matches!(tags.get(MetadataProfile::Exif, DATE_TIME_ORIGINAL), Some(TagValue::DateTime(_)));
        std::assert_eq!(tags.get(MetadataProfile::Gps, GPS_LATITUDE_REF).and_then(TagValue::as_str), Some("N"));
        assert_matches!(tags.get(MetadataProfile::Gps, GPS_DATE_STAMP), Some(TagValue::Date(_)));
        std::assert_eq!(tags.get(MetadataProfile::Interoperability, INTEROP_INDEX).and_then(TagValue::as_str), Some("R98"));
    }
}

#[test]
fn test_pointer_tags_are_not_collected() {
    let segment = decode(camera_exif(ByteOrder::LittleEndian));

    std::assert!(!segment.tags.contains(MetadataProfile::Exif, pointer_tags::EXIF_IFD));
    std::assert!(!segment.tags.contains(MetadataProfile::Exif, pointer_tags::GPS_IFD));
    std::assert!(!segment.tags.contains(MetadataProfile::Exif, pointer_tags::INTEROPERABILITY_IFD));
}

#[test]
fn test_big_endian_resolution_72_inches() {
    let segment = decode(camera_exif(ByteOrder::BigEndian));
    let resolution = RawResolution::from_exif(&segment.tags);

    std::assert_eq!(resolution.to_dpi(DEFAULT_DPI), (72, 72));
}

#[test]
fn test_zero_denominator_resolution_is_absent() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let x_res = w.rational(tags::X_RESOLUTION, 300, 0, 100);
    let y_res = w.rational(tags::Y_RESOLUTION, 300, 1, 108);
    let unit = w.short(tags::RESOLUTION_UNIT, 2);
    w.directory(8, &[x_res, y_res, unit], 0);

    let segment = decode(w.finish());

    // The exact pair is kept
    std::assert_eq!(
        segment.tags.get(MetadataProfile::Exif, tags::X_RESOLUTION),
        Some(&TagValue::URational(vec![URational::new(300, 0)]))
    );
    let resolution = RawResolution::from_exif(&segment.tags);
    std::assert_eq!(resolution.to_dpi(DEFAULT_DPI), (DEFAULT_DPI, 300));
}

#[test]
fn test_unknown_wire_type_is_skipped() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let bogus = w.raw(MAKE, 13, 1, 0);
    let orientation = w.short(ORIENTATION, 6);
    w.directory(8, &[bogus, orientation], 0);

    let segment = decode(w.finish());

    std::assert!(!segment.tags.contains(MetadataProfile::Exif, MAKE));
    std::assert_eq!(segment.tags.get(MetadataProfile::Exif, ORIENTATION), Some(&TagValue::Enum(6)));
}

#[test]
fn test_truncated_directory_keeps_complete_entries() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let orientation = w.short(ORIENTATION, 3);
    let unit = w.short(tags::RESOLUTION_UNIT, 3);
    w.directory(8, &[orientation, unit], 0);
    let declared = w.u16_bytes(5);
    w.put(8, &declared);

    // Header, count and two entries; the rest is gone
    let mut bytes = w.finish();
    bytes.truncate(8 + 2 + 24 + 5);

    let segment = decode(bytes);
    std::assert_eq!(segment.tags.len(), 2);
    std::assert_eq!(segment.tags.get(MetadataProfile::Exif, tags::RESOLUTION_UNIT), Some(&TagValue::Enum(3)));
}

#[test]
fn test_missing_next_offset_stops_chain() {
    let mut w = TiffWriter::new(ByteOrder::BigEndian, 8);
    let orientation = w.short(ORIENTATION, 8);
    w.directory(8, &[orientation], 0);

    let mut bytes = w.finish();
    bytes.truncate(8 + 2 + 12 + 2);

    let segment = decode(bytes);
    std::assert_eq!(segment.tags.get(MetadataProfile::Exif, ORIENTATION), Some(&TagValue::Enum(8)));
}

#[test]
fn test_first_ifd_past_end_yields_no_tags() {
    let w = TiffWriter::new(ByteOrder::LittleEndian, 4000);
    let segment = decode(w.finish());

    std::assert!(segment.tags.is_empty());
    std::assert_eq!(segment.directories, 1);
}

#[test]
fn test_out_of_bounds_value_skips_only_that_entry() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let orientation = w.short(ORIENTATION, 1);
    let make = w.raw(MAKE, field_types::ASCII, 32, 10_000);
    let unit = w.short(tags::RESOLUTION_UNIT, 2);
    let exif = w.long(pointer_tags::EXIF_IFD, 100);
    w.directory(8, &[orientation, make, unit, exif], 0);

    let original = w.ascii(DATE_TIME_ORIGINAL, "2024:05:01 10:20:30", 200);
    w.directory(100, &[original], 0);

    let segment = decode(w.finish());

    std::assert!(segment.tags.contains(MetadataProfile::Exif, ORIENTATION));
    std::assert!(!segment.tags.contains(MetadataProfile::Exif, MAKE));
    std::assert!(segment.tags.contains(MetadataProfile::Exif, tags::RESOLUTION_UNIT));
    // The Exif pointer after the bad entry is still followed
    std::assert!(segment.tags.contains(MetadataProfile::Exif, DATE_TIME_ORIGINAL));
}

#[test]
fn test_cyclic_chain_terminates() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let orientation = w.short(ORIENTATION, 1);
    w.directory(8, &[orientation], 40);
    let unit = w.short(tags::RESOLUTION_UNIT, 2);
    w.directory(40, &[unit], 8);

    let segment = decode(w.finish());
    std::assert_eq!(segment.directories, 2);
    std::assert_eq!(segment.tags.len(), 2);
}

#[test]
fn test_self_referencing_sub_ifd_terminates() {
    let mut w = TiffWriter::new(ByteOrder::BigEndian, 8);
    let orientation = w.short(ORIENTATION, 1);
    let exif = w.long(pointer_tags::EXIF_IFD, 8);
    w.directory(8, &[orientation, exif], 0);

    let segment = decode(w.finish());
    std::assert_eq!(segment.directories, 1);
}

#[test]
fn test_hop_bound_limits_chain_length() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let offsets = [8u32, 40, 72, 104, 136];
    let tag_ids = [ORIENTATION, tags::RESOLUTION_UNIT, 0x0103, 0x0106, 0x011C];
    for (i, (&offset, &tag)) in offsets.iter().zip(tag_ids.iter()).enumerate() {
        let next = offsets.get(i + 1).copied().unwrap_or(0);
        let entry = w.short(tag, 1);
        w.directory(offset, &[entry], next);
    }
    let bytes = w.finish();
    let len = bytes.len() as u64;

    let mut cursor = std::io::Cursor::new(bytes.clone());
    let bounded = TiffDirectoryDecoder::new(TagRegistry::builtin())
        .with_max_ifd_hops(3)
        .decode(&mut cursor, 0, len)
        .unwrap();
    std::assert_eq!(bounded.directories, 3);
    std::assert_eq!(bounded.tags.len(), 3);

    let unbounded = decode(bytes);
    std::assert_eq!(unbounded.directories, 5);
}

#[test]
fn test_duplicate_tags_first_wins() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let first = w.short(ORIENTATION, 6);
    let second = w.short(ORIENTATION, 1);
    let x_res = w.rational(tags::X_RESOLUTION, 300, 1, 200);
    w.directory(8, &[first, second, x_res], 60);

    // Thumbnail directory repeats the resolution
    let thumb_res = w.rational(tags::X_RESOLUTION, 72, 1, 208);
    w.directory(60, &[thumb_res], 0);

    let segment = decode(w.finish());
    std::assert_eq!(segment.tags.get(MetadataProfile::Exif, ORIENTATION), Some(&TagValue::Enum(6)));
    std::assert_eq!(
        segment.tags.get(MetadataProfile::Exif, tags::X_RESOLUTION).and_then(TagValue::as_urational),
        Some(URational::new(300, 1))
    );
}

#[test]
fn test_rational_bytes_survive_decoding() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let x_res = w.rational(tags::X_RESOLUTION, 7, 3, 100);
    w.directory(8, &[x_res], 0);
    let bytes = w.finish();
    let original: [u8; 8] = bytes[100..108].try_into().unwrap();

    let segment = decode(bytes);
    let value = segment.tags.get(MetadataProfile::Exif, tags::X_RESOLUTION)
        .and_then(TagValue::as_urational)
        .unwrap();

    std::assert_eq!(value.to_bytes(ByteOrder::LittleEndian), original);
}

#[test]
fn test_decoding_is_idempotent() {
    let bytes = camera_exif(ByteOrder::LittleEndian);
    let first = decode(bytes.clone());
    let second = decode(bytes);

    std::assert_eq!(first.tags, second.tags);
    std::assert_eq!(first.directories, second.directories);
}

#[test]
fn test_offsets_are_relative_to_segment_start() {
    let mut w = TiffWriter::with_prefix(ByteOrder::BigEndian, 8, b"Exif\0\0");
    let make = w.ascii(MAKE, "Nikon", 64);
    w.directory(8, &[make], 0);
    let bytes = w.finish();

    let mut cursor = std::io::Cursor::new(bytes.clone());
    let len = bytes.len() as u64;
    std::assert!(check_exif_signature(&mut cursor, 0, len).unwrap());
    std::assert!(!check_exif_signature(&mut cursor, 1, len).unwrap());

    let segment = decode_at(bytes, 6);
    std::assert_eq!(segment.tags.get(MetadataProfile::Exif, MAKE).and_then(TagValue::as_str), Some("Nikon"));
}

#[test]
fn test_embedded_blocks_are_extracted() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let iptc = w.raw(pointer_tags::IPTC, field_types::LONG, 2, 100);
    let xmp = w.raw(pointer_tags::XMP, field_types::BYTE, 9, 120);
    w.directory(8, &[iptc, xmp], 0);
    w.put(100, &[0x1C, 0x02, 0x05, 0x00, 0x02, b'H', b'i', 0x00]);
    w.put(120, b"<x:xmpmeta");

    let segment = decode(w.finish());
    std::assert_eq!(segment.iptc.as_deref(), Some(&[0x1C, 0x02, 0x05, 0x00, 0x02, b'H', b'i', 0x00][..]));
    std::assert_eq!(segment.xmp.as_deref(), Some(&b"<x:xmpmet"[..]));
}

#[test]
fn test_out_of_bounds_block_is_ignored() {
    let mut w = TiffWriter::new(ByteOrder::LittleEndian, 8);
    let xmp = w.raw(pointer_tags::XMP, field_types::BYTE, 4096, 100);
    let orientation = w.short(ORIENTATION, 1);
    w.directory(8, &[xmp, orientation], 0);

    let segment = decode(w.finish());
    std::assert!(segment.xmp.is_none());
    std::assert_eq!(segment.tags.len(), 1);
}

#[test]
fn test_invalid_headers_are_hard_errors() {
    let mut bad_version = TiffWriter::new(ByteOrder::LittleEndian, 8).finish();
    bad_version[2] = 43;
    let mut cursor = std::io::Cursor::new(bad_version);
    assert_matches!(read_header(&mut cursor, 0, 8), Err(DecodeError::InvalidFormat(_)));

    let mut cursor = std::io::Cursor::new(b"XX\x2a\x00\x08\x00\x00\x00".to_vec());
    let result = TiffDirectoryDecoder::new(TagRegistry::builtin()).decode(&mut cursor, 0, 8);
    assert_matches!(result, Err(DecodeError::UnrecognizedByteOrder(0x5858)));

    let mut cursor = std::io::Cursor::new(b"II*\x00".to_vec());
    std::assert!(read_header(&mut cursor, 0, 4).unwrap_err().is_bounds_error());
}

#[test]
fn test_inline_values_never_seek() {
    let bytes = camera_exif(ByteOrder::BigEndian);
    let mut reader = CountingReader::new(std::io::Cursor::new(bytes));
    let len = stream_len(&mut reader).unwrap();
    reader.seek(SeekFrom::Start(10)).unwrap();
    reader.seeks = 0;

    let entry = DirectoryEntry {
        tag: ORIENTATION,
        wire_type: field_types::SHORT,
        component_count: 2,
        value_slot: [0, 6, 0, 1],
    };
    let value = TagValueMaterializer::new(entry, 0, ByteOrder::BigEndian)
        .materialize(&mut reader, len, TagKind::UShort)
        .unwrap();

    std::assert_eq!(value, Some(TagValue::UShort(vec![6, 1])));
    std::assert_eq!(reader.seeks, 0);
}

#[test]
fn test_out_of_line_values_restore_position() {
    let bytes = camera_exif(ByteOrder::LittleEndian);
    let mut reader = CountingReader::new(std::io::Cursor::new(bytes));
    let len = stream_len(&mut reader).unwrap();
    reader.seek(SeekFrom::Start(22)).unwrap();

    let entry = DirectoryEntry {
        tag: MAKE,
        wire_type: field_types::ASCII,
        component_count: 6,
        value_slot: 200u32.to_le_bytes(),
    };
    let value = TagValueMaterializer::new(entry, 0, ByteOrder::LittleEndian)
        .materialize(&mut reader, len, TagKind::String(crate::io::StringEncoding::Ascii))
        .unwrap();

    std::assert_eq!(value, Some(TagValue::String("Canon".to_string())));
    std::assert_eq!(reader.stream_position().unwrap(), 22);
}
