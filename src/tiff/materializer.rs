//! Turns directory entries into typed tag values
//!
//! Values of four bytes or less live in the entry's value slot and are
//! decoded without touching the stream. Larger values are read from
//! `data_start + offset`, after which the cursor is put back where it was so
//! the directory scan can continue with the next entry.

use std::io::SeekFrom;

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::errors::DecodeResult;
use crate::io::seekable::{read_bytes_at, SeekableReader};
use crate::io::{codec, ByteOrder, StringEncoding};
use crate::tiff::constants::layout;
use crate::tiff::ifd::DirectoryEntry;
use crate::tiff::registry::TagKind;
use crate::tiff::types::{Rational, TagValue, URational, WireType, WireValues};

const COMMENT_HEADER_SIZE: usize = 8;
const DATE_LEN: usize = 10;
const DATETIME_LEN: usize = 19;

/// Reads the value of one directory entry
#[derive(Debug, Clone, Copy)]
pub struct TagValueMaterializer {
    entry: DirectoryEntry,
    /// Absolute stream offset that value offsets are relative to
    data_start: u64,
    byte_order: ByteOrder,
}

impl TagValueMaterializer {
    pub fn new(entry: DirectoryEntry, data_start: u64, byte_order: ByteOrder) -> Self {
        TagValueMaterializer { entry, data_start, byte_order }
    }

    /// Whether the value fits in the entry's value slot
    pub fn is_inline(&self) -> bool {
        matches!(self.entry.byte_len(), Some(len) if len <= layout::INLINE_VALUE_SIZE as u64)
    }

    /// Raw payload bytes of the entry
    ///
    /// Returns `None` for unknown wire types. Out-of-line reads are
    /// bounds-checked and always restore the cursor, even on failure.
    pub fn read_payload(&self, reader: &mut dyn SeekableReader, stream_len: u64) -> DecodeResult<Option<Vec<u8>>> {
        let byte_len = match self.entry.byte_len() {
            Some(len) => len,
            None => return Ok(None),
        };

        if self.is_inline() {
            return Ok(Some(self.entry.value_slot[..byte_len as usize].to_vec()));
        }

        let value_offset = self.data_start + self.entry.slot_u32(self.byte_order) as u64;
        let length = usize::try_from(byte_len)
            .map_err(|_| format!("Value of tag {:#06x} is too large", self.entry.tag))?;

        let saved_position = reader.stream_position()?;
        let result = read_bytes_at(reader, value_offset, length, stream_len);
        reader.seek(SeekFrom::Start(saved_position))?;

        result.map(Some)
    }

    /// Decodes the payload as the entry's wire type
    pub fn read_wire_values(&self, reader: &mut dyn SeekableReader, stream_len: u64) -> DecodeResult<Option<WireValues>> {
        let wire_type = match self.entry.wire_type() {
            Some(wire_type) => wire_type,
            None => return Ok(None),
        };

        match self.read_payload(reader, stream_len)? {
            Some(bytes) => decode_wire(wire_type, &bytes, self.byte_order).map(Some),
            None => Ok(None),
        }
    }

    /// Materializes the entry as `kind`
    ///
    /// `Ok(None)` means the wire data could not be expressed as `kind`; the
    /// tag is dropped. Errors come from the stream.
    pub fn materialize(&self, reader: &mut dyn SeekableReader, stream_len: u64, kind: TagKind) -> DecodeResult<Option<TagValue>> {
        let wire_type = match self.entry.wire_type() {
            Some(wire_type) => wire_type,
            None => return Ok(None),
        };

        let bytes = match self.read_payload(reader, stream_len)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let value = match kind {
            TagKind::String(encoding) => text_bytes(wire_type, &bytes)
                .map(|raw| codec::convert_string(raw, raw.len(), encoding))
                .transpose()?
                .map(TagValue::String),
            TagKind::Comment => text_bytes(wire_type, &bytes)
                .map(|raw| decode_comment(raw, self.byte_order))
                .transpose()?
                .map(TagValue::String),
            TagKind::Date | TagKind::DateTime => text_bytes(wire_type, &bytes)
                .map(|raw| codec::convert_string(raw, raw.len(), StringEncoding::Ascii))
                .transpose()?
                .and_then(|text| parse_date(&text, kind)),
            TagKind::Byte => text_bytes(wire_type, &bytes).map(|raw| TagValue::Byte(raw.to_vec())),
            numeric => convert_numeric(decode_wire(wire_type, &bytes, self.byte_order)?, numeric),
        };

        if value.is_none() {
            debug!("Tag {:#06x} ({} x{}) does not convert to {:?}",
                   self.entry.tag, wire_type.name(), self.entry.component_count, kind);
        }

        Ok(value)
    }
}

/// Decodes raw payload bytes as `count` components of `wire_type`
pub fn decode_wire(wire_type: WireType, bytes: &[u8], order: ByteOrder) -> DecodeResult<WireValues> {
    let size = wire_type.component_size();
    let count = bytes.len() / size;

    macro_rules! collect {
        ($read:expr) => {
            (0..count).map(|i| $read(bytes, i * size, order)).collect::<DecodeResult<Vec<_>>>()?
        };
    }

    let values = match wire_type {
        WireType::Byte => WireValues::Byte(bytes.to_vec()),
        WireType::Ascii => WireValues::Ascii(bytes.to_vec()),
        WireType::Undefined => WireValues::Undefined(bytes.to_vec()),
        WireType::SByte => WireValues::SByte(bytes.iter().map(|&b| b as i8).collect()),
        WireType::Short => WireValues::Short(collect!(codec::read_u16)),
        WireType::SShort => WireValues::SShort(collect!(codec::read_i16)),
        WireType::Long => WireValues::Long(collect!(codec::read_u32)),
        WireType::SLong => WireValues::SLong(collect!(codec::read_i32)),
        WireType::Rational => WireValues::Rational(collect!(URational::decode)),
        WireType::SRational => WireValues::SRational(collect!(Rational::decode)),
        WireType::Float => WireValues::Float(collect!(codec::read_f32)),
        WireType::Double => WireValues::Double(collect!(codec::read_f64)),
    };

    Ok(values)
}

/// Byte-sized wire types can carry text and opaque data
fn text_bytes(wire_type: WireType, bytes: &[u8]) -> Option<&[u8]> {
    match wire_type {
        WireType::Ascii | WireType::Byte | WireType::Undefined | WireType::SByte => Some(bytes),
        _ => None,
    }
}

/// Integer components widened to i64 for range-checked narrowing
fn integers(values: &WireValues) -> Option<Vec<i64>> {
    let ints = match values {
        WireValues::Byte(v) => v.iter().map(|&x| x as i64).collect(),
        WireValues::SByte(v) => v.iter().map(|&x| x as i64).collect(),
        WireValues::Short(v) => v.iter().map(|&x| x as i64).collect(),
        WireValues::SShort(v) => v.iter().map(|&x| x as i64).collect(),
        WireValues::Long(v) => v.iter().map(|&x| x as i64).collect(),
        WireValues::SLong(v) => v.iter().map(|&x| x as i64).collect(),
        _ => return None,
    };
    Some(ints)
}

fn narrow<T: TryFrom<i64>>(values: &WireValues) -> Option<Vec<T>> {
    integers(values)?.into_iter().map(|x| T::try_from(x).ok()).collect()
}

fn convert_numeric(values: WireValues, kind: TagKind) -> Option<TagValue> {
    match kind {
        TagKind::Short => narrow(&values).map(TagValue::Short),
        TagKind::UShort => narrow(&values).map(TagValue::UShort),
        TagKind::Int => narrow(&values).map(TagValue::Int),
        TagKind::UInt => narrow(&values).map(TagValue::UInt),
        TagKind::Enum => narrow::<u16>(&values)
            .and_then(|v| v.first().copied())
            .map(TagValue::Enum),
        TagKind::URational => match values {
            WireValues::Rational(v) => Some(TagValue::URational(v)),
            _ => None,
        },
        TagKind::Rational => match values {
            WireValues::SRational(v) => Some(TagValue::Rational(v)),
            WireValues::Rational(v) => v.iter()
                .map(|r| Some(Rational::new(i32::try_from(r.numerator).ok()?, i32::try_from(r.denominator).ok()?)))
                .collect::<Option<Vec<_>>>()
                .map(TagValue::Rational),
            _ => None,
        },
        TagKind::Float => match values {
            WireValues::Float(v) => Some(TagValue::Float(v)),
            _ => None,
        },
        TagKind::Double => match values {
            WireValues::Double(v) => Some(TagValue::Double(v)),
            WireValues::Float(v) => Some(TagValue::Double(v.into_iter().map(f64::from).collect())),
            _ => None,
        },
        _ => None,
    }
}

/// Text behind the 8-byte character code header used by UserComment
fn decode_comment(bytes: &[u8], order: ByteOrder) -> DecodeResult<String> {
    if bytes.len() < COMMENT_HEADER_SIZE {
        return codec::convert_string(bytes, bytes.len(), StringEncoding::Utf8);
    }

    let (header, body) = bytes.split_at(COMMENT_HEADER_SIZE);
    let encoding = match header {
        b"ASCII\0\0\0" => StringEncoding::Ascii,
        b"UNICODE\0" => match order {
            ByteOrder::LittleEndian => StringEncoding::Utf16Le,
            ByteOrder::BigEndian => StringEncoding::Utf16Be,
        },
        // JIS, all-zero "undefined" and unknown codes
        _ => StringEncoding::Utf8,
    };

    let text = codec::convert_string(body, body.len(), encoding)?;
    Ok(text.trim_end().to_string())
}

/// Strict `YYYY:MM:DD` / `YYYY:MM:DD HH:MM:SS` parsing
fn parse_date(text: &str, kind: TagKind) -> Option<TagValue> {
    if !has_date_layout(text.as_bytes()) {
        return None;
    }

    match kind {
        TagKind::Date if text.len() == DATE_LEN => {
            NaiveDate::parse_from_str(text, "%Y:%m:%d").ok().map(TagValue::Date)
        }
        TagKind::DateTime if text.len() == DATETIME_LEN => {
            NaiveDateTime::parse_from_str(text, "%Y:%m:%d %H:%M:%S").ok().map(TagValue::DateTime)
        }
        _ => None,
    }
}

/// Digits everywhere except the fixed separator columns
///
/// chrono alone accepts space padding and a signed year.
fn has_date_layout(bytes: &[u8]) -> bool {
    bytes.iter().enumerate().all(|(i, &b)| match i {
        4 | 7 | 13 | 16 => b == b':',
        10 => b == b' ',
        _ => b.is_ascii_digit(),
    })
}
