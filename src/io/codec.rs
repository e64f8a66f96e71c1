//! Primitive codec for byte-order-aware slice decoding
//!
//! Every function takes a buffer, an offset into it and a byte order, and
//! fails with `BufferTooSmall` rather than truncating when the buffer does
//! not hold the whole value.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use crate::errors::{DecodeError, DecodeResult};
use crate::io::byte_order::ByteOrder;

/// Character encodings understood by `convert_string`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    /// 7-bit ASCII; other bytes become U+FFFD
    Ascii,
    /// UTF-8 (lossy)
    Utf8,
    /// UCS-2 / UTF-16, little-endian code units
    Utf16Le,
    /// UCS-2 / UTF-16, big-endian code units
    Utf16Be,
    /// Unspecified; decoded as UTF-8
    Undefined,
}

fn slice_at(buffer: &[u8], offset: usize, size: usize) -> DecodeResult<&[u8]> {
    let needed = offset.checked_add(size).ok_or(DecodeError::BufferTooSmall {
        needed: usize::MAX,
        available: buffer.len(),
    })?;

    if buffer.len() < needed {
        return Err(DecodeError::BufferTooSmall { needed, available: buffer.len() });
    }

    Ok(&buffer[offset..needed])
}

macro_rules! primitive_reader {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $size:expr, $method:ident) => {
        $(#[$doc])*
        pub fn $name(buffer: &[u8], offset: usize, order: ByteOrder) -> DecodeResult<$ty> {
            let bytes = slice_at(buffer, offset, $size)?;
            Ok(match order {
                ByteOrder::LittleEndian => LittleEndian::$method(bytes),
                ByteOrder::BigEndian => BigEndian::$method(bytes),
            })
        }
    };
}

primitive_reader!(
    /// Read a signed 16-bit integer
    read_i16, i16, 2, read_i16);
primitive_reader!(
    /// Read an unsigned 16-bit integer
    read_u16, u16, 2, read_u16);
primitive_reader!(
    /// Read a signed 32-bit integer
    read_i32, i32, 4, read_i32);
primitive_reader!(
    /// Read an unsigned 32-bit integer
    read_u32, u32, 4, read_u32);
primitive_reader!(
    /// Read a signed 64-bit integer
    read_i64, i64, 8, read_i64);
primitive_reader!(
    /// Read an unsigned 64-bit integer
    read_u64, u64, 8, read_u64);
primitive_reader!(
    /// Read an IEEE 754 single precision float
    read_f32, f32, 4, read_f32);
primitive_reader!(
    /// Read an IEEE 754 double precision float
    read_f64, f64, 8, read_f64);

/// Decodes the first `count` bytes of `buffer` as text
///
/// Trailing NULs are stripped before decoding (whole NUL code units for the
/// UTF-16 variants). `count` larger than the buffer is an error.
pub fn convert_string(buffer: &[u8], count: usize, encoding: StringEncoding) -> DecodeResult<String> {
    let bytes = slice_at(buffer, 0, count)?;

    let text = match encoding {
        StringEncoding::Ascii => trim_nul_bytes(bytes)
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
            .collect(),
        StringEncoding::Utf8 | StringEncoding::Undefined => {
            String::from_utf8_lossy(trim_nul_bytes(bytes)).into_owned()
        }
        StringEncoding::Utf16Le | StringEncoding::Utf16Be => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| match encoding {
                    StringEncoding::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                    _ => u16::from_be_bytes([pair[0], pair[1]]),
                })
                .collect();
            let end = units.iter().rposition(|&unit| unit != 0).map_or(0, |i| i + 1);
            String::from_utf16_lossy(&units[..end])
        }
    };

    Ok(text)
}

fn trim_nul_bytes(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}
