//! Byte order handling for TIFF-encoded data
//!
//! The byte order is detected once from a TIFF header and then threaded
//! through every read of that segment.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::Result;

use crate::errors::{DecodeError, DecodeResult};
use crate::io::seekable::SeekableReader;

/// "II" read as a little-endian u16
const INTEL_MARKER: u16 = 0x4949;
/// "MM" read as a little-endian u16
const MOTOROLA_MARKER: u16 = 0x4D4D;

/// Represents the byte order of a TIFF stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Classifies a 2-byte byte order marker
    ///
    /// Only the first two bytes of `marker` are inspected.
    pub fn detect(marker: &[u8]) -> DecodeResult<Self> {
        if marker.len() < 2 {
            return Err(DecodeError::BufferTooSmall { needed: 2, available: marker.len() });
        }

        match u16::from_le_bytes([marker[0], marker[1]]) {
            INTEL_MARKER => Ok(ByteOrder::LittleEndian),
            MOTOROLA_MARKER => Ok(ByteOrder::BigEndian),
            other => Err(DecodeError::UnrecognizedByteOrder(other)),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Read a u16 value from the reader's current position
    pub fn read_u16(self, reader: &mut dyn SeekableReader) -> Result<u16> {
        match self {
            ByteOrder::LittleEndian => reader.read_u16::<LittleEndian>(),
            ByteOrder::BigEndian => reader.read_u16::<BigEndian>(),
        }
    }

    /// Read a u32 value from the reader's current position
    pub fn read_u32(self, reader: &mut dyn SeekableReader) -> Result<u32> {
        match self {
            ByteOrder::LittleEndian => reader.read_u32::<LittleEndian>(),
            ByteOrder::BigEndian => reader.read_u32::<BigEndian>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detect_little_endian() {
        assert_eq!(ByteOrder::detect(b"II").unwrap(), ByteOrder::LittleEndian);
    }

    #[test]
    fn test_detect_big_endian() {
        assert_eq!(ByteOrder::detect(b"MM*\0").unwrap(), ByteOrder::BigEndian);
    }

    #[test]
    fn test_detect_invalid() {
        assert!(matches!(
            ByteOrder::detect(&[0x34, 0x12]),
            Err(DecodeError::UnrecognizedByteOrder(0x1234))
        ));
        assert!(matches!(
            ByteOrder::detect(b"I"),
            Err(DecodeError::BufferTooSmall { needed: 2, available: 1 })
        ));
    }

    #[test]
    fn test_reader_helpers_follow_order() {
        let mut cursor = Cursor::new(vec![0x12, 0x34, 0x12, 0x34, 0x56, 0x78]);

        assert_eq!(ByteOrder::BigEndian.read_u16(&mut cursor).unwrap(), 0x1234);
        assert_eq!(ByteOrder::LittleEndian.read_u32(&mut cursor).unwrap(), 0x78563412);
    }
}
