//! Core TIFF/EXIF value types
//!
//! `WireType` and `WireValues` describe what is physically stored in a
//! directory entry; `TagValue` is the typed value handed to callers once a
//! tag's registered decoder has interpreted the wire data.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::io::codec;
use crate::io::ByteOrder;
use crate::errors::DecodeResult;
use crate::tiff::constants::field_types;

/// Logical tag namespace a directory belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MetadataProfile {
    /// Primary IFD chain and the Exif sub-IFD
    Exif,
    /// GPS sub-IFD
    Gps,
    /// Interoperability sub-IFD
    Interoperability,
}

impl MetadataProfile {
    /// All profiles, in the order their chains are decoded
    pub const ALL: [MetadataProfile; 3] = [
        MetadataProfile::Exif,
        MetadataProfile::Gps,
        MetadataProfile::Interoperability,
    ];

    /// Returns a string representation of this profile
    pub fn name(&self) -> &'static str {
        match self {
            MetadataProfile::Exif => "Exif",
            MetadataProfile::Gps => "GPS",
            MetadataProfile::Interoperability => "Interoperability",
        }
    }

    /// Table name used for this profile in tag definition files
    pub fn table_name(&self) -> &'static str {
        match self {
            MetadataProfile::Exif => "exif",
            MetadataProfile::Gps => "gps",
            MetadataProfile::Interoperability => "interop",
        }
    }
}

impl fmt::Display for MetadataProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The twelve TIFF 6.0 field types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
}

impl WireType {
    /// Maps a raw field type code, `None` for anything outside TIFF 6.0
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            field_types::BYTE => Some(WireType::Byte),
            field_types::ASCII => Some(WireType::Ascii),
            field_types::SHORT => Some(WireType::Short),
            field_types::LONG => Some(WireType::Long),
            field_types::RATIONAL => Some(WireType::Rational),
            field_types::SBYTE => Some(WireType::SByte),
            field_types::UNDEFINED => Some(WireType::Undefined),
            field_types::SSHORT => Some(WireType::SShort),
            field_types::SLONG => Some(WireType::SLong),
            field_types::SRATIONAL => Some(WireType::SRational),
            field_types::FLOAT => Some(WireType::Float),
            field_types::DOUBLE => Some(WireType::Double),
            _ => None,
        }
    }

    /// Size in bytes of one component of this type
    pub fn component_size(self) -> usize {
        match self {
            WireType::Byte | WireType::Ascii | WireType::SByte | WireType::Undefined => 1,
            WireType::Short | WireType::SShort => 2,
            WireType::Long | WireType::SLong | WireType::Float => 4,
            WireType::Rational | WireType::SRational | WireType::Double => 8,
        }
    }

    /// Returns the TIFF name of this type
    pub fn name(self) -> &'static str {
        match self {
            WireType::Byte => "BYTE",
            WireType::Ascii => "ASCII",
            WireType::Short => "SHORT",
            WireType::Long => "LONG",
            WireType::Rational => "RATIONAL",
            WireType::SByte => "SBYTE",
            WireType::Undefined => "UNDEFINED",
            WireType::SShort => "SSHORT",
            WireType::SLong => "SLONG",
            WireType::SRational => "SRATIONAL",
            WireType::Float => "FLOAT",
            WireType::Double => "DOUBLE",
        }
    }
}

/// Component size for a raw field type code; `None` means "no size"
pub fn component_size_of(raw: u16) -> Option<usize> {
    WireType::from_raw(raw).map(WireType::component_size)
}

/// Unsigned rational kept as an exact numerator/denominator pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct URational {
    pub numerator: u32,
    pub denominator: u32,
}

impl URational {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        URational { numerator, denominator }
    }

    /// Decimal value, `None` when the denominator is zero
    pub fn to_f64(&self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }

    pub(crate) fn decode(buffer: &[u8], offset: usize, order: ByteOrder) -> DecodeResult<Self> {
        Ok(URational::new(
            codec::read_u32(buffer, offset, order)?,
            codec::read_u32(buffer, offset + 4, order)?,
        ))
    }

    /// Wire representation in the given byte order
    pub fn to_bytes(&self, order: ByteOrder) -> [u8; 8] {
        let (n, d) = match order {
            ByteOrder::LittleEndian => (self.numerator.to_le_bytes(), self.denominator.to_le_bytes()),
            ByteOrder::BigEndian => (self.numerator.to_be_bytes(), self.denominator.to_be_bytes()),
        };
        [n[0], n[1], n[2], n[3], d[0], d[1], d[2], d[3]]
    }
}

impl fmt::Display for URational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Signed rational kept as an exact numerator/denominator pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rational {
    pub numerator: i32,
    pub denominator: i32,
}

impl Rational {
    pub fn new(numerator: i32, denominator: i32) -> Self {
        Rational { numerator, denominator }
    }

    /// Decimal value, `None` when the denominator is zero
    pub fn to_f64(&self) -> Option<f64> {
        if self.denominator == 0 {
            None
        } else {
            Some(self.numerator as f64 / self.denominator as f64)
        }
    }

    pub(crate) fn decode(buffer: &[u8], offset: usize, order: ByteOrder) -> DecodeResult<Self> {
        Ok(Rational::new(
            codec::read_i32(buffer, offset, order)?,
            codec::read_i32(buffer, offset + 4, order)?,
        ))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Values exactly as stored on the wire, one variant per field type
#[derive(Debug, Clone, PartialEq)]
pub enum WireValues {
    Byte(Vec<u8>),
    Ascii(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<URational>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<Rational>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl WireValues {
    /// Number of components held
    pub fn len(&self) -> usize {
        match self {
            WireValues::Byte(v) | WireValues::Ascii(v) | WireValues::Undefined(v) => v.len(),
            WireValues::Short(v) => v.len(),
            WireValues::Long(v) => v.len(),
            WireValues::Rational(v) => v.len(),
            WireValues::SByte(v) => v.len(),
            WireValues::SShort(v) => v.len(),
            WireValues::SLong(v) => v.len(),
            WireValues::SRational(v) => v.len(),
            WireValues::Float(v) => v.len(),
            WireValues::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A materialized tag value
///
/// Numeric variants keep every component in wire order; single-component
/// fields hold a one-element vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum TagValue {
    Byte(Vec<u8>),
    Short(Vec<i16>),
    UShort(Vec<u16>),
    Int(Vec<i32>),
    UInt(Vec<u32>),
    Rational(Vec<Rational>),
    URational(Vec<URational>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    String(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Enum(u16),
}

impl TagValue {
    /// First component as an unsigned integer, for integer-like values
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            TagValue::Byte(v) => v.first().map(|&x| x as u32),
            TagValue::UShort(v) => v.first().map(|&x| x as u32),
            TagValue::UInt(v) => v.first().copied(),
            TagValue::Short(v) => v.first().and_then(|&x| u32::try_from(x).ok()),
            TagValue::Int(v) => v.first().and_then(|&x| u32::try_from(x).ok()),
            TagValue::Enum(x) => Some(*x as u32),
            _ => None,
        }
    }

    /// First component as a decimal number
    ///
    /// Rationals with a zero denominator have no decimal value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::URational(v) => v.first().and_then(URational::to_f64),
            TagValue::Rational(v) => v.first().and_then(Rational::to_f64),
            TagValue::Float(v) => v.first().map(|&x| x as f64),
            TagValue::Double(v) => v.first().copied(),
            TagValue::Short(v) => v.first().map(|&x| x as f64),
            TagValue::Int(v) => v.first().map(|&x| x as f64),
            other => other.as_u32().map(|x| x as f64),
        }
    }

    /// First component of an unsigned rational value
    pub fn as_urational(&self) -> Option<URational> {
        match self {
            TagValue::URational(v) => v.first().copied(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of components; text and date values count as one
    pub fn len(&self) -> usize {
        match self {
            TagValue::Byte(v) => v.len(),
            TagValue::Short(v) => v.len(),
            TagValue::UShort(v) => v.len(),
            TagValue::Int(v) => v.len(),
            TagValue::UInt(v) => v.len(),
            TagValue::Rational(v) => v.len(),
            TagValue::URational(v) => v.len(),
            TagValue::Float(v) => v.len(),
            TagValue::Double(v) => v.len(),
            TagValue::String(_) | TagValue::DateTime(_) | TagValue::Date(_) | TagValue::Enum(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the variant, as used in JSON output
    pub fn type_name(&self) -> &'static str {
        match self {
            TagValue::Byte(_) => "Byte",
            TagValue::Short(_) => "Short",
            TagValue::UShort(_) => "UShort",
            TagValue::Int(_) => "Int",
            TagValue::UInt(_) => "UInt",
            TagValue::Rational(_) => "Rational",
            TagValue::URational(_) => "URational",
            TagValue::Float(_) => "Float",
            TagValue::Double(_) => "Double",
            TagValue::String(_) => "String",
            TagValue::DateTime(_) => "DateTime",
            TagValue::Date(_) => "Date",
            TagValue::Enum(_) => "Enum",
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Byte(v) => write_list(f, v),
            TagValue::Short(v) => write_list(f, v),
            TagValue::UShort(v) => write_list(f, v),
            TagValue::Int(v) => write_list(f, v),
            TagValue::UInt(v) => write_list(f, v),
            TagValue::Rational(v) => write_list(f, v),
            TagValue::URational(v) => write_list(f, v),
            TagValue::Float(v) => write_list(f, v),
            TagValue::Double(v) => write_list(f, v),
            TagValue::String(s) => f.write_str(s),
            TagValue::DateTime(dt) => write!(f, "{}", dt.format("%Y:%m:%d %H:%M:%S")),
            TagValue::Date(d) => write!(f, "{}", d.format("%Y:%m:%d")),
            TagValue::Enum(x) => write!(f, "{}", x),
        }
    }
}
