//! TIFF/EXIF format constants
//!
//! Named values for the header, field types, pointer tags and the handful
//! of tags the decoder itself interprets.

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// Size of the classic TIFF header
    pub const TIFF_HEADER_SIZE: usize = 8;

    /// Signature that opens an EXIF APP1 payload
    pub const EXIF_SIGNATURE: &[u8; 6] = b"Exif\0\0";
}

/// IFD layout constants
pub mod layout {
    /// Bytes in one directory entry
    pub const ENTRY_SIZE: u64 = 12;

    /// Bytes in the entry count that opens a directory
    pub const ENTRY_COUNT_SIZE: u64 = 2;

    /// Bytes in the trailing next-IFD offset
    pub const NEXT_OFFSET_SIZE: u64 = 4;

    /// Bytes available for an inline value
    pub const INLINE_VALUE_SIZE: usize = 4;

    /// Default bound on the number of directories followed in one chain
    pub const DEFAULT_MAX_IFD_HOPS: usize = 64;
}

/// Field types defined by TIFF 6.0
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const SHORT: u16 = 3;      // 16-bit unsigned integer
    pub const LONG: u16 = 4;       // 32-bit unsigned integer
    pub const RATIONAL: u16 = 5;   // Two LONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point
}

/// Tags whose value locates another structure instead of being a value
pub mod pointer_tags {
    pub const EXIF_IFD: u16 = 0x8769;
    pub const GPS_IFD: u16 = 0x8825;
    pub const INTEROPERABILITY_IFD: u16 = 0xA005;
    pub const IPTC: u16 = 0x83BB;
    pub const XMP: u16 = 0x02BC;
}

/// Tags the decoder reads back for image details
pub mod tags {
    pub const X_RESOLUTION: u16 = 0x011A;
    pub const Y_RESOLUTION: u16 = 0x011B;
    pub const RESOLUTION_UNIT: u16 = 0x0128;
}

/// Resolution unit values
pub mod resolution_unit {
    pub const NONE: u16 = 1;              // No meaningful units
    pub const INCH: u16 = 2;              // Inches (default)
    pub const CENTIMETER: u16 = 3;        // Centimeters
}
