//! Image metadata sniffing
//!
//! Reads dimensions, DPI and EXIF/GPS/Interoperability tags from JPEG and
//! PNG streams without decoding pixel data, along with any IPTC records and
//! XMP packets found on the way.

pub mod io;
pub mod tiff;
pub mod jpeg;
pub mod png;
pub mod metadata;
pub mod format;
pub mod utils;
pub mod commands;
pub mod api;
pub mod errors;
pub mod options;
pub mod details;

pub use crate::api::{decode, decode_bytes, decode_file, decode_metadata, ImageSniffer};
pub use crate::details::{ImageDetails, Metadata};
pub use crate::errors::{DecodeError, DecodeResult};
pub use crate::options::{DecodeOptions, ScanMode};

pub use format::{FormatDetector, ImageDecoder, ImageFormat};
pub use metadata::{IptcRecords, XmpPacket};
pub use tiff::{MetadataProfile, TagCollection, TagRegistry, TagValue};
