//! TIFF/EXIF directory decoding
//!
//! This module walks the IFD graph embedded in JPEG APP1 segments and PNG
//! eXIf chunks and materializes the registered Exif, GPS and
//! Interoperability tags.

pub mod collection;
pub mod constants;
pub mod ifd;
pub mod materializer;
pub mod reader;
pub mod registry;
pub mod resolution;
pub mod types;
#[cfg(test)]
mod tests;

pub use collection::{TagCollection, TagEntry};
pub use ifd::DirectoryEntry;
pub use materializer::TagValueMaterializer;
pub use reader::{TiffDirectoryDecoder, TiffSegment};
pub use registry::{TagDefinition, TagKind, TagRegistry};
pub use resolution::{RawResolution, ResolutionUnit, DEFAULT_DPI};
pub use types::{MetadataProfile, Rational, TagValue, URational, WireType, WireValues};
