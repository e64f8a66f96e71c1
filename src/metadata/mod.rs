//! Embedded metadata blocks carried alongside EXIF
//!
//! IPTC records and XMP packets are extracted as raw blocks by the format
//! decoders and parsed here.

pub mod iptc;
pub mod xmp;

pub use iptc::{IptcDataset, IptcRecords};
pub use xmp::XmpPacket;
