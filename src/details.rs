//! Decode results

use std::fmt;

use serde::Serialize;

use crate::format::ImageFormat;
use crate::metadata::{IptcRecords, XmpPacket};
use crate::tiff::collection::TagCollection;

/// Dimensions, resolution and type of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageDetails {
    pub width: u32,
    pub height: u32,
    pub horizontal_dpi: i32,
    pub vertical_dpi: i32,
    pub mime_type: &'static str,
}

impl fmt::Display for ImageDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} px, {}x{} dpi, {}",
               self.width, self.height, self.horizontal_dpi, self.vertical_dpi, self.mime_type)
    }
}

/// Everything a decode produced
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub format: ImageFormat,
    pub details: ImageDetails,
    /// EXIF tags of all profiles
    pub tags: TagCollection,
    pub iptc: Option<IptcRecords>,
    pub xmp: Option<XmpPacket>,
}

impl Metadata {
    pub fn new(format: ImageFormat, details: ImageDetails) -> Self {
        Metadata { format, details, tags: TagCollection::new(), iptc: None, xmp: None }
    }
}
