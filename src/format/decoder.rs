//! Image decoder trait definition

use std::fmt;

use serde::Serialize;

use crate::details::Metadata;
use crate::errors::DecodeResult;
use crate::io::seekable::SeekableReader;
use crate::options::DecodeOptions;

/// Container formats the crate can sniff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategy trait for one container format
pub trait ImageDecoder: Send + Sync {
    /// The format this decoder handles
    fn format(&self) -> ImageFormat;

    /// Checks the magic number at the start of the stream
    ///
    /// Implementations rewind to offset zero first, so detectors do not
    /// depend on each other's cursor movements.
    fn detect_format(&self, reader: &mut dyn SeekableReader) -> DecodeResult<bool>;

    /// Decodes dimensions, resolution and metadata
    fn decode(&self, reader: &mut dyn SeekableReader, options: &DecodeOptions) -> DecodeResult<Metadata>;
}
