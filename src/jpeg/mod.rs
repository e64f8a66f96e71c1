//! JPEG decoding
//!
//! Dimensions come from the first SOF0/SOF1/SOF2 frame header. Resolution
//! comes from the JFIF APP0 density, with the EXIF XResolution/YResolution
//! tags filling in any axis JFIF leaves unset.

pub mod markers;
pub mod scanner;

use std::io::{ErrorKind, SeekFrom};

use log::info;

use crate::details::{ImageDetails, Metadata};
use crate::errors::{DecodeError, DecodeResult};
use crate::format::{ImageDecoder, ImageFormat};
use crate::io::seekable::{stream_len, SeekableReader};
use crate::metadata::{IptcRecords, XmpPacket};
use crate::options::DecodeOptions;

pub use scanner::{JpegScan, JpegSegmentScanner};

/// Decoder for JPEG/JFIF/EXIF streams
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegDecoder;

impl ImageDecoder for JpegDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn detect_format(&self, reader: &mut dyn SeekableReader) -> DecodeResult<bool> {
        reader.seek(SeekFrom::Start(0))?;
        let mut magic = [0u8; 2];
        match reader.read_exact(&mut magic) {
            Ok(()) => Ok(magic == markers::SOI_BYTES),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn decode(&self, reader: &mut dyn SeekableReader, options: &DecodeOptions) -> DecodeResult<Metadata> {
        let len = stream_len(reader)?;
        if !self.detect_format(reader)? {
            return Err(DecodeError::InvalidFormat("Missing JPEG start of image marker".to_string()));
        }

        let scan = JpegSegmentScanner::new(options).scan(reader, len)?;
        let (width, height) = scan.frame.unwrap_or_default();
        let (horizontal_dpi, vertical_dpi) = scan.resolution().to_dpi(options.default_dpi);

        let details = ImageDetails {
            width,
            height,
            horizontal_dpi,
            vertical_dpi,
            mime_type: ImageFormat::Jpeg.mime_type(),
        };
        info!("JPEG: {}", details);

        let iptc = scan.iptc.or_else(|| scan.exif_iptc.as_deref().map(IptcRecords::parse));
        let xmp = scan.xmp.or_else(|| scan.exif_xmp.as_deref().map(XmpPacket::from_bytes));

        Ok(Metadata {
            format: ImageFormat::Jpeg,
            details,
            tags: scan.tags,
            iptc,
            xmp,
        })
    }
}
