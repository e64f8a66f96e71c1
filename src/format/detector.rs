//! Format detection and dispatch

use std::io::SeekFrom;

use log::debug;

use super::decoder::{ImageDecoder, ImageFormat};
use crate::details::Metadata;
use crate::errors::{DecodeError, DecodeResult};
use crate::io::seekable::SeekableReader;
use crate::jpeg::JpegDecoder;
use crate::options::DecodeOptions;
use crate::png::PngDecoder;

/// Ordered list of decoders; the first whose magic number matches wins
pub struct FormatDetector {
    decoders: Vec<Box<dyn ImageDecoder>>,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDetector {
    /// Detector with the JPEG and PNG decoders, in that order
    pub fn new() -> Self {
        let mut detector = Self::empty();
        detector.register(Box::new(JpegDecoder));
        detector.register(Box::new(PngDecoder));
        detector
    }

    /// Detector with no decoders
    pub fn empty() -> Self {
        FormatDetector { decoders: Vec::new() }
    }

    /// Appends a decoder; earlier registrations win ties
    pub fn register(&mut self, decoder: Box<dyn ImageDecoder>) {
        self.decoders.push(decoder);
    }

    /// Formats in registration order
    pub fn formats(&self) -> Vec<ImageFormat> {
        self.decoders.iter().map(|d| d.format()).collect()
    }

    /// Finds the decoder that owns the stream
    pub fn detect(&self, reader: &mut dyn SeekableReader) -> DecodeResult<&dyn ImageDecoder> {
        for decoder in &self.decoders {
            if decoder.detect_format(reader)? {
                debug!("Detected {} stream", decoder.format());
                reader.seek(SeekFrom::Start(0))?;
                return Ok(decoder.as_ref());
            }
        }

        Err(DecodeError::UnsupportedFormat)
    }

    /// Detects the format and decodes with the matching decoder
    pub fn decode(&self, reader: &mut dyn SeekableReader, options: &DecodeOptions) -> DecodeResult<Metadata> {
        self.detect(reader)?.decode(reader, options)
    }
}
