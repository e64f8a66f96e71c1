//! Library entry points
//!
//! The free functions cover one-off decodes with the built-in decoders.
//! `ImageSniffer` keeps options and the decoder list together for callers
//! that decode many images, possibly from several threads.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use log::debug;

use crate::details::{ImageDetails, Metadata};
use crate::errors::DecodeResult;
use crate::format::{FormatDetector, ImageDecoder, ImageFormat};
use crate::io::seekable::SeekableReader;
use crate::options::DecodeOptions;

/// Buffer size for file sources; most metadata sits in the first few KiB
const FILE_BUFFER_SIZE: usize = 16 * 1024;

/// Reusable decoding facade
pub struct ImageSniffer {
    options: DecodeOptions,
    detector: FormatDetector,
}

impl Default for ImageSniffer {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

impl ImageSniffer {
    /// Create a sniffer with the JPEG and PNG decoders
    ///
    /// # Arguments
    /// * `options` - Options applied to every decode
    pub fn new(options: DecodeOptions) -> Self {
        ImageSniffer { options, detector: FormatDetector::new() }
    }

    /// Create a sniffer with a custom decoder list
    ///
    /// # Arguments
    /// * `options` - Options applied to every decode
    /// * `detector` - Decoders tried in registration order
    pub fn with_detector(options: DecodeOptions, detector: FormatDetector) -> Self {
        ImageSniffer { options, detector }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Registers an extra decoder after the built-in ones
    pub fn register(&mut self, decoder: Box<dyn ImageDecoder>) {
        self.detector.register(decoder);
    }

    /// Formats this sniffer recognizes, in detection order
    pub fn formats(&self) -> Vec<ImageFormat> {
        self.detector.formats()
    }

    /// Decode dimensions and resolution
    ///
    /// # Arguments
    /// * `reader` - Caller-owned source; it is not closed
    ///
    /// # Returns
    /// Image details, or an error if no decoder accepts the stream
    pub fn details(&self, reader: &mut dyn SeekableReader) -> DecodeResult<ImageDetails> {
        self.metadata(reader).map(|metadata| metadata.details)
    }

    /// Decode dimensions, resolution and every metadata block read
    ///
    /// # Arguments
    /// * `reader` - Caller-owned source; it is not closed
    ///
    /// # Returns
    /// Decoded metadata, or an error if no decoder accepts the stream
    pub fn metadata(&self, reader: &mut dyn SeekableReader) -> DecodeResult<Metadata> {
        self.detector.decode(reader, &self.options)
    }

    /// Decode a file, which is closed before returning
    ///
    /// # Arguments
    /// * `path` - Path to the image
    pub fn file<P: AsRef<Path>>(&self, path: P) -> DecodeResult<Metadata> {
        let path = path.as_ref();
        debug!("Opening {}", path.display());
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(FILE_BUFFER_SIZE, file);
        self.metadata(&mut reader)
    }

    /// Decode an in-memory image
    pub fn bytes(&self, data: &[u8]) -> DecodeResult<Metadata> {
        self.metadata(&mut Cursor::new(data))
    }
}

/// Decode dimensions and resolution with default options
pub fn decode(reader: &mut dyn SeekableReader) -> DecodeResult<ImageDetails> {
    FormatDetector::new().decode(reader, &DecodeOptions::default()).map(|metadata| metadata.details)
}

/// Decode dimensions, resolution and metadata
pub fn decode_metadata(reader: &mut dyn SeekableReader, options: &DecodeOptions) -> DecodeResult<Metadata> {
    FormatDetector::new().decode(reader, options)
}

/// Open and decode a file
pub fn decode_file<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> DecodeResult<Metadata> {
    ImageSniffer::new(options.clone()).file(path)
}

/// Decode an in-memory image
pub fn decode_bytes(data: &[u8], options: &DecodeOptions) -> DecodeResult<Metadata> {
    decode_metadata(&mut Cursor::new(data), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DecodeError;

    const TINY_JPEG: [u8; 17] = [
        0xFF, 0xD8,
        0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x02, 0x00, 0x03, 0x01, 0x01, 0x11, 0x00,
        0xFF, 0xD9,
    ];

    #[test]
    fn test_decode_bytes() {
        let metadata = decode_bytes(&TINY_JPEG, &DecodeOptions::default()).unwrap();
        assert_eq!(metadata.format, ImageFormat::Jpeg);
        assert_eq!((metadata.details.width, metadata.details.height), (3, 2));
    }

    #[test]
    fn test_unknown_format() {
        let result = decode(&mut Cursor::new(b"not an image".to_vec()));
        assert!(matches!(result, Err(DecodeError::UnsupportedFormat)));
    }

    #[test]
    fn test_sniffer_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ImageSniffer>();

        let sniffer = ImageSniffer::default();
        assert_eq!(sniffer.formats(), vec![ImageFormat::Jpeg, ImageFormat::Png]);
        assert_eq!(sniffer.bytes(&TINY_JPEG).unwrap().details.mime_type, "image/jpeg");
    }

    #[test]
    fn test_missing_file() {
        let result = decode_file("/nonexistent/image.jpg", &DecodeOptions::default());
        assert!(matches!(result, Err(DecodeError::Io(_))));
    }
}
