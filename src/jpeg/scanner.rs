//! JPEG segment scanner
//!
//! A marker-driven state machine over the segments that precede the image
//! data. Frame headers give the dimensions, APP0 the JFIF density, APP1 the
//! EXIF structure or an XMP packet and APP13 the IPTC records. Every
//! segment with a length field is skipped by seeking to its declared end,
//! whether or not its payload was understood.

use std::io::{ErrorKind, SeekFrom};

use log::{debug, trace, warn};

use super::markers::{self, signatures};
use crate::errors::{DecodeError, DecodeResult};
use crate::io::seekable::{read_bytes_at, SeekableReader};
use crate::metadata::{IptcRecords, XmpPacket};
use crate::options::DecodeOptions;
use crate::tiff::collection::TagCollection;
use crate::tiff::constants::header;
use crate::tiff::reader::TiffDirectoryDecoder;
use crate::tiff::resolution::{AxisResolution, RawResolution, ResolutionUnit};

/// What one pass over the segments found
#[derive(Debug, Clone, Default)]
pub struct JpegScan {
    /// Dimensions from the first frame header
    pub frame: Option<(u32, u32)>,
    /// Density from the JFIF APP0 segment
    pub jfif: RawResolution,
    /// Density from the EXIF resolution tags
    pub exif: RawResolution,
    pub tags: TagCollection,
    pub iptc: Option<IptcRecords>,
    pub xmp: Option<XmpPacket>,
    /// Raw IPTC and XMP blocks referenced from EXIF
    pub exif_iptc: Option<Vec<u8>>,
    pub exif_xmp: Option<Vec<u8>>,
}

impl JpegScan {
    /// JFIF density, with EXIF filling any axis JFIF left unset
    pub fn resolution(&self) -> RawResolution {
        self.jfif.or(self.exif)
    }

    /// Whether dimensions and both densities are known and non-zero
    pub fn is_complete(&self) -> bool {
        matches!(self.frame, Some((w, h)) if w > 0 && h > 0) && self.resolution().is_complete()
    }
}

/// Decision taken after a segment
enum Step {
    Continue,
    Stop,
}

/// Walks the segments of one JPEG stream
pub struct JpegSegmentScanner<'o> {
    options: &'o DecodeOptions,
}

impl<'o> JpegSegmentScanner<'o> {
    pub fn new(options: &'o DecodeOptions) -> Self {
        JpegSegmentScanner { options }
    }

    /// Scans from the current position, which must follow the SOI marker
    ///
    /// Fails with `InvalidFormat` if the stream ends before a frame header.
    pub fn scan(&self, reader: &mut dyn SeekableReader, stream_len: u64) -> DecodeResult<JpegScan> {
        let mut scan = JpegScan::default();

        while let Some(marker) = next_marker(reader)? {
            trace!("Marker {:#04x} ({})", marker, markers::name(marker));

            if marker == markers::EOI {
                debug!("Reached end of image");
                break;
            }
            if markers::is_standalone(marker) {
                continue;
            }

            let position = reader.stream_position()?;
            if position + 2 > stream_len {
                warn!("Segment length of {} runs past the end of the stream", markers::name(marker));
                break;
            }
            let mut length_bytes = [0u8; 2];
            reader.read_exact(&mut length_bytes)?;
            let length = u16::from_be_bytes(length_bytes);
            if length < 2 {
                warn!("Invalid {} segment length {}", markers::name(marker), length);
                break;
            }

            let segment_start = position + 2;
            let remaining = (length - 2) as u64;
            debug!("{} segment at {}, {} bytes", markers::name(marker), segment_start, remaining);

            let step = match marker {
                markers::APP0 => self.read_jfif(reader, &mut scan, segment_start, remaining, stream_len)?,
                markers::APP1 => self.read_app1(reader, &mut scan, segment_start, remaining, stream_len)?,
                markers::APP13 => self.read_photoshop(reader, &mut scan, segment_start, remaining, stream_len)?,
                m if markers::is_frame_start(m) => self.read_frame(reader, &mut scan, segment_start, remaining, stream_len)?,
                markers::SOS if scan.frame.is_some() => {
                    debug!("Start of scan, no further metadata expected");
                    Step::Stop
                }
                _ => Step::Continue,
            };
            if let Step::Stop = step {
                break;
            }

            let next = segment_start + remaining;
            if next > stream_len {
                warn!("{} segment runs past the end of the stream", markers::name(marker));
                break;
            }
            reader.seek(SeekFrom::Start(next))?;

            if self.options.short_circuit() && scan.is_complete() {
                debug!("Dimensions and resolution known, stopping early");
                break;
            }
        }

        if scan.frame.is_none() {
            return Err(DecodeError::InvalidFormat("No frame header before end of stream".to_string()));
        }

        Ok(scan)
    }

    fn read_jfif(&self, reader: &mut dyn SeekableReader, scan: &mut JpegScan, start: u64, remaining: u64, stream_len: u64) -> DecodeResult<Step> {
        if remaining < markers::JFIF_PAYLOAD_SIZE {
            return Ok(Step::Continue);
        }
        let payload = match segment_bytes(reader, start, markers::JFIF_PAYLOAD_SIZE, stream_len)? {
            Some(payload) => payload,
            None => return Ok(Step::Stop),
        };
        if !payload.starts_with(signatures::JFIF) {
            trace!("APP0 segment is not JFIF");
            return Ok(Step::Continue);
        }

        let unit_code = payload[7];
        let x_density = u16::from_be_bytes([payload[8], payload[9]]);
        let y_density = u16::from_be_bytes([payload[10], payload[11]]);
        debug!("JFIF {}.{:02}, unit {}, density {}x{}", payload[5], payload[6], unit_code, x_density, y_density);

        // Unit 0 only gives the pixel aspect ratio
        if unit_code != 0 && scan.jfif == RawResolution::default() {
            let unit = ResolutionUnit::from_jfif(unit_code);
            let axis = |density: u16| (density > 0).then(|| AxisResolution::new(density as f64, unit));
            scan.jfif = RawResolution { horizontal: axis(x_density), vertical: axis(y_density) };
        }

        Ok(Step::Continue)
    }

    fn read_app1(&self, reader: &mut dyn SeekableReader, scan: &mut JpegScan, start: u64, remaining: u64, stream_len: u64) -> DecodeResult<Step> {
        let probe_len = remaining.min(signatures::XMP.len() as u64);
        let probe = match segment_bytes(reader, start, probe_len, stream_len)? {
            Some(probe) => probe,
            None => return Ok(Step::Stop),
        };

        if probe.starts_with(header::EXIF_SIGNATURE) {
            let registry = self.options.registry();
            let segment = TiffDirectoryDecoder::new(registry)
                .with_max_ifd_hops(self.options.max_ifd_hops)
                .decode(reader, start + header::EXIF_SIGNATURE.len() as u64, stream_len)?;

            scan.tags.merge(segment.tags);
            scan.exif = RawResolution::from_exif(&scan.tags);
            scan.exif_iptc = scan.exif_iptc.take().or(segment.iptc);
            scan.exif_xmp = scan.exif_xmp.take().or(segment.xmp);
        } else if probe.starts_with(signatures::XMP) && scan.xmp.is_none() {
            let body_start = start + signatures::XMP.len() as u64;
            let body_len = remaining - signatures::XMP.len() as u64;
            if let Some(body) = segment_bytes(reader, body_start, body_len, stream_len)? {
                debug!("XMP packet of {} bytes", body.len());
                scan.xmp = Some(XmpPacket::from_bytes(&body));
            }
        } else {
            trace!("Unrecognized APP1 payload");
        }

        Ok(Step::Continue)
    }

    fn read_photoshop(&self, reader: &mut dyn SeekableReader, scan: &mut JpegScan, start: u64, remaining: u64, stream_len: u64) -> DecodeResult<Step> {
        if scan.iptc.is_some() {
            return Ok(Step::Continue);
        }
        if let Some(body) = segment_bytes(reader, start, remaining, stream_len)? {
            scan.iptc = IptcRecords::from_photoshop(&body);
            if let Some(records) = &scan.iptc {
                debug!("APP13 carries {} IPTC datasets", records.len());
            }
        }
        Ok(Step::Continue)
    }

    fn read_frame(&self, reader: &mut dyn SeekableReader, scan: &mut JpegScan, start: u64, remaining: u64, stream_len: u64) -> DecodeResult<Step> {
        if scan.frame.is_some() || remaining < markers::FRAME_HEADER_SIZE {
            return Ok(Step::Continue);
        }
        let header = match segment_bytes(reader, start, markers::FRAME_HEADER_SIZE, stream_len)? {
            Some(header) => header,
            None => return Ok(Step::Stop),
        };

        let height = u16::from_be_bytes([header[1], header[2]]) as u32;
        let width = u16::from_be_bytes([header[3], header[4]]) as u32;
        debug!("Frame {}x{}, {}-bit precision", width, height, header[0]);

        scan.frame = Some((width, height));
        Ok(Step::Continue)
    }
}

/// Reads `length` bytes of a segment, `None` if they run past the stream
fn segment_bytes(reader: &mut dyn SeekableReader, start: u64, length: u64, stream_len: u64) -> DecodeResult<Option<Vec<u8>>> {
    if start.saturating_add(length) > stream_len {
        warn!("Segment payload at {} runs past the end of the stream", start);
        return Ok(None);
    }
    let length = usize::try_from(length).map_err(|_| "Segment too large".to_string())?;
    read_bytes_at(reader, start, length, stream_len).map(Some)
}

fn read_byte(reader: &mut dyn SeekableReader) -> DecodeResult<Option<u8>> {
    let mut byte = [0u8; 1];
    match reader.read_exact(&mut byte) {
        Ok(()) => Ok(Some(byte[0])),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Finds the next marker code, skipping fill bytes and stuffed zeros
///
/// Returns `None` at the end of the stream.
fn next_marker(reader: &mut dyn SeekableReader) -> DecodeResult<Option<u8>> {
    loop {
        match read_byte(reader)? {
            None => return Ok(None),
            Some(markers::MARKER_PREFIX) => {}
            Some(_) => continue,
        }

        // Any run of 0xFF is fill
        let mut code = markers::MARKER_PREFIX;
        while code == markers::MARKER_PREFIX {
            code = match read_byte(reader)? {
                Some(code) => code,
                None => return Ok(None),
            };
        }

        if code != markers::STUFFED_ZERO {
            return Ok(Some(code));
        }
    }
}
