//! PNG decoding
//!
//! Walks the chunk list up to the image data. IHDR gives the dimensions,
//! pHYs the density, eXIf an embedded TIFF structure and an iTXt chunk with
//! the Adobe keyword the XMP packet. CRCs are not checked.

use std::io::{Read, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use log::{debug, info, trace, warn};

use crate::details::{ImageDetails, Metadata};
use crate::errors::{DecodeError, DecodeResult};
use crate::format::{ImageDecoder, ImageFormat};
use crate::io::seekable::{ensure_within, read_bytes_at, stream_len, SeekableReader};
use crate::metadata::{IptcRecords, XmpPacket};
use crate::options::DecodeOptions;
use crate::tiff::constants::header;
use crate::tiff::reader::{check_exif_signature, TiffDirectoryDecoder};
use crate::tiff::resolution::{AxisResolution, RawResolution, ResolutionUnit};

pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub mod chunk_types {
    pub const IHDR: [u8; 4] = *b"IHDR";
    pub const PHYS: [u8; 4] = *b"pHYs";
    pub const EXIF: [u8; 4] = *b"eXIf";
    pub const ITXT: [u8; 4] = *b"iTXt";
    pub const IDAT: [u8; 4] = *b"IDAT";
    pub const IEND: [u8; 4] = *b"IEND";
}

/// Length and type fields preceding chunk data
const CHUNK_HEADER_SIZE: u64 = 8;
const CRC_SIZE: u64 = 4;
const IHDR_SIZE: u64 = 13;
const PHYS_SIZE: u64 = 9;

const XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp";

/// Upper bound on an inflated XMP packet
const MAX_INFLATED_XMP: u64 = 16 * 1024 * 1024;

/// Type and position of one chunk
#[derive(Debug, Clone, Copy)]
struct ChunkHeader {
    chunk_type: [u8; 4],
    data_start: u64,
    length: u64,
}

impl ChunkHeader {
    fn name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }

    fn next(&self) -> u64 {
        self.data_start + self.length + CRC_SIZE
    }
}

/// Decoder for PNG streams
#[derive(Debug, Default, Clone, Copy)]
pub struct PngDecoder;

impl ImageDecoder for PngDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn detect_format(&self, reader: &mut dyn SeekableReader) -> DecodeResult<bool> {
        let len = stream_len(reader)?;
        if len < SIGNATURE.len() as u64 {
            return Ok(false);
        }
        let magic = read_bytes_at(reader, 0, SIGNATURE.len(), len)?;
        Ok(magic == SIGNATURE)
    }

    fn decode(&self, reader: &mut dyn SeekableReader, options: &DecodeOptions) -> DecodeResult<Metadata> {
        let len = stream_len(reader)?;
        if !self.detect_format(reader)? {
            return Err(DecodeError::InvalidFormat("Missing PNG signature".to_string()));
        }

        let mut metadata = Metadata::new(ImageFormat::Png, ImageDetails {
            width: 0,
            height: 0,
            horizontal_dpi: options.default_dpi,
            vertical_dpi: options.default_dpi,
            mime_type: ImageFormat::Png.mime_type(),
        });
        let mut physical = RawResolution::default();
        let mut exif = RawResolution::default();
        let mut exif_iptc = None;
        let mut exif_xmp = None;
        let mut dimensions = None;

        let mut position = SIGNATURE.len() as u64;
        while let Some(chunk) = read_chunk_header(reader, position, len)? {
            trace!("{} chunk at {}, {} bytes", chunk.name(), chunk.data_start, chunk.length);

            if dimensions.is_none() && chunk.chunk_type != chunk_types::IHDR {
                return Err(DecodeError::InvalidFormat(format!("First chunk is {} instead of IHDR", chunk.name())));
            }

            match chunk.chunk_type {
                chunk_types::IHDR => {
                    if chunk.length < IHDR_SIZE {
                        return Err(DecodeError::InvalidFormat(format!("IHDR chunk of {} bytes", chunk.length)));
                    }
                    let width = reader.read_u32::<BigEndian>()?;
                    let height = reader.read_u32::<BigEndian>()?;
                    debug!("IHDR {}x{}", width, height);
                    dimensions = Some((width, height));
                }
                chunk_types::PHYS if chunk.length >= PHYS_SIZE => {
                    let x = reader.read_u32::<BigEndian>()?;
                    let y = reader.read_u32::<BigEndian>()?;
                    let unit = reader.read_u8()?;
                    debug!("pHYs {}x{} per unit {}", x, y, unit);
                    if let Some(unit) = ResolutionUnit::from_png(unit) {
                        let axis = |value: u32| (value > 0).then(|| AxisResolution::new(value as f64, unit));
                        physical = RawResolution { horizontal: axis(x), vertical: axis(y) };
                    }
                }
                chunk_types::EXIF => {
                    let mut tiff_start = chunk.data_start;
                    if check_exif_signature(reader, tiff_start, len)? {
                        tiff_start += header::EXIF_SIGNATURE.len() as u64;
                    }
                    let segment = TiffDirectoryDecoder::new(options.registry())
                        .with_max_ifd_hops(options.max_ifd_hops)
                        .decode(reader, tiff_start, len)?;
                    metadata.tags.merge(segment.tags);
                    exif = RawResolution::from_exif(&metadata.tags);
                    exif_iptc = exif_iptc.or(segment.iptc);
                    exif_xmp = exif_xmp.or(segment.xmp);
                }
                chunk_types::ITXT if metadata.xmp.is_none() => {
                    let data = read_bytes_at(reader, chunk.data_start, to_usize(chunk.length)?, len)?;
                    metadata.xmp = xmp_from_itxt(&data);
                }
                chunk_types::IDAT if options.short_circuit() => {
                    debug!("Image data reached, stopping");
                    break;
                }
                chunk_types::IEND => break,
                _ => {}
            }

            position = chunk.next();
        }

        let (width, height) = dimensions
            .ok_or_else(|| DecodeError::InvalidFormat("PNG stream has no IHDR chunk".to_string()))?;
        let (horizontal_dpi, vertical_dpi) = physical.or(exif).to_dpi(options.default_dpi);
        metadata.details = ImageDetails { width, height, horizontal_dpi, vertical_dpi, ..metadata.details };
        metadata.iptc = exif_iptc.as_deref().map(IptcRecords::parse);
        if metadata.xmp.is_none() {
            metadata.xmp = exif_xmp.as_deref().map(XmpPacket::from_bytes);
        }

        info!("PNG: {}", metadata.details);
        Ok(metadata)
    }
}

/// Reads the chunk header at `position`, leaving the cursor at its data
///
/// Returns `None` at the end of the stream or when the chunk does not fit.
fn read_chunk_header(reader: &mut dyn SeekableReader, position: u64, stream_len: u64) -> DecodeResult<Option<ChunkHeader>> {
    if position + CHUNK_HEADER_SIZE > stream_len {
        if position < stream_len {
            warn!("Trailing {} bytes after the last chunk", stream_len - position);
        }
        return Ok(None);
    }

    reader.seek(SeekFrom::Start(position))?;
    let length = reader.read_u32::<BigEndian>()? as u64;
    let mut chunk_type = [0u8; 4];
    reader.read_exact(&mut chunk_type)?;

    let chunk = ChunkHeader { chunk_type, data_start: position + CHUNK_HEADER_SIZE, length };
    if let Err(e) = ensure_within(chunk.data_start, length, stream_len) {
        warn!("{} chunk is truncated: {}", chunk.name(), e);
        return Ok(None);
    }
    Ok(Some(chunk))
}

fn to_usize(length: u64) -> DecodeResult<usize> {
    usize::try_from(length).map_err(|_| DecodeError::InvalidFormat(format!("Chunk of {} bytes", length)))
}

fn split_nul(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let end = data.iter().position(|&b| b == 0)?;
    Some((&data[..end], &data[end + 1..]))
}

/// XMP packet of an iTXt chunk, if it carries one
///
/// Layout: keyword NUL, compression flag, method, language NUL,
/// translated keyword NUL, text.
fn xmp_from_itxt(data: &[u8]) -> Option<XmpPacket> {
    let (keyword, rest) = split_nul(data)?;
    if keyword != XMP_KEYWORD {
        trace!("iTXt keyword {}", String::from_utf8_lossy(keyword));
        return None;
    }

    let (&compressed, rest) = rest.split_first()?;
    let (_method, rest) = rest.split_first()?;
    let (_language, rest) = split_nul(rest)?;
    let (_translated, text) = split_nul(rest)?;

    if compressed == 0 {
        return Some(XmpPacket::from_bytes(text));
    }

    let mut inflated = Vec::new();
    match ZlibDecoder::new(text).take(MAX_INFLATED_XMP).read_to_end(&mut inflated) {
        Ok(_) => Some(XmpPacket::from_bytes(&inflated)),
        Err(e) => {
            warn!("Cannot inflate XMP packet: {}", e);
            None
        }
    }
}
