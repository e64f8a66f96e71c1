//! Fixture builders shared by the integration tests

#![allow(dead_code)]

use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

const EXIF_IFD_POINTER: u16 = 0x8769;
const GPS_IFD_POINTER: u16 = 0x8825;

/// One field before layout
#[derive(Debug, Clone)]
struct Field {
    tag: u16,
    wire_type: u16,
    count: u32,
    data: Vec<u8>,
}

/// Builds a TIFF structure with an IFD0, an Exif sub-IFD and a GPS sub-IFD
pub struct ExifBuilder {
    big_endian: bool,
    ifd0: Vec<Field>,
    exif: Vec<Field>,
    gps: Vec<Field>,
}

#[derive(Debug, Clone, Copy)]
pub enum Directory {
    Ifd0,
    Exif,
    Gps,
}

impl ExifBuilder {
    pub fn little_endian() -> Self {
        ExifBuilder { big_endian: false, ifd0: Vec::new(), exif: Vec::new(), gps: Vec::new() }
    }

    pub fn big_endian() -> Self {
        ExifBuilder { big_endian: true, ..Self::little_endian() }
    }

    fn put_u16(&self, out: &mut Vec<u8>, value: u16) {
        if self.big_endian {
            out.write_u16::<BigEndian>(value).unwrap();
        } else {
            out.write_u16::<LittleEndian>(value).unwrap();
        }
    }

    fn put_u32(&self, out: &mut Vec<u8>, value: u32) {
        if self.big_endian {
            out.write_u32::<BigEndian>(value).unwrap();
        } else {
            out.write_u32::<LittleEndian>(value).unwrap();
        }
    }

    fn push(mut self, directory: Directory, field: Field) -> Self {
        match directory {
            Directory::Ifd0 => self.ifd0.push(field),
            Directory::Exif => self.exif.push(field),
            Directory::Gps => self.gps.push(field),
        }
        self
    }

    pub fn short(self, directory: Directory, tag: u16, value: u16) -> Self {
        let mut data = Vec::new();
        self.put_u16(&mut data, value);
        self.push(directory, Field { tag, wire_type: 3, count: 1, data })
    }

    pub fn long(self, directory: Directory, tag: u16, value: u32) -> Self {
        let mut data = Vec::new();
        self.put_u32(&mut data, value);
        self.push(directory, Field { tag, wire_type: 4, count: 1, data })
    }

    pub fn ascii(self, directory: Directory, tag: u16, text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        let count = data.len() as u32;
        self.push(directory, Field { tag, wire_type: 2, count, data })
    }

    pub fn rationals(self, directory: Directory, tag: u16, values: &[(u32, u32)]) -> Self {
        let mut data = Vec::new();
        for &(numerator, denominator) in values {
            self.put_u32(&mut data, numerator);
            self.put_u32(&mut data, denominator);
        }
        self.push(directory, Field { tag, wire_type: 5, count: values.len() as u32, data })
    }

    pub fn rational(self, directory: Directory, tag: u16, numerator: u32, denominator: u32) -> Self {
        self.rationals(directory, tag, &[(numerator, denominator)])
    }

    /// XResolution, YResolution and ResolutionUnit in IFD0
    pub fn resolution(self, x: (u32, u32), y: (u32, u32), unit: u16) -> Self {
        self.rational(Directory::Ifd0, 0x011A, x.0, x.1)
            .rational(Directory::Ifd0, 0x011B, y.0, y.1)
            .short(Directory::Ifd0, 0x0128, unit)
    }

    /// TIFF bytes, header first
    pub fn build(&self) -> Vec<u8> {
        let dir_size = |fields: usize| 2 + 12 * fields as u32 + 4;

        let mut ifd0 = self.ifd0.clone();
        let exif_count = self.exif.len();
        let gps_count = self.gps.len();
        let pointers = (exif_count > 0) as usize + (gps_count > 0) as usize;

        let ifd0_offset = 8u32;
        let exif_offset = ifd0_offset + dir_size(ifd0.len() + pointers);
        let gps_offset = exif_offset + if exif_count > 0 { dir_size(exif_count) } else { 0 };
        let data_offset = gps_offset + if gps_count > 0 { dir_size(gps_count) } else { 0 };

        let pointer = |tag, offset| {
            let mut data = Vec::new();
            self.put_u32(&mut data, offset);
            Field { tag, wire_type: 4, count: 1, data }
        };
        if exif_count > 0 {
            ifd0.push(pointer(EXIF_IFD_POINTER, exif_offset));
        }
        if gps_count > 0 {
            ifd0.push(pointer(GPS_IFD_POINTER, gps_offset));
        }

        let mut out = Vec::new();
        out.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        self.put_u16(&mut out, 42);
        self.put_u32(&mut out, ifd0_offset);

        let mut blob = Vec::new();
        for fields in [&ifd0, &self.exif, &self.gps] {
            if fields.is_empty() {
                continue;
            }
            self.put_u16(&mut out, fields.len() as u16);
            for field in fields.iter() {
                self.put_u16(&mut out, field.tag);
                self.put_u16(&mut out, field.wire_type);
                self.put_u32(&mut out, field.count);
                if field.data.len() <= 4 {
                    let mut slot = field.data.clone();
                    slot.resize(4, 0);
                    out.extend_from_slice(&slot);
                } else {
                    self.put_u32(&mut out, data_offset + blob.len() as u32);
                    blob.extend_from_slice(&field.data);
                    if blob.len() % 2 == 1 {
                        blob.push(0);
                    }
                }
            }
            self.put_u32(&mut out, 0);
        }

        out.extend_from_slice(&blob);
        out
    }

    /// APP1 segment carrying the structure
    pub fn app1(&self) -> Vec<u8> {
        let mut payload = b"Exif\0\0".to_vec();
        payload.extend(self.build());
        segment(0xE1, &payload)
    }
}

/// Marker, big-endian length and payload
pub fn segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0xFF, marker];
    bytes.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

pub fn jfif_segment(unit: u8, x: u16, y: u16) -> Vec<u8> {
    let mut payload = b"JFIF\0\x01\x01".to_vec();
    payload.push(unit);
    payload.extend_from_slice(&x.to_be_bytes());
    payload.extend_from_slice(&y.to_be_bytes());
    payload.extend_from_slice(&[0, 0]);
    segment(0xE0, &payload)
}

/// Baseline frame header from raw height and width bytes
pub fn sof0_segment(height: [u8; 2], width: [u8; 2]) -> Vec<u8> {
    segment(0xC0, &[8, height[0], height[1], width[0], width[1], 1, 1, 0x11, 0])
}

/// SOI, the given segments, EOI
pub fn jpeg_from_segments(segments: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    for s in segments {
        bytes.extend_from_slice(s);
    }
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

/// Inserts a segment directly after SOI
pub fn insert_after_soi(jpeg: &[u8], segment: &[u8]) -> Vec<u8> {
    let mut bytes = jpeg[..2].to_vec();
    bytes.extend_from_slice(segment);
    bytes.extend_from_slice(&jpeg[2..]);
    bytes
}

fn gradient(width: u32, height: u32) -> Vec<u8> {
    (0..width * height).flat_map(|i| [(i % 251) as u8, (i % 13) as u8, 128]).collect()
}

/// Real baseline JPEG from the `image` encoder
pub fn encoded_jpeg(width: u32, height: u32, dpi: Option<u16>) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, 85);
    if let Some(dpi) = dpi {
        encoder.set_pixel_density(PixelDensity::dpi(dpi));
    }
    encoder.write_image(&gradient(width, height), width, height, ExtendedColorType::Rgb8).unwrap();
    buffer.into_inner()
}

/// Real PNG from the `image` encoder
pub fn encoded_png(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(&gradient(width, height), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buffer
}

/// PNG chunk with a zero CRC
pub fn png_chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut bytes = (data.len() as u32).to_be_bytes().to_vec();
    bytes.extend_from_slice(chunk_type);
    bytes.extend_from_slice(data);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes
}

/// Inserts a chunk after the IHDR chunk
pub fn insert_after_ihdr(png: &[u8], chunk: &[u8]) -> Vec<u8> {
    let ihdr_end = 8 + 8 + 13 + 4;
    let mut bytes = png[..ihdr_end].to_vec();
    bytes.extend_from_slice(chunk);
    bytes.extend_from_slice(&png[ihdr_end..]);
    bytes
}
