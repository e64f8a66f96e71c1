//! JPEG marker codes

/// Byte that introduces every marker
pub const MARKER_PREFIX: u8 = 0xFF;

/// Stuffed zero following a literal 0xFF in entropy-coded data
pub const STUFFED_ZERO: u8 = 0x00;

pub const TEM: u8 = 0x01;
pub const SOF0: u8 = 0xC0; // Baseline DCT
pub const SOF1: u8 = 0xC1; // Extended sequential DCT
pub const SOF2: u8 = 0xC2; // Progressive DCT
pub const RST0: u8 = 0xD0;
pub const RST7: u8 = 0xD7;
pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const DRI: u8 = 0xDD;
pub const APP0: u8 = 0xE0;
pub const APP1: u8 = 0xE1;
pub const APP13: u8 = 0xED;

/// Start of image as it appears at offset zero
pub const SOI_BYTES: [u8; 2] = [MARKER_PREFIX, SOI];

/// Signatures that open known application segments
pub mod signatures {
    pub const JFIF: &[u8] = b"JFIF\0";
    pub const XMP: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
}

/// Fixed part of a JFIF APP0 payload, signature included
pub const JFIF_PAYLOAD_SIZE: u64 = 13;

/// Precision, height and width of a frame header
pub const FRAME_HEADER_SIZE: u64 = 5;

/// Whether `marker` stands alone without a length field
pub fn is_standalone(marker: u8) -> bool {
    matches!(marker, SOI | EOI | TEM | RST0..=RST7)
}

/// Whether `marker` starts a frame whose dimensions are read
pub fn is_frame_start(marker: u8) -> bool {
    matches!(marker, SOF0 | SOF1 | SOF2)
}

/// Human readable marker name, for logs
pub fn name(marker: u8) -> &'static str {
    match marker {
        SOF0 => "SOF0",
        SOF1 => "SOF1",
        SOF2 => "SOF2",
        0xC4 => "DHT",
        RST0..=RST7 => "RST",
        SOI => "SOI",
        EOI => "EOI",
        SOS => "SOS",
        0xDB => "DQT",
        DRI => "DRI",
        APP0 => "APP0",
        APP1 => "APP1",
        APP13 => "APP13",
        0xE2..=0xEF => "APPn",
        0xFE => "COM",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standalone_markers() {
        for marker in [SOI, EOI, TEM, RST0, 0xD3, RST7] {
            assert!(is_standalone(marker), "{:#04x}", marker);
        }
        for marker in [DRI, SOS, APP0, SOF0] {
            assert!(!is_standalone(marker), "{:#04x}", marker);
        }
    }

    #[test]
    fn test_frame_start_markers() {
        assert!(is_frame_start(SOF0) && is_frame_start(SOF1) && is_frame_start(SOF2));
        assert!(!is_frame_start(0xC3));
        assert!(!is_frame_start(0xC4));
    }
}
