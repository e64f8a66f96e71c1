//! IPTC-IIM records
//!
//! IPTC data is a flat list of datasets, each introduced by a `0x1C` tag
//! marker, a record number, a dataset number and a big-endian length. JPEG
//! files carry it inside a Photoshop APP13 segment as 8BIM resource 0x0404;
//! TIFF structures point at it with the NAA tag.

use log::{debug, trace};
use serde::{Serialize, Serializer};

const TAG_MARKER: u8 = 0x1C;
const DATASET_HEADER_SIZE: usize = 5;
const EXTENDED_LENGTH_FLAG: u16 = 0x8000;

const PHOTOSHOP_SIGNATURE: &[u8] = b"Photoshop 3.0\0";
const RESOURCE_SIGNATURE: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

/// One IIM dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IptcDataset {
    pub record: u8,
    pub dataset: u8,
    pub data: Vec<u8>,
}

impl IptcDataset {
    /// Well-known name of an application record (record 2) dataset
    pub fn name(&self) -> Option<&'static str> {
        if self.record != 2 {
            return None;
        }
        let name = match self.dataset {
            0 => "ApplicationRecordVersion",
            5 => "ObjectName",
            7 => "EditStatus",
            10 => "Urgency",
            15 => "Category",
            20 => "SupplementalCategories",
            25 => "Keywords",
            40 => "SpecialInstructions",
            55 => "DateCreated",
            60 => "TimeCreated",
            80 => "By-line",
            85 => "By-lineTitle",
            90 => "City",
            92 => "Sub-location",
            95 => "Province-State",
            100 => "Country-PrimaryLocationCode",
            101 => "Country-PrimaryLocationName",
            103 => "OriginalTransmissionReference",
            105 => "Headline",
            110 => "Credit",
            115 => "Source",
            116 => "CopyrightNotice",
            118 => "Contact",
            120 => "Caption-Abstract",
            122 => "Writer-Editor",
            _ => return None,
        };
        Some(name)
    }

    /// Dataset payload as text
    pub fn value(&self) -> String {
        String::from_utf8_lossy(&self.data).trim_end_matches('\0').to_string()
    }
}

/// All datasets of an IPTC block, in stream order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IptcRecords {
    datasets: Vec<IptcDataset>,
}

impl IptcRecords {
    /// Parses raw IIM bytes
    ///
    /// Parsing stops at the first byte that is not a tag marker or at a
    /// dataset that runs past the end of the buffer.
    pub fn parse(data: &[u8]) -> Self {
        let mut datasets = Vec::new();
        let mut pos = 0;

        while pos + DATASET_HEADER_SIZE <= data.len() && data[pos] == TAG_MARKER {
            let record = data[pos + 1];
            let dataset = data[pos + 2];
            let length = u16::from_be_bytes([data[pos + 3], data[pos + 4]]);
            pos += DATASET_HEADER_SIZE;

            if length & EXTENDED_LENGTH_FLAG != 0 {
                // Extended dataset: the low bits give the size of the length field
                let size_len = (length & !EXTENDED_LENGTH_FLAG) as usize;
                let size = match data.get(pos..pos + size_len) {
                    Some(bytes) if size_len <= 8 => bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64),
                    _ => break,
                };
                trace!("Skipping extended IPTC dataset {}:{} of {} bytes", record, dataset, size);
                match usize::try_from(size).ok().and_then(|size| (pos + size_len).checked_add(size)) {
                    Some(next) if next <= data.len() => pos = next,
                    _ => break,
                }
                continue;
            }

            let end = pos + length as usize;
            if end > data.len() {
                debug!("IPTC dataset {}:{} is truncated", record, dataset);
                break;
            }

            datasets.push(IptcDataset { record, dataset, data: data[pos..end].to_vec() });
            pos = end;
        }

        debug!("Parsed {} IPTC datasets", datasets.len());
        IptcRecords { datasets }
    }

    /// Parses the IPTC resource of a Photoshop APP13 payload
    pub fn from_photoshop(segment: &[u8]) -> Option<Self> {
        photoshop_iptc(segment).map(Self::parse)
    }

    /// First dataset with the given numbers
    pub fn get(&self, record: u8, dataset: u8) -> Option<&IptcDataset> {
        self.datasets.iter().find(|d| d.record == record && d.dataset == dataset)
    }

    /// Every dataset with the given numbers, for repeatable fields
    pub fn get_all(&self, record: u8, dataset: u8) -> impl Iterator<Item = &IptcDataset> {
        self.datasets.iter().filter(move |d| d.record == record && d.dataset == dataset)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IptcDataset> {
        self.datasets.iter()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Locates the IPTC-NAA resource inside Photoshop image resource blocks
pub fn photoshop_iptc(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_SIGNATURE)?;
    let mut pos = 0;

    // "8BIM", id, even-padded Pascal name, length, even-padded data
    while pos + 4 <= data.len() && &data[pos..pos + 4] == RESOURCE_SIGNATURE {
        pos += 4;
        let id = u16::from_be_bytes(data.get(pos..pos + 2)?.try_into().ok()?);
        pos += 2;

        let name_len = *data.get(pos)? as usize;
        pos += (1 + name_len + 1) & !1;

        let size = u32::from_be_bytes(data.get(pos..pos + 4)?.try_into().ok()?) as usize;
        pos += 4;

        let body = data.get(pos..pos.checked_add(size)?)?;
        if id == IPTC_RESOURCE_ID {
            return Some(body);
        }
        pos += (size + 1) & !1;
    }

    None
}

#[derive(Serialize)]
struct DatasetView<'a> {
    record: u8,
    dataset: u8,
    name: Option<&'a str>,
    value: String,
}

impl Serialize for IptcRecords {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.datasets.iter().map(|d| DatasetView {
            record: d.record,
            dataset: d.dataset,
            name: d.name(),
            value: d.value(),
        }))
    }
}
