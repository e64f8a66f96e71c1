//! Resolution units and DPI conversion
//!
//! JFIF, EXIF and PNG each express pixel density with their own unit codes.
//! Densities are collected per axis as raw values and only turned into
//! integer DPI once every source has been considered.

use log::trace;

use crate::tiff::collection::TagCollection;
use crate::tiff::constants::{resolution_unit, tags as tag_ids};
use crate::tiff::types::MetadataProfile;

/// DPI reported when an image carries no usable resolution
pub const DEFAULT_DPI: i32 = 96;

const INCHES_PER_CENTIMETER: f64 = 0.393701;
const INCHES_PER_METER: f64 = 39.3701;

/// Unit of a raw density value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionUnit {
    Inch,
    Centimeter,
    Meter,
}

impl ResolutionUnit {
    /// EXIF ResolutionUnit: 3 is centimeters, anything else inches
    pub fn from_exif(code: u32) -> Self {
        if code == resolution_unit::CENTIMETER as u32 {
            ResolutionUnit::Centimeter
        } else {
            ResolutionUnit::Inch
        }
    }

    /// JFIF density unit: 2 is centimeters, anything else inches
    pub fn from_jfif(code: u8) -> Self {
        if code == 2 {
            ResolutionUnit::Centimeter
        } else {
            ResolutionUnit::Inch
        }
    }

    /// PNG pHYs unit: 1 is meters; 0 has no unit
    pub fn from_png(code: u8) -> Option<Self> {
        if code == 1 {
            Some(ResolutionUnit::Meter)
        } else {
            None
        }
    }

    /// Converts a density in this unit to dots per inch
    pub fn to_dpi(self, value: f64) -> f64 {
        match self {
            ResolutionUnit::Inch => value,
            ResolutionUnit::Centimeter => value / INCHES_PER_CENTIMETER,
            ResolutionUnit::Meter => value / INCHES_PER_METER,
        }
    }
}

/// Density of one axis, as read from the file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisResolution {
    pub value: f64,
    pub unit: ResolutionUnit,
}

impl AxisResolution {
    pub fn new(value: f64, unit: ResolutionUnit) -> Self {
        AxisResolution { value, unit }
    }

    /// Integer DPI, or `default` when the value is unusable
    ///
    /// A raw value of exactly 1 means "unset" in every unit.
    pub fn to_dpi(&self, default: i32) -> i32 {
        if !self.value.is_finite() || self.value <= 0.0 || self.value == 1.0 {
            return default;
        }

        let dpi = self.unit.to_dpi(self.value).round();
        if dpi < 1.0 || dpi > i32::MAX as f64 {
            default
        } else {
            dpi as i32
        }
    }
}

/// Horizontal and vertical density, each possibly absent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawResolution {
    pub horizontal: Option<AxisResolution>,
    pub vertical: Option<AxisResolution>,
}

impl RawResolution {
    /// Reads XResolution, YResolution and ResolutionUnit from EXIF tags
    ///
    /// A rational with a zero denominator counts as absent.
    pub fn from_exif(tags: &TagCollection) -> Self {
        let unit = tags.get(MetadataProfile::Exif, tag_ids::RESOLUTION_UNIT)
            .and_then(|v| v.as_u32())
            .map_or(ResolutionUnit::Inch, ResolutionUnit::from_exif);

        let axis = |tag| {
            tags.get(MetadataProfile::Exif, tag)
                .and_then(|v| v.as_f64())
                .map(|value| AxisResolution::new(value, unit))
        };

        let resolution = RawResolution {
            horizontal: axis(tag_ids::X_RESOLUTION),
            vertical: axis(tag_ids::Y_RESOLUTION),
        };
        trace!("EXIF resolution: {:?}", resolution);
        resolution
    }

    /// Whether both axes are known and positive
    pub fn is_complete(&self) -> bool {
        let known = |axis: Option<AxisResolution>| axis.is_some_and(|a| a.value > 0.0);
        known(self.horizontal) && known(self.vertical)
    }

    /// Fills each absent axis from `other`, keeping values already present
    pub fn or(self, other: RawResolution) -> RawResolution {
        RawResolution {
            horizontal: self.horizontal.or(other.horizontal),
            vertical: self.vertical.or(other.vertical),
        }
    }

    /// Final `(horizontal, vertical)` DPI
    pub fn to_dpi(&self, default: i32) -> (i32, i32) {
        let axis = |a: Option<AxisResolution>| a.map_or(default, |a| a.to_dpi(default));
        (axis(self.horizontal), axis(self.vertical))
    }
}
