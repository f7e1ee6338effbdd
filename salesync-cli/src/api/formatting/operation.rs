//! Styling requests sent through the Sheets `batchUpdate` endpoint
//!
//! Each [`FormattingOp`] serializes to exactly one entry of the
//! `requests` array, e.g. `{"deleteBanding": {"bandedRangeId": 7}}`.

use serde::{Deserialize, Serialize};

use crate::api::models::GridRange;

/// RGB color with channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl RgbColor {
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    pub const BLACK: RgbColor = RgbColor::new(0.0, 0.0, 0.0);
    pub const WHITE: RgbColor = RgbColor::new(1.0, 1.0, 1.0);

    /// Pack into `0xRRGGBB` (local xlsx export)
    pub fn to_hex(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.red) << 16) | (channel(self.green) << 8) | channel(self.blue)
    }
}

impl From<[f32; 3]> for RgbColor {
    fn from(c: [f32; 3]) -> Self {
        RgbColor::new(c[0], c[1], c[2])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorderStyle {
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub style: BorderStyle,
    pub color: RgbColor,
}

impl Border {
    pub fn solid(color: RgbColor) -> Self {
        Self {
            style: BorderStyle::Solid,
            color,
        }
    }
}

/// Colors of an alternating-row banding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandingProperties {
    pub header_color: RgbColor,
    pub first_band_color: RgbColor,
    pub second_band_color: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandedRangeSpec {
    pub range: GridRange,
    pub row_properties: BandingProperties,
}

/// One declarative styling instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FormattingOp {
    /// Remove an existing banding by id
    DeleteBanding { banded_range_id: i32 },
    /// Draw the outer edges of a range in one request
    UpdateBorders {
        range: GridRange,
        top: Border,
        bottom: Border,
        left: Border,
        right: Border,
    },
    /// Add alternating-row colors to a range
    AddBanding { banded_range: BandedRangeSpec },
}

impl FormattingOp {
    /// Uniform solid border on the four outer edges of `range`
    pub fn solid_borders(range: GridRange, color: RgbColor) -> Self {
        let border = Border::solid(color);
        Self::UpdateBorders {
            range,
            top: border,
            bottom: border,
            left: border,
            right: border,
        }
    }

    pub fn add_banding(range: GridRange, row_properties: BandingProperties) -> Self {
        Self::AddBanding {
            banded_range: BandedRangeSpec {
                range,
                row_properties,
            },
        }
    }

    pub fn delete_banding(banded_range_id: i32) -> Self {
        Self::DeleteBanding { banded_range_id }
    }

    /// Request type name as used by the API
    pub fn request_type(&self) -> &'static str {
        match self {
            Self::DeleteBanding { .. } => "deleteBanding",
            Self::UpdateBorders { .. } => "updateBorders",
            Self::AddBanding { .. } => "addBanding",
        }
    }
}
