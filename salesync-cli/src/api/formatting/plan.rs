//! Derive the styling batch for a freshly written report
//!
//! The batch is applied atomically by the API and banded ranges may not
//! overlap, so removals of stale bandings are always emitted before the new
//! banding.

use log::debug;

use super::operation::{BandingProperties, FormattingOp, RgbColor};
use crate::api::models::{BandedRangeInfo, GridRange};
use crate::report::ReportShape;

/// Colors used for borders and banding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub header: RgbColor,
    pub first_band: RgbColor,
    pub second_band: RgbColor,
    pub border: RgbColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            header: RgbColor::new(0.85, 0.9, 0.95),
            first_band: RgbColor::new(0.94, 0.94, 0.94),
            second_band: RgbColor::WHITE,
            border: RgbColor::BLACK,
        }
    }
}

impl Palette {
    pub fn banding(&self) -> BandingProperties {
        BandingProperties {
            header_color: self.header,
            first_band_color: self.first_band,
            second_band_color: self.second_band,
        }
    }
}

/// Where the report was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetTarget {
    pub sheet_id: i32,
    /// 0-based row of the anchor cell
    pub anchor_row: u32,
    /// 0-based column of the anchor cell
    pub anchor_col: u32,
}

impl SheetTarget {
    /// Anchored at `A1`
    pub fn at_origin(sheet_id: i32) -> Self {
        Self {
            sheet_id,
            anchor_row: 0,
            anchor_col: 0,
        }
    }
}

/// Ordered styling operations for one report tab
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormattingPlan {
    ops: Vec<FormattingOp>,
}

impl FormattingPlan {
    /// Build the plan: stale-banding removals, then borders, then banding
    ///
    /// `existing` may hold bandings from any tab; only those on the target tab
    /// overlapping the written rectangle are removed.
    pub fn build(
        shape: &ReportShape,
        target: &SheetTarget,
        existing: &[BandedRangeInfo],
        palette: &Palette,
    ) -> Self {
        let mut ops = Vec::new();
        if shape.total_rows == 0 {
            return Self { ops };
        }

        let rows_end = target.anchor_row + shape.total_rows;
        let cols = target.anchor_col..target.anchor_col + shape.width;
        let written = GridRange::bounded(target.sheet_id, target.anchor_row..rows_end, cols.clone());

        for banding in existing.iter().filter(|b| b.range.overlaps(&written)) {
            debug!(
                "Removing stale banding {} on sheet {}",
                banding.banded_range_id, target.sheet_id
            );
            ops.push(FormattingOp::delete_banding(banding.banded_range_id));
        }

        // Borders and banding both cover the header and data rows, not the banner
        let body_start = target.anchor_row + shape.banner_rows.min(shape.total_rows);
        if body_start < rows_end {
            let body = GridRange::bounded(target.sheet_id, body_start..rows_end, cols);
            ops.push(FormattingOp::solid_borders(body, palette.border));
            ops.push(FormattingOp::add_banding(body, palette.banding()));
        }

        Self { ops }
    }

    pub fn ops(&self) -> &[FormattingOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn removal_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, FormattingOp::DeleteBanding { .. }))
            .count()
    }
}
