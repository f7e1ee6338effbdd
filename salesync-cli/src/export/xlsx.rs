//! Excel rendering of a report row set
//!
//! Follows the remote styling: bold banner, tinted header, alternating band
//! fills and thin cell borders on every row below the banner.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};

use crate::api::formatting::{Palette, RgbColor};
use crate::report::{ReportRow, ReportRowSet};

pub const DEFAULT_SHEET_NAME: &str = "Report";

/// Write `rows` to a new workbook at `path`
pub fn export_report_to_excel(
    rows: &ReportRowSet,
    palette: &Palette,
    sheet_name: &str,
    path: &Path,
) -> Result<()> {
    let bytes = report_to_xlsx_bytes(rows, palette, sheet_name)?;
    fs::write(path, bytes)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    log::info!("Report exported to: {}", path.display());
    Ok(())
}

/// Render the workbook in memory
pub fn report_to_xlsx_bytes(rows: &ReportRowSet, palette: &Palette, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(rows, palette, sheet_name)?;
    workbook
        .save_to_buffer()
        .context("Failed to render Excel workbook")
}

fn build_workbook(rows: &ReportRowSet, palette: &Palette, sheet_name: &str) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(sheet_name)
        .with_context(|| format!("Invalid worksheet name: {}", sheet_name))?;

    write_rows(sheet, rows, palette)?;
    sheet.autofit();
    Ok(workbook)
}

fn color(rgb: RgbColor) -> Color {
    Color::RGB(rgb.to_hex())
}

fn cell_format(palette: &Palette, fill: RgbColor) -> Format {
    Format::new()
        .set_background_color(color(fill))
        .set_border(FormatBorder::Thin)
        .set_border_color(color(palette.border))
}

fn write_rows(sheet: &mut Worksheet, rows: &ReportRowSet, palette: &Palette) -> Result<()> {
    let banner_format = Format::new().set_bold().set_font_size(12);
    let header_format = cell_format(palette, palette.header).set_bold();
    let bands = [
        cell_format(palette, palette.first_band),
        cell_format(palette, palette.second_band),
    ];

    // Band index counts from the first row after the header, as the remote banding does
    let mut band = 0usize;
    for (index, row) in rows.rows().iter().enumerate() {
        let r = index as u32;
        match row {
            ReportRow::Banner(text) => {
                sheet.write_string_with_format(r, 0, text, &banner_format)?;
            }
            ReportRow::Header => {
                for (col, value) in row.to_strings().iter().enumerate() {
                    sheet.write_string_with_format(r, col as u16, value, &header_format)?;
                }
            }
            ReportRow::Data {
                name,
                category,
                sold,
            } => {
                let format = &bands[band % 2];
                sheet.write_string_with_format(r, 0, name, format)?;
                sheet.write_string_with_format(r, 1, category, format)?;
                sheet.write_number_with_format(r, 2, *sold as f64, format)?;
                band += 1;
            }
            ReportRow::Separator => {
                let format = &bands[band % 2];
                for col in 0..3 {
                    sheet.write_blank(r, col, format)?;
                }
                band += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportBuilder;
    use crate::report::aggregate::CategoryGroup;
    use crate::report::resolver::ResolvedItem;
    use calamine::{Data, Reader, open_workbook_auto_from_rs};
    use std::io::Cursor;

    fn sample_rows() -> ReportRowSet {
        let groups = vec![
            CategoryGroup {
                category: "Drinks".to_string(),
                items: vec![
                    ResolvedItem::new("B", "Drinks", 10),
                    ResolvedItem::new("A", "Drinks", 5),
                ],
            },
            CategoryGroup {
                category: "Snacks".to_string(),
                items: vec![ResolvedItem::new("C", "Snacks", 3)],
            },
        ];
        ReportBuilder::new()
            .with_banner("2026-10-17 09:00:00")
            .build(&groups)
    }

    #[test]
    fn test_xlsx_export_contents() {
        let bytes = report_to_xlsx_bytes(&sample_rows(), &Palette::default(), "Rockwell").unwrap();

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Rockwell".to_string()]);
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();

        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("Processed at 2026-10-17 09:00:00".to_string()))
        );
        assert_eq!(
            range.get_value((1, 2)),
            Some(&Data::String("Total Items Sold".to_string()))
        );
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("B".to_string())));
        assert_eq!(range.get_value((2, 2)), Some(&Data::Float(10.0)));
        assert_eq!(range.get_value((5, 0)), Some(&Data::String("C".to_string())));
    }

    #[test]
    fn test_invalid_sheet_name_is_rejected() {
        let err = report_to_xlsx_bytes(&sample_rows(), &Palette::default(), "bad[name]");
        assert!(err.is_err());
    }

    #[test]
    fn test_export_writes_file() {
        let path = std::env::temp_dir().join(format!("salesync-{}.xlsx", uuid::Uuid::new_v4()));
        export_report_to_excel(&sample_rows(), &Palette::default(), DEFAULT_SHEET_NAME, &path)
            .unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
