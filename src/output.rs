//! Output workbook writing.
//!
//! The resolved sheets are written with `rust_xlsxwriter` to a temporary
//! file next to the final destination, then renamed into place, so a crash
//! or disk-full never leaves a truncated workbook behind.

use crate::input::InputTable;
use crate::resolve::MappingResult;
use crate::workbook::table::Value;
use chrono::Local;
use log::info;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sheet and column used to derive the site group label for the file name.
const GROUP_SHEET: &str = "IP";
const GROUP_COLUMN: &str = "NE_Name";

/// Errors raised while writing the output workbook.
#[derive(Error, Debug)]
pub enum OutputWriteError {
    #[error("Failed to write output workbook '{0}': {1}")]
    Write(String, #[source] rust_xlsxwriter::XlsxError),
    #[error("Failed to move output workbook into place at '{0}': {1}")]
    Rename(String, #[source] std::io::Error),
}

/// Writes the resolved sheets to `path`, atomically.
pub fn write_output(path: &Path, result: &MappingResult) -> Result<(), OutputWriteError> {
    let mut workbook = Workbook::new();
    for sheet in &result.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(|error| OutputWriteError::Write(path.display().to_string(), error))?;
        for (col, header) in sheet.columns.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, header)
                .map_err(|error| OutputWriteError::Write(path.display().to_string(), error))?;
        }
        for (index, row) in sheet.rows.iter().enumerate() {
            let target_row = (index + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                write_value(worksheet, target_row, col as u16, value)
                    .map_err(|error| OutputWriteError::Write(path.display().to_string(), error))?;
            }
        }
    }

    let tmp = path.with_extension("xlsx.tmp");
    if let Err(error) = workbook.save(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(OutputWriteError::Write(path.display().to_string(), error));
    }
    if let Err(error) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(OutputWriteError::Rename(path.display().to_string(), error));
    }
    info!("Wrote output workbook {}", path.display());
    Ok(())
}

fn write_value(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match value {
        Value::Empty => {}
        Value::Bool(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        // Numbers stay as text so identifiers like "0042" survive; consumers
        // of this workbook read everything as strings anyway.
        Value::Number(value) | Value::Text(value) => {
            worksheet.write_string(row, col, value)?;
        }
    }
    Ok(())
}

/// Builds the output file name: `{TemplateStem}_{Group}_{YYYYMMDD}_{HHMM}.xlsx`.
pub fn output_file_name(template_path: &Path, group: &str) -> PathBuf {
    let stem = template_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_owned());
    let stamp = Local::now().format("%Y%m%d_%H%M");
    PathBuf::from(format!("{}_{}_{}.xlsx", stem, group, stamp))
}

/// Derives the site group label from the input's IP sheet: `first-last` for a
/// range of equipment names, the single name when there is only one, and
/// `default` when the sheet or column is absent.
pub fn group_label(input: &InputTable) -> String {
    let names: Vec<String> = input
        .sheet(GROUP_SHEET)
        .map(|sheet| {
            sheet
                .rows
                .iter()
                .map(|row| row.get(GROUP_COLUMN).to_string())
                .filter(|name| !name.trim().is_empty())
                .collect()
        })
        .unwrap_or_default();

    match (names.first(), names.last()) {
        (Some(first), Some(last)) if first != last => format!("{}-{}", first, last),
        (Some(single), _) => single.to_owned(),
        _ => "default".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::table::{Row, SheetTable};

    fn input_with_names(names: &[&str]) -> InputTable {
        let rows = names
            .iter()
            .map(|name| Row::from([(GROUP_COLUMN, Value::text(name))]))
            .collect();
        InputTable::from_tables(vec![SheetTable::new(
            GROUP_SHEET,
            vec![GROUP_COLUMN.to_owned()],
            rows,
        )])
    }

    #[test]
    fn group_label_range() {
        let input = input_with_names(&["gBL00231Z", "gBL00232Z", "eCM00025Z"]);
        assert_eq!(group_label(&input), "gBL00231Z-eCM00025Z");
    }

    #[test]
    fn group_label_single() {
        let input = input_with_names(&["gBL00231Z"]);
        assert_eq!(group_label(&input), "gBL00231Z");
    }

    #[test]
    fn group_label_default() {
        assert_eq!(group_label(&InputTable::default()), "default");
        assert_eq!(group_label(&input_with_names(&[])), "default");
    }

    #[test]
    fn output_file_name_format() {
        let name = output_file_name(Path::new("templates/SPU_5G.xlsx"), "gBL00231Z");
        let name = name.to_string_lossy();
        assert!(name.starts_with("SPU_5G_gBL00231Z_"));
        assert!(name.ends_with(".xlsx"));
        // SPU_5G_gBL00231Z_YYYYMMDD_HHMM.xlsx
        assert_eq!(name.len(), "SPU_5G_gBL00231Z_".len() + 13 + ".xlsx".len());
    }
}
