//! Header-keyed view over a worksheet: one header row followed by data rows.

use crate::error::SpuMapperError;
use crate::workbook::cell::{to_date_string, to_datetime_string, to_time_string, Cell, CellType};
use crate::workbook::sheet::Sheet;
use crate::workbook::WorkbookError;
use log::warn;
use std::collections::HashMap;
use std::fmt::Display;

/// A single cell value with implicit conversions deliberately avoided:
/// numbers keep their lexical form so identifiers survive untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Empty,
    Bool(bool),
    /// Numeric value, kept as written in the file
    Number(String),
    Text(String),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn text(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Number(value) | Value::Text(value) => write!(f, "{}", value),
        }
    }
}

const EMPTY: Value = Value::Empty;

/// One data row, keyed by column header.
#[derive(Clone, Debug, Default)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column lookup. Absent columns read as empty cells.
    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, column: &str, value: Value) {
        self.values.insert(column.to_owned(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(Value::is_empty)
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Row {
    fn from(pairs: [(&str, Value); N]) -> Self {
        let mut row = Row::new();
        for (column, value) in pairs {
            row.set(column, value);
        }
        row
    }
}

/// A worksheet interpreted as a table: the first non-empty row provides the
/// column headers, every following row becomes a [`Row`].
#[derive(Clone, Debug)]
pub struct SheetTable {
    pub name: String,
    /// Column headers in worksheet order
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl SheetTable {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.to_owned(),
            headers,
            rows,
        }
    }

    /// Builds a table from a raw sheet. Shared string references are resolved
    /// through `shared_strings`. A sheet without any cells yields a headerless,
    /// empty table; callers decide whether that is an error.
    ///
    /// Duplicate headers keep their first occurrence; later columns with the
    /// same header are ignored with a warning.
    pub(crate) fn from_sheet(sheet: &Sheet, shared_strings: &[String]) -> Result<SheetTable, SpuMapperError> {
        let grid = sheet.grid();
        let mut table = SheetTable::new(&sheet.name, Vec::new(), Vec::new());

        let Some(header_index) = grid.iter().position(|record| record.iter().any(Option::is_some)) else {
            return Ok(table);
        };

        // Header labels by grid position; empty slots keep their position so
        // data cells below them stay aligned but are not addressable by name.
        let mut labels = Vec::<Option<String>>::new();
        for cell in &grid[header_index] {
            let label = match cell {
                Some(cell) => {
                    let label = cell_value(sheet, cell, shared_strings)?.to_string();
                    let label = label.trim().to_owned();
                    if label.is_empty() {
                        None
                    } else if table.headers.contains(&label) {
                        warn!(
                            "Sheet '{}' of '{}': duplicate column header '{}' ignored",
                            sheet.name, sheet.file_name, label
                        );
                        None
                    } else {
                        table.headers.push(label.to_owned());
                        Some(label)
                    }
                }
                None => None,
            };
            labels.push(label);
        }

        for record in grid.iter().skip(header_index + 1) {
            let mut row = Row::new();
            for (label, cell) in labels.iter().zip(record) {
                if let (Some(label), Some(cell)) = (label, cell) {
                    row.set(label, cell_value(sheet, cell, shared_strings)?);
                }
            }
            table.rows.push(row);
        }
        // Formatting artifacts often extend a sheet's bounding box past the
        // data; interior blank rows stay to keep row positions aligned.
        while table.rows.last().is_some_and(Row::is_empty) {
            table.rows.pop();
        }
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Converts a raw cell into a [`Value`], rendering date/time serial numbers
/// as ISO strings and resolving shared string references.
fn cell_value(sheet: &Sheet, cell: &Cell, shared_strings: &[String]) -> Result<Value, SpuMapperError> {
    let value = match cell.kind {
        CellType::Empty => Value::Empty,
        CellType::Boolean => Value::Bool(cell.value == "1"),
        CellType::Number => Value::Number(cell.value.to_owned()),
        CellType::NumberDateTime1900 => Value::Text(to_datetime_string(&cell.value, false)?),
        CellType::NumberDateTime1904 => Value::Text(to_datetime_string(&cell.value, true)?),
        CellType::NumberDate1900 => Value::Text(to_date_string(&cell.value, false)?),
        CellType::NumberDate1904 => Value::Text(to_date_string(&cell.value, true)?),
        CellType::NumberTime1900 | CellType::NumberTime1904 => Value::Text(to_time_string(&cell.value)?),
        CellType::IsoDateTime => Value::Text(cell.value.replace('T', " ")),
        CellType::InlineString => Value::Text(cell.value.to_owned()),
        CellType::SharedString => {
            let index = cell.value.parse::<usize>()?;
            let string = shared_strings.get(index).ok_or_else(|| {
                WorkbookError::CellValueError(
                    sheet.file_name.to_owned(),
                    sheet.name.to_owned(),
                    cell.reference(),
                    format!("shared string index {} out of range", index),
                )
            })?;
            Value::Text(string.to_owned())
        }
        CellType::Error => Value::Text(cell.value.to_owned()),
    };
    Ok(value)
}
