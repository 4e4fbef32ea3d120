//! CDD input workbook loading.
//!
//! CDD sheets carry up to three instruction rows below the header (column
//! descriptions, type declarations like `string:[1..255]`, and
//! `Mandatory`/`Optional` markers). Those rows are filtered out so only data
//! rows reach the resolver: sheets with an `NE_Name` column keep rows whose
//! name matches the equipment naming pattern; other sheets drop rows whose
//! first column contains instruction text.

use crate::error::SpuMapperError;
use crate::template::Template;
use crate::workbook::table::SheetTable;
use crate::workbook::{load_tables, SheetSelection};
use log::debug;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Column used to recognize data rows on equipment sheets.
const NE_NAME_COLUMN: &str = "NE_Name";

/// Valid equipment names start with 'g' or 'e' followed by a site code and
/// digits, e.g. gBL00231Z, eCM00025Z, gBLT8509.
const NE_NAME_PATTERN: &str = r"^[ge][A-Z]{2,3}\d+[A-Z]?$";

/// Text fragments marking instruction rows on sheets without an NE_Name column.
const INSTRUCTION_PATTERNS: &[&str] = &[
    "Mandatory",
    "Optional",
    "string:",
    "integer:",
    "Bắt buộc",
    "Có thể",
    "use for",
    "Site name",
];

/// Errors raised while loading the CDD input.
#[derive(Error, Debug)]
pub enum InputReadError {
    /// The input workbook could not be opened or read
    #[error("Failed to read input workbook '{0}': {1}")]
    Unreadable(String, #[source] Box<SpuMapperError>),

    /// A sheet the template references exists but has no header row
    #[error("Input sheet '{0}' referenced by the template has no recognizable header row")]
    MissingHeaderRow(String),
}

/// The loaded CDD input: sheet name → table. Read-only after construction.
#[derive(Clone, Debug, Default)]
pub struct InputTable {
    sheets: HashMap<String, SheetTable>,
}

impl InputTable {
    pub fn from_tables<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = SheetTable>,
    {
        Self {
            sheets: tables
                .into_iter()
                .map(|table| (table.name.to_owned(), table))
                .collect(),
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetTable> {
        self.sheets.get(name)
    }

    pub fn contains_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }
}

/// Loads the CDD input workbook, filtering instruction rows from every sheet.
///
/// Fails with [`InputReadError::MissingHeaderRow`] when a sheet the template
/// references is present but carries no header row at all. Sheets the
/// template references that are entirely absent are left for resolution to
/// report, where requiredness is known.
pub fn load_input(path: &Path, template: &Template) -> Result<InputTable, SpuMapperError> {
    let mut tables = load_tables(path, &SheetSelection::All)
        .map_err(|error| InputReadError::Unreadable(path.display().to_string(), Box::new(error)))?;
    let ne_name = Regex::new(NE_NAME_PATTERN).expect("Hardcoded pattern");

    for table in &mut tables {
        let before = table.row_count();
        filter_instruction_rows(table, &ne_name);
        if table.row_count() != before {
            debug!(
                "Sheet '{}': dropped {} instruction row(s)",
                table.name,
                before - table.row_count()
            );
        }
    }

    for referenced in template.referenced_sheets() {
        if let Some(table) = tables.iter().find(|table| table.name == referenced) {
            if table.headers.is_empty() {
                Err(InputReadError::MissingHeaderRow(referenced.to_owned()))?;
            }
        }
    }

    Ok(InputTable::from_tables(tables))
}

/// Drops instruction rows, keeping data rows only.
fn filter_instruction_rows(table: &mut SheetTable, ne_name: &Regex) {
    if table.headers.iter().any(|header| header == NE_NAME_COLUMN) {
        table
            .rows
            .retain(|row| ne_name.is_match(row.get(NE_NAME_COLUMN).to_string().trim()));
        return;
    }

    let Some(first_column) = table.headers.first().cloned() else {
        return;
    };
    table.rows.retain(|row| {
        let value = row.get(&first_column).to_string();
        !INSTRUCTION_PATTERNS
            .iter()
            .any(|pattern| value.to_lowercase().contains(&pattern.to_lowercase()))
    });
}
