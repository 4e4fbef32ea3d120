//! # Workbook module
//!
//! Reading of XLSX workbooks into header-keyed tables. The reader works
//! directly on the XLSX container: ZIP archive access plus streaming XML
//! parsing of the workbook, relationship, style, shared-string, and
//! worksheet parts. Cell typing honors number formats so date and time
//! serial values render as ISO strings.

pub(crate) mod cell;
pub(crate) mod reference;
pub(crate) mod sheet;
pub mod table;
pub mod xlsx;

use crate::error::SpuMapperError;
use std::collections::HashSet;
use std::path::Path;
use table::SheetTable;
use thiserror::Error;
use xlsx::XlsxWorkbook;

/// Errors raised while reading a workbook.
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// A required part of the XLSX container is missing
    #[error("Workbook '{0}' is missing part '{1}'")]
    MissingPart(String, String),

    /// The workbook declares no worksheets
    #[error("Workbook '{0}' contains no worksheets")]
    EmptyWorkbook(String),

    /// A cell value could not be interpreted
    #[error("Invalid cell value at '{2}' on sheet '{1}' of '{0}': {3}")]
    CellValueError(String, String, String, String),
}

/// Which worksheets to read from a workbook.
pub enum SheetSelection {
    All,
    Named(HashSet<String>),
}

impl SheetSelection {
    /// Builds a selection from sheet names.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    /// Checks whether a sheet name is accepted by this selection.
    pub fn accept(&self, sheet_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(names) => names.contains(sheet_name),
        }
    }
}

/// Reads the selected worksheets of an XLSX file as header-keyed tables.
pub fn load_tables(path: &Path, selection: &SheetSelection) -> Result<Vec<SheetTable>, SpuMapperError> {
    let mut workbook = XlsxWorkbook::open(path)?;
    let shared_strings = workbook.load_shared_strings()?;
    let sheets = workbook.read_sheets(selection)?;
    sheets
        .iter()
        .map(|sheet| SheetTable::from_sheet(sheet, &shared_strings))
        .collect()
}
