//! SPU template schema: the ordered list of column descriptors parsed from a
//! template workbook's `Mapping` sheet.
//!
//! Each row of the `Mapping` sheet declares one target (sheet, column) pair
//! together with its resolution rule: where the value comes from
//! (`SourceSheet`/`SourceColumn`), how rows correspond (`SourceKey` for a
//! key join, positional otherwise), and what to fall back to (`FixedValue`,
//! possibly a `config:` lookup). Rows carrying a `Version` are kept only when
//! it matches the selected SPU version; blank versions always apply.

use crate::error::SpuMapperError;
use crate::workbook::table::{SheetTable, Value};
use crate::workbook::{load_tables, SheetSelection};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Name of the worksheet holding the mapping rules.
pub const MAPPING_SHEET: &str = "Mapping";

// Mapping sheet column headers
const HEADER_VERSION: &str = "Version";
const HEADER_SHEET: &str = "Sheet";
const HEADER_COLUMN: &str = "Column";
const HEADER_SOURCE_SHEET: &str = "SourceSheet";
const HEADER_SOURCE_COLUMN: &str = "SourceColumn";
const HEADER_SOURCE_KEY: &str = "SourceKey";
const HEADER_FIXED_VALUE: &str = "FixedValue";
const HEADER_REQUIRED: &str = "Required";
const HEADER_NOTE: &str = "Note";

/// Errors raised while loading a template.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The template workbook could not be opened or read
    #[error("Failed to read template workbook '{0}': {1}")]
    Unreadable(String, #[source] Box<SpuMapperError>),

    /// The template workbook has no Mapping sheet
    #[error("Template '{0}' has no '{MAPPING_SHEET}' sheet")]
    MissingMappingSheet(String),

    /// The Mapping sheet lacks a required header column
    #[error("Template '{0}': '{MAPPING_SHEET}' sheet is missing header column '{1}'")]
    MissingHeader(String, String),

    /// Two descriptors declare the same target cell position
    #[error("Template declares target ('{sheet}', '{column}') more than once")]
    DuplicateTarget { sheet: String, column: String },

    /// A descriptor can never produce a value and is not marked optional
    #[error("Descriptor ('{sheet}', '{column}') has no source, default value, or note rule and is not marked Optional")]
    UnresolvableDescriptor { sheet: String, column: String },

    /// No descriptor survived version filtering
    #[error("Template '{0}' declares no mappings for version '{1}'")]
    NoDescriptors(String, String),
}

/// One template-declared target column with its resolution rule.
#[derive(Clone, Debug)]
pub struct ColumnDescriptor {
    pub target_sheet: String,
    pub target_column: String,
    pub source_sheet: Option<String>,
    pub source_column: Option<String>,
    /// Key column for a key-based row join; positional correspondence otherwise
    pub source_key: Option<String>,
    /// Fallback value when the source cell is absent or empty.
    /// A `config:<dot.path>` value resolves through the configuration.
    pub default_value: Option<String>,
    /// Whether the source sheet must exist in the input
    pub required: bool,
    /// Free-text note; known keywords trigger config-table mappings
    pub note: Option<String>,
}

impl ColumnDescriptor {
    /// True when the descriptor names a complete source reference.
    pub fn has_source(&self) -> bool {
        self.source_sheet.is_some() && self.source_column.is_some()
    }
}

/// An ordered SPU template schema.
#[derive(Clone, Debug)]
pub struct Template {
    descriptors: Vec<ColumnDescriptor>,
}

impl Template {
    /// Loads a template workbook and parses its Mapping sheet for the given
    /// SPU version.
    pub fn load(path: &Path, version: &str) -> Result<Self, SpuMapperError> {
        let name = path.display().to_string();
        let tables = load_tables(path, &SheetSelection::named([MAPPING_SHEET]))
            .map_err(|error| SchemaError::Unreadable(name.to_owned(), Box::new(error)))?;
        let mapping = tables
            .into_iter()
            .find(|table| table.name == MAPPING_SHEET)
            .ok_or_else(|| SchemaError::MissingMappingSheet(name.to_owned()))?;
        let template = Self::parse(&mapping, version)?;
        if template.descriptors.is_empty() {
            Err(SchemaError::NoDescriptors(name, version.to_owned()))?;
        }
        Ok(template)
    }

    /// Parses descriptors from a Mapping table, keeping rows whose version
    /// matches `version` or is blank, in declaration order.
    pub fn parse(mapping: &SheetTable, version: &str) -> Result<Self, SpuMapperError> {
        for header in [HEADER_SHEET, HEADER_COLUMN] {
            if !mapping.headers.iter().any(|it| it == header) {
                Err(SchemaError::MissingHeader(mapping.name.to_owned(), header.to_owned()))?;
            }
        }

        let mut descriptors = Vec::<ColumnDescriptor>::new();
        let mut targets = HashSet::<(String, String)>::new();
        for row in &mapping.rows {
            if let Some(row_version) = text(row.get(HEADER_VERSION)) {
                if row_version != version {
                    continue;
                }
            }

            let target_sheet = text(row.get(HEADER_SHEET));
            let target_column = text(row.get(HEADER_COLUMN));
            let (Some(target_sheet), Some(target_column)) = (target_sheet, target_column) else {
                continue; // blank or annotation row
            };

            let descriptor = ColumnDescriptor {
                source_sheet: text(row.get(HEADER_SOURCE_SHEET)),
                source_column: text(row.get(HEADER_SOURCE_COLUMN)),
                source_key: text(row.get(HEADER_SOURCE_KEY)),
                default_value: text(row.get(HEADER_FIXED_VALUE)),
                required: !text(row.get(HEADER_REQUIRED))
                    .map(|it| it.eq_ignore_ascii_case("optional"))
                    .unwrap_or(false),
                note: text(row.get(HEADER_NOTE)),
                target_sheet,
                target_column,
            };

            if !targets.insert((descriptor.target_sheet.to_owned(), descriptor.target_column.to_owned())) {
                Err(SchemaError::DuplicateTarget {
                    sheet: descriptor.target_sheet.clone(),
                    column: descriptor.target_column.clone(),
                })?;
            }
            if !descriptor.has_source()
                && descriptor.default_value.is_none()
                && descriptor.note.is_none()
                && descriptor.required
            {
                Err(SchemaError::UnresolvableDescriptor {
                    sheet: descriptor.target_sheet.clone(),
                    column: descriptor.target_column.clone(),
                })?;
            }

            descriptors.push(descriptor);
        }

        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.descriptors
    }

    /// Target sheet names in order of first appearance.
    pub fn target_sheets(&self) -> Vec<&str> {
        let mut sheets = Vec::<&str>::new();
        for descriptor in &self.descriptors {
            if !sheets.contains(&descriptor.target_sheet.as_str()) {
                sheets.push(&descriptor.target_sheet);
            }
        }
        sheets
    }

    /// Descriptors for one target sheet, in declaration order.
    pub fn descriptors_for<'a>(
        &'a self,
        target_sheet: &'a str,
    ) -> impl Iterator<Item = &'a ColumnDescriptor> + 'a {
        self.descriptors
            .iter()
            .filter(move |descriptor| descriptor.target_sheet == target_sheet)
    }

    /// Input sheet names referenced as sources by any descriptor.
    pub fn referenced_sheets(&self) -> HashSet<&str> {
        self.descriptors
            .iter()
            .filter_map(|descriptor| descriptor.source_sheet.as_deref())
            .collect()
    }
}

/// Trimmed non-empty cell text.
fn text(value: &Value) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string().trim().to_owned())
    }
}
