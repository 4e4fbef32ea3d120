//! Mapping resolution: applies the template's column descriptors to the
//! loaded input and produces the fully materialized output sheets.
//!
//! Resolution is deterministic: target sheets appear in template declaration
//! order, columns within each sheet likewise, and key joins always take the
//! first matching source row. Descriptors whose note names a known keyword
//! (bandwidth, EARFCN, MME, AMF) resolve through the configuration's lookup
//! tables when no source value is available. A single unresolvable cell never
//! aborts the run; it is recorded and the cell stays empty. Only a missing
//! input sheet behind a required column is fatal.

use crate::config::Config;
use crate::input::InputTable;
use crate::template::{ColumnDescriptor, Template};
use crate::workbook::table::{SheetTable, Value};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Prefix marking a default value to be looked up in the run configuration.
const CONFIG_PREFIX: &str = "config:";

// Note keywords that trigger config-table mappings
const NOTE_BANDWIDTH: &str = "bandwidth";
const NOTE_EARFCN: &str = "earfcn";
const NOTE_FREQUENCY: &str = "frequency";
const NOTE_MME: &str = "mme";
const NOTE_AMF: &str = "amf";

// Input locations the note mappings read from
const RADIO_4G_SHEET: &str = "Radio 4G";
const BANDWIDTH_COLUMN: &str = "dlChannelBandwidth";
const EARFCN_COLUMN: &str = "arfcndl";
const POOL_SHEET: &str = "IP";
const MME_COLUMN: &str = "MME";
const AMF_COLUMN: &str = "AMF";

const POOL_SEPARATOR: &str = ";";

/// Fatal resolution failures.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// A required column sources from a sheet the input does not contain
    #[error("Input has no sheet '{sheet}', required by output column '{target_sheet}'.'{column}'")]
    MissingRequiredSheet {
        sheet: String,
        target_sheet: String,
        column: String,
    },
}

/// One fully resolved output sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedSheet {
    pub name: String,
    /// Column headers in template declaration order
    pub columns: Vec<String>,
    /// Row-major cell values, one inner vector per output row
    pub rows: Vec<Vec<Value>>,
}

/// A column that could not be filled for any row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnresolvedField {
    pub sheet: String,
    pub column: String,
}

/// Non-fatal findings surfaced alongside the result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ResolveWarning {
    /// A key join matched more than one source row; the first match was used
    DuplicateKey {
        sheet: String,
        column: String,
        key: String,
        matches: usize,
    },
}

/// The complete outcome of a resolution run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MappingResult {
    pub sheets: Vec<ResolvedSheet>,
    pub unresolved: Vec<UnresolvedField>,
    pub warnings: Vec<ResolveWarning>,
}

pub struct Resolver<'a> {
    template: &'a Template,
    input: &'a InputTable,
    config: &'a Config,
    /// SPU version selecting the per-version config tables
    version: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(
        template: &'a Template,
        input: &'a InputTable,
        config: &'a Config,
        version: &'a str,
    ) -> Self {
        Self {
            template,
            input,
            config,
            version,
        }
    }

    /// Runs the full resolution.
    ///
    /// Checks up front that every required source sheet exists, so a fatal
    /// error can never leave a half-built result behind.
    pub fn resolve(&self) -> Result<MappingResult, ResolutionError> {
        for descriptor in self.template.descriptors() {
            if let Some(sheet) = descriptor.source_sheet.as_deref() {
                if descriptor.required && !self.input.contains_sheet(sheet) {
                    return Err(ResolutionError::MissingRequiredSheet {
                        sheet: sheet.to_owned(),
                        target_sheet: descriptor.target_sheet.to_owned(),
                        column: descriptor.target_column.to_owned(),
                    });
                }
            }
        }

        let mut result = MappingResult::default();
        let mut seen_duplicates = HashSet::<(String, String)>::new();
        for name in self.template.target_sheets() {
            let sheet = self.resolve_sheet(name, &mut result, &mut seen_duplicates);
            debug!(
                "Resolved sheet '{}': {} column(s), {} row(s)",
                sheet.name,
                sheet.columns.len(),
                sheet.rows.len()
            );
            result.sheets.push(sheet);
        }
        Ok(result)
    }

    fn resolve_sheet(
        &self,
        name: &str,
        result: &mut MappingResult,
        seen_duplicates: &mut HashSet<(String, String)>,
    ) -> ResolvedSheet {
        let descriptors: Vec<&ColumnDescriptor> = self.template.descriptors_for(name).collect();
        let columns: Vec<String> = descriptors
            .iter()
            .map(|descriptor| descriptor.target_column.to_owned())
            .collect();

        // Output length follows the longest source sheet this target draws
        // from. A target with no reachable source data stays headers-only.
        let row_count = descriptors
            .iter()
            .filter_map(|descriptor| descriptor.source_sheet.as_deref())
            .filter_map(|sheet| self.input.sheet(sheet))
            .map(SheetTable::row_count)
            .max()
            .unwrap_or(0);

        // The first descriptor with present source data anchors key joins:
        // its sheet supplies the key column values row by row.
        let primary = descriptors.iter().find_map(|descriptor| {
            descriptor
                .source_sheet
                .as_deref()
                .and_then(|sheet| self.input.sheet(sheet))
        });

        let mut rows = Vec::with_capacity(row_count);
        let mut unresolved = vec![false; descriptors.len()];
        for index in 0..row_count {
            let mut row = Vec::with_capacity(descriptors.len());
            for (position, descriptor) in descriptors.iter().enumerate() {
                let value = self.resolve_cell(descriptor, index, primary, result, seen_duplicates);
                match value {
                    Some(value) => row.push(value),
                    None => {
                        unresolved[position] = true;
                        row.push(Value::Empty);
                    }
                }
            }
            rows.push(row);
        }

        for (position, descriptor) in descriptors.iter().enumerate() {
            if unresolved[position] {
                warn!(
                    "Output column '{}'.'{}' has unresolved cells",
                    descriptor.target_sheet, descriptor.target_column
                );
                result.unresolved.push(UnresolvedField {
                    sheet: descriptor.target_sheet.to_owned(),
                    column: descriptor.target_column.to_owned(),
                });
            }
        }

        ResolvedSheet {
            name: name.to_owned(),
            columns,
            rows,
        }
    }

    /// Resolves one output cell. `None` means the cell stays empty and the
    /// column gets reported as unresolved.
    fn resolve_cell(
        &self,
        descriptor: &ColumnDescriptor,
        index: usize,
        primary: Option<&SheetTable>,
        result: &mut MappingResult,
        seen_duplicates: &mut HashSet<(String, String)>,
    ) -> Option<Value> {
        if let Some(value) = self.source_value(descriptor, index, primary, result, seen_duplicates) {
            if !value.is_empty() {
                return Some(value);
            }
        }
        if let Some(value) = self.note_value(descriptor, index) {
            return Some(value);
        }
        self.default_value(descriptor)
    }

    /// Note-driven config mappings: a descriptor whose note mentions one of
    /// the known keywords resolves through the configuration's lookup tables
    /// instead of a direct source reference.
    fn note_value(&self, descriptor: &ColumnDescriptor, index: usize) -> Option<Value> {
        let note = descriptor.note.as_deref()?.to_lowercase();
        if note.contains(NOTE_BANDWIDTH) {
            self.table_mapped(BANDWIDTH_COLUMN, "bandwidth_mapping", index, false)
        } else if note.contains(NOTE_EARFCN) || note.contains(NOTE_FREQUENCY) {
            self.table_mapped(EARFCN_COLUMN, "earfcn_mapping", index, true)
        } else if note.contains(NOTE_MME) {
            self.pool_addresses(MME_COLUMN, "mme", index)
        } else if note.contains(NOTE_AMF) {
            self.pool_addresses(AMF_COLUMN, "amf", index)
        } else {
            None
        }
    }

    /// Maps a Radio 4G cell through a per-version config table. Values the
    /// table does not know pass through unchanged. With `integral` set the
    /// key is normalized to an integer first, matching how the tables key
    /// EARFCN values.
    fn table_mapped(&self, column: &str, table: &str, index: usize, integral: bool) -> Option<Value> {
        let cell = self.input.sheet(RADIO_4G_SHEET)?.rows.get(index)?.get(column);
        if cell.is_empty() {
            return None;
        }
        let key = if integral {
            let number = cell.to_string().parse::<f64>().ok()?;
            (number.trunc() as i64).to_string()
        } else {
            cell.to_string()
        };
        let path = format!("SPU.{}.{}", self.version, table);
        match self.config.table_lookup(&path, &key) {
            Some(mapped) => Some(Value::text(&mapped)),
            None => Some(cell.to_owned()),
        }
    }

    /// Expands the pool names in the IP sheet's MME/AMF cell through the
    /// config's address pools and joins the addresses.
    fn pool_addresses(&self, column: &str, table: &str, index: usize) -> Option<Value> {
        let cell = self.input.sheet(POOL_SHEET)?.rows.get(index)?.get(column);
        let addresses: Vec<String> = cell
            .to_string()
            .split_whitespace()
            .flat_map(|name| self.config.pool(table, name))
            .collect();
        if addresses.is_empty() {
            None
        } else {
            Some(Value::text(&addresses.join(POOL_SEPARATOR)))
        }
    }

    fn source_value(
        &self,
        descriptor: &ColumnDescriptor,
        index: usize,
        primary: Option<&SheetTable>,
        result: &mut MappingResult,
        seen_duplicates: &mut HashSet<(String, String)>,
    ) -> Option<Value> {
        let sheet = self.input.sheet(descriptor.source_sheet.as_deref()?)?;
        let column = descriptor.source_column.as_deref()?;

        let row = match descriptor.source_key.as_deref() {
            // Key join: take the key from the primary sheet's current row and
            // find the first source row carrying the same key.
            Some(key) => {
                let key_value = primary?.rows.get(index)?.get(key);
                if key_value.is_empty() {
                    return None;
                }
                let key_text = key_value.to_string();
                let mut matches = sheet
                    .rows
                    .iter()
                    .filter(|row| row.get(key).to_string() == key_text);
                let first = matches.next()?;
                let extra = matches.count();
                if extra > 0
                    && seen_duplicates.insert((sheet.name.to_owned(), key_text.to_owned()))
                {
                    warn!(
                        "Sheet '{}': key '{}' matches {} rows, using the first",
                        sheet.name,
                        key_text,
                        extra + 1
                    );
                    result.warnings.push(ResolveWarning::DuplicateKey {
                        sheet: sheet.name.to_owned(),
                        column: column.to_owned(),
                        key: key_text,
                        matches: extra + 1,
                    });
                }
                first
            }
            // Positional correspondence: output row i reads source row i.
            None => sheet.rows.get(index)?,
        };

        Some(row.get(column).to_owned())
    }

    /// Fixed default, with `config:` prefixed values looked up in the run
    /// configuration. A configured empty string still counts as resolved.
    fn default_value(&self, descriptor: &ColumnDescriptor) -> Option<Value> {
        let default = descriptor.default_value.as_deref()?;
        match default.strip_prefix(CONFIG_PREFIX) {
            Some(path) => Some(Value::text(&self.config.lookup_string(path.trim()))),
            None => Some(Value::text(default)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::table::Row;

    fn template(rows: &[(&str, &str, &str, &str, &str, &str, &str, &str)]) -> Template {
        // (sheet, column, source sheet, source column, source key, fixed, required, note)
        let headers = [
            "Version",
            "Sheet",
            "Column",
            "SourceSheet",
            "SourceColumn",
            "SourceKey",
            "FixedValue",
            "Required",
            "Note",
        ];
        let table = SheetTable::new(
            "Mapping",
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|(sheet, column, src_sheet, src_column, key, fixed, required, note)| {
                    Row::from([
                        ("Sheet", Value::text(sheet)),
                        ("Column", Value::text(column)),
                        ("SourceSheet", Value::text(src_sheet)),
                        ("SourceColumn", Value::text(src_column)),
                        ("SourceKey", Value::text(key)),
                        ("FixedValue", Value::text(fixed)),
                        ("Required", Value::text(required)),
                        ("Note", Value::text(note)),
                    ])
                })
                .collect(),
        );
        Template::parse(&table, "V1").unwrap()
    }

    fn input(sheets: Vec<SheetTable>) -> InputTable {
        InputTable::from_tables(sheets)
    }

    fn ip_sheet() -> SheetTable {
        SheetTable::new(
            "IP",
            vec!["NE_Name".to_owned(), "OAM_IP".to_owned()],
            vec![
                Row::from([
                    ("NE_Name", Value::text("gBL00231Z")),
                    ("OAM_IP", Value::text("10.0.0.1")),
                ]),
                Row::from([
                    ("NE_Name", Value::text("eCM00025Z")),
                    ("OAM_IP", Value::text("10.0.0.2")),
                ]),
            ],
        )
    }

    fn resolve(template: &Template, input: &InputTable) -> MappingResult {
        let config = Config::default();
        Resolver::new(template, input, &config, "V1").resolve().unwrap()
    }

    #[test]
    fn positional_correspondence() {
        let template = template(&[
            ("Site", "Name", "IP", "NE_Name", "", "", "", ""),
            ("Site", "Address", "IP", "OAM_IP", "", "", "", ""),
        ]);
        let result = resolve(&template, &input(vec![ip_sheet()]));

        assert_eq!(result.sheets.len(), 1);
        let sheet = &result.sheets[0];
        assert_eq!(sheet.columns, vec!["Name", "Address"]);
        assert_eq!(
            sheet.rows,
            vec![
                vec![Value::text("gBL00231Z"), Value::text("10.0.0.1")],
                vec![Value::text("eCM00025Z"), Value::text("10.0.0.2")],
            ]
        );
        assert!(result.unresolved.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn key_join_first_match_wins() {
        let transport = SheetTable::new(
            "Transport",
            vec!["NE_Name".to_owned(), "VLAN".to_owned()],
            vec![
                Row::from([("NE_Name", Value::text("eCM00025Z")), ("VLAN", Value::text("200"))]),
                Row::from([("NE_Name", Value::text("gBL00231Z")), ("VLAN", Value::text("100"))]),
                Row::from([("NE_Name", Value::text("gBL00231Z")), ("VLAN", Value::text("999"))]),
            ],
        );
        let template = template(&[
            ("Site", "Name", "IP", "NE_Name", "", "", "", ""),
            ("Site", "Vlan", "Transport", "VLAN", "NE_Name", "", "", ""),
        ]);
        let result = resolve(&template, &input(vec![ip_sheet(), transport]));

        let sheet = &result.sheets[0];
        // Rows follow the IP sheet; VLANs come from the join, first match wins
        assert_eq!(sheet.rows[0], vec![Value::text("gBL00231Z"), Value::text("100")]);
        assert_eq!(sheet.rows[1], vec![Value::text("eCM00025Z"), Value::text("200")]);
        assert_eq!(
            result.warnings,
            vec![ResolveWarning::DuplicateKey {
                sheet: "Transport".to_owned(),
                column: "VLAN".to_owned(),
                key: "gBL00231Z".to_owned(),
                matches: 2,
            }]
        );
    }

    #[test]
    fn duplicate_key_warned_once_per_key() {
        let transport = SheetTable::new(
            "Transport",
            vec!["NE_Name".to_owned(), "VLAN".to_owned(), "MTU".to_owned()],
            vec![
                Row::from([
                    ("NE_Name", Value::text("gBL00231Z")),
                    ("VLAN", Value::text("100")),
                    ("MTU", Value::text("1500")),
                ]),
                Row::from([
                    ("NE_Name", Value::text("gBL00231Z")),
                    ("VLAN", Value::text("999")),
                    ("MTU", Value::text("9000")),
                ]),
            ],
        );
        let template = template(&[
            ("Site", "Name", "IP", "NE_Name", "", "", "", ""),
            ("Site", "Vlan", "Transport", "VLAN", "NE_Name", "", "", ""),
            ("Site", "Mtu", "Transport", "MTU", "NE_Name", "", "", ""),
        ]);
        let result = resolve(&template, &input(vec![ip_sheet(), transport]));
        // Two joined columns hit the same duplicated key; one warning
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn missing_value_falls_back_to_default() {
        let template = template(&[
            ("Site", "Name", "IP", "NE_Name", "", "", "", ""),
            ("Site", "Region", "IP", "Region", "", "north", "", ""),
        ]);
        let result = resolve(&template, &input(vec![ip_sheet()]));

        let sheet = &result.sheets[0];
        assert_eq!(sheet.rows[0][1], Value::text("north"));
        assert_eq!(sheet.rows[1][1], Value::text("north"));
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn config_default_expansion() {
        let template = template(&[
            ("Site", "Name", "IP", "NE_Name", "", "", "", ""),
            ("Site", "Dns", "", "", "", "config: network.dns", "", ""),
            ("Site", "Gateway", "", "", "", "config: network.gateway", "", ""),
        ]);
        let config = Config::from_value(serde_json::json!({
            "network": { "dns": "8.8.8.8" }
        }));
        let input = input(vec![ip_sheet()]);
        let result = Resolver::new(&template, &input, &config, "V1").resolve().unwrap();

        let sheet = &result.sheets[0];
        assert_eq!(sheet.rows[0][1], Value::text("8.8.8.8"));
        // Absent config path resolves to an empty string, still resolved
        assert_eq!(sheet.rows[0][2], Value::text(""));
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn unresolved_column_reported_not_fatal() {
        let template = template(&[
            ("Site", "Name", "IP", "NE_Name", "", "", "", ""),
            ("Site", "Power", "IP", "Power", "", "", "Optional", ""),
        ]);
        let result = resolve(&template, &input(vec![ip_sheet()]));

        let sheet = &result.sheets[0];
        assert_eq!(sheet.rows[0][1], Value::Empty);
        assert_eq!(
            result.unresolved,
            vec![UnresolvedField {
                sheet: "Site".to_owned(),
                column: "Power".to_owned(),
            }]
        );
    }

    #[test]
    fn missing_required_sheet_is_fatal() {
        let template = template(&[("Site", "Name", "Radio", "NE_Name", "", "", "", "")]);
        let config = Config::default();
        let input = input(vec![ip_sheet()]);
        let error = Resolver::new(&template, &input, &config, "V1").resolve().unwrap_err();
        match error {
            ResolutionError::MissingRequiredSheet { sheet, target_sheet, column } => {
                assert_eq!(sheet, "Radio");
                assert_eq!(target_sheet, "Site");
                assert_eq!(column, "Name");
            }
        }
    }

    #[test]
    fn missing_optional_sheet_leaves_column_unresolved() {
        let template = template(&[
            ("Site", "Name", "IP", "NE_Name", "", "", "", ""),
            ("Site", "Extra", "Radio", "Band", "", "", "Optional", ""),
        ]);
        let result = resolve(&template, &input(vec![ip_sheet()]));
        assert_eq!(result.unresolved.len(), 1);
        assert_eq!(result.unresolved[0].column, "Extra");
    }

    #[test]
    fn no_source_rows_yields_headers_only() {
        let template = template(&[
            ("Site", "Name", "Radio", "NE_Name", "", "", "Optional", ""),
            ("Site", "Fixed", "", "", "", "static", "", ""),
        ]);
        let result = resolve(&template, &input(vec![]));
        let sheet = &result.sheets[0];
        assert_eq!(sheet.columns, vec!["Name", "Fixed"]);
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn note_joins_mme_and_amf_pools() {
        let ip = SheetTable::new(
            "IP",
            vec!["NE_Name".to_owned(), "MME".to_owned(), "AMF".to_owned()],
            vec![
                Row::from([
                    ("NE_Name", Value::text("gBL00231Z")),
                    ("MME", Value::text("MME01 MME02")),
                    ("AMF", Value::text("AMF01")),
                ]),
                Row::from([
                    ("NE_Name", Value::text("eCM00025Z")),
                    ("MME", Value::text("MME99")),
                    ("AMF", Value::Empty),
                ]),
            ],
        );
        let template = template(&[
            ("Core", "Name", "IP", "NE_Name", "", "", "", ""),
            ("Core", "MmeIp", "", "", "", "", "Optional", "MME IP mapping"),
            ("Core", "AmfIp", "", "", "", "", "Optional", "AMF IP mapping"),
        ]);
        let config = Config::from_value(serde_json::json!({
            "mme": { "MME01": ["10.1.1.1", "10.1.1.2"], "MME02": ["10.2.2.2"] },
            "amf": { "AMF01": ["10.5.5.5"] },
        }));
        let input = input(vec![ip]);
        let result = Resolver::new(&template, &input, &config, "V1").resolve().unwrap();

        let sheet = &result.sheets[0];
        assert_eq!(sheet.rows[0][1], Value::text("10.1.1.1;10.1.1.2;10.2.2.2"));
        assert_eq!(sheet.rows[0][2], Value::text("10.5.5.5"));
        // Unknown pool name and empty cell leave the column unresolved
        assert_eq!(sheet.rows[1][1], Value::Empty);
        assert_eq!(sheet.rows[1][2], Value::Empty);
        let columns: Vec<_> = result.unresolved.iter().map(|field| field.column.as_str()).collect();
        assert_eq!(columns, vec!["MmeIp", "AmfIp"]);
    }

    #[test]
    fn note_maps_bandwidth_and_earfcn_through_config() {
        let radio = SheetTable::new(
            "Radio 4G",
            vec!["dlChannelBandwidth".to_owned(), "arfcndl".to_owned()],
            vec![
                Row::from([
                    ("dlChannelBandwidth", Value::Number("20".to_owned())),
                    ("arfcndl", Value::Number("1300.0".to_owned())),
                ]),
                Row::from([
                    ("dlChannelBandwidth", Value::Number("15".to_owned())),
                    ("arfcndl", Value::Number("9999".to_owned())),
                ]),
            ],
        );
        let template = template(&[
            ("Cell", "Bandwidth", "Radio 4G", "dlChannelBandwidth", "", "", "", ""),
            ("Cell", "Bw", "", "", "", "", "Optional", "bandwidth from config"),
            ("Cell", "Freq", "", "", "", "", "Optional", "EARFCN to frequency"),
        ]);
        let config = Config::from_value(serde_json::json!({
            "SPU": { "V1": {
                "bandwidth_mapping": { "20": "100" },
                "earfcn_mapping": { "1300": "1850" },
            } }
        }));
        let input = input(vec![radio]);
        let result = Resolver::new(&template, &input, &config, "V1").resolve().unwrap();

        let sheet = &result.sheets[0];
        assert_eq!(sheet.rows[0][1], Value::text("100"));
        // EARFCN key is normalized to an integer before the lookup
        assert_eq!(sheet.rows[0][2], Value::text("1850"));
        // Unmapped values pass through unchanged
        assert_eq!(sheet.rows[1][1], Value::Number("15".to_owned()));
        assert_eq!(sheet.rows[1][2], Value::Number("9999".to_owned()));
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn source_value_wins_over_note_mapping() {
        let template = template(&[
            ("Core", "Name", "IP", "NE_Name", "", "", "", "MME IP mapping"),
        ]);
        let config = Config::from_value(serde_json::json!({
            "mme": { "MME01": ["10.1.1.1"] }
        }));
        let input = input(vec![ip_sheet()]);
        let result = Resolver::new(&template, &input, &config, "V1").resolve().unwrap();
        assert_eq!(result.sheets[0].rows[0][0], Value::text("gBL00231Z"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let transport = SheetTable::new(
            "Transport",
            vec!["NE_Name".to_owned(), "VLAN".to_owned()],
            vec![
                Row::from([("NE_Name", Value::text("gBL00231Z")), ("VLAN", Value::text("100"))]),
                Row::from([("NE_Name", Value::text("gBL00231Z")), ("VLAN", Value::text("999"))]),
            ],
        );
        let template = template(&[
            ("Site", "Name", "IP", "NE_Name", "", "", "", ""),
            ("Site", "Vlan", "Transport", "VLAN", "NE_Name", "", "", ""),
            ("Site", "Region", "", "", "", "config: region", "", ""),
            ("Site", "Power", "IP", "Power", "", "", "Optional", ""),
        ]);
        let config = Config::from_value(serde_json::json!({ "region": "north" }));
        let input = input(vec![ip_sheet(), transport]);

        let first = Resolver::new(&template, &input, &config, "V1").resolve().unwrap();
        let second = Resolver::new(&template, &input, &config, "V1").resolve().unwrap();
        assert_eq!(first, second);
        assert!(!first.unresolved.is_empty());
        assert!(!first.warnings.is_empty());
    }

    #[test]
    fn sheets_follow_declaration_order() {
        let template = template(&[
            ("Beta", "B", "IP", "NE_Name", "", "", "", ""),
            ("Alpha", "A", "IP", "NE_Name", "", "", "", ""),
            ("Beta", "C", "IP", "OAM_IP", "", "", "", ""),
        ]);
        let result = resolve(&template, &input(vec![ip_sheet()]));
        let names: Vec<_> = result.sheets.iter().map(|sheet| sheet.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
        assert_eq!(result.sheets[0].columns, vec!["B", "C"]);
    }
}
