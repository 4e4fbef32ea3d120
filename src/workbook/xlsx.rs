//! XLSX workbook reader built directly on the ZIP container and XML parts.

use crate::error::ResultMessage;
use crate::error::SpuMapperError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::workbook::cell::Cell;
use crate::workbook::cell::CellType;
use crate::workbook::reference::reference_to_index;
use crate::workbook::sheet::Sheet;
use crate::workbook::SheetSelection;
use crate::workbook::WorkbookError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zip::read::ZipFile;
use zip::ZipArchive;

/// Buffered reader over the workbook file
type FileReader = BufReader<File>;

// XML tag names for parsing the XLSX format
const TAG_RELATIONSHIP: &[u8] = b"Relationship";          // Part relationship
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts");      // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");        // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");      // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");             // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");       // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");           // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                      // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");                 // Worksheet definition
const TAG_ROW: QName = QName(b"row");                     // Row in worksheet
const TAG_CELL: QName = QName(b"c");                      // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");            // Inline string value
const TAG_VALUE: QName = QName(b"v");                     // Cell value content

/// An opened XLSX workbook
pub struct XlsxWorkbook {
    /// File name of the workbook
    pub(crate) name: String,
    /// ZIP archive containing the XLSX file contents
    zip: ZipArchive<FileReader>,
    /// Parsed number formats for cell type detection
    number_formats: Vec<CellType>,
    /// List of worksheets with (name, zip_path) pairs
    sheets: Vec<(String, String)>,
}

impl XlsxWorkbook {
    /// Opens an XLSX workbook file and parses its structure.
    ///
    /// # Arguments
    /// * `path` - Path to the XLSX file
    ///
    /// # Errors
    /// Fails when the file cannot be opened, is not a ZIP archive, lacks the
    /// workbook part, or declares no worksheets.
    pub fn open(path: &Path) -> Result<XlsxWorkbook, SpuMapperError> {
        let name = path.display().to_string();
        let file = File::open(path)
            .map_err(SpuMapperError::from)
            .with_prefix(&format!("Failed to open '{}'", name))?;
        let mut zip = ZipArchive::new(BufReader::new(file))
            .map_err(SpuMapperError::from)
            .with_prefix(&format!("'{}' is not an xlsx workbook", name))?;

        let (sheets, is_1904) = load_workbook(&name, &mut zip)?;
        if sheets.is_empty() {
            Err(WorkbookError::EmptyWorkbook(name.to_owned()))?
        }
        let number_formats = load_number_formats(&mut zip, is_1904)?;

        Ok(XlsxWorkbook {
            name,
            zip,
            number_formats,
            sheets,
        })
    }

    /// Loads the shared string table.
    ///
    /// Shared strings are stored in a separate XML part and referenced by
    /// index to reduce file size when the same string appears multiple times.
    pub(crate) fn load_shared_strings(&mut self) -> Result<Vec<String>, SpuMapperError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };

        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                shared_strings.push(string);
            }
        });
        Ok(shared_strings)
    }

    /// Reads the selected worksheets, extracting every non-empty cell.
    ///
    /// # Arguments
    /// * `selection` - Which sheets to read
    ///
    /// # Returns
    /// One [`Sheet`] per accepted worksheet, in workbook order.
    pub(crate) fn read_sheets(&mut self, selection: &SheetSelection) -> Result<Vec<Sheet>, SpuMapperError> {
        let mut sheets = Vec::<Sheet>::new();
        for (sheet_name, zip_path) in &self.sheets {
            if !selection.accept(sheet_name) {
                continue;
            }

            let mut sheet = Sheet::new(&self.name, sheet_name);
            let mut row_count = 0usize;
            let mut col_count = 0usize;
            let mut row = 0usize;
            let mut col = 0usize;
            let mut kind = CellType::default();
            let mut value = String::new();
            let mut reader = self.zip.xml_reader(zip_path)?.ok_or_else(|| {
                WorkbookError::MissingPart(self.name.to_owned(), zip_path.to_owned())
            })?;
            match_xml_events!(reader => {
                Event::End(event) if event.name() == TAG_ROW => {
                    row_count += 1;
                    col_count = 0;
                }
                Event::Start(event) if event.name() == TAG_CELL => {
                    (row, col) = event.get_attribute_value("r")?
                        .and_then(|reference| reference_to_index(&reference))
                        .unwrap_or((row_count, col_count));
                    col_count += 1;
                    kind = event.get_attribute_value("t")?.map(|t| {
                        match t.as_ref() {
                            "inlineStr" | "str" => CellType::InlineString,
                            "s" => CellType::SharedString,
                            "d" => CellType::IsoDateTime,
                            "b" => CellType::Boolean,
                            "e" => CellType::Error,
                            _ => CellType::Number,
                        }
                    }).unwrap_or(CellType::Number);
                    if let Some(format_id) = event.get_attribute_value("s")? {
                        if kind == CellType::Number && !format_id.is_empty() {
                            let index = format_id.parse::<usize>()?;
                            kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                        }
                    }
                }
                Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                    value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
                }
                Event::Start(event) if event.name() == TAG_VALUE => {
                    value = read_string_value(&mut reader, TAG_VALUE, true)?;
                }
                Event::End(event) if !value.is_empty() && event.name() == TAG_CELL => {
                    sheet.push(Cell {
                        row,
                        col,
                        kind,
                        value: value.to_owned(),
                    });
                    value.clear();
                },
            });
            sheets.push(sheet);
        }

        Ok(sheets)
    }
}

/// Loads workbook structure and worksheet information.
///
/// Parses `xl/workbook.xml` to extract worksheet names and their XML part
/// paths, and determines the date system (1900 vs 1904) used in the file.
fn load_workbook(name: &str, zip: &mut ZipArchive<FileReader>) -> Result<(Vec<(String, String)>, bool), SpuMapperError> {
    let relationships = load_relationships(name, zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| WorkbookError::MissingPart(name.to_owned(), "xl/workbook.xml".to_owned()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads worksheet relationships from the workbook rels part.
///
/// # Returns
/// Mapping of relationship IDs to worksheet part paths
fn load_relationships(name: &str, zip: &mut ZipArchive<FileReader>, path: &str) -> Result<HashMap<String, String>, SpuMapperError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| WorkbookError::MissingPart(name.to_owned(), path.to_owned()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only process worksheet relationships
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Loads number formats and cell styles from `xl/styles.xml`.
///
/// Parses custom number formats and cell style indexes to determine how
/// numeric values should be interpreted (dates, times, plain numbers).
fn load_number_formats(zip: &mut ZipArchive<FileReader>, is_1904: bool) -> Result<Vec<CellType>, SpuMapperError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut has_custom_formats = false;
    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();

    let mut has_format_indexes = false;
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if !custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            has_custom_formats = true;
            custom_formats_context = true;
        }
        Event::End(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMATS => {
            custom_formats_context = false;
            if has_custom_formats && has_format_indexes {
                break;
            }
        }
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                let style = CellType::parse_custom_number_format(&format, is_1904);
                custom_formats.insert(id.to_string(), style);
            }
        }

        Event::Start(event) if !format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            has_format_indexes = true;
            format_indexes_context = true;
        }
        Event::End(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEXES => {
            format_indexes_context = false;
            if has_custom_formats && has_format_indexes {
                break;
            }
        }
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            if let Some(id) = event.get_attribute_value("numFmtId")? {
                format_indexes.push(id.to_string());
            }
        }
    });

    let number_formats = format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect();
    Ok(number_formats)
}

/// Normalizes a relationship target so it resolves within the ZIP archive.
fn to_zip_path(path: Cow<'_, str>) -> String {
    if path.starts_with("/xl/") {
        path[1..].to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Reads string content from XML, handling text and CDATA sections.
///
/// Skips phonetic text annotations and handles both text nodes and
/// character/entity references.
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, FileReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, SpuMapperError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_path_normalization() {
        assert_eq!(to_zip_path(Cow::from("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
    }
}
