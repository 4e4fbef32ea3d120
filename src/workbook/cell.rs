use crate::error::SpuMapperError;
use crate::workbook::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDate;

/// Types of cell data in XLSX worksheets.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values (true/false)
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values (e.g. "#DIV/0!")
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Analyzes format codes for date/time patterns.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_color && !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        if is_date && is_time {
            if is_1904 {
                Self::NumberDateTime1904
            } else {
                Self::NumberDateTime1900
            }
        } else if is_date {
            if is_1904 {
                Self::NumberDate1904
            } else {
                Self::NumberDate1900
            }
        } else if is_time {
            if is_1904 {
                Self::NumberTime1904
            } else {
                Self::NumberTime1900
            }
        } else {
            Self::Number
        }
    }
}

/// Represents a single cell in a worksheet with position, type, and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as stored in the file
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }
}

/// Converts an Excel numeric date to an ISO date string.
/// Handles the Lotus 1-2-3 leap year bug for the 1900 epoch.
pub(crate) fn to_date_string(value: &str, is_1904: bool) -> Result<String, SpuMapperError> {
    let days = value.parse::<f64>()?.trunc() as i64;
    let duration = Duration::days(
        days + if is_1904 {
            1462
        } else if days < 60 {
            1
        } else {
            0
        },
    );
    let date = NaiveDate::from_ymd_opt(1899, 12, 30).expect("NaiveDate Literal") + duration;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Converts an Excel numeric time of day to an ISO time string.
pub(crate) fn to_time_string(value: &str) -> Result<String, SpuMapperError> {
    let factor = value.parse::<f64>()?;
    let mut hours = (factor * 86400000f64).round() as i64;
    let milliseconds = hours % 1_000; hours /= 1_000;
    let seconds = hours % 60; hours /= 60;
    let minutes = hours % 60; hours /= 60;
    let timestamp = if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:06}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    };
    Ok(timestamp)
}

/// Converts an Excel numeric datetime to an ISO datetime string.
pub(crate) fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, SpuMapperError> {
    if let Some(index) = value.find('.') {
        let date = to_date_string(&value[..index], is_1904)?;
        let time = to_time_string(&value[index..])?;
        Ok(format!("{date} {time}"))
    } else {
        let date = to_date_string(value, is_1904)?;
        Ok(format!("{date} 00:00:00"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_string_1900_epoch() {
        // 2024-01-15 is serial 45306 in the 1900 date system
        assert_eq!(to_date_string("45306", false).unwrap(), "2024-01-15");
        // Serial 1 predates the Lotus leap year bug cutoff
        assert_eq!(to_date_string("1", false).unwrap(), "1900-01-01");
    }

    #[test]
    fn date_string_1904_epoch() {
        assert_eq!(to_date_string("0", true).unwrap(), "1904-01-01");
    }

    #[test]
    fn time_string_from_fraction() {
        assert_eq!(to_time_string("0.5").unwrap(), "12:00:00");
        assert_eq!(to_time_string("0.75").unwrap(), "18:00:00");
    }

    #[test]
    fn datetime_string_with_fraction() {
        assert_eq!(to_datetime_string("45306.5", false).unwrap(), "2024-01-15 12:00:00");
        assert_eq!(to_datetime_string("45306", false).unwrap(), "2024-01-15 00:00:00");
    }

    #[test]
    fn custom_format_detection() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("hh:mm:ss", false), CellType::NumberTime1900);
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd hh:mm", true), CellType::NumberDateTime1904);
        assert_eq!(CellType::parse_custom_number_format("#,##0.00", false), CellType::Number);
        // Literal text and color sections must not trigger date detection
        assert_eq!(CellType::parse_custom_number_format("\"days\" 0", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0", false), CellType::Number);
    }

    #[test]
    fn builtin_format_ids() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("0", false), None);
    }
}
