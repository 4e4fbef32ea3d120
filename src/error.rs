use thiserror::Error;

pub use crate::helpers::xml::XmlError;

/// Main error type for the SPU mapper.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum SpuMapperError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    XlsxWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Workbook module errors
    #[error("{0}")]
    WorkbookError(#[from] crate::workbook::WorkbookError),

    // Pipeline stage errors
    #[error("{0}")]
    SchemaError(#[from] crate::template::SchemaError),

    #[error("{0}")]
    InputReadError(#[from] crate::input::InputReadError),

    #[error("{0}")]
    ResolutionError(#[from] crate::resolve::ResolutionError),

    #[error("{0}")]
    OutputWriteError(#[from] crate::output::OutputWriteError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SpuMapperError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SpuMapperError::WithContextError(format!("{}: {}", message, e)))
    }
}
