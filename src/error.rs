use thiserror::Error;

/// Failure of a whole upload. No dataset is produced when this is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// A filter value that cannot be applied. Reported to the user instead of
/// computing a report on a meaningless value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("please enter or select a value for {0}")]
    MissingValue(&'static str),
    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} is out of range: {value:?}")]
    OutOfRange { field: &'static str, value: String },
    #[error("unknown status {0:?}")]
    UnknownStatus(String),
    #[error("unknown island {0:?}")]
    UnknownIsland(String),
    #[error("{field} must be a YYYY-MM-DD date, got {value:?}")]
    InvalidDate { field: &'static str, value: String },
}
