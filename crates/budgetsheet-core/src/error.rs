use thiserror::Error;

/// Errors raised by the document model
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),

    #[error("sheet '{0}' already exists")]
    SheetNameExists(String),

    #[error("sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("invalid sheet name: {0}")]
    InvalidSheetName(String),

    #[error("cannot delete the last remaining sheet")]
    CannotDeleteLastSheet,

    #[error("row {row} is out of bounds (last used row is {last})")]
    RowOutOfBounds { row: u32, last: u32 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
