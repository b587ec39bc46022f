use thiserror::Error;

use budgetsheet_core::CoreError;

/// Errors raised by the budget engine.
///
/// These are the abort-worthy conditions; "nothing to do" situations are
/// reported through [`Outcome::Skipped`] instead so callers can tell the two
/// apart.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("header '{0}' not found in the budget table")]
    HeaderNotFound(String),

    #[error("duplicate header '{0}' in the header row")]
    DuplicateHeader(String),

    #[error("no header row found at anchor {0}")]
    EmptyHeaderRow(String),

    #[error("sheet '{0}' not found in the workbook")]
    SheetNotFound(String),

    #[error("template sheet '{0}' is missing from the workbook")]
    TemplateSheetMissing(String),

    #[error("supplier sheet strategy 'template-copy' requires a template sheet in the configuration")]
    TemplateSheetNotConfigured,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result of one mutation entry point.
///
/// `Skipped` carries the human-readable reason a call chose to do nothing
/// (missing column, no valid targets); siblings of a skipped target keep
/// going. Failures that should stop the operation are `EngineError`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The mutation ran; `rows` are the 1-based targets actually touched
    Applied { rows: Vec<u32> },
    /// Nothing was mutated
    Skipped { reason: String },
}

impl Outcome {
    pub fn applied(rows: Vec<u32>) -> Self {
        Outcome::Applied { rows }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Outcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }

    /// Rows actually mutated (empty for a skip)
    pub fn rows(&self) -> &[u32] {
        match self {
            Outcome::Applied { rows } => rows,
            Outcome::Skipped { .. } => &[],
        }
    }
}
