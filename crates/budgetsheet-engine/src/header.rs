use std::collections::HashMap;

use budgetsheet_core::{col_from_label, col_to_label, CellCoord, Sheet};

use crate::error::EngineError;

/// Column letter for a 1-based column index.
///
/// ```
/// use budgetsheet_engine::header::column_letter;
///
/// assert_eq!(column_letter(1), "A");
/// assert_eq!(column_letter(26), "Z");
/// assert_eq!(column_letter(27), "AA");
/// ```
pub fn column_letter(index: u32) -> String {
    debug_assert!(index >= 1, "column indices are 1-based");
    col_to_label(index - 1)
}

/// 1-based column index for a letter, if valid.
///
/// ```
/// use budgetsheet_engine::header::column_index;
///
/// assert_eq!(column_index("A"), Some(1));
/// assert_eq!(column_index("BA"), Some(53));
/// assert_eq!(column_index("a1"), None);
/// ```
pub fn column_index(letter: &str) -> Option<u32> {
    col_from_label(letter).map(|c| c + 1)
}

/// A resolved column: 1-based index plus its display letter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub index: u32,
    pub letter: String,
}

impl ColumnRef {
    /// 0-based column for addressing the sheet grid
    pub fn grid_col(&self) -> u32 {
        self.index - 1
    }
}

/// Ordered mapping from header text to column position.
///
/// The Nth header (0-based N) sits at column index `N + 2`: column A is
/// reserved and holds no tracked header, so the table starts at column B.
/// Built fresh per operation from the live header row; never persisted.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    order: Vec<String>,
    by_name: HashMap<String, ColumnRef>,
}

impl HeaderMap {
    /// Build from an ordered list of header texts
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, EngineError> {
        let mut order = Vec::with_capacity(headers.len());
        let mut by_name = HashMap::with_capacity(headers.len());

        for (n, header) in headers.iter().enumerate() {
            let name = header.as_ref().to_string();
            let index = n as u32 + 2;
            let column = ColumnRef {
                letter: column_letter(index),
                index,
            };
            if by_name.insert(name.clone(), column).is_some() {
                return Err(EngineError::DuplicateHeader(name));
            }
            order.push(name);
        }

        Ok(Self { order, by_name })
    }

    /// Discover the header row by expanding right from the anchor cell
    pub fn from_sheet(sheet: &Sheet, anchor: &str) -> Result<Self, EngineError> {
        let coord = CellCoord::from_a1(anchor)?;
        let headers = sheet.expand_right(coord);
        if headers.is_empty() {
            return Err(EngineError::EmptyHeaderRow(anchor.to_string()));
        }
        Self::from_headers(&headers)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnRef> {
        self.by_name.get(name)
    }

    /// Lookup that treats an absent header as a misconfiguration
    pub fn require(&self, name: &str) -> Result<&ColumnRef, EngineError> {
        self.get(name)
            .ok_or_else(|| EngineError::HeaderNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Header names in column order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 1-based index of the first tracked column (the label column span start)
    pub fn first_index(&self) -> Option<u32> {
        self.order.first().map(|name| self.by_name[name].index)
    }

    /// 1-based index of the last tracked column
    pub fn last_index(&self) -> Option<u32> {
        self.order.last().map(|name| self.by_name[name].index)
    }
}
