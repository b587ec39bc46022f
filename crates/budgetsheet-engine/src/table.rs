use budgetsheet_core::{CellCoord, CellValue, Sheet};

use crate::error::EngineError;
use crate::header::HeaderMap;

/// One data row of the budget table, with the values aligned to the header
/// order and the 1-based sheet row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub source_row: u32,
    values: Vec<CellValue>,
}

impl TableRow {
    /// Value under the given header, if the header exists
    pub fn value<'a>(&'a self, headers: &HeaderMap, name: &str) -> Option<&'a CellValue> {
        let position = headers.get(name)?.index.checked_sub(2)? as usize;
        self.values.get(position)
    }

    /// Display text under the given header (empty for absent headers)
    pub fn text(&self, headers: &HeaderMap, name: &str) -> String {
        self.value(headers, name)
            .map(|v| v.as_text())
            .unwrap_or_default()
    }

    /// True when every cell of the row is empty
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.is_empty())
    }
}

/// Immutable snapshot of the full budget table.
///
/// The header row defines the column order and is fixed for the duration of
/// one operation; the snapshot never aliases the live sheet, so derivative
/// generation cannot corrupt the source.
#[derive(Debug, Clone)]
pub struct BudgetTable {
    headers: HeaderMap,
    rows: Vec<TableRow>,
    /// 1-based sheet row of the header row
    pub header_row: u32,
}

impl BudgetTable {
    /// Read the table from a sheet, discovering headers at the anchor and
    /// taking every row from below the header down to the last used row.
    pub fn read(sheet: &Sheet, header_anchor: &str) -> Result<Self, EngineError> {
        let anchor = CellCoord::from_a1(header_anchor)?;
        let headers = HeaderMap::from_sheet(sheet, header_anchor)?;

        let mut rows = Vec::new();
        if let Some(last_row) = sheet.last_row() {
            for grid_row in (anchor.row + 1)..=last_row {
                let values: Vec<CellValue> = headers
                    .names()
                    .map(|name| {
                        let col = headers
                            .get(name)
                            .expect("name came from the header map")
                            .grid_col();
                        sheet.get_cell_value(CellCoord::new(grid_row, col)).clone()
                    })
                    .collect();
                rows.push(TableRow {
                    source_row: grid_row + 1,
                    values,
                });
            }
        }

        Ok(Self {
            headers,
            rows,
            header_row: anchor.row + 1,
        })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// 1-based sheet row where data starts
    pub fn first_data_row(&self) -> u32 {
        self.header_row + 1
    }

    /// 1-based sheet row of the last data row
    pub fn last_data_row(&self) -> Option<u32> {
        self.rows.last().map(|r| r.source_row)
    }
}
