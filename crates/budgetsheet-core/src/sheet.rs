use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cell::{Cell, CellContent, CellValue};
use crate::error::CoreError;
use crate::format::Color;
use crate::grid::{grid_serde, Grid};
use crate::range::CellCoord;

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 24.0;

fn default_row_height() -> f64 {
    DEFAULT_ROW_HEIGHT
}

/// A single sheet with sparse cell storage.
///
/// Rows and columns are 0-indexed internally; the A1 helpers translate from
/// the 1-indexed addresses used by the configuration and by callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sheet {
    /// Sheet name (displayed in tab)
    pub name: String,
    /// Sparse cell storage - only non-empty cells are kept
    #[serde(default, with = "grid_serde")]
    cells: Grid,
    /// Custom row heights (row index -> height in points)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub row_heights: HashMap<u32, f64>,
    /// Height for rows without a custom height
    #[serde(default = "default_row_height")]
    pub default_row_height: f64,
}

impl Sheet {
    /// Maximum number of rows (Excel compatibility)
    pub const MAX_ROWS: u32 = 1_048_576;
    /// Maximum number of columns (column XFD)
    pub const MAX_COLS: u32 = 16_384;

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Grid::new(),
            row_heights: HashMap::new(),
            default_row_height: DEFAULT_ROW_HEIGHT,
        }
    }

    // --- Cell access ---

    pub fn get_cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(coord.row, coord.col)
    }

    /// Mutable access, creating the cell if it does not exist
    pub fn get_cell_mut(&mut self, coord: CellCoord) -> &mut Cell {
        if self.cells.get(coord.row, coord.col).is_none() {
            self.cells.insert(coord.row, coord.col, Cell::default());
        }
        self.cells
            .get_mut(coord.row, coord.col)
            .expect("cell was just inserted")
    }

    pub fn set_cell(&mut self, coord: CellCoord, cell: Cell) {
        if cell.is_empty() {
            self.cells.remove(coord.row, coord.col);
        } else {
            self.cells.insert(coord.row, coord.col, cell);
        }
    }

    pub fn set_value(&mut self, coord: CellCoord, value: CellValue) {
        let cell = self.get_cell_mut(coord);
        cell.content = CellContent::value(value);
        if cell.is_empty() {
            self.cells.remove(coord.row, coord.col);
        }
    }

    pub fn set_formula(&mut self, coord: CellCoord, expression: impl Into<String>) {
        let cell = self.get_cell_mut(coord);
        cell.content = CellContent::formula(expression);
    }

    pub fn remove_cell(&mut self, coord: CellCoord) {
        self.cells.remove(coord.row, coord.col);
    }

    /// Computed value at a coordinate (Empty for non-existent cells)
    pub fn get_cell_value(&self, coord: CellCoord) -> &CellValue {
        self.get_cell(coord)
            .map(|c| c.computed_value())
            .unwrap_or(&CellValue::Empty)
    }

    /// Display text at a coordinate (empty string for non-existent cells)
    pub fn cell_text(&self, coord: CellCoord) -> String {
        self.get_cell_value(coord).as_text()
    }

    // --- A1 address helpers ---

    pub fn value_at(&self, address: &str) -> Result<CellValue, CoreError> {
        let coord = CellCoord::from_a1(address)?;
        Ok(self.get_cell_value(coord).clone())
    }

    pub fn set_value_at(&mut self, address: &str, value: CellValue) -> Result<(), CoreError> {
        let coord = CellCoord::from_a1(address)?;
        self.set_value(coord, value);
        Ok(())
    }

    pub fn formula_at(&self, address: &str) -> Result<Option<String>, CoreError> {
        let coord = CellCoord::from_a1(address)?;
        Ok(self
            .get_cell(coord)
            .and_then(|c| c.content.formula_expression())
            .map(|s| s.to_string()))
    }

    // --- Discovery ---

    /// Read the contiguous run of non-empty cell texts starting at `anchor`
    /// and expanding to the right. This is how the header row is discovered
    /// from the header anchor cell.
    pub fn expand_right(&self, anchor: CellCoord) -> Vec<String> {
        let mut out = Vec::new();
        let mut col = anchor.col;

        loop {
            let text = self.cell_text(CellCoord::new(anchor.row, col));
            if text.is_empty() {
                break;
            }
            out.push(text);
            if col + 1 >= Self::MAX_COLS {
                break;
            }
            col += 1;
        }

        out
    }

    /// Bounding box of non-empty cells
    pub fn used_range(&self) -> Option<(CellCoord, CellCoord)> {
        self.cells.bounds().map(|(min_row, min_col, max_row, max_col)| {
            (
                CellCoord::new(min_row, min_col),
                CellCoord::new(max_row, max_col),
            )
        })
    }

    /// Last row containing any cell
    pub fn last_row(&self) -> Option<u32> {
        self.used_range().map(|(_, end)| end.row)
    }

    /// Row-major iteration over non-empty cells
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellCoord, &Cell)> {
        self.cells
            .iter()
            .map(|((row, col), cell)| (CellCoord::new(*row, *col), cell))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    // --- Row heights ---

    pub fn get_row_height(&self, row: u32) -> f64 {
        *self
            .row_heights
            .get(&row)
            .unwrap_or(&self.default_row_height)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        if (height - self.default_row_height).abs() < 0.01 {
            self.row_heights.remove(&row);
        } else {
            self.row_heights.insert(row, height);
        }
    }

    fn shift_row_heights(&mut self, at_row: u32, down: bool) {
        let shifted: HashMap<u32, f64> = self
            .row_heights
            .drain()
            .filter_map(|(row, height)| {
                if row < at_row {
                    Some((row, height))
                } else if down {
                    Some((row + 1, height))
                } else if row == at_row {
                    // height of the deleted row is dropped
                    None
                } else {
                    Some((row - 1, height))
                }
            })
            .collect();
        self.row_heights = shifted;
    }

    // --- Structural edits ---

    /// Insert a blank row segment at `row`, restricted to columns
    /// `[col_start, col_end]`. Cells in the span at or below `row` shift
    /// down by one; cells outside the span are untouched.
    pub fn insert_row_span(&mut self, row: u32, col_start: u32, col_end: u32) {
        let moved = self
            .cells
            .take_matching(|r, c| r >= row && c >= col_start && c <= col_end);
        for ((r, c), cell) in moved {
            self.cells.insert(r + 1, c, cell);
        }
    }

    /// Delete the row segment at `row` restricted to `[col_start, col_end]`,
    /// shifting cells in the span below it up by one.
    pub fn delete_row_span(&mut self, row: u32, col_start: u32, col_end: u32) {
        self.cells
            .take_matching(|r, c| r == row && c >= col_start && c <= col_end);
        let moved = self
            .cells
            .take_matching(|r, c| r > row && c >= col_start && c <= col_end);
        for ((r, c), cell) in moved {
            self.cells.insert(r - 1, c, cell);
        }
    }

    /// Insert a full blank row at `row`, shifting everything below it down
    pub fn insert_row(&mut self, row: u32) {
        self.insert_row_span(row, 0, Self::MAX_COLS - 1);
        self.shift_row_heights(row, true);
    }

    /// Delete the full row at `row`, shifting everything below it up
    pub fn delete_row(&mut self, row: u32) {
        self.delete_row_span(row, 0, Self::MAX_COLS - 1);
        self.shift_row_heights(row, false);
    }

    /// Delete a batch of full rows in one call.
    ///
    /// The whole batch is validated up front: if any target lies beyond the
    /// used range the call rejects with `RowOutOfBounds` and nothing is
    /// deleted. Callers that want partial progress fall back to per-row
    /// deletes (see the engine's bulk-delete fallback).
    pub fn delete_rows(&mut self, rows: &[u32]) -> Result<(), CoreError> {
        let last = self.last_row().unwrap_or(0);
        for &row in rows {
            if row > last {
                return Err(CoreError::RowOutOfBounds { row, last });
            }
        }

        let mut sorted: Vec<u32> = rows.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        // bottom-up so earlier deletes don't shift later targets
        for &row in sorted.iter().rev() {
            self.delete_row(row);
        }
        Ok(())
    }

    /// Delete a full column, shifting columns to the right of it left
    pub fn delete_col(&mut self, col: u32) {
        self.cells.take_matching(|_, c| c == col);
        let moved = self.cells.take_matching(|_, c| c > col);
        for ((r, c), cell) in moved {
            self.cells.insert(r, c - 1, cell);
        }
    }

    /// Delete a batch of columns (indices refer to the layout before any of
    /// the deletes). Processed right-to-left so indices stay valid.
    pub fn delete_cols(&mut self, cols: &[u32]) {
        let mut sorted: Vec<u32> = cols.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for &col in sorted.iter().rev() {
            self.delete_col(col);
        }
    }

    // --- Formatting ---

    /// Apply or clear the fill color across a row segment. `Some(color)`
    /// paints every cell in the span (creating blank cells where needed);
    /// `None` clears the fill on existing cells.
    pub fn set_fill(&mut self, row: u32, col_start: u32, col_end: u32, fill: Option<Color>) {
        for col in col_start..=col_end {
            let coord = CellCoord::new(row, col);
            match fill {
                Some(color) => {
                    self.get_cell_mut(coord).format.background_color = Some(color);
                }
                None => {
                    if let Some(cell) = self.cells.get_mut(row, col) {
                        cell.format.clear_background();
                        if cell.is_empty() {
                            self.cells.remove(row, col);
                        }
                    }
                }
            }
        }
    }
}
