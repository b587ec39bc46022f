use regex::Regex;

use crate::range::CellCoord;
use crate::sheet::Sheet;

/// Find the first cell whose display text equals `content` exactly.
///
/// The scan is row-major over the used range (left to right, top to bottom),
/// so when a sheet holds the same label twice the topmost-leftmost hit wins.
pub fn find_cell_by_content(sheet: &Sheet, content: &str) -> Option<CellCoord> {
    sheet
        .iter_cells()
        .find(|(_, cell)| cell.computed_value().as_text() == content)
        .map(|(coord, _)| coord)
}

/// Find the first cell whose display text matches the given pattern.
pub fn find_cell_matching(sheet: &Sheet, pattern: &Regex) -> Option<CellCoord> {
    sheet
        .iter_cells()
        .find(|(_, cell)| pattern.is_match(&cell.computed_value().as_text()))
        .map(|(coord, _)| coord)
}
