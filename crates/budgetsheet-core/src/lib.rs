pub mod cell;
pub mod error;
pub mod format;
pub mod grid;
pub mod range;
pub mod search;
pub mod sheet;
pub mod workbook;

pub use cell::{Cell, CellContent, CellValue};
pub use error::CoreError;
pub use format::{CellFormat, Color};
pub use grid::Grid;
pub use range::{col_from_label, col_to_label, CellCoord, CellRange};
pub use search::{find_cell_by_content, find_cell_matching};
pub use sheet::{Sheet, DEFAULT_ROW_HEIGHT};
pub use workbook::{Workbook, WorkbookMetadata};
