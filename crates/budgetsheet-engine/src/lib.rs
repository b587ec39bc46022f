pub mod config;
pub mod error;
pub mod header;
pub mod metadata;
pub mod mutate;
pub mod supplier;
pub mod table;
pub mod template;
pub mod zone;

pub use config::{EngineConfig, SheetStrategy, SupplierPair, ZoneConfig};
pub use error::{EngineError, Outcome};
pub use header::{column_index, column_letter, ColumnRef, HeaderMap};
pub use metadata::{document_facts, DocumentFacts};
pub use mutate::{
    delete_rows_bulk, insert_rows_between_columns, mutate_rows, RowAction, RowMutationRequest,
    ZoneSpec,
};
pub use supplier::{create_supplier_sheets, GeneratedSheet};
pub use table::{BudgetTable, TableRow};
pub use template::{apply_row, resolve_columns, ROW_PLACEHOLDER};
pub use zone::insert_zone_rows;
