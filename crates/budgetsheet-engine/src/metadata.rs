use serde::Serialize;

use budgetsheet_core::{CellCoord, CellValue, Sheet};

use crate::config::FixedAddresses;
use crate::error::EngineError;

/// Project facts read from the fixed addresses, plus the discovered header
/// row. This is what the external caller asks for before deciding which
/// rows to edit.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentFacts {
    pub nr_project: CellValue,
    pub client_name: CellValue,
    pub local: CellValue,
    pub markup_factor: CellValue,
    pub contracted_m3_value: CellValue,
    pub headers: Vec<String>,
}

/// Extract project details and header information from the source sheet
pub fn document_facts(
    sheet: &Sheet,
    addresses: &FixedAddresses,
) -> Result<DocumentFacts, EngineError> {
    let anchor = CellCoord::from_a1(&addresses.header_start)?;

    Ok(DocumentFacts {
        nr_project: sheet.value_at(&addresses.nr_project)?,
        client_name: sheet.value_at(&addresses.client_name)?,
        local: sheet.value_at(&addresses.local)?,
        markup_factor: sheet.value_at(&addresses.markup)?,
        contracted_m3_value: sheet.value_at(&addresses.contracted_meter_value)?,
        headers: sheet.expand_right(anchor),
    })
}
