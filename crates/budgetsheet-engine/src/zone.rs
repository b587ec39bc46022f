use tracing::{info, warn};

use budgetsheet_core::{CellContent, CellCoord, CellValue, Sheet};
use budgetsheet_history::{InverseOp, UndoLedger};

use crate::config::ZoneConfig;
use crate::error::{EngineError, Outcome};
use crate::header::HeaderMap;

/// Insert a labeled zone separator row at each target.
///
/// Targets are processed descending so earlier insertions do not perturb
/// later target indices. Each zone row is a full-row insert with the fixed
/// highlight fill from the label column through the last tracked column, the
/// fixed row height, and the zone label in bold; every other column stays
/// blank and no formulas are written.
pub fn insert_zone_rows(
    sheet: &mut Sheet,
    headers: &HeaderMap,
    rows: &[u32],
    zone_name: &str,
    config: &ZoneConfig,
    ledger: &mut UndoLedger,
) -> Result<Outcome, EngineError> {
    let label = match headers.get(&config.label_column) {
        Some(label) => label.clone(),
        None => {
            warn!(
                label_column = %config.label_column,
                "zone label column not found, skipping zone rows"
            );
            return Ok(Outcome::skipped(format!(
                "zone label column '{}' not found in the header row",
                config.label_column
            )));
        }
    };
    let Some(last_index) = headers.last_index() else {
        return Ok(Outcome::skipped("header row is empty"));
    };

    let last_valid = sheet.last_row().map_or(1, |last| last + 2);
    let targets = crate::mutate::normalize_rows(rows, last_valid, true);
    if targets.is_empty() {
        return Ok(Outcome::skipped("no valid target rows"));
    }

    for &row in &targets {
        let grid_row = row - 1;

        sheet.insert_row(grid_row);
        sheet.set_row_height(grid_row, config.row_height);
        sheet.set_fill(grid_row, label.grid_col(), last_index - 1, Some(config.fill));

        let cell = sheet.get_cell_mut(CellCoord::new(grid_row, label.grid_col()));
        cell.content = CellContent::value(CellValue::Text(zone_name.to_string()));
        cell.format.bold = true;

        ledger.record(InverseOp::DeleteRow(row));
        info!(row, zone = zone_name, "inserted zone row");
    }

    Ok(Outcome::applied(targets))
}
