use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use budgetsheet_core::{CellCoord, CellValue, Sheet};
use budgetsheet_history::{InverseOp, UndoLedger};

use crate::config::ZoneConfig;
use crate::error::{EngineError, Outcome};
use crate::header::HeaderMap;
use crate::template::apply_row;

/// What to do with the targeted rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Insert,
    Delete,
}

/// Zone labeling attached to an insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSpec {
    pub name: String,
}

/// A batch row mutation between two named columns.
///
/// The action and the optional zone are explicit variants instead of the
/// stringly-typed flags the external caller speaks; the CLI boundary maps
/// operation names onto this and rejects anything else before the engine
/// runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMutationRequest {
    /// 1-based target rows, as supplied by the caller
    pub rows: Vec<u32>,
    pub action: RowAction,
    pub start_column: String,
    pub end_column: String,
    pub zone: Option<ZoneSpec>,
}

/// Validate a row batch: drop duplicates, skip out-of-range targets with a
/// diagnostic, and order the survivors. Inserts are processed descending so
/// earlier insertions do not perturb later target indices; deletes ascending
/// (the ordering the tool has always used, preserved exactly).
pub(crate) fn normalize_rows(rows: &[u32], last_valid: u32, descending: bool) -> Vec<u32> {
    let mut seen = BTreeSet::new();

    for &row in rows {
        if row == 0 || row > last_valid {
            warn!(row, last_valid, "skipping out-of-range target row");
            continue;
        }
        if !seen.insert(row) {
            debug!(row, "dropping duplicate target row");
        }
    }

    let ordered: Vec<u32> = if descending {
        seen.into_iter().rev().collect()
    } else {
        seen.into_iter().collect()
    };
    ordered
}

/// Insert a blank product row below each target, restricted to the span
/// between `start_column` and `end_column`, and fill in the templated
/// formulas for the new row.
///
/// Rows are processed in descending order so the not-yet-processed targets
/// keep their numbering as the grid shifts down. Each inserted row gets its
/// fill cleared, its formulas written with the literal row number, and a
/// matching `DeleteRow` entry in the ledger.
pub fn insert_rows_between_columns(
    sheet: &mut Sheet,
    headers: &HeaderMap,
    rows: &[u32],
    start_column: &str,
    end_column: &str,
    formulas: &BTreeMap<String, String>,
    ledger: &mut UndoLedger,
) -> Result<Outcome, EngineError> {
    let (start, end) = match (headers.get(start_column), headers.get(end_column)) {
        (Some(start), Some(end)) => (start.clone(), end.clone()),
        _ => {
            warn!(start_column, end_column, "columns not found, skipping insert");
            return Ok(Outcome::skipped(format!(
                "columns '{start_column}' or '{end_column}' not found in the header row"
            )));
        }
    };

    let last_valid = sheet.last_row().map_or(1, |last| last + 2);
    let targets = normalize_rows(rows, last_valid, true);
    if targets.is_empty() {
        return Ok(Outcome::skipped("no valid target rows"));
    }

    for &row in &targets {
        let grid_row = row - 1;
        sheet.insert_row_span(grid_row, start.grid_col(), end.grid_col());
        sheet.set_fill(grid_row, start.grid_col(), end.grid_col(), None);

        for (column_name, formula) in formulas {
            if let Some(column) = headers.get(column_name) {
                sheet.set_formula(
                    CellCoord::new(grid_row, column.grid_col()),
                    apply_row(formula, row),
                );
            }
        }

        ledger.record(InverseOp::DeleteRow(row));
        info!(row, start_column, end_column, "inserted product row");
    }

    Ok(Outcome::applied(targets))
}

/// Add or delete row segments between two named columns.
///
/// On insert with a zone, the zone name lands in the configured label column
/// of the new row and the span is filled with the zone color; without a zone
/// the new span gets no fill. On delete the span shifts up. Every insert
/// records a `DeleteRow` inverse and every delete an `InsertRow` inverse.
pub fn mutate_rows(
    sheet: &mut Sheet,
    headers: &HeaderMap,
    request: &RowMutationRequest,
    zone_config: &ZoneConfig,
    ledger: &mut UndoLedger,
) -> Result<Outcome, EngineError> {
    let (start, end) = match (
        headers.get(&request.start_column),
        headers.get(&request.end_column),
    ) {
        (Some(start), Some(end)) => (start.clone(), end.clone()),
        _ => {
            warn!(
                start_column = %request.start_column,
                end_column = %request.end_column,
                "columns not found, skipping row mutation"
            );
            return Ok(Outcome::skipped(format!(
                "columns '{}' or '{}' not found in the header row",
                request.start_column, request.end_column
            )));
        }
    };

    let label = match &request.zone {
        Some(_) => match headers.get(&zone_config.label_column) {
            Some(label) => Some(label.clone()),
            None => {
                warn!(
                    label_column = %zone_config.label_column,
                    "zone label column not found, skipping row mutation"
                );
                return Ok(Outcome::skipped(format!(
                    "zone label column '{}' not found in the header row",
                    zone_config.label_column
                )));
            }
        },
        None => None,
    };

    let last_row = sheet.last_row().map_or(0, |last| last + 1);
    let targets = match request.action {
        RowAction::Insert => normalize_rows(&request.rows, last_row + 1, true),
        RowAction::Delete => normalize_rows(&request.rows, last_row, false),
    };
    if targets.is_empty() {
        return Ok(Outcome::skipped("no valid target rows"));
    }

    for &row in &targets {
        let grid_row = row - 1;

        match request.action {
            RowAction::Insert => {
                sheet.insert_row_span(grid_row, start.grid_col(), end.grid_col());

                match (&request.zone, &label) {
                    (Some(zone), Some(label)) => {
                        sheet.set_fill(
                            grid_row,
                            start.grid_col(),
                            end.grid_col(),
                            Some(zone_config.fill),
                        );
                        sheet.set_value(
                            CellCoord::new(grid_row, label.grid_col()),
                            CellValue::Text(zone.name.clone()),
                        );
                        info!(row, zone = %zone.name, "added zone row");
                    }
                    _ => {
                        sheet.set_fill(grid_row, start.grid_col(), end.grid_col(), None);
                        info!(
                            row,
                            start_column = %request.start_column,
                            end_column = %request.end_column,
                            "added row"
                        );
                    }
                }

                ledger.record(InverseOp::DeleteRow(row));
            }
            RowAction::Delete => {
                sheet.delete_row_span(grid_row, start.grid_col(), end.grid_col());
                ledger.record(InverseOp::InsertRow(row));
                info!(
                    row,
                    start_column = %request.start_column,
                    end_column = %request.end_column,
                    "deleted row"
                );
            }
        }
    }

    Ok(Outcome::applied(targets))
}

/// Delete a batch of full rows, falling back to a per-row loop in reverse
/// order when the bulk call rejects the batch. Returns how many rows were
/// actually deleted.
pub fn delete_rows_bulk(sheet: &mut Sheet, rows: &[u32]) -> usize {
    if rows.is_empty() {
        return 0;
    }

    let grid_rows: Vec<u32> = rows.iter().filter(|&&r| r >= 1).map(|&r| r - 1).collect();
    match sheet.delete_rows(&grid_rows) {
        Ok(()) => grid_rows.len(),
        Err(err) => {
            warn!(%err, "bulk row delete rejected, retrying row by row");

            let mut sorted = grid_rows;
            sorted.sort_unstable();
            sorted.dedup();

            let mut deleted = 0;
            for &grid_row in sorted.iter().rev() {
                match sheet.last_row() {
                    Some(last) if grid_row <= last => {
                        sheet.delete_row(grid_row);
                        deleted += 1;
                    }
                    _ => {
                        warn!(row = grid_row + 1, "skipping out-of-range row in fallback delete");
                    }
                }
            }
            deleted
        }
    }
}
