pub mod session;

use anyhow::{bail, Context};
use tracing::{debug, info, warn};

use budgetsheet_core::Workbook;
use budgetsheet_engine::{
    create_supplier_sheets, document_facts, insert_rows_between_columns, insert_zone_rows,
    mutate_rows, resolve_columns, EngineConfig, HeaderMap, Outcome, RowAction,
    RowMutationRequest, ZoneSpec,
};
use budgetsheet_history::UndoLedger;

/// One invocation from the external caller: an operation name plus the
/// positional arguments the macro passes along.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub operation: String,
    /// 1-based target rows
    pub rows: Vec<u32>,
    /// Supplier name, or the zone label when no separate label was given
    pub supplier: Option<String>,
    pub zone_name: Option<String>,
}

impl Invocation {
    /// Parse the comma-separated row list ("12, 15" -> [12, 15])
    pub fn parse_rows(spec: &str) -> anyhow::Result<Vec<u32>> {
        spec.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>()
                    .with_context(|| format!("invalid row number '{part}'"))
            })
            .collect()
    }

    /// The zone label: the dedicated argument when present, otherwise the
    /// shared name slot
    fn zone_label(&self) -> Option<&str> {
        self.zone_name.as_deref().or(self.supplier.as_deref())
    }
}

/// What dispatch decided, so the binary knows whether to save, print, or
/// just report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// The document changed and must be saved
    Mutated,
    /// Nothing changed (a skip, or a mutation with no valid targets)
    Unchanged,
    /// Read-only operation with a payload for stdout
    Output(String),
    /// Operation name not recognized; diagnostic, non-fatal
    UnknownOperation,
}

/// Run one operation against the open workbook.
///
/// Operation names accept both kebab-case and the legacy snake_case
/// spellings. Unknown names come back as `UnknownOperation` without touching
/// the document.
pub fn dispatch(
    workbook: &mut Workbook,
    config: &EngineConfig,
    invocation: &Invocation,
) -> anyhow::Result<DispatchResult> {
    let operation = invocation.operation.replace('_', "-");
    let source_sheet = workbook.active_sheet().name.clone();
    let mut ledger = UndoLedger::new();

    let result = match operation.as_str() {
        "get-metadata" => {
            let facts = document_facts(workbook.active_sheet(), &config.addresses)?;
            DispatchResult::Output(serde_json::to_string_pretty(&facts)?)
        }

        "create-supplier-sheets" => {
            let generated = create_supplier_sheets(
                workbook,
                &source_sheet,
                config,
                invocation.supplier.as_deref(),
            )?;
            info!(sheets = generated.len(), "supplier sheet generation finished");
            if generated.is_empty() {
                DispatchResult::Unchanged
            } else {
                DispatchResult::Mutated
            }
        }

        "insert-product-rows" | "insert-product-between-columns" => {
            let sheet = workbook.active_sheet_mut();
            let headers = HeaderMap::from_sheet(sheet, &config.addresses.header_start)?;
            let formulas = resolve_columns(&config.formulas, &headers);

            // the plain insert spans the whole tracked table; the
            // between-columns variant uses the configured span
            let (start_column, end_column) = if operation == "insert-product-rows" {
                let first = headers.names().next().map(str::to_string);
                let last = headers.names().last().map(str::to_string);
                match (first, last) {
                    (Some(first), Some(last)) => (first, last),
                    _ => bail!("the header row is empty"),
                }
            } else {
                (
                    config.product_span.start_column.clone(),
                    config.product_span.end_column.clone(),
                )
            };

            let outcome = insert_rows_between_columns(
                sheet,
                &headers,
                &invocation.rows,
                &start_column,
                &end_column,
                &formulas,
                &mut ledger,
            )?;
            outcome_result(outcome, &mut ledger)
        }

        "insert-zone-row" => {
            let Some(zone_name) = invocation.zone_label() else {
                bail!("insert-zone-row requires a zone name argument");
            };
            let sheet = workbook.active_sheet_mut();
            let headers = HeaderMap::from_sheet(sheet, &config.addresses.header_start)?;

            let outcome = insert_zone_rows(
                sheet,
                &headers,
                &invocation.rows,
                zone_name,
                &config.zone,
                &mut ledger,
            )?;
            outcome_result(outcome, &mut ledger)
        }

        "add-zone" | "delete-between-columns" => {
            let zone = if operation == "add-zone" {
                let Some(zone_name) = invocation.zone_label() else {
                    bail!("add-zone requires a zone name argument");
                };
                Some(ZoneSpec {
                    name: zone_name.to_string(),
                })
            } else {
                None
            };
            let action = if operation == "add-zone" {
                RowAction::Insert
            } else {
                RowAction::Delete
            };

            let sheet = workbook.active_sheet_mut();
            let headers = HeaderMap::from_sheet(sheet, &config.addresses.header_start)?;

            let request = RowMutationRequest {
                rows: invocation.rows.clone(),
                action,
                start_column: config.product_span.start_column.clone(),
                end_column: config.product_span.end_column.clone(),
                zone,
            };
            let outcome = mutate_rows(sheet, &headers, &request, &config.zone, &mut ledger)?;
            outcome_result(outcome, &mut ledger)
        }

        _ => {
            warn!(operation = %invocation.operation, "unknown operation");
            DispatchResult::UnknownOperation
        }
    };

    Ok(result)
}

fn outcome_result(outcome: Outcome, ledger: &mut UndoLedger) -> DispatchResult {
    debug!(undo_entries = ledger.len(), "ledger at operation end");
    match outcome {
        Outcome::Applied { rows } => {
            info!(rows = rows.len(), "operation applied");
            DispatchResult::Mutated
        }
        Outcome::Skipped { reason } => {
            warn!(%reason, "operation skipped");
            DispatchResult::Unchanged
        }
    }
}
