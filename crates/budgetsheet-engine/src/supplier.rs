use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info, warn};

use budgetsheet_core::{find_cell_by_content, CellCoord, CellValue, Sheet, Workbook};

use crate::config::{EngineConfig, SheetStrategy, SupplierConfig, SupplierPair};
use crate::error::EngineError;
use crate::header::column_letter;
use crate::mutate::delete_rows_bulk;
use crate::table::{BudgetTable, TableRow};

/// Summary of one generated derivative sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSheet {
    /// Supplier display name (first-seen casing), also the sheet name
    pub supplier: String,
    /// Number of article rows on the derivative
    pub rows: usize,
}

/// Generate one derivative sheet per distinct supplier found across the
/// configured supplier columns.
///
/// Suppliers are compared trimmed and case-insensitively but keep their
/// first-seen casing for display. A supplier with no matching rows is
/// skipped silently; `only_supplier` narrows generation to a single name.
/// The source table is snapshotted up front, so generating one derivative
/// can never corrupt the source or another supplier's sheet.
pub fn create_supplier_sheets(
    workbook: &mut Workbook,
    source_sheet: &str,
    config: &EngineConfig,
    only_supplier: Option<&str>,
) -> Result<Vec<GeneratedSheet>, EngineError> {
    let sup = &config.supplier;

    let source = workbook
        .get_sheet_by_name(source_sheet)
        .ok_or_else(|| EngineError::SheetNotFound(source_sheet.to_string()))?;
    let table = BudgetTable::read(source, &config.addresses.header_start)?;

    for pair in &sup.pairs {
        if !table.headers().contains(&pair.name_column) {
            warn!(column = %pair.name_column, "supplier name column not found in the header row");
        }
    }

    let mut suppliers: BTreeMap<String, String> = BTreeMap::new();
    for row in table.rows() {
        for pair in &sup.pairs {
            let text = row.text(table.headers(), &pair.name_column);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            suppliers
                .entry(normalize(trimmed))
                .or_insert_with(|| trimmed.to_string());
        }
    }

    if let Some(only) = only_supplier {
        let key = normalize(only);
        suppliers.retain(|k, _| *k == key);
    }

    let mut generated = Vec::new();
    for (key, display_name) in &suppliers {
        let matching: Vec<&TableRow> = table
            .rows()
            .iter()
            .filter(|row| row_matches(row, &table, &sup.pairs, key))
            .collect();
        if matching.is_empty() {
            debug!(supplier = %display_name, "no matching rows, skipping");
            continue;
        }
        if display_name == source_sheet
            || sup.template_sheet.as_deref() == Some(display_name.as_str())
        {
            warn!(supplier = %display_name, "supplier name collides with a protected sheet, skipping");
            continue;
        }

        let rows = match sup.strategy {
            SheetStrategy::SourceCopy => {
                build_from_source(workbook, source_sheet, &table, sup, display_name, key, &matching)?
            }
            SheetStrategy::TemplateCopy => {
                build_from_template(workbook, &table, sup, display_name, key, &matching)?
            }
        };

        info!(supplier = %display_name, rows, "generated supplier sheet");
        generated.push(GeneratedSheet {
            supplier: display_name.clone(),
            rows,
        });
    }

    Ok(generated)
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn row_matches(row: &TableRow, table: &BudgetTable, pairs: &[SupplierPair], key: &str) -> bool {
    pairs
        .iter()
        .any(|pair| normalize(&row.text(table.headers(), &pair.name_column)) == key)
}

/// True when `column` belongs to a name/cost pair whose supplier does not
/// match the derivative being built; such cells are nulled (step 4).
fn suppressed_by_pair(
    column: &str,
    row: &TableRow,
    table: &BudgetTable,
    pairs: &[SupplierPair],
    key: &str,
) -> bool {
    pairs.iter().any(|pair| {
        (pair.name_column == column || pair.cost_column == column)
            && normalize(&row.text(table.headers(), &pair.name_column)) != key
    })
}

/// Grid columns backing the two per-row cost formulas, resolved once per
/// derivative layout so a misconfigured column aborts before any sheet is
/// touched.
struct CostColumns {
    span_start: u32,
    span_end: u32,
    unit_cost: u32,
    quantity: u32,
    total_cost: u32,
}

impl CostColumns {
    fn resolve(layout: &HashMap<String, u32>, sup: &SupplierConfig) -> Result<Self, EngineError> {
        let col = |name: &str| {
            layout
                .get(name)
                .copied()
                .ok_or_else(|| EngineError::HeaderNotFound(name.to_string()))
        };
        Ok(Self {
            span_start: col(&sup.cost_span.start_column)?,
            span_end: col(&sup.cost_span.end_column)?,
            unit_cost: col(&sup.unit_cost_column)?,
            quantity: col(&sup.quantity_column)?,
            total_cost: col(&sup.total_cost_column)?,
        })
    }

    /// Write the "unit cost" and "total cost" formulas with literal row
    /// numbers (`sheet_row` is 1-based)
    fn write_formulas(&self, sheet: &mut Sheet, sheet_row: u32) {
        let grid_row = sheet_row - 1;
        sheet.set_formula(
            CellCoord::new(grid_row, self.unit_cost),
            format!(
                "=SUM({start}{row}:{end}{row})",
                start = column_letter(self.span_start + 1),
                end = column_letter(self.span_end + 1),
                row = sheet_row,
            ),
        );
        sheet.set_formula(
            CellCoord::new(grid_row, self.total_cost),
            format!(
                "={unit}{row}*{qty}{row}",
                unit = column_letter(self.unit_cost + 1),
                qty = column_letter(self.quantity + 1),
                row = sheet_row,
            ),
        );
    }
}

/// Source-copy strategy: duplicate the source sheet, null foreign supplier
/// pairs, drop non-matching rows, prune columns down to the allow-list.
fn build_from_source(
    workbook: &mut Workbook,
    source_sheet: &str,
    table: &BudgetTable,
    sup: &SupplierConfig,
    display: &str,
    key: &str,
    matching: &[&TableRow],
) -> Result<usize, EngineError> {
    let headers = table.headers();
    let keep_cols: HashSet<&str> = sup.keep_columns.iter().map(String::as_str).collect();

    // layout after pruning: kept columns stay in source order, packed from
    // column B (column A is reserved and untouched)
    let mut layout: HashMap<String, u32> = HashMap::new();
    let mut next = 1u32;
    for name in headers.names() {
        if keep_cols.contains(name) {
            layout.insert(name.to_string(), next);
            next += 1;
        }
    }
    let cost = CostColumns::resolve(&layout, sup)?;

    // replace any pre-existing derivative of the same name
    workbook.remove_sheet_by_name(display)?;
    let index = workbook.duplicate_sheet_named(source_sheet, display)?;
    let sheet = workbook
        .get_sheet_mut(index)
        .expect("sheet was just created");

    // null foreign pair cells while the original coordinates still hold
    for row in matching {
        for pair in &sup.pairs {
            if normalize(&row.text(headers, &pair.name_column)) == key {
                continue;
            }
            for column_name in [&pair.name_column, &pair.cost_column] {
                if let Some(column) = headers.get(column_name) {
                    sheet.remove_cell(CellCoord::new(row.source_row - 1, column.grid_col()));
                }
            }
        }
    }

    // drop every data row that does not belong to this supplier
    let keep_rows: HashSet<u32> = matching.iter().map(|r| r.source_row).collect();
    let doomed: Vec<u32> = table
        .rows()
        .iter()
        .map(|r| r.source_row)
        .filter(|r| !keep_rows.contains(r))
        .collect();
    delete_rows_bulk(sheet, &doomed);

    // prune columns outside the allow-list, right to left
    let doomed_cols: Vec<u32> = headers
        .names()
        .filter(|name| !keep_cols.contains(name))
        .map(|name| headers.get(name).expect("name came from the header map").grid_col())
        .collect();
    sheet.delete_cols(&doomed_cols);

    // surviving rows are packed under the header row in original order
    for i in 0..matching.len() {
        cost.write_formulas(sheet, table.first_data_row() + i as u32);
    }

    sheet.set_value_at(&sup.name_anchor, CellValue::Text(display.to_string()))?;
    Ok(matching.len())
}

/// Template-copy strategy: duplicate the configured template sheet, locate
/// its columns by header content, and append the filtered rows under its
/// header row.
fn build_from_template(
    workbook: &mut Workbook,
    table: &BudgetTable,
    sup: &SupplierConfig,
    display: &str,
    key: &str,
    matching: &[&TableRow],
) -> Result<usize, EngineError> {
    let template_name = sup
        .template_sheet
        .as_deref()
        .ok_or(EngineError::TemplateSheetNotConfigured)?;
    let template = workbook
        .get_sheet_by_name(template_name)
        .ok_or_else(|| EngineError::TemplateSheetMissing(template_name.to_string()))?;

    // locate the template's columns by header content; its layout is free to
    // differ from the source table
    let mut layout: HashMap<String, u32> = HashMap::new();
    let mut header_grid_row: Option<u32> = None;
    for name in &sup.keep_columns {
        if let Some(coord) = find_cell_by_content(template, name) {
            layout.insert(name.clone(), coord.col);
            header_grid_row.get_or_insert(coord.row);
        }
    }
    let Some(header_grid_row) = header_grid_row else {
        return Err(EngineError::TemplateSheetMissing(format!(
            "{template_name} (no configured columns found)"
        )));
    };
    let cost = CostColumns::resolve(&layout, sup)?;

    workbook.remove_sheet_by_name(display)?;
    let index = workbook.duplicate_sheet_named(template_name, display)?;
    let sheet = workbook
        .get_sheet_mut(index)
        .expect("sheet was just created");

    let headers = table.headers();
    for (i, row) in matching.iter().enumerate() {
        let grid_row = header_grid_row + 1 + i as u32;

        for (name, &col) in &layout {
            if suppressed_by_pair(name, row, table, &sup.pairs, key) {
                continue;
            }
            let Some(value) = row.value(headers, name) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            sheet.set_value(CellCoord::new(grid_row, col), value.clone());
        }

        cost.write_formulas(sheet, grid_row + 1);
    }

    sheet.set_value_at(&sup.name_anchor, CellValue::Text(display.to_string()))?;
    Ok(matching.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetsheet_core::Cell;

    use crate::config::ColumnSpan;

    const HEADERS: [&str; 10] = [
        "Artigo",
        "Descrição",
        "Qtd",
        "Observações",
        "Fornecedor Produção 1",
        "Fornecedor Material/Tecido 1",
        "Produção 1",
        "Material/Tecido 1",
        "Custo Unitário",
        "Custo Total",
    ];

    fn test_config(strategy: SheetStrategy) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.supplier = SupplierConfig {
            pairs: vec![
                SupplierPair {
                    name_column: "Fornecedor Produção 1".into(),
                    cost_column: "Produção 1".into(),
                },
                SupplierPair {
                    name_column: "Fornecedor Material/Tecido 1".into(),
                    cost_column: "Material/Tecido 1".into(),
                },
            ],
            keep_columns: HEADERS
                .iter()
                .filter(|h| **h != "Observações")
                .map(|h| h.to_string())
                .collect(),
            quantity_column: "Qtd".into(),
            unit_cost_column: "Custo Unitário".into(),
            total_cost_column: "Custo Total".into(),
            cost_span: ColumnSpan {
                start_column: "Produção 1".into(),
                end_column: "Material/Tecido 1".into(),
            },
            strategy,
            template_sheet: None,
            name_anchor: "B6".into(),
        };
        config
    }

    /// Source sheet with MINDOL on rows 11 and 13 and ACME on rows 11-13
    fn test_workbook() -> Workbook {
        let mut workbook = Workbook::new("Teste");
        workbook.rename_sheet(0, "Orçamento").unwrap();

        let sheet = workbook.active_sheet_mut();
        sheet
            .set_value_at("B6", CellValue::Text("N116".into()))
            .unwrap();
        for (i, header) in HEADERS.iter().enumerate() {
            sheet.set_cell(CellCoord::new(9, 1 + i as u32), Cell::text(*header));
        }

        let put = |sheet: &mut Sheet, row: u32, col: u32, cell: Cell| {
            sheet.set_cell(CellCoord::new(row - 1, col), cell);
        };
        // row 11: Mesa - MINDOL produces, ACME supplies material
        put(sheet, 11, 1, Cell::text("Mesa"));
        put(sheet, 11, 2, Cell::text("Mesa de jantar"));
        put(sheet, 11, 3, Cell::number(2.0));
        put(sheet, 11, 4, Cell::text("confirmar medidas"));
        put(sheet, 11, 5, Cell::text("MINDOL"));
        put(sheet, 11, 6, Cell::text("ACME"));
        put(sheet, 11, 7, Cell::number(100.0));
        put(sheet, 11, 8, Cell::number(50.0));
        // row 12: Cadeira - ACME only
        put(sheet, 12, 1, Cell::text("Cadeira"));
        put(sheet, 12, 3, Cell::number(1.0));
        put(sheet, 12, 5, Cell::text("ACME"));
        put(sheet, 12, 7, Cell::number(80.0));
        // row 13: Sofá - mindol (odd casing) plus ACME material
        put(sheet, 13, 1, Cell::text("Sofá"));
        put(sheet, 13, 3, Cell::number(3.0));
        put(sheet, 13, 5, Cell::text(" mindol "));
        put(sheet, 13, 6, Cell::text("ACME"));
        put(sheet, 13, 7, Cell::number(120.0));
        put(sheet, 13, 8, Cell::number(30.0));
        // row 14: no supplier assigned yet
        put(sheet, 14, 1, Cell::text("Aparador"));
        put(sheet, 14, 3, Cell::number(1.0));

        workbook
    }

    #[test]
    fn test_source_copy_generates_filtered_derivatives() {
        let mut workbook = test_workbook();
        let source_before = workbook.get_sheet_by_name("Orçamento").unwrap().clone();
        let config = test_config(SheetStrategy::SourceCopy);

        let generated =
            create_supplier_sheets(&mut workbook, "Orçamento", &config, None).unwrap();

        // discovery is case-insensitive and keeps first-seen casing
        assert_eq!(generated.len(), 2);
        assert_eq!(generated[0].supplier, "ACME");
        assert_eq!(generated[0].rows, 3);
        assert_eq!(generated[1].supplier, "MINDOL");
        assert_eq!(generated[1].rows, 2);

        let mindol = workbook.get_sheet_by_name("MINDOL").unwrap();

        // identity anchor
        assert_eq!(mindol.value_at("B6").unwrap().as_text(), "MINDOL");

        // the pruned header row: "Observações" is gone, later columns moved left
        assert_eq!(mindol.cell_text(CellCoord::new(9, 3)), "Qtd");
        assert_eq!(mindol.cell_text(CellCoord::new(9, 4)), "Fornecedor Produção 1");
        assert_eq!(mindol.cell_text(CellCoord::new(9, 9)), "Custo Total");

        // exactly the two MINDOL rows survive, in source order
        assert_eq!(mindol.cell_text(CellCoord::new(10, 1)), "Mesa");
        assert_eq!(mindol.cell_text(CellCoord::new(11, 1)), "Sofá");
        assert!(mindol.get_cell(CellCoord::new(12, 1)).is_none());

        // foreign pair cells are nulled: ACME's name and cost are gone
        assert!(mindol.get_cell(CellCoord::new(10, 5)).is_none());
        assert!(mindol.get_cell(CellCoord::new(10, 7)).is_none());
        // MINDOL's own pair survives with its original cell text
        assert_eq!(mindol.cell_text(CellCoord::new(10, 4)), "MINDOL");
        assert_eq!(mindol.cell_text(CellCoord::new(10, 6)), "100");
        assert_eq!(mindol.cell_text(CellCoord::new(11, 4)), " mindol ");

        // per-row cost formulas with literal row numbers
        assert_eq!(
            mindol.formula_at("I11").unwrap(),
            Some("=SUM(G11:H11)".to_string())
        );
        assert_eq!(mindol.formula_at("J11").unwrap(), Some("=I11*D11".to_string()));
        assert_eq!(
            mindol.formula_at("I12").unwrap(),
            Some("=SUM(G12:H12)".to_string())
        );

        // the source sheet is untouched
        assert_eq!(
            workbook.get_sheet_by_name("Orçamento").unwrap(),
            &source_before
        );
    }

    #[test]
    fn test_only_supplier_filter_is_trimmed_and_case_insensitive() {
        let mut workbook = test_workbook();
        let config = test_config(SheetStrategy::SourceCopy);

        let generated =
            create_supplier_sheets(&mut workbook, "Orçamento", &config, Some("  MiNdOl "))
                .unwrap();

        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].supplier, "MINDOL");
        assert!(workbook.get_sheet_by_name("MINDOL").is_some());
        assert!(workbook.get_sheet_by_name("ACME").is_none());
    }

    #[test]
    fn test_existing_derivative_is_replaced() {
        let mut workbook = test_workbook();
        workbook.add_sheet("MINDOL").unwrap();
        workbook
            .get_sheet_by_name_mut("MINDOL")
            .unwrap()
            .set_value_at("Z1", CellValue::Text("stale".into()))
            .unwrap();

        let config = test_config(SheetStrategy::SourceCopy);
        create_supplier_sheets(&mut workbook, "Orçamento", &config, Some("MINDOL")).unwrap();

        let mindol = workbook.get_sheet_by_name("MINDOL").unwrap();
        assert!(mindol.value_at("Z1").unwrap().is_empty());
        assert_eq!(mindol.cell_text(CellCoord::new(10, 1)), "Mesa");
    }

    #[test]
    fn test_unknown_supplier_is_a_silent_noop() {
        let mut workbook = test_workbook();
        let sheets_before = workbook.sheet_count();
        let config = test_config(SheetStrategy::SourceCopy);

        let generated =
            create_supplier_sheets(&mut workbook, "Orçamento", &config, Some("Desconhecido"))
                .unwrap();

        assert!(generated.is_empty());
        assert_eq!(workbook.sheet_count(), sheets_before);
    }

    #[test]
    fn test_missing_source_sheet_is_an_error() {
        let mut workbook = test_workbook();
        let config = test_config(SheetStrategy::SourceCopy);

        assert!(matches!(
            create_supplier_sheets(&mut workbook, "Inexistente", &config, None),
            Err(EngineError::SheetNotFound(_))
        ));
    }

    #[test]
    fn test_misconfigured_cost_column_aborts_before_mutation() {
        let mut workbook = test_workbook();
        let sheets_before = workbook.sheet_count();
        let mut config = test_config(SheetStrategy::SourceCopy);
        config.supplier.keep_columns.retain(|c| c != "Custo Unitário");

        let err =
            create_supplier_sheets(&mut workbook, "Orçamento", &config, None).unwrap_err();
        assert!(matches!(err, EngineError::HeaderNotFound(name) if name == "Custo Unitário"));
        assert_eq!(workbook.sheet_count(), sheets_before);
    }

    fn add_template(workbook: &mut Workbook) {
        workbook.add_sheet("Modelo").unwrap();
        let template = workbook.get_sheet_by_name_mut("Modelo").unwrap();
        // template header row at row 5, in its own column order
        for (i, header) in [
            "Artigo",
            "Qtd",
            "Produção 1",
            "Material/Tecido 1",
            "Custo Unitário",
            "Custo Total",
            "Fornecedor Produção 1",
            "Fornecedor Material/Tecido 1",
        ]
        .iter()
        .enumerate()
        {
            template.set_cell(CellCoord::new(4, 1 + i as u32), Cell::text(*header));
        }
    }

    #[test]
    fn test_template_copy_fills_template_layout() {
        let mut workbook = test_workbook();
        add_template(&mut workbook);
        let mut config = test_config(SheetStrategy::TemplateCopy);
        config.supplier.template_sheet = Some("Modelo".into());

        let generated =
            create_supplier_sheets(&mut workbook, "Orçamento", &config, Some("MINDOL"))
                .unwrap();
        assert_eq!(generated.len(), 1);

        let mindol = workbook.get_sheet_by_name("MINDOL").unwrap();

        // rows appended under the template header row, template column order
        assert_eq!(mindol.cell_text(CellCoord::new(5, 1)), "Mesa");
        assert_eq!(mindol.cell_text(CellCoord::new(5, 2)), "2");
        assert_eq!(mindol.cell_text(CellCoord::new(5, 3)), "100");
        assert_eq!(mindol.cell_text(CellCoord::new(5, 7)), "MINDOL");
        // foreign pair stays blank on the derivative
        assert!(mindol.get_cell(CellCoord::new(5, 4)).is_none());
        assert!(mindol.get_cell(CellCoord::new(5, 8)).is_none());

        assert_eq!(mindol.cell_text(CellCoord::new(6, 1)), "Sofá");
        assert_eq!(mindol.cell_text(CellCoord::new(6, 7)), " mindol ");

        // formulas follow the template layout
        assert_eq!(
            mindol.formula_at("F6").unwrap(),
            Some("=SUM(D6:E6)".to_string())
        );
        assert_eq!(mindol.formula_at("G6").unwrap(), Some("=F6*C6".to_string()));
        assert_eq!(
            mindol.formula_at("F7").unwrap(),
            Some("=SUM(D7:E7)".to_string())
        );

        // identity anchor on the derivative
        assert_eq!(mindol.value_at("B6").unwrap().as_text(), "MINDOL");

        // the template itself is untouched
        let template = workbook.get_sheet_by_name("Modelo").unwrap();
        assert!(template.get_cell(CellCoord::new(5, 1)).is_none());
        assert!(template.value_at("B6").unwrap().is_empty());
    }

    #[test]
    fn test_template_strategy_requires_a_template() {
        let mut workbook = test_workbook();
        let config = test_config(SheetStrategy::TemplateCopy);

        assert!(matches!(
            create_supplier_sheets(&mut workbook, "Orçamento", &config, Some("MINDOL")),
            Err(EngineError::TemplateSheetNotConfigured)
        ));

        let mut config = test_config(SheetStrategy::TemplateCopy);
        config.supplier.template_sheet = Some("Inexistente".into());
        assert!(matches!(
            create_supplier_sheets(&mut workbook, "Orçamento", &config, Some("MINDOL")),
            Err(EngineError::TemplateSheetMissing(_))
        ));
    }
}
