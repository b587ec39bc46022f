//! End-to-end dispatch tests against an in-memory workbook and the JSON
//! document round trip.

use budgetsheet_cli::{dispatch, session, DispatchResult, Invocation};
use budgetsheet_core::{Cell, CellCoord, CellValue, Workbook};
use budgetsheet_engine::EngineConfig;

const HEADERS: [&str; 8] = [
    "Artigo",
    "Qtd",
    "Fornecedor Produção 1",
    "Produção 1",
    "Material/Tecido 3",
    "Custo Unitário",
    "Custo Total",
    "Valor m3",
];

/// Workbook with the header row at B10 and eight article rows; MINDOL
/// supplies the 3rd and 7th articles (sheet rows 13 and 17).
fn test_workbook() -> Workbook {
    let mut workbook = Workbook::new("Orçamento N116");
    workbook.rename_sheet(0, "Orçamento").unwrap();

    let sheet = workbook.active_sheet_mut();
    sheet
        .set_value_at("B6", CellValue::Text("N116".into()))
        .unwrap();
    sheet
        .set_value_at("C6", CellValue::Text("Parfois".into()))
        .unwrap();
    sheet.set_value_at("AC8", CellValue::Number(1.25)).unwrap();

    for (i, header) in HEADERS.iter().enumerate() {
        sheet.set_cell(CellCoord::new(9, 1 + i as u32), Cell::text(*header));
    }
    for data_row in 1..=8u32 {
        let grid_row = 9 + data_row;
        sheet.set_cell(CellCoord::new(grid_row, 1), Cell::text(format!("Item {data_row}")));
        sheet.set_cell(CellCoord::new(grid_row, 2), Cell::number(data_row as f64));
        sheet.set_cell(CellCoord::new(grid_row, 4), Cell::number(10.0 * data_row as f64));
    }
    sheet.set_cell(CellCoord::new(10, 3), Cell::text("LUSOMÓVEL"));
    sheet.set_cell(CellCoord::new(12, 3), Cell::text("MINDOL"));
    sheet.set_cell(CellCoord::new(16, 3), Cell::text("MINDOL"));

    workbook
}

fn invocation(operation: &str, rows: &str, name: Option<&str>) -> Invocation {
    Invocation {
        operation: operation.to_string(),
        rows: Invocation::parse_rows(rows).unwrap(),
        supplier: name.map(str::to_string),
        zone_name: None,
    }
}

#[test]
fn unknown_operation_leaves_the_document_unchanged() {
    let mut workbook = test_workbook();
    let before = workbook.clone();

    let result = dispatch(
        &mut workbook,
        &EngineConfig::default(),
        &invocation("bogus_op", "12", None),
    )
    .unwrap();

    assert_eq!(result, DispatchResult::UnknownOperation);
    assert_eq!(workbook, before);
}

#[test]
fn insert_product_rows_writes_row_resolved_formulas() {
    let mut workbook = test_workbook();

    let result = dispatch(
        &mut workbook,
        &EngineConfig::default(),
        &invocation("insert-product-rows", "12", None),
    )
    .unwrap();
    assert_eq!(result, DispatchResult::Mutated);

    let sheet = workbook.active_sheet();
    // the new row is blank except for the templated formulas
    assert!(sheet.get_cell(CellCoord::new(11, 1)).is_none());
    // "Custo Total" = "=Custo Unitário{row} * Qtd{row}" resolved to letters
    assert_eq!(
        sheet.formula_at("H12").unwrap(),
        Some("=G12 * C12".to_string())
    );
    // the article that was on row 12 moved down to 13
    assert_eq!(sheet.cell_text(CellCoord::new(12, 1)), "Item 2");
}

#[test]
fn legacy_snake_case_operation_names_still_work() {
    let mut workbook = test_workbook();

    let result = dispatch(
        &mut workbook,
        &EngineConfig::default(),
        &invocation("insert_product_rows", "12", None),
    )
    .unwrap();

    assert_eq!(result, DispatchResult::Mutated);
}

#[test]
fn insert_zone_row_labels_and_fills_the_span() {
    let mut workbook = test_workbook();
    let config = EngineConfig::default();

    let result = dispatch(
        &mut workbook,
        &config,
        &invocation("insert-zone-row", "15", Some("Quarto")),
    )
    .unwrap();
    assert_eq!(result, DispatchResult::Mutated);

    let sheet = workbook.active_sheet();
    let label = sheet.get_cell(CellCoord::new(14, 1)).unwrap();
    assert_eq!(label.computed_value().as_text(), "Quarto");
    assert!(label.format.bold);
    assert_eq!(label.format.background_color, Some(config.zone.fill));

    // filled across the tracked span, blank everywhere else
    for col in 2..=8u32 {
        let cell = sheet.get_cell(CellCoord::new(14, col)).unwrap();
        assert!(cell.content.is_empty());
        assert_eq!(cell.format.background_color, Some(config.zone.fill));
    }
    assert_eq!(sheet.get_row_height(14), config.zone.row_height);
}

#[test]
fn supplier_sheets_filter_rows_and_isolate_pairs() {
    let mut workbook = test_workbook();

    let result = dispatch(
        &mut workbook,
        &EngineConfig::default(),
        &invocation("create-supplier-sheets", "", Some("MINDOL")),
    )
    .unwrap();
    assert_eq!(result, DispatchResult::Mutated);

    let mindol = workbook.get_sheet_by_name("MINDOL").unwrap();

    // exactly the two MINDOL articles, in order, under the header row
    assert_eq!(mindol.cell_text(CellCoord::new(10, 1)), "Item 3");
    assert_eq!(mindol.cell_text(CellCoord::new(11, 1)), "Item 7");
    assert!(mindol.get_cell(CellCoord::new(12, 1)).is_none());

    // "Valor m3" is not on the allow-list, so the column is pruned
    assert_eq!(mindol.cell_text(CellCoord::new(9, 7)), "Custo Total");
    assert!(mindol.get_cell(CellCoord::new(9, 8)).is_none());

    // per-row cost formulas with literal row numbers
    assert_eq!(
        mindol.formula_at("G11").unwrap(),
        Some("=SUM(E11:F11)".to_string())
    );
    assert_eq!(
        mindol.formula_at("H11").unwrap(),
        Some("=G11*C11".to_string())
    );

    // sheet identity anchor for downstream lookups
    assert_eq!(mindol.value_at("B6").unwrap().as_text(), "MINDOL");

    // no other supplier's sheet was created
    assert!(workbook.get_sheet_by_name("LUSOMÓVEL").is_none());
}

#[test]
fn get_metadata_reads_the_fixed_addresses() {
    let mut workbook = test_workbook();
    let before = workbook.clone();

    let result = dispatch(
        &mut workbook,
        &EngineConfig::default(),
        &invocation("get-metadata", "", None),
    )
    .unwrap();

    let DispatchResult::Output(payload) = result else {
        panic!("expected a payload");
    };
    let facts: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(facts["nr_project"]["value"], "N116");
    assert_eq!(facts["client_name"]["value"], "Parfois");
    assert_eq!(facts["headers"].as_array().unwrap().len(), HEADERS.len());

    // read-only: nothing changed
    assert_eq!(workbook, before);
}

#[test]
fn document_file_round_trip_with_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orcamento.json");

    let mut workbook = test_workbook();
    session::save_document(&mut workbook, &path).unwrap();

    let mut reopened = session::open_document(&path).unwrap();
    let result = dispatch(
        &mut reopened,
        &EngineConfig::default(),
        &invocation("delete-between-columns", "12", None),
    )
    .unwrap();
    assert_eq!(result, DispatchResult::Mutated);
    session::save_document(&mut reopened, &path).unwrap();

    let final_state = session::open_document(&path).unwrap();
    let sheet = final_state.active_sheet();
    // row 12's article is gone; row 13's took its place
    assert_eq!(sheet.cell_text(CellCoord::new(11, 1)), "Item 3");
}
