use std::fs;
use std::path::Path;

use anyhow::Context;

use budgetsheet_core::Workbook;

/// Open the workbook document at the configured path
pub fn open_document(path: &Path) -> anyhow::Result<Workbook> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read workbook {}", path.display()))?;
    Workbook::from_json(&json)
        .with_context(|| format!("failed to parse workbook {}", path.display()))
}

/// Save the workbook back, stamping the modification timestamp
pub fn save_document(workbook: &mut Workbook, path: &Path) -> anyhow::Result<()> {
    workbook.metadata.modified_at = Some(chrono::Utc::now().to_rfc3339());

    let json = workbook.to_json_pretty()?;
    fs::write(path, json)
        .with_context(|| format!("failed to write workbook {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use budgetsheet_core::CellValue;

    #[test]
    fn test_document_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orcamento.json");

        let mut workbook = Workbook::new("Orçamento");
        workbook
            .active_sheet_mut()
            .set_value_at("B6", CellValue::Text("N116".into()))
            .unwrap();

        save_document(&mut workbook, &path).unwrap();
        assert!(workbook.metadata.modified_at.is_some());

        let reloaded = open_document(&path).unwrap();
        assert_eq!(
            reloaded.active_sheet().value_at("B6").unwrap().as_text(),
            "N116"
        );
        assert_eq!(reloaded.metadata.modified_at, workbook.metadata.modified_at);
    }

    #[test]
    fn test_open_missing_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_document(&dir.path().join("missing.json")).is_err());
    }
}
