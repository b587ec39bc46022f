use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::sheet::Sheet;

/// Metadata about the workbook document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkbookMetadata {
    /// ISO 8601 timestamp of creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// ISO 8601 timestamp of last modification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// Author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Application version that created/modified the workbook
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

/// A workbook containing multiple sheets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workbook {
    /// Workbook name (usually the file name)
    pub name: String,
    /// Sheets, in tab order
    pub sheets: Vec<Sheet>,
    /// Index of the currently active sheet
    #[serde(default)]
    pub active_sheet_index: usize,
    /// Workbook metadata
    #[serde(default)]
    pub metadata: WorkbookMetadata,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Workbook {
    /// Create a new workbook with a default sheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheets: vec![Sheet::new("Sheet1")],
            active_sheet_index: 0,
            metadata: WorkbookMetadata::default(),
        }
    }

    /// The active sheet (the one the external caller had open)
    pub fn active_sheet(&self) -> &Sheet {
        &self.sheets[self.active_sheet_index]
    }

    pub fn active_sheet_mut(&mut self) -> &mut Sheet {
        &mut self.sheets[self.active_sheet_index]
    }

    pub fn get_sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn get_sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    pub fn get_sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn get_sheet_by_name_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn get_sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name == name)
    }

    pub fn set_active_sheet(&mut self, index: usize) -> bool {
        if index < self.sheets.len() {
            self.active_sheet_index = index;
            true
        } else {
            false
        }
    }

    /// Add a new empty sheet with the given name
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Result<usize, CoreError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(CoreError::InvalidSheetName(
                "name cannot be empty".to_string(),
            ));
        }
        if self.sheets.iter().any(|s| s.name == name) {
            return Err(CoreError::SheetNameExists(name));
        }

        let index = self.sheets.len();
        self.sheets.push(Sheet::new(name));
        Ok(index)
    }

    /// Remove a sheet by index
    pub fn remove_sheet(&mut self, index: usize) -> Result<Sheet, CoreError> {
        if self.sheets.len() <= 1 {
            return Err(CoreError::CannotDeleteLastSheet);
        }
        if index >= self.sheets.len() {
            return Err(CoreError::SheetNotFound(format!("#{index}")));
        }

        let sheet = self.sheets.remove(index);

        if self.active_sheet_index >= self.sheets.len() {
            self.active_sheet_index = self.sheets.len() - 1;
        } else if self.active_sheet_index > index {
            self.active_sheet_index -= 1;
        }

        Ok(sheet)
    }

    /// Remove a sheet by name. Returns Ok(None) when no such sheet exists,
    /// which is how derivative sheets get replaced: remove-if-present, then
    /// duplicate under the same name.
    pub fn remove_sheet_by_name(&mut self, name: &str) -> Result<Option<Sheet>, CoreError> {
        match self.get_sheet_index(name) {
            Some(index) => self.remove_sheet(index).map(Some),
            None => Ok(None),
        }
    }

    /// Rename a sheet
    pub fn rename_sheet(&mut self, index: usize, new_name: impl Into<String>) -> Result<(), CoreError> {
        let new_name = new_name.into();

        if new_name.trim().is_empty() {
            return Err(CoreError::InvalidSheetName(
                "name cannot be empty".to_string(),
            ));
        }
        for (i, sheet) in self.sheets.iter().enumerate() {
            if i != index && sheet.name == new_name {
                return Err(CoreError::SheetNameExists(new_name));
            }
        }

        match self.sheets.get_mut(index) {
            Some(sheet) => {
                sheet.name = new_name;
                Ok(())
            }
            None => Err(CoreError::SheetNotFound(format!("#{index}"))),
        }
    }

    /// Duplicate a sheet under a caller-chosen name, appended after the
    /// source sheet. The target name must not be taken.
    pub fn duplicate_sheet_named(
        &mut self,
        source: &str,
        new_name: impl Into<String>,
    ) -> Result<usize, CoreError> {
        let new_name = new_name.into();

        if new_name.trim().is_empty() {
            return Err(CoreError::InvalidSheetName(
                "name cannot be empty".to_string(),
            ));
        }
        if self.sheets.iter().any(|s| s.name == new_name) {
            return Err(CoreError::SheetNameExists(new_name));
        }

        let index = self
            .get_sheet_index(source)
            .ok_or_else(|| CoreError::SheetNotFound(source.to_string()))?;

        let mut copy = self.sheets[index].clone();
        copy.name = new_name;

        let new_index = index + 1;
        self.sheets.insert(new_index, copy);
        if self.active_sheet_index >= new_index {
            self.active_sheet_index += 1;
        }
        Ok(new_index)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    // --- Persistence ---

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}
