use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use budgetsheet_core::Color;

use crate::error::EngineError;

/// Fixed cell addresses where single-value facts live in the source
/// document. These are pre-agreed with the workbook layout, not computed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FixedAddresses {
    pub nr_project: String,
    pub client_name: String,
    pub local: String,
    /// Anchor of the table header row; headers are discovered by expanding
    /// right from here
    pub header_start: String,
    pub margin_objective: String,
    pub markup: String,
    pub contracted_meter_value: String,
}

impl Default for FixedAddresses {
    fn default() -> Self {
        Self {
            nr_project: "B6".into(),
            client_name: "C6".into(),
            local: "D6".into(),
            header_start: "B10".into(),
            margin_objective: "S8".into(),
            markup: "AC8".into(),
            contracted_meter_value: "AD8".into(),
        }
    }
}

/// A column span expressed by header names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSpan {
    pub start_column: String,
    pub end_column: String,
}

/// Zone separator row styling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoneConfig {
    /// Header of the column that carries the zone label
    pub label_column: String,
    pub fill: Color,
    pub row_height: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            label_column: "Artigo".into(),
            fill: Color::rgb(0xF2, 0xF2, 0xF2),
            row_height: 30.0,
        }
    }
}

/// One supplier name column and the cost column it drives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplierPair {
    pub name_column: String,
    pub cost_column: String,
}

impl SupplierPair {
    fn new(name_column: &str, cost_column: &str) -> Self {
        Self {
            name_column: name_column.into(),
            cost_column: cost_column.into(),
        }
    }
}

/// How a supplier derivative sheet is seeded.
///
/// Both variants exist in the tool's history; neither has been confirmed as
/// the source of truth, so both stay selectable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SheetStrategy {
    /// Duplicate a pre-built template sheet and fill it in
    TemplateCopy,
    /// Duplicate the source sheet, then filter rows and prune columns
    SourceCopy,
}

/// Supplier sheet generation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SupplierConfig {
    /// The five supplier name/cost column pairs
    pub pairs: Vec<SupplierPair>,
    /// Business columns retained on a derivative sheet, in source order
    pub keep_columns: Vec<String>,
    pub quantity_column: String,
    pub unit_cost_column: String,
    pub total_cost_column: String,
    /// Contiguous cost columns summed into the unit cost
    pub cost_span: ColumnSpan,
    pub strategy: SheetStrategy,
    /// Template sheet name; required by the template-copy strategy
    pub template_sheet: Option<String>,
    /// Cell on the derivative that identifies its supplier for downstream
    /// lookups
    pub name_anchor: String,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        let pairs = vec![
            SupplierPair::new("Fornecedor Produção 1", "Produção 1"),
            SupplierPair::new("Fornecedor Produção 2", "Produção 2"),
            SupplierPair::new("Fornecedor Material/Tecido 1", "Material/Tecido 1"),
            SupplierPair::new("Fornecedor Material/Tecido 2", "Material/Tecido 2"),
            SupplierPair::new("Fornecedor Material/Tecido 3", "Material/Tecido 3"),
        ];

        let mut keep_columns: Vec<String> = [
            "Artigo",
            "Descrição",
            "Imagem",
            "Qtd",
            "Dimensões",
            "Acabamentos",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for pair in &pairs {
            keep_columns.push(pair.name_column.clone());
            keep_columns.push(pair.cost_column.clone());
        }
        keep_columns.push("Custo Unitário".into());
        keep_columns.push("Custo Total".into());

        Self {
            pairs,
            keep_columns,
            quantity_column: "Qtd".into(),
            unit_cost_column: "Custo Unitário".into(),
            total_cost_column: "Custo Total".into(),
            cost_span: ColumnSpan {
                start_column: "Produção 1".into(),
                end_column: "Material/Tecido 3".into(),
            },
            strategy: SheetStrategy::SourceCopy,
            template_sheet: None,
            name_anchor: "B6".into(),
        }
    }
}

/// Complete engine configuration: fixed addresses, the formula template
/// vocabulary, and the per-operation settings. Every field has a default
/// mirroring the production workbook layout, so a config file only needs to
/// state what differs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub addresses: FixedAddresses,
    /// Named formula templates over header names and a `{row}` placeholder
    pub formulas: BTreeMap<String, String>,
    /// Span used by the between-columns row operations
    pub product_span: ColumnSpan,
    pub zone: ZoneConfig,
    pub supplier: SupplierConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let formulas: BTreeMap<String, String> = [
            ("Preço Total", "=Preço Unitário{row} * Qtd{row}"),
            ("Preço Unitário", "=Custo Unitário{row} * $S$8"),
            ("Custo Unitário", "=SUM(Produção 1{row}:Material/Tecido 3{row})"),
            ("Custo Total", "=Custo Unitário{row} * Qtd{row}"),
            (
                "M",
                "=IF(Custo Total{row}=0,Custo Total,Preço Total{row}/Custo Total{row})",
            ),
            ("Cubicagem direta", "=Cubicagem * Qtd{row} / 1000000"),
            ("Cubicagem c/ majoração", "=Cubicagem direta{row}*$AC$8"),
            ("Valor m3", "=Cubicagem c/ majoração{row}*$AD$8"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            addresses: FixedAddresses::default(),
            formulas,
            product_span: ColumnSpan {
                start_column: "Artigo".into(),
                end_column: "Valor m3".into(),
            },
            zone: ZoneConfig::default(),
            supplier: SupplierConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }
}
