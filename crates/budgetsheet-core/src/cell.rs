use serde::{Deserialize, Serialize};

use crate::format::CellFormat;

/// Raw value stored in a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Try to read the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.parse().ok(),
            CellValue::Empty => None,
        }
    }

    /// Render the value as display text
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

/// Content of a cell - either a plain value or a formula with its cached value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CellContent {
    Value {
        value: CellValue,
    },
    Formula {
        /// Formula text (e.g., "=SUM(D12:H12)")
        expression: String,
        /// Last computed value, if any
        #[serde(default)]
        cached_value: CellValue,
    },
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Value {
            value: CellValue::Empty,
        }
    }
}

impl CellContent {
    pub fn value(value: CellValue) -> Self {
        CellContent::Value { value }
    }

    pub fn formula(expression: impl Into<String>) -> Self {
        CellContent::Formula {
            expression: expression.into(),
            cached_value: CellValue::Empty,
        }
    }

    /// The effective value (cached value for formulas)
    pub fn computed_value(&self) -> &CellValue {
        match self {
            CellContent::Value { value } => value,
            CellContent::Formula { cached_value, .. } => cached_value,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula { .. })
    }

    pub fn formula_expression(&self) -> Option<&str> {
        match self {
            CellContent::Formula { expression, .. } => Some(expression),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Value { value: CellValue::Empty })
    }
}

/// Complete cell: content plus formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub content: CellContent,
    #[serde(default)]
    pub format: CellFormat,
}

impl Cell {
    pub fn new(content: CellContent) -> Self {
        Cell {
            content,
            format: CellFormat::default(),
        }
    }

    pub fn number(value: f64) -> Self {
        Cell::new(CellContent::value(CellValue::Number(value)))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::new(CellContent::value(CellValue::Text(value.into())))
    }

    pub fn formula(expression: impl Into<String>) -> Self {
        Cell::new(CellContent::formula(expression))
    }

    pub fn with_format(mut self, format: CellFormat) -> Self {
        self.format = format;
        self
    }

    pub fn computed_value(&self) -> &CellValue {
        self.content.computed_value()
    }

    /// A cell is empty when it has no content and no formatting worth keeping
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.format == CellFormat::default()
    }
}
