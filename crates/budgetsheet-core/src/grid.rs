use std::collections::BTreeMap;

use crate::cell::Cell;

/// Sparse cell store ordered row-major.
///
/// Keys are `(row, col)` pairs, so iteration walks the grid the way a reader
/// scans a sheet: left to right, top to bottom. Only non-empty cells are
/// stored; structural edits (row/column shifting) live on [`crate::Sheet`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    cells: BTreeMap<(u32, u32), Cell>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn get_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.cells.get_mut(&(row, col))
    }

    pub fn insert(&mut self, row: u32, col: u32, cell: Cell) {
        self.cells.insert((row, col), cell);
    }

    pub fn remove(&mut self, row: u32, col: u32) -> Option<Cell> {
        self.cells.remove(&(row, col))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major iteration over non-empty cells
    pub fn iter(&self) -> impl Iterator<Item = (&(u32, u32), &Cell)> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&(u32, u32), &mut Cell)> {
        self.cells.iter_mut()
    }

    /// Remove and return every cell for which `pred` holds.
    ///
    /// Used by the structural edits to lift a set of cells out of the grid
    /// before re-inserting them at shifted coordinates.
    pub fn take_matching<F>(&mut self, pred: F) -> Vec<((u32, u32), Cell)>
    where
        F: Fn(u32, u32) -> bool,
    {
        let keys: Vec<(u32, u32)> = self
            .cells
            .keys()
            .filter(|(r, c)| pred(*r, *c))
            .copied()
            .collect();

        keys.into_iter()
            .map(|key| {
                let cell = self.cells.remove(&key).expect("key was just enumerated");
                (key, cell)
            })
            .collect()
    }

    /// Bounding box of non-empty cells, as (min_row, min_col, max_row, max_col)
    pub fn bounds(&self) -> Option<(u32, u32, u32, u32)> {
        if self.cells.is_empty() {
            return None;
        }

        let mut min_row = u32::MAX;
        let mut max_row = 0;
        let mut min_col = u32::MAX;
        let mut max_col = 0;

        for (row, col) in self.cells.keys() {
            min_row = min_row.min(*row);
            max_row = max_row.max(*row);
            min_col = min_col.min(*col);
            max_col = max_col.max(*col);
        }

        Some((min_row, min_col, max_row, max_col))
    }
}

/// Serialize the grid as a map with stringified "row,col" keys for JSON
/// compatibility with the workbook file format.
pub(crate) mod grid_serde {
    use super::*;
    use serde::ser::SerializeMap;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(grid: &Grid, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(grid.len()))?;
        for ((row, col), cell) in grid.iter() {
            let key = format!("{},{}", row, col);
            map.serialize_entry(&key, cell)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Grid, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GridVisitor;

        impl<'de> de::Visitor<'de> for GridVisitor {
            type Value = Grid;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map with \"row,col\" keys")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                let mut grid = Grid::new();

                while let Some(key) = map.next_key::<String>()? {
                    let cell: Cell = map.next_value()?;

                    let parts: Vec<&str> = key.split(',').collect();
                    if parts.len() == 2 {
                        if let (Ok(row), Ok(col)) =
                            (parts[0].parse::<u32>(), parts[1].parse::<u32>())
                        {
                            grid.insert(row, col, cell);
                        }
                    }
                }

                Ok(grid)
            }
        }

        deserializer.deserialize_map(GridVisitor)
    }
}
