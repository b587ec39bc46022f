use budgetsheet_core::Sheet;

/// Inverse of a single row mutation, keyed by the 1-based row number the
/// caller addressed.
///
/// Every insert records the `DeleteRow` that would take it back out, and
/// every delete records the `InsertRow` that would put a blank row back.
/// This is best-effort bookkeeping, not transactional undo: a delete's
/// inverse restores the row position but not its former contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InverseOp {
    InsertRow(u32),
    DeleteRow(u32),
}

impl InverseOp {
    /// The 1-based row this inverse targets
    pub fn row(&self) -> u32 {
        match self {
            InverseOp::InsertRow(row) | InverseOp::DeleteRow(row) => *row,
        }
    }

    /// Apply the inverse to a sheet
    pub fn apply(&self, sheet: &mut Sheet) {
        match self {
            InverseOp::InsertRow(row) => sheet.insert_row(row - 1),
            InverseOp::DeleteRow(row) => sheet.delete_row(row - 1),
        }
    }
}

/// Ordered ledger of inverse operations for one engine invocation.
///
/// The caller owns the ledger: construct it at operation start, pass it to
/// each mutating call, inspect or discard it at operation end. Entries are
/// consumed destructively, most recent first, by [`UndoLedger::rollback`].
#[derive(Debug, Default)]
pub struct UndoLedger {
    entries: Vec<InverseOp>,
}

impl UndoLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the inverse of a mutation that just happened
    pub fn record(&mut self, op: InverseOp) {
        self.entries.push(op);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    /// The entry that would be undone next
    pub fn last(&self) -> Option<&InverseOp> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[InverseOp] {
        &self.entries
    }

    /// Undo the most recent mutation. Returns the applied inverse.
    pub fn rollback_last(&mut self, sheet: &mut Sheet) -> Option<InverseOp> {
        let op = self.entries.pop()?;
        op.apply(sheet);
        Some(op)
    }

    /// Undo every recorded mutation, most recent first. Returns how many
    /// inverses were applied.
    pub fn rollback(&mut self, sheet: &mut Sheet) -> usize {
        let mut applied = 0;
        while self.rollback_last(sheet).is_some() {
            applied += 1;
        }
        applied
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
