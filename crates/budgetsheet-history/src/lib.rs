pub mod ledger;

pub use ledger::{InverseOp, UndoLedger};
