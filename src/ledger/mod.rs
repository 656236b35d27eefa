//! Supply-side state for one reconciliation run: the keyed entity index
//! and the consumption linker that populates it.

use thiserror::Error;

use crate::core::types::OrderId;

pub mod index;
pub mod linker;

pub use index::LedgerIndex;
pub use linker::{LedgerBuilder, LinkedLedger};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("order {order} already has a linked consumption; refusing to overwrite")]
    ConsumptionAlreadyLinked { order: OrderId },
}
