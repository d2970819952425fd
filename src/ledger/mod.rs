// Ledger module - vesting locks and their reconciliation
// Pure accounting over read-only lock and withdrawal history

mod lock;
mod pending;
mod reconcile;
mod schedule;
mod weight;

pub use lock::*;
pub use pending::*;
pub use reconcile::*;
pub use schedule::*;
pub use weight::*;
