//! Player inventory: coins, owned cosmetics, equipped cosmetics

pub mod ledger;
pub mod record;
pub mod sync;

pub use crate::loot::Category;
pub use ledger::{EquipOutcome, Ledger, SubtractOutcome, UnlockOutcome};
pub use record::InventoryRecord;
pub use sync::{CloudSync, Snapshot, SyncDirection, SyncError, merge_last_write_wins, sync_ledger};
