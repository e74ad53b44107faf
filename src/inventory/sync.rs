//! Cloud backup contract
//!
//! Only the contract and the merge rule live here. No network backend ships;
//! hosts plug one in through `CloudSync`.

use serde::{Deserialize, Serialize};

use super::ledger::Ledger;
use super::record::InventoryRecord;
use crate::persistence::KvStore;

/// A player's inventory stamped with when it was last changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub user_id: String,
    pub updated_at_ms: u64,
    pub record: InventoryRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("Cloud sync is not configured")]
    NotConfigured,

    #[error("Cloud transport failed: {0}")]
    Transport(String),

    #[error("Snapshot for {requested} belongs to {found}")]
    WrongUser { requested: String, found: String },
}

pub trait CloudSync {
    fn upload(&mut self, snapshot: &Snapshot) -> Result<(), SyncError>;
    fn download(&self, user_id: &str) -> Result<Option<Snapshot>, SyncError>;
}

/// Which copy won a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Local was newer (or equal) and was uploaded
    Uploaded,
    /// Remote was newer and replaced local
    Downloaded,
}

/// Last write wins. Equal timestamps keep the local copy.
pub fn merge_last_write_wins(local: Snapshot, remote: Option<Snapshot>) -> Snapshot {
    match remote {
        Some(remote) if remote.updated_at_ms > local.updated_at_ms => remote,
        _ => local,
    }
}

/// Reconcile the ledger with the cloud copy for `user_id`
pub fn sync_ledger<S: KvStore, C: CloudSync + ?Sized>(
    ledger: &mut Ledger<S>,
    cloud: &mut C,
    user_id: &str,
    local_updated_at_ms: u64,
) -> Result<SyncDirection, SyncError> {
    let remote = cloud.download(user_id)?;
    if let Some(found) = remote.as_ref().map(|s| &s.user_id) {
        if found != user_id {
            return Err(SyncError::WrongUser {
                requested: user_id.to_string(),
                found: found.clone(),
            });
        }
    }

    let local = Snapshot {
        user_id: user_id.to_string(),
        updated_at_ms: local_updated_at_ms,
        record: ledger.record(),
    };
    let merged = merge_last_write_wins(local.clone(), remote);
    if merged == local {
        cloud.upload(&merged)?;
        log::info!("Uploaded inventory for {user_id}");
        Ok(SyncDirection::Uploaded)
    } else {
        if !ledger.restore(&merged.record) {
            log::warn!("Downloaded inventory for {user_id} was only partly saved");
        }
        log::info!("Replaced local inventory with cloud copy for {user_id}");
        Ok(SyncDirection::Downloaded)
    }
}
