//! Loot box purchases
//!
//! Opening a box is two phases. `purchase` debits the price and hands back a
//! Plinko drop that has not happened yet; `collect` lets the drop finish and
//! only then picks the reward from whatever slot the ball landed in.
//! `open_box` does both in one call.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::inventory::{Ledger, SubtractOutcome};
use crate::loot::{Catalog, CatalogError, Category, LootBox, Rarity, RewardItem};
use crate::persistence::KvStore;
use crate::plinko::consts::MAX_DROP_TICKS;
use crate::plinko::{Board, Landing, PlinkoSim, resolve_reward};

#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("Unknown loot box: {0}")]
    UnknownBox(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Could not save inventory: {0}")]
    Storage(String),
}

/// Result of trying to buy something
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome<T = BoxOpening> {
    Opened(T),
    /// Declined before anything changed
    InsufficientFunds { price: u32, balance: u32 },
}

/// A paid-for drop still in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDrop {
    pub box_id: String,
    pub category: Category,
    pub price: u32,
    pub sim: PlinkoSim,
}

/// What a finished box opening produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxOpening {
    pub box_id: String,
    pub item: RewardItem,
    pub rarity: Rarity,
    pub landing: Landing,
    /// The item was already owned
    pub duplicate: bool,
    /// Coins paid back for a duplicate
    pub refund: u32,
    /// Balance after the opening
    pub balance: u32,
}

pub struct Shop {
    catalog: Arc<Catalog>,
    board: Board,
}

impl Shop {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_board(catalog, Board::default())
    }

    pub fn with_board(catalog: Arc<Catalog>, board: Board) -> Self {
        Self { catalog, board }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn lootboxes(&self) -> impl Iterator<Item = &LootBox> {
        self.catalog.lootboxes()
    }

    fn lootbox(&self, box_id: &str) -> Result<&LootBox, ShopError> {
        self.catalog
            .lootbox(box_id)
            .ok_or_else(|| ShopError::UnknownBox(box_id.to_string()))
    }

    /// Debit the box price and start a drop. Declines without touching the
    /// ledger when the balance is short.
    pub fn purchase<S: KvStore, R: Rng + ?Sized>(
        &self,
        ledger: &mut Ledger<S>,
        box_id: &str,
        rng: &mut R,
    ) -> Result<PurchaseOutcome<PendingDrop>, ShopError> {
        let lootbox = self.lootbox(box_id)?;
        match ledger.subtract_coins(lootbox.price) {
            SubtractOutcome::Debited { balance } => {
                log::info!("Bought {} for {}, balance {balance}", lootbox.id, lootbox.price);
            }
            SubtractOutcome::Insufficient { balance } => {
                return Ok(PurchaseOutcome::InsufficientFunds {
                    price: lootbox.price,
                    balance,
                });
            }
            SubtractOutcome::Failed => {
                return Err(ShopError::Storage(format!("debit for {box_id}")));
            }
        }

        let seed = rng.random::<u64>();
        Ok(PurchaseOutcome::Opened(PendingDrop {
            box_id: lootbox.id.clone(),
            category: lootbox.category,
            price: lootbox.price,
            sim: PlinkoSim::new(self.board.clone(), seed),
        }))
    }

    /// Finish the drop, resolve the reward from the landing slot, unlock it
    /// and refund duplicates. A reward that cannot be resolved or saved gives
    /// the price back.
    pub fn collect<S: KvStore, R: Rng + ?Sized>(
        &self,
        ledger: &mut Ledger<S>,
        mut pending: PendingDrop,
        rng: &mut R,
    ) -> Result<BoxOpening, ShopError> {
        let landing = pending.sim.run(MAX_DROP_TICKS);
        let item = match resolve_reward(&self.catalog, pending.category, &landing, rng) {
            Ok(item) => item.clone(),
            Err(e) => {
                log::error!("{} landed on {} with nothing to give: {e}", pending.box_id, landing.rarity);
                if ledger.add_coins(pending.price).is_none() {
                    log::error!("Refund of {} for {} was not saved", pending.price, pending.box_id);
                }
                return Err(e.into());
            }
        };

        let unlock = ledger.unlock(item.category, &item.id);
        if !unlock.saved {
            log::error!("Could not save unlock of {}, refunding {}", item.id, pending.price);
            if ledger.add_coins(pending.price).is_none() {
                log::error!("Refund of {} for {} was not saved", pending.price, pending.box_id);
            }
            return Err(ShopError::Storage(format!("unlock of {}", item.id)));
        }
        let duplicate = unlock.is_duplicate;
        let refund = if duplicate {
            item.rarity.duplicate_refund()
        } else {
            0
        };
        if refund > 0 {
            log::info!("Duplicate {}, refunding {refund}", item.id);
            if ledger.add_coins(refund).is_none() {
                return Err(ShopError::Storage(format!("duplicate refund for {}", item.id)));
            }
        }

        Ok(BoxOpening {
            box_id: pending.box_id,
            rarity: landing.rarity,
            item,
            landing,
            duplicate,
            refund,
            balance: ledger.coins(),
        })
    }

    /// Buy, drop and collect in one go
    pub fn open_box<S: KvStore, R: Rng + ?Sized>(
        &self,
        ledger: &mut Ledger<S>,
        box_id: &str,
        rng: &mut R,
    ) -> Result<PurchaseOutcome, ShopError> {
        match self.purchase(ledger, box_id, rng)? {
            PurchaseOutcome::Opened(pending) => {
                Ok(PurchaseOutcome::Opened(self.collect(ledger, pending, rng)?))
            }
            PurchaseOutcome::InsufficientFunds { price, balance } => {
                Ok(PurchaseOutcome::InsufficientFunds { price, balance })
            }
        }
    }

    /// Weight-table roll for the shop's odds display. Never grants anything.
    pub fn preview_roll<R: Rng + ?Sized>(
        &self,
        box_id: &str,
        rng: &mut R,
    ) -> Result<(&RewardItem, Rarity), ShopError> {
        self.lootbox(box_id)?;
        Ok(self.catalog.roll_reward_item(box_id, rng)?)
    }
}
