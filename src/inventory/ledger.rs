//! Coin balance and unlock/equip state over a `KvStore`
//!
//! Every operation is a read-modify-write of one or two keys. Mutations take
//! `&mut self`, so one owner serializes them and two purchases can never both
//! spend the same coins. Storage failures stop here: reads fall back to
//! first-run defaults, writes are logged and reported through the outcome.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::record::InventoryRecord;
use crate::loot::{Catalog, Category};
use crate::persistence::{KvStore, get_json, set_json};

const KEY_PREFIX: &str = "@ponggame:";

fn coins_key() -> String {
    format!("{KEY_PREFIX}coins")
}

fn unlocked_key(category: Category) -> String {
    format!("{KEY_PREFIX}unlocked_{category}")
}

fn equipped_key(category: Category) -> String {
    format!("{KEY_PREFIX}equipped_{category}")
}

fn theme_variant_key(theme_id: &str) -> String {
    format!("{KEY_PREFIX}theme_variant:{theme_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtractOutcome {
    Debited { balance: u32 },
    /// Declined, nothing changed
    Insufficient { balance: u32 },
    /// The new balance could not be written
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockOutcome {
    /// The id was already owned; the set is unchanged
    pub is_duplicate: bool,
    /// False when a new id could not be written and is still not owned
    pub saved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipOutcome {
    Equipped,
    /// Not owned, nothing changed
    Locked,
    Failed,
}

/// Player inventory ledger
pub struct Ledger<S: KvStore> {
    store: S,
    catalog: Arc<Catalog>,
}

impl<S: KvStore> Ledger<S> {
    pub fn new(store: S, catalog: Arc<Catalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match get_json(&self.store, key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read {key}, using default: {e}");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        match set_json(&mut self.store, key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to write {key}: {e}");
                false
            }
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.store.remove(key) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to remove {key}: {e}");
                false
            }
        }
    }

    /// Write first-run data if this store has never held a ledger.
    /// Returns true when defaults were written.
    pub fn initialize_defaults(&mut self) -> bool {
        match self.store.get(&coins_key()) {
            Ok(Some(_)) => return false,
            Ok(None) => {}
            Err(e) => {
                log::warn!("Cannot check for existing inventory, skipping init: {e}");
                return false;
            }
        }
        log::info!("First run, writing starter inventory");
        let record = InventoryRecord::starter(&self.catalog);
        self.restore(&record)
    }

    pub fn coins(&self) -> u32 {
        self.read(&coins_key()).unwrap_or(0)
    }

    /// Credit coins. Returns the new balance, or None if it was not saved.
    pub fn add_coins(&mut self, amount: u32) -> Option<u32> {
        let balance = self.coins().saturating_add(amount);
        if self.write(&coins_key(), &balance) {
            log::debug!("+{amount} coins, balance {balance}");
            Some(balance)
        } else {
            None
        }
    }

    /// Debit coins, declining without any write when the balance is short
    pub fn subtract_coins(&mut self, amount: u32) -> SubtractOutcome {
        let balance = self.coins();
        if balance < amount {
            log::info!("Declined debit of {amount}, balance is {balance}");
            return SubtractOutcome::Insufficient { balance };
        }
        let balance = balance - amount;
        if self.write(&coins_key(), &balance) {
            SubtractOutcome::Debited { balance }
        } else {
            SubtractOutcome::Failed
        }
    }

    /// Owned ids for a category. The starter is always included.
    pub fn unlocked(&self, category: Category) -> BTreeSet<String> {
        let mut ids: BTreeSet<String> = self.read(&unlocked_key(category)).unwrap_or_default();
        ids.insert(self.catalog.starter(category).id.clone());
        ids
    }

    pub fn is_unlocked(&self, category: Category, item_id: &str) -> bool {
        self.unlocked(category).contains(item_id)
    }

    /// Add an id to the owned set if absent, always reporting whether it
    /// was already there
    pub fn unlock(&mut self, category: Category, item_id: &str) -> UnlockOutcome {
        let mut ids = self.unlocked(category);
        if !ids.insert(item_id.to_string()) {
            return UnlockOutcome {
                is_duplicate: true,
                saved: true,
            };
        }
        let saved = self.write(&unlocked_key(category), &ids);
        if saved {
            log::info!("Unlocked {category} {item_id}");
        }
        UnlockOutcome {
            is_duplicate: false,
            saved,
        }
    }

    pub fn equip(&mut self, category: Category, item_id: &str) -> EquipOutcome {
        if !self.is_unlocked(category, item_id) {
            log::debug!("Refused to equip locked {category} {item_id}");
            return EquipOutcome::Locked;
        }
        if self.write(&equipped_key(category), item_id) {
            EquipOutcome::Equipped
        } else {
            EquipOutcome::Failed
        }
    }

    /// Equipped id, or the starter if the stored one is missing or not owned
    pub fn equipped(&self, category: Category) -> String {
        let unlocked = self.unlocked(category);
        self.read::<String>(&equipped_key(category))
            .filter(|id| unlocked.contains(id))
            .unwrap_or_else(|| self.catalog.starter(category).id.clone())
    }

    /// Selected palette for a theme, or its declared default. None for ids
    /// that are not themes.
    pub fn theme_variant(&self, theme_id: &str) -> Option<String> {
        let theme = self.catalog.item(theme_id)?;
        let default = theme.default_variant()?.to_string();
        let stored = self
            .read::<String>(&theme_variant_key(theme_id))
            .filter(|key| theme.has_variant(key));
        Some(stored.unwrap_or(default))
    }

    /// Store a palette choice. Returns false for variants the theme does not
    /// declare or when the write fails.
    pub fn set_theme_variant(&mut self, theme_id: &str, variant: &str) -> bool {
        let known = self
            .catalog
            .item(theme_id)
            .is_some_and(|theme| theme.has_variant(variant));
        if !known {
            log::warn!("Theme {theme_id} has no variant {variant}");
            return false;
        }
        self.write(&theme_variant_key(theme_id), variant)
    }

    /// Snapshot of the whole inventory
    pub fn record(&self) -> InventoryRecord {
        let theme_variants = self
            .catalog
            .items_of(Category::Theme)
            .filter_map(|theme| {
                self.read::<String>(&theme_variant_key(&theme.id))
                    .filter(|key| theme.has_variant(key))
                    .map(|key| (theme.id.clone(), key))
            })
            .collect();
        InventoryRecord {
            coins: self.coins(),
            unlocked_ball_ids: self.unlocked(Category::Ball),
            unlocked_paddle_ids: self.unlocked(Category::Paddle),
            unlocked_theme_ids: self.unlocked(Category::Theme),
            equipped_ball_id: self.equipped(Category::Ball),
            equipped_paddle_id: self.equipped(Category::Paddle),
            equipped_theme_id: self.equipped(Category::Theme),
            theme_variants,
        }
    }

    /// Overwrite every key from a record. Themes the record has no variant
    /// for go back to their default. Returns false if any write failed.
    pub fn restore(&mut self, record: &InventoryRecord) -> bool {
        let mut ok = self.write(&coins_key(), &record.coins);
        for category in Category::ALL {
            ok &= self.write(&unlocked_key(category), record.unlocked(category));
            ok &= self.write(&equipped_key(category), record.equipped(category));
        }
        for (theme_id, variant) in &record.theme_variants {
            ok &= self.write(&theme_variant_key(theme_id), variant);
        }
        let cleared: Vec<String> = self
            .catalog
            .items_of(Category::Theme)
            .filter(|theme| !record.theme_variants.contains_key(&theme.id))
            .map(|theme| theme_variant_key(&theme.id))
            .collect();
        for key in cleared {
            ok &= self.remove(&key);
        }
        ok
    }

    /// Full reset: remove every ledger key
    pub fn reset(&mut self) -> bool {
        log::info!("Resetting inventory");
        let mut keys = vec![coins_key()];
        for category in Category::ALL {
            keys.push(unlocked_key(category));
            keys.push(equipped_key(category));
        }
        let theme_ids: Vec<String> = self
            .catalog
            .items_of(Category::Theme)
            .map(|t| t.id.clone())
            .collect();
        keys.extend(theme_ids.iter().map(|id| theme_variant_key(id)));

        let mut ok = true;
        for key in keys {
            ok &= self.remove(&key);
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    fn ledger() -> Ledger<MemoryStore> {
        let catalog = Arc::new(Catalog::standard().unwrap());
        let mut ledger = Ledger::new(MemoryStore::new(), catalog);
        ledger.initialize_defaults();
        ledger
    }

    #[test]
    fn test_first_run_defaults() {
        let ledger = ledger();
        assert_eq!(ledger.coins(), 0);
        assert_eq!(ledger.equipped(Category::Ball), "ball_red");
        assert_eq!(
            ledger.store().get("@ponggame:unlocked_ball").unwrap().as_deref(),
            Some("[\"ball_red\"]")
        );
        assert!(ledger.record().is_consistent());
    }

    #[test]
    fn test_initialize_defaults_only_once() {
        let mut ledger = ledger();
        ledger.add_coins(300);
        assert!(!ledger.initialize_defaults());
        assert_eq!(ledger.coins(), 300);
    }

    #[test]
    fn test_subtract_insufficient_leaves_balance() {
        let mut ledger = ledger();
        ledger.add_coins(500);
        assert_eq!(
            ledger.subtract_coins(1000),
            SubtractOutcome::Insufficient { balance: 500 }
        );
        assert_eq!(ledger.coins(), 500);
        assert_eq!(
            ledger.subtract_coins(500),
            SubtractOutcome::Debited { balance: 0 }
        );
    }

    #[test]
    fn test_starter_unlock_is_duplicate() {
        let mut ledger = ledger();
        let outcome = ledger.unlock(Category::Ball, "ball_red");
        assert!(outcome.is_duplicate);
        assert_eq!(ledger.unlocked(Category::Ball).len(), 1);
        let refund = ledger.catalog().item("ball_red").unwrap().rarity.duplicate_refund();
        assert_eq!(refund, 100);
    }

    #[test]
    fn test_equip_requires_unlock() {
        let mut ledger = ledger();
        assert_eq!(ledger.equip(Category::Paddle, "paddle_aurora"), EquipOutcome::Locked);
        assert_eq!(ledger.equipped(Category::Paddle), "paddle_blue");

        assert!(!ledger.unlock(Category::Paddle, "paddle_aurora").is_duplicate);
        assert_eq!(ledger.equip(Category::Paddle, "paddle_aurora"), EquipOutcome::Equipped);
        assert_eq!(ledger.equipped(Category::Paddle), "paddle_aurora");
    }

    #[test]
    fn test_failing_store_reads_as_first_run() {
        let catalog = Arc::new(Catalog::standard().unwrap());
        let mut ledger = Ledger::new(MemoryStore::failing(), catalog);
        assert!(!ledger.initialize_defaults());
        assert_eq!(ledger.coins(), 0);
        assert_eq!(ledger.unlocked(Category::Theme).len(), 1);
        assert_eq!(ledger.equipped(Category::Theme), "theme_midnight");
        assert_eq!(ledger.add_coins(10), None);
        assert_eq!(ledger.equip(Category::Ball, "ball_red"), EquipOutcome::Failed);
    }

    #[test]
    fn test_corrupt_value_falls_back() {
        let mut ledger = ledger();
        ledger.store_mut().set("@ponggame:coins", "lots").unwrap();
        assert_eq!(ledger.coins(), 0);
        ledger
            .store_mut()
            .set("@ponggame:equipped_ball", "\"ball_ghost\"")
            .unwrap();
        assert_eq!(ledger.equipped(Category::Ball), "ball_red");
    }

    #[test]
    fn test_theme_variants() {
        let mut ledger = ledger();
        assert_eq!(ledger.theme_variant("theme_galaxy").as_deref(), Some("classic"));
        assert!(ledger.set_theme_variant("theme_galaxy", "nebula"));
        assert_eq!(ledger.theme_variant("theme_galaxy").as_deref(), Some("nebula"));
        assert!(!ledger.set_theme_variant("theme_galaxy", "plaid"));
        assert!(!ledger.set_theme_variant("ball_red", "classic"));
        assert_eq!(ledger.theme_variant("ball_red"), None);
        // Independent of ownership and equip state
        assert!(!ledger.is_unlocked(Category::Theme, "theme_galaxy"));
        assert_eq!(
            ledger.record().theme_variants.get("theme_galaxy").map(String::as_str),
            Some("nebula")
        );
    }

    #[test]
    fn test_reset_and_restore() {
        let mut ledger = ledger();
        ledger.add_coins(2500);
        ledger.unlock(Category::Ball, "ball_blue");
        ledger.equip(Category::Ball, "ball_blue");
        ledger.set_theme_variant("theme_midnight", "deep");
        let saved = ledger.record();

        assert!(ledger.reset());
        assert!(ledger.store().is_empty());
        assert_eq!(ledger.record(), InventoryRecord::starter(ledger.catalog()));

        assert!(ledger.restore(&saved));
        assert_eq!(ledger.record(), saved);
    }

    #[test]
    fn test_failed_unlock_write_is_reported() {
        let mut ledger = ledger();
        ledger.store_mut().set_failing(true);
        let outcome = ledger.unlock(Category::Ball, "ball_blue");
        assert_eq!(outcome, UnlockOutcome {
            is_duplicate: false,
            saved: false
        });
        ledger.store_mut().set_failing(false);
        assert!(!ledger.is_unlocked(Category::Ball, "ball_blue"));
        assert!(ledger.unlock(Category::Ball, "ball_blue").saved);
    }

    #[test]
    fn test_restore_clears_variants_missing_from_record() {
        let mut ledger = ledger();
        let remote = ledger.record();
        ledger.set_theme_variant("theme_galaxy", "nebula");
        ledger.set_theme_variant("theme_midnight", "deep");

        assert!(ledger.restore(&remote));
        assert_eq!(ledger.theme_variant("theme_galaxy").as_deref(), Some("classic"));
        assert!(ledger.record().theme_variants.is_empty());
        assert_eq!(ledger.record(), remote);
    }

    proptest! {
        #[test]
        fn prop_balance_never_negative(start in 0u32..5000, debits in prop::collection::vec(0u32..3000, 1..20)) {
            let mut ledger = ledger();
            ledger.add_coins(start);
            for amount in debits {
                let before = ledger.coins();
                match ledger.subtract_coins(amount) {
                    SubtractOutcome::Debited { balance } => {
                        prop_assert_eq!(balance, before - amount);
                        prop_assert_eq!(ledger.coins(), balance);
                    }
                    SubtractOutcome::Insufficient { balance } => {
                        prop_assert!(amount > before);
                        prop_assert_eq!(balance, before);
                        prop_assert_eq!(ledger.coins(), before);
                    }
                    SubtractOutcome::Failed => prop_assert!(false, "memory store cannot fail"),
                }
            }
        }

        #[test]
        fn prop_unlock_is_idempotent(picks in prop::collection::vec(0usize..9, 1..30)) {
            let mut ledger = ledger();
            let ids: Vec<String> = ledger.catalog().items_of(Category::Ball).map(|i| i.id.clone()).collect();
            for pick in picks {
                let id = &ids[pick];
                let before = ledger.unlocked(Category::Ball);
                let outcome = ledger.unlock(Category::Ball, id);
                let after = ledger.unlocked(Category::Ball);
                prop_assert_eq!(outcome.is_duplicate, before.contains(id));
                if outcome.is_duplicate {
                    prop_assert_eq!(after.len(), before.len());
                } else {
                    prop_assert_eq!(after.len(), before.len() + 1);
                }
                prop_assert!(after.contains(id));
            }
            prop_assert!(ledger.record().is_consistent());
        }
    }
}
