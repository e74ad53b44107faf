//! Rarity tiers, weighted rolls and the reward catalog
//!
//! The catalog is built once at startup, validated, and shared read-only
//! (`Arc<Catalog>`) with the ledger and the shop.

pub mod catalog;
pub mod data;
pub mod rarity;

pub use catalog::{
    Catalog, CatalogError, Category, ColorData, LootBox, RewardItem, ThemePalette, ThemeVariant,
};
pub use rarity::{Rarity, RarityInfo, RarityWeights, roll_rarity};
