//! Reward items, loot boxes and the validated catalog registry

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::rarity::{Rarity, RarityWeights, roll_rarity};

/// What kind of cosmetic an item is. Doubles as the inventory category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ball,
    Paddle,
    Theme,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Ball, Category::Paddle, Category::Theme];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ball => "ball",
            Category::Paddle => "paddle",
            Category::Theme => "theme",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named UI colours of a theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePalette {
    pub background: String,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub surface: String,
    pub text: String,
}

/// Alternative palette a theme owner can switch to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeVariant {
    pub key: String,
    pub palette: ThemePalette,
}

/// How an item is drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColorData {
    Solid { color: String },
    /// Animated colour cycle
    Cycle { colors: Vec<String>, period_ms: u32 },
    Palette { variants: Vec<ThemeVariant>, default_variant: String },
}

/// A cosmetic reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub rarity: Rarity,
    pub animated: bool,
    pub colors: ColorData,
    /// Owned by every player from the first run
    #[serde(default)]
    pub starter: bool,
}

impl RewardItem {
    /// Declared palette variants (themes only)
    pub fn variants(&self) -> &[ThemeVariant] {
        match &self.colors {
            ColorData::Palette { variants, .. } => variants,
            _ => &[],
        }
    }

    pub fn default_variant(&self) -> Option<&str> {
        match &self.colors {
            ColorData::Palette {
                default_variant, ..
            } => Some(default_variant),
            _ => None,
        }
    }

    pub fn has_variant(&self, key: &str) -> bool {
        self.variants().iter().any(|v| v.key == key)
    }
}

/// A purchasable box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootBox {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Item ids this box can produce by weighted roll
    pub pool: Vec<String>,
    pub weights: RarityWeights,
    pub price: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate item id: {0}")]
    DuplicateItem(String),

    #[error("Duplicate loot box id: {0}")]
    DuplicateBox(String),

    #[error("Unknown loot box: {0}")]
    UnknownBox(String),

    #[error("Loot box {box_id} references unknown item {item_id}")]
    UnknownItem { box_id: String, item_id: String },

    #[error("Loot box {box_id} holds {item_id}, which is not a {expected} item")]
    WrongCategory {
        box_id: String,
        item_id: String,
        expected: Category,
    },

    #[error("Loot box {box_id} weights sum to {total}, expected 100")]
    BadWeights { box_id: String, total: u32 },

    #[error("No items of rarity {rarity} in {source_name}")]
    NoItemsOfRarity { source_name: String, rarity: Rarity },

    #[error("No starter {0} item declared")]
    MissingStarter(Category),

    #[error("More than one starter {0} item declared")]
    MultipleStarters(Category),

    #[error("Theme {theme_id} default variant {variant} is not one of its variants")]
    UnknownDefaultVariant { theme_id: String, variant: String },
}

/// Read-only registry of every item and box, validated at construction
#[derive(Debug, Clone)]
pub struct Catalog {
    items: BTreeMap<String, RewardItem>,
    boxes: BTreeMap<String, LootBox>,
    starters: BTreeMap<Category, String>,
}

impl Catalog {
    /// Build and validate a catalog. Items must be supplied before boxes can
    /// reference them, so both are passed in explicitly.
    pub fn new(items: Vec<RewardItem>, boxes: Vec<LootBox>) -> Result<Self, CatalogError> {
        let mut by_id = BTreeMap::new();
        let mut starters = BTreeMap::new();
        for item in items {
            if item.starter && starters.insert(item.category, item.id.clone()).is_some() {
                return Err(CatalogError::MultipleStarters(item.category));
            }
            if let Some(variant) = item.default_variant() {
                if !item.has_variant(variant) {
                    return Err(CatalogError::UnknownDefaultVariant {
                        theme_id: item.id.clone(),
                        variant: variant.to_string(),
                    });
                }
            }
            let id = item.id.clone();
            if by_id.insert(id.clone(), item).is_some() {
                return Err(CatalogError::DuplicateItem(id));
            }
        }
        for category in Category::ALL {
            if !starters.contains_key(&category) {
                return Err(CatalogError::MissingStarter(category));
            }
        }

        let mut by_box = BTreeMap::new();
        for lootbox in boxes {
            validate_box(&lootbox, &by_id)?;
            let id = lootbox.id.clone();
            if by_box.insert(id.clone(), lootbox).is_some() {
                return Err(CatalogError::DuplicateBox(id));
            }
        }

        Ok(Self {
            items: by_id,
            boxes: by_box,
            starters,
        })
    }

    /// The shipped catalog
    pub fn standard() -> Result<Self, CatalogError> {
        let catalog = Self::new(super::data::standard_items(), super::data::standard_boxes())?;
        log::debug!(
            "Catalog loaded: {} items, {} loot boxes",
            catalog.items.len(),
            catalog.boxes.len()
        );
        Ok(catalog)
    }

    pub fn item(&self, id: &str) -> Option<&RewardItem> {
        self.items.get(id)
    }

    pub fn lootbox(&self, id: &str) -> Option<&LootBox> {
        self.boxes.get(id)
    }

    pub fn lootboxes(&self) -> impl Iterator<Item = &LootBox> {
        self.boxes.values()
    }

    /// Every item of a category, in id order
    pub fn items_of(&self, category: Category) -> impl Iterator<Item = &RewardItem> {
        self.items.values().filter(move |i| i.category == category)
    }

    pub fn items_of_rarity(&self, category: Category, rarity: Rarity) -> Vec<&RewardItem> {
        self.items_of(category)
            .filter(|i| i.rarity == rarity)
            .collect()
    }

    /// The item every player owns from the start
    pub fn starter(&self, category: Category) -> &RewardItem {
        // Presence of a starter per category is checked in `new`
        &self.items[&self.starters[&category]]
    }

    /// Weighted roll against a box's pool.
    ///
    /// Used for catalog previews; box openings are decided by the Plinko drop.
    pub fn roll_reward_item<R: Rng + ?Sized>(
        &self,
        box_id: &str,
        rng: &mut R,
    ) -> Result<(&RewardItem, Rarity), CatalogError> {
        let lootbox = self
            .lootbox(box_id)
            .ok_or_else(|| CatalogError::UnknownBox(box_id.to_string()))?;
        let rarity = roll_rarity(&lootbox.weights, rng);
        let candidates: Vec<&RewardItem> = lootbox
            .pool
            .iter()
            .filter_map(|id| self.item(id))
            .filter(|i| i.rarity == rarity)
            .collect();
        let item = candidates
            .choose(rng)
            .copied()
            .ok_or_else(|| CatalogError::NoItemsOfRarity {
                source_name: format!("loot box {}", lootbox.id),
                rarity,
            })?;
        Ok((item, rarity))
    }
}

fn validate_box(
    lootbox: &LootBox,
    items: &BTreeMap<String, RewardItem>,
) -> Result<(), CatalogError> {
    let total = lootbox.weights.total();
    if total != 100 {
        return Err(CatalogError::BadWeights {
            box_id: lootbox.id.clone(),
            total,
        });
    }
    for item_id in &lootbox.pool {
        let item = items.get(item_id).ok_or_else(|| CatalogError::UnknownItem {
            box_id: lootbox.id.clone(),
            item_id: item_id.clone(),
        })?;
        if item.category != lootbox.category {
            return Err(CatalogError::WrongCategory {
                box_id: lootbox.id.clone(),
                item_id: item_id.clone(),
                expected: lootbox.category,
            });
        }
    }
    for rarity in lootbox.weights.nonzero_tiers() {
        let covered = lootbox
            .pool
            .iter()
            .filter_map(|id| items.get(id))
            .any(|i| i.rarity == rarity);
        if !covered {
            log::error!("Loot box {} has no {} items", lootbox.id, rarity);
            return Err(CatalogError::NoItemsOfRarity {
                source_name: format!("loot box {}", lootbox.id),
                rarity,
            });
        }
    }
    Ok(())
}
