use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::loot::{Catalog, Category};

/// Everything the player owns, as one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub coins: u32,
    pub unlocked_ball_ids: BTreeSet<String>,
    pub unlocked_paddle_ids: BTreeSet<String>,
    pub unlocked_theme_ids: BTreeSet<String>,
    pub equipped_ball_id: String,
    pub equipped_paddle_id: String,
    pub equipped_theme_id: String,
    /// Selected palette per theme id, only for themes that were changed
    #[serde(default)]
    pub theme_variants: BTreeMap<String, String>,
}

impl InventoryRecord {
    /// First-run state: no coins, only the starters owned and equipped
    pub fn starter(catalog: &Catalog) -> Self {
        let starter_id = |category: Category| catalog.starter(category).id.clone();
        let owned = |category: Category| BTreeSet::from([starter_id(category)]);
        Self {
            coins: 0,
            unlocked_ball_ids: owned(Category::Ball),
            unlocked_paddle_ids: owned(Category::Paddle),
            unlocked_theme_ids: owned(Category::Theme),
            equipped_ball_id: starter_id(Category::Ball),
            equipped_paddle_id: starter_id(Category::Paddle),
            equipped_theme_id: starter_id(Category::Theme),
            theme_variants: BTreeMap::new(),
        }
    }

    pub fn unlocked(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Ball => &self.unlocked_ball_ids,
            Category::Paddle => &self.unlocked_paddle_ids,
            Category::Theme => &self.unlocked_theme_ids,
        }
    }

    pub fn unlocked_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::Ball => &mut self.unlocked_ball_ids,
            Category::Paddle => &mut self.unlocked_paddle_ids,
            Category::Theme => &mut self.unlocked_theme_ids,
        }
    }

    pub fn equipped(&self, category: Category) -> &str {
        match category {
            Category::Ball => &self.equipped_ball_id,
            Category::Paddle => &self.equipped_paddle_id,
            Category::Theme => &self.equipped_theme_id,
        }
    }

    pub fn set_equipped(&mut self, category: Category, id: String) {
        match category {
            Category::Ball => self.equipped_ball_id = id,
            Category::Paddle => self.equipped_paddle_id = id,
            Category::Theme => self.equipped_theme_id = id,
        }
    }

    /// Every equipped id is owned
    pub fn is_consistent(&self) -> bool {
        Category::ALL
            .into_iter()
            .all(|c| self.unlocked(c).contains(self.equipped(c)))
    }

    pub fn unlocked_count(&self) -> usize {
        Category::ALL
            .into_iter()
            .map(|c| self.unlocked(c).len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_record_is_consistent() {
        let catalog = Catalog::standard().unwrap();
        let record = InventoryRecord::starter(&catalog);
        assert!(record.is_consistent());
        assert_eq!(record.unlocked_count(), 3);
        assert_eq!(record.equipped(Category::Ball), "ball_red");
        assert_eq!(record.equipped(Category::Paddle), "paddle_blue");
        assert_eq!(record.equipped(Category::Theme), "theme_midnight");
    }

    #[test]
    fn test_equipping_unowned_breaks_consistency() {
        let catalog = Catalog::standard().unwrap();
        let mut record = InventoryRecord::starter(&catalog);
        record.set_equipped(Category::Ball, "ball_rainbow".to_string());
        assert!(!record.is_consistent());
        record
            .unlocked_mut(Category::Ball)
            .insert("ball_rainbow".to_string());
        assert!(record.is_consistent());
    }
}
