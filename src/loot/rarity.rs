//! Rarity tiers and the weighted rarity roll

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Reward scarcity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    /// Never dropped by a box; reserved for special grants
    Secret,
}

/// Display metadata for a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RarityInfo {
    pub label: &'static str,
    pub color: &'static str,
    pub glow_color: &'static str,
    /// Advertised drop rate in percent
    pub drop_rate: u32,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Secret,
    ];

    /// Tiers a loot box can roll
    pub const DROPPABLE: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Secret => "secret",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
    }

    pub fn info(&self) -> RarityInfo {
        match self {
            Rarity::Common => RarityInfo {
                label: "Common",
                color: "#9CA3AF",
                glow_color: "rgba(156, 163, 175, 0.3)",
                drop_rate: 64,
            },
            Rarity::Uncommon => RarityInfo {
                label: "Uncommon",
                color: "#10B981",
                glow_color: "rgba(16, 185, 129, 0.3)",
                drop_rate: 20,
            },
            Rarity::Rare => RarityInfo {
                label: "Rare",
                color: "#3B82F6",
                glow_color: "rgba(59, 130, 246, 0.3)",
                drop_rate: 10,
            },
            Rarity::Epic => RarityInfo {
                label: "Epic",
                color: "#A855F7",
                glow_color: "rgba(168, 85, 247, 0.3)",
                drop_rate: 5,
            },
            Rarity::Legendary => RarityInfo {
                label: "Legendary",
                color: "#F59E0B",
                glow_color: "rgba(245, 158, 11, 0.5)",
                drop_rate: 1,
            },
            Rarity::Secret => RarityInfo {
                label: "Secret",
                color: "#EC4899",
                glow_color: "rgba(236, 72, 153, 0.6)",
                drop_rate: 0,
            },
        }
    }

    /// Coins paid back when a reward of this tier is already owned
    pub fn duplicate_refund(&self) -> u32 {
        match self {
            Rarity::Common => 100,
            Rarity::Uncommon => 200,
            Rarity::Rare => 300,
            Rarity::Epic => 400,
            Rarity::Legendary => 500,
            Rarity::Secret => 1000,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tier drop weights in percent. Must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityWeights {
    pub common: u32,
    pub uncommon: u32,
    pub rare: u32,
    pub epic: u32,
    pub legendary: u32,
}

impl RarityWeights {
    /// 64 / 20 / 10 / 5 / 1
    pub const STANDARD: RarityWeights = RarityWeights {
        common: 64,
        uncommon: 20,
        rare: 10,
        epic: 5,
        legendary: 1,
    };

    /// Order in which cumulative thresholds are built. Common is the fallback.
    const PRECEDENCE: [Rarity; 4] = [
        Rarity::Legendary,
        Rarity::Epic,
        Rarity::Rare,
        Rarity::Uncommon,
    ];

    pub fn weight(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
            Rarity::Secret => 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.common + self.uncommon + self.rare + self.epic + self.legendary
    }

    /// Tiers this table can actually produce
    pub fn nonzero_tiers(&self) -> impl Iterator<Item = Rarity> + '_ {
        Rarity::DROPPABLE
            .into_iter()
            .filter(|r| self.weight(*r) > 0)
    }

    /// Resolve a draw in [0, 100) to a tier.
    ///
    /// Thresholds accumulate legendary, epic, rare, uncommon in that order; the
    /// first threshold exceeding the draw wins, anything past them is common.
    pub fn resolve(&self, draw: f64) -> Rarity {
        let mut cumulative = 0.0;
        for rarity in Self::PRECEDENCE {
            cumulative += self.weight(rarity) as f64;
            if draw < cumulative {
                return rarity;
            }
        }
        Rarity::Common
    }
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Draw once in [0, 100) and resolve it against `weights`
pub fn roll_rarity<R: Rng + ?Sized>(weights: &RarityWeights, rng: &mut R) -> Rarity {
    let draw = rng.random_range(0.0..100.0);
    weights.resolve(draw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashMap;

    #[test]
    fn test_high_draw_falls_through_to_common() {
        // Cumulative from legendary up only reaches 36
        assert_eq!(RarityWeights::STANDARD.resolve(99.5), Rarity::Common);
        assert_eq!(RarityWeights::STANDARD.resolve(36.0), Rarity::Common);
    }

    #[test]
    fn test_threshold_boundaries() {
        let w = RarityWeights::STANDARD;
        assert_eq!(w.resolve(0.0), Rarity::Legendary);
        assert_eq!(w.resolve(0.999), Rarity::Legendary);
        assert_eq!(w.resolve(1.0), Rarity::Epic);
        assert_eq!(w.resolve(5.999), Rarity::Epic);
        assert_eq!(w.resolve(6.0), Rarity::Rare);
        assert_eq!(w.resolve(16.0), Rarity::Uncommon);
        assert_eq!(w.resolve(35.99), Rarity::Uncommon);
    }

    #[test]
    fn test_zero_weight_tier_never_resolves() {
        let w = RarityWeights {
            common: 90,
            uncommon: 10,
            rare: 0,
            epic: 0,
            legendary: 0,
        };
        assert_eq!(w.resolve(0.0), Rarity::Uncommon);
        assert_eq!(w.nonzero_tiers().collect::<Vec<_>>(), vec![
            Rarity::Common,
            Rarity::Uncommon
        ]);
    }

    #[test]
    fn test_roll_converges_to_weights() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let weights = RarityWeights::STANDARD;
        let samples = 200_000;
        let mut counts: HashMap<Rarity, u32> = HashMap::new();
        for _ in 0..samples {
            *counts.entry(roll_rarity(&weights, &mut rng)).or_default() += 1;
        }
        for rarity in Rarity::DROPPABLE {
            let observed = *counts.get(&rarity).unwrap_or(&0) as f64 / samples as f64 * 100.0;
            let expected = weights.weight(rarity) as f64;
            assert!(
                (observed - expected).abs() < 0.6,
                "{rarity}: observed {observed:.2}% expected {expected}%"
            );
        }
    }

    #[test]
    fn test_refund_table() {
        assert_eq!(Rarity::Common.duplicate_refund(), 100);
        assert_eq!(Rarity::Legendary.duplicate_refund(), 500);
        assert!(Rarity::Secret.duplicate_refund() > Rarity::Legendary.duplicate_refund());
    }

    #[test]
    fn test_drop_rates_match_standard_weights() {
        for rarity in Rarity::DROPPABLE {
            assert_eq!(rarity.info().drop_rate, RarityWeights::STANDARD.weight(rarity));
        }
        assert_eq!(Rarity::from_str("EPIC"), Some(Rarity::Epic));
    }
}
