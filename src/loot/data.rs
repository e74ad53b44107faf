//! Shipped catalog data: ball skins, paddle skins, themes and loot boxes

use super::catalog::{Category, ColorData, LootBox, RewardItem, ThemePalette, ThemeVariant};
use super::rarity::{Rarity, RarityWeights};

/// Time between colour steps for animated skins (ms)
const CYCLE_PERIOD_MS: u32 = 300;

const RAINBOW: [&str; 7] = [
    "#EF4444", "#F97316", "#EAB308", "#10B981", "#3B82F6", "#6366F1", "#A855F7",
];

fn solid(id: &str, name: &str, category: Category, rarity: Rarity, color: &str) -> RewardItem {
    RewardItem {
        id: id.to_string(),
        name: name.to_string(),
        category,
        rarity,
        animated: false,
        colors: ColorData::Solid {
            color: color.to_string(),
        },
        starter: false,
    }
}

fn cycling(id: &str, name: &str, category: Category, colors: &[&str]) -> RewardItem {
    RewardItem {
        id: id.to_string(),
        name: name.to_string(),
        category,
        rarity: Rarity::Legendary,
        animated: true,
        colors: ColorData::Cycle {
            colors: colors.iter().map(|c| c.to_string()).collect(),
            period_ms: CYCLE_PERIOD_MS,
        },
        starter: false,
    }
}

fn palette(colors: [&str; 6]) -> ThemePalette {
    let [background, primary, secondary, accent, surface, text] = colors.map(str::to_string);
    ThemePalette {
        background,
        primary,
        secondary,
        accent,
        surface,
        text,
    }
}

/// A theme with a "classic" variant plus optional alternates
fn theme(id: &str, name: &str, rarity: Rarity, variants: &[(&str, [&str; 6])]) -> RewardItem {
    let variants: Vec<ThemeVariant> = variants
        .iter()
        .map(|(key, colors)| ThemeVariant {
            key: key.to_string(),
            palette: palette(*colors),
        })
        .collect();
    let default_variant = variants
        .first()
        .map(|v| v.key.clone())
        .unwrap_or_default();
    RewardItem {
        id: id.to_string(),
        name: name.to_string(),
        category: Category::Theme,
        rarity,
        animated: rarity == Rarity::Legendary,
        colors: ColorData::Palette {
            variants,
            default_variant,
        },
        starter: false,
    }
}

fn starter(mut item: RewardItem) -> RewardItem {
    item.starter = true;
    item
}

pub fn ball_skins() -> Vec<RewardItem> {
    use Category::Ball;
    vec![
        starter(solid("ball_red", "Red Ball", Ball, Rarity::Common, "#EF4444")),
        solid("ball_orange", "Orange Ball", Ball, Rarity::Common, "#F97316"),
        solid("ball_yellow", "Yellow Ball", Ball, Rarity::Common, "#EAB308"),
        solid("ball_brown", "Brown Ball", Ball, Rarity::Common, "#92400E"),
        solid("ball_green", "Green Ball", Ball, Rarity::Uncommon, "#10B981"),
        solid("ball_grey", "Grey Ball", Ball, Rarity::Uncommon, "#6B7280"),
        solid("ball_blue", "Blue Ball", Ball, Rarity::Rare, "#3B82F6"),
        solid("ball_purple", "Purple Ball", Ball, Rarity::Epic, "#A855F7"),
        cycling("ball_rainbow", "Rainbow Ball", Ball, &RAINBOW),
    ]
}

pub fn paddle_skins() -> Vec<RewardItem> {
    use Category::Paddle;
    vec![
        starter(solid("paddle_blue", "Blue Paddle", Paddle, Rarity::Common, "#3B82F6")),
        solid("paddle_white", "White Paddle", Paddle, Rarity::Common, "#F1F5F9"),
        solid("paddle_slate", "Slate Paddle", Paddle, Rarity::Common, "#475569"),
        solid("paddle_teal", "Teal Paddle", Paddle, Rarity::Common, "#14B8A6"),
        solid("paddle_lime", "Lime Paddle", Paddle, Rarity::Uncommon, "#84CC16"),
        solid("paddle_amber", "Amber Paddle", Paddle, Rarity::Uncommon, "#F59E0B"),
        solid("paddle_crimson", "Crimson Paddle", Paddle, Rarity::Rare, "#DC2626"),
        solid("paddle_violet", "Violet Paddle", Paddle, Rarity::Epic, "#7C3AED"),
        cycling(
            "paddle_aurora",
            "Aurora Paddle",
            Paddle,
            &["#22D3EE", "#34D399", "#A3E635", "#818CF8", "#E879F9"],
        ),
    ]
}

pub fn themes() -> Vec<RewardItem> {
    vec![
        starter(theme("theme_midnight", "Midnight", Rarity::Common, &[
            ("classic", ["#0F172A", "#3B82F6", "#8B5CF6", "#10B981", "#1E293B", "#F1F5F9"]),
            ("deep", ["#020617", "#2563EB", "#7C3AED", "#059669", "#0F172A", "#E2E8F0"]),
        ])),
        theme("theme_slate", "Slate", Rarity::Common, &[
            ("classic", ["#1E293B", "#94A3B8", "#64748B", "#38BDF8", "#334155", "#F8FAFC"]),
        ]),
        theme("theme_forest", "Forest", Rarity::Common, &[
            ("classic", ["#052E16", "#22C55E", "#15803D", "#FACC15", "#14532D", "#ECFDF5"]),
            ("moss", ["#1A2E05", "#84CC16", "#4D7C0F", "#FDE047", "#365314", "#F7FEE7"]),
        ]),
        theme("theme_sand", "Sand", Rarity::Common, &[
            ("classic", ["#FEF3C7", "#B45309", "#92400E", "#0EA5E9", "#FDE68A", "#451A03"]),
        ]),
        theme("theme_ocean", "Ocean", Rarity::Uncommon, &[
            ("classic", ["#082F49", "#0EA5E9", "#0284C7", "#2DD4BF", "#0C4A6E", "#F0F9FF"]),
            ("reef", ["#042F2E", "#14B8A6", "#0D9488", "#FB7185", "#134E4A", "#F0FDFA"]),
        ]),
        theme("theme_rose", "Rose", Rarity::Uncommon, &[
            ("classic", ["#4C0519", "#F43F5E", "#E11D48", "#FDA4AF", "#881337", "#FFF1F2"]),
        ]),
        theme("theme_neon", "Neon", Rarity::Rare, &[
            ("classic", ["#09090B", "#22D3EE", "#E879F9", "#A3E635", "#18181B", "#FAFAFA"]),
            ("acid", ["#0A0A0A", "#A3E635", "#FACC15", "#22D3EE", "#171717", "#FAFAFA"]),
        ]),
        theme("theme_sunset", "Sunset", Rarity::Epic, &[
            ("classic", ["#431407", "#F97316", "#DB2777", "#FACC15", "#7C2D12", "#FFF7ED"]),
            ("dusk", ["#2E1065", "#FB923C", "#C026D3", "#FDE047", "#4C1D95", "#FAF5FF"]),
        ]),
        theme("theme_galaxy", "Galaxy", Rarity::Legendary, &[
            ("classic", ["#030014", "#A855F7", "#6366F1", "#F472B6", "#1E1B4B", "#F5F3FF"]),
            ("nebula", ["#0B0120", "#EC4899", "#8B5CF6", "#22D3EE", "#2E1065", "#FDF4FF"]),
            ("void", ["#000000", "#6366F1", "#312E81", "#C4B5FD", "#0F0F23", "#E0E7FF"]),
        ]),
    ]
}

pub fn standard_items() -> Vec<RewardItem> {
    let mut items = ball_skins();
    items.extend(paddle_skins());
    items.extend(themes());
    items
}

fn lootbox(id: &str, name: &str, description: &str, pool: Vec<RewardItem>, price: u32) -> LootBox {
    let category = pool.first().map(|i| i.category).unwrap_or(Category::Ball);
    LootBox {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        pool: pool.into_iter().map(|i| i.id).collect(),
        weights: RarityWeights::STANDARD,
        price,
    }
}

pub fn standard_boxes() -> Vec<LootBox> {
    vec![
        lootbox(
            "basic_box",
            "Basic Box",
            "Contains all 9 ball skins",
            ball_skins(),
            1000,
        ),
        lootbox(
            "paddle_box",
            "Paddle Box",
            "Contains all 9 paddle skins",
            paddle_skins(),
            1000,
        ),
        lootbox(
            "theme_box",
            "Theme Box",
            "Contains all 9 themes",
            themes(),
            1500,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_category_has_one_item_per_droppable_tier() {
        for pool in [ball_skins(), paddle_skins(), themes()] {
            for rarity in Rarity::DROPPABLE {
                assert!(pool.iter().any(|i| i.rarity == rarity), "{rarity} missing");
            }
            assert_eq!(pool.iter().filter(|i| i.starter).count(), 1);
        }
    }

    #[test]
    fn test_theme_default_variant_is_first() {
        for item in themes() {
            assert_eq!(item.default_variant(), Some("classic"));
        }
    }
}
