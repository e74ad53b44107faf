//! Peg lattice and the slot strip at the bottom of the board

use glam::Vec2;
use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::consts::*;
use super::sim::landing_x;
use crate::loot::Rarity;

/// Rarity of each bottom slot, left to right. The single legendary slot sits
/// in the middle.
pub const SLOT_RARITIES: [Rarity; 20] = {
    use Rarity::*;
    [
        Common, Uncommon, Common, Common, Rare, Common, Common, Uncommon, Common, Epic, Legendary,
        Common, Uncommon, Common, Common, Rare, Common, Common, Uncommon, Common,
    ]
};

pub const MIN_SLOTS: usize = 15;
pub const MAX_SLOTS: usize = 20;

/// Drops simulated to measure where balls land before the edges are placed
pub const CALIBRATION_DROPS: usize = 6000;
const CALIBRATION_SEED: u64 = 0x504c_494e_4b4f;
/// Narrowest a slot can get when its odds are zero
const MIN_SLOT_WIDTH: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("Board needs 15-20 slots, got {0}")]
    SlotCount(usize),
}

/// Static board geometry.
///
/// Slot edges sit at quantiles of the measured landing positions, so a slot's
/// width follows its odds: each tier is landed on as often as its drop rate
/// says. The slot table still decides which rarity sits where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub width: f32,
    pub height: f32,
    pegs: Vec<Vec2>,
    slots: Vec<Rarity>,
    /// Landing odds per slot in percent
    odds: Vec<f32>,
    /// `slots.len() + 1` ascending x positions from 0 to `width`
    edges: Vec<f32>,
}

static STANDARD: Lazy<Board> = Lazy::new(|| Board::new(BOARD_WIDTH, BOARD_HEIGHT));

impl Default for Board {
    fn default() -> Self {
        STANDARD.clone()
    }
}

impl Board {
    /// Board with the standard slot table
    pub fn new(width: f32, height: f32) -> Self {
        Self::build(width, height, SLOT_RARITIES.to_vec())
    }

    /// Board with a custom slot table
    pub fn with_slots(width: f32, height: f32, slots: Vec<Rarity>) -> Result<Self, BoardError> {
        if !(MIN_SLOTS..=MAX_SLOTS).contains(&slots.len()) {
            return Err(BoardError::SlotCount(slots.len()));
        }
        Ok(Self::build(width, height, slots))
    }

    fn build(width: f32, height: f32, slots: Vec<Rarity>) -> Self {
        let count = slots.len();
        let mut board = Self {
            width,
            height,
            pegs: generate_pegs(width, height),
            odds: slot_odds(&slots),
            edges: (0..=count).map(|i| i as f32 * width / count as f32).collect(),
            slots,
        };
        board.calibrate();
        board
    }

    /// Move the slot edges to the landing quantiles of the slot odds
    fn calibrate(&mut self) {
        let mut seeds = Pcg32::seed_from_u64(CALIBRATION_SEED);
        let mut xs: Vec<f32> = (0..CALIBRATION_DROPS)
            .map(|_| landing_x(self, seeds.random()))
            .collect();
        xs.sort_by(f32::total_cmp);

        let total: f32 = self.odds.iter().sum();
        let last = self.slot_count() - 1;
        let mut edges = Vec::with_capacity(self.slot_count() + 1);
        let mut prev = 0.0;
        let mut cumulative = 0.0;
        edges.push(prev);
        for odds in &self.odds[..last] {
            cumulative += odds;
            let rank = (cumulative / total * xs.len() as f32) as usize;
            let quantile = xs.get(rank).copied().unwrap_or(self.width);
            prev = quantile.max(prev + MIN_SLOT_WIDTH).min(self.width);
            edges.push(prev);
        }
        edges.push(self.width);
        log::debug!("Calibrated {} slot edges from {} drops", edges.len(), xs.len());
        self.edges = edges;
    }

    pub fn pegs(&self) -> &[Vec2] {
        &self.pegs
    }

    pub fn slots(&self) -> &[Rarity] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn edges(&self) -> &[f32] {
        &self.edges
    }

    pub fn slot_width(&self, index: usize) -> f32 {
        let index = index.min(self.slot_count() - 1);
        self.edges[index + 1] - self.edges[index]
    }

    /// y at which a falling ball is considered landed
    pub fn landing_y(&self) -> f32 {
        self.height - LANDING_INSET
    }

    /// Slot under horizontal position `x`, clamped to a real slot.
    ///
    /// Drift can put `x` slightly outside the board (or produce NaN); that is
    /// corrected here, never reported.
    pub fn slot_index(&self, x: f32) -> usize {
        let inner = &self.edges[1..self.slot_count()];
        inner.partition_point(|edge| *edge <= x)
    }

    pub fn slot_center(&self, index: usize) -> f32 {
        let index = index.min(self.slot_count() - 1);
        (self.edges[index] + self.edges[index + 1]) / 2.0
    }

    pub fn slot_rarity(&self, index: usize) -> Rarity {
        self.slots[index.min(self.slot_count() - 1)]
    }

    /// Landing odds per rarity (percent), for display
    pub fn slot_distribution(&self) -> Vec<(Rarity, f32)> {
        let total: f32 = self.odds.iter().sum();
        Rarity::ALL
            .into_iter()
            .map(|rarity| {
                let odds: f32 = self
                    .slots
                    .iter()
                    .zip(&self.odds)
                    .filter(|(r, _)| **r == rarity)
                    .map(|(_, odds)| odds)
                    .sum();
                (rarity, odds * 100.0 / total)
            })
            .filter(|(_, share)| *share > 0.0)
            .collect()
    }
}

/// Each tier's drop rate split evenly over its slots. A table whose tiers
/// all have a zero rate gets even odds.
fn slot_odds(slots: &[Rarity]) -> Vec<f32> {
    let odds: Vec<f32> = slots
        .iter()
        .map(|rarity| {
            let count = slots.iter().filter(|r| *r == rarity).count();
            rarity.info().drop_rate as f32 / count as f32
        })
        .collect();
    if odds.iter().sum::<f32>() > 0.0 {
        odds
    } else {
        vec![1.0; slots.len()]
    }
}

/// Zig-zag lattice: every other row shifted by half the peg spacing
fn generate_pegs(width: f32, height: f32) -> Vec<Vec2> {
    let row_height = (height - PEG_FIELD_INSET) / PEG_ROWS as f32;
    let spacing = width / (PEGS_PER_ROW as f32 + 1.0);

    let mut pegs = Vec::with_capacity(PEG_ROWS * PEGS_PER_ROW);
    for row in 0..PEG_ROWS {
        let offset = if row % 2 == 0 { 0.0 } else { spacing / 2.0 };
        let y = PEG_START_Y + row as f32 * row_height;
        for col in 0..PEGS_PER_ROW {
            pegs.push(Vec2::new((col as f32 + 1.0) * spacing + offset, y));
        }
    }
    pegs
}
