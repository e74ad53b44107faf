//! Fixed-step Plinko ball integration and late-bound reward resolution

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::consts::*;
use crate::loot::{Catalog, CatalogError, Category, Rarity, RewardItem};

/// Where a drop came to rest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landing {
    /// Slot index, always within the board's slot range
    pub slot: usize,
    /// Read from the slot table at landing time
    pub rarity: Rarity,
    /// Ball x snapped to the slot center
    pub x: f32,
    /// Ticks the drop took
    pub ticks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropState {
    Falling,
    Landed(Landing),
}

/// A single ball drop through the peg field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlinkoSim {
    board: Board,
    pub pos: Vec2,
    pub vel: Vec2,
    rng: Pcg32,
    ticks: u32,
    landing: Option<Landing>,
}

impl PlinkoSim {
    /// Ball at a random spot along the top with a small sideways drift
    pub fn new(board: Board, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let (pos, vel) = launch(board.width, &mut rng);
        Self {
            pos,
            vel,
            board,
            rng,
            ticks: 0,
            landing: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn landing(&self) -> Option<Landing> {
        self.landing
    }

    /// Advance one tick. Once landed, further calls change nothing.
    pub fn step(&mut self) -> DropState {
        if let Some(landing) = self.landing {
            return DropState::Landed(landing);
        }
        self.ticks += 1;
        if advance(&self.board, &mut self.pos, &mut self.vel, &mut self.rng) {
            return DropState::Landed(self.land());
        }
        DropState::Falling
    }

    /// Step until landed or `max_ticks` have elapsed; a drop that runs out of
    /// ticks lands wherever it is.
    pub fn run(&mut self, max_ticks: u32) -> Landing {
        while self.ticks < max_ticks {
            if let DropState::Landed(landing) = self.step() {
                return landing;
            }
        }
        match self.landing {
            Some(landing) => landing,
            None => {
                log::warn!("Plinko drop hit the {max_ticks}-tick cap, landing in place");
                self.land()
            }
        }
    }

    /// Convenience: full drop on `board` from `seed`
    pub fn simulate(board: Board, seed: u64) -> Landing {
        Self::new(board, seed).run(MAX_DROP_TICKS)
    }

    /// Snap into the current slot and read its rarity
    fn land(&mut self) -> Landing {
        let slot = self.board.slot_index(self.pos.x);
        let landing = Landing {
            slot,
            rarity: self.board.slot_rarity(slot),
            x: self.board.slot_center(slot),
            ticks: self.ticks,
        };
        self.pos.x = landing.x;
        self.vel = Vec2::ZERO;
        self.landing = Some(landing);
        log::debug!(
            "Plinko ball landed in slot {} ({}) after {} ticks",
            landing.slot,
            landing.rarity,
            landing.ticks
        );
        landing
    }
}

fn launch(width: f32, rng: &mut Pcg32) -> (Vec2, Vec2) {
    let margin = BALL_RADIUS.min(width / 2.0);
    let x = rng.random_range(margin..=width - margin);
    let vx = rng.random_range(-START_VX_SPREAD..=START_VX_SPREAD);
    (Vec2::new(x, START_Y), Vec2::new(vx, START_VY))
}

/// One physics tick. True once the ball reaches the slot strip.
fn advance(board: &Board, pos: &mut Vec2, vel: &mut Vec2, rng: &mut Pcg32) -> bool {
    vel.y += GRAVITY;
    vel.x *= 1.0 - AIR_FRICTION;
    vel.y *= 1.0 - AIR_FRICTION * 0.5;
    *pos += *vel;

    let min_dist = BALL_RADIUS + PEG_RADIUS;
    for peg in board.pegs() {
        let delta = *pos - *peg;
        let dist = delta.length();
        if dist >= min_dist {
            continue;
        }
        // Dead-center overlap has no direction; push straight up
        let normal = if dist > f32::EPSILON {
            delta / dist
        } else {
            Vec2::NEG_Y
        };
        *pos += normal * (min_dist - dist);

        let closing = vel.dot(normal);
        if closing < 0.0 {
            *vel += normal * (-(1.0 + RESTITUTION) * closing);
            vel.x += rng.random_range(-PEG_JITTER..=PEG_JITTER);
            *vel *= COLLISION_DAMPING;
        }
    }

    if pos.x - BALL_RADIUS < 0.0 {
        pos.x = BALL_RADIUS;
        vel.x = vel.x.abs() * RESTITUTION;
    }
    if pos.x + BALL_RADIUS > board.width {
        pos.x = board.width - BALL_RADIUS;
        vel.x = -vel.x.abs() * RESTITUTION;
    }

    pos.y >= board.landing_y()
}

/// Unsnapped x where the drop from `seed` crosses the landing line. Slot
/// edges are placed from these.
pub(super) fn landing_x(board: &Board, seed: u64) -> f32 {
    let mut rng = Pcg32::seed_from_u64(seed);
    let (mut pos, mut vel) = launch(board.width, &mut rng);
    for _ in 0..MAX_DROP_TICKS {
        if advance(board, &mut pos, &mut vel, &mut rng) {
            break;
        }
    }
    pos.x
}

/// Second phase of a box opening: a uniformly random item of the landed
/// rarity from every item of `category`.
pub fn resolve_reward<'c, R: Rng + ?Sized>(
    catalog: &'c Catalog,
    category: Category,
    landing: &Landing,
    rng: &mut R,
) -> Result<&'c RewardItem, CatalogError> {
    catalog
        .items_of_rarity(category, landing.rarity)
        .choose(rng)
        .copied()
        .ok_or_else(|| CatalogError::NoItemsOfRarity {
            source_name: format!("{category} catalog"),
            rarity: landing.rarity,
        })
}
