//! Plinko drop that decides which reward a loot box yields
//!
//! The reward is late-bound: `PlinkoSim` integrates a ball through the peg
//! field until it reaches the slot strip, and only the slot it physically
//! ends up in decides the rarity. `resolve_reward` then picks the item.
//!
//! Fixed 60 Hz timestep, seeded RNG, per-tick units (px, px/tick).

pub mod board;
pub mod sim;

pub use board::{Board, BoardError, SLOT_RARITIES};
pub use sim::{DropState, Landing, PlinkoSim, resolve_reward};

/// Board and physics tuning
pub mod consts {
    /// Board dimensions (portrait phone, minus chrome)
    pub const BOARD_WIDTH: f32 = 350.0;
    pub const BOARD_HEIGHT: f32 = 548.0;

    pub const BALL_RADIUS: f32 = 8.0;
    pub const PEG_RADIUS: f32 = 4.0;
    pub const PEG_ROWS: usize = 8;
    pub const PEGS_PER_ROW: usize = 7;
    /// y of the first peg row
    pub const PEG_START_Y: f32 = 80.0;
    /// Vertical space not used by peg rows (top start + bottom strip)
    pub const PEG_FIELD_INSET: f32 = 160.0;

    /// The drop ends once the ball center passes `height - LANDING_INSET`
    pub const LANDING_INSET: f32 = 65.0;
    pub const START_Y: f32 = 20.0;
    /// Initial horizontal velocity is uniform in +/- this
    pub const START_VX_SPREAD: f32 = 0.15;
    pub const START_VY: f32 = 0.2;

    pub const GRAVITY: f32 = 0.15;
    pub const RESTITUTION: f32 = 0.5;
    /// Air resistance per tick on vx; vy gets half of it
    pub const AIR_FRICTION: f32 = 0.05;
    /// Velocity multiplier after a peg bounce
    pub const COLLISION_DAMPING: f32 = 0.85;
    /// Lateral kick on a peg bounce is uniform in +/- this
    pub const PEG_JITTER: f32 = 0.5;

    /// Hard stop for a drop (30 s)
    pub const MAX_DROP_TICKS: u32 = 60 * 30;
}
