//! Deterministic match simulation
//!
//! All match logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one call to `step` per 60 Hz tick)
//! - Seeded RNG only (stored inside `MatchState`)
//! - No rendering, storage or platform dependencies

pub mod ai;
pub mod collision;
pub mod state;
pub mod tick;

pub use ai::{autopilot_command, update_ai};
pub use collision::{ball_hits_paddle, deflect_off_paddle, reflect_off_walls};
pub use state::{
    Arena, Ball, Difficulty, DifficultyProfile, GameEvent, GamePhase, MatchOutcome, MatchState,
    NudgeDirection, Paddle, Score, Side,
};
pub use tick::{PaddleCommand, TickInput, serve, step};
