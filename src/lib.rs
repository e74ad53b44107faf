//! Plinko Pong - Pong against an AI opponent with a loot box meta loop
//!
//! Core modules:
//! - `sim`: Deterministic match simulation (ball physics, paddles, AI, scoring)
//! - `loot`: Rarity tiers, weighted rolls and the reward catalog
//! - `plinko`: Peg-board drop that decides which reward a box yields
//! - `persistence`: Key-value store collaborator (memory / JSON file)
//! - `inventory`: Coin and unlock ledger over the store
//! - `shop`: Purchase -> drop -> reward -> duplicate refund pipeline
//! - `session`: Owner of a running match (input, pause, coin flush)
//! - `settings`: Persisted player preferences

pub mod inventory;
pub mod loot;
pub mod persistence;
pub mod plinko;
pub mod session;
pub mod settings;
pub mod shop;
pub mod sim;

pub use inventory::{Category, InventoryRecord, Ledger};
pub use loot::{Catalog, Rarity, RewardItem};
pub use session::MatchSession;
pub use settings::{ControlPosition, ControlStyle, Settings};
pub use shop::{PurchaseOutcome, Shop};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;

    /// Default arena (landscape phone, score bar excluded)
    pub const ARENA_WIDTH: f32 = 844.0;
    pub const ARENA_HEIGHT: f32 = 390.0;

    /// Ball is an axis-aligned square of this size (x/y is its top-left corner)
    pub const BALL_SIZE: f32 = 14.0;
    pub const INITIAL_BALL_SPEED: f32 = 6.0;
    /// Added to ball speed on every paddle contact
    pub const BALL_SPEED_INCREMENT: f32 = 0.15;
    pub const MAX_BALL_SPEED: f32 = 14.0;

    pub const PADDLE_WIDTH: f32 = 15.0;
    pub const PADDLE_HEIGHT: f32 = 120.0;
    /// Gap between the screen edge and each paddle
    pub const PADDLE_MARGIN: f32 = 20.0;
    /// Gap between the serving paddle and the pinned ball
    pub const SERVE_OFFSET: f32 = 10.0;
    /// Player paddle movement per nudge (px)
    pub const PLAYER_NUDGE: f32 = 10.0;

    /// Serve angle spread (radians, each side of horizontal): 15 degrees
    pub const SERVE_SPREAD: f32 = std::f32::consts::PI / 12.0;
    /// Deflection at the paddle tip (radians): 45 degrees
    pub const MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

    /// Player auto-serves once the serve timer passes this (10 s)
    pub const PLAYER_AUTO_SERVE_TICKS: u32 = 600;
    /// AI serves once the serve timer passes this (3 s)
    pub const AI_AUTO_SERVE_TICKS: u32 = 180;
    /// Player must wait this long before moving the paddle serves (1 s)
    pub const PLAYER_SERVE_GRACE_TICKS: u32 = 60;
    /// Countdown after resuming from pause (3 s)
    pub const RESUME_COUNTDOWN_TICKS: u32 = 180;

    /// Every Nth consecutive paddle contact pays a rally bonus
    pub const RALLY_COIN_THRESHOLD: u32 = 5;
    pub const RALLY_COIN_REWARD: u32 = 10;

    /// First side to this many points wins
    pub const WIN_SCORE: u32 = 5;

    /// AI retargets when its paddle drifts this far from the target
    pub const AI_RETARGET_DISTANCE: f32 = 50.0;
    /// AI does not move while within this distance of the target
    pub const AI_DEAD_ZONE: f32 = 10.0;
}
