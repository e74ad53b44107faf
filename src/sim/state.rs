//! Match state and core simulation types
//!
//! Everything a running match needs lives in `MatchState`, including the RNG,
//! so a match can be serialized and replayed from the same seed.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which side of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Human player, left paddle
    Player,
    /// AI opponent, right paddle
    Ai,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }

    /// Horizontal direction of a ball struck by this side (+1 toward the AI)
    pub fn attack_direction(self) -> f32 {
        match self {
            Side::Player => 1.0,
            Side::Ai => -1.0,
        }
    }
}

/// Phase derived from the state flags, for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball pinned to the serving paddle
    Serve,
    /// Ball in play
    Playing,
    /// Simulation suspended
    Paused,
    /// Someone reached the winning score
    GameOver,
}

/// Direction of a single player paddle nudge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NudgeDirection {
    Up,
    Down,
}

/// Named difficulty selected at match creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Tuning for this difficulty
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                ai_speed: 4.0,
                ai_reaction_delay: 0.3,
                ai_error_margin: 30.0,
                coin_reward: 10,
            },
            Difficulty::Medium => DifficultyProfile {
                ai_speed: 6.0,
                ai_reaction_delay: 0.15,
                ai_error_margin: 15.0,
                coin_reward: 50,
            },
            Difficulty::Hard => DifficultyProfile {
                ai_speed: 8.0,
                ai_reaction_delay: 0.05,
                ai_error_margin: 5.0,
                coin_reward: 100,
            },
        }
    }
}

/// Immutable AI tuning and win reward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// AI paddle travel per tick (px)
    pub ai_speed: f32,
    /// Reaction delay shown on the difficulty picker (seconds). The AI does
    /// not read it.
    pub ai_reaction_delay: f32,
    /// Width of the uniform noise band added to the AI aim point (px)
    pub ai_error_margin: f32,
    /// Coins credited when the player wins
    pub coin_reward: u32,
}

/// Playfield dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

/// The ball. `x`/`y` is the top-left corner of its bounding square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    /// Magnitude applied on the next serve or paddle deflection
    pub speed: f32,
}

impl Ball {
    /// Stationary ball at the arena center
    pub fn centered(arena: &Arena) -> Self {
        Self {
            x: arena.width / 2.0,
            y: arena.height / 2.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            speed: INITIAL_BALL_SPEED,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.y + BALL_SIZE / 2.0
    }
}

/// A paddle. `x`/`y` is its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
}

impl Paddle {
    /// Paddle vertically centered at horizontal position `x`
    pub fn at(x: f32, arena: &Arena) -> Self {
        Self {
            x,
            y: arena.height / 2.0 - PADDLE_HEIGHT / 2.0,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.y + PADDLE_HEIGHT / 2.0
    }

    /// Move vertically, staying fully inside the arena
    pub fn set_y_clamped(&mut self, y: f32, arena: &Arena) {
        let max_y = (arena.height - PADDLE_HEIGHT).max(0.0);
        self.y = y.clamp(0.0, max_y);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub player: u32,
    pub ai: u32,
}

impl Score {
    pub fn of(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Ai => self.ai,
        }
    }
}

/// Things that happened during a single tick, for presentation collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Served { by: Side },
    WallBounce,
    PaddleHit { side: Side, rally: u32, speed: f32 },
    RallyBonus { rally: u32, coins: u32 },
    Scored { by: Side, score: Score },
    GameOver { winner: Side, coins: u32 },
}

/// Final result of a finished match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: Side,
    pub score: Score,
    pub coins: u32,
}

/// Complete match state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    /// Seed the match RNG was created from
    pub seed: u64,
    /// Serve angles and AI aim noise
    pub(crate) rng: Pcg32,
    pub arena: Arena,
    pub ball: Ball,
    pub player_paddle: Paddle,
    pub ai_paddle: Paddle,
    pub score: Score,
    pub difficulty: Difficulty,
    pub profile: DifficultyProfile,
    /// Consecutive paddle contacts since the last point
    pub rally_count: u32,
    /// Rally count at which the last rally bonus was paid (0 = none this rally)
    pub last_bonus_rally: u32,
    /// Coins earned this match, not yet in the ledger
    pub total_coins: u32,
    pub is_paused: bool,
    pub game_over: bool,
    /// Holder of the serve token while the ball is inactive
    pub serving: Side,
    /// Ticks spent waiting to serve
    pub serve_timer: u32,
    pub ball_active: bool,
    /// Sticky AI aim point (paddle center target)
    pub ai_target_y: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl MatchState {
    /// Create a match on the default arena
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_arena(difficulty, Arena::default(), seed)
    }

    pub fn with_arena(difficulty: Difficulty, arena: Arena, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            arena,
            ball: Ball::centered(&arena),
            player_paddle: Paddle::at(PADDLE_MARGIN, &arena),
            ai_paddle: Paddle::at(arena.width - PADDLE_MARGIN - PADDLE_WIDTH, &arena),
            score: Score::default(),
            difficulty,
            profile: difficulty.profile(),
            rally_count: 0,
            last_bonus_rally: 0,
            total_coins: 0,
            is_paused: false,
            game_over: false,
            serving: Side::Player,
            serve_timer: 0,
            ball_active: false,
            ai_target_y: arena.height / 2.0,
            time_ticks: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.game_over {
            GamePhase::GameOver
        } else if self.is_paused {
            GamePhase::Paused
        } else if self.ball_active {
            GamePhase::Playing
        } else {
            GamePhase::Serve
        }
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Player => &self.player_paddle,
            Side::Ai => &self.ai_paddle,
        }
    }

    /// Winner and earnings once the match is over
    pub fn outcome(&self) -> Option<MatchOutcome> {
        if !self.game_over {
            return None;
        }
        let winner = if self.score.player >= WIN_SCORE {
            Side::Player
        } else {
            Side::Ai
        };
        Some(MatchOutcome {
            winner,
            score: self.score,
            coins: self.total_coins,
        })
    }

    /// Put the ball back at center after a point; `server` takes the serve token
    pub fn reset_ball(&mut self, server: Side) {
        self.ball = Ball::centered(&self.arena);
        self.ball_active = false;
        self.serving = server;
        self.serve_timer = 0;
        self.rally_count = 0;
        self.last_bonus_rally = 0;
    }
}
