//! A match as the game screen drives it
//!
//! `MatchSession` is the one owner of `MatchState`. Held arrows and drags are
//! recorded here and folded into the next tick's input, so input and physics
//! never race. Pause, game over and exit drop any held input.

use crate::consts::*;
use crate::inventory::Ledger;
use crate::persistence::KvStore;
use crate::settings::{ControlStyle, Settings};
use crate::sim::{Difficulty, GameEvent, GamePhase, MatchState, NudgeDirection, PaddleCommand, TickInput, step};

pub struct MatchSession {
    state: MatchState,
    control_style: ControlStyle,
    held: Option<NudgeDirection>,
    pending_drag: Option<f32>,
    idle_mode: bool,
    /// Ticks left before a resumed match starts moving again
    resume_countdown: u32,
    /// Part of `total_coins` already credited to the ledger
    flushed_coins: u32,
}

impl MatchSession {
    pub fn new(difficulty: Difficulty, seed: u64, control_style: ControlStyle) -> Self {
        log::info!("Starting {} match (seed {seed})", difficulty.as_str());
        Self {
            state: MatchState::new(difficulty, seed),
            control_style,
            held: None,
            pending_drag: None,
            idle_mode: false,
            resume_countdown: 0,
            flushed_coins: 0,
        }
    }

    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        Self::new(settings.default_difficulty, seed, settings.control_style)
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn control_style(&self) -> ControlStyle {
        self.control_style
    }

    pub fn set_control_style(&mut self, style: ControlStyle) {
        self.control_style = style;
        self.held = None;
        self.pending_drag = None;
    }

    /// Demo mode: the autopilot plays the player's paddle
    pub fn set_idle(&mut self, idle: bool) {
        self.idle_mode = idle;
    }

    fn accepts_input(&self) -> bool {
        !self.state.is_paused && !self.state.game_over
    }

    pub fn held(&self) -> Option<NudgeDirection> {
        self.held
    }

    /// Press and hold an arrow. Ignored in drag mode or while stopped.
    pub fn hold(&mut self, direction: NudgeDirection) {
        if self.control_style == ControlStyle::Arrows && self.accepts_input() {
            self.held = Some(direction);
        }
    }

    pub fn release(&mut self) {
        self.held = None;
    }

    /// Touch drag to `y`. Ignored in arrow mode or while stopped.
    pub fn drag_to(&mut self, y: f32) {
        if self.control_style == ControlStyle::Drag && self.accepts_input() {
            self.pending_drag = Some(y);
        }
    }

    pub fn pause(&mut self) {
        if self.state.game_over {
            return;
        }
        self.state.is_paused = true;
        self.resume_countdown = 0;
        self.held = None;
        self.pending_drag = None;
    }

    /// Start the countdown back into play
    pub fn resume(&mut self) {
        if self.state.is_paused && !self.state.game_over && self.resume_countdown == 0 {
            self.resume_countdown = RESUME_COUNTDOWN_TICKS;
        }
    }

    /// Whole seconds left on the resume countdown, if one is running
    pub fn countdown_seconds(&self) -> Option<u32> {
        (self.resume_countdown > 0).then(|| self.resume_countdown.div_ceil(TICK_RATE))
    }

    /// Advance one 60 Hz tick
    pub fn tick(&mut self) -> Vec<GameEvent> {
        if self.resume_countdown > 0 {
            self.resume_countdown -= 1;
            if self.resume_countdown == 0 {
                self.state.is_paused = false;
            }
            return Vec::new();
        }
        if !self.accepts_input() {
            return Vec::new();
        }

        let paddle = match (self.pending_drag.take(), self.held) {
            (Some(y), _) => PaddleCommand::DragTo(y),
            (None, Some(direction)) => PaddleCommand::Nudge(direction),
            (None, None) => PaddleCommand::None,
        };
        let input = TickInput {
            paddle,
            idle_mode: self.idle_mode,
        };
        let events = step(&mut self.state, &input);

        if self.state.game_over {
            self.held = None;
            if let Some(outcome) = self.state.outcome() {
                log::info!(
                    "Match over: {:?} won {}-{}, {} coins earned",
                    outcome.winner,
                    outcome.score.player,
                    outcome.score.ai,
                    outcome.coins
                );
            }
        }
        events
    }

    /// Coins earned but not yet credited
    pub fn unflushed_coins(&self) -> u32 {
        self.state.total_coins - self.flushed_coins
    }

    /// Credit newly earned coins. Safe to call any number of times; only the
    /// unflushed part is paid, and a failed write is retried next call.
    pub fn flush_coins<S: KvStore>(&mut self, ledger: &mut Ledger<S>) -> u32 {
        let amount = self.unflushed_coins();
        if amount == 0 {
            return 0;
        }
        match ledger.add_coins(amount) {
            Some(balance) => {
                self.flushed_coins += amount;
                log::info!("Flushed {amount} coins, balance {balance}");
                amount
            }
            None => 0,
        }
    }

    /// Leave the match screen
    pub fn exit<S: KvStore>(&mut self, ledger: &mut Ledger<S>) -> u32 {
        self.held = None;
        self.pending_drag = None;
        self.resume_countdown = 0;
        self.flush_coins(ledger)
    }

    /// Flush, then start a fresh match at the same difficulty
    pub fn restart<S: KvStore>(&mut self, ledger: &mut Ledger<S>) -> u32 {
        let flushed = self.exit(ledger);
        let seed = self.state.seed.wrapping_add(1);
        let difficulty = self.state.difficulty;
        *self = Self {
            idle_mode: self.idle_mode,
            ..Self::new(difficulty, seed, self.control_style)
        };
        flushed
    }

    /// Tick until the match ends or `max_ticks` pass. Returns ticks run.
    pub fn run_to_end(&mut self, max_ticks: u64) -> u64 {
        let mut ticks = 0;
        while ticks < max_ticks && !self.state.game_over {
            self.tick();
            ticks += 1;
        }
        ticks
    }
}
