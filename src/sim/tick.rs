//! Fixed timestep simulation tick
//!
//! One call to `step` advances the match by one 60 Hz tick: player input
//! first, then the ball (serve sub-state or free flight), then the AI.

use rand::Rng;

use super::ai::{autopilot_command, update_ai};
use super::collision::{ball_hits_paddle, deflect_off_paddle, reflect_off_walls};
use super::state::{GameEvent, MatchState, NudgeDirection, Side};
use crate::consts::*;

/// What the player did to their paddle this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PaddleCommand {
    #[default]
    None,
    /// Arrow control: move one step
    Nudge(NudgeDirection),
    /// Drag control: center the paddle on this y
    DragTo(f32),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub paddle: PaddleCommand,
    /// Demo mode - autopilot drives the player paddle
    pub idle_mode: bool,
}

/// Advance the match by one tick. Returns what happened.
pub fn step(state: &mut MatchState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if state.is_paused || state.game_over {
        return events;
    }

    state.time_ticks += 1;

    let command = if input.idle_mode {
        autopilot_command(state)
    } else {
        input.paddle
    };
    if apply_player_command(state, command) {
        try_player_serve(state, &mut events);
    }

    update_ball(state, &mut events);
    update_ai(state);

    events
}

/// Move the player paddle. Returns true if the player touched the controls.
fn apply_player_command(state: &mut MatchState, command: PaddleCommand) -> bool {
    let arena = state.arena;
    let paddle = &mut state.player_paddle;
    match command {
        PaddleCommand::None => return false,
        PaddleCommand::Nudge(NudgeDirection::Up) => {
            paddle.set_y_clamped(paddle.y - PLAYER_NUDGE, &arena);
        }
        PaddleCommand::Nudge(NudgeDirection::Down) => {
            paddle.set_y_clamped(paddle.y + PLAYER_NUDGE, &arena);
        }
        PaddleCommand::DragTo(touch_y) => {
            paddle.set_y_clamped(touch_y - PADDLE_HEIGHT / 2.0, &arena);
        }
    }
    true
}

/// Moving the paddle serves, once the grace period has passed
fn try_player_serve(state: &mut MatchState, events: &mut Vec<GameEvent>) {
    if !state.ball_active
        && state.serving == Side::Player
        && state.serve_timer >= PLAYER_SERVE_GRACE_TICKS
    {
        serve(state);
        events.push(GameEvent::Served { by: Side::Player });
    }
}

/// Launch the ball from the serving side toward the receiver at a random
/// angle within +/-15 degrees.
pub fn serve(state: &mut MatchState) {
    let direction = state.serving.attack_direction();
    let angle = state.rng.random_range(-SERVE_SPREAD..=SERVE_SPREAD);
    let speed = state.ball.speed;

    state.ball.velocity_x = direction * speed * angle.cos();
    state.ball.velocity_y = speed * angle.sin();
    state.ball_active = true;
    state.serve_timer = 0;
}

/// Pin the waiting ball beside the server's paddle
fn pin_ball_to_server(state: &mut MatchState) {
    let paddle = *state.paddle(state.serving);
    state.ball.x = match state.serving {
        Side::Player => paddle.x + PADDLE_WIDTH + SERVE_OFFSET,
        Side::Ai => paddle.x - BALL_SIZE - SERVE_OFFSET,
    };
    state.ball.y = paddle.center_y() - BALL_SIZE / 2.0;
}

fn update_ball(state: &mut MatchState, events: &mut Vec<GameEvent>) {
    if !state.ball_active {
        pin_ball_to_server(state);
        state.serve_timer += 1;

        let limit = match state.serving {
            Side::Player => PLAYER_AUTO_SERVE_TICKS,
            Side::Ai => AI_AUTO_SERVE_TICKS,
        };
        if state.serve_timer > limit {
            let by = state.serving;
            serve(state);
            events.push(GameEvent::Served { by });
        }
        return;
    }

    state.ball.x += state.ball.velocity_x;
    state.ball.y += state.ball.velocity_y;

    if reflect_off_walls(&mut state.ball, &state.arena) {
        events.push(GameEvent::WallBounce);
    }

    // Only the paddle the ball is travelling toward can be hit, so a ball
    // still overlapping a paddle after deflecting is never hit twice.
    let defender = if state.ball.velocity_x < 0.0 {
        Some(Side::Player)
    } else if state.ball.velocity_x > 0.0 {
        Some(Side::Ai)
    } else {
        None
    };
    if let Some(side) = defender {
        let paddle = *state.paddle(side);
        if ball_hits_paddle(&state.ball, &paddle) {
            deflect_off_paddle(&mut state.ball, &paddle);
            state.rally_count += 1;
            events.push(GameEvent::PaddleHit {
                side,
                rally: state.rally_count,
                speed: state.ball.speed,
            });
            award_rally_bonus(state, events);
        }
    }

    if state.ball.x < 0.0 {
        score_point(state, Side::Ai, events);
    } else if state.ball.x > state.arena.width {
        score_point(state, Side::Player, events);
    }
}

/// Pay the rally bonus once per multiple of the threshold
fn award_rally_bonus(state: &mut MatchState, events: &mut Vec<GameEvent>) {
    let rally = state.rally_count;
    if rally > 0 && rally % RALLY_COIN_THRESHOLD == 0 && rally > state.last_bonus_rally {
        state.last_bonus_rally = rally;
        state.total_coins += RALLY_COIN_REWARD;
        events.push(GameEvent::RallyBonus {
            rally,
            coins: RALLY_COIN_REWARD,
        });
    }
}

/// `scorer` wins the point; the side that conceded serves next
fn score_point(state: &mut MatchState, scorer: Side, events: &mut Vec<GameEvent>) {
    match scorer {
        Side::Player => state.score.player += 1,
        Side::Ai => state.score.ai += 1,
    }
    state.reset_ball(scorer.opponent());
    log::debug!(
        "{:?} scored ({}-{})",
        scorer,
        state.score.player,
        state.score.ai
    );
    events.push(GameEvent::Scored {
        by: scorer,
        score: state.score,
    });

    if state.score.of(scorer) >= WIN_SCORE {
        state.game_over = true;
        // Win bonus only for the player; losing earns nothing extra
        if scorer == Side::Player {
            state.total_coins += state.profile.coin_reward;
        }
        log::info!(
            "Match over: {:?} wins {}-{}, {} coins earned",
            scorer,
            state.score.player,
            state.score.ai,
            state.total_coins
        );
        events.push(GameEvent::GameOver {
            winner: scorer,
            coins: state.total_coins,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Difficulty, GamePhase};
    use proptest::prelude::*;

    /// Put the ball in flight just past `side`'s goal line so the next tick scores
    fn force_point(state: &mut MatchState, scorer: Side) -> Vec<GameEvent> {
        state.ball_active = true;
        state.ball.y = 10.0;
        state.ball.velocity_y = 0.0;
        match scorer {
            Side::Player => {
                state.ball.x = state.arena.width - 1.0;
                state.ball.velocity_x = INITIAL_BALL_SPEED;
                state.ai_paddle.y = state.arena.height - PADDLE_HEIGHT;
            }
            Side::Ai => {
                state.ball.x = 1.0;
                state.ball.velocity_x = -INITIAL_BALL_SPEED;
                state.player_paddle.y = state.arena.height - PADDLE_HEIGHT;
            }
        }
        step(state, &TickInput::default())
    }

    #[test]
    fn test_ball_pinned_while_serving() {
        let mut state = MatchState::new(Difficulty::Easy, 12345);
        step(&mut state, &TickInput::default());
        assert_eq!(state.phase(), GamePhase::Serve);
        assert_eq!(state.ball.x, PADDLE_MARGIN + PADDLE_WIDTH + SERVE_OFFSET);
        assert_eq!(state.serve_timer, 1);
    }

    #[test]
    fn test_player_auto_serves_after_ten_seconds() {
        let mut state = MatchState::new(Difficulty::Easy, 12345);
        for _ in 0..PLAYER_AUTO_SERVE_TICKS {
            step(&mut state, &TickInput::default());
        }
        assert!(!state.ball_active);

        let events = step(&mut state, &TickInput::default());
        assert!(state.ball_active);
        assert!(events.contains(&GameEvent::Served { by: Side::Player }));
        assert!(state.ball.velocity_x > 0.0);
        assert_eq!(state.serve_timer, 0);
    }

    #[test]
    fn test_move_before_grace_does_not_serve() {
        let mut state = MatchState::new(Difficulty::Easy, 7);
        let nudge = TickInput {
            paddle: PaddleCommand::Nudge(NudgeDirection::Up),
            ..Default::default()
        };
        step(&mut state, &nudge);
        assert!(!state.ball_active);

        for _ in 0..PLAYER_SERVE_GRACE_TICKS {
            step(&mut state, &TickInput::default());
        }
        step(&mut state, &nudge);
        assert!(state.ball_active);
    }

    #[test]
    fn test_ai_serves_after_three_seconds_toward_player() {
        let mut state = MatchState::new(Difficulty::Hard, 99);
        state.serving = Side::Ai;
        for _ in 0..AI_AUTO_SERVE_TICKS {
            step(&mut state, &TickInput::default());
        }
        assert!(!state.ball_active);
        step(&mut state, &TickInput::default());
        assert!(state.ball_active);
        assert!(state.ball.velocity_x < 0.0);
    }

    #[test]
    fn test_serve_angle_within_spread() {
        for seed in 0..200 {
            let mut state = MatchState::new(Difficulty::Easy, seed);
            serve(&mut state);
            let angle = (state.ball.velocity_y / state.ball.velocity_x.abs()).atan();
            assert!(angle.abs() <= SERVE_SPREAD + 1e-5);
            let speed = state.ball.velocity_x.hypot(state.ball.velocity_y);
            assert!((speed - INITIAL_BALL_SPEED).abs() < 1e-4);
        }
    }

    #[test]
    fn test_drag_centers_paddle_on_touch() {
        let mut state = MatchState::new(Difficulty::Easy, 1);
        let input = TickInput {
            paddle: PaddleCommand::DragTo(100.0),
            ..Default::default()
        };
        step(&mut state, &input);
        assert_eq!(state.player_paddle.center_y(), 100.0);
    }

    #[test]
    fn test_ai_scores_and_player_serves() {
        let mut state = MatchState::new(Difficulty::Easy, 5);
        state.rally_count = 3;
        state.ball.speed = 9.0;
        let events = force_point(&mut state, Side::Ai);
        assert_eq!(state.score.ai, 1);
        assert_eq!(state.serving, Side::Player);
        assert_eq!(state.rally_count, 0);
        assert_eq!(state.ball.speed, INITIAL_BALL_SPEED);
        assert!(!state.ball_active);
        assert!(matches!(events.last(), Some(GameEvent::Scored { by: Side::Ai, .. })));
    }

    #[test]
    fn test_easy_shutout_pays_exactly_ten() {
        let mut state = MatchState::new(Difficulty::Easy, 42);
        for _ in 0..WIN_SCORE {
            force_point(&mut state, Side::Player);
        }
        assert!(state.game_over);
        assert_eq!(state.score.player, 5);
        assert_eq!(state.score.ai, 0);
        assert_eq!(state.total_coins, 10);
        let outcome = state.outcome().unwrap();
        assert_eq!(outcome.winner, Side::Player);
        assert_eq!(outcome.coins, 10);
    }

    #[test]
    fn test_loss_pays_nothing() {
        let mut state = MatchState::new(Difficulty::Hard, 42);
        for _ in 0..WIN_SCORE {
            force_point(&mut state, Side::Ai);
        }
        assert!(state.game_over);
        assert_eq!(state.total_coins, 0);
        assert_eq!(state.outcome().unwrap().winner, Side::Ai);
    }

    #[test]
    fn test_game_over_freezes_state() {
        let mut state = MatchState::new(Difficulty::Easy, 42);
        for _ in 0..WIN_SCORE {
            force_point(&mut state, Side::Player);
        }
        let ticks = state.time_ticks;
        assert!(step(&mut state, &TickInput::default()).is_empty());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_paused_state_does_not_advance() {
        let mut state = MatchState::new(Difficulty::Easy, 42);
        state.is_paused = true;
        step(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.serve_timer, 0);
    }

    #[test]
    fn test_paddle_hit_counts_rally() {
        let mut state = MatchState::new(Difficulty::Easy, 42);
        state.ball_active = true;
        state.ball.x = state.player_paddle.x + PADDLE_WIDTH + 2.0;
        state.ball.y = state.player_paddle.center_y() - BALL_SIZE / 2.0;
        state.ball.velocity_x = -INITIAL_BALL_SPEED;
        state.ball.velocity_y = 0.0;

        let events = step(&mut state, &TickInput::default());
        assert_eq!(state.rally_count, 1);
        assert!(state.ball.velocity_x > 0.0);
        assert!(events.iter().any(|e| matches!(e, GameEvent::PaddleHit { side: Side::Player, .. })));
    }

    #[test]
    fn test_rally_bonus_once_per_threshold() {
        let mut state = MatchState::new(Difficulty::Easy, 42);
        let mut events = Vec::new();
        state.rally_count = 5;
        award_rally_bonus(&mut state, &mut events);
        award_rally_bonus(&mut state, &mut events);
        assert_eq!(state.total_coins, RALLY_COIN_REWARD);
        assert_eq!(events.len(), 1);

        state.rally_count = 7;
        award_rally_bonus(&mut state, &mut events);
        assert_eq!(state.total_coins, RALLY_COIN_REWARD);

        state.rally_count = 10;
        award_rally_bonus(&mut state, &mut events);
        assert_eq!(state.total_coins, 2 * RALLY_COIN_REWARD);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = MatchState::new(Difficulty::Medium, 99999);
        let mut state2 = MatchState::new(Difficulty::Medium, 99999);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };

        for _ in 0..3000 {
            step(&mut state1, &input);
            step(&mut state2, &input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.ball, state2.ball);
        assert_eq!(state1.ai_paddle, state2.ai_paddle);
    }

    proptest! {
        #[test]
        fn prop_speed_bounded_and_monotonic_within_rally(seed in any::<u64>(), ticks in 100usize..4000) {
            let mut state = MatchState::new(Difficulty::Hard, seed);
            let input = TickInput { idle_mode: true, ..Default::default() };
            let mut last_speed = state.ball.speed;
            for _ in 0..ticks {
                let events = step(&mut state, &input);
                let scored = events.iter().any(|e| matches!(e, GameEvent::Scored { .. }));
                prop_assert!(state.ball.speed <= MAX_BALL_SPEED);
                prop_assert!(state.ball.speed >= INITIAL_BALL_SPEED);
                if !scored {
                    prop_assert!(state.ball.speed >= last_speed);
                }
                last_speed = state.ball.speed;
            }
        }

        #[test]
        fn prop_score_event_resets_rally(seed in any::<u64>()) {
            let mut state = MatchState::new(Difficulty::Medium, seed);
            let input = TickInput { idle_mode: true, ..Default::default() };
            for _ in 0..6000 {
                let events = step(&mut state, &input);
                for event in &events {
                    if let GameEvent::Scored { by, .. } = event {
                        prop_assert_eq!(state.rally_count, 0);
                        prop_assert_eq!(state.ball.speed, INITIAL_BALL_SPEED);
                        prop_assert!(!state.ball_active);
                        prop_assert_eq!(state.serving, by.opponent());
                    }
                }
                if state.game_over {
                    break;
                }
            }
        }
    }
}
