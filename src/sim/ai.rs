//! Paddle controllers: the AI opponent and the demo-mode autopilot

use rand::Rng;

use super::state::{MatchState, NudgeDirection, Side};
use super::tick::PaddleCommand;
use crate::consts::*;

/// Move the AI paddle for one tick.
///
/// The aim point is sticky: it is only recomputed while the ball is heading
/// toward the AI, or when the paddle has drifted more than 50px from it. Each
/// recomputation adds uniform noise of width `ai_error_margin`, which is the
/// only difficulty-dependent imprecision.
pub fn update_ai(state: &mut MatchState) {
    if state.is_paused || state.game_over {
        return;
    }

    let paddle_center = state.ai_paddle.center_y();
    if state.ball.velocity_x > 0.0
        || (paddle_center - state.ai_target_y).abs() > AI_RETARGET_DISTANCE
    {
        let noise = state.rng.random::<f32>() - 0.5;
        state.ai_target_y = state.ball.center_y() + noise * state.profile.ai_error_margin;
    }

    let speed = state.profile.ai_speed;
    let target = state.ai_target_y;
    let arena = state.arena;
    let paddle = &mut state.ai_paddle;
    if paddle_center < target - AI_DEAD_ZONE {
        paddle.set_y_clamped(paddle.y + speed, &arena);
    } else if paddle_center > target + AI_DEAD_ZONE {
        paddle.set_y_clamped(paddle.y - speed, &arena);
    }
}

/// Demo mode: nudge the player paddle toward the ball.
///
/// Also serves as soon as the grace period allows, by wiggling the paddle.
pub fn autopilot_command(state: &MatchState) -> PaddleCommand {
    let paddle_center = state.player_paddle.center_y();

    if !state.ball_active {
        if state.serving == Side::Player && state.serve_timer >= PLAYER_SERVE_GRACE_TICKS {
            let dir = if paddle_center > state.arena.height / 2.0 {
                NudgeDirection::Up
            } else {
                NudgeDirection::Down
            };
            return PaddleCommand::Nudge(dir);
        }
        return PaddleCommand::None;
    }

    // Lead the ball slightly when it is incoming
    let lead = if state.ball.velocity_x < 0.0 {
        state.ball.velocity_y * 4.0
    } else {
        0.0
    };
    let target = state.ball.center_y() + lead;

    if paddle_center < target - AI_DEAD_ZONE {
        PaddleCommand::Nudge(NudgeDirection::Down)
    } else if paddle_center > target + AI_DEAD_ZONE {
        PaddleCommand::Nudge(NudgeDirection::Up)
    } else {
        PaddleCommand::None
    }
}
