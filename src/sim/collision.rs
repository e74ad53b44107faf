//! Collision detection and response for the rectangular table
//!
//! Ball and paddles are axis-aligned boxes. Walls reflect by forcing the sign
//! of the vertical velocity; paddles redirect the ball by where it struck.

use super::state::{Arena, Ball, Paddle};
use crate::consts::*;

/// Axis-aligned overlap between the ball square and a paddle rectangle
pub fn ball_hits_paddle(ball: &Ball, paddle: &Paddle) -> bool {
    ball.x <= paddle.x + PADDLE_WIDTH
        && ball.x + BALL_SIZE >= paddle.x
        && ball.y + BALL_SIZE >= paddle.y
        && ball.y <= paddle.y + PADDLE_HEIGHT
}

/// Reflect off the top/bottom walls.
///
/// The velocity sign is forced (not negated) and the ball is parked 1px inside
/// the wall, so a ball that overshoots cannot get stuck flipping every tick.
/// Returns true if a wall was hit.
pub fn reflect_off_walls(ball: &mut Ball, arena: &Arena) -> bool {
    if ball.y <= 0.0 {
        ball.velocity_y = ball.velocity_y.abs();
        ball.y = 1.0;
        return true;
    }
    let floor = arena.height - BALL_SIZE;
    if ball.y >= floor {
        ball.velocity_y = -ball.velocity_y.abs();
        ball.y = floor - 1.0;
        return true;
    }
    false
}

/// Where on the paddle the ball struck: -1 at the top tip, +1 at the bottom
pub fn hit_offset(ball: &Ball, paddle: &Paddle) -> f32 {
    let offset = (ball.center_y() - paddle.center_y()) / (PADDLE_HEIGHT / 2.0);
    offset.clamp(-1.0, 1.0)
}

/// Send the ball back off a paddle.
///
/// Horizontal direction flips, speed steps up (capped), and the outgoing angle
/// maps the hit offset linearly onto +/-45 degrees.
pub fn deflect_off_paddle(ball: &mut Ball, paddle: &Paddle) {
    ball.velocity_x = -ball.velocity_x;
    let direction = if ball.velocity_x > 0.0 { 1.0 } else { -1.0 };

    let angle = hit_offset(ball, paddle) * MAX_BOUNCE_ANGLE;
    ball.speed = (ball.speed + BALL_SPEED_INCREMENT).clamp(INITIAL_BALL_SPEED, MAX_BALL_SPEED);

    ball.velocity_x = direction * ball.speed * angle.cos();
    ball.velocity_y = ball.speed * angle.sin();
}
