//! Kinematic integration: held keys + camera yaw in, proposed position out.
//!
//! The integrator is a pure function of the avatar state and the sampled
//! frame input. Collision resolution happens afterwards on the proposed
//! position (see `collision`).

use super::constants::{avatar as avatar_consts, physics as physics_consts};
use super::input::FrameInput;
use super::Vec3;

/// Avatar tuning parameters, usually loaded from `world.toml`.
#[derive(Debug, Clone, Copy)]
pub struct AvatarTuning {
    pub walk_speed: f32,
    pub sprint_multiplier: f32,
    pub flight_multiplier: f32,
    pub acceleration: f32,
    pub friction: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub can_fly: bool,
}

impl Default for AvatarTuning {
    fn default() -> Self {
        Self {
            walk_speed: avatar_consts::WALK_SPEED,
            sprint_multiplier: avatar_consts::SPRINT_MULTIPLIER,
            flight_multiplier: avatar_consts::FLIGHT_MULTIPLIER,
            acceleration: avatar_consts::ACCELERATION,
            friction: avatar_consts::FRICTION,
            gravity: physics_consts::GRAVITY,
            jump_speed: avatar_consts::JUMP_SPEED,
            can_fly: true,
        }
    }
}

impl AvatarTuning {
    /// Horizontal speed cap for the current movement mode.
    pub fn speed_cap(&self, sprint: bool, flying: bool) -> f32 {
        let mut cap = self.walk_speed;
        if sprint {
            cap *= self.sprint_multiplier;
        }
        if flying {
            cap *= self.flight_multiplier;
        }
        cap
    }
}

/// Per-frame motion plan: updated velocity plus the position the avatar
/// would reach if nothing blocked it.
#[derive(Debug, Clone, Copy)]
pub struct MotionPlan {
    pub velocity: Vec3,
    pub proposed: Vec3,
}

/// Clamps a frame delta so a stalled host loop cannot produce one giant
/// integration step.
pub fn clamp_frame_dt(dt: f32) -> f32 {
    dt.clamp(0.0, physics_consts::MAX_FRAME_DT)
}

/// Camera-relative horizontal basis. Forward is -Z at yaw 0, matching the
/// render convention.
pub fn camera_basis(yaw: f32) -> (Vec3, Vec3) {
    let (sin, cos) = yaw.sin_cos();
    let forward = Vec3::new(-sin, 0.0, -cos);
    let right = Vec3::new(cos, 0.0, -sin);
    (forward, right)
}

/// Integrates one frame of movement.
///
/// Order: input acceleration, gravity/jump, exponential friction, speed
/// cap, then position proposal. The caller clamps `dt` first.
pub fn plan_motion(
    position: Vec3,
    velocity: Vec3,
    grounded: bool,
    flying: bool,
    input: &FrameInput,
    camera_yaw: f32,
    tuning: &AvatarTuning,
    dt: f32,
) -> MotionPlan {
    let mut velocity = velocity;
    let keys = input.keys;

    // Horizontal acceleration along the camera basis.
    let (forward, right) = camera_basis(camera_yaw);
    let mut wish = Vec3::zeros();
    if keys.forward {
        wish += forward;
    }
    if keys.backward {
        wish -= forward;
    }
    if keys.right {
        wish += right;
    }
    if keys.left {
        wish -= right;
    }
    let wish_len = wish.norm();
    if wish_len > physics_consts::EPSILON {
        velocity += wish * (tuning.acceleration * dt / wish_len);
    }

    if flying {
        // Flight: direct vertical control, no gravity accumulation.
        if keys.up {
            velocity.y += avatar_consts::VERTICAL_ACCELERATION * dt;
        }
        if keys.down {
            velocity.y -= avatar_consts::VERTICAL_ACCELERATION * dt;
        }
        // Vertical friction only applies in flight; gravity handles the
        // rest elsewhere.
        velocity.y *= tuning.friction.powf(dt * 60.0);
    } else if input.jump && grounded {
        velocity.y = tuning.jump_speed;
    } else if !grounded {
        velocity.y -= tuning.gravity * dt;
    }

    // Exponential horizontal friction, decoupled from frame rate.
    let decay = tuning.friction.powf(dt * 60.0);
    velocity.x *= decay;
    velocity.z *= decay;

    // Cap horizontal speed by uniform scaling: preserves direction.
    let cap = tuning.speed_cap(keys.sprint, flying);
    let h_speed = (velocity.x * velocity.x + velocity.z * velocity.z).sqrt();
    if h_speed > cap {
        let scale = cap / h_speed;
        velocity.x *= scale;
        velocity.z *= scale;
    }

    MotionPlan {
        velocity,
        proposed: position + velocity * dt,
    }
}

/// Horizontal speed of a velocity vector.
pub fn horizontal_speed(velocity: Vec3) -> f32 {
    (velocity.x * velocity.x + velocity.z * velocity.z).sqrt()
}

/// Wraps an angle into (-PI, PI].
pub fn wrap_angle_signed_pi(angle: f32) -> f32 {
    ((angle + std::f32::consts::PI).rem_euclid(std::f32::consts::TAU)) - std::f32::consts::PI
}

/// Converts world-space horizontal velocity to avatar yaw so local
/// forward (-Z) aligns with the movement direction.
pub fn yaw_from_horizontal_velocity(velocity: Vec3) -> f32 {
    (-velocity.x).atan2(-velocity.z)
}
