//! The local avatar: one explicit state value stepped once per frame.
//!
//! `step` is the whole per-frame contract: sampled input and camera yaw
//! in, corrected kinematic state out. No framework callbacks, no hidden
//! cells; tests drive it directly.

use super::colliders::{BuildingCollider, SpatialQuery};
use super::collision;
use super::constants::avatar as avatar_consts;
use super::kinematics::{
    self, clamp_frame_dt, horizontal_speed, wrap_angle_signed_pi, yaw_from_horizontal_velocity,
    AvatarTuning,
};
use super::input::FrameInput;
use super::Vec3;

/// Kinematic state owned by one avatar instance.
#[derive(Debug, Clone, Copy)]
pub struct AvatarState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Facing angle around world Y, radians
    pub yaw: f32,
    pub grounded: bool,
    pub flying: bool,
}

impl AvatarState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            yaw: 0.0,
            grounded: false,
            flying: false,
        }
    }

    pub fn horizontal_speed(&self) -> f32 {
        horizontal_speed(self.velocity)
    }

    /// Advances the avatar by one frame.
    ///
    /// Phases, in order: suspend short-circuit, flight toggle, kinematic
    /// integration, collision resolution, facing auto-rotate.
    pub fn step(
        &mut self,
        input: &FrameInput,
        camera_yaw: f32,
        buildings: &[BuildingCollider],
        scene: &dyn SpatialQuery,
        tuning: &AvatarTuning,
        dt: f32,
    ) {
        let dt = clamp_frame_dt(dt);

        // Suspended (modal open): freeze in place, drop momentum so the
        // avatar does not drift when play resumes.
        if input.suspended {
            self.velocity = Vec3::zeros();
            return;
        }

        if input.toggle_flight && tuning.can_fly {
            self.flying = !self.flying;
            if self.flying {
                self.grounded = false;
            }
        }

        let plan = kinematics::plan_motion(
            self.position,
            self.velocity,
            self.grounded,
            self.flying,
            input,
            camera_yaw,
            tuning,
            dt,
        );

        let resolved = collision::resolve(
            self.position,
            plan.proposed,
            plan.velocity,
            self.flying,
            buildings,
            scene,
        );

        self.position = resolved.position;
        self.velocity = resolved.velocity;
        self.grounded = resolved.grounded;

        self.auto_rotate(dt);
    }

    /// Turns the facing angle toward the horizontal velocity at a capped
    /// rate. Skipped below a speed floor so a resting avatar holds its
    /// heading (and so a zero-length direction is never normalized).
    fn auto_rotate(&mut self, dt: f32) {
        if self.horizontal_speed() <= avatar_consts::MIN_TURN_SPEED {
            return;
        }
        let target_yaw = yaw_from_horizontal_velocity(self.velocity);
        let delta = wrap_angle_signed_pi(target_yaw - self.yaw);
        let max_step = avatar_consts::TURN_RATE * dt;
        self.yaw = wrap_angle_signed_pi(self.yaw + delta.clamp(-max_step, max_step));
    }

    /// Hard relocation (teleport/spawn): clears momentum and flight.
    pub fn teleport_to(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::zeros();
        self.flying = false;
        self.grounded = false;
    }
}
