//! Wandering NPC avatars that amble around the grounds.
//!
//! A wanderer picks a random target inside its region, walks toward it
//! through the same collision resolver as the player, and re-picks on
//! arrival, on timeout, or when the remaining direction degenerates to
//! zero length.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::colliders::{BuildingCollider, SpatialQuery};
use super::collision;
use super::constants::{avatar as avatar_consts, physics as physics_consts, wander as wander_consts};
use super::kinematics::{wrap_angle_signed_pi, yaw_from_horizontal_velocity};
use super::Vec3;

/// Rectangular region a wanderer stays inside, in world XZ.
#[derive(Debug, Clone, Copy)]
pub struct WanderRegion {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

pub struct Wanderer {
    pub position: Vec3,
    pub yaw: f32,
    region: WanderRegion,
    target: Option<Vec3>,
    elapsed: f32,
    rng: StdRng,
}

impl Wanderer {
    pub fn new(position: Vec3, region: WanderRegion, seed: u64) -> Self {
        Self {
            position,
            yaw: 0.0,
            region,
            target: None,
            elapsed: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// Picks a fresh target, preferring points outside building walls so
    /// the wanderer does not march into a facade forever.
    fn pick_target(&mut self, buildings: &[BuildingCollider]) {
        let mut candidate = self.random_point();
        for _ in 0..wander_consts::PICK_ATTEMPTS {
            if !buildings.iter().any(|b| b.blocks(candidate)) {
                break;
            }
            candidate = self.random_point();
        }
        self.target = Some(candidate);
        self.elapsed = 0.0;
    }

    fn random_point(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(self.region.min_x..self.region.max_x),
            0.0,
            self.rng.gen_range(self.region.min_z..self.region.max_z),
        )
    }

    /// Advances the wanderer by one frame.
    pub fn tick(&mut self, buildings: &[BuildingCollider], scene: &dyn SpatialQuery, dt: f32) {
        self.elapsed += dt;

        let target = match self.target {
            Some(t) if self.elapsed < wander_consts::TARGET_TIMEOUT => t,
            _ => {
                self.pick_target(buildings);
                return;
            }
        };

        let mut to_target = target - self.position;
        to_target.y = 0.0;
        let distance = to_target.norm();
        if distance <= wander_consts::REACHED_EPSILON {
            self.pick_target(buildings);
            return;
        }
        // Degenerate direction: re-pick rather than normalize garbage.
        if distance < physics_consts::EPSILON {
            self.pick_target(buildings);
            return;
        }

        let step = (wander_consts::SPEED * dt).min(distance);
        let velocity = to_target * (wander_consts::SPEED / distance);
        let proposed = self.position + to_target * (step / distance);

        let resolved = collision::resolve(
            self.position,
            proposed,
            velocity,
            false,
            buildings,
            scene,
        );
        // A building revert leaves the wanderer in place; give up on the
        // target early instead of pushing at the wall until the timeout.
        if resolved.position.x == self.position.x
            && resolved.position.z == self.position.z
            && step > physics_consts::EPSILON
        {
            self.pick_target(buildings);
            return;
        }
        self.position = resolved.position;

        let target_yaw = yaw_from_horizontal_velocity(velocity);
        let delta = wrap_angle_signed_pi(target_yaw - self.yaw);
        let max_step = avatar_consts::TURN_RATE * dt;
        self.yaw = wrap_angle_signed_pi(self.yaw + delta.clamp(-max_step, max_step));
    }
}
