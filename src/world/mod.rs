//! The virtual office world: static geometry, the local avatar, remote
//! players, and the frame loop that ties them together.

pub mod animation;
pub mod avatar;
pub mod camera;
pub mod colliders;
pub mod collision;
pub mod constants;
pub mod input;
pub mod kinematics;
pub mod remote;
pub mod wander;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::config::WorldConfig;
use animation::Pose;
use avatar::AvatarState;
use camera::CameraFollower;
use colliders::{BuildingCollider, SpatialQuery, Terrain};
use input::InputSampler;
use kinematics::AvatarTuning;
use remote::{PositionBroadcaster, RemoteRoster};
use wander::Wanderer;

/// World-space vector type used throughout the crate.
pub type Vec3 = nalgebra::Vector3<f32>;

/// Handle shared between the frame loop and event/network feeders.
pub type WorldHandle = Arc<RwLock<World>>;

/// Default spawn for visitors without a spawn preference
const DEFAULT_SPAWN: [f32; 3] = [180.0, 1.0, 0.0];

/// Admins spawn on the command center balcony
const COMMAND_CENTER_SPAWN: [f32; 3] = [15.0, 81.0, 15.0];

pub struct World {
    pub name: String,
    pub tuning: AvatarTuning,
    pub buildings: Vec<BuildingCollider>,
    pub scene: Box<dyn SpatialQuery>,
    pub input: InputSampler,
    pub avatar: AvatarState,
    pub camera: CameraFollower,
    pub pose: Pose,
    pub roster: Option<RemoteRoster>,
    pub broadcaster: Option<PositionBroadcaster>,
    pub wanderers: Vec<Wanderer>,
    /// Sim time in seconds, drives the input double-tap window
    clock: f32,
}

impl World {
    pub fn new(config: &WorldConfig) -> Self {
        let buildings = config.building_colliders();
        let spawn = Vec3::from(DEFAULT_SPAWN);
        Self {
            name: config.name.clone(),
            tuning: config.avatar.tuning(),
            buildings,
            scene: Box::new(Terrain::flat(0.0)),
            input: InputSampler::default(),
            avatar: AvatarState::at(spawn),
            camera: CameraFollower::default(),
            pose: Pose::default(),
            roster: None,
            broadcaster: None,
            wanderers: Vec::new(),
            clock: 0.0,
        }
    }

    /// Replaces the built-in flat terrain with an external spatial system.
    pub fn with_scene(mut self, scene: Box<dyn SpatialQuery>) -> Self {
        self.scene = scene;
        self
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    /// Forwards a key-down event into the sampler, stamped with sim time.
    pub fn key_down(&mut self, code: &str) {
        let now = self.clock;
        self.input.key_down(code, now);
    }

    pub fn key_up(&mut self, code: &str) {
        self.input.key_up(code);
    }

    /// Suspends the avatar (modal dialog opened): keys reset, velocity
    /// drops on the next tick, integration short-circuits.
    pub fn suspend(&mut self) {
        self.input.suspend();
    }

    pub fn resume(&mut self) {
        self.input.resume();
    }

    /// Executes simulation phases for one frame.
    /// Ordered so everything downstream reads the corrected avatar state:
    /// presence intake -> input -> avatar -> camera -> pose -> remote -> NPCs -> broadcast.
    pub fn tick(&mut self, dt: f32) {
        let dt = kinematics::clamp_frame_dt(dt);
        self.clock += dt;

        // Apply pending join/update/leave events before anyone reads the
        // roster this frame.
        if let Some(roster) = &self.roster {
            roster.drain_events();
        }

        // Sample held keys and one-shot latches.
        let frame = self.input.sample();

        // Integrate and resolve the local avatar.
        let camera_yaw = self.camera.yaw();
        self.avatar.step(
            &frame,
            camera_yaw,
            &self.buildings,
            self.scene.as_ref(),
            &self.tuning,
            dt,
        );

        // Camera chases the corrected position.
        self.camera.follow(self.avatar.position, dt);

        // Classify the pose off the corrected velocity and flags.
        self.pose = animation::classify(
            self.avatar.grounded,
            self.avatar.flying,
            self.avatar.horizontal_speed(),
            frame.keys.sprint,
        );

        // Remote avatars chase their latest snapshots.
        if let Some(roster) = &self.roster {
            roster.interpolate_all(dt);
        }

        // NPC wanderers share the same colliders.
        for wanderer in &mut self.wanderers {
            wanderer.tick(&self.buildings, self.scene.as_ref(), dt);
        }

        // Broadcast the local position when it moved far enough.
        if let Some(broadcaster) = &mut self.broadcaster {
            let zone = zone_of(&self.buildings, self.avatar.position);
            broadcaster.maybe_broadcast(
                self.avatar.position,
                self.avatar.yaw,
                self.avatar.horizontal_speed(),
                zone,
                dt,
            );
        }
    }

    /// Zone the local avatar currently occupies, as reported in
    /// broadcasts.
    pub fn current_zone(&self) -> &str {
        zone_of(&self.buildings, self.avatar.position)
    }

    /// Spawn position for a destination: the command center, a building
    /// interior by slug, or the default ground spawn.
    pub fn spawn_position(&self, destination: &str) -> Vec3 {
        if destination == "command-center" {
            return Vec3::from(COMMAND_CENTER_SPAWN);
        }
        self.buildings
            .iter()
            .find(|b| b.slug == destination)
            .map(|b| b.interior_spawn())
            .unwrap_or_else(|| Vec3::from(DEFAULT_SPAWN))
    }

    /// Teleports the local avatar to a destination.
    pub fn teleport(&mut self, destination: &str) {
        let position = self.spawn_position(destination);
        tracing::info!(%destination, ?position, "teleporting avatar");
        self.avatar.teleport_to(position);
    }
}

fn zone_of<'a>(buildings: &'a [BuildingCollider], position: Vec3) -> &'a str {
    buildings
        .iter()
        .find(|b| b.contains(position))
        .map(|b| b.slug.as_str())
        .unwrap_or("ground")
}

/// Fixed-timestep runner that drives a world on its own cadence.
/// Sleeps off the remainder of each tick; logs when a tick overruns.
pub struct WorldRunner {
    handle: WorldHandle,
    tick_rate: u64,
}

impl WorldRunner {
    pub fn new(handle: WorldHandle, tick_rate: u64) -> Self {
        Self { handle, tick_rate }
    }

    /// Runs `ticks` frames at the configured rate.
    pub fn run(&self, ticks: u64) {
        let tick_duration = Duration::from_nanos(1_000_000_000 / self.tick_rate);
        let dt = 1.0 / self.tick_rate as f32;

        for _ in 0..ticks {
            let start = Instant::now();
            self.handle.write().tick(dt);

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                thread::sleep(tick_duration - elapsed);
            } else {
                tracing::debug!(?elapsed, "tick overran its budget");
            }
        }
    }
}
