//! Third-person orbit camera that chases the avatar.
//!
//! Mouse drags adjust the orbit angles, the wheel adjusts distance. The
//! camera position and look target chase their desired values with an
//! exponential lerp every frame; the only hard snap is on first update.

use super::constants::camera as camera_consts;
use super::Vec3;

#[derive(Debug, Clone)]
pub struct CameraFollower {
    orbit_yaw: f32,
    orbit_pitch: f32,
    distance: f32,
    pub position: Vec3,
    pub target: Vec3,
    initialized: bool,
}

impl Default for CameraFollower {
    fn default() -> Self {
        Self {
            orbit_yaw: 0.0,
            orbit_pitch: camera_consts::DEFAULT_PITCH,
            distance: camera_consts::DEFAULT_DISTANCE,
            position: Vec3::zeros(),
            target: Vec3::zeros(),
            initialized: false,
        }
    }
}

impl CameraFollower {
    /// Orbit yaw, also the movement basis yaw for the integrator.
    pub fn yaw(&self) -> f32 {
        self.orbit_yaw
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Applies a mouse-drag delta in pixels.
    pub fn apply_drag(&mut self, dx: f32, dy: f32) {
        self.orbit_yaw -= dx * camera_consts::DRAG_SENSITIVITY;
        self.orbit_pitch = (self.orbit_pitch + dy * camera_consts::DRAG_SENSITIVITY)
            .clamp(camera_consts::MIN_PITCH, camera_consts::MAX_PITCH);
    }

    /// Applies a wheel delta; positive zooms out.
    pub fn apply_scroll(&mut self, delta: f32) {
        self.distance = (self.distance + delta * camera_consts::SCROLL_SENSITIVITY)
            .clamp(camera_consts::MIN_DISTANCE, camera_consts::MAX_DISTANCE);
    }

    /// Desired camera position on the orbit sphere around the avatar.
    fn desired_position(&self, avatar_position: Vec3) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.orbit_yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.orbit_pitch.sin_cos();
        let offset = Vec3::new(
            sin_yaw * cos_pitch * self.distance,
            sin_pitch * self.distance + camera_consts::LOOK_HEIGHT,
            cos_yaw * cos_pitch * self.distance,
        );
        avatar_position + offset
    }

    fn desired_target(avatar_position: Vec3) -> Vec3 {
        avatar_position + Vec3::new(0.0, camera_consts::LOOK_HEIGHT, 0.0)
    }

    /// Chases the avatar for one frame. Snaps on the first call so a
    /// fresh camera does not sweep in from the origin.
    pub fn follow(&mut self, avatar_position: Vec3, dt: f32) {
        let desired_position = self.desired_position(avatar_position);
        let desired_target = Self::desired_target(avatar_position);

        if !self.initialized {
            self.position = desired_position;
            self.target = desired_target;
            self.initialized = true;
            return;
        }

        let position_alpha = exp_alpha(camera_consts::POSITION_RATE, dt);
        let target_alpha = exp_alpha(camera_consts::TARGET_RATE, dt);
        self.position = self.position.lerp(&desired_position, position_alpha);
        self.target = self.target.lerp(&desired_target, target_alpha);
    }
}

/// Frame-rate independent lerp factor for an exponential chase at `rate`
/// per second.
fn exp_alpha(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt.max(0.0)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_follow_snaps() {
        let mut camera = CameraFollower::default();
        let avatar = Vec3::new(10.0, 0.0, -4.0);
        camera.follow(avatar, 1.0 / 60.0);
        assert_eq!(camera.target, avatar + Vec3::new(0.0, 1.4, 0.0));
        assert!((camera.position - avatar).norm() > 1.0);
    }

    #[test]
    fn follow_converges_without_snapping() {
        let mut camera = CameraFollower::default();
        camera.follow(Vec3::zeros(), 1.0 / 60.0);
        let start = camera.position;

        let avatar = Vec3::new(20.0, 0.0, 0.0);
        camera.follow(avatar, 1.0 / 60.0);
        // One frame moves the camera, but nowhere near the full jump.
        let first_step = (camera.position - start).norm();
        assert!(first_step > 0.0);
        assert!(first_step < 20.0 * 0.5);

        for _ in 0..600 {
            camera.follow(avatar, 1.0 / 60.0);
        }
        let desired = camera.desired_position(avatar);
        assert!((camera.position - desired).norm() < 0.01);
    }

    #[test]
    fn scroll_and_pitch_are_clamped() {
        let mut camera = CameraFollower::default();
        camera.apply_scroll(1.0e6);
        assert_eq!(camera.distance(), camera_consts::MAX_DISTANCE);
        camera.apply_scroll(-1.0e6);
        assert_eq!(camera.distance(), camera_consts::MIN_DISTANCE);
        camera.apply_drag(0.0, 1.0e6);
        camera.apply_drag(0.0, 0.0);
        // Pitch stays inside its limits after a huge drag.
        let mut probe = camera.clone();
        probe.follow(Vec3::zeros(), 1.0 / 60.0);
        assert!(probe.position.y <= camera_consts::MAX_DISTANCE + camera_consts::LOOK_HEIGHT);
    }

    #[test]
    fn drag_rotates_the_orbit() {
        let mut camera = CameraFollower::default();
        let before = camera.yaw();
        camera.apply_drag(100.0, 0.0);
        assert!(camera.yaw() < before);
    }
}
