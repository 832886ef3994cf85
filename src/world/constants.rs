//! World physics and avatar tuning constants.
//! Centralizing these prevents bugs from duplicated hardcoded values.

/// Physics constants
pub mod physics {
    /// Fixed timestep for the headless runner (60 Hz)
    pub const TIMESTEP: f32 = 1.0 / 60.0;

    /// Upper bound on a single frame delta. Protects integration from the
    /// huge dt produced when the host loop stalls (tab switch, debugger).
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Downward acceleration in m/s² while airborne
    pub const GRAVITY: f32 = 25.0;

    /// Absolute world floor height. Enforced even in flight mode.
    pub const WORLD_FLOOR: f32 = 0.0;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 1.0e-4;
}

/// Avatar locomotion defaults
pub mod avatar {
    /// Horizontal speed cap while walking, m/s
    pub const WALK_SPEED: f32 = 8.0;

    /// Speed cap multiplier while sprint is held
    pub const SPRINT_MULTIPLIER: f32 = 1.8;

    /// Speed cap multiplier while flying
    pub const FLIGHT_MULTIPLIER: f32 = 2.5;

    /// Horizontal acceleration from held movement keys, m/s²
    pub const ACCELERATION: f32 = 40.0;

    /// Vertical acceleration from up/down keys in flight mode, m/s²
    pub const VERTICAL_ACCELERATION: f32 = 30.0;

    /// Per-frame friction factor at 60 Hz. Applied as
    /// `velocity *= FRICTION.powf(dt * 60.0)` so damping is independent
    /// of the actual frame rate.
    pub const FRICTION: f32 = 0.9;

    /// Upward launch speed when jumping from the ground
    pub const JUMP_SPEED: f32 = 9.0;

    /// Vertical tolerance for the grounded flag
    pub const GROUND_EPSILON: f32 = 0.05;

    /// Feet-to-head distance used by the ceiling clamp
    pub const HEAD_CLEARANCE: f32 = 1.7;

    /// Two jump presses within this window (seconds) toggle flight mode
    pub const DOUBLE_TAP_WINDOW: f32 = 0.4;

    /// Facing auto-rotate turn rate, rad/s
    pub const TURN_RATE: f32 = 10.0;

    /// Horizontal speed below which facing is left unchanged
    pub const MIN_TURN_SPEED: f32 = 0.05;

    /// Velocity damping applied when the scene query blocks a move but
    /// reports no surface normal
    pub const BLOCKED_DAMP: f32 = 0.5;
}

/// Building footprint defaults
pub mod building {
    /// Lateral half-width of the entrance door window, in the building's
    /// local frame. Proposed positions with |local x| below this pass
    /// through the footprint unblocked.
    pub const DOOR_HALF_WIDTH: f32 = 6.0;

    /// Default footprint half-width (local X)
    pub const DEFAULT_HALF_WIDTH: f32 = 25.0;

    /// Default footprint half-length (local Z, along the entrance axis)
    pub const DEFAULT_HALF_LENGTH: f32 = 50.0;

    /// Default wall height
    pub const DEFAULT_HEIGHT: f32 = 12.0;

    /// Interior spawn point relative to the building origin
    pub const INTERIOR_SPAWN: [f32; 3] = [0.0, 1.5, 10.0];
}

/// Third-person camera defaults
pub mod camera {
    /// Default orbit distance from the avatar
    pub const DEFAULT_DISTANCE: f32 = 8.0;

    /// Orbit distance limits (scroll zoom)
    pub const MIN_DISTANCE: f32 = 2.0;
    pub const MAX_DISTANCE: f32 = 30.0;

    /// Default orbit pitch, radians above the horizon
    pub const DEFAULT_PITCH: f32 = 0.45;

    /// Pitch limits to keep the camera off the poles
    pub const MIN_PITCH: f32 = -0.2;
    pub const MAX_PITCH: f32 = 1.4;

    /// Mouse-drag to orbit-angle sensitivity, rad per pixel
    pub const DRAG_SENSITIVITY: f32 = 0.005;

    /// Wheel delta to distance sensitivity
    pub const SCROLL_SENSITIVITY: f32 = 0.01;

    /// Exponential chase rate for the camera position, 1/s
    pub const POSITION_RATE: f32 = 8.0;

    /// Exponential chase rate for the look target, 1/s
    pub const TARGET_RATE: f32 = 12.0;

    /// Look target height above the avatar's feet
    pub const LOOK_HEIGHT: f32 = 1.4;
}

/// Remote avatar interpolation and broadcast throttling
pub mod remote {
    /// Exponential chase rate toward the latest snapshot position, 1/s
    pub const POSITION_RATE: f32 = 10.0;

    /// Exponential chase rate toward the latest snapshot yaw, 1/s
    pub const YAW_RATE: f32 = 10.0;

    /// Minimum distance the local avatar must move before a new position
    /// broadcast is emitted
    pub const BROADCAST_MIN_DISTANCE: f32 = 0.25;

    /// Minimum yaw change (radians) that also triggers a broadcast
    pub const BROADCAST_MIN_YAW: f32 = 0.1;

    /// Minimum interval between broadcasts, seconds (10 Hz cap)
    pub const BROADCAST_MIN_INTERVAL: f32 = 0.1;

    /// Horizontal speed above which a broadcast reports is_moving
    pub const MOVING_SPEED: f32 = 0.1;
}

/// Animation state classifier thresholds
pub mod animation {
    /// Horizontal speed below which the avatar is idle
    pub const IDLE_SPEED: f32 = 0.1;

    /// Horizontal speed at which limb-swing intensity saturates at 1.0
    pub const FULL_INTENSITY_SPEED: f32 = 8.0;
}

/// NPC wander behavior
pub mod wander {
    /// Walk speed for wandering NPC avatars, m/s
    pub const SPEED: f32 = 3.0;

    /// Distance at which a wander target counts as reached
    pub const REACHED_EPSILON: f32 = 0.5;

    /// Seconds before an unreached target is abandoned
    pub const TARGET_TIMEOUT: f32 = 20.0;

    /// Attempts to find a target outside building walls before giving up
    /// and keeping the last candidate
    pub const PICK_ATTEMPTS: u32 = 8;
}
