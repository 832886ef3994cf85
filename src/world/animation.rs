//! Coarse motion state for the skeletal pose animator.
//!
//! Pure classification, no transition table or hysteresis: the state is
//! recomputed from scratch every frame and can flip at exact threshold
//! speeds.

use super::constants::animation as anim_consts;

/// Discrete animation states consumed by the pose code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Walk,
    Run,
    Jump,
    Fly,
}

/// Classifier output: the state plus a 0-1 limb-swing amplitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub state: MotionState,
    pub intensity: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            state: MotionState::Idle,
            intensity: 0.0,
        }
    }
}

/// Derives the animation state from the corrected frame state.
///
/// Flight wins over everything, airborne over ground states. On the
/// ground the split is idle / walk / run, with run requiring sprint.
pub fn classify(grounded: bool, flying: bool, horizontal_speed: f32, sprint: bool) -> Pose {
    let intensity = intensity_for_speed(horizontal_speed);
    let state = if flying {
        MotionState::Fly
    } else if !grounded {
        MotionState::Jump
    } else if horizontal_speed < anim_consts::IDLE_SPEED {
        MotionState::Idle
    } else if sprint {
        MotionState::Run
    } else {
        MotionState::Walk
    };
    Pose { state, intensity }
}

/// Linear-then-clamp mapping from horizontal speed to limb-swing
/// amplitude.
fn intensity_for_speed(horizontal_speed: f32) -> f32 {
    (horizontal_speed / anim_consts::FULL_INTENSITY_SPEED).clamp(0.0, 1.0)
}
