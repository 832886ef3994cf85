//! Input sampling: DOM-style key codes in, a per-frame input record out.
//!
//! Event handlers write into the sampler as events arrive; the frame loop
//! reads one [`FrameInput`] per tick. Last state wins, nothing is
//! buffered beyond the one-shot jump/flight latches.

use std::collections::HashMap;

use super::constants::avatar as avatar_consts;

/// Logical movement actions a key can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    /// Jump on the ground, ascend in flight. Double-tap toggles flight.
    Up,
    Down,
    Sprint,
}

/// Key code to action bindings.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<String, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut map = HashMap::new();
        for (code, action) in [
            ("KeyW", Action::Forward),
            ("ArrowUp", Action::Forward),
            ("KeyS", Action::Backward),
            ("ArrowDown", Action::Backward),
            ("KeyA", Action::Left),
            ("ArrowLeft", Action::Left),
            ("KeyD", Action::Right),
            ("ArrowRight", Action::Right),
            ("Space", Action::Up),
            ("KeyC", Action::Down),
            ("ShiftLeft", Action::Sprint),
            ("ShiftRight", Action::Sprint),
        ] {
            map.insert(code.to_string(), action);
        }
        Self { map }
    }
}

impl KeyBindings {
    pub fn resolve(&self, code: &str) -> Option<Action> {
        self.map.get(code).copied()
    }

    pub fn bind(&mut self, code: impl Into<String>, action: Action) {
        self.map.insert(code.into(), action);
    }
}

/// Held state per action. Plain booleans, reset on suspend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub sprint: bool,
}

impl KeyState {
    fn set(&mut self, action: Action, held: bool) {
        match action {
            Action::Forward => self.forward = held,
            Action::Backward => self.backward = held,
            Action::Left => self.left = held,
            Action::Right => self.right = held,
            Action::Up => self.up = held,
            Action::Down => self.down = held,
            Action::Sprint => self.sprint = held,
        }
    }

    fn held(&self, action: Action) -> bool {
        match action {
            Action::Forward => self.forward,
            Action::Backward => self.backward,
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Up => self.up,
            Action::Down => self.down,
            Action::Sprint => self.sprint,
        }
    }

    pub fn any_movement(&self) -> bool {
        self.forward || self.backward || self.left || self.right || self.up || self.down
    }
}

/// One frame's worth of sampled input.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub keys: KeyState,
    /// Rising edge of the jump key since the previous sample
    pub jump: bool,
    /// A jump double-tap landed since the previous sample
    pub toggle_flight: bool,
    /// The sampler is suspended (modal open); integration short-circuits
    pub suspended: bool,
}

/// Collects keyboard events between frames.
pub struct InputSampler {
    bindings: KeyBindings,
    keys: KeyState,
    jump_queued: bool,
    flight_toggle_queued: bool,
    /// Sim-time of the most recent jump key-down, for double-tap detection
    last_jump_press: Option<f32>,
    suspended: bool,
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

impl InputSampler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            keys: KeyState::default(),
            jump_queued: false,
            flight_toggle_queued: false,
            last_jump_press: None,
            suspended: false,
        }
    }

    /// Handles a key-down event. `now` is sim time in seconds; it drives
    /// the double-tap window. Auto-repeat events (key already held) are
    /// ignored for edge detection.
    pub fn key_down(&mut self, code: &str, now: f32) {
        if self.suspended {
            return;
        }
        let Some(action) = self.bindings.resolve(code) else {
            return;
        };
        let repeat = self.keys.held(action);
        self.keys.set(action, true);
        if action == Action::Up && !repeat {
            self.jump_queued = true;
            if let Some(last) = self.last_jump_press {
                if now - last <= avatar_consts::DOUBLE_TAP_WINDOW {
                    self.flight_toggle_queued = true;
                }
            }
            self.last_jump_press = Some(now);
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if self.suspended {
            return;
        }
        if let Some(action) = self.bindings.resolve(code) {
            self.keys.set(action, false);
        }
    }

    /// Suspends input (e.g. a modal dialog opened). Held keys reset to
    /// all-false so nothing drifts while the dialog is up.
    pub fn suspend(&mut self) {
        self.suspended = true;
        self.keys = KeyState::default();
        self.jump_queued = false;
        self.flight_toggle_queued = false;
        self.last_jump_press = None;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn keys(&self) -> KeyState {
        self.keys
    }

    /// Reads the frame input and consumes the one-shot latches.
    pub fn sample(&mut self) -> FrameInput {
        let frame = FrameInput {
            keys: self.keys,
            jump: self.jump_queued,
            toggle_flight: self.flight_toggle_queued,
            suspended: self.suspended,
        };
        self.jump_queued = false;
        self.flight_toggle_queued = false;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_tap_within_window_toggles_flight() {
        let mut sampler = InputSampler::default();
        sampler.key_down("Space", 1.0);
        sampler.key_up("Space");
        sampler.key_down("Space", 1.3);
        let frame = sampler.sample();
        assert!(frame.toggle_flight);
    }

    #[test]
    fn slow_taps_do_not_toggle_flight() {
        let mut sampler = InputSampler::default();
        sampler.key_down("Space", 1.0);
        sampler.key_up("Space");
        sampler.key_down("Space", 1.5);
        let frame = sampler.sample();
        assert!(!frame.toggle_flight);
        assert!(frame.jump);
    }

    #[test]
    fn single_press_never_toggles() {
        let mut sampler = InputSampler::default();
        sampler.key_down("Space", 1.0);
        assert!(!sampler.sample().toggle_flight);
    }

    #[test]
    fn auto_repeat_does_not_count_as_tap() {
        let mut sampler = InputSampler::default();
        sampler.key_down("Space", 1.0);
        // Held key repeats from the host: no key_up in between.
        sampler.key_down("Space", 1.1);
        sampler.key_down("Space", 1.2);
        let frame = sampler.sample();
        assert!(!frame.toggle_flight);
    }

    #[test]
    fn latches_are_consumed_by_sample() {
        let mut sampler = InputSampler::default();
        sampler.key_down("Space", 0.0);
        assert!(sampler.sample().jump);
        assert!(!sampler.sample().jump);
    }

    #[test]
    fn suspend_resets_held_keys() {
        let mut sampler = InputSampler::default();
        sampler.key_down("KeyW", 0.0);
        sampler.key_down("ShiftLeft", 0.0);
        assert!(sampler.keys().forward);
        sampler.suspend();
        let frame = sampler.sample();
        assert_eq!(frame.keys, KeyState::default());
        assert!(frame.suspended);
        // Events while suspended are dropped.
        sampler.key_down("KeyW", 0.1);
        assert!(!sampler.keys().forward);
        sampler.resume();
        sampler.key_down("KeyW", 0.2);
        assert!(sampler.keys().forward);
    }

    #[test]
    fn unbound_codes_are_ignored() {
        let mut sampler = InputSampler::default();
        sampler.key_down("KeyZ", 0.0);
        assert_eq!(sampler.keys(), KeyState::default());
    }

    #[test]
    fn custom_binding() {
        let mut bindings = KeyBindings::default();
        bindings.bind("KeyF", Action::Sprint);
        let mut sampler = InputSampler::new(bindings);
        sampler.key_down("KeyF", 0.0);
        assert!(sampler.keys().sprint);
    }
}
