//! Keyboard state and the per-entity action mapping.
//!
//! The window adapter feeds raw key events into the [`Input`] resource. Each
//! tick a [`Gamepad`] component snapshots that state through its bindings, so
//! systems ask "is `Fire` held?" rather than "is Z held?".

use std::collections::HashSet;
use std::hash::Hash;

pub use winit::keyboard::KeyCode;

/// Tracks the state of a set of inputs (keys).
///
/// - `pressed`: currently held down
/// - `just_pressed`: pressed this frame (not held last frame)
/// - `just_released`: released this frame
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    /// Record a key-down. Repeats of an already held key are not new presses.
    pub fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    pub fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    /// Forget this frame's edges. Called once at the end of every tick.
    pub fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Logical actions a controlled entity understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Fire,
}

/// Component: maps keys to [`Action`]s and holds the snapshot taken by
/// [`update`](Gamepad::update).
#[derive(Debug, Clone)]
pub struct Gamepad {
    bindings: Vec<(KeyCode, Action)>,
    down: HashSet<Action>,
    pressed: HashSet<Action>,
}

impl Gamepad {
    pub fn new(bindings: impl IntoIterator<Item = (KeyCode, Action)>) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
            down: HashSet::new(),
            pressed: HashSet::new(),
        }
    }

    /// Add another key for an action. Several keys may map to one action.
    pub fn with_binding(mut self, key: KeyCode, action: Action) -> Self {
        self.bindings.push((key, action));
        self
    }

    /// Snapshot the keyboard through this gamepad's bindings.
    pub fn update(&mut self, input: &Input<KeyCode>) {
        self.down.clear();
        self.pressed.clear();
        for &(key, action) in &self.bindings {
            if input.pressed(key) {
                self.down.insert(action);
            }
            if input.just_pressed(key) {
                self.pressed.insert(action);
            }
        }
    }

    /// Level: any key bound to `action` is held.
    pub fn down(&self, action: Action) -> bool {
        self.down.contains(&action)
    }

    /// Edge: any key bound to `action` went down this tick.
    pub fn pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }
}

impl Default for Gamepad {
    /// Arrow keys move, Z fires.
    fn default() -> Self {
        Self::new([
            (KeyCode::ArrowLeft, Action::MoveLeft),
            (KeyCode::ArrowRight, Action::MoveRight),
            (KeyCode::ArrowUp, Action::MoveUp),
            (KeyCode::ArrowDown, Action::MoveDown),
            (KeyCode::KeyZ, Action::Fire),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_release_edges() {
        let mut input = Input::new();
        input.press(KeyCode::KeyZ);
        assert!(input.pressed(KeyCode::KeyZ));
        assert!(input.just_pressed(KeyCode::KeyZ));

        input.clear_just();
        input.press(KeyCode::KeyZ);
        assert!(input.pressed(KeyCode::KeyZ));
        assert!(!input.just_pressed(KeyCode::KeyZ));

        input.release(KeyCode::KeyZ);
        assert!(!input.pressed(KeyCode::KeyZ));
        assert!(input.just_released(KeyCode::KeyZ));
    }

    #[test]
    fn gamepad_maps_held_keys_to_actions() {
        let mut input = Input::new();
        input.press(KeyCode::ArrowLeft);
        let mut pad = Gamepad::default();
        pad.update(&input);

        assert!(pad.down(Action::MoveLeft));
        assert!(pad.pressed(Action::MoveLeft));
        assert!(!pad.down(Action::MoveRight));
        assert!(!pad.down(Action::Fire));
    }

    #[test]
    fn gamepad_edge_only_on_first_tick() {
        let mut input = Input::new();
        let mut pad = Gamepad::default();
        input.press(KeyCode::KeyZ);
        pad.update(&input);
        assert!(pad.pressed(Action::Fire));

        input.clear_just();
        pad.update(&input);
        assert!(pad.down(Action::Fire));
        assert!(!pad.pressed(Action::Fire));
    }

    #[test]
    fn extra_binding_shares_action() {
        let mut input = Input::new();
        input.press(KeyCode::Space);
        let mut pad = Gamepad::default().with_binding(KeyCode::Space, Action::Fire);
        pad.update(&input);
        assert!(pad.down(Action::Fire));
    }

    #[test]
    fn release_clears_level() {
        let mut input = Input::new();
        let mut pad = Gamepad::default();
        input.press(KeyCode::ArrowUp);
        pad.update(&input);
        input.release(KeyCode::ArrowUp);
        pad.update(&input);
        assert!(!pad.down(Action::MoveUp));
    }
}
