use std::collections::HashSet;

use super::types::{Key, KeyEvent, KeyState};

/// Keyboard state for a single window.
///
/// `pressed` reflects keys currently held. `just_pressed` and
/// `just_released` hold the transitions since the last [`clear_frame`].
///
/// [`clear_frame`]: KeyboardInput::clear_frame
#[derive(Debug, Default, Clone)]
pub struct KeyboardInput {
    down: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one key event. Repeats do not count as new presses.
    pub fn apply(&mut self, event: KeyEvent) {
        match event.state {
            KeyState::Pressed => self.press(event.key),
            KeyState::Released => self.release(event.key),
        }
    }

    pub fn press(&mut self, key: Key) {
        if self.down.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        if self.down.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Whether `key` is held.
    pub fn pressed(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    /// Whether `key` went down this frame.
    pub fn just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Whether `key` went up this frame.
    pub fn just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn any_pressed(&self, keys: impl IntoIterator<Item = Key>) -> bool {
        keys.into_iter().any(|k| self.pressed(k))
    }

    /// Forgets this frame's transitions. Held keys stay held.
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Releases every held key, e.g. on focus loss, so nothing sticks.
    pub fn release_all(&mut self) {
        let held: Vec<Key> = self.down.drain().collect();
        self.just_released.extend(held);
    }
}
