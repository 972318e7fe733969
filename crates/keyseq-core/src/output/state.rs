// Keyseq Pressed Key State
// Small ordered set of keys currently held down

use smallvec::SmallVec;

use crate::KeyCode;

/// Keys currently held, in press order.
///
/// Only a handful of keys are ever held at once, so a linear scan over
/// inline storage beats hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeyState {
    pressed: SmallVec<[KeyCode; 8]>,
}

impl PressedKeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as held. Pressing an already-held key is a no-op.
    pub fn add(&mut self, key: KeyCode) {
        if !self.is_pressed(key) {
            self.pressed.push(key);
        }
    }

    /// Mark a key as released. Returns true if it was held.
    pub fn remove(&mut self, key: KeyCode) -> bool {
        match self.pressed.iter().position(|k| *k == key) {
            Some(idx) => {
                self.pressed.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Held keys, oldest press first
    pub fn get_all(&self) -> SmallVec<[KeyCode; 8]> {
        self.pressed.clone()
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}
