//! Keyboard actions for the player

use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Action names understood by the player
pub mod actions {
    pub const BEAT_FASTER: &str = "beat_faster";
    pub const BEAT_SLOWER: &str = "beat_slower";
    pub const QUIT: &str = "quit";
    pub const NEXT_SCENE: &str = "next_scene";
    pub const PREVIOUS_SCENE: &str = "previous_scene";
}

/// Fixed key bindings, one row per action
const BINDINGS: &[(&str, &[KeyCode])] = &[
    (actions::BEAT_FASTER, &[KeyCode::ArrowUp]),
    (actions::BEAT_SLOWER, &[KeyCode::ArrowDown]),
    (actions::QUIT, &[KeyCode::Escape]),
    (actions::NEXT_SCENE, &[KeyCode::Tab, KeyCode::ArrowRight]),
    (actions::PREVIOUS_SCENE, &[KeyCode::ArrowLeft]),
];

/// Tracks which keys went down this frame.
///
/// Held keys are remembered so OS key repeat does not count as a new press.
#[derive(Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    keys_just_pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_key_down(&mut self, key: KeyCode) {
        if self.keys_down.insert(key) {
            self.keys_just_pressed.insert(key);
        }
    }

    pub fn process_key_up(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
    }

    /// Was any key bound to `action` pressed this frame?
    pub fn is_action_just_pressed(&self, action: &str) -> bool {
        BINDINGS
            .iter()
            .filter(|(name, _)| *name == action)
            .flat_map(|(_, keys)| keys.iter())
            .any(|k| self.keys_just_pressed.contains(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_lasts_one_frame() {
        let mut input = InputState::new();
        input.process_key_down(KeyCode::ArrowUp);
        assert!(input.is_action_just_pressed(actions::BEAT_FASTER));

        input.end_frame();
        assert!(!input.is_action_just_pressed(actions::BEAT_FASTER));
    }

    #[test]
    fn test_key_repeat_is_not_a_new_press() {
        let mut input = InputState::new();
        input.process_key_down(KeyCode::ArrowDown);
        input.end_frame();
        input.process_key_down(KeyCode::ArrowDown);
        assert!(!input.is_action_just_pressed(actions::BEAT_SLOWER));

        input.process_key_up(KeyCode::ArrowDown);
        input.process_key_down(KeyCode::ArrowDown);
        assert!(input.is_action_just_pressed(actions::BEAT_SLOWER));
    }

    #[test]
    fn test_default_bindings() {
        let mut input = InputState::new();
        input.process_key_down(KeyCode::Escape);
        assert!(input.is_action_just_pressed(actions::QUIT));
        assert!(!input.is_action_just_pressed(actions::NEXT_SCENE));

        input.end_frame();
        input.process_key_down(KeyCode::ArrowRight);
        assert!(input.is_action_just_pressed(actions::NEXT_SCENE));
        input.process_key_down(KeyCode::ArrowLeft);
        assert!(input.is_action_just_pressed(actions::PREVIOUS_SCENE));
    }

    #[test]
    fn test_unknown_action_is_never_pressed() {
        let mut input = InputState::new();
        input.process_key_down(KeyCode::Tab);
        assert!(!input.is_action_just_pressed("jump"));
    }
}
