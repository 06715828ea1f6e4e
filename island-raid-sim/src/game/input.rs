//! Input Capture and Normalization
//!
//! Key events arrive asynchronously between ticks and are folded into an
//! [`InputState`]. At tick start the state is sampled into an [`InputFrame`],
//! the only input the simulation ever reads.

use serde::{Serialize, Deserialize};

// =============================================================================
// KEYS
// =============================================================================

/// Logical key understood by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Move up (-Y)
    Up,
    /// Move down (+Y)
    Down,
    /// Move left (-X)
    Left,
    /// Move right (+X)
    Right,
    /// Swing the weapon
    Attack,
}

impl Key {
    /// Map a DOM-style key name (`KeyboardEvent.key`) to a logical key.
    ///
    /// Matching is case-insensitive. WASD and the arrow keys move; space and
    /// `f` attack.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "w" | "arrowup" => Some(Key::Up),
            "s" | "arrowdown" => Some(Key::Down),
            "a" | "arrowleft" => Some(Key::Left),
            "d" | "arrowright" => Some(Key::Right),
            " " | "space" | "f" => Some(Key::Attack),
            _ => None,
        }
    }

    #[inline]
    fn flag(self) -> u8 {
        match self {
            Key::Up => InputFrame::FLAG_UP,
            Key::Down => InputFrame::FLAG_DOWN,
            Key::Left => InputFrame::FLAG_LEFT,
            Key::Right => InputFrame::FLAG_RIGHT,
            Key::Attack => InputFrame::FLAG_ATTACK,
        }
    }
}

/// A key press or release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "key", rename_all = "snake_case")]
pub enum KeyEvent {
    /// Key went down (repeats while held are harmless)
    Down(Key),
    /// Key went up
    Up(Key),
}

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Input sampled at the start of one tick.
///
/// Direction bits mean "held". The attack bit means "pressed since the
/// previous frame", so one key press is one attack attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Packed key bits (see `FLAG_*`)
    pub flags: u8,
}

impl InputFrame {
    /// Up held
    pub const FLAG_UP: u8 = 0x01;
    /// Down held
    pub const FLAG_DOWN: u8 = 0x02;
    /// Left held
    pub const FLAG_LEFT: u8 = 0x04;
    /// Right held
    pub const FLAG_RIGHT: u8 = 0x08;
    /// Attack pressed this frame
    pub const FLAG_ATTACK: u8 = 0x10;

    /// Empty frame (nothing held).
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Frame with the given keys set.
    pub fn with_keys(keys: &[Key]) -> Self {
        let mut frame = Self::new();
        for key in keys {
            frame.flags |= key.flag();
        }
        frame
    }

    /// Is this key set in the frame?
    #[inline]
    pub fn is_set(&self, key: Key) -> bool {
        self.flags & key.flag() != 0
    }

    /// Was attack pressed this frame?
    #[inline]
    pub fn attack_pressed(&self) -> bool {
        self.is_set(Key::Attack)
    }

    /// Per-axis movement intent, each component in {-1, 0, 1}.
    ///
    /// Opposing keys cancel. Diagonals are not normalized: both axes move at
    /// full speed.
    #[inline]
    pub fn direction(&self) -> (i32, i32) {
        let dx = self.is_set(Key::Right) as i32 - self.is_set(Key::Left) as i32;
        let dy = self.is_set(Key::Down) as i32 - self.is_set(Key::Up) as i32;
        (dx, dy)
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }
}

// =============================================================================
// INPUT STATE
// =============================================================================

/// Key state accumulated between ticks.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    held: u8,
    attack_latched: bool,
}

impl InputState {
    /// Create with nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one key event into the state.
    pub fn apply(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Down(key) => {
                if key == Key::Attack && self.held & key.flag() == 0 {
                    self.attack_latched = true;
                }
                self.held |= key.flag();
            }
            KeyEvent::Up(key) => {
                self.held &= !key.flag();
            }
        }
    }

    /// Is the key currently held?
    pub fn is_held(&self, key: Key) -> bool {
        self.held & key.flag() != 0
    }

    /// Release everything (e.g. on restart or focus loss).
    pub fn release_all(&mut self) {
        self.held = 0;
        self.attack_latched = false;
    }

    /// Sample the frame for the next tick and clear the attack latch.
    pub fn take_frame(&mut self) -> InputFrame {
        let mut flags = self.held & !InputFrame::FLAG_ATTACK;
        if std::mem::take(&mut self.attack_latched) {
            flags |= InputFrame::FLAG_ATTACK;
        }
        InputFrame { flags }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_key_name("w"), Some(Key::Up));
        assert_eq!(Key::from_key_name("ArrowUp"), Some(Key::Up));
        assert_eq!(Key::from_key_name("D"), Some(Key::Right));
        assert_eq!(Key::from_key_name("arrowleft"), Some(Key::Left));
        assert_eq!(Key::from_key_name(" "), Some(Key::Attack));
        assert_eq!(Key::from_key_name("Escape"), None);
    }

    #[test]
    fn test_direction() {
        assert_eq!(InputFrame::new().direction(), (0, 0));
        assert_eq!(InputFrame::with_keys(&[Key::Right]).direction(), (1, 0));
        assert_eq!(InputFrame::with_keys(&[Key::Up, Key::Left]).direction(), (-1, -1));
        assert_eq!(InputFrame::with_keys(&[Key::Left, Key::Right]).direction(), (0, 0));
        assert_eq!(InputFrame::with_keys(&[Key::Down, Key::Attack]).direction(), (0, 1));
    }

    #[test]
    fn test_held_keys_persist_across_frames() {
        let mut input = InputState::new();
        input.apply(KeyEvent::Down(Key::Right));

        assert_eq!(input.take_frame().direction(), (1, 0));
        assert_eq!(input.take_frame().direction(), (1, 0));

        input.apply(KeyEvent::Up(Key::Right));
        assert!(input.take_frame().is_idle());
    }

    #[test]
    fn test_attack_is_one_shot() {
        let mut input = InputState::new();
        input.apply(KeyEvent::Down(Key::Attack));
        // Key repeat while held does not re-trigger
        input.apply(KeyEvent::Down(Key::Attack));

        assert!(input.take_frame().attack_pressed());
        assert!(!input.take_frame().attack_pressed());

        input.apply(KeyEvent::Up(Key::Attack));
        input.apply(KeyEvent::Down(Key::Attack));
        assert!(input.take_frame().attack_pressed());
    }

    #[test]
    fn test_tap_between_ticks_still_attacks() {
        let mut input = InputState::new();
        input.apply(KeyEvent::Down(Key::Attack));
        input.apply(KeyEvent::Up(Key::Attack));

        let frame = input.take_frame();
        assert!(frame.attack_pressed());
        assert!(!input.is_held(Key::Attack));
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::new();
        input.apply(KeyEvent::Down(Key::Up));
        input.apply(KeyEvent::Down(Key::Attack));
        input.release_all();
        assert!(input.take_frame().is_idle());
    }
}
