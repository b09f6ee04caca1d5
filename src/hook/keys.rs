//! Virtual-key definitions and the decoded key event record
//!
//! Provides the virtual-key codes involved in the remap rule and the
//! platform-independent event record the hook driver decodes raw
//! callbacks into.

/// Virtual-key codes from the Windows scancode space used by the remap rule
pub mod vk {
    /// Left Windows key
    pub const LWIN: u32 = 0x5B;
    /// Right Windows key
    pub const RWIN: u32 = 0x5C;
    /// The letter K
    pub const K: u32 = 0x4B;
    /// Media play/pause key
    pub const MEDIA_PLAY_PAUSE: u32 = 0xB3;
}

/// Which direction a physical key transition went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Key was pressed down (includes auto-repeat)
    Down,
    /// Key was released
    Up,
}

/// A single decoded key transition, valid only for the duration of the
/// hook callback that produced it. OS timing and extra-info fields are
/// dropped at the decode boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Down or up
    pub transition: Transition,
    /// Virtual-key code
    pub vk: u32,
}

impl KeyEvent {
    /// Create a new key event
    pub fn new(transition: Transition, vk: u32) -> Self {
        Self { transition, vk }
    }

    /// Whether this event's key belongs to the chord's modifier set.
    ///
    /// Left and right Windows keys are coalesced: holding either one
    /// satisfies the chord.
    pub fn is_modifier(&self) -> bool {
        self.vk == vk::LWIN || self.vk == vk::RWIN
    }

    /// Whether this event's key is the chord's trigger key
    pub fn is_trigger(&self) -> bool {
        self.vk == vk::K
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_set_coalesces_left_and_right() {
        let left = KeyEvent::new(Transition::Down, vk::LWIN);
        let right = KeyEvent::new(Transition::Down, vk::RWIN);
        assert!(left.is_modifier());
        assert!(right.is_modifier());
    }

    #[test]
    fn test_trigger_is_not_a_modifier() {
        let trigger = KeyEvent::new(Transition::Down, vk::K);
        assert!(trigger.is_trigger());
        assert!(!trigger.is_modifier());
    }

    #[test]
    fn test_unrelated_key() {
        let other = KeyEvent::new(Transition::Down, 0x41); // 'A'
        assert!(!other.is_trigger());
        assert!(!other.is_modifier());
    }
}
