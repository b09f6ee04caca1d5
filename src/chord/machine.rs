//! Core chord decision logic
//!
//! Tracks whether a Windows key is currently held and decides, for each
//! key transition, whether to let it pass through or to remap it. The
//! remap rule is fixed at build time: Win+K becomes media play/pause.

use tracing::debug;

use crate::hook::{KeyEvent, Transition};

/// The synthesized action a matched chord maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemapAction {
    /// Media play/pause keypress (down followed by up)
    MediaPlayPause,
}

impl RemapAction {
    /// Virtual-key code to inject for this action
    pub fn vk(&self) -> u32 {
        match self {
            RemapAction::MediaPlayPause => crate::hook::vk::MEDIA_PLAY_PAUSE,
        }
    }

    /// Whether the injected key uses extended-key semantics
    pub fn extended(&self) -> bool {
        match self {
            RemapAction::MediaPlayPause => true,
        }
    }
}

/// What the hook driver should do with an intercepted event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Forward the event to the next hook in the chain unmodified
    PassThrough,
    /// Synthesize the action and suppress the original event
    Remap(RemapAction),
}

/// The chord state machine: one bit of state plus a pure decision function
#[derive(Debug)]
pub struct ChordRemapper {
    /// Whether either Windows key is currently held.
    ///
    /// Reflects the last seen transition, not a count: left and right
    /// Windows keys are coalesced into a single boolean.
    modifier_held: bool,
}

impl ChordRemapper {
    /// Create a new remapper with no modifier held
    pub const fn new() -> Self {
        Self {
            modifier_held: false,
        }
    }

    /// Whether the modifier is currently held
    pub fn modifier_held(&self) -> bool {
        self.modifier_held
    }

    /// Decide what to do with a single key transition.
    ///
    /// The modifier key's own events always pass through, so unrelated
    /// behavior bound to the Windows key alone is preserved. Only the
    /// exact trigger-down-while-held case is suppressed. Key-repeat of
    /// the trigger while the modifier stays held re-triggers the remap
    /// on every repeated down event.
    pub fn on_event(&mut self, event: KeyEvent) -> Decision {
        match event.transition {
            Transition::Down => {
                if event.is_modifier() {
                    self.modifier_held = true;
                    Decision::PassThrough
                } else if self.modifier_held && event.is_trigger() {
                    debug!(vk = event.vk, "chord matched, remapping");
                    Decision::Remap(RemapAction::MediaPlayPause)
                } else {
                    Decision::PassThrough
                }
            }
            Transition::Up => {
                if event.is_modifier() {
                    self.modifier_held = false;
                }
                Decision::PassThrough
            }
        }
    }
}

impl Default for ChordRemapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::vk;

    fn down(code: u32) -> KeyEvent {
        KeyEvent::new(Transition::Down, code)
    }

    fn up(code: u32) -> KeyEvent {
        KeyEvent::new(Transition::Up, code)
    }

    #[test]
    fn test_initial_state() {
        let remapper = ChordRemapper::new();
        assert!(!remapper.modifier_held());
    }

    #[test]
    fn test_chord_match_remaps_and_suppresses() {
        // [modifierDown, triggerDown] -> one remap, modifier still held
        let mut remapper = ChordRemapper::new();

        assert_eq!(remapper.on_event(down(vk::LWIN)), Decision::PassThrough);
        assert!(remapper.modifier_held());

        assert_eq!(
            remapper.on_event(down(vk::K)),
            Decision::Remap(RemapAction::MediaPlayPause)
        );
        // The trigger event itself does not change the modifier state
        assert!(remapper.modifier_held());
    }

    #[test]
    fn test_trigger_without_modifier_passes_through() {
        let mut remapper = ChordRemapper::new();
        assert_eq!(remapper.on_event(down(vk::K)), Decision::PassThrough);
        assert!(!remapper.modifier_held());
    }

    #[test]
    fn test_released_modifier_disarms_chord() {
        // [modifierDown, modifierUp, triggerDown] -> pass through
        let mut remapper = ChordRemapper::new();

        remapper.on_event(down(vk::LWIN));
        assert_eq!(remapper.on_event(up(vk::LWIN)), Decision::PassThrough);
        assert!(!remapper.modifier_held());

        assert_eq!(remapper.on_event(down(vk::K)), Decision::PassThrough);
    }

    #[test]
    fn test_key_repeat_retriggers_remap() {
        // [modifierDown, triggerDown, triggerDown] -> two remaps
        let mut remapper = ChordRemapper::new();

        remapper.on_event(down(vk::RWIN));
        assert_eq!(
            remapper.on_event(down(vk::K)),
            Decision::Remap(RemapAction::MediaPlayPause)
        );
        assert_eq!(
            remapper.on_event(down(vk::K)),
            Decision::Remap(RemapAction::MediaPlayPause)
        );
        assert!(remapper.modifier_held());
    }

    #[test]
    fn test_either_windows_key_arms_chord() {
        let mut remapper = ChordRemapper::new();
        remapper.on_event(down(vk::RWIN));
        assert_eq!(
            remapper.on_event(down(vk::K)),
            Decision::Remap(RemapAction::MediaPlayPause)
        );
    }

    #[test]
    fn test_modifier_events_always_pass_through() {
        // The Windows key's own down/up are never suppressed, even when
        // a chord fires in between.
        let mut remapper = ChordRemapper::new();

        assert_eq!(remapper.on_event(down(vk::LWIN)), Decision::PassThrough);
        remapper.on_event(down(vk::K));
        assert_eq!(remapper.on_event(up(vk::LWIN)), Decision::PassThrough);
    }

    #[test]
    fn test_modifier_up_clears_state_after_matches() {
        // No counting: one release clears the state regardless of how
        // many chords fired while held.
        let mut remapper = ChordRemapper::new();

        remapper.on_event(down(vk::LWIN));
        remapper.on_event(down(vk::K));
        remapper.on_event(down(vk::K));
        remapper.on_event(up(vk::LWIN));

        assert!(!remapper.modifier_held());
        assert_eq!(remapper.on_event(down(vk::K)), Decision::PassThrough);
    }

    #[test]
    fn test_unrelated_keys_pass_through_while_held() {
        let mut remapper = ChordRemapper::new();

        remapper.on_event(down(vk::LWIN));
        assert_eq!(remapper.on_event(down(0x41)), Decision::PassThrough); // 'A'
        assert_eq!(remapper.on_event(up(0x41)), Decision::PassThrough);
        assert!(remapper.modifier_held());
    }

    #[test]
    fn test_action_injection_parameters() {
        let action = RemapAction::MediaPlayPause;
        assert_eq!(action.vk(), vk::MEDIA_PLAY_PAUSE);
        assert!(action.extended());
    }

    #[test]
    fn test_trigger_up_passes_through() {
        let mut remapper = ChordRemapper::new();

        remapper.on_event(down(vk::LWIN));
        remapper.on_event(down(vk::K));
        // Only the down transition of the trigger is suppressed
        assert_eq!(remapper.on_event(up(vk::K)), Decision::PassThrough);
    }
}
