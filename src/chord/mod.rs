//! Chord state machine module
//!
//! Pure decision logic that turns the stream of key transitions delivered
//! by the keyboard hook into remap decisions.

mod machine;

pub use machine::{ChordRemapper, Decision, RemapAction};
