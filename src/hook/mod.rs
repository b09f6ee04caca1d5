//! Hook module for system-wide keyboard interception
//!
//! Uses a Windows low-level keyboard hook (WH_KEYBOARD_LL) to observe
//! every key transition, suppress the remapped chord, and inject its
//! replacement. The raw Win32 surface lives in `driver`; the lifecycle
//! around it is portable so the rest of the daemon builds anywhere.

#[cfg(windows)]
mod driver;
mod keys;
mod listener;

pub use keys::{vk, KeyEvent, Transition};
pub use listener::{HookError, KeyboardHook};
