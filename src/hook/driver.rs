//! Raw Win32 surface for the low-level keyboard hook
//!
//! Owns the process-global hook handle and the `extern "system"` callback
//! the OS dispatcher invokes for every key transition system-wide. This is
//! the only module allowed to reinterpret OS-delivered memory; the decode
//! step copies what it needs and retains nothing past the callback.

use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, SetWindowsHookExW, UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT,
    WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

use super::keys::{KeyEvent, Transition};
use super::listener::HookError;
use crate::chord::{ChordRemapper, Decision, RemapAction};

/// The live hook handle, 0 while no hook is installed.
///
/// At most one hook exists per process; the handle is taken with an atomic
/// swap so teardown reaches the OS at most once.
static HOOK_HANDLE: AtomicIsize = AtomicIsize::new(0);

/// Chord state for the hook callback.
///
/// The callback cannot capture environment, so the remapper lives in a
/// process-global. Only the hook thread ever touches it, so the lock is
/// uncontended.
static REMAPPER: Mutex<ChordRemapper> = Mutex::new(ChordRemapper::new());

/// Install the low-level keyboard hook for this process.
///
/// Must be called on the thread that will pump the message loop; the OS
/// delivers hook callbacks to the installing thread.
pub(super) fn install() -> Result<(), HookError> {
    // A previous session's modifier state must not leak into this one
    if let Ok(mut remapper) = REMAPPER.lock() {
        *remapper = ChordRemapper::new();
    }

    let hook = unsafe {
        let module = GetModuleHandleW(None).map_err(|e| HookError::Install(e.to_string()))?;
        SetWindowsHookExW(
            WH_KEYBOARD_LL,
            Some(keyboard_proc),
            Some(HINSTANCE(module.0)),
            0,
        )
        .map_err(|e| HookError::Install(e.to_string()))?
    };

    HOOK_HANDLE.store(hook.0 as isize, Ordering::SeqCst);
    debug!(handle = hook.0 as isize, "keyboard hook installed");
    Ok(())
}

/// Remove the hook if one is installed.
///
/// Idempotent: the handle is swapped out atomically, so whichever of the
/// shutdown paths gets here first unhooks and the other sees a no-op.
pub(super) fn uninstall() {
    let raw = HOOK_HANDLE.swap(0, Ordering::SeqCst);
    if raw == 0 {
        return;
    }
    if let Err(e) = unsafe { UnhookWindowsHookEx(HHOOK(raw as *mut _)) } {
        warn!(?e, "UnhookWindowsHookEx failed");
    } else {
        debug!("keyboard hook removed");
    }
}

/// The hook callback the OS invokes for every key transition.
///
/// Every path that does not explicitly suppress must reach
/// `CallNextHookEx`, or every other hook on the machine stops receiving
/// events. Internal faults are swallowed and mapped to pass-through; a
/// crash inside a system-wide hook callback destabilizes input for all
/// processes.
unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code < 0 {
        // Not meant for this hook; forward without inspecting the payload
        return unsafe { CallNextHookEx(None, code, wparam, lparam) };
    }

    let decision = panic::catch_unwind(AssertUnwindSafe(|| decide(wparam, lparam)))
        .unwrap_or(Decision::PassThrough);

    match decision {
        Decision::Remap(action) => {
            synthesize(action);
            // Non-zero return suppresses the original event
            LRESULT(1)
        }
        Decision::PassThrough => unsafe { CallNextHookEx(None, code, wparam, lparam) },
    }
}

/// Decode the raw callback payload and run the chord decision
fn decide(wparam: WPARAM, lparam: LPARAM) -> Decision {
    let Some(event) = decode(wparam, lparam) else {
        return Decision::PassThrough;
    };
    match REMAPPER.lock() {
        Ok(mut remapper) => remapper.on_event(event),
        Err(_) => Decision::PassThrough,
    }
}

/// Decode the OS-delivered `KBDLLHOOKSTRUCT` into an owned [`KeyEvent`].
///
/// The OS owns the struct behind `lparam` and may reuse it the moment the
/// callback returns, so only the virtual-key code is copied out.
fn decode(wparam: WPARAM, lparam: LPARAM) -> Option<KeyEvent> {
    let transition = match wparam.0 as u32 {
        WM_KEYDOWN | WM_SYSKEYDOWN => Transition::Down,
        WM_KEYUP | WM_SYSKEYUP => Transition::Up,
        _ => return None,
    };

    let kbd = lparam.0 as *const KBDLLHOOKSTRUCT;
    if kbd.is_null() {
        return None;
    }
    let vk = unsafe { (*kbd).vkCode };

    Some(KeyEvent::new(transition, vk))
}

/// Inject the mapped action into the system-wide input stream as a
/// down transition immediately followed by an up transition.
fn synthesize(action: RemapAction) {
    let vk = VIRTUAL_KEY(action.vk() as u16);
    let ext = if action.extended() {
        KEYEVENTF_EXTENDEDKEY
    } else {
        KEYBD_EVENT_FLAGS(0)
    };

    let inputs = [
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: vk,
                    wScan: 0,
                    dwFlags: ext,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        },
        INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: vk,
                    wScan: 0,
                    dwFlags: ext | KEYEVENTF_KEYUP,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        },
    ];

    let sent = unsafe { SendInput(&inputs, mem::size_of::<INPUT>() as i32) };
    if sent != inputs.len() as u32 {
        warn!(sent, "SendInput injected fewer events than requested");
    } else {
        debug!(?action, "synthesized action");
    }
}
