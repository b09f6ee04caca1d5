//! Keyboard hook lifecycle
//!
//! Runs the hook on a dedicated thread: the thread that installs a
//! low-level keyboard hook must also pump its message loop, or the OS
//! stops delivering callbacks. The thread blocks in `GetMessageW` between
//! events, which is what keeps the process alive at near-zero CPU.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
#[cfg(windows)]
use std::thread;

use tokio::sync::Notify;
#[cfg(windows)]
use tracing::{debug, info, warn};
#[cfg(windows)]
use windows::Win32::Foundation::{LPARAM, WPARAM};
#[cfg(windows)]
use windows::Win32::System::Threading::GetCurrentThreadId;
#[cfg(windows)]
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, PostThreadMessageW, TranslateMessage, MSG, WM_QUIT,
};

#[cfg(windows)]
use super::driver;

/// Errors that can occur in the keyboard hook
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("keyboard hook is already running")]
    AlreadyRunning,

    #[error("failed to install keyboard hook: {0}")]
    Install(String),

    #[error("failed to spawn hook thread: {0}")]
    ThreadSpawn(String),

    #[error("platform not supported")]
    UnsupportedPlatform,
}

/// Owns the system-wide keyboard hook and its message-pump thread
pub struct KeyboardHook {
    /// Doubles as the single-teardown guard: whichever path swaps this
    /// to false performs the uninstall, the other observes a no-op.
    running: Arc<AtomicBool>,
    /// OS thread id of the hook thread, for posting WM_QUIT
    #[cfg_attr(not(windows), allow(dead_code))]
    thread_id: Arc<AtomicU32>,
    /// Signaled when the hook thread exits
    closed: Arc<Notify>,
}

impl KeyboardHook {
    /// Create a new, not-yet-started hook
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            thread_id: Arc::new(AtomicU32::new(0)),
            closed: Arc::new(Notify::new()),
        }
    }

    /// Install the hook and start pumping its message loop.
    ///
    /// Spawns the dedicated `keyboard-hook` thread and blocks until that
    /// thread reports its install result, so an OS rejection surfaces
    /// here instead of after the daemon has claimed to be running.
    #[cfg(windows)]
    pub fn start(&self) -> Result<(), HookError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(HookError::AlreadyRunning);
        }

        let (install_tx, install_rx) = std::sync::mpsc::channel();
        let running = Arc::clone(&self.running);
        let thread_id = Arc::clone(&self.thread_id);
        let closed = Arc::clone(&self.closed);

        let spawned = thread::Builder::new()
            .name("keyboard-hook".to_string())
            .spawn(move || {
                info!("keyboard hook thread started");
                thread_id.store(unsafe { GetCurrentThreadId() }, Ordering::SeqCst);

                let result = driver::install();
                let installed = result.is_ok();
                let _ = install_tx.send(result);

                if installed {
                    run_message_loop();
                    // No-op if the signal path already unhooked
                    driver::uninstall();
                }

                running.store(false, Ordering::SeqCst);
                closed.notify_one();
                info!("keyboard hook thread stopped");
            });

        if let Err(e) = spawned {
            self.running.store(false, Ordering::SeqCst);
            return Err(HookError::ThreadSpawn(e.to_string()));
        }

        match install_rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(HookError::Install(
                "hook thread exited before reporting install result".to_string(),
            )),
        }
    }

    /// Low-level keyboard hooks only exist on Windows
    #[cfg(not(windows))]
    pub fn start(&self) -> Result<(), HookError> {
        Err(HookError::UnsupportedPlatform)
    }

    /// Tear down the hook: uninstall it and quit the message loop.
    ///
    /// Safe to call from any thread and any number of times; only the
    /// first call reaches the OS.
    #[cfg(windows)]
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        driver::uninstall();

        let tid = self.thread_id.load(Ordering::SeqCst);
        if tid != 0 {
            if let Err(e) = unsafe { PostThreadMessageW(tid, WM_QUIT, WPARAM(0), LPARAM(0)) } {
                warn!(?e, "failed to post quit message to hook thread");
            }
        }
    }

    #[cfg(not(windows))]
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the hook thread is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Wait for the hook thread to exit
    pub async fn closed(&self) {
        self.closed.notified().await;
    }
}

impl Default for KeyboardHook {
    fn default() -> Self {
        Self::new()
    }
}

/// Pump messages until WM_QUIT.
///
/// The loop blocks in `GetMessageW`; its continuation is what keeps the
/// OS delivering hook callbacks to this thread.
#[cfg(windows)]
fn run_message_loop() {
    let mut msg = MSG::default();
    loop {
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if ret.0 == 0 {
            debug!("WM_QUIT received");
            break;
        }
        if ret.0 == -1 {
            warn!("GetMessageW failed, leaving message loop");
            break;
        }
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_creation() {
        let hook = KeyboardHook::new();
        assert!(!hook.is_running());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_start_unsupported_off_windows() {
        let hook = KeyboardHook::new();
        assert!(matches!(hook.start(), Err(HookError::UnsupportedPlatform)));
        assert!(!hook.is_running());
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let hook = KeyboardHook::new();
        hook.stop();
        hook.stop();
        assert!(!hook.is_running());
    }
}
