//! winchord: Background daemon that remaps Win+K to media play/pause
//!
//! Installs a system-wide low-level keyboard hook, watches for the K key
//! pressed while either Windows key is held, and replaces that chord with
//! a media play/pause keypress. The OS default for Win+K is suppressed;
//! everything else passes through untouched.
//!
//! Scope:
//! - One fixed remap rule, compiled in
//! - Hook install, chord decision, event synthesis, guarded teardown
//! - NO tray icon, configuration, or persisted state

mod chord;
mod hook;
mod lifecycle;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::hook::KeyboardHook;
use crate::lifecycle::ShutdownSignal;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "winchord starting"
    );

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // Install the keyboard hook on its dedicated thread. A rejected
    // install is fatal; there is nothing to retry.
    let keyboard_hook = KeyboardHook::new();
    keyboard_hook
        .start()
        .context("failed to install keyboard hook")?;

    info!("keyboard hook installed, remapping Win+K to media play/pause");

    // Block until something ends the session
    tokio::select! {
        // External interrupt / termination signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }

        // The hook's message loop exited on its own (quit message or
        // message-retrieval failure)
        _ = keyboard_hook.closed() => {
            warn!("keyboard hook message loop exited");
        }
    }

    // Cleanup
    info!("shutting down...");

    keyboard_hook.stop();

    info!("winchord stopped");

    Ok(())
}
