//! Signal handling for graceful shutdown

use tracing::debug;

/// Handles external termination signals
pub struct ShutdownSignal;

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self
    }

    /// Wait for a shutdown signal
    #[cfg(windows)]
    pub async fn wait(&self) {
        use tokio::signal::windows::{ctrl_c, ctrl_close};

        let mut ctrl_c = ctrl_c().expect("failed to register Ctrl-C handler");
        let mut ctrl_close = ctrl_close().expect("failed to register Ctrl-Close handler");

        tokio::select! {
            _ = ctrl_c.recv() => {
                debug!("received Ctrl-C");
            }
            _ = ctrl_close.recv() => {
                debug!("received Ctrl-Close");
            }
        }
    }

    /// Wait for a shutdown signal
    #[cfg(not(windows))]
    pub async fn wait(&self) {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt())
            .expect("failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = sigint.recv() => {
                debug!("received SIGINT");
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
