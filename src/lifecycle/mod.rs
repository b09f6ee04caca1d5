//! Lifecycle module for graceful shutdown handling

mod shutdown;

pub use shutdown::ShutdownSignal;
