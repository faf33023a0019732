//! Graceful interruption between repositories
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{error, warn};

/// Shared shutdown flag
#[derive(Debug, Default, Clone)]
pub struct Shutdown {
    /// Set once an interruption is requested
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    /// Flag that is never set unless [`Shutdown::request`] is called
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag set by the first Ctrl+C; the second one exits immediately
    pub fn listen() -> Self {
        let shutdown = Self::new();
        let flag = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Unable to listen for Ctrl+C: {e}");
                return;
            }
            warn!("Shutdown requested, finishing the current repository (Ctrl+C again to force quit)");
            flag.request();
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Force quit!");
                std::process::exit(130);
            }
        });
        shutdown
    }

    /// Check if shutdown has been requested
    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Request shutdown
    #[inline]
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }
}
