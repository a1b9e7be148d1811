//! Runtime seam for background work.
//!
//! Every long-lived task in the library (polling loops, scheduled playback
//! reloads) is spawned through [`TaskSpawner`] rather than `tokio::spawn`,
//! so an embedding shell can route background work onto its own executor
//! while the console binary runs plain Tokio.

use std::future::Future;

/// Spawns the library's background tasks.
///
/// The trait is deliberately fire-and-forget: services own their lifetimes
/// through cancellation tokens rather than join handles, so `spawn` returns
/// nothing. Implementations must keep spawned tasks running after the
/// spawner value itself is dropped.
pub trait TaskSpawner: Send + Sync {
    /// Spawns `future` to run to completion in the background.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// [`TaskSpawner`] backed by a Tokio runtime handle.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Wraps an explicit runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is already inside of.
    ///
    /// # Panics
    ///
    /// Panics outside a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}
