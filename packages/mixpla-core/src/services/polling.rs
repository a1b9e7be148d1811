//! Polling cadence types shared by the monitoring services.

use tokio_util::sync::CancellationToken;

/// Polling cadence for the status monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Steady-state cadence once a station's state is settled.
    Regular,
    /// Accelerated cadence while waiting for a station to come on air.
    Fast,
}

/// Handle to a running polling loop.
///
/// Dropping the handle does not stop the loop; the owning monitor calls
/// [`PollingHandle::cancel`] explicitly so a replacement loop can only be
/// spawned after the old one has been told to stop.
#[derive(Debug)]
pub struct PollingHandle {
    token: CancellationToken,
}

impl PollingHandle {
    /// Wraps the cancellation token of a spawned polling loop.
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Signals the loop to stop at its next await point.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true if the loop has been told to stop.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
