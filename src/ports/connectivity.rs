//! Connectivity observer port.

use tokio::sync::watch;

/// Network reachability as seen by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn is_online(&self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

/// Port for observing connectivity.
///
/// `subscribe` yields a receiver whose value changes only on transitions.
pub trait ConnectivityObserver: Send + Sync {
    /// Point-in-time check, evaluated at call time.
    fn is_currently_online(&self) -> bool;

    fn subscribe(&self) -> watch::Receiver<Connectivity>;
}
