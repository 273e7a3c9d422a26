//! Connectivity monitor fed by the platform's network callbacks.
//!
//! The platform layer calls [`WatchConnectivityMonitor::set`] whenever it
//! learns the network state. Subscribers are woken only when the state
//! actually changes.

use tokio::sync::watch;

use crate::ports::{Connectivity, ConnectivityObserver};

pub struct WatchConnectivityMonitor {
    tx: watch::Sender<Connectivity>,
}

impl WatchConnectivityMonitor {
    pub fn new(initial: Connectivity) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Reports the current state. Returns true if it differed from the
    /// previous one.
    pub fn set(&self, state: Connectivity) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
        if changed {
            tracing::info!(online = state.is_online(), "Connectivity changed");
        }
        changed
    }

    pub fn current(&self) -> Connectivity {
        *self.tx.borrow()
    }
}

impl ConnectivityObserver for WatchConnectivityMonitor {
    fn is_currently_online(&self) -> bool {
        self.current().is_online()
    }

    fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }
}
