//! Connectivity adapters.

mod watch_monitor;

pub use watch_monitor::WatchConnectivityMonitor;
