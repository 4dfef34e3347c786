//! Routing: address resolution, subscriptions, snapshots.
//!
//! The `address` module resolves `client:port` tokens against a
//! `ConnectionGraph`. The `subscription` module connects, disconnects, and
//! tears down exported connections. The `snapshot` module saves the graph as
//! TOML and restores it, pacing requests with the `throttle` module.

pub mod address;
pub mod snapshot;
pub mod subscription;
pub mod throttle;

pub use snapshot::{RestoreOptions, RestoreReport, Snapshot};
pub use subscription::{RemovalReport, SubscriptionManager};
pub use throttle::Throttle;
