//! Value types shared across the crate.

pub mod config;
pub mod seq;

pub use config::Settings;
pub use seq::{
    Addr, Capabilities, ClientInfo, ClientKind, PortInfo, QueryDirection, SubscriberInfo,
    Subscription, SubscriptionAttrs,
};
