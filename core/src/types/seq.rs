//! Sequencer value types: addresses, capability bits, subscriptions.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};


/// A `(client, port)` pair identifying one sequencer port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Addr {
    pub client: i32,
    pub port: i32,
}

impl Addr {
    pub const fn new(client: i32, port: i32) -> Self {
        Addr { client, port }
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.client, self.port)
    }
}


/// Port capability bitmask, using the ALSA `SND_SEQ_PORT_CAP_*` bit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(u32);

impl Capabilities {
    /// Readable from this port
    pub const READ: Self = Self(1 << 0);
    /// Writable to this port
    pub const WRITE: Self = Self(1 << 1);
    pub const SYNC_READ: Self = Self(1 << 2);
    pub const SYNC_WRITE: Self = Self(1 << 3);
    /// Allows read/write duplex
    pub const DUPLEX: Self = Self(1 << 4);
    /// Allows read subscriptions (others may receive from this port)
    pub const SUBS_READ: Self = Self(1 << 5);
    /// Allows write subscriptions (others may send to this port)
    pub const SUBS_WRITE: Self = Self(1 << 6);
    /// Routing not allowed
    pub const NO_EXPORT: Self = Self(1 << 7);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Port accepts write subscriptions and may be routed by third parties.
    pub const fn is_exported_receiver(self) -> bool {
        self.contains(Self::SUBS_WRITE) && !self.intersects(Self::NO_EXPORT)
    }
}

impl BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    User,
    Kernel,
}

impl ClientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::User => "user",
            ClientKind::Kernel => "kernel",
        }
    }
}


/// A client as reported by client enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub id: i32,
    pub name: String,
    pub kind: ClientKind,
}

/// A port as reported by port enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub index: i32,
    pub name: String,
    pub capabilities: Capabilities,
}


/// Which side of a port a subscriber query looks at.
///
/// `Read` lists the ports reading from the root (its destinations);
/// `Write` lists the ports writing to the root (its senders).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDirection {
    Read,
    Write,
}


/// Queue and timestamp options carried by a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubscriptionAttrs {
    pub queue: i32,
    pub exclusive: bool,
    pub time_update: bool,
    pub time_real: bool,
}

impl SubscriptionAttrs {
    /// Convert tick timestamps on `queue`.
    pub fn tick(queue: i32) -> Self {
        SubscriptionAttrs {
            queue,
            time_update: true,
            ..Self::default()
        }
    }

    /// Convert real-time timestamps on `queue`.
    pub fn real(queue: i32) -> Self {
        SubscriptionAttrs {
            queue,
            time_update: true,
            time_real: true,
            ..Self::default()
        }
    }

    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Listing suffix, e.g. `[ex][real:1]`.
    pub fn suffix(&self) -> String {
        let mut out = String::new();
        if self.exclusive {
            out.push_str("[ex]");
        }
        if self.time_update {
            let clock = if self.time_real { "real" } else { "tick" };
            out.push_str(&format!("[{}:{}]", clock, self.queue));
        }
        out
    }
}


/// A directed subscription descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub sender: Addr,
    pub dest: Addr,
    pub attrs: SubscriptionAttrs,
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.sender, self.dest)
    }
}


/// One page of a subscriber query: the peer address and its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberInfo {
    pub addr: Addr,
    pub attrs: SubscriptionAttrs,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_bits_match_alsa() {
        assert_eq!(Capabilities::READ.bits(), 0x01);
        assert_eq!(Capabilities::SUBS_READ.bits(), 0x20);
        assert_eq!(Capabilities::SUBS_WRITE.bits(), 0x40);
        assert_eq!(Capabilities::NO_EXPORT.bits(), 0x80);
    }

    #[test]
    fn contains_requires_all_bits() {
        let caps = Capabilities::READ | Capabilities::SUBS_READ;
        assert!(caps.contains(Capabilities::READ));
        assert!(caps.contains(Capabilities::READ | Capabilities::SUBS_READ));
        assert!(!caps.contains(Capabilities::READ | Capabilities::WRITE));
    }

    #[test]
    fn no_export_blocks_routing() {
        let caps = Capabilities::SUBS_WRITE | Capabilities::NO_EXPORT;
        assert!(!caps.is_exported_receiver());
        assert!(Capabilities::SUBS_WRITE.is_exported_receiver());
    }

    #[test]
    fn attrs_suffix() {
        assert_eq!(SubscriptionAttrs::default().suffix(), "");
        assert_eq!(SubscriptionAttrs::real(1).exclusive(true).suffix(), "[ex][real:1]");
        assert_eq!(SubscriptionAttrs::tick(0).suffix(), "[tick:0]");
    }

    #[test]
    fn addr_display() {
        assert_eq!(Addr::new(128, 3).to_string(), "128:3");
    }
}
