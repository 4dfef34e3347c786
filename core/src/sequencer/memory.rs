//! In-process sequencer: a plain value model of clients, ports and
//! subscriptions that behaves like the kernel sequencer for routing purposes.

use std::collections::HashSet;

use crate::error::{Result, RouteError};
use crate::sequencer::Sequencer;
use crate::types::{
    Addr, Capabilities, ClientInfo, ClientKind, PortInfo, QueryDirection, SubscriberInfo,
    Subscription,
};


#[derive(Debug, Clone)]
struct MemoryClient {
    info: ClientInfo,
    ports: Vec<PortInfo>,
}


/// Sequencer backed by in-memory state.
///
/// Subscriptions are kept in creation order, so subscriber queries page
/// through them deterministically. Pairs registered with [`fail_on`] are
/// rejected by both `subscribe` and `unsubscribe`.
///
/// [`fail_on`]: MemorySequencer::fail_on
#[derive(Debug, Clone, Default)]
pub struct MemorySequencer {
    clients: Vec<MemoryClient>,
    subscriptions: Vec<Subscription>,
    failing: HashSet<(Addr, Addr)>,
}


impl MemorySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client. Re-adding an existing id is ignored.
    pub fn with_client(mut self, id: i32, name: &str, kind: ClientKind) -> Self {
        if !self.clients.iter().any(|c| c.info.id == id) {
            self.clients.push(MemoryClient {
                info: ClientInfo {
                    id,
                    name: name.into(),
                    kind,
                },
                ports: Vec::new(),
            });
        }
        self
    }

    /// Add a port to an existing client.
    pub fn with_port(mut self, client: i32, index: i32, name: &str, caps: Capabilities) -> Self {
        if let Some(c) = self.clients.iter_mut().find(|c| c.info.id == client) {
            c.ports.push(PortInfo {
                index,
                name: name.into(),
                capabilities: caps,
            });
        }
        self
    }

    /// Seed an existing subscription, bypassing capability checks.
    pub fn with_subscription(mut self, sender: Addr, dest: Addr) -> Self {
        self.subscriptions.push(Subscription {
            sender,
            dest,
            attrs: Default::default(),
        });
        self
    }

    /// Make every subscribe/unsubscribe request for this pair fail.
    pub fn fail_on(&mut self, sender: Addr, dest: Addr) {
        self.failing.insert((sender, dest));
    }

    /// Current edges as `(sender, dest)` pairs, in creation order.
    pub fn edges(&self) -> Vec<(Addr, Addr)> {
        self.subscriptions.iter().map(|s| (s.sender, s.dest)).collect()
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    fn check_failing(&self, sub: &Subscription) -> Result<()> {
        if self.failing.contains(&(sub.sender, sub.dest)) {
            return Err(RouteError::SubscriptionFailed(format!(
                "{} rejected by sequencer",
                sub
            )));
        }
        Ok(())
    }
}


impl Sequencer for MemorySequencer {
    fn clients(&self) -> Vec<ClientInfo> {
        self.clients.iter().map(|c| c.info.clone()).collect()
    }

    fn ports(&self, client: i32) -> Vec<PortInfo> {
        self.clients
            .iter()
            .find(|c| c.info.id == client)
            .map(|c| c.ports.clone())
            .unwrap_or_default()
    }

    fn client_info(&self, client: i32) -> Option<ClientInfo> {
        self.clients
            .iter()
            .find(|c| c.info.id == client)
            .map(|c| c.info.clone())
    }

    fn port_info(&self, addr: Addr) -> Option<PortInfo> {
        self.clients
            .iter()
            .find(|c| c.info.id == addr.client)?
            .ports
            .iter()
            .find(|p| p.index == addr.port)
            .cloned()
    }

    fn query_subscribers(
        &self,
        root: Addr,
        direction: QueryDirection,
        index: usize,
    ) -> Option<SubscriberInfo> {
        self.subscriptions
            .iter()
            .filter_map(|s| match direction {
                QueryDirection::Read if s.sender == root => Some(SubscriberInfo {
                    addr: s.dest,
                    attrs: s.attrs,
                }),
                QueryDirection::Write if s.dest == root => Some(SubscriberInfo {
                    addr: s.sender,
                    attrs: s.attrs,
                }),
                _ => None,
            })
            .nth(index)
    }

    fn subscribe(&mut self, sub: &Subscription) -> Result<()> {
        self.check_failing(sub)?;
        let sender = self
            .port_info(sub.sender)
            .ok_or_else(|| RouteError::SubscriptionFailed(format!("no such port {}", sub.sender)))?;
        let dest = self
            .port_info(sub.dest)
            .ok_or_else(|| RouteError::SubscriptionFailed(format!("no such port {}", sub.dest)))?;
        if !sender.capabilities.contains(Capabilities::SUBS_READ)
            || !dest.capabilities.contains(Capabilities::SUBS_WRITE)
        {
            return Err(RouteError::SubscriptionFailed("Operation not permitted".into()));
        }
        if self.subscription_exists(sub) {
            return Err(RouteError::SubscriptionFailed("Device or resource busy".into()));
        }
        self.subscriptions.push(*sub);
        Ok(())
    }

    fn unsubscribe(&mut self, sub: &Subscription) -> Result<()> {
        self.check_failing(sub)?;
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|s| !(s.sender == sub.sender && s.dest == sub.dest));
        if self.subscriptions.len() == before {
            return Err(RouteError::SubscriptionFailed("No such file or directory".into()));
        }
        Ok(())
    }
}
