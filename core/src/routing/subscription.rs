//! Subscription manager: connect, disconnect, and bulk teardown.

use tracing::{debug, info, warn};

use crate::error::{Result, RouteError};
use crate::graph::ConnectionGraph;
use crate::routing::address;
use crate::sequencer::Sequencer;
use crate::types::{Capabilities, QueryDirection, Subscription, SubscriptionAttrs};


/// Outcome of [`SubscriptionManager::remove_all`].
#[derive(Debug, Default)]
pub struct RemovalReport {
    pub removed: Vec<Subscription>,
    /// Edges left in place because the destination is not exported.
    pub skipped: Vec<Subscription>,
    pub failed: Vec<(Subscription, RouteError)>,
}

impl RemovalReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "removed {} connection(s), skipped {}, failed {}",
            self.removed.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}


/// Issues subscription requests, resolving tokens against a graph snapshot.
pub struct SubscriptionManager<'a, S: Sequencer + ?Sized> {
    seq: &'a mut S,
    graph: &'a ConnectionGraph,
}


impl<'a, S: Sequencer + ?Sized> SubscriptionManager<'a, S> {
    pub fn new(seq: &'a mut S, graph: &'a ConnectionGraph) -> Self {
        SubscriptionManager { seq, graph }
    }

    /// Connect `sender` to `dest`.
    pub fn connect(&mut self, sender: &str, dest: &str, attrs: SubscriptionAttrs) -> Result<Subscription> {
        let sub = self.describe(sender, dest, attrs)?;
        self.check_capabilities(&sub)?;
        if self.seq.subscription_exists(&sub) {
            return Err(RouteError::AlreadySubscribed);
        }
        self.seq.subscribe(&sub)?;
        debug!(%sub, "connected");
        Ok(sub)
    }

    /// Disconnect `sender` from `dest`.
    pub fn disconnect(&mut self, sender: &str, dest: &str, attrs: SubscriptionAttrs) -> Result<Subscription> {
        let sub = self.describe(sender, dest, attrs)?;
        if !self.seq.subscription_exists(&sub) {
            return Err(RouteError::NotSubscribed);
        }
        self.seq.unsubscribe(&sub)?;
        debug!(%sub, "disconnected");
        Ok(sub)
    }

    /// Remove every exported connection reachable from the graph's ports.
    ///
    /// Each port's read subscriptions are paged live. Edges whose destination
    /// is unknown, lacks write subscription, or is no-export are left alone.
    /// A failed removal is recorded and the sweep continues.
    pub fn remove_all(&mut self) -> RemovalReport {
        let mut report = RemovalReport::default();

        for port in self.graph.ports() {
            let root = port.addr();
            let mut index = 0;
            while let Some(peer) = self.seq.query_subscribers(root, QueryDirection::Read, index) {
                let sub = Subscription {
                    sender: root,
                    dest: peer.addr,
                    attrs: peer.attrs,
                };
                let exported = self
                    .seq
                    .port_info(peer.addr)
                    .map(|p| p.capabilities.is_exported_receiver())
                    .unwrap_or(false);
                if !exported {
                    debug!(%sub, "skipping unexported connection");
                    report.skipped.push(sub);
                    index += 1;
                    continue;
                }

                match self.seq.unsubscribe(&sub) {
                    Ok(()) => {
                        debug!(%sub, "removed");
                        report.removed.push(sub);
                        // The list shrank, so the same index now holds the next
                        // entry. Step past it if the backend kept the edge.
                        let still_there = self
                            .seq
                            .query_subscribers(root, QueryDirection::Read, index)
                            .is_some_and(|s| s.addr == peer.addr);
                        if still_there {
                            index += 1;
                        }
                    }
                    Err(e) => {
                        warn!(%sub, error = %e, "failed to remove connection");
                        report.failed.push((sub, e));
                        index += 1;
                    }
                }
            }
        }

        info!("{}", report.summary());
        report
    }

    fn describe(&self, sender: &str, dest: &str, attrs: SubscriptionAttrs) -> Result<Subscription> {
        let sender = address::resolve(sender, self.graph)?;
        let dest = address::resolve(dest, self.graph)?;
        Ok(Subscription { sender, dest, attrs })
    }

    fn check_capabilities(&self, sub: &Subscription) -> Result<()> {
        let caps = |addr| {
            self.graph
                .port(addr)
                .map(|p| p.capabilities)
                .unwrap_or_default()
        };
        if !caps(sub.sender).contains(Capabilities::SUBS_READ) {
            return Err(RouteError::SubscriptionFailed(format!(
                "{} does not allow read subscription",
                sub.sender
            )));
        }
        if !caps(sub.dest).contains(Capabilities::SUBS_WRITE) {
            return Err(RouteError::SubscriptionFailed(format!(
                "{} does not allow write subscription",
                sub.dest
            )));
        }
        Ok(())
    }
}
