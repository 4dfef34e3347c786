//! Connection graph: a one-shot snapshot of the live sequencer state.
//!
//! The `filter` module decides which ports a listing shows. The `listing`
//! module renders the graph as text, bare port names, or JSON.

pub mod filter;
pub mod listing;

pub use filter::PortFilter;

use serde::Serialize;
use tracing::debug;

use crate::sequencer::Sequencer;
use crate::types::{Addr, Capabilities, ClientKind, QueryDirection, SubscriberInfo, SubscriptionAttrs};


/// A directed edge observed from a port's subscriber query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub peer: Addr,
    pub peer_client_name: String,
    pub peer_port_name: String,
    pub attrs: SubscriptionAttrs,
}

impl Connection {
    /// `"client name:port name"`, the form stored in snapshot documents.
    pub fn peer_label(&self) -> String {
        format!("{}:{}", self.peer_client_name, self.peer_port_name)
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
    pub client_id: i32,
    pub client_name: String,
    pub index: i32,
    pub name: String,
    pub capabilities: Capabilities,
    /// Destinations this port sends to ("read" query).
    pub connections: Vec<Connection>,
    /// Senders feeding this port ("write" query).
    pub inbound: Vec<Connection>,
}

impl Port {
    pub fn addr(&self) -> Addr {
        Addr::new(self.client_id, self.index)
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub kind: ClientKind,
    pub ports: Vec<Port>,
}


/// Clients, their ports, and each port's subscriptions, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionGraph {
    clients: Vec<Client>,
}


impl ConnectionGraph {
    /// Query the sequencer once: clients, then ports per client, then both
    /// subscriber lists per port.
    pub fn build<S: Sequencer + ?Sized>(seq: &S) -> ConnectionGraph {
        let clients: Vec<Client> = seq
            .clients()
            .into_iter()
            .map(|info| {
                let ports = seq
                    .ports(info.id)
                    .into_iter()
                    .map(|p| {
                        let addr = Addr::new(info.id, p.index);
                        Port {
                            client_id: info.id,
                            client_name: info.name.clone(),
                            index: p.index,
                            name: p.name,
                            capabilities: p.capabilities,
                            connections: observe(seq, addr, QueryDirection::Read),
                            inbound: observe(seq, addr, QueryDirection::Write),
                        }
                    })
                    .collect();
                Client {
                    id: info.id,
                    name: info.name,
                    kind: info.kind,
                    ports,
                }
            })
            .collect();

        debug!(
            clients = clients.len(),
            ports = clients.iter().map(|c| c.ports.len()).sum::<usize>(),
            "connection graph built"
        );
        ConnectionGraph { clients }
    }

    pub fn from_clients(clients: Vec<Client>) -> ConnectionGraph {
        ConnectionGraph { clients }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Every port, client by client.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.clients.iter().flat_map(|c| c.ports.iter())
    }

    pub fn port(&self, addr: Addr) -> Option<&Port> {
        self.ports().find(|p| p.addr() == addr)
    }

    /// All outbound edges as `(sender, dest)` pairs.
    pub fn edges(&self) -> Vec<(Addr, Addr)> {
        self.ports()
            .flat_map(|p| p.connections.iter().map(move |c| (p.addr(), c.peer)))
            .collect()
    }

    /// Ports whose outbound edges reach `target`.
    ///
    /// Scans every port's outbound list, so a full listing is O(ports²).
    /// The graph is small enough that an indexed reverse map is not needed.
    pub fn connected_from(&self, target: &Port) -> Vec<(&Port, &Connection)> {
        let addr = target.addr();
        let mut found = Vec::new();
        for port in self.ports() {
            for conn in &port.connections {
                if conn.peer == addr {
                    found.push((port, conn));
                }
            }
        }
        found
    }
}


/// Page through one subscriber list and resolve each peer's names.
fn observe<S: Sequencer + ?Sized>(seq: &S, root: Addr, direction: QueryDirection) -> Vec<Connection> {
    seq.subscribers(root, direction)
        .into_iter()
        .map(|SubscriberInfo { addr, attrs }| Connection {
            peer: addr,
            peer_client_name: seq
                .client_info(addr.client)
                .map(|c| c.name)
                .unwrap_or_default(),
            peer_port_name: seq.port_info(addr).map(|p| p.name).unwrap_or_default(),
            attrs,
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::MemorySequencer;

    fn caps() -> Capabilities {
        Capabilities::READ | Capabilities::WRITE | Capabilities::SUBS_READ | Capabilities::SUBS_WRITE
    }

    fn sample() -> MemorySequencer {
        MemorySequencer::new()
            .with_client(0, "System", ClientKind::Kernel)
            .with_port(0, 0, "Timer", caps())
            .with_client(20, "A", ClientKind::User)
            .with_port(20, 0, "p0", caps())
            .with_port(20, 1, "p1", caps())
            .with_client(21, "B", ClientKind::User)
            .with_port(21, 0, "p0", caps())
            .with_subscription(Addr::new(20, 0), Addr::new(21, 0))
            .with_subscription(Addr::new(20, 1), Addr::new(21, 0))
    }

    #[test]
    fn build_preserves_enumeration_order() {
        let graph = ConnectionGraph::build(&sample());
        let names: Vec<&str> = graph.clients().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["System", "A", "B"]);
        assert_eq!(graph.clients()[1].ports.len(), 2);
        assert_eq!(graph.ports().count(), 4);
    }

    #[test]
    fn outbound_connections_carry_peer_names() {
        let graph = ConnectionGraph::build(&sample());
        let port = graph.port(Addr::new(20, 0)).unwrap();
        assert_eq!(port.connections.len(), 1);
        assert_eq!(port.connections[0].peer, Addr::new(21, 0));
        assert_eq!(port.connections[0].peer_label(), "B:p0");
    }

    #[test]
    fn inbound_query_is_recorded() {
        let graph = ConnectionGraph::build(&sample());
        let port = graph.port(Addr::new(21, 0)).unwrap();
        let senders: Vec<Addr> = port.inbound.iter().map(|c| c.peer).collect();
        assert_eq!(senders, vec![Addr::new(20, 0), Addr::new(20, 1)]);
    }

    #[test]
    fn connected_from_matches_inbound_query() {
        let graph = ConnectionGraph::build(&sample());
        let target = graph.port(Addr::new(21, 0)).unwrap();
        let inferred: Vec<Addr> = graph
            .connected_from(target)
            .iter()
            .map(|(p, _)| p.addr())
            .collect();
        let queried: Vec<Addr> = target.inbound.iter().map(|c| c.peer).collect();
        assert_eq!(inferred, queried);
    }

    #[test]
    fn edges_lists_every_outbound_pair() {
        let graph = ConnectionGraph::build(&sample());
        assert_eq!(
            graph.edges(),
            vec![
                (Addr::new(20, 0), Addr::new(21, 0)),
                (Addr::new(20, 1), Addr::new(21, 0)),
            ]
        );
    }

    #[test]
    fn missing_peer_has_empty_names() {
        let seq = MemorySequencer::new()
            .with_client(20, "A", ClientKind::User)
            .with_port(20, 0, "p0", caps())
            .with_subscription(Addr::new(20, 0), Addr::new(99, 0));
        let graph = ConnectionGraph::build(&seq);
        let conn = &graph.port(Addr::new(20, 0)).unwrap().connections[0];
        assert_eq!(conn.peer_label(), ":");
    }
}
