//! Listing renderers: text (`--list`), bare port names (`--ports`), JSON.

use std::fmt::Write;

use crate::error::Result;
use crate::graph::{Client, ConnectionGraph, PortFilter};


/// Clients with the ports that pass `filter`. A client with no passing
/// ports is dropped only while the filter is active.
fn visible<'a>(graph: &'a ConnectionGraph, filter: PortFilter) -> Vec<(&'a Client, Vec<usize>)> {
    graph
        .clients()
        .iter()
        .filter_map(|client| {
            let ports: Vec<usize> = client
                .ports
                .iter()
                .enumerate()
                .filter(|(_, p)| filter.accepts(p.capabilities))
                .map(|(i, _)| i)
                .collect();
            if filter.is_active() && ports.is_empty() {
                None
            } else {
                Some((client, ports))
            }
        })
        .collect()
}


/// Text listing: each port with its outbound edges (`->`) and the edges
/// inferred to reach it (`<-`).
pub fn render_list(graph: &ConnectionGraph, filter: PortFilter) -> String {
    let mut out = String::new();
    for (client, indices) in visible(graph, filter) {
        let _ = writeln!(
            out,
            "client {}: '{}' [type={}]",
            client.id,
            client.name,
            client.kind.as_str()
        );
        for i in indices {
            let port = &client.ports[i];
            let _ = writeln!(out, "  {:<3} '{}'", port.index, port.name);
            for conn in &port.connections {
                let _ = writeln!(
                    out,
                    "    -> {} ({}){}",
                    conn.peer,
                    conn.peer_label(),
                    conn.attrs.suffix()
                );
            }
            for (sender, conn) in graph.connected_from(port) {
                let _ = writeln!(
                    out,
                    "    <- {} ({}:{}){}",
                    sender.addr(),
                    sender.client_name,
                    sender.name,
                    conn.attrs.suffix()
                );
            }
        }
    }
    out
}


/// One `:'port name'` line per port, for shell completion.
pub fn render_ports(graph: &ConnectionGraph, filter: PortFilter) -> String {
    let mut out = String::new();
    for (client, indices) in visible(graph, filter) {
        for i in indices {
            let _ = writeln!(out, ":'{}'", client.ports[i].name);
        }
    }
    out
}


/// The filtered graph as pretty-printed JSON.
pub fn render_json(graph: &ConnectionGraph, filter: PortFilter) -> Result<String> {
    let clients: Vec<Client> = visible(graph, filter)
        .into_iter()
        .map(|(client, indices)| Client {
            ports: indices.into_iter().map(|i| client.ports[i].clone()).collect(),
            ..client.clone()
        })
        .collect();
    Ok(serde_json::to_string_pretty(&ConnectionGraph::from_clients(clients))?)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::MemorySequencer;
    use crate::types::{Addr, Capabilities, ClientKind};

    fn input() -> Capabilities {
        Capabilities::READ | Capabilities::SUBS_READ
    }

    fn output() -> Capabilities {
        Capabilities::WRITE | Capabilities::SUBS_WRITE
    }

    fn graph() -> ConnectionGraph {
        let seq = MemorySequencer::new()
            .with_client(0, "System", ClientKind::Kernel)
            .with_port(0, 0, "Timer", input() | Capabilities::NO_EXPORT)
            .with_client(20, "A", ClientKind::User)
            .with_port(20, 0, "p0", input() | output())
            .with_client(21, "B", ClientKind::User)
            .with_port(21, 0, "p0", output())
            .with_subscription(Addr::new(20, 0), Addr::new(21, 0));
        ConnectionGraph::build(&seq)
    }

    #[test]
    fn list_shows_forward_and_inferred_edges() {
        let text = render_list(&graph(), PortFilter::default());
        let expected = "\
client 0: 'System' [type=kernel]
  0   'Timer'
client 20: 'A' [type=user]
  0   'p0'
    -> 21:0 (B:p0)
client 21: 'B' [type=user]
  0   'p0'
    <- 20:0 (A:p0)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn list_filter_drops_clients_without_ports() {
        let text = render_list(&graph(), PortFilter::new(true, false));
        assert!(!text.contains("System"));
        assert!(text.contains("client 20: 'A'"));
        assert!(!text.contains("client 21"));
    }

    #[test]
    fn ports_listing() {
        let text = render_ports(&graph(), PortFilter::default());
        assert_eq!(text, ":'Timer'\n:'p0'\n:'p0'\n");
        let outputs = render_ports(&graph(), PortFilter::new(false, true));
        assert_eq!(outputs, ":'p0'\n:'p0'\n");
    }

    #[test]
    fn attributes_are_suffixed() {
        let mut seq = MemorySequencer::new()
            .with_client(20, "A", ClientKind::User)
            .with_port(20, 0, "p0", input())
            .with_client(21, "B", ClientKind::User)
            .with_port(21, 0, "p0", output());
        crate::sequencer::Sequencer::subscribe(
            &mut seq,
            &crate::types::Subscription {
                sender: Addr::new(20, 0),
                dest: Addr::new(21, 0),
                attrs: crate::types::SubscriptionAttrs::real(2).exclusive(true),
            },
        )
        .unwrap();
        let text = render_list(&ConnectionGraph::build(&seq), PortFilter::default());
        assert!(text.contains("    -> 21:0 (B:p0)[ex][real:2]"));
        assert!(text.contains("    <- 20:0 (A:p0)[ex][real:2]"));
    }

    #[test]
    fn json_is_filtered() {
        let json = render_json(&graph(), PortFilter::new(false, true)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let clients = parsed["clients"].as_array().unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0]["name"], "A");
        assert_eq!(clients[0]["ports"][0]["connections"][0]["peer"]["client"], 21);
        assert_eq!(clients[1]["ports"][0]["inbound"][0]["peer_client_name"], "A");
    }
}
