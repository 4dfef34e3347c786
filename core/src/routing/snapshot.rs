//! Snapshot codec: save the connection graph as TOML and restore it.
//!
//! The document maps client name → port name → list of `"client:port"`
//! destinations. Only outbound edges are written, so each connection
//! appears once, under its sender:
//!
//! ```toml
//! [Keystation]
//! "Keystation MIDI 1" = ["FLUID Synth:Synth input port"]
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, RouteError};
use crate::graph::ConnectionGraph;
use crate::routing::subscription::{RemovalReport, SubscriptionManager};
use crate::routing::throttle::Throttle;
use crate::sequencer::Sequencer;
use crate::types::{Subscription, SubscriptionAttrs};


/// Ordered `client → port → destinations` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    clients: IndexMap<String, IndexMap<String, Vec<String>>>,
}


impl Snapshot {
    /// Collect every port's outbound edges. Ports and clients without edges
    /// are left out; clients or ports sharing a name share one entry.
    pub fn from_graph(graph: &ConnectionGraph) -> Snapshot {
        let mut clients: IndexMap<String, IndexMap<String, Vec<String>>> = IndexMap::new();
        for client in graph.clients() {
            for port in client.ports.iter().filter(|p| !p.connections.is_empty()) {
                clients
                    .entry(client.name.clone())
                    .or_default()
                    .entry(port.name.clone())
                    .or_default()
                    .extend(port.connections.iter().map(|c| c.peer_label()));
            }
        }
        Snapshot { clients }
    }

    /// Parse a TOML document. Any syntax or shape error is a `SnapshotFormat` error.
    pub fn parse(text: &str) -> Result<Snapshot> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// `(client, port, destination)` triples in document order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.clients.iter().flat_map(|(client, ports)| {
            ports.iter().flat_map(move |(port, peers)| {
                peers
                    .iter()
                    .map(move |peer| (client.as_str(), port.as_str(), peer.as_str()))
            })
        })
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}


/// How a restore runs.
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    /// Tear down existing exported connections first.
    pub remove_first: bool,
    pub throttle: Throttle,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        RestoreOptions {
            remove_first: true,
            throttle: Throttle::default(),
        }
    }
}


/// A restore entry that could not be connected.
#[derive(Debug)]
pub struct FailedEntry {
    pub sender: String,
    pub dest: String,
    pub error: RouteError,
}


#[derive(Debug, Default)]
pub struct RestoreReport {
    pub removal: Option<RemovalReport>,
    pub connected: Vec<Subscription>,
    /// Entries whose connection already existed, e.g. repeated peers.
    pub already_present: usize,
    pub failed: Vec<FailedEntry>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.removal.as_ref().map_or(true, RemovalReport::is_clean)
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        if let Some(removal) = &self.removal {
            out.push_str(&removal.summary());
            out.push('\n');
        }
        out.push_str(&format!("restored {} connection(s)", self.connected.len()));
        if self.already_present > 0 {
            out.push_str(&format!(", {} already present", self.already_present));
        }
        out.push_str(&format!(", failed {}", self.failed.len()));
        for entry in &self.failed {
            out.push_str(&format!("\n  {} -> {}: {}", entry.sender, entry.dest, entry.error));
        }
        out
    }
}


/// Render the graph's outbound edges as a TOML document.
pub fn serialize(graph: &ConnectionGraph) -> Result<String> {
    Snapshot::from_graph(graph).to_toml()
}


/// Parse `document` and re-create its connections.
///
/// Parsing happens before anything is touched; a malformed document
/// returns `SnapshotFormat` with the sequencer unchanged.
pub fn deserialize<S: Sequencer + ?Sized>(
    seq: &mut S,
    graph: &ConnectionGraph,
    document: &str,
    options: RestoreOptions,
) -> Result<RestoreReport> {
    let snapshot = Snapshot::parse(document)?;
    Ok(restore(seq, graph, &snapshot, options))
}


/// Re-create every entry of `snapshot`, pacing connect calls with the
/// throttle. Failed entries are collected; the rest still run.
pub fn restore<S: Sequencer + ?Sized>(
    seq: &mut S,
    graph: &ConnectionGraph,
    snapshot: &Snapshot,
    mut options: RestoreOptions,
) -> RestoreReport {
    let mut report = RestoreReport::default();
    let mut manager = SubscriptionManager::new(seq, graph);

    if options.remove_first {
        report.removal = Some(manager.remove_all());
    }

    for (client, port, peer) in snapshot.entries() {
        let sender = format!("{}:{}", client, port);
        options.throttle.pace();
        match manager.connect(&sender, peer, SubscriptionAttrs::default()) {
            Ok(sub) => {
                debug!(%sender, dest = peer, "restored");
                report.connected.push(sub);
            }
            Err(RouteError::AlreadySubscribed) => {
                debug!(%sender, dest = peer, "already connected");
                report.already_present += 1;
            }
            Err(error) => {
                warn!(%sender, dest = peer, %error, "failed to restore connection");
                report.failed.push(FailedEntry {
                    sender,
                    dest: peer.to_string(),
                    error,
                });
            }
        }
    }

    info!(
        connected = report.connected.len(),
        failed = report.failed.len(),
        "snapshot restored"
    );
    report
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::MemorySequencer;
    use crate::types::{Addr, Capabilities, ClientKind};

    fn caps() -> Capabilities {
        Capabilities::READ | Capabilities::WRITE | Capabilities::SUBS_READ | Capabilities::SUBS_WRITE
    }

    fn seq() -> MemorySequencer {
        MemorySequencer::new()
            .with_client(20, "A", ClientKind::User)
            .with_port(20, 0, "p0", caps())
            .with_port(20, 1, "idle", caps())
            .with_client(21, "B", ClientKind::User)
            .with_port(21, 0, "p0", caps())
            .with_client(22, "Midi Through", ClientKind::Kernel)
            .with_port(22, 0, "Port-0", caps())
    }

    fn quick() -> RestoreOptions {
        RestoreOptions {
            remove_first: true,
            throttle: Throttle::none(),
        }
    }

    #[test]
    fn serialize_records_outbound_edges_only() {
        let s = seq()
            .with_subscription(Addr::new(20, 0), Addr::new(21, 0))
            .with_subscription(Addr::new(20, 0), Addr::new(22, 0));
        let doc = serialize(&ConnectionGraph::build(&s)).unwrap();
        let parsed: toml::Table = toml::from_str(&doc).unwrap();

        assert_eq!(parsed.len(), 1);
        let ports = parsed["A"].as_table().unwrap();
        assert_eq!(ports.len(), 1);
        let peers: Vec<&str> = ports["p0"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(peers, vec!["B:p0", "Midi Through:Port-0"]);
    }

    #[test]
    fn empty_graph_serializes_to_empty_document() {
        let doc = serialize(&ConnectionGraph::build(&seq())).unwrap();
        assert!(doc.trim().is_empty());
        assert!(Snapshot::parse(&doc).unwrap().is_empty());
    }

    #[test]
    fn entries_follow_document_order() {
        let snap = Snapshot::parse(
            r#"
[B]
p0 = ["A:p0"]

[A]
p0 = ["B:p0", "Midi Through:Port-0"]
"#,
        )
        .unwrap();
        let entries: Vec<_> = snap.entries().collect();
        assert_eq!(
            entries,
            vec![
                ("B", "p0", "A:p0"),
                ("A", "p0", "B:p0"),
                ("A", "p0", "Midi Through:Port-0"),
            ]
        );
        assert_eq!(snap.len(), 3);
    }

    #[test]
    fn malformed_document_aborts_before_mutation() {
        let mut s = seq().with_subscription(Addr::new(20, 0), Addr::new(21, 0));
        let graph = ConnectionGraph::build(&s);
        let result = deserialize(&mut s, &graph, "[A\np0 = 1", quick());
        assert!(matches!(result, Err(RouteError::SnapshotFormat(_))));
        assert_eq!(s.edges().len(), 1);
    }

    #[test]
    fn wrong_shape_is_format_error() {
        let mut s = seq();
        let graph = ConnectionGraph::build(&s);
        let result = deserialize(&mut s, &graph, "[A]\np0 = \"B:p0\"", quick());
        assert!(matches!(result, Err(RouteError::SnapshotFormat(_))));
    }

    #[test]
    fn restore_replaces_existing_edges() {
        let mut s = seq().with_subscription(Addr::new(21, 0), Addr::new(22, 0));
        let graph = ConnectionGraph::build(&s);
        let report = deserialize(&mut s, &graph, "[A]\np0 = [\"B:p0\"]\n", quick()).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.removal.as_ref().unwrap().removed.len(), 1);
        assert_eq!(s.edges(), vec![(Addr::new(20, 0), Addr::new(21, 0))]);
    }

    #[test]
    fn keep_existing_skips_removal() {
        let mut s = seq().with_subscription(Addr::new(21, 0), Addr::new(22, 0));
        let graph = ConnectionGraph::build(&s);
        let options = RestoreOptions {
            remove_first: false,
            ..quick()
        };
        let report = deserialize(&mut s, &graph, "[A]\np0 = [\"B:p0\"]\n", options).unwrap();
        assert!(report.removal.is_none());
        assert_eq!(s.edges().len(), 2);
    }

    #[test]
    fn failed_entries_do_not_stop_restore() {
        let mut s = seq();
        let graph = ConnectionGraph::build(&s);
        let doc = r#"
[A]
p0 = ["Ghost:p0", "B:p0"]
idle = ["Midi Through:Port-0"]
"#;
        let report = deserialize(&mut s, &graph, doc, quick()).unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].dest, "Ghost:p0");
        assert_eq!(report.connected.len(), 2);
        assert!(report.summary().contains("A:p0 -> Ghost:p0"));
    }

    #[test]
    fn repeated_peer_counts_as_present() {
        let original = seq()
            .with_subscription(Addr::new(20, 0), Addr::new(21, 0))
            .with_subscription(Addr::new(20, 0), Addr::new(21, 0));
        let doc = serialize(&ConnectionGraph::build(&original)).unwrap();
        assert!(doc.contains(r#"p0 = ["B:p0", "B:p0"]"#));

        let mut s = seq();
        let graph = ConnectionGraph::build(&s);
        let report = deserialize(&mut s, &graph, &doc, quick()).unwrap();

        assert!(report.is_clean(), "{}", report.summary());
        assert_eq!(report.connected.len(), 1);
        assert_eq!(report.already_present, 1);
        assert!(report.summary().contains("1 already present"));
        assert_eq!(s.edges(), vec![(Addr::new(20, 0), Addr::new(21, 0))]);
    }

    #[test]
    fn names_with_inner_quotes_restore() {
        let mut s = seq()
            .with_client(40, "Bob's \"Box\"", ClientKind::User)
            .with_port(40, 0, "out 1", caps());
        let graph = ConnectionGraph::build(&s);
        let doc = r#"
["Bob's \"Box\""]
"out 1" = ["B:'p0'"]
"#;
        let report = deserialize(&mut s, &graph, doc, quick()).unwrap();

        assert!(report.is_clean(), "{}", report.summary());
        assert_eq!(s.edges(), vec![(Addr::new(40, 0), Addr::new(21, 0))]);
    }

    #[test]
    fn restore_paces_every_connect() {
        let mut s = seq();
        let graph = ConnectionGraph::build(&s);
        let snap = Snapshot::parse("[A]\np0 = [\"B:p0\", \"Midi Through:Port-0\"]").unwrap();
        let options = RestoreOptions {
            remove_first: false,
            throttle: Throttle::new(std::time::Duration::from_millis(10)),
        };
        let start = std::time::Instant::now();
        let report = restore(&mut s, &graph, &snap, options);
        assert_eq!(report.connected.len(), 2);
        assert!(start.elapsed() >= std::time::Duration::from_millis(10));
    }
}
