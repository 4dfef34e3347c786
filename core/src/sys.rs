use tracing::debug;

use crate::command::Command;
use crate::graph::{listing, ConnectionGraph, PortFilter};
use crate::response::Response;
use crate::routing::snapshot::{self, RestoreOptions};
use crate::routing::{SubscriptionManager, Throttle};
use crate::sequencer::Sequencer;
use crate::types::{Settings, SubscriptionAttrs};
use crate::RouteError;


/// Central runtime. Owns the sequencer handle and the graph snapshot taken
/// when it was created; dropping `Sys` closes the handle.
pub struct Sys<S: Sequencer> {
    seq: S,
    graph: ConnectionGraph,
    settings: Settings,
}


impl<S: Sequencer> Sys<S> {
    pub fn new(seq: S, settings: Settings) -> Sys<S> {
        let graph = ConnectionGraph::build(&seq);
        Sys {
            seq,
            graph,
            settings,
        }
    }

    /// The snapshot taken at construction. Not refreshed by mutations.
    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    pub fn sequencer(&self) -> &S {
        &self.seq
    }

    pub fn into_sequencer(self) -> S {
        self.seq
    }

    /// The single dispatch method.
    pub fn execute(&mut self, cmd: Command) -> Response {
        debug!(?cmd, "dispatch");
        match cmd {
            Command::Connect {
                sender,
                dest,
                attrs,
            } => self.cmd_connect(&sender, &dest, attrs),
            Command::Disconnect {
                sender,
                dest,
                attrs,
            } => self.cmd_disconnect(&sender, &dest, attrs),
            Command::List { filter, json } => self.cmd_list(filter, json),
            Command::Ports { filter } => Response::ok(listing::render_ports(&self.graph, filter)),
            Command::RemoveAll => self.cmd_remove_all(),
            Command::Serialize => snapshot::serialize(&self.graph).into(),
            Command::Deserialize { path, remove_first } => self.cmd_deserialize(&path, remove_first),
        }
    }

    // -----------------------------------------------------------------------
    // Single subscriptions
    // -----------------------------------------------------------------------

    fn cmd_connect(&mut self, sender: &str, dest: &str, attrs: SubscriptionAttrs) -> Response {
        SubscriptionManager::new(&mut self.seq, &self.graph)
            .connect(sender, dest, attrs)
            .map(|_| String::new())
            .into()
    }

    fn cmd_disconnect(&mut self, sender: &str, dest: &str, attrs: SubscriptionAttrs) -> Response {
        SubscriptionManager::new(&mut self.seq, &self.graph)
            .disconnect(sender, dest, attrs)
            .map(|_| String::new())
            .into()
    }

    // -----------------------------------------------------------------------
    // Listings
    // -----------------------------------------------------------------------

    fn cmd_list(&self, filter: PortFilter, json: bool) -> Response {
        if json {
            listing::render_json(&self.graph, filter).into()
        } else {
            Response::ok(listing::render_list(&self.graph, filter))
        }
    }

    // -----------------------------------------------------------------------
    // Bulk
    // -----------------------------------------------------------------------

    fn cmd_remove_all(&mut self) -> Response {
        let report = SubscriptionManager::new(&mut self.seq, &self.graph).remove_all();
        if report.is_clean() {
            Response::ok("")
        } else {
            let mut message = report.summary();
            for (sub, e) in &report.failed {
                message.push_str(&format!("\n  {}: {}", sub, e));
            }
            Response::error(message)
        }
    }

    fn cmd_deserialize(&mut self, path: &std::path::Path, remove_first: bool) -> Response {
        let document = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(source) => {
                return Response::error(
                    RouteError::Io {
                        path: path.display().to_string(),
                        source,
                    }
                    .to_string(),
                )
            }
        };
        let options = RestoreOptions {
            remove_first,
            throttle: Throttle::new(self.settings.settle_delay()),
        };
        match snapshot::deserialize(&mut self.seq, &self.graph, &document, options) {
            Ok(report) if report.is_clean() => Response::ok(""),
            Ok(report) => Response::error(report.summary()),
            Err(e) => Response::error(e.to_string()),
        }
    }
}
