//! Address resolver: translates `client:port` tokens into sequencer addresses.
//!
//! Token grammar:
//!
//! - `client:port` or `client.port`: each part is an id or a name,
//!   optionally wrapped in `'` or `"` quotes.
//! - `client`: the client's first port.
//! - `:port`: the first port with that name across all clients.
//!
//! Numeric parts are tried as ids before names. When several clients or
//! ports share a name, the first in enumeration order wins.

use tracing::debug;

use crate::error::{Result, RouteError};
use crate::graph::{Client, ConnectionGraph, Port};
use crate::types::Addr;


/// How one part of a token picks a client or port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    ById(i32),
    ByName(String),
    Default,
}

impl Selector {
    fn parse(part: &str) -> Selector {
        let part = strip_quotes(part);
        if part.is_empty() {
            Selector::Default
        } else if let Ok(id) = part.parse::<i32>() {
            Selector::ById(id)
        } else {
            Selector::ByName(part.to_string())
        }
    }

    /// The literal text of the selector, used when a bare port is matched by name.
    fn as_name(&self) -> Option<String> {
        match self {
            Selector::ById(id) => Some(id.to_string()),
            Selector::ByName(name) => Some(name.clone()),
            Selector::Default => None,
        }
    }
}


/// A parsed token: one selector for the client, one for the port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressToken {
    pub client: Selector,
    pub port: Selector,
}


/// Split a token into client and port selectors.
///
/// Returns `None` for tokens with more than one separator.
pub fn parse(token: &str) -> Option<AddressToken> {
    let token = token.trim();
    let (client, port) = match token.find([':', '.']) {
        Some(at) => (&token[..at], &token[at + 1..]),
        None => (token, ""),
    };
    if port.contains([':', '.']) {
        return None;
    }
    Some(AddressToken {
        client: Selector::parse(client),
        port: Selector::parse(port),
    })
}


/// Resolve a token against the graph.
pub fn resolve(token: &str, graph: &ConnectionGraph) -> Result<Addr> {
    let not_found = || RouteError::AddressNotFound(token.to_string());
    let parsed = parse(token).ok_or_else(not_found)?;

    let addr = match parsed.client {
        Selector::Default => {
            let name = parsed.port.as_name().ok_or_else(not_found)?;
            graph
                .ports()
                .find(|p| p.name == name)
                .map(Port::addr)
                .ok_or_else(not_found)?
        }
        ref selector => {
            let client = find_client(graph, selector).ok_or_else(not_found)?;
            find_port(client, &parsed.port)
                .map(Port::addr)
                .ok_or_else(not_found)?
        }
    };

    debug!(token, %addr, "address resolved");
    Ok(addr)
}


fn find_client<'a>(graph: &'a ConnectionGraph, selector: &Selector) -> Option<&'a Client> {
    match selector {
        Selector::ById(id) => graph.clients().iter().find(|c| c.id == *id),
        Selector::ByName(name) => graph.clients().iter().find(|c| &c.name == name),
        Selector::Default => None,
    }
}

fn find_port<'a>(client: &'a Client, selector: &Selector) -> Option<&'a Port> {
    match selector {
        Selector::Default => client.ports.first(),
        Selector::ById(index) => client.ports.iter().find(|p| p.index == *index),
        Selector::ByName(name) => client.ports.iter().find(|p| &p.name == name),
    }
}

/// Drop one pair of matching outer quotes. Unpaired quotes belong to the name.
fn strip_quotes(part: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = part.strip_prefix(quote).and_then(|p| p.strip_suffix(quote)) {
            return inner;
        }
    }
    part
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
