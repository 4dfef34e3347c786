//! seqconnect core: routing between ALSA sequencer ports.
//!
//! Builds a snapshot of the live connection graph, resolves `client:port`
//! tokens against it, creates and removes subscriptions, and saves/restores
//! the whole graph as a TOML document. The sequencer itself is reached
//! through the [`sequencer::Sequencer`] trait.

pub mod command;
pub mod error;
pub mod graph;
pub mod response;
pub mod routing;
pub mod sequencer;
pub mod sys;
pub mod types;

pub use error::{Result, RouteError};
