//! Sequencer service contract.
//!
//! Everything the core needs from the sequencer goes through [`Sequencer`]:
//! client and port enumeration, paginated subscriber queries, and the
//! subscribe/unsubscribe primitives. Opening a handle is the backend's
//! constructor; closing it is `Drop`.

#[cfg(feature = "alsa")]
pub mod alsa;
pub mod memory;

#[cfg(feature = "alsa")]
pub use self::alsa::AlsaSequencer;
pub use memory::MemorySequencer;

use crate::error::Result;
use crate::types::{Addr, ClientInfo, PortInfo, QueryDirection, SubscriberInfo, Subscription};


pub trait Sequencer {
    /// All clients, in enumeration order.
    fn clients(&self) -> Vec<ClientInfo>;

    /// All ports of `client`, in enumeration order.
    fn ports(&self, client: i32) -> Vec<PortInfo>;

    fn client_info(&self, client: i32) -> Option<ClientInfo>;

    fn port_info(&self, addr: Addr) -> Option<PortInfo>;

    /// Subscriber at position `index` of `root`'s subscription list, or
    /// `None` once `index` is past the end.
    fn query_subscribers(
        &self,
        root: Addr,
        direction: QueryDirection,
        index: usize,
    ) -> Option<SubscriberInfo>;

    fn subscribe(&mut self, sub: &Subscription) -> Result<()>;

    fn unsubscribe(&mut self, sub: &Subscription) -> Result<()>;

    /// Walk `root`'s subscription list from index 0 until the query fails.
    fn subscribers(&self, root: Addr, direction: QueryDirection) -> Vec<SubscriberInfo> {
        let mut out = Vec::new();
        let mut index = 0;
        while let Some(info) = self.query_subscribers(root, direction, index) {
            out.push(info);
            index += 1;
        }
        out
    }

    /// True if `sub.sender` already feeds `sub.dest`. Attributes are not compared.
    fn subscription_exists(&self, sub: &Subscription) -> bool {
        self.subscribers(sub.sender, QueryDirection::Read)
            .iter()
            .any(|s| s.addr == sub.dest)
    }
}
