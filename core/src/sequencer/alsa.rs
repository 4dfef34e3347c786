//! ALSA backend: wraps `alsa::seq::Seq`.

use std::ffi::CString;

use alsa::seq::{self, ClientIter, PortIter, PortSubscribe, PortSubscribeIter, QuerySubsType, Seq};
use tracing::debug;

use crate::error::{Result, RouteError};
use crate::sequencer::Sequencer;
use crate::types::{
    Addr, Capabilities, ClientInfo, ClientKind, PortInfo, QueryDirection, SubscriberInfo,
    Subscription, SubscriptionAttrs, Settings,
};

/// User clients are allocated from the dynamic range starting here.
const FIRST_USER_CLIENT: i32 = 128;


/// A duplex handle on the ALSA sequencer, closed when dropped.
pub struct AlsaSequencer {
    seq: Seq,
}


impl AlsaSequencer {
    /// Open `settings.sequencer` in duplex mode and register as `settings.client_name`.
    pub fn open(settings: &Settings) -> Result<AlsaSequencer> {
        let name = CString::new(settings.sequencer.as_str())
            .map_err(|e| RouteError::SequencerUnavailable(e.to_string()))?;
        let seq = Seq::open(Some(name.as_c_str()), None, false)
            .map_err(|e| RouteError::SequencerUnavailable(e.to_string()))?;

        let client_name = CString::new(settings.client_name.as_str())
            .map_err(|e| RouteError::SequencerUnavailable(e.to_string()))?;
        seq.set_client_name(&client_name)
            .map_err(|e| RouteError::SequencerUnavailable(format!("can't set client info: {}", e)))?;

        debug!(sequencer = %settings.sequencer, client = %settings.client_name, "sequencer opened");
        Ok(AlsaSequencer { seq })
    }
}


impl Drop for AlsaSequencer {
    fn drop(&mut self) {
        debug!("closing sequencer");
    }
}


fn to_addr(a: seq::Addr) -> Addr {
    Addr::new(a.client, a.port)
}

fn from_addr(a: Addr) -> seq::Addr {
    seq::Addr {
        client: a.client,
        port: a.port,
    }
}

fn client_kind(id: i32) -> ClientKind {
    if id >= FIRST_USER_CLIENT {
        ClientKind::User
    } else {
        ClientKind::Kernel
    }
}

fn convert_client(c: &seq::ClientInfo) -> ClientInfo {
    let id = c.get_client();
    ClientInfo {
        id,
        name: c.get_name().unwrap_or("").to_string(),
        kind: client_kind(id),
    }
}

fn convert_port(p: &seq::PortInfo) -> PortInfo {
    PortInfo {
        index: p.get_port(),
        name: p.get_name().unwrap_or("").to_string(),
        capabilities: Capabilities::from_bits(p.get_capability().bits()),
    }
}

fn failed(e: alsa::Error) -> RouteError {
    RouteError::SubscriptionFailed(e.to_string())
}


impl Sequencer for AlsaSequencer {
    fn clients(&self) -> Vec<ClientInfo> {
        ClientIter::new(&self.seq).map(|c| convert_client(&c)).collect()
    }

    fn ports(&self, client: i32) -> Vec<PortInfo> {
        PortIter::new(&self.seq, client)
            .map(|p| convert_port(&p))
            .collect()
    }

    fn client_info(&self, client: i32) -> Option<ClientInfo> {
        self.seq
            .get_any_client_info(client)
            .ok()
            .map(|c| convert_client(&c))
    }

    fn port_info(&self, addr: Addr) -> Option<PortInfo> {
        self.seq
            .get_any_port_info(from_addr(addr))
            .ok()
            .map(|p| convert_port(&p))
    }

    fn query_subscribers(
        &self,
        root: Addr,
        direction: QueryDirection,
        index: usize,
    ) -> Option<SubscriberInfo> {
        let kind = match direction {
            QueryDirection::Read => QuerySubsType::READ,
            QueryDirection::Write => QuerySubsType::WRITE,
        };
        PortSubscribeIter::new(&self.seq, from_addr(root), kind)
            .nth(index)
            .map(|c| {
                let peer = match direction {
                    QueryDirection::Read => c.get_dest(),
                    QueryDirection::Write => c.get_sender(),
                };
                SubscriberInfo {
                    addr: to_addr(peer),
                    attrs: SubscriptionAttrs {
                        queue: c.get_queue(),
                        exclusive: c.get_exclusive(),
                        time_update: c.get_time_update(),
                        time_real: c.get_time_real(),
                    },
                }
            })
    }

    fn subscribe(&mut self, sub: &Subscription) -> Result<()> {
        let subs = PortSubscribe::empty().map_err(failed)?;
        subs.set_sender(from_addr(sub.sender));
        subs.set_dest(from_addr(sub.dest));
        subs.set_queue(sub.attrs.queue);
        subs.set_exclusive(sub.attrs.exclusive);
        subs.set_time_update(sub.attrs.time_update);
        subs.set_time_real(sub.attrs.time_real);
        self.seq.subscribe_port(&subs).map_err(failed)
    }

    fn unsubscribe(&mut self, sub: &Subscription) -> Result<()> {
        self.seq
            .unsubscribe_port(from_addr(sub.sender), from_addr(sub.dest))
            .map_err(failed)
    }
}
