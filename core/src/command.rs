//! Command: one invocation's worth of work for [`crate::sys::Sys`].

use std::path::PathBuf;

use crate::graph::PortFilter;
use crate::types::SubscriptionAttrs;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // -----------------------------------------------------------------
    // Single subscriptions
    // -----------------------------------------------------------------

    Connect {
        sender: String,
        dest: String,
        attrs: SubscriptionAttrs,
    },

    Disconnect {
        sender: String,
        dest: String,
        attrs: SubscriptionAttrs,
    },

    // -----------------------------------------------------------------
    // Listings
    // -----------------------------------------------------------------

    List {
        filter: PortFilter,
        json: bool,
    },

    Ports {
        filter: PortFilter,
    },

    // -----------------------------------------------------------------
    // Bulk
    // -----------------------------------------------------------------

    RemoveAll,

    Serialize,

    Deserialize {
        path: PathBuf,
        remove_first: bool,
    },
}
