//! Core types - pure abstractions shared across the codebase.

mod envelope;
mod icon;
mod link;
pub mod locality;
mod reachability;
mod state;

pub use envelope::Envelope;
pub use icon::IconResult;
pub use link::{LinkAddress, LinkRecord};
pub use locality::{
    Basis, ClientSignals, ConnectionMedium, Locality, LocalityVerdict, classify,
    classify_client_network, classify_ip, is_internal_url, is_private_host,
};
pub use reachability::{Reachability, ReachabilityVerdict};
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
