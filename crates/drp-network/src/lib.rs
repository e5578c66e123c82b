// Path: crates/drp-network/src/lib.rs
#![cfg_attr(
    not(test),
    deny(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)
)]

//! The wire envelope and the network transport seam.
//!
//! [`Message`] is the SCALE-encoded envelope every peer exchanges.
//! [`NetworkAdapter`] is the trait `drp-node` programs against;
//! [`Libp2pNetwork`] is the gossipsub-backed production adapter, with
//! every object getting its own topic and a shared topic for the two
//! discovery message types.

mod adapter;
mod error;
mod libp2p_net;
mod message;

pub use adapter::NetworkAdapter;
pub use error::NetworkError;
pub use libp2p_net::Libp2pNetwork;
pub use message::{Message, MessageType};
