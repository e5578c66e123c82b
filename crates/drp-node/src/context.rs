// Path: crates/drp-node/src/context.rs
//! Shared handles every per-object actor and Node-level handler needs,
//! bundled so they don't have to be threaded through one parameter at
//! a time.

use std::sync::Arc;

use drp_crypto::Keychain;
use drp_hashgraph::ValidationConfig;
use drp_network::NetworkAdapter;

/// The node-wide dependencies a message or local-write handler needs:
/// who we are, how to reach the network, and how strict to be about
/// incoming vertices.
#[derive(Clone)]
pub struct DispatchCx {
    pub keychain: Arc<dyn Keychain>,
    pub network: Arc<dyn NetworkAdapter>,
    pub validation: ValidationConfig,
}

impl DispatchCx {
    pub fn new(keychain: Arc<dyn Keychain>, network: Arc<dyn NetworkAdapter>, validation: ValidationConfig) -> Self {
        Self {
            keychain,
            network,
            validation,
        }
    }
}
