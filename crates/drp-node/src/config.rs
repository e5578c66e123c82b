// Path: crates/drp-node/src/config.rs
//! The node's external configuration surface: one TOML file covering
//! transport, the two interval runners, finality quorum, logging, and
//! where to find (or how to generate) this node's keypair.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use drp_finality::FinalityConfig;

/// Transport-level settings for the libp2p gossipsub adapter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// The multiaddr to listen on, e.g. `/ip4/0.0.0.0/tcp/4001`.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "/ip4/0.0.0.0/tcp/0".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// How often the discovery interval runner re-announces this node.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Seconds between `DRP_DISCOVERY` broadcasts.
    #[serde(default = "default_discovery_interval_secs")]
    pub interval_secs: u64,
}

fn default_discovery_interval_secs() -> u64 {
    30
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_discovery_interval_secs(),
        }
    }
}

/// How often the reconnect interval runner re-syncs joined objects.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Seconds between `SYNC` sweeps over every joined object.
    #[serde(default = "default_reconnect_interval_secs")]
    pub interval_secs: u64,
}

fn default_reconnect_interval_secs() -> u64 {
    15
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_reconnect_interval_secs(),
        }
    }
}

/// Logging verbosity, layered on top of `RUST_LOG` if set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `drp_node=debug,info`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Where this node's signing identity comes from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeychainConfig {
    /// Path to a persisted keypair file. If it doesn't exist, a fresh
    /// one is generated and written there.
    pub key_path: PathBuf,
}

/// The full external configuration for a `drp-node` process, loaded
/// from TOML (see [`crate::bin`] for the CLI entrypoint that reads it).
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DrpNodeConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub finality: FinalityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub keychain: Option<KeychainConfig>,
}

impl DrpNodeConfig {
    /// Parses a config from its TOML source text.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_falls_back_to_defaults() {
        let config = DrpNodeConfig::from_toml("").unwrap();
        assert_eq!(config.network.listen_addr, "/ip4/0.0.0.0/tcp/0");
        assert_eq!(config.discovery.interval_secs, 30);
        assert_eq!(config.reconnect.interval_secs, 15);
        assert_eq!(config.finality.min_signers, 1);
        assert!(config.keychain.is_none());
    }

    #[test]
    fn partial_overrides_merge_with_defaults() {
        let config = DrpNodeConfig::from_toml(
            r#"
            [network]
            listen_addr = "/ip4/127.0.0.1/tcp/4001"

            [finality]
            signer_ratio = 0.5
            min_signers = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.network.listen_addr, "/ip4/127.0.0.1/tcp/4001");
        assert_eq!(config.finality.signer_ratio, 0.5);
        assert_eq!(config.discovery.interval_secs, 30);
    }
}
