// Path: crates/drp-node/src/bin/drp_node.rs
//! Runs a single `drp-node` process hosting one demo object: writes
//! governed by the built-in `ObjectAcl`, business state a last-writer-
//! wins register anyone the ACL names a writer can set. Uses whatever
//! config is on disk (or the defaults) until `Ctrl-C`.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use libp2p::{identity, Multiaddr};
use tracing::info;

use drp_acl::ObjectAcl;
use drp_codec::Value;
use drp_crypto::{Keychain, SoftKeychain};
use drp_hashgraph::ValidationConfig;
use drp_network::Libp2pNetwork;
use drp_node::{discovery_runner, reconnect_runner, DrpNodeConfig, Node};
use drp_object::{Drp, DrpError, OpContext};
use drp_types::{ObjectId, State};

/// A last-writer-wins register: the only business `Drp` this demo
/// binary hosts, so `drp-node`'s generic pipeline has something
/// concrete besides `ObjectAcl` to drive end to end.
#[derive(Clone, Default)]
struct RegisterDrp {
    value: Option<i64>,
}

impl Drp for RegisterDrp {
    fn apply(&mut self, _ctx: &OpContext, op_type: &str, args: &[Value]) -> Result<(), DrpError> {
        match op_type {
            "set" => {
                let Some(Value::Int(v)) = args.first() else {
                    return Err(DrpError::MalformedArguments {
                        operation: "set".into(),
                        reason: "expected one Int argument".into(),
                    });
                };
                self.value = Some(*v);
                Ok(())
            }
            other => Err(DrpError::UnknownOperation(other.into())),
        }
    }

    fn query(&self, query_type: &str, _args: &[Value]) -> Result<Value, DrpError> {
        match query_type {
            "get" => Ok(self.value.map(Value::Int).unwrap_or(Value::Null)),
            other => Err(DrpError::UnknownOperation(other.into())),
        }
    }

    fn state(&self) -> State {
        self.value.map(Value::Int).unwrap_or(Value::Null)
    }

    fn load_state(&mut self, state: &State) -> Result<(), DrpError> {
        self.value = match state {
            Value::Int(v) => Some(*v),
            Value::Null => None,
            other => return Err(DrpError::InvalidState(format!("{other:?}"))),
        };
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(name = "drp-node", about = "Runs a DRP node")]
struct Args {
    /// Path to a TOML config file. Missing sections fall back to defaults.
    #[arg(long, env = "DRP_NODE_CONFIG")]
    config: Option<PathBuf>,

    /// Object id to join on startup.
    #[arg(long, env = "DRP_NODE_OBJECT", default_value = "demo-object")]
    object_id: String,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DrpNodeConfig> {
    match path {
        Some(path) => {
            let source = fs::read_to_string(path)?;
            Ok(DrpNodeConfig::from_toml(&source)?)
        }
        None => Ok(DrpNodeConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    drp_telemetry::init_tracing()?;
    if let Err(e) = drp_telemetry::prometheus::install_global() {
        tracing::warn!(error = %e, "prometheus metrics already installed");
    }

    // Persisting a keychain to `config.keychain.key_path` is out of
    // scope here; see DESIGN.md for the accepted simplification.
    let keychain = Arc::new(SoftKeychain::generate()?);
    info!(peer_id = %keychain.peer_id(), "generated node identity");

    let libp2p_keypair = identity::Keypair::generate_ed25519();
    let listen_addr: Multiaddr = config.network.listen_addr.parse()?;
    let network = Arc::new(Libp2pNetwork::new(libp2p_keypair, listen_addr)?);

    let node = Node::<ObjectAcl, RegisterDrp>::new(
        keychain.clone(),
        network,
        config.finality,
        ValidationConfig::default(),
    );
    node.start().await?;

    let object_id = ObjectId::new(args.object_id.clone())?;
    node.join_object(
        object_id.clone(),
        ObjectAcl::new(keychain.peer_id().as_str()),
        RegisterDrp::default(),
    )
    .await?;
    info!(object_id = %object_id, "joined object");

    let discovery = discovery_runner(node.clone(), Duration::from_secs(config.discovery.interval_secs));
    let reconnect = reconnect_runner(node.clone(), vec![object_id], Duration::from_secs(config.reconnect.interval_secs));

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    discovery.stop();
    reconnect.stop();
    node.stop().await?;
    Ok(())
}
