//! Mortgage-Chain node entry point.
//!
//! Starts a single verifier node over in-memory storage and the
//! in-process gateway. A deployment replaces the gateway with a real
//! transport adapter and the store with a durable one; the engine is
//! unaware of the difference.

use anyhow::Result;
use ledger_telemetry::{init_logging, TelemetryConfig};
use node_runtime::{ChannelGateway, LedgerContext, LedgerNode, MemoryLedgerStore, NodeConfig};
use shared_crypto::Ed25519KeyPair;
use shared_types::SystemTimeSource;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

fn main() -> Result<()> {
    init_logging(&TelemetryConfig::from_env())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(run())
}

async fn run() -> Result<()> {
    let identity = Arc::new(Ed25519KeyPair::generate());
    let peer_id = identity.public_key_bytes();
    info!(peer = %hex::encode(peer_id), "starting mortgage-chain node");

    let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
    let gateway = Arc::new(ChannelGateway::new(peer_id));
    // Loop our own inbox back so self-addressed traffic is deliverable.
    gateway.connect(peer_id, inbox_tx);

    let mut config = NodeConfig::default();
    config.verifiers = vec![peer_id];

    let context = LedgerContext::new(
        config,
        identity,
        Box::new(MemoryLedgerStore::new()),
        gateway,
        Arc::new(SystemTimeSource),
    )?;

    LedgerNode::new(context, inbox_rx).run().await;
    Ok(())
}
