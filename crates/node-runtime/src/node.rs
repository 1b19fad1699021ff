//! Single-threaded event loop.
//!
//! The loop owns the [`LedgerContext`] exclusively. Inbound messages and
//! timer ticks are the only suspension points; each arm runs a synchronous
//! ledger operation to completion before the next is taken, so no internal
//! locking exists anywhere in the engine.

use crate::context::LedgerContext;
use shared_types::entities::PeerId;
use shared_types::LedgerMessage;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

/// Sweep period for the request cache, in milliseconds.
const SWEEP_INTERVAL_MS: u64 = 500;

/// A running node: context plus inbound mailbox.
pub struct LedgerNode {
    context: LedgerContext,
    inbox: UnboundedReceiver<(PeerId, LedgerMessage)>,
}

impl LedgerNode {
    /// Create a node draining the given mailbox.
    pub fn new(context: LedgerContext, inbox: UnboundedReceiver<(PeerId, LedgerMessage)>) -> Self {
        Self { context, inbox }
    }

    /// Shared access to the context (state queries).
    pub fn context(&self) -> &LedgerContext {
        &self.context
    }

    /// Exclusive access to the context (proposals, queries).
    pub fn context_mut(&mut self) -> &mut LedgerContext {
        &mut self.context
    }

    /// Run until the inbound channel closes.
    pub async fn run(mut self) {
        let mut production =
            tokio::time::interval(Duration::from_secs(self.context.production_tick_secs()));
        let mut sweep = tokio::time::interval(Duration::from_millis(SWEEP_INTERVAL_MS));
        let mut commit =
            tokio::time::interval(Duration::from_secs(self.context.commit_interval_secs()));

        info!("[runtime] event loop started");
        loop {
            tokio::select! {
                inbound = self.inbox.recv() => {
                    match inbound {
                        Some((peer, message)) => {
                            self.context.handle_message(peer, message);
                            // Already logged; the binary has no embedder
                            // consuming them.
                            self.context.drain_events();
                        }
                        None => break,
                    }
                }
                _ = production.tick() => self.context.production_tick(),
                _ = sweep.tick() => self.context.sweep_requests(),
                _ = commit.tick() => self.context.commit_store(),
            }
        }
        info!("[runtime] inbound channel closed, event loop stopping");
    }
}
