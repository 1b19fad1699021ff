//! Adapters: in-memory persistence and the in-process channel transport.

pub mod channel_gateway;
pub mod memory_store;

pub use channel_gateway::ChannelGateway;
pub use memory_store::MemoryLedgerStore;
