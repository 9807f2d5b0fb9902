//! Port trait for the chain event source.
//!
//! Implementations live in the infrastructure layer (e.g.,
//! `conductor-substrate`) and flatten finalized blocks into a stream of
//! events in chain order.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::ChainResult;
use crate::models::{BlockHash, BlockMetadata};

/// A decoded runtime event with positional arguments.
#[derive(Debug, Clone)]
pub struct ChainEvent {
    /// Pallet name as reported by runtime metadata (e.g., "GeneticAnalysts").
    pub pallet: String,
    /// Event variant name.
    pub name: String,
    /// Event fields in declaration order, as JSON.
    pub args: Vec<serde_json::Value>,
    pub block: BlockMetadata,
}

/// Stream of chain events, ordered by `(block_number, event_index)`.
pub type ChainEventStream = Pin<Box<dyn Stream<Item = ChainResult<ChainEvent>> + Send>>;

/// Port trait for the chain event source.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Get the genesis hash of the connected chain.
    async fn genesis_hash(&self) -> ChainResult<BlockHash>;

    /// Subscribe to events of finalized blocks.
    ///
    /// The stream ends or yields an error when the subscription drops;
    /// callers resubscribe.
    async fn subscribe_events(&self) -> ChainResult<ChainEventStream>;
}
