//! Substrate RPC client with dynamic metadata decoding.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use subxt::backend::chain_head::{ChainHeadBackend, ChainHeadBackendBuilder};
use subxt::backend::rpc::RpcClient;
use subxt::blocks::Block;
use subxt::{OnlineClient, PolkadotConfig};
use tracing::{debug, instrument, trace, warn};

use conductor_core::error::{ChainError, ChainResult};
use conductor_core::models::{BlockHash, BlockMetadata};
use conductor_core::ports::{ChainEvent, ChainEventStream, EventSource};

use crate::convert::composite_to_args;

/// Configuration for the Substrate client.
#[derive(Debug, Clone)]
pub struct SubstrateClientConfig {
    /// WebSocket URL (e.g., "ws://localhost:9944").
    pub ws_url: String,
}

pub type SubstrateBlock = Block<PolkadotConfig, OnlineClient<PolkadotConfig>>;

impl Default for SubstrateClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://127.0.0.1:9944".to_string(),
        }
    }
}

/// Substrate client adapter implementing the EventSource port.
pub struct SubstrateClient {
    client: OnlineClient<PolkadotConfig>,
}

impl SubstrateClient {
    /// Connect to a Substrate node.
    #[instrument(skip_all, fields(url = %config.ws_url))]
    pub async fn connect(config: SubstrateClientConfig) -> ChainResult<Self> {
        debug!("Connecting to node");

        let rpc_client = RpcClient::from_url(&config.ws_url)
            .await
            .map_err(|e| ChainError::ConnectionFailed(e.to_string()))?;
        let backend: ChainHeadBackend<PolkadotConfig> =
            ChainHeadBackendBuilder::default().build_with_background_driver(rpc_client.clone());
        let client = OnlineClient::<PolkadotConfig>::from_backend(Arc::new(backend))
            .await
            .map_err(|e| ChainError::ConnectionFailed(e.to_string()))?;

        debug!(
            spec_version = client.runtime_version().spec_version,
            "Connected successfully"
        );

        Ok(Self { client })
    }
}

#[async_trait]
impl EventSource for SubstrateClient {
    async fn genesis_hash(&self) -> ChainResult<BlockHash> {
        let hash = self.client.genesis_hash();
        Ok(BlockHash(hash.0))
    }

    async fn subscribe_events(&self) -> ChainResult<ChainEventStream> {
        let subscription = self
            .client
            .blocks()
            .subscribe_finalized()
            .await
            .map_err(|e| ChainError::SubscriptionError(e.to_string()))?;

        // One finalized block expands into its events, in block order
        let stream = subscription
            .then(|result| async move {
                match result {
                    Ok(block) => match decode_events(&block).await {
                        Ok(events) => events.into_iter().map(Ok).collect(),
                        Err(e) => vec![Err(e)],
                    },
                    Err(e) => vec![Err(ChainError::SubscriptionError(e.to_string()))],
                }
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(stream))
    }
}

// =============================================================================
// Block decoding
// =============================================================================

/// Decode the events of a finalized block.
///
/// An event the metadata cannot decode is skipped; the indices of the
/// others keep their position in the block.
async fn decode_events(block: &SubstrateBlock) -> ChainResult<Vec<ChainEvent>> {
    let events = block
        .events()
        .await
        .map_err(|e| ChainError::RpcError(e.to_string()))?;

    let block_hash = BlockHash(block.hash().0);
    let block_number = block.number() as u64;
    let mut decoded = Vec::new();

    for (index, event) in events.iter().enumerate() {
        match event {
            Ok(ev) => {
                let args = match ev.field_values() {
                    Ok(fields) => composite_to_args(&fields),
                    Err(e) => {
                        warn!(
                            block = block_number,
                            index,
                            pallet = ev.pallet_name(),
                            event = ev.variant_name(),
                            error = %e,
                            "⚠️  Failed to decode event fields"
                        );
                        continue;
                    }
                };

                decoded.push(ChainEvent {
                    pallet: ev.pallet_name().to_string(),
                    name: ev.variant_name().to_string(),
                    args,
                    block: BlockMetadata::new(block_hash.clone(), block_number, index as u32),
                });
            }
            Err(e) => {
                warn!(block = block_number, index, error = ?e, "⚠️  Failed to decode event");
            }
        }
    }

    trace!(block = block_number, events = decoded.len(), "Block decoded");
    Ok(decoded)
}
