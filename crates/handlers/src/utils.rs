//! Shared utilities for command handlers.
//!
//! Document serialization and the search-index writes every projection
//! handler performs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use conductor_core::error::{HandlerResult, SearchError};
use conductor_core::models::BlockMetadata;
use conductor_core::ports::SearchIndex;

// =============================================================================
// Documents
// =============================================================================

/// Chain position of the command that last wrote a document.
#[derive(Debug, Clone, Serialize)]
pub struct BlockRef {
    pub block_hash: String,
    pub block_number: u64,
    pub event_index: u32,
}

impl From<&BlockMetadata> for BlockRef {
    fn from(block: &BlockMetadata) -> Self {
        Self {
            block_hash: block.block_hash.to_hex(),
            block_number: block.block_number,
            event_index: block.event_index,
        }
    }
}

/// Serialize a document projection into a JSON object.
pub fn to_doc<T: Serialize>(doc: &T) -> HandlerResult<Value> {
    serde_json::to_value(doc).map_err(|e| SearchError::SerializationError(e.to_string()).into())
}

/// Convert a chain timestamp in milliseconds.
///
/// Out-of-range values fall back to the current time.
pub fn millis_to_datetime(millis: u64) -> DateTime<Utc> {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}

// =============================================================================
// Index writes
// =============================================================================

/// Upsert a serialized projection.
pub async fn upsert_doc<T: Serialize>(
    search: &dyn SearchIndex,
    index: &str,
    id: &str,
    doc: &T,
) -> HandlerResult<()> {
    search.upsert(index, id, to_doc(doc)?).await?;
    debug!(index, id, "Document upserted");
    Ok(())
}

/// Delete a document; an absent document is not an error.
pub async fn delete_doc(search: &dyn SearchIndex, index: &str, id: &str) -> HandlerResult<()> {
    let existed = search.delete(index, id).await?;
    debug!(index, id, existed, "Document deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conductor_core::models::BlockHash;

    #[test]
    fn test_millis_to_datetime() {
        let dt = millis_to_datetime(1_650_000_000_000);
        assert_eq!(dt.timestamp_millis(), 1_650_000_000_000);

        // Hors limites: remplacé par l'heure courante plutôt que de paniquer
        let fallback = millis_to_datetime(u64::MAX);
        assert!(fallback.timestamp() > 1_600_000_000);
    }

    #[test]
    fn test_to_doc_keeps_large_amounts_exact() {
        #[derive(Serialize)]
        struct Doc {
            amount: String,
            block_metadata: BlockRef,
        }

        let block = BlockMetadata::new(BlockHash([1; 32]), 9, 4);
        let doc = to_doc(&Doc {
            amount: u128::MAX.to_string(),
            block_metadata: BlockRef::from(&block),
        })
        .unwrap();

        assert_eq!(doc["amount"], "340282366920938463463374607431768211455");
        assert_eq!(doc["block_metadata"]["event_index"], 4);
    }
}
