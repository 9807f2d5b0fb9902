//! Port trait for the search read model.
//!
//! Documents are flat JSON objects keyed by the domain entity id. Every write
//! is visible to searches once the call returns.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SearchResult;

/// Index holding lab documents.
pub const LABS_INDEX: &str = "labs";
/// Index holding genetic analyst documents.
pub const GENETIC_ANALYSTS_INDEX: &str = "genetic-analysts";
/// Index holding order documents.
pub const ORDERS_INDEX: &str = "orders";
/// Index holding service documents.
pub const SERVICES_INDEX: &str = "services";
/// Index holding service request documents.
pub const SERVICE_REQUESTS_INDEX: &str = "create-service-request";

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Merge `doc` into the document `id`, creating it if absent.
    async fn upsert(&self, index: &str, id: &str, doc: Value) -> SearchResult<()>;

    /// Fetch the source of document `id`.
    async fn get(&self, index: &str, id: &str) -> SearchResult<Option<Value>>;

    /// Delete document `id`. Returns `false` if it did not exist.
    async fn delete(&self, index: &str, id: &str) -> SearchResult<bool>;

    /// Number of documents in `index`. A missing index counts as empty.
    async fn count(&self, index: &str) -> SearchResult<u64>;
}
