//! Elasticsearch adapter.
//!
//! - [`ElasticsearchConfig`] - Node URL, credentials and timeouts
//! - [`ElasticsearchIndex`] - `SearchIndex` over the document REST API
//!
//! Request URLs, bodies and response handling live in `requests` so they can
//! be tested without a cluster.

mod client;
mod config;
mod requests;

pub use client::ElasticsearchIndex;
pub use config::ElasticsearchConfig;
