//! Search index layer for the Conductor relay.
//!
//! This crate provides the Elasticsearch implementation of the
//! [`SearchIndex`](conductor_core::ports::SearchIndex) port defined in
//! `conductor-core`. Every write waits for the index refresh so a document
//! is searchable as soon as its handler returns.
//!
//! # Usage
//!
//! ```ignore
//! use conductor_search::{ElasticsearchConfig, ElasticsearchIndex};
//!
//! let config = ElasticsearchConfig::new("http://localhost:9200");
//! let index = Arc::new(ElasticsearchIndex::connect(&config)?);
//! ```

pub mod elasticsearch;

pub use elasticsearch::{ElasticsearchConfig, ElasticsearchIndex};
