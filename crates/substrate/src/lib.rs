//! Substrate RPC adapter for the Conductor relay.
//!
//! This crate implements the [`EventSource`] port from `conductor-core`,
//! providing connectivity to Substrate-based blockchains via WebSocket RPC.
//!
//! # Features
//!
//! - Finalized block subscription, flattened into events in chain order
//! - Dynamic metadata decoding using subxt
//! - SCALE to JSON conversion of event fields into positional arguments
//!
//! # Usage
//!
//! ```ignore
//! use conductor_substrate::{SubstrateClient, SubstrateClientConfig};
//!
//! let config = SubstrateClientConfig {
//!     ws_url: "ws://localhost:9944".to_string(),
//! };
//!
//! let client = SubstrateClient::connect(config).await?;
//! let genesis = client.genesis_hash().await?;
//! let mut stream = client.subscribe_events().await?;
//!
//! while let Some(event) = stream.next().await {
//!     // Translate and dispatch...
//! }
//! ```
//!
//! [`EventSource`]: conductor_core::ports::EventSource

mod client;
mod convert;

pub use client::{SubstrateClient, SubstrateClientConfig};
