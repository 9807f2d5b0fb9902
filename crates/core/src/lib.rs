//! Core domain layer for the Conductor relay.
//!
//! This crate contains the domain models, port traits (interfaces), the
//! command translator and the services that move chain events into the read
//! models. It follows hexagonal architecture principles - this is the
//! innermost layer with no dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     conductor (binary)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │ conductor-handlers │ conductor-search │ conductor-substrate │
//! │     (bundles)      │  (Elasticsearch) │       (RPC)         │
//! ├────────────────────┴──────────────────┴─────────────────────┤
//! │                    conductor-storage                        │
//! │                     (PostgreSQL)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    conductor-core  ← YOU ARE HERE           │
//! │        (models, ports, translator, services)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`models`] - Domain models and chain payloads
//! - [`commands`] - Typed commands built from chain events
//! - [`translator`] - `(pallet, event, args)` → [`commands::Command`]
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Dispatcher and listener loop
//! - [`error`] - Error types per layer
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Pipeline
//!
//! 1. [`ports::EventSource`] streams finalized chain events
//! 2. [`translator::translate`] decodes mapped events into commands
//! 3. [`services::CommandDispatcher`] routes each command to exactly one
//!    [`ports::CommandHandler`]
//! 4. Handlers write to [`ports::SearchIndex`] and the relational
//!    repositories
//! 5. [`services::ListenerService`] advances the cursor

pub mod commands;
pub mod error;
pub mod metrics;
pub mod models;
pub mod ports;
pub mod services;
pub mod translator;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
