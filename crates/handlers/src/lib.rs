//! Handler bundles for the Conductor relay.
//!
//! Each bundle groups the command handlers of one pallet family together
//! with the search indices they own:
//!
//! - [`GeneticAnalystsBundle`] - analyst profiles, staking, verification
//! - [`LabsBundle`] - lab profiles and verification
//! - [`OrdersBundle`] - order lifecycle and its transaction log
//! - [`ServicesBundle`] - lab service catalogue
//! - [`ServiceRequestsBundle`] - customer service requests
//!
//! # Registering Bundles
//!
//! ```ignore
//! let stores = Stores::new(search, notifications, transactions);
//! let bundles = default_bundles(stores);
//!
//! // One handler per command kind, checked here
//! let handlers = bundles.into_handler_registry()?;
//! let dispatcher = CommandDispatcher::new(config, Arc::new(handlers));
//! ```

pub mod genetic_analysts;
pub mod labs;
pub mod notifications;
pub mod orders;
pub mod service_requests;
pub mod services;
pub mod stores;
pub mod transactions;
pub mod utils;

mod bundle;
mod registry;

pub use bundle::HandlerBundle;
pub use registry::BundleRegistry;
pub use stores::Stores;

pub use genetic_analysts::GeneticAnalystsBundle;
pub use labs::LabsBundle;
pub use orders::OrdersBundle;
pub use service_requests::ServiceRequestsBundle;
pub use services::ServicesBundle;

/// Registry holding every bundle the relay ships with.
pub fn default_bundles(stores: Stores) -> BundleRegistry {
    let mut registry = BundleRegistry::new();
    registry.register(Box::new(OrdersBundle::new(stores.clone())));
    registry.register(Box::new(ServicesBundle::new(stores.clone())));
    registry.register(Box::new(ServiceRequestsBundle::new(stores.clone())));
    registry.register(Box::new(LabsBundle::new(stores.clone())));
    registry.register(Box::new(GeneticAnalystsBundle::new(stores)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use conductor_core::commands::CommandKind;
    use conductor_core::testing::{
        InMemoryNotificationRepository, InMemorySearchIndex, InMemoryTransactionLogRepository,
    };

    // Test critique: chaque commande traduite a exactement un handler
    #[test]
    fn test_default_bundles_cover_every_kind() {
        let stores = Stores::new(
            Arc::new(InMemorySearchIndex::new()),
            Arc::new(InMemoryNotificationRepository::new()),
            Arc::new(InMemoryTransactionLogRepository::new()),
        );
        let bundles = default_bundles(stores);
        assert_eq!(bundles.len(), 5);
        assert_eq!(
            bundles.indices(),
            vec![
                "create-service-request",
                "genetic-analysts",
                "labs",
                "orders",
                "services"
            ]
        );

        let registry = bundles.into_handler_registry().unwrap();
        for kind in CommandKind::ALL {
            assert!(registry.has_handler(kind), "no handler for {kind}");
        }
        assert_eq!(registry.registered_kinds().len(), CommandKind::ALL.len());
    }
}
