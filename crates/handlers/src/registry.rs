//! Bundle registry for managing handler bundles.

use tracing::{debug, info};

use conductor_core::error::DomainResult;
use conductor_core::ports::HandlerRegistry;

use crate::bundle::HandlerBundle;

/// Registry for managing handler bundles.
///
/// # Example
///
/// ```ignore
/// let mut registry = BundleRegistry::new();
/// registry.register(Box::new(OrdersBundle::new(stores.clone())));
/// registry.register(Box::new(LabsBundle::new(stores.clone())));
///
/// // Convert to HandlerRegistry for the dispatcher
/// let handlers = registry.into_handler_registry()?;
/// ```
pub struct BundleRegistry {
    bundles: Vec<Box<dyn HandlerBundle>>,
}

impl BundleRegistry {
    /// Create a new empty bundle registry.
    pub fn new() -> Self {
        Self {
            bundles: Vec::new(),
        }
    }

    /// Register a handler bundle.
    pub fn register(&mut self, bundle: Box<dyn HandlerBundle>) {
        info!(bundle = bundle.name(), "📦 Registering handler bundle");
        self.bundles.push(bundle);
    }

    /// Convert this registry into a HandlerRegistry.
    ///
    /// This extracts all handlers from all bundles and registers them
    /// with a new HandlerRegistry. Fails if two handlers claim the same
    /// command kind.
    pub fn into_handler_registry(self) -> DomainResult<HandlerRegistry> {
        let mut registry = HandlerRegistry::new();

        for bundle in self.bundles {
            let handlers = bundle.handlers();
            debug!(
                bundle = bundle.name(),
                handlers = handlers.len(),
                "Extracting handlers"
            );

            for handler in handlers {
                registry.register(handler)?;
            }
        }

        Ok(registry)
    }

    /// Get the names of all registered bundles.
    pub fn bundle_names(&self) -> Vec<&'static str> {
        self.bundles.iter().map(|b| b.name()).collect()
    }

    /// All search indices written by registered bundles, deduplicated.
    pub fn indices(&self) -> Vec<&'static str> {
        let mut indices: Vec<&'static str> = self
            .bundles
            .iter()
            .flat_map(|b| b.indices().iter().copied())
            .collect();
        indices.sort();
        indices.dedup();
        indices
    }

    /// Get the number of registered bundles.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Check if no bundles are registered.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl Default for BundleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use conductor_core::commands::{Command, CommandKind};
    use conductor_core::error::{DomainError, HandlerResult};
    use conductor_core::ports::CommandHandler;

    struct MockHandler(&'static [CommandKind]);

    #[async_trait]
    impl CommandHandler for MockHandler {
        fn name(&self) -> &'static str {
            "mock"
        }
        fn kinds(&self) -> &'static [CommandKind] {
            self.0
        }
        async fn execute(&self, _: &Command) -> HandlerResult<()> {
            Ok(())
        }
    }

    struct MockBundle {
        name: &'static str,
        kinds: &'static [CommandKind],
        indices: &'static [&'static str],
    }

    impl HandlerBundle for MockBundle {
        fn name(&self) -> &'static str {
            self.name
        }
        fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
            vec![Arc::new(MockHandler(self.kinds))]
        }
        fn indices(&self) -> &'static [&'static str] {
            self.indices
        }
    }

    #[test]
    fn test_bundle_to_handler_registry_extraction() {
        let mut registry = BundleRegistry::new();
        registry.register(Box::new(MockBundle {
            name: "orders",
            kinds: &[CommandKind::OrderPaid],
            indices: &["orders"],
        }));
        registry.register(Box::new(MockBundle {
            name: "labs",
            kinds: &[CommandKind::LabUpdated],
            indices: &["labs", "orders"],
        }));

        assert_eq!(registry.indices(), vec!["labs", "orders"]);

        let handlers = registry.into_handler_registry().unwrap();
        assert!(handlers.has_handler(CommandKind::OrderPaid));
        assert!(handlers.has_handler(CommandKind::LabUpdated));
    }

    // Test critique: deux bundles ne peuvent pas revendiquer la même commande
    #[test]
    fn test_overlapping_bundles_are_rejected() {
        let mut registry = BundleRegistry::new();
        for name in ["first", "second"] {
            registry.register(Box::new(MockBundle {
                name,
                kinds: &[CommandKind::OrderPaid],
                indices: &[],
            }));
        }

        let err = registry.into_handler_registry().err();
        assert!(matches!(err, Some(DomainError::DuplicateHandler(CommandKind::OrderPaid))));
    }
}
