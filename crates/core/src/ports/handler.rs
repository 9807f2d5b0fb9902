//! Port trait for command handlers.
//!
//! This is the main extensibility point of the relay. Each pallet family
//! implements [`CommandHandler`] for the command kinds it projects.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::commands::{Command, CommandKind};
use crate::error::{DomainError, DomainResult, HandlerResult};

/// Trait for command handlers.
///
/// A handler applies one command to the external stores. It must be
/// idempotent: applying the same command twice leaves the stores as if it
/// had been applied once.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Name used in logs and metrics (e.g., "genetic-analysts").
    fn name(&self) -> &'static str;

    /// Command kinds this handler accepts.
    fn kinds(&self) -> &'static [CommandKind];

    /// Apply a command.
    async fn execute(&self, command: &Command) -> HandlerResult<()>;
}

/// Registry mapping each command kind to exactly one handler.
///
/// Built once at startup and then only read.
pub struct HandlerRegistry {
    handlers: BTreeMap<CommandKind, Arc<dyn CommandHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Register a handler for every kind it declares.
    ///
    /// Fails without registering anything if one of its kinds is already
    /// taken.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) -> DomainResult<()> {
        if let Some(kind) = handler
            .kinds()
            .iter()
            .find(|kind| self.handlers.contains_key(kind))
        {
            return Err(DomainError::DuplicateHandler(*kind));
        }

        for kind in handler.kinds() {
            self.handlers.insert(*kind, handler.clone());
        }
        Ok(())
    }

    /// Get the handler for a command kind.
    pub fn get(&self, kind: CommandKind) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(&kind)
    }

    /// Check if a command kind has a registered handler.
    pub fn has_handler(&self, kind: CommandKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// List all handled command kinds, in a stable order.
    pub fn registered_kinds(&self) -> Vec<CommandKind> {
        self.handlers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockHandler(&'static str, &'static [CommandKind]);

    #[async_trait]
    impl CommandHandler for MockHandler {
        fn name(&self) -> &'static str {
            self.0
        }
        fn kinds(&self) -> &'static [CommandKind] {
            self.1
        }
        async fn execute(&self, _: &Command) -> HandlerResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_routes_each_kind() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(Arc::new(MockHandler(
                "orders",
                &[CommandKind::OrderCreated, CommandKind::OrderPaid],
            )))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(CommandKind::OrderPaid).unwrap().name(), "orders");
        assert!(!registry.has_handler(CommandKind::LabUpdated));
    }

    // Test critique: un seul handler par type de commande
    #[test]
    fn test_registry_rejects_duplicate_kind() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(Arc::new(MockHandler("first", &[CommandKind::LabUpdated])))
            .unwrap();

        let err = registry
            .register(Arc::new(MockHandler(
                "second",
                &[CommandKind::LabRegistered, CommandKind::LabUpdated],
            )))
            .unwrap_err();

        assert!(matches!(err, DomainError::DuplicateHandler(CommandKind::LabUpdated)));
        // Rien n'est enregistré partiellement
        assert!(!registry.has_handler(CommandKind::LabRegistered));
        assert_eq!(registry.get(CommandKind::LabUpdated).unwrap().name(), "first");
    }
}
