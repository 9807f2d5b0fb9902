//! Handler bundle trait definition.

use std::sync::Arc;

use conductor_core::ports::CommandHandler;

/// A self-contained bundle of handlers for one pallet family.
///
/// Bundles provide a plugin-like architecture where each bundle can:
/// - Register one or more command handlers
/// - Own the search indices its documents live in
/// - Be independently developed and tested
///
/// # Example
///
/// ```ignore
/// pub struct MyBundle { stores: Stores }
///
/// impl HandlerBundle for MyBundle {
///     fn name(&self) -> &'static str { "my_bundle" }
///
///     fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
///         vec![Arc::new(MyHandler::new(self.stores.clone()))]
///     }
/// }
/// ```
pub trait HandlerBundle: Send + Sync {
    /// Unique name identifying this bundle.
    ///
    /// Used for logging.
    fn name(&self) -> &'static str;

    /// Returns all command handlers provided by this bundle.
    ///
    /// These handlers will be registered with the dispatcher's
    /// `HandlerRegistry`.
    fn handlers(&self) -> Vec<Arc<dyn CommandHandler>>;

    /// Search indices written by this bundle's handlers.
    fn indices(&self) -> &'static [&'static str] {
        &[]
    }
}
