//! GeneticAnalysts pallet handler bundle.
//!
//! # Handled Events
//!
//! - `GeneticAnalystRegistered` - Profile created, registration notification
//! - `GeneticAnalystUpdated` - Profile changed
//! - `GeneticAnalystStakeSuccessful` - Stake status changed
//! - `GeneticAnalystUpdateVerificationStatus` - Verification notification
//! - `GeneticAnalystDeleted` - Profile removed
//!
//! # Search Indices
//!
//! - `genetic-analysts` - One document per analyst, keyed by account id

mod documents;
mod handler;

use std::sync::Arc;

use conductor_core::ports::{CommandHandler, GENETIC_ANALYSTS_INDEX};

use crate::HandlerBundle;
use crate::notifications::Notifier;
use crate::stores::Stores;

pub use documents::GeneticAnalystDocument;
pub use handler::GeneticAnalystsHandler;

pub struct GeneticAnalystsBundle {
    stores: Stores,
}

impl GeneticAnalystsBundle {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

impl HandlerBundle for GeneticAnalystsBundle {
    fn name(&self) -> &'static str {
        "genetic_analysts"
    }

    fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
        vec![Arc::new(GeneticAnalystsHandler::new(
            self.stores.search.clone(),
            Notifier::new(self.stores.notifications.clone()),
        ))]
    }

    fn indices(&self) -> &'static [&'static str] {
        &[GENETIC_ANALYSTS_INDEX]
    }
}
