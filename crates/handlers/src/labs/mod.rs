//! Labs pallet handler bundle.
//!
//! Projects lab profiles into the `labs` index and notifies labs about
//! registration and verification changes.

mod documents;
mod handler;

use std::sync::Arc;

use conductor_core::ports::{CommandHandler, LABS_INDEX};

use crate::HandlerBundle;
use crate::notifications::Notifier;
use crate::stores::Stores;

pub use documents::LabDocument;
pub use handler::LabsHandler;

pub struct LabsBundle {
    stores: Stores,
}

impl LabsBundle {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

impl HandlerBundle for LabsBundle {
    fn name(&self) -> &'static str {
        "labs"
    }

    fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
        vec![Arc::new(LabsHandler::new(
            self.stores.search.clone(),
            Notifier::new(self.stores.notifications.clone()),
        ))]
    }

    fn indices(&self) -> &'static [&'static str] {
        &[LABS_INDEX]
    }
}
