//! Services pallet handler bundle.
//!
//! Lab service catalogue, projected into the `services` index.

mod documents;
mod handler;

use std::sync::Arc;

use conductor_core::ports::{CommandHandler, SERVICES_INDEX};

use crate::HandlerBundle;
use crate::stores::Stores;

pub use documents::ServiceDocument;
pub use handler::ServicesHandler;

pub struct ServicesBundle {
    stores: Stores,
}

impl ServicesBundle {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

impl HandlerBundle for ServicesBundle {
    fn name(&self) -> &'static str {
        "services"
    }

    fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
        vec![Arc::new(ServicesHandler::new(self.stores.search.clone()))]
    }

    fn indices(&self) -> &'static [&'static str] {
        &[SERVICES_INDEX]
    }
}
