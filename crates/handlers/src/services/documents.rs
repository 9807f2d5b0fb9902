//! Search documents for lab services.

use serde::Serialize;

use conductor_core::models::{BlockMetadata, PriceByCurrency, Service, ServiceInfo};

use crate::orders::PriceDocument;
use crate::utils::BlockRef;

/// Document stored in the `services` index, keyed by service id.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDocument {
    pub id: String,
    pub owner_id: String,
    pub info: ServiceInfoDocument,
    pub block_metadata: BlockRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfoDocument {
    pub name: String,
    pub prices_by_currency: Vec<PriceByCurrencyDocument>,
    pub expected_duration: ExpectedDurationDocument,
    pub category: String,
    pub description: String,
    pub dna_collection_process: String,
    pub test_result_sample: String,
    pub long_description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceByCurrencyDocument {
    pub currency: String,
    pub total_price: String,
    pub price_components: Vec<PriceDocument>,
    pub additional_prices: Vec<PriceDocument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpectedDurationDocument {
    pub duration: u64,
    pub duration_type: String,
}

impl From<&PriceByCurrency> for PriceByCurrencyDocument {
    fn from(price: &PriceByCurrency) -> Self {
        Self {
            currency: price.currency.clone(),
            total_price: price.total_price.to_string(),
            price_components: price.price_components.iter().map(PriceDocument::from).collect(),
            additional_prices: price.additional_prices.iter().map(PriceDocument::from).collect(),
        }
    }
}

impl From<&ServiceInfo> for ServiceInfoDocument {
    fn from(info: &ServiceInfo) -> Self {
        Self {
            name: info.name.clone(),
            prices_by_currency: info
                .prices_by_currency
                .iter()
                .map(PriceByCurrencyDocument::from)
                .collect(),
            expected_duration: ExpectedDurationDocument {
                duration: info.expected_duration.duration,
                duration_type: info.expected_duration.duration_type.clone(),
            },
            category: info.category.clone(),
            description: info.description.clone(),
            dna_collection_process: info.dna_collection_process.clone(),
            test_result_sample: info.test_result_sample.clone(),
            long_description: info.long_description.clone(),
            image: info.image.clone(),
        }
    }
}

impl ServiceDocument {
    pub fn new(service: &Service, block: &BlockMetadata) -> Self {
        Self {
            id: service.id.clone(),
            owner_id: service.owner_id.to_hex(),
            info: ServiceInfoDocument::from(&service.info),
            block_metadata: BlockRef::from(block),
        }
    }
}
