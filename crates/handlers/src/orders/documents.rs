//! Search documents for orders.

use serde::Serialize;

use conductor_core::models::{BlockMetadata, Order, OrderStatus, Price};

use crate::utils::BlockRef;

/// Document stored in the `orders` index, keyed by order id.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDocument {
    pub id: String,
    pub service_id: String,
    pub customer_id: String,
    pub customer_box_public_key: String,
    pub seller_id: String,
    pub dna_sample_tracking_id: String,
    pub currency: String,
    pub prices: Vec<PriceDocument>,
    pub additional_prices: Vec<PriceDocument>,
    pub status: OrderStatus,
    pub order_flow: Option<String>,
    pub created_at: u64,
    pub updated_at: u64,
    pub block_metadata: BlockRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceDocument {
    pub component: String,
    pub value: String,
}

impl From<&Price> for PriceDocument {
    fn from(price: &Price) -> Self {
        Self {
            component: price.component.clone(),
            value: price.value.to_string(),
        }
    }
}

impl OrderDocument {
    pub fn new(order: &Order, block: &BlockMetadata) -> Self {
        Self {
            id: order.id.clone(),
            service_id: order.service_id.clone(),
            customer_id: order.customer_id.to_hex(),
            customer_box_public_key: order.customer_box_public_key.clone(),
            seller_id: order.seller_id.to_hex(),
            dna_sample_tracking_id: order.dna_sample_tracking_id.clone(),
            currency: order.currency.clone(),
            prices: order.prices.iter().map(PriceDocument::from).collect(),
            additional_prices: order.additional_prices.iter().map(PriceDocument::from).collect(),
            status: order.status,
            order_flow: order.order_flow.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
            block_metadata: BlockRef::from(block),
        }
    }
}
