//! Search documents for service requests.
//!
//! A request document is built up across its lifecycle: creation writes the
//! `request` object, later events merge a status change plus the lab's offer
//! or the invoice into it.

use serde::Serialize;

use conductor_core::models::{
    BlockMetadata, Request, RequestStatus, ServiceInvoice, ServiceOffer,
};

use crate::utils::BlockRef;

#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    pub hash: String,
    pub requester_address: String,
    pub lab_address: Option<String>,
    pub country: String,
    pub region: String,
    pub city: String,
    pub service_category: String,
    pub staking_amount: String,
    pub status: RequestStatus,
    pub created_at: u64,
    pub updated_at: Option<u64>,
    pub unstaked_at: Option<u64>,
}

/// Fields of `request` touched after creation.
#[derive(Debug, Clone, Serialize)]
pub struct RequestPatch {
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_address: Option<String>,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferBody {
    pub request_hash: String,
    pub lab_address: String,
    pub service_id: String,
    pub testing_price: String,
    pub qc_price: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceBody {
    pub request_hash: String,
    pub order_id: String,
    pub service_id: String,
    pub customer_address: String,
    pub seller_address: String,
    pub dna_sample_tracking_id: String,
    pub testing_price: String,
    pub qc_price: String,
    pub pay_amount: String,
}

/// Full document written on creation.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDocument {
    pub request: RequestBody,
    pub block_metadata: BlockRef,
}

/// Partial document merged when a lab claims the request.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimDocument {
    pub request: RequestPatch,
    pub service_offer: OfferBody,
    pub block_metadata: BlockRef,
}

/// Partial document merged when the request is processed or finalized.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDocument {
    pub request: RequestPatch,
    pub service_invoice: InvoiceBody,
    pub block_metadata: BlockRef,
}

impl RequestDocument {
    pub fn new(request: &Request, block: &BlockMetadata) -> Self {
        Self {
            request: RequestBody {
                hash: request.hash.clone(),
                requester_address: request.requester_address.to_hex(),
                lab_address: request.lab_address.as_ref().map(|a| a.to_hex()),
                country: request.country.clone(),
                region: request.region.clone(),
                city: request.city.clone(),
                service_category: request.service_category.clone(),
                staking_amount: request.staking_amount.to_string(),
                status: request.status,
                created_at: request.created_at,
                updated_at: request.updated_at,
                unstaked_at: request.unstaked_at,
            },
            block_metadata: BlockRef::from(block),
        }
    }
}

impl ClaimDocument {
    pub fn new(offer: &ServiceOffer, block: &BlockMetadata) -> Self {
        Self {
            request: RequestPatch {
                hash: offer.request_hash.clone(),
                lab_address: Some(offer.lab_address.to_hex()),
                status: RequestStatus::Claimed,
            },
            service_offer: OfferBody {
                request_hash: offer.request_hash.clone(),
                lab_address: offer.lab_address.to_hex(),
                service_id: offer.service_id.clone(),
                testing_price: offer.testing_price.to_string(),
                qc_price: offer.qc_price.to_string(),
            },
            block_metadata: BlockRef::from(block),
        }
    }
}

impl InvoiceDocument {
    pub fn new(invoice: &ServiceInvoice, status: RequestStatus, block: &BlockMetadata) -> Self {
        Self {
            request: RequestPatch {
                hash: invoice.request_hash.clone(),
                lab_address: None,
                status,
            },
            service_invoice: InvoiceBody {
                request_hash: invoice.request_hash.clone(),
                order_id: invoice.order_id.clone(),
                service_id: invoice.service_id.clone(),
                customer_address: invoice.customer_address.to_hex(),
                seller_address: invoice.seller_address.to_hex(),
                dna_sample_tracking_id: invoice.dna_sample_tracking_id.clone(),
                testing_price: invoice.testing_price.to_string(),
                qc_price: invoice.qc_price.to_string(),
                pay_amount: invoice.pay_amount.to_string(),
            },
            block_metadata: BlockRef::from(block),
        }
    }
}
