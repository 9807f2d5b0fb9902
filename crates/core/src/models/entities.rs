//! Chain payload models decoded from raw event arguments.
//!
//! Only the fields the read models project are declared; unknown fields are
//! ignored. A declared field that is missing or malformed fails decoding.

use serde::Deserialize;

use super::decode;
use super::{AccountId, OrderStatus, RequestStatus, StakeStatus, VerificationStatus};

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Price {
    #[serde(deserialize_with = "decode::text")]
    pub component: String,
    #[serde(deserialize_with = "decode::amount")]
    pub value: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "decode::hash")]
    pub id: String,
    #[serde(deserialize_with = "decode::hash")]
    pub service_id: String,
    #[serde(deserialize_with = "decode::account")]
    pub customer_id: AccountId,
    #[serde(deserialize_with = "decode::hash")]
    pub customer_box_public_key: String,
    #[serde(deserialize_with = "decode::account")]
    pub seller_id: AccountId,
    #[serde(deserialize_with = "decode::text")]
    pub dna_sample_tracking_id: String,
    #[serde(deserialize_with = "decode::label")]
    pub currency: String,
    pub prices: Vec<Price>,
    pub additional_prices: Vec<Price>,
    #[serde(deserialize_with = "decode::variant")]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "decode::opt_label")]
    pub order_flow: Option<String>,
    /// Milliseconds since the epoch.
    #[serde(deserialize_with = "decode::uint")]
    pub created_at: u64,
    #[serde(deserialize_with = "decode::uint")]
    pub updated_at: u64,
}

impl Order {
    /// Sum of all price components, the amount moved by the order.
    pub fn total_price(&self) -> u128 {
        self.prices
            .iter()
            .chain(&self.additional_prices)
            .fold(0u128, |acc, p| acc.saturating_add(p.value))
    }
}

// =============================================================================
// Services
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceByCurrency {
    #[serde(deserialize_with = "decode::label")]
    pub currency: String,
    #[serde(deserialize_with = "decode::amount")]
    pub total_price: u128,
    pub price_components: Vec<Price>,
    pub additional_prices: Vec<Price>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpectedDuration {
    #[serde(deserialize_with = "decode::uint")]
    pub duration: u64,
    #[serde(deserialize_with = "decode::label")]
    pub duration_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceInfo {
    #[serde(deserialize_with = "decode::text")]
    pub name: String,
    pub prices_by_currency: Vec<PriceByCurrency>,
    pub expected_duration: ExpectedDuration,
    #[serde(deserialize_with = "decode::text")]
    pub category: String,
    #[serde(deserialize_with = "decode::text")]
    pub description: String,
    #[serde(deserialize_with = "decode::text")]
    pub dna_collection_process: String,
    #[serde(deserialize_with = "decode::text")]
    pub test_result_sample: String,
    #[serde(default, deserialize_with = "decode::opt_text")]
    pub long_description: Option<String>,
    #[serde(default, deserialize_with = "decode::opt_text")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Service {
    #[serde(deserialize_with = "decode::hash")]
    pub id: String,
    #[serde(deserialize_with = "decode::account")]
    pub owner_id: AccountId,
    pub info: ServiceInfo,
}

// =============================================================================
// Service Requests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Request {
    #[serde(deserialize_with = "decode::hash")]
    pub hash: String,
    #[serde(deserialize_with = "decode::account")]
    pub requester_address: AccountId,
    #[serde(default, deserialize_with = "decode::opt_account")]
    pub lab_address: Option<AccountId>,
    #[serde(deserialize_with = "decode::text")]
    pub country: String,
    #[serde(deserialize_with = "decode::text")]
    pub region: String,
    #[serde(deserialize_with = "decode::text")]
    pub city: String,
    #[serde(deserialize_with = "decode::text")]
    pub service_category: String,
    #[serde(deserialize_with = "decode::amount")]
    pub staking_amount: u128,
    #[serde(deserialize_with = "decode::variant")]
    pub status: RequestStatus,
    #[serde(deserialize_with = "decode::uint")]
    pub created_at: u64,
    #[serde(default, deserialize_with = "decode::opt_uint")]
    pub updated_at: Option<u64>,
    #[serde(default, deserialize_with = "decode::opt_uint")]
    pub unstaked_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceOffer {
    #[serde(deserialize_with = "decode::hash")]
    pub request_hash: String,
    #[serde(deserialize_with = "decode::account")]
    pub lab_address: AccountId,
    #[serde(deserialize_with = "decode::hash")]
    pub service_id: String,
    #[serde(deserialize_with = "decode::amount")]
    pub testing_price: u128,
    #[serde(deserialize_with = "decode::amount")]
    pub qc_price: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceInvoice {
    #[serde(deserialize_with = "decode::hash")]
    pub request_hash: String,
    #[serde(deserialize_with = "decode::hash")]
    pub order_id: String,
    #[serde(deserialize_with = "decode::hash")]
    pub service_id: String,
    #[serde(deserialize_with = "decode::account")]
    pub customer_address: AccountId,
    #[serde(deserialize_with = "decode::account")]
    pub seller_address: AccountId,
    #[serde(deserialize_with = "decode::text")]
    pub dna_sample_tracking_id: String,
    #[serde(deserialize_with = "decode::amount")]
    pub testing_price: u128,
    #[serde(deserialize_with = "decode::amount")]
    pub qc_price: u128,
    #[serde(deserialize_with = "decode::amount")]
    pub pay_amount: u128,
}

// =============================================================================
// Labs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabInfo {
    #[serde(deserialize_with = "decode::hash")]
    pub box_public_key: String,
    #[serde(deserialize_with = "decode::text")]
    pub name: String,
    #[serde(deserialize_with = "decode::text")]
    pub email: String,
    #[serde(deserialize_with = "decode::text")]
    pub country: String,
    #[serde(deserialize_with = "decode::text")]
    pub region: String,
    #[serde(deserialize_with = "decode::text")]
    pub city: String,
    #[serde(deserialize_with = "decode::text")]
    pub address: String,
    #[serde(deserialize_with = "decode::text")]
    pub phone_number: String,
    #[serde(deserialize_with = "decode::text")]
    pub website: String,
    #[serde(default, deserialize_with = "decode::opt_text")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "decode::opt_text")]
    pub longitude: Option<String>,
    #[serde(default, deserialize_with = "decode::opt_text")]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Lab {
    #[serde(deserialize_with = "decode::account")]
    pub account_id: AccountId,
    pub info: LabInfo,
    #[serde(deserialize_with = "decode::variant")]
    pub verification_status: VerificationStatus,
    #[serde(deserialize_with = "decode::amount")]
    pub stake_amount: u128,
    #[serde(deserialize_with = "decode::variant")]
    pub stake_status: StakeStatus,
}

// =============================================================================
// Genetic Analysts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneticAnalystInfo {
    #[serde(deserialize_with = "decode::hash")]
    pub box_public_key: String,
    #[serde(deserialize_with = "decode::text")]
    pub first_name: String,
    #[serde(deserialize_with = "decode::text")]
    pub last_name: String,
    #[serde(deserialize_with = "decode::text")]
    pub gender: String,
    #[serde(deserialize_with = "decode::uint")]
    pub date_of_birth: u64,
    #[serde(deserialize_with = "decode::text")]
    pub email: String,
    #[serde(deserialize_with = "decode::text")]
    pub phone_number: String,
    #[serde(deserialize_with = "decode::text")]
    pub specialization: String,
    #[serde(deserialize_with = "decode::text")]
    pub profile_link: String,
    #[serde(default, deserialize_with = "decode::opt_text")]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneticAnalyst {
    #[serde(deserialize_with = "decode::account")]
    pub account_id: AccountId,
    pub info: GeneticAnalystInfo,
    #[serde(deserialize_with = "decode::amount")]
    pub stake_amount: u128,
    #[serde(deserialize_with = "decode::variant")]
    pub stake_status: StakeStatus,
    #[serde(deserialize_with = "decode::variant")]
    pub verification_status: VerificationStatus,
    #[serde(default, deserialize_with = "decode::opt_label")]
    pub availability_status: Option<String>,
}
