//! Search documents for labs.

use serde::Serialize;

use conductor_core::models::{BlockMetadata, Lab, LabInfo, StakeStatus, VerificationStatus};

use crate::utils::BlockRef;

/// Document stored in the `labs` index, keyed by account id.
#[derive(Debug, Clone, Serialize)]
pub struct LabDocument {
    pub account_id: String,
    pub info: LabInfoDocument,
    pub verification_status: VerificationStatus,
    pub stake_amount: String,
    pub stake_status: StakeStatus,
    pub block_metadata: BlockRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabInfoDocument {
    pub box_public_key: String,
    pub name: String,
    pub email: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub address: String,
    pub phone_number: String,
    pub website: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub profile_image: Option<String>,
}

impl From<&LabInfo> for LabInfoDocument {
    fn from(info: &LabInfo) -> Self {
        Self {
            box_public_key: info.box_public_key.clone(),
            name: info.name.clone(),
            email: info.email.clone(),
            country: info.country.clone(),
            region: info.region.clone(),
            city: info.city.clone(),
            address: info.address.clone(),
            phone_number: info.phone_number.clone(),
            website: info.website.clone(),
            latitude: info.latitude.clone(),
            longitude: info.longitude.clone(),
            profile_image: info.profile_image.clone(),
        }
    }
}

impl LabDocument {
    pub fn new(lab: &Lab, block: &BlockMetadata) -> Self {
        Self {
            account_id: lab.account_id.to_hex(),
            info: LabInfoDocument::from(&lab.info),
            verification_status: lab.verification_status,
            stake_amount: lab.stake_amount.to_string(),
            stake_status: lab.stake_status,
            block_metadata: BlockRef::from(block),
        }
    }
}
