//! Search documents for genetic analysts.

use serde::Serialize;

use conductor_core::models::{
    BlockMetadata, GeneticAnalyst, GeneticAnalystInfo, StakeStatus, VerificationStatus,
};

use crate::utils::BlockRef;

/// Document stored in the `genetic-analysts` index, keyed by account id.
#[derive(Debug, Clone, Serialize)]
pub struct GeneticAnalystDocument {
    pub account_id: String,
    pub info: InfoDocument,
    /// Balance as a decimal string.
    pub stake_amount: String,
    pub stake_status: StakeStatus,
    pub verification_status: VerificationStatus,
    pub availability_status: Option<String>,
    pub block_metadata: BlockRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoDocument {
    pub box_public_key: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: u64,
    pub email: String,
    pub phone_number: String,
    pub specialization: String,
    pub profile_link: String,
    pub profile_image: Option<String>,
}

impl From<&GeneticAnalystInfo> for InfoDocument {
    fn from(info: &GeneticAnalystInfo) -> Self {
        Self {
            box_public_key: info.box_public_key.clone(),
            first_name: info.first_name.clone(),
            last_name: info.last_name.clone(),
            gender: info.gender.clone(),
            date_of_birth: info.date_of_birth,
            email: info.email.clone(),
            phone_number: info.phone_number.clone(),
            specialization: info.specialization.clone(),
            profile_link: info.profile_link.clone(),
            profile_image: info.profile_image.clone(),
        }
    }
}

impl GeneticAnalystDocument {
    pub fn new(analyst: &GeneticAnalyst, block: &BlockMetadata) -> Self {
        Self {
            account_id: analyst.account_id.to_hex(),
            info: InfoDocument::from(&analyst.info),
            stake_amount: analyst.stake_amount.to_string(),
            stake_status: analyst.stake_status,
            verification_status: analyst.verification_status,
            availability_status: analyst.availability_status.clone(),
            block_metadata: BlockRef::from(block),
        }
    }
}
