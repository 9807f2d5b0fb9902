//! Domain models shared by the translator, the handlers and the adapters.
//!
//! These models are storage-agnostic. Chain payloads decoded from raw event
//! arguments live in [`entities`]; the value-shape helpers they rely on live
//! in [`decode`].

pub mod decode;
pub mod entities;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use entities::*;

// =============================================================================
// 32-byte Hash Types
// =============================================================================

/// Macro to generate 32-byte hash newtypes with common functionality.
///
/// Generates:
/// - `from_hex()` - Parse from hex string (with or without 0x prefix)
/// - `to_hex()` - Convert to 0x-prefixed hex string
/// - `Display` trait implementation
/// - `From<[u8; 32]>` implementation
macro_rules! hash32_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Parse from hex string (with or without 0x prefix).
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(s)?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| hex::FromHexError::InvalidStringLength)?;
                Ok(Self(arr))
            }

            /// Convert to 0x-prefixed hex string.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }

            /// Get the inner bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

hash32_newtype!(
    /// 32-byte block hash (Blake2-256).
    BlockHash
);

hash32_newtype!(
    /// 32-byte account identifier (SS58 decoded public key).
    AccountId
);

// =============================================================================
// Block Metadata
// =============================================================================

/// Where an event was emitted. Attached to every command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockMetadata {
    pub block_hash: BlockHash,
    pub block_number: u64,
    /// Index of the event within its block (0-based).
    pub event_index: u32,
}

impl BlockMetadata {
    pub fn new(block_hash: BlockHash, block_number: u64, event_index: u32) -> Self {
        Self {
            block_hash,
            block_number,
            event_index,
        }
    }

    /// Totally ordered chain position `(block_number, event_index)`.
    pub fn position(&self) -> (u64, u32) {
        (self.block_number, self.event_index)
    }
}

impl fmt::Display for BlockMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block #{} event {}", self.block_number, self.event_index)
    }
}

// =============================================================================
// Status Enums
// =============================================================================

/// Error returned when an on-chain enum label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub label: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} variant '{}'", self.kind, self.label)
    }
}

impl std::error::Error for UnknownVariant {}

/// Declares a unit enum whose variant names match the runtime's labels.
macro_rules! chain_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        label: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

chain_enum!(
    /// Verification status of a lab or genetic analyst.
    ///
    /// Transitions are direct overwrites: any status may follow any other.
    VerificationStatus {
        Unverified,
        Verified,
        Revoked,
        Rejected,
    }
);

chain_enum!(
    /// Staking status of a lab or genetic analyst.
    StakeStatus {
        Unstaked,
        Staked,
        WaitingForUnstaked,
    }
);

chain_enum!(
    /// Lifecycle status of an order.
    OrderStatus {
        Unpaid,
        Paid,
        Fulfilled,
        Refunded,
        Cancelled,
        Failed,
    }
);

chain_enum!(
    /// Lifecycle status of a service request.
    RequestStatus {
        Open,
        WaitingForUnstaked,
        Unstaked,
        Claimed,
        Processed,
        Finalized,
    }
);

// =============================================================================
// Notifications
// =============================================================================

/// Role of the actor a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    GeneticAnalyst,
    Lab,
}

impl ActorRole {
    /// Role label stored with the notification.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneticAnalyst => "GA",
            Self::Lab => "Lab",
        }
    }

    /// Human readable entity type.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::GeneticAnalyst => "Genetic Analyst",
            Self::Lab => "Lab",
        }
    }
}

/// Sender recorded on every notification produced by the relay.
pub const NOTIFICATION_SENDER: &str = "Debio Network";

/// Append-only notification for an actor state transition.
///
/// Uniqueness in the store: `(to, entity, role, block_number, event_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Recipient account, `0x`-hex.
    pub to: String,
    pub from: String,
    pub role: String,
    /// Classification label, e.g. `Account verified`.
    pub entity: String,
    pub entity_type: String,
    pub reference_id: Option<String>,
    pub description: String,
    pub read: bool,
    pub block_number: u64,
    pub event_index: u32,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Transaction Logs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Order,
    StakingRequestService,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "Order",
            Self::StakingRequestService => "Staking Request Service",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Unpaid,
    Paid,
    Fulfilled,
    Refunded,
    Cancelled,
    Stake,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::Paid => "Paid",
            Self::Fulfilled => "Fulfilled",
            Self::Refunded => "Refunded",
            Self::Cancelled => "Cancelled",
            Self::Stake => "Stake",
        }
    }
}

/// One row of the commerce audit trail.
///
/// Unique on `(block_number, event_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLog {
    pub address: String,
    pub amount: u128,
    pub currency: String,
    /// Order id or request hash.
    pub ref_number: String,
    pub transaction_type: TransactionType,
    pub transaction_status: TransactionStatus,
    pub block_number: u64,
    pub event_index: u32,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Listener State
// =============================================================================

/// Last chain position handed to the dispatcher.
///
/// Keyed by chain so a database can never be reused across chains silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerCursor {
    /// Chain identifier (genesis hash).
    pub chain_id: String,
    pub last_block_number: u64,
    pub last_block_hash: BlockHash,
    pub last_event_index: u32,
    pub updated_at: DateTime<Utc>,
}

impl ListenerCursor {
    pub fn position(&self) -> (u64, u32) {
        (self.last_block_number, self.last_event_index)
    }

    /// Whether an event at `block` was already dispatched.
    pub fn covers(&self, block: &BlockMetadata) -> bool {
        block.position() <= self.position()
    }
}

// =============================================================================
// Tests
// =============================================================================
