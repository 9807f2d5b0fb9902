//! Typed commands produced by the translator.
//!
//! A [`Command`] is built once from one chain event and consumed once by the
//! single handler registered for its [`CommandKind`].

use std::fmt;

use crate::models::{
    AccountId, BlockMetadata, GeneticAnalyst, Lab, Order, Request, Service, ServiceInvoice,
    ServiceOffer,
};

/// Discriminant of [`CommandPayload`], used as the routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    OrderCreated,
    OrderPaid,
    OrderFulfilled,
    OrderRefunded,
    OrderCancelled,
    ServiceCreated,
    ServiceUpdated,
    ServiceDeleted,
    ServiceRequestCreated,
    ServiceRequestClaimed,
    ServiceRequestProcessed,
    ServiceRequestFinalized,
    LabRegistered,
    LabUpdated,
    LabVerificationStatusChanged,
    LabDeregistered,
    GeneticAnalystRegistered,
    GeneticAnalystUpdated,
    GeneticAnalystStaked,
    GeneticAnalystVerificationStatusChanged,
    GeneticAnalystDeregistered,
}

impl CommandKind {
    pub const ALL: [CommandKind; 21] = [
        Self::OrderCreated,
        Self::OrderPaid,
        Self::OrderFulfilled,
        Self::OrderRefunded,
        Self::OrderCancelled,
        Self::ServiceCreated,
        Self::ServiceUpdated,
        Self::ServiceDeleted,
        Self::ServiceRequestCreated,
        Self::ServiceRequestClaimed,
        Self::ServiceRequestProcessed,
        Self::ServiceRequestFinalized,
        Self::LabRegistered,
        Self::LabUpdated,
        Self::LabVerificationStatusChanged,
        Self::LabDeregistered,
        Self::GeneticAnalystRegistered,
        Self::GeneticAnalystUpdated,
        Self::GeneticAnalystStaked,
        Self::GeneticAnalystVerificationStatusChanged,
        Self::GeneticAnalystDeregistered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderCreated => "OrderCreated",
            Self::OrderPaid => "OrderPaid",
            Self::OrderFulfilled => "OrderFulfilled",
            Self::OrderRefunded => "OrderRefunded",
            Self::OrderCancelled => "OrderCancelled",
            Self::ServiceCreated => "ServiceCreated",
            Self::ServiceUpdated => "ServiceUpdated",
            Self::ServiceDeleted => "ServiceDeleted",
            Self::ServiceRequestCreated => "ServiceRequestCreated",
            Self::ServiceRequestClaimed => "ServiceRequestClaimed",
            Self::ServiceRequestProcessed => "ServiceRequestProcessed",
            Self::ServiceRequestFinalized => "ServiceRequestFinalized",
            Self::LabRegistered => "LabRegistered",
            Self::LabUpdated => "LabUpdated",
            Self::LabVerificationStatusChanged => "LabVerificationStatusChanged",
            Self::LabDeregistered => "LabDeregistered",
            Self::GeneticAnalystRegistered => "GeneticAnalystRegistered",
            Self::GeneticAnalystUpdated => "GeneticAnalystUpdated",
            Self::GeneticAnalystStaked => "GeneticAnalystStaked",
            Self::GeneticAnalystVerificationStatusChanged => {
                "GeneticAnalystVerificationStatusChanged"
            }
            Self::GeneticAnalystDeregistered => "GeneticAnalystDeregistered",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded payload of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPayload {
    OrderCreated(Order),
    OrderPaid(Order),
    OrderFulfilled(Order),
    OrderRefunded(Order),
    OrderCancelled(Order),
    ServiceCreated { service: Service, owner: AccountId },
    ServiceUpdated { service: Service, owner: AccountId },
    ServiceDeleted { service: Service, owner: AccountId },
    ServiceRequestCreated { requester: AccountId, request: Request },
    ServiceRequestClaimed { lab: AccountId, offer: ServiceOffer },
    ServiceRequestProcessed { requester: AccountId, invoice: ServiceInvoice },
    ServiceRequestFinalized { requester: AccountId, invoice: ServiceInvoice },
    LabRegistered(Lab),
    LabUpdated(Lab),
    LabVerificationStatusChanged(Lab),
    LabDeregistered(Lab),
    GeneticAnalystRegistered(GeneticAnalyst),
    GeneticAnalystUpdated(GeneticAnalyst),
    GeneticAnalystStaked { analyst: GeneticAnalyst, account: AccountId },
    GeneticAnalystVerificationStatusChanged { analyst: GeneticAnalyst, account: AccountId },
    GeneticAnalystDeregistered(GeneticAnalyst),
}

impl CommandPayload {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::OrderCreated(_) => CommandKind::OrderCreated,
            Self::OrderPaid(_) => CommandKind::OrderPaid,
            Self::OrderFulfilled(_) => CommandKind::OrderFulfilled,
            Self::OrderRefunded(_) => CommandKind::OrderRefunded,
            Self::OrderCancelled(_) => CommandKind::OrderCancelled,
            Self::ServiceCreated { .. } => CommandKind::ServiceCreated,
            Self::ServiceUpdated { .. } => CommandKind::ServiceUpdated,
            Self::ServiceDeleted { .. } => CommandKind::ServiceDeleted,
            Self::ServiceRequestCreated { .. } => CommandKind::ServiceRequestCreated,
            Self::ServiceRequestClaimed { .. } => CommandKind::ServiceRequestClaimed,
            Self::ServiceRequestProcessed { .. } => CommandKind::ServiceRequestProcessed,
            Self::ServiceRequestFinalized { .. } => CommandKind::ServiceRequestFinalized,
            Self::LabRegistered(_) => CommandKind::LabRegistered,
            Self::LabUpdated(_) => CommandKind::LabUpdated,
            Self::LabVerificationStatusChanged(_) => CommandKind::LabVerificationStatusChanged,
            Self::LabDeregistered(_) => CommandKind::LabDeregistered,
            Self::GeneticAnalystRegistered(_) => CommandKind::GeneticAnalystRegistered,
            Self::GeneticAnalystUpdated(_) => CommandKind::GeneticAnalystUpdated,
            Self::GeneticAnalystStaked { .. } => CommandKind::GeneticAnalystStaked,
            Self::GeneticAnalystVerificationStatusChanged { .. } => {
                CommandKind::GeneticAnalystVerificationStatusChanged
            }
            Self::GeneticAnalystDeregistered(_) => CommandKind::GeneticAnalystDeregistered,
        }
    }
}

/// A decoded chain event together with where it was emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub payload: CommandPayload,
    pub block: BlockMetadata,
}

impl Command {
    pub fn new(payload: CommandPayload, block: BlockMetadata) -> Self {
        Self { payload, block }
    }

    pub fn kind(&self) -> CommandKind {
        self.payload.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn command_kind_names_are_unique() {
        let names: HashSet<_> = CommandKind::ALL.iter().map(CommandKind::as_str).collect();
        assert_eq!(names.len(), CommandKind::ALL.len());
    }
}
