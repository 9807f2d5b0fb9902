//! Raw chain event → typed [`Command`] translation.
//!
//! Every mapped `(pallet, event)` pair has a [`Route`] declaring the ordered
//! names of its positional arguments. Translation is pure:
//!
//! - unmapped pairs yield `Ok(None)`
//! - fewer arguments than the schema yields [`TranslationError::Arity`]
//! - an argument that does not decode yields [`TranslationError::Field`]
//! - trailing arguments beyond the schema are ignored

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use crate::commands::{Command, CommandKind, CommandPayload};
use crate::error::{TranslationError, TranslationResult};
use crate::models::{decode, AccountId, BlockMetadata};

// =============================================================================
// Routing table
// =============================================================================

type Build = fn(&Args<'_>) -> TranslationResult<CommandPayload>;

/// One entry of the routing table.
pub struct Route {
    pub pallet: &'static str,
    pub event: &'static str,
    /// Ordered names of the positional arguments.
    pub schema: &'static [&'static str],
    pub kind: CommandKind,
    build: Build,
}

macro_rules! route {
    ($pallet:literal, $event:literal, [$($field:literal),+], $kind:ident, $build:expr) => {
        Route {
            pallet: $pallet,
            event: $event,
            schema: &[$($field),+],
            kind: CommandKind::$kind,
            build: $build,
        }
    };
}

static ROUTES: &[Route] = &[
    // Orders
    route!("Orders", "OrderCreated", ["order"], OrderCreated, |a| {
        Ok(CommandPayload::OrderCreated(a.decode(0)?))
    }),
    route!("Orders", "OrderPaid", ["order"], OrderPaid, |a| {
        Ok(CommandPayload::OrderPaid(a.decode(0)?))
    }),
    route!("Orders", "OrderFulfilled", ["order"], OrderFulfilled, |a| {
        Ok(CommandPayload::OrderFulfilled(a.decode(0)?))
    }),
    route!("Orders", "OrderRefunded", ["order"], OrderRefunded, |a| {
        Ok(CommandPayload::OrderRefunded(a.decode(0)?))
    }),
    route!("Orders", "OrderCancelled", ["order"], OrderCancelled, |a| {
        Ok(CommandPayload::OrderCancelled(a.decode(0)?))
    }),
    // Services
    route!("Services", "ServiceCreated", ["service", "owner"], ServiceCreated, |a| {
        Ok(CommandPayload::ServiceCreated {
            service: a.decode(0)?,
            owner: a.account(1)?,
        })
    }),
    route!("Services", "ServiceUpdated", ["service", "owner"], ServiceUpdated, |a| {
        Ok(CommandPayload::ServiceUpdated {
            service: a.decode(0)?,
            owner: a.account(1)?,
        })
    }),
    route!("Services", "ServiceDeleted", ["service", "owner"], ServiceDeleted, |a| {
        Ok(CommandPayload::ServiceDeleted {
            service: a.decode(0)?,
            owner: a.account(1)?,
        })
    }),
    // Service requests
    route!(
        "ServiceRequest",
        "ServiceRequestCreated",
        ["requester", "request"],
        ServiceRequestCreated,
        |a| {
            Ok(CommandPayload::ServiceRequestCreated {
                requester: a.account(0)?,
                request: a.decode(1)?,
            })
        }
    ),
    route!(
        "ServiceRequest",
        "ServiceRequestClaimed",
        ["lab", "offer"],
        ServiceRequestClaimed,
        |a| {
            Ok(CommandPayload::ServiceRequestClaimed {
                lab: a.account(0)?,
                offer: a.decode(1)?,
            })
        }
    ),
    route!(
        "ServiceRequest",
        "ServiceRequestProcessed",
        ["requester", "invoice"],
        ServiceRequestProcessed,
        |a| {
            Ok(CommandPayload::ServiceRequestProcessed {
                requester: a.account(0)?,
                invoice: a.decode(1)?,
            })
        }
    ),
    route!(
        "ServiceRequest",
        "ServiceRequestFinalized",
        ["requester", "invoice"],
        ServiceRequestFinalized,
        |a| {
            Ok(CommandPayload::ServiceRequestFinalized {
                requester: a.account(0)?,
                invoice: a.decode(1)?,
            })
        }
    ),
    // Labs
    route!("Labs", "LabRegistered", ["lab"], LabRegistered, |a| {
        Ok(CommandPayload::LabRegistered(a.decode(0)?))
    }),
    route!("Labs", "LabUpdated", ["lab"], LabUpdated, |a| {
        Ok(CommandPayload::LabUpdated(a.decode(0)?))
    }),
    route!(
        "Labs",
        "LabUpdateVerificationStatus",
        ["lab"],
        LabVerificationStatusChanged,
        |a| Ok(CommandPayload::LabVerificationStatusChanged(a.decode(0)?))
    ),
    route!("Labs", "LabDeregistered", ["lab"], LabDeregistered, |a| {
        Ok(CommandPayload::LabDeregistered(a.decode(0)?))
    }),
    // Genetic analysts
    route!(
        "GeneticAnalysts",
        "GeneticAnalystRegistered",
        ["genetic_analyst"],
        GeneticAnalystRegistered,
        |a| Ok(CommandPayload::GeneticAnalystRegistered(a.decode(0)?))
    ),
    route!(
        "GeneticAnalysts",
        "GeneticAnalystUpdated",
        ["genetic_analyst"],
        GeneticAnalystUpdated,
        |a| Ok(CommandPayload::GeneticAnalystUpdated(a.decode(0)?))
    ),
    route!(
        "GeneticAnalysts",
        "GeneticAnalystStakeSuccessful",
        ["genetic_analyst", "account_id"],
        GeneticAnalystStaked,
        |a| {
            Ok(CommandPayload::GeneticAnalystStaked {
                analyst: a.decode(0)?,
                account: a.account(1)?,
            })
        }
    ),
    route!(
        "GeneticAnalysts",
        "GeneticAnalystUpdateVerificationStatus",
        ["genetic_analyst", "account_id"],
        GeneticAnalystVerificationStatusChanged,
        |a| {
            Ok(CommandPayload::GeneticAnalystVerificationStatusChanged {
                analyst: a.decode(0)?,
                account: a.account(1)?,
            })
        }
    ),
    route!(
        "GeneticAnalysts",
        "GeneticAnalystDeleted",
        ["genetic_analyst"],
        GeneticAnalystDeregistered,
        |a| Ok(CommandPayload::GeneticAnalystDeregistered(a.decode(0)?))
    ),
];

/// All mapped routes, in table order.
pub fn routes() -> &'static [Route] {
    ROUTES
}

/// Find the route for a `(pallet, event)` pair.
pub fn route(pallet: &str, event: &str) -> Option<&'static Route> {
    ROUTES
        .iter()
        .find(|r| r.pallet == pallet && r.event == event)
}

// =============================================================================
// Translation
// =============================================================================

/// Translate a raw chain event into a command.
pub fn translate(
    pallet: &str,
    event: &str,
    args: &[Value],
    block: &BlockMetadata,
) -> TranslationResult<Option<Command>> {
    let Some(route) = route(pallet, event) else {
        return Ok(None);
    };

    if args.len() < route.schema.len() {
        return Err(TranslationError::Arity {
            pallet: pallet.to_string(),
            event: event.to_string(),
            expected: route.schema.len(),
            actual: args.len(),
            args: raw_args(args),
        });
    }

    if args.len() > route.schema.len() {
        trace!(
            pallet,
            event,
            extra = args.len() - route.schema.len(),
            "Ignoring trailing event arguments"
        );
    }

    let payload = (route.build)(&Args { route, raw: args })?;
    Ok(Some(Command::new(payload, block.clone())))
}

fn raw_args(args: &[Value]) -> String {
    Value::Array(args.to_vec()).to_string()
}

/// Positional argument access for a route's builder.
struct Args<'a> {
    route: &'static Route,
    raw: &'a [Value],
}

impl Args<'_> {
    fn fault(&self, index: usize, reason: String) -> TranslationError {
        TranslationError::Field {
            pallet: self.route.pallet.to_string(),
            event: self.route.event.to_string(),
            field: self.route.schema[index],
            index,
            reason,
            args: raw_args(self.raw),
        }
    }

    fn decode<T: DeserializeOwned>(&self, index: usize) -> TranslationResult<T> {
        serde_json::from_value(self.raw[index].clone()).map_err(|e| self.fault(index, e.to_string()))
    }

    fn account(&self, index: usize) -> TranslationResult<AccountId> {
        decode::parse_account(&self.raw[index])
            .ok_or_else(|| self.fault(index, format!("not an account id: {}", self.raw[index])))
    }
}
