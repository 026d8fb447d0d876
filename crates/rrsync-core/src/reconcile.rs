//! Reconciliation of desired and observed records
//!
//! [`reconcile`] partitions the desired set into records that already match,
//! records whose published value must change, and records that must be
//! created. It never produces deletions: published records with no desired
//! counterpart are left alone.
//!
//! ```text
//!   desired ──┐
//!             ├──► reconcile ──► Plan { to_update, to_create }
//!   observed ─┘
//! ```

use crate::record::{DesiredRecord, DesiredSet, ObservedRecord, Operation, UpdateOp};
use std::net::IpAddr;

/// Minimal set of operations bringing the zone to the desired state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Desired records with no published counterpart
    pub to_create: DesiredSet,
    /// Published records whose value differs from the desired one
    pub to_update: Vec<UpdateOp>,
}

impl Plan {
    /// True when the zone already reflects the desired state
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty()
    }

    /// Total number of operations
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len()
    }

    /// Operations in application order: updates first, then creates
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.to_update
            .iter()
            .cloned()
            .map(Operation::Update)
            .chain(self.to_create.iter().cloned().map(Operation::Create))
    }
}

/// Compute the operations needed to make `observed` reflect `desired`.
///
/// Keys are `(name, type)` with byte-exact name comparison. Values are
/// compared as addresses, so `2001:db8::1` and `2001:DB8:0:0:0:0:0:1` are
/// equal. An observed value that does not parse as an address is stale.
///
/// Every observed record is evaluated on its own: if the provider reports
/// the same key twice with stale values, one update is emitted per observed
/// record.
pub fn reconcile(desired: &DesiredSet, observed: &[ObservedRecord]) -> Plan {
    let mut to_create = desired.clone();
    let mut to_update = Vec::new();

    for existing in observed {
        for wanted in desired.iter().filter(|d| d.matches_key(existing)) {
            if !is_satisfied(wanted, existing) {
                to_update.push(UpdateOp {
                    record_id: existing.id.clone(),
                    name: wanted.name.clone(),
                    record_type: wanted.record_type,
                    value: wanted.value,
                });
            }
            to_create.remove(wanted);
        }
    }

    Plan {
        to_create,
        to_update,
    }
}

fn is_satisfied(wanted: &DesiredRecord, existing: &ObservedRecord) -> bool {
    existing
        .value
        .parse::<IpAddr>()
        .is_ok_and(|current| current.to_canonical() == wanted.value.to_canonical())
}
