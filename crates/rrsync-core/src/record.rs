//! Record types shared by the builder, the reconciler and the providers

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::Error;

/// DNS record type managed by rrsync
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// The record type carrying the given address
    pub fn for_addr(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// Wire name as used by provider APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    // Exact match: providers report types in upper case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(Error::invalid_input(format!(
                "Unsupported record type: {}",
                other
            ))),
        }
    }
}

/// A record that should exist in the zone
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DesiredRecord {
    /// Record name relative to the zone (`@`, `www`, ...)
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Address the record should point to
    pub value: IpAddr,
}

impl DesiredRecord {
    /// Create a desired record; the type follows the address family
    pub fn new(name: impl Into<String>, value: IpAddr) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::for_addr(value),
            value,
        }
    }

    /// True if `observed` has the same `(name, type)` key
    pub fn matches_key(&self, observed: &ObservedRecord) -> bool {
        self.record_type == observed.record_type && self.name == observed.name
    }
}

impl fmt::Display for DesiredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.record_type, self.value)
    }
}

/// The desired record set. Duplicate entries collapse.
pub type DesiredSet = BTreeSet<DesiredRecord>;

/// A record currently published by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedRecord {
    /// Provider-assigned record identifier
    pub id: String,
    /// Record name relative to the zone
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Raw record value as reported by the provider
    pub value: String,
}

impl ObservedRecord {
    /// Create an observed record
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        record_type: RecordType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            record_type,
            value: value.into(),
        }
    }
}

/// Change an existing record's value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateOp {
    /// Provider-assigned identifier of the record to change
    pub record_id: String,
    /// Record name relative to the zone
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// New address
    pub value: IpAddr,
}

impl fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} (id {})",
            self.name, self.record_type, self.value, self.record_id
        )
    }
}

/// A single provider operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create a missing record
    Create(DesiredRecord),
    /// Update a record with a stale value
    Update(UpdateOp),
}
