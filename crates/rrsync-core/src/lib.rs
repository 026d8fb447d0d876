// # rrsync-core
//
// Core library for rrsync, a Dynamic DNS record synchronizer.
//
// ## Architecture Overview
//
// - **AddressSet**: The current address(es), at most one per family
// - **desired::build**: Desired record set from addresses and record names
// - **reconcile::reconcile**: Minimal create/update plan from desired vs observed
// - **AddressSource**: Trait for determining the current addresses
// - **DnsProvider**: Trait for listing, creating and updating records
// - **SyncEngine**: Drives fetch → build → list → reconcile → apply on an interval
// - **Registry**: Name → factory map used to build sources and providers from config
//
// ## Design Principles
//
// 1. **Pure core**: Builder and reconciler do no I/O and never fail
// 2. **Stateless**: Every cycle starts from the live provider response
// 3. **Plugin-Based**: Sources and providers are registered, no hard-coded if-else
// 4. **Library-First**: The daemon is a thin shell around this crate

pub mod address;
pub mod config;
pub mod desired;
pub mod engine;
pub mod error;
pub mod reconcile;
pub mod record;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use address::AddressSet;
pub use config::{AddressSourceConfig, EngineConfig, ProviderConfig, ResponseFormat, SyncConfig};
pub use engine::{CycleOutcome, EngineEvent, SyncEngine};
pub use error::{Error, Result};
pub use reconcile::{Plan, reconcile};
pub use record::{DesiredRecord, DesiredSet, ObservedRecord, Operation, RecordType, UpdateOp};
pub use registry::Registry;
pub use traits::{AddressSource, DnsProvider};
