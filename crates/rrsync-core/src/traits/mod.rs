//! Collaborator traits for rrsync
//!
//! - [`AddressSource`]: Determine the current address(es)
//! - [`DnsProvider`]: List, create and update records via provider APIs

pub mod address_source;
pub mod dns_provider;

pub use address_source::{AddressSource, AddressSourceFactory};
pub use dns_provider::{DnsProvider, DnsProviderFactory};
