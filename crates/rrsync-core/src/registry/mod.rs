//! Registry of address sources and DNS providers
//!
//! The registry maps type names to factory objects so the daemon can build
//! its collaborators from configuration without hardcoded if-else chains.
//! It is an ordinary value: built once at start-up, populated by each
//! implementation crate's `register()` function, then passed by reference.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rrsync_core::Registry;
//!
//! let mut registry = Registry::new();
//! rrsync_ip_http::register(&mut registry);
//! rrsync_provider_alidns::register(&mut registry);
//!
//! let source = registry.create_address_source(&config.source)?;
//! let provider = registry.create_provider(&config.provider)?;
//! ```

use crate::config::{AddressSourceConfig, ProviderConfig};
use crate::error::{Error, Result};
use crate::traits::{AddressSource, AddressSourceFactory, DnsProvider, DnsProviderFactory};
use std::collections::BTreeMap;

/// Registry for plugin-based creation of address sources and providers
#[derive(Default)]
pub struct Registry {
    /// Registered DNS provider factories
    providers: BTreeMap<String, Box<dyn DnsProviderFactory>>,

    /// Registered address source factories
    sources: BTreeMap<String, Box<dyn AddressSourceFactory>>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "alidns", "cloudflare")
    /// - `factory`: Factory object for creating provider instances
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register_provider(
        &mut self,
        name: impl Into<String>,
        factory: Box<dyn DnsProviderFactory>,
    ) {
        self.providers.insert(name.into(), factory);
    }

    /// Register an address source factory
    ///
    /// # Parameters
    ///
    /// - `name`: Address source type name (e.g., "ipify", "resolve")
    /// - `factory`: Factory object for creating address source instances
    pub fn register_address_source(
        &mut self,
        name: impl Into<String>,
        factory: Box<dyn AddressSourceFactory>,
    ) {
        self.sources.insert(name.into(), factory);
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If the provider type is not registered or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        let provider_type = config.type_name();

        let factory = self.providers.get(provider_type).ok_or_else(|| {
            Error::config(format!(
                "Unknown provider type: {} (registered: {})",
                provider_type,
                self.list_providers().join(", ")
            ))
        })?;

        factory.create(config)
    }

    /// Create an address source from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn AddressSource>)`: Created address source instance
    /// - `Err(Error)`: If the source type is not registered or creation fails
    pub fn create_address_source(
        &self,
        config: &AddressSourceConfig,
    ) -> Result<Box<dyn AddressSource>> {
        let source_type = config.type_name();

        let factory = self.sources.get(source_type).ok_or_else(|| {
            Error::config(format!(
                "Unknown address source type: {} (registered: {})",
                source_type,
                self.list_address_sources().join(", ")
            ))
        })?;

        factory.create(config)
    }

    /// List all registered provider types, sorted
    pub fn list_providers(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// List all registered address source types, sorted
    pub fn list_address_sources(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Check if an address source type is registered
    pub fn has_address_source(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }
}
