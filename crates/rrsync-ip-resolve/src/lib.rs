// # Upstream Hostname Address Source
//
// Mirrors the addresses of an upstream hostname: each `fetch()` resolves the
// name with the system resolver and reports the result as an `AddressSet`.
//
// Useful when another host already tracks the dynamic address (a router's
// vendor DDNS name, for instance) and the managed zone should follow it.
//
// ## Multiple Answers
//
// When the name resolves to several addresses of one family, only the last
// one is kept (see `AddressSet::from_addrs`).

use rrsync_core::config::AddressSourceConfig;
use rrsync_core::traits::{AddressSource, AddressSourceFactory};
use rrsync_core::{AddressSet, Error, Registry, Result};

use tokio::net::lookup_host;

/// Address source resolving an upstream hostname
#[derive(Debug, Clone)]
pub struct ResolveAddressSource {
    /// Hostname to resolve
    hostname: String,
}

impl ResolveAddressSource {
    /// Create a new resolving address source
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    /// Hostname being mirrored
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

#[async_trait::async_trait]
impl AddressSource for ResolveAddressSource {
    async fn fetch(&self) -> Result<AddressSet> {
        // lookup_host wants a socket address; the port is irrelevant.
        let answers = lookup_host((self.hostname.as_str(), 0))
            .await
            .map_err(|e| {
                Error::resolution(format!("Failed to resolve {}: {}", self.hostname, e))
            })?;

        let addresses = AddressSet::from_addrs(answers.map(|socket| socket.ip()));
        if addresses.is_empty() {
            return Err(Error::resolution(format!(
                "{} resolved to no addresses",
                self.hostname
            )));
        }

        tracing::debug!("{} resolves to {}", self.hostname, addresses);
        Ok(addresses)
    }

    fn source_name(&self) -> &'static str {
        "resolve"
    }
}

/// Factory for creating resolving address sources
pub struct ResolveFactory;

impl AddressSourceFactory for ResolveFactory {
    fn create(&self, config: &AddressSourceConfig) -> Result<Box<dyn AddressSource>> {
        match config {
            AddressSourceConfig::Resolve { hostname } => {
                if hostname.is_empty() {
                    return Err(Error::config("Upstream hostname is required"));
                }
                Ok(Box::new(ResolveAddressSource::new(hostname.clone())))
            }
            _ => Err(Error::config("Invalid config for resolve address source")),
        }
    }
}

/// Register the resolving address source with a registry
pub fn register(registry: &mut Registry) {
    registry.register_address_source("resolve", Box::new(ResolveFactory));
}
