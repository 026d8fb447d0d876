// # Address Source Trait
//
// Defines the interface for determining the current address(es) of the
// synchronized host.
//
// ## Implementations
//
// - HTTP lookup services (ipify, myip, any URL): `rrsync-ip-http` crate
// - Upstream hostname resolution: `rrsync-ip-resolve` crate
//
// ## Usage
//
// ```rust,ignore
// use rrsync_core::AddressSource;
//
// #[tokio::main]
// async fn main() -> rrsync_core::Result<()> {
//     let source = /* AddressSource implementation */;
//
//     let addresses = source.fetch().await?;
//     println!("IPv4: {:?}, IPv6: {:?}", addresses.ipv4, addresses.ipv6);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::address::AddressSet;

/// Trait for address source implementations
///
/// The logical target (a lookup URL, an upstream hostname) is bound when the
/// source is constructed; `fetch()` only reports what that target says right
/// now.
///
/// # Allowed Capabilities
/// - Perform the lookup I/O (HTTP request, name resolution)
///
/// # Forbidden Capabilities
/// - Cache results between calls (every cycle must see a fresh answer)
/// - Retry or sleep (owned by the caller)
/// - Spawn tasks
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Fetch the current address(es)
    ///
    /// # Returns
    ///
    /// - `Ok(AddressSet)`: The addresses observed. May be empty when the
    ///   target answered but nothing usable came back.
    /// - `Err(Error::Resolution)`: If the lookup itself failed
    async fn fetch(&self) -> Result<AddressSet, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing address sources from configuration
pub trait AddressSourceFactory: Send + Sync {
    /// Create an AddressSource instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration for this address source type
    ///
    /// # Returns
    ///
    /// A boxed AddressSource trait object
    fn create(
        &self,
        config: &crate::config::AddressSourceConfig,
    ) -> Result<Box<dyn AddressSource>, crate::Error>;
}
