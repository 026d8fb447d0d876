// # DNS Provider Trait
//
// Defines the gateway to a DNS provider's record API.
//
// ## Implementations
//
// - Alibaba Cloud DNS: `rrsync-provider-alidns` crate
// - Cloudflare: `rrsync-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use rrsync_core::{reconcile, DnsProvider};
//
// let observed = provider.list_records("example.com").await?;
// let plan = reconcile::reconcile(&desired, &observed);
// for op in &plan.to_update {
//     provider.update_record("example.com", op).await?;
// }
// ```

use async_trait::async_trait;

use crate::record::{DesiredRecord, ObservedRecord, UpdateOp};

/// Trait for DNS provider implementations
///
/// Providers translate the three record operations into their API calls and
/// nothing else. All request construction, signing and pagination stays
/// behind this trait.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Allowed Capabilities
/// - Perform HTTP/HTTPS API calls to their endpoints only
/// - Parse provider-specific responses
/// - Return success or failure
///
/// # Forbidden Capabilities
/// - Retry or back off (a caller concern)
/// - Decide whether an update is needed (owned by the reconciler)
/// - Cache records between calls
/// - Spawn tasks
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List the A and AAAA records currently published in a zone
    ///
    /// Records of other types are dropped. Names are relative to the zone,
    /// with `@` for the apex.
    ///
    /// # Parameters
    ///
    /// - `zone`: The zone name (e.g., "example.com")
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<ObservedRecord>)`: Every A/AAAA record in the zone
    /// - `Err(Error)`: On transport or authorization failure
    async fn list_records(&self, zone: &str) -> Result<Vec<ObservedRecord>, crate::Error>;

    /// Create a record in a zone
    ///
    /// # Parameters
    ///
    /// - `zone`: The zone name
    /// - `record`: The record to create
    async fn create_record(&self, zone: &str, record: &DesiredRecord)
    -> Result<(), crate::Error>;

    /// Change the value of an existing record
    ///
    /// # Parameters
    ///
    /// - `zone`: The zone name (some APIs address records per zone)
    /// - `update`: Record identifier, name, type and new value
    async fn update_record(&self, zone: &str, update: &UpdateOp) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Smallest TTL the provider accepts, in seconds.
    ///
    /// Syncing more often than this cannot propagate any faster.
    fn min_ttl_secs(&self) -> u64 {
        0
    }
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
