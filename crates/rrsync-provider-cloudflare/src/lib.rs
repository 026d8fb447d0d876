// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider for rrsync.
//
// ## Behavior
//
// - One HTTP request per operation (plus one zone lookup per call when no
//   zone ID is configured)
// - Full error propagation to the engine; no retries, backoff or caching
// - HTTP timeout of 30 seconds
// - Record names cross the trait boundary relative to the zone (`@`, `www`)
//   and are expanded to FQDNs only on the wire
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Construction fails (it does not panic) if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=N&per_page=100`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use rrsync_core::config::ProviderConfig;
use rrsync_core::traits::{DnsProvider, DnsProviderFactory};
use rrsync_core::{DesiredRecord, Error, ObservedRecord, RecordType, Registry, Result, UpdateOp};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::net::IpAddr;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Records requested per list page
pub const PER_PAGE: u32 = 100;

/// Smallest explicit TTL Cloudflare accepts
pub const MIN_TTL_SECS: u64 = 60;

/// TTL value meaning "automatic"
const AUTO_TTL: u32 = 1;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "cloudflare";

/// Response envelope shared by every v4 endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DnsRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
}

/// Cloudflare DNS provider
///
/// # Security
///
/// The Debug implementation does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone ID (optional, looked up from the zone name otherwise)
    zone_id: Option<String>,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `zone_id`: Optional zone ID (looked up by zone name when absent)
    /// - `api_base`: Optional API base override
    pub fn new(
        api_token: impl Into<String>,
        zone_id: Option<String>,
        api_base: Option<String>,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api_base = api_base
            .unwrap_or_else(|| CLOUDFLARE_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_token,
            zone_id,
            api_base,
            client,
        })
    }

    /// Get the zone ID, from configuration or via `GET /zones?name=`
    async fn zone_id(&self, zone: &str) -> Result<String> {
        if let Some(ref zone_id) = self.zone_id {
            return Ok(zone_id.clone());
        }

        tracing::debug!("Looking up zone ID for {}", zone);
        let request = self
            .client
            .get(format!("{}/zones", self.api_base))
            .query(&[("name", zone)]);
        let (zones, _): (Vec<Zone>, _) = self.send(request, "zone lookup").await?;

        let zone_id = zones
            .into_iter()
            .next()
            .map(|z| z.id)
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", zone)))?;

        tracing::debug!("Found zone ID: {}", zone_id);
        Ok(zone_id)
    }

    /// Send an authenticated request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<(T, Option<ResultInfo>)> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::http(format!("Cloudflare {} failed: {}", context, e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::http(format!("Failed to read Cloudflare {} response: {}", context, e))
        })?;

        if !status.is_success() {
            return Err(map_status(status.as_u16(), &body, context));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::provider(
                PROVIDER,
                format!("Unexpected {} response: {}", context, e),
            )
        })?;

        match envelope.result {
            Some(result) if envelope.success => Ok((result, envelope.result_info)),
            _ => Err(Error::provider(
                PROVIDER,
                format!("{} failed: {}", context, describe(&envelope.errors)),
            )),
        }
    }
}

fn describe(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{} ({})", e.message, e.code))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Map a non-success HTTP status to an error
fn map_status(status: u16, body: &str, context: &str) -> Error {
    let detail = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .map(|envelope| describe(&envelope.errors))
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        401 | 403 => Error::auth(format!(
            "Cloudflare {}: invalid API token or insufficient permissions (HTTP {}): {}",
            context, status, detail
        )),
        404 => Error::not_found(format!("Cloudflare {}: {}", context, detail)),
        429 => Error::rate_limited(format!("Cloudflare {}: {}", context, detail)),
        _ => Error::provider(
            PROVIDER,
            format!("{} failed: HTTP {}: {}", context, status, detail),
        ),
    }
}

/// Expand a zone-relative name to the FQDN Cloudflare expects
///
/// Only `@` means the apex; an empty name is rejected.
pub fn to_fqdn(name: &str, zone: &str) -> Result<String> {
    match name {
        "" => Err(Error::invalid_input(format!(
            "Empty record name in zone {} (use \"@\" for the apex)",
            zone
        ))),
        "@" => Ok(zone.to_string()),
        label => Ok(format!("{}.{}", label, zone)),
    }
}

/// Reduce a Cloudflare FQDN to a zone-relative name
pub fn to_relative(fqdn: &str, zone: &str) -> String {
    if fqdn.eq_ignore_ascii_case(zone) {
        return "@".to_string();
    }
    let suffix = format!(".{}", zone);
    if fqdn.len() > suffix.len()
        && fqdn.is_char_boundary(fqdn.len() - suffix.len())
        && fqdn[fqdn.len() - suffix.len()..].eq_ignore_ascii_case(&suffix)
    {
        return fqdn[..fqdn.len() - suffix.len()].to_string();
    }
    fqdn.to_string()
}

fn record_body(
    name: &str,
    zone: &str,
    record_type: RecordType,
    value: IpAddr,
) -> Result<serde_json::Value> {
    Ok(json!({
        "type": record_type.as_str(),
        "name": to_fqdn(name, zone)?,
        "content": value.to_string(),
        "ttl": AUTO_TTL,
    }))
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn list_records(&self, zone: &str) -> Result<Vec<ObservedRecord>> {
        let zone_id = self.zone_id(zone).await?;
        let url = format!("{}/zones/{}/dns_records", self.api_base, zone_id);

        let mut records = Vec::new();
        let mut page = 1u32;
        loop {
            let request = self.client.get(&url).query(&[
                ("page", page.to_string()),
                ("per_page", PER_PAGE.to_string()),
            ]);
            let (batch, info): (Vec<DnsRecord>, _) = self.send(request, "record list").await?;
            let received = batch.len();

            for record in batch {
                match record.record_type.parse::<RecordType>() {
                    Ok(record_type) => records.push(ObservedRecord::new(
                        record.id,
                        to_relative(&record.name, zone),
                        record_type,
                        record.content,
                    )),
                    Err(_) => tracing::debug!(
                        "Ignoring {} record {}",
                        record.record_type,
                        record.name
                    ),
                }
            }

            let total_pages = info.map(|i| i.total_pages).unwrap_or(1);
            if received == 0 || page >= total_pages {
                break;
            }
            page += 1;
        }

        tracing::debug!("Cloudflare zone {}: {} A/AAAA records", zone, records.len());
        Ok(records)
    }

    async fn create_record(&self, zone: &str, record: &DesiredRecord) -> Result<()> {
        let body = record_body(&record.name, zone, record.record_type, record.value)?;
        let zone_id = self.zone_id(zone).await?;
        let request = self
            .client
            .post(format!("{}/zones/{}/dns_records", self.api_base, zone_id))
            .json(&body);

        let _: (serde_json::Value, _) = self.send(request, "record create").await?;
        tracing::debug!("Cloudflare record created: {}", record);
        Ok(())
    }

    async fn update_record(&self, zone: &str, update: &UpdateOp) -> Result<()> {
        let body = record_body(&update.name, zone, update.record_type, update.value)?;
        let zone_id = self.zone_id(zone).await?;
        let request = self
            .client
            .put(format!(
                "{}/zones/{}/dns_records/{}",
                self.api_base, zone_id, update.record_id
            ))
            .json(&body);

        let _: (serde_json::Value, _) = self.send(request, "record update").await?;
        tracing::debug!("Cloudflare record updated: {}", update);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn min_ttl_secs(&self) -> u64 {
        MIN_TTL_SECS
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory;

impl DnsProviderFactory for CloudflareFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Cloudflare {
                api_token,
                zone_id,
                api_base,
            } => Ok(Box::new(CloudflareProvider::new(
                api_token.clone(),
                zone_id.clone(),
                api_base.clone(),
            )?)),
            _ => Err(Error::config("Invalid config for Cloudflare provider")),
        }
    }
}

/// Register the Cloudflare provider with a registry
///
/// # Example
///
/// ```rust
/// use rrsync_core::Registry;
///
/// let mut registry = Registry::new();
/// rrsync_provider_cloudflare::register(&mut registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &mut Registry) {
    registry.register_provider(PROVIDER, Box::new(CloudflareFactory));
}
