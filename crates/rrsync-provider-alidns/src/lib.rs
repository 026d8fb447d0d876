// # Alibaba Cloud DNS Provider
//
// This crate provides an Alibaba Cloud DNS (Alidns) provider for rrsync.
//
// ## Behavior
//
// - One signed RPC request per operation, no retries (the engine simply
//   tries again on its next cycle)
// - `DescribeDomainRecords` is paged with `PageSize=500` until `TotalCount`
//   records have been read
// - Only A and AAAA records are reported; everything else in the zone is
//   ignored
// - HTTP timeout of 30 seconds
//
// ## Security Requirements
//
// - The AccessKey secret NEVER appears in logs or `Debug` output
// - Construction fails (it does not panic) on empty credentials
//
// ## API Reference
//
// - Alidns API 2015-01-09: https://help.aliyun.com/document_detail/29739.html
// - Signature V3: https://help.aliyun.com/document_detail/2593177.html

pub mod signature;

use async_trait::async_trait;
use rrsync_core::config::ProviderConfig;
use rrsync_core::traits::{DnsProvider, DnsProviderFactory};
use rrsync_core::{DesiredRecord, Error, ObservedRecord, RecordType, Registry, Result, UpdateOp};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::Duration;

use crate::signature::SigningInput;

/// Alidns RPC API version
pub const API_VERSION: &str = "2015-01-09";

/// Records requested per `DescribeDomainRecords` page (the API maximum)
pub const PAGE_SIZE: u32 = 500;

/// Smallest TTL Alidns accepts on the free edition
pub const MIN_TTL_SECS: u64 = 600;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider name used in logs and errors
const PROVIDER: &str = "alidns";

/// Default endpoint for a region
pub fn default_endpoint(region_id: &str) -> String {
    format!("https://alidns.{}.aliyuncs.com", region_id)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDomainRecordsResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    domain_records: DomainRecords,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DomainRecords {
    #[serde(default)]
    record: Vec<DomainRecord>,
}

#[derive(Debug, Deserialize)]
struct DomainRecord {
    #[serde(rename = "RecordId")]
    record_id: String,
    #[serde(rename = "RR")]
    rr: String,
    #[serde(rename = "Type")]
    record_type: String,
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: String,
}

/// Alibaba Cloud DNS provider
///
/// # Security
///
/// The Debug implementation does NOT expose the AccessKey secret.
pub struct AlidnsProvider {
    /// AccessKey ID
    access_key_id: String,

    /// AccessKey secret
    /// ⚠️ NEVER log this value
    access_key_secret: String,

    /// API endpoint, e.g. `https://alidns.cn-hangzhou.aliyuncs.com`
    endpoint: reqwest::Url,

    /// Value of the signed `host` header
    host: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for AlidnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlidnsProvider")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl AlidnsProvider {
    /// Create a new Alidns provider
    ///
    /// # Parameters
    ///
    /// - `access_key_id`: AccessKey ID with `AliyunDNSFullAccess`
    /// - `access_key_secret`: Matching AccessKey secret
    /// - `endpoint`: API endpoint (see [`default_endpoint`])
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        endpoint: &str,
    ) -> Result<Self> {
        let access_key_id = access_key_id.into();
        let access_key_secret = access_key_secret.into();
        if access_key_id.is_empty() || access_key_secret.is_empty() {
            return Err(Error::config(
                "Alibaba Cloud AccessKey ID and secret cannot be empty",
            ));
        }

        let endpoint = reqwest::Url::parse(endpoint)
            .map_err(|e| Error::config(format!("Invalid Alidns endpoint {}: {}", endpoint, e)))?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(Error::config(format!(
                    "Alidns endpoint has no host: {}",
                    endpoint
                )));
            }
        };

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            access_key_id,
            access_key_secret,
            endpoint,
            host,
            client,
        })
    }

    /// Create a provider for the default endpoint of a region
    pub fn for_region(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        region_id: &str,
    ) -> Result<Self> {
        Self::new(access_key_id, access_key_secret, &default_endpoint(region_id))
    }

    /// Send one signed RPC call and return the response body
    async fn call(&self, action: &str, params: BTreeMap<String, String>) -> Result<String> {
        let date = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let nonce = uuid::Uuid::new_v4().simple().to_string();

        let signed = signature::sign(
            &self.access_key_id,
            &self.access_key_secret,
            &SigningInput {
                method: "POST",
                host: &self.host,
                action,
                version: API_VERSION,
                params: &params,
                date: &date,
                nonce: &nonce,
            },
        )?;

        let mut url = self.endpoint.clone();
        url.set_path("/");
        url.set_query(Some(&signed.query));

        tracing::debug!("Alidns {} request", action);

        let mut request = self.client.post(url);
        for (name, value) in &signed.headers {
            request = request.header(*name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", action, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read {} response: {}", action, e)))?;

        if !status.is_success() {
            return Err(map_api_error(action, status.as_u16(), &body));
        }

        Ok(body)
    }

    /// Read one page of records
    async fn describe_page(
        &self,
        zone: &str,
        page_number: u32,
    ) -> Result<DescribeDomainRecordsResponse> {
        let params = BTreeMap::from([
            ("DomainName".to_string(), zone.to_string()),
            ("PageNumber".to_string(), page_number.to_string()),
            ("PageSize".to_string(), PAGE_SIZE.to_string()),
        ]);

        let body = self.call("DescribeDomainRecords", params).await?;
        serde_json::from_str(&body).map_err(|e| {
            Error::provider(
                PROVIDER,
                format!("Unexpected DescribeDomainRecords response: {}", e),
            )
        })
    }
}

/// Map a non-success response to an error
fn map_api_error(action: &str, status: u16, body: &str) -> Error {
    let api_error: ApiError = serde_json::from_str(body).unwrap_or_default();
    let detail = if api_error.code.is_empty() {
        format!("{} failed: HTTP {}: {}", action, status, body.trim())
    } else {
        format!(
            "{} failed: {}: {} (request {})",
            action, api_error.code, api_error.message, api_error.request_id
        )
    };

    let code = api_error.code.as_str();
    if matches!(status, 401 | 403)
        || code.starts_with("InvalidAccessKeyId")
        || code.starts_with("Forbidden")
        || code.starts_with("SignatureDoesNotMatch")
    {
        Error::auth(detail)
    } else if status == 429 || code.starts_with("Throttling") {
        Error::rate_limited(detail)
    } else {
        Error::provider(PROVIDER, detail)
    }
}

/// Convert an Alidns record, dropping anything that is not A/AAAA
fn to_observed(record: DomainRecord) -> Option<ObservedRecord> {
    match record.record_type.parse::<RecordType>() {
        Ok(record_type) => Some(ObservedRecord::new(
            record.record_id,
            record.rr,
            record_type,
            record.value,
        )),
        Err(_) => {
            tracing::debug!(
                "Ignoring {} record {} ({})",
                record.record_type,
                record.rr,
                record.record_id
            );
            None
        }
    }
}

fn record_params(name: &str, record_type: RecordType, value: IpAddr) -> [(String, String); 3] {
    [
        ("RR".to_string(), name.to_string()),
        ("Type".to_string(), record_type.as_str().to_string()),
        ("Value".to_string(), value.to_string()),
    ]
}

#[async_trait]
impl DnsProvider for AlidnsProvider {
    /// ```http
    /// POST /?Action=DescribeDomainRecords&DomainName=example.com&PageNumber=1&PageSize=500
    /// ```
    async fn list_records(&self, zone: &str) -> Result<Vec<ObservedRecord>> {
        let mut records = Vec::new();
        let mut read = 0u64;
        let mut page_number = 1;

        loop {
            let page = self.describe_page(zone, page_number).await?;
            let received = page.domain_records.record.len() as u64;
            read += received;
            records.extend(page.domain_records.record.into_iter().filter_map(to_observed));

            if received == 0 || read >= page.total_count {
                break;
            }
            page_number += 1;
        }

        tracing::debug!(
            "Alidns zone {}: {} A/AAAA records ({} total)",
            zone,
            records.len(),
            read
        );
        Ok(records)
    }

    async fn create_record(&self, zone: &str, record: &DesiredRecord) -> Result<()> {
        let mut params = BTreeMap::from(record_params(
            &record.name,
            record.record_type,
            record.value,
        ));
        params.insert("DomainName".to_string(), zone.to_string());

        self.call("AddDomainRecord", params).await?;
        tracing::debug!("Alidns record created: {}", record);
        Ok(())
    }

    async fn update_record(&self, _zone: &str, update: &UpdateOp) -> Result<()> {
        let mut params = BTreeMap::from(record_params(
            &update.name,
            update.record_type,
            update.value,
        ));
        params.insert("RecordId".to_string(), update.record_id.clone());

        self.call("UpdateDomainRecord", params).await?;
        tracing::debug!("Alidns record updated: {}", update);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn min_ttl_secs(&self) -> u64 {
        MIN_TTL_SECS
    }
}

/// Factory for creating Alidns providers
pub struct AlidnsFactory;

impl DnsProviderFactory for AlidnsFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Alidns {
                access_key_id,
                access_key_secret,
                region_id,
                endpoint,
            } => {
                let endpoint = endpoint
                    .clone()
                    .unwrap_or_else(|| default_endpoint(region_id));
                Ok(Box::new(AlidnsProvider::new(
                    access_key_id.clone(),
                    access_key_secret.clone(),
                    &endpoint,
                )?))
            }
            _ => Err(Error::config("Invalid config for Alidns provider")),
        }
    }
}

/// Register the Alidns provider with a registry
///
/// # Example
///
/// ```rust
/// use rrsync_core::Registry;
///
/// let mut registry = Registry::new();
/// rrsync_provider_alidns::register(&mut registry);
/// assert!(registry.has_provider("alidns"));
/// ```
pub fn register(registry: &mut Registry) {
    registry.register_provider(PROVIDER, Box::new(AlidnsFactory));
}
