// # HTTP Address Source
//
// This crate provides address sources backed by public "what is my IP"
// lookup services.
//
// ## Sources
//
// - `ipify`: https://api.ipify.org?format=json
// - `myip`: https://api.myip.com
// - `http`: any URL answering with `{"ip": "..."}` or a plain-text address
//
// ## Architecture
//
// One GET request per `fetch()`. No caching and no retries: the engine asks
// again on its next cycle.

use rrsync_core::config::{AddressSourceConfig, ResponseFormat};
use rrsync_core::traits::{AddressSource, AddressSourceFactory};
use rrsync_core::{AddressSet, Error, Registry, Result};

use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

/// ipify lookup endpoint (JSON)
pub const IPIFY_URL: &str = "https://api.ipify.org?format=json";

/// myip.com lookup endpoint (JSON)
pub const MYIP_URL: &str = "https://api.myip.com";

/// Default HTTP timeout for lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON body returned by ipify and myip.com
#[derive(Debug, Deserialize)]
struct LookupResponse {
    ip: String,
}

/// Address source querying an HTTP lookup service
pub struct HttpAddressSource {
    /// Registry name, used in logs and errors
    name: &'static str,

    /// URL to fetch the address from
    url: String,

    /// Body format of the response
    format: ResponseFormat,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpAddressSource {
    /// Create a new HTTP address source
    ///
    /// # Parameters
    ///
    /// - `name`: Source name used in logs (e.g., "ipify")
    /// - `url`: Lookup URL
    /// - `format`: Expected body format
    pub fn new(name: &'static str, url: impl Into<String>, format: ResponseFormat) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name,
            url: url.into(),
            format,
            client,
        })
    }

    /// Source for https://api.ipify.org
    pub fn ipify() -> Result<Self> {
        Self::new("ipify", IPIFY_URL, ResponseFormat::Json)
    }

    /// Source for https://api.myip.com
    pub fn myip() -> Result<Self> {
        Self::new("myip", MYIP_URL, ResponseFormat::Json)
    }

    /// Lookup URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parse a response body into an address
    fn parse_body(&self, body: &str) -> Result<IpAddr> {
        let raw = match self.format {
            ResponseFormat::Json => {
                let response: LookupResponse = serde_json::from_str(body).map_err(|e| {
                    Error::resolution(format!("{}: unexpected response body: {}", self.name, e))
                })?;
                response.ip
            }
            ResponseFormat::Text => body.to_string(),
        };

        let raw = raw.trim();
        raw.parse().map_err(|_| {
            Error::resolution(format!("{}: invalid IP address: {:?}", self.name, raw))
        })
    }
}

#[async_trait::async_trait]
impl AddressSource for HttpAddressSource {
    async fn fetch(&self) -> Result<AddressSet> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::resolution(format!("{}: request failed: {}", self.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::resolution(format!(
                "{}: HTTP {}: {}",
                self.name,
                status,
                body.trim()
            )));
        }

        let body = response.text().await.map_err(|e| {
            Error::resolution(format!("{}: failed to read response: {}", self.name, e))
        })?;

        let ip = self.parse_body(&body)?;
        tracing::debug!("{} reports {}", self.name, ip);

        Ok(AddressSet::from_addrs([ip]))
    }

    fn source_name(&self) -> &'static str {
        self.name
    }
}

/// Factory for creating HTTP address sources
pub struct HttpFactory;

impl AddressSourceFactory for HttpFactory {
    fn create(&self, config: &AddressSourceConfig) -> Result<Box<dyn AddressSource>> {
        let source = match config {
            AddressSourceConfig::Ipify => HttpAddressSource::ipify()?,
            AddressSourceConfig::Myip => HttpAddressSource::myip()?,
            AddressSourceConfig::Http { url, format } => {
                HttpAddressSource::new("http", url.clone(), *format)?
            }
            _ => return Err(Error::config("Invalid config for HTTP address source")),
        };

        Ok(Box::new(source))
    }
}

/// Register the HTTP address sources with a registry
pub fn register(registry: &mut Registry) {
    registry.register_address_source("ipify", Box::new(HttpFactory));
    registry.register_address_source("myip", Box::new(HttpFactory));
    registry.register_address_source("http", Box::new(HttpFactory));
}
