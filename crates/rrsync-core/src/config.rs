//! Configuration types for rrsync
//!
//! All structures deserialize from TOML/JSON with a `type` tag selecting the
//! address source and provider implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::desired::parse_record_names;

/// Main sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Zone managed at the provider (e.g., "example.com")
    pub zone: String,

    /// Record names relative to the zone (e.g., ["@", "www"])
    #[serde(deserialize_with = "deserialize_records")]
    pub records: Vec<String>,

    /// Address source configuration
    pub source: AddressSourceConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SyncConfig {
    /// Create a configuration from its required parts and default engine settings
    pub fn new(
        zone: impl Into<String>,
        records: Vec<String>,
        source: AddressSourceConfig,
        provider: ProviderConfig,
    ) -> Self {
        Self {
            zone: zone.into(),
            records,
            source,
            provider,
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone.is_empty() {
            return Err(crate::Error::config("No zone configured"));
        }

        if self.records.is_empty() {
            return Err(crate::Error::config("No records configured"));
        }

        self.source.validate()?;
        self.provider.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// Records may be written as a list or as a comma-separated string
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordList {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match RecordList::deserialize(deserializer)? {
        RecordList::List(names) => names,
        RecordList::Joined(joined) => parse_record_names(&joined),
    })
}

/// Body format of an HTTP lookup service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// `{"ip": "..."}`
    #[default]
    Json,
    /// The address as plain text
    Text,
}

/// Address source configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AddressSourceConfig {
    /// https://api.ipify.org
    #[default]
    Ipify,

    /// https://api.myip.com
    Myip,

    /// Any HTTP lookup service
    Http {
        /// URL to fetch the address from
        url: String,
        /// Response body format
        #[serde(default)]
        format: ResponseFormat,
    },

    /// Resolve an upstream hostname
    Resolve {
        /// Hostname whose addresses are mirrored
        hostname: String,
    },

    /// Custom address source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl AddressSourceConfig {
    /// Validate the address source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            AddressSourceConfig::Http { url, .. } => {
                if url.is_empty() {
                    return Err(crate::Error::config("HTTP address source URL cannot be empty"));
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "HTTP address source URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
            AddressSourceConfig::Resolve { hostname } => {
                if hostname.is_empty() {
                    return Err(crate::Error::config("Upstream hostname cannot be empty"));
                }
                Ok(())
            }
            AddressSourceConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom address source factory cannot be empty",
                    ));
                }
                Ok(())
            }
            AddressSourceConfig::Ipify | AddressSourceConfig::Myip => Ok(()),
        }
    }

    /// Get the registry name of this source type
    pub fn type_name(&self) -> &str {
        match self {
            AddressSourceConfig::Ipify => "ipify",
            AddressSourceConfig::Myip => "myip",
            AddressSourceConfig::Http { .. } => "http",
            AddressSourceConfig::Resolve { .. } => "resolve",
            AddressSourceConfig::Custom { factory, .. } => factory,
        }
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Alibaba Cloud DNS
    Alidns {
        /// AccessKey ID
        access_key_id: String,
        /// AccessKey secret
        access_key_secret: String,
        /// Region of the API endpoint
        #[serde(default = "default_region_id")]
        region_id: String,
        /// Endpoint override (e.g., for testing)
        #[serde(default)]
        endpoint: Option<String>,
    },

    /// Cloudflare
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// Zone ID (optional, looked up from the zone name otherwise)
        #[serde(default)]
        zone_id: Option<String>,
        /// API base override (e.g., for testing)
        #[serde(default)]
        api_base: Option<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

// Credentials never reach logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Alidns {
                access_key_id,
                region_id,
                endpoint,
                ..
            } => f
                .debug_struct("Alidns")
                .field("access_key_id", access_key_id)
                .field("access_key_secret", &"<REDACTED>")
                .field("region_id", region_id)
                .field("endpoint", endpoint)
                .finish(),
            ProviderConfig::Cloudflare {
                zone_id, api_base, ..
            } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("zone_id", zone_id)
                .field("api_base", api_base)
                .finish(),
            ProviderConfig::Custom { factory, .. } => f
                .debug_struct("Custom")
                .field("factory", factory)
                .finish_non_exhaustive(),
        }
    }
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Alidns {
                access_key_id,
                access_key_secret,
                region_id,
                ..
            } => {
                if access_key_id.is_empty() || access_key_secret.is_empty() {
                    return Err(crate::Error::config(
                        "Alibaba Cloud AccessKey ID and secret are required",
                    ));
                }
                if region_id.is_empty() {
                    return Err(crate::Error::config("Alibaba Cloud region ID cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Cloudflare { api_token, .. } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Alidns { .. } => "alidns",
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

fn default_region_id() -> String {
    "cn-hangzhou".to_string()
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds between sync cycles
    ///
    /// Should not be shorter than the provider's minimum TTL. The default
    /// of 11 minutes sits just above the 600 second floor of Alibaba Cloud DNS.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Compute and log the plan without applying it
    #[serde(default)]
    pub dry_run: bool,

    /// Capacity of the engine event channel
    ///
    /// When full, events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Interval between cycles
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate the engine settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.interval_secs == 0 {
            return Err(crate::Error::config("Sync interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            dry_run: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interval_secs() -> u64 {
    660
}

fn default_event_channel_capacity() -> usize {
    100
}
