//! Command-line flags and their translation into a `SyncConfig`

use anyhow::{Context, Result, bail};
use clap::Parser;
use rrsync_core::desired::parse_record_names;
use rrsync_core::{AddressSourceConfig, ProviderConfig, ResponseFormat, SyncConfig};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Keep DNS A/AAAA records in sync with this host's public address
#[derive(Parser, Debug, Clone)]
#[command(name = "rrsyncd", version, about, long_about = None)]
pub struct Args {
    /// TOML configuration file; replaces the zone, record, source and provider flags
    #[arg(short, long, env = "RRSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// DNS provider (alidns, cloudflare)
    #[arg(long, env = "RRSYNC_PROVIDER", default_value = "alidns")]
    pub provider: String,

    /// Alibaba Cloud AccessKey ID
    #[arg(long, env = "RRSYNC_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    /// Alibaba Cloud AccessKey secret
    #[arg(long, env = "RRSYNC_ACCESS_KEY_SECRET", hide_env_values = true)]
    pub access_key_secret: Option<String>,

    /// Alibaba Cloud region of the DNS endpoint
    #[arg(long, env = "RRSYNC_REGION_ID", default_value = "cn-hangzhou")]
    pub region_id: String,

    /// Cloudflare API token
    #[arg(long, env = "RRSYNC_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Cloudflare zone ID (looked up by zone name when omitted)
    #[arg(long, env = "RRSYNC_ZONE_ID")]
    pub zone_id: Option<String>,

    /// Zone to manage, e.g. example.com
    #[arg(long, env = "RRSYNC_ZONE")]
    pub zone: Option<String>,

    /// Comma-separated record names relative to the zone, e.g. "@,www"
    #[arg(long, env = "RRSYNC_RECORDS")]
    pub records: Option<String>,

    /// Address source (ipify, myip, http, resolve)
    #[arg(long, env = "RRSYNC_SOURCE", default_value = "ipify")]
    pub source: String,

    /// Lookup URL for the http source
    #[arg(long, env = "RRSYNC_SOURCE_URL")]
    pub source_url: Option<String>,

    /// Body format of the http source (json, text)
    #[arg(long, env = "RRSYNC_SOURCE_FORMAT", default_value = "json")]
    pub source_format: String,

    /// Hostname mirrored by the resolve source
    #[arg(long, env = "RRSYNC_UPSTREAM_HOST")]
    pub upstream_host: Option<String>,

    /// Seconds between sync cycles
    #[arg(long, env = "RRSYNC_INTERVAL_SECS", default_value_t = 660)]
    pub interval_secs: u64,

    /// Log the plan without changing any record
    #[arg(long, env = "RRSYNC_DRY_RUN")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RRSYNC_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Parse the log level
    pub fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            other => bail!(
                "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ),
        }
    }

    /// Build and validate the sync configuration
    ///
    /// With `--config`, the file supplies everything; `--dry-run` can still
    /// be switched on from the command line.
    pub fn sync_config(&self) -> Result<SyncConfig> {
        let mut config = match self.config {
            Some(ref path) => load_file(path)?,
            None => self.config_from_flags()?,
        };

        if self.dry_run {
            config.engine.dry_run = true;
        }

        config.validate()?;
        Ok(config)
    }

    fn config_from_flags(&self) -> Result<SyncConfig> {
        let zone = match self.zone {
            Some(ref zone) if !zone.is_empty() => zone.clone(),
            _ => bail!("--zone (RRSYNC_ZONE) is required, e.g. --zone example.com"),
        };
        let records = match self.records {
            Some(ref records) if !records.is_empty() => parse_record_names(records),
            _ => bail!("--records (RRSYNC_RECORDS) is required, e.g. --records @,www"),
        };

        let mut config = SyncConfig::new(
            zone,
            records,
            self.source_config()?,
            self.provider_config()?,
        );
        config.engine.interval_secs = self.interval_secs;
        Ok(config)
    }

    fn source_config(&self) -> Result<AddressSourceConfig> {
        Ok(match self.source.as_str() {
            "ipify" => AddressSourceConfig::Ipify,
            "myip" => AddressSourceConfig::Myip,
            "http" => {
                let url = self
                    .source_url
                    .clone()
                    .context("--source-url (RRSYNC_SOURCE_URL) is required with --source http")?;
                let format = match self.source_format.as_str() {
                    "json" => ResponseFormat::Json,
                    "text" => ResponseFormat::Text,
                    other => bail!("Source format '{}' is not supported. Supported: json, text", other),
                };
                AddressSourceConfig::Http { url, format }
            }
            "resolve" => AddressSourceConfig::Resolve {
                hostname: self.upstream_host.clone().context(
                    "--upstream-host (RRSYNC_UPSTREAM_HOST) is required with --source resolve",
                )?,
            },
            other => bail!(
                "Address source '{}' is not supported. Supported: ipify, myip, http, resolve",
                other
            ),
        })
    }

    fn provider_config(&self) -> Result<ProviderConfig> {
        Ok(match self.provider.as_str() {
            "alidns" => ProviderConfig::Alidns {
                access_key_id: self
                    .access_key_id
                    .clone()
                    .context("--access-key-id (RRSYNC_ACCESS_KEY_ID) is required for alidns")?,
                access_key_secret: self.access_key_secret.clone().context(
                    "--access-key-secret (RRSYNC_ACCESS_KEY_SECRET) is required for alidns",
                )?,
                region_id: self.region_id.clone(),
                endpoint: None,
            },
            "cloudflare" => ProviderConfig::Cloudflare {
                api_token: self
                    .api_token
                    .clone()
                    .context("--api-token (RRSYNC_API_TOKEN) is required for cloudflare")?,
                zone_id: self.zone_id.clone(),
                api_base: None,
            },
            other => bail!(
                "Provider '{}' is not supported. Supported: alidns, cloudflare",
                other
            ),
        })
    }
}

fn load_file(path: &Path) -> Result<SyncConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
}
