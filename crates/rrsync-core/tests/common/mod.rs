//! Test doubles and common utilities for sync contract tests
//!
//! The doubles record every call so tests can assert exactly which
//! operations reached the provider.

#![allow(dead_code)]

use rrsync_core::config::{AddressSourceConfig, ProviderConfig, SyncConfig};
use rrsync_core::error::{Error, Result};
use rrsync_core::{AddressSet, AddressSource, DesiredRecord, DnsProvider, ObservedRecord, UpdateOp};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An address source returning a fixed answer, counting calls
pub struct StaticAddressSource {
    answer: std::result::Result<AddressSet, String>,
    fetch_call_count: Arc<AtomicUsize>,
}

impl StaticAddressSource {
    pub fn new(addresses: AddressSet) -> Self {
        Self {
            answer: Ok(addresses),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn ipv4(addr: [u8; 4]) -> Self {
        Self::new(AddressSet::with_ipv4(addr.into()))
    }

    /// A source whose every fetch fails
    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle to the fetch counter, usable after the source is moved
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetch_call_count)
    }
}

#[async_trait::async_trait]
impl AddressSource for StaticAddressSource {
    async fn fetch(&self) -> Result<AddressSet> {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().map_err(Error::resolution)
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// Calls observed by a [`MemoryProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    List(String),
    Create(String, DesiredRecord),
    Update(String, UpdateOp),
}

#[derive(Default)]
struct ProviderState {
    records: Vec<ObservedRecord>,
    calls: Vec<ProviderCall>,
    next_id: usize,
    fail_list: bool,
    /// Fail the n-th create/update call (0-based)
    fail_write_at: Option<usize>,
    writes: usize,
}

/// An in-memory DNS provider that applies operations to its own record list
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Clone, Default)]
pub struct MemoryProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ObservedRecord>) -> Self {
        let provider = Self::new();
        provider.state.lock().unwrap().records = records;
        provider
    }

    /// Make every list call fail
    pub fn fail_list(&self) {
        self.state.lock().unwrap().fail_list = true;
    }

    /// Make the n-th write (create or update, 0-based) fail
    pub fn fail_write_at(&self, n: usize) {
        self.state.lock().unwrap().fail_write_at = Some(n);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, ProviderCall::List(_)))
            .collect()
    }

    pub fn list_call_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::List(_)))
            .count()
    }

    pub fn records(&self) -> Vec<ObservedRecord> {
        self.state.lock().unwrap().records.clone()
    }

    fn check_write(state: &mut ProviderState) -> Result<()> {
        let index = state.writes;
        state.writes += 1;
        if state.fail_write_at == Some(index) {
            return Err(Error::provider("memory", "injected write failure"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MemoryProvider {
    async fn list_records(&self, zone: &str) -> Result<Vec<ObservedRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::List(zone.to_string()));
        if state.fail_list {
            return Err(Error::auth("injected list failure"));
        }
        Ok(state.records.clone())
    }

    async fn create_record(&self, zone: &str, record: &DesiredRecord) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(ProviderCall::Create(zone.to_string(), record.clone()));
        Self::check_write(&mut state)?;

        state.next_id += 1;
        let id = format!("mem-{}", state.next_id);
        state.records.push(ObservedRecord::new(
            id,
            record.name.clone(),
            record.record_type,
            record.value.to_string(),
        ));
        Ok(())
    }

    async fn update_record(&self, zone: &str, update: &UpdateOp) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(ProviderCall::Update(zone.to_string(), update.clone()));
        Self::check_write(&mut state)?;

        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == update.record_id)
            .ok_or_else(|| Error::not_found(update.record_id.clone()))?;
        record.value = update.value.to_string();
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }

    fn min_ttl_secs(&self) -> u64 {
        600
    }
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(records: &[&str]) -> SyncConfig {
    let mut config = SyncConfig::new(
        "example.com",
        records.iter().map(|r| r.to_string()).collect(),
        AddressSourceConfig::Ipify,
        ProviderConfig::Custom {
            factory: "memory".to_string(),
            config: serde_json::Value::Null,
        },
    );
    config.engine.interval_secs = 660;
    config
}
