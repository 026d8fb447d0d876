//! Sync engine
//!
//! The SyncEngine drives reconciliation cycles:
//! - Fetching the current addresses via AddressSource
//! - Building the desired record set
//! - Listing published records via DnsProvider
//! - Reconciling and applying the resulting plan
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   AddressSet   ┌──────────────┐
//! │ AddressSource │───────────────►│ desired::    │
//! └───────────────┘                │ build        │
//!                                  └──────┬───────┘
//!                                         │ DesiredSet
//! ┌───────────────┐  ObservedRecord ┌──────▼───────┐
//! │  DnsProvider  │────────────────►│ reconcile    │
//! │  (list)       │                 └──────┬───────┘
//! └───────────────┘                        │ Plan
//!         ▲                                │
//!         └────── update / create ─────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Fetch addresses; on failure or an empty set, skip the cycle
//! 2. Build the desired set
//! 3. List records; on failure, abort the cycle
//! 4. Reconcile
//! 5. Apply updates, then creates; the first failure aborts the batch
//!
//! Cycles run once immediately and then on a fixed interval. A cycle always
//! finishes before the next tick is considered.

use crate::config::SyncConfig;
use crate::desired;
use crate::error::Result;
use crate::reconcile::{self, Plan};
use crate::record::{Operation, RecordType};
use crate::traits::{AddressSource, DnsProvider};
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        zone: String,
        records_count: usize,
    },

    /// Cycle skipped because no address was available
    CycleSkipped {
        reason: String,
    },

    /// An existing record was updated
    RecordUpdated {
        record_id: String,
        name: String,
        record_type: RecordType,
        value: IpAddr,
    },

    /// A missing record was created
    RecordCreated {
        name: String,
        record_type: RecordType,
        value: IpAddr,
    },

    /// Cycle finished
    CycleCompleted {
        created: usize,
        updated: usize,
    },

    /// Cycle aborted by a provider failure
    CycleFailed {
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Result of a single cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No address could be determined; nothing was attempted
    Skipped,
    /// The zone already reflects the desired state
    InSync,
    /// Dry-run: the plan was computed but not applied
    Planned(Plan),
    /// The plan was applied
    Applied {
        created: usize,
        updated: usize,
    },
}

/// Core sync engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Start with [`SyncEngine::run()`] (or drive single cycles with
///    [`SyncEngine::run_cycle()`])
/// 3. Engine runs until its shutdown future resolves
///
/// ## Error Policy
///
/// Cycle errors are logged and reported as events; they never stop the loop.
/// Nothing is retried within a cycle, the next tick is the retry.
pub struct SyncEngine {
    /// Source of the current addresses
    source: Box<dyn AddressSource>,

    /// DNS provider gateway
    provider: Box<dyn DnsProvider>,

    /// Zone managed at the provider
    zone: String,

    /// Record names relative to the zone
    records: Vec<String>,

    /// Time between cycles
    interval: Duration,

    /// Log the plan instead of applying it
    dry_run: bool,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Parameters
    ///
    /// - `source`: Address source implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: Sync configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        source: Box<dyn AddressSource>,
        provider: Box<dyn DnsProvider>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let min_ttl = provider.min_ttl_secs();
        if config.engine.interval_secs < min_ttl {
            warn!(
                "Sync interval {}s is shorter than the {} minimum TTL of {}s; \
                 updates cannot propagate faster than the TTL",
                config.engine.interval_secs,
                provider.provider_name(),
                min_ttl
            );
        }

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            source,
            provider,
            zone: config.zone,
            records: config.records,
            interval: config.engine.interval(),
            dry_run: config.engine.dry_run,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Zone managed by this engine
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Time between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the engine until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
            }
        })
        .await
    }

    /// Run the engine until the given oneshot fires (or its sender is dropped)
    pub async fn run_with_shutdown(&self, shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        self.run_until(async move {
            let _ = shutdown_rx.await;
        })
        .await
    }

    /// Run cycles until `shutdown` resolves
    ///
    /// The first cycle starts immediately. A cycle in progress always
    /// completes before shutdown is observed.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.emit_event(EngineEvent::Started {
            zone: self.zone.clone(),
            records_count: self.records.len(),
        });
        info!(
            "Syncing {} record(s) in {} every {:?} via {} / {}",
            self.records.len(),
            self.zone,
            self.interval,
            self.source.source_name(),
            self.provider.provider_name()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!("Sync cycle failed: {}", e);
                        self.emit_event(EngineEvent::CycleFailed {
                            error: e.to_string(),
                        });
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }
            }
        }

        Ok(())
    }

    /// Run a single reconciliation cycle
    ///
    /// # Returns
    ///
    /// - `Ok(CycleOutcome)`: The cycle completed or was skipped
    /// - `Err(Error)`: Listing records or applying an operation failed.
    ///   Operations applied before the failure are not rolled back.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let addresses = match self.source.fetch().await {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!(
                    "Failed to fetch addresses from {}: {}",
                    self.source.source_name(),
                    e
                );
                self.emit_event(EngineEvent::CycleSkipped {
                    reason: e.to_string(),
                });
                return Ok(CycleOutcome::Skipped);
            }
        };

        let desired = desired::build(&addresses, &self.records);
        if desired.is_empty() {
            warn!(
                "No address found via {}, skipping sync",
                self.source.source_name()
            );
            self.emit_event(EngineEvent::CycleSkipped {
                reason: "no address available".to_string(),
            });
            return Ok(CycleOutcome::Skipped);
        }
        debug!("Current addresses: {}", addresses);

        let observed = self.provider.list_records(&self.zone).await?;
        debug!("{} A/AAAA record(s) published in {}", observed.len(), self.zone);

        let plan = reconcile::reconcile(&desired, &observed);
        if plan.is_empty() {
            info!("All records in {} are up to date ({})", self.zone, addresses);
            self.emit_event(EngineEvent::CycleCompleted {
                created: 0,
                updated: 0,
            });
            return Ok(CycleOutcome::InSync);
        }

        if self.dry_run {
            for op in plan.operations() {
                match op {
                    Operation::Update(update) => {
                        info!("[DRY-RUN] Would update {} in {}", update, self.zone)
                    }
                    Operation::Create(record) => {
                        info!("[DRY-RUN] Would create {} in {}", record, self.zone)
                    }
                }
            }
            return Ok(CycleOutcome::Planned(plan));
        }

        self.apply(&plan).await
    }

    /// Apply a plan: updates first, then creates
    async fn apply(&self, plan: &Plan) -> Result<CycleOutcome> {
        let total = plan.len();
        let mut created = 0;
        let mut updated = 0;

        for op in plan.operations() {
            let result = match &op {
                Operation::Update(update) => self.provider.update_record(&self.zone, update).await,
                Operation::Create(record) => self.provider.create_record(&self.zone, record).await,
            };

            if let Err(e) = result {
                warn!(
                    "Aborting batch for {} after {} of {} operation(s)",
                    self.zone,
                    created + updated,
                    total
                );
                return Err(e);
            }

            match op {
                Operation::Update(update) => {
                    info!("Updated record ({} {})", self.zone, update);
                    updated += 1;
                    self.emit_event(EngineEvent::RecordUpdated {
                        record_id: update.record_id,
                        name: update.name,
                        record_type: update.record_type,
                        value: update.value,
                    });
                }
                Operation::Create(record) => {
                    info!("Created record ({} {})", self.zone, record);
                    created += 1;
                    self.emit_event(EngineEvent::RecordCreated {
                        name: record.name,
                        record_type: record.record_type,
                        value: record.value,
                    });
                }
            }
        }

        self.emit_event(EngineEvent::CycleCompleted { created, updated });
        Ok(CycleOutcome::Applied { created, updated })
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Never block a cycle on a slow consumer.
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Dropping engine event: {}", e);
        }
    }
}
