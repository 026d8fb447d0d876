//! Contract Test: Sync Cycle
//!
//! Constraints verified:
//! - A failed or empty address lookup skips the cycle without provider calls
//! - A failed list aborts the cycle before any write
//! - Updates are applied before creates
//! - The first failed write aborts the rest of the batch, earlier writes stay
//! - A second cycle against an applied zone issues no writes
//! - Dry-run computes the plan but writes nothing
//!
//! If this test fails, the engine may skip, duplicate or misorder API calls.

mod common;

use common::*;
use rrsync_core::{
    AddressSet, CycleOutcome, EngineEvent, Error, ObservedRecord, RecordType, SyncEngine,
};
use std::net::Ipv4Addr;
use std::sync::atomic::Ordering;

fn engine_with(
    source: StaticAddressSource,
    provider: &MemoryProvider,
    records: &[&str],
) -> (SyncEngine, tokio::sync::mpsc::Receiver<EngineEvent>) {
    SyncEngine::new(
        Box::new(source),
        Box::new(provider.clone()),
        minimal_config(records),
    )
    .expect("engine construction succeeds")
}

#[tokio::test]
async fn failed_lookup_skips_cycle() {
    let provider = MemoryProvider::new();
    let (engine, mut events) = engine_with(
        StaticAddressSource::failing("lookup service down"),
        &provider,
        &["@"],
    );

    let outcome = engine.run_cycle().await.expect("skipping is not an error");

    assert_eq!(outcome, CycleOutcome::Skipped);
    assert!(provider.calls().is_empty(), "no provider call on skipped cycle");
    assert!(matches!(
        events.try_recv(),
        Ok(EngineEvent::CycleSkipped { .. })
    ));
}

#[tokio::test]
async fn empty_address_set_skips_cycle() {
    let provider = MemoryProvider::new();
    let (engine, _events) = engine_with(
        StaticAddressSource::new(AddressSet::new()),
        &provider,
        &["@", "www"],
    );

    let outcome = engine.run_cycle().await.unwrap();

    assert_eq!(outcome, CycleOutcome::Skipped);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn list_failure_aborts_cycle_before_writes() {
    let provider = MemoryProvider::new();
    provider.fail_list();
    let (engine, _events) =
        engine_with(StaticAddressSource::ipv4([1, 2, 3, 4]), &provider, &["@"]);

    let result = engine.run_cycle().await;

    assert!(matches!(result, Err(Error::Authentication(_))));
    assert_eq!(provider.list_call_count(), 1);
    assert!(provider.write_calls().is_empty());
}

#[tokio::test]
async fn updates_are_applied_before_creates() {
    let provider = MemoryProvider::with_records(vec![ObservedRecord::new(
        "r1",
        "www",
        RecordType::A,
        "1.2.3.3",
    )]);
    let (engine, _events) = engine_with(
        StaticAddressSource::ipv4([1, 2, 3, 4]),
        &provider,
        &["@", "www"],
    );

    let outcome = engine.run_cycle().await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Applied {
            created: 1,
            updated: 1
        }
    );
    let writes = provider.write_calls();
    assert!(matches!(&writes[0], ProviderCall::Update(zone, op) if zone == "example.com" && op.record_id == "r1"));
    assert!(matches!(&writes[1], ProviderCall::Create(_, record) if record.name == "@"));
}

#[tokio::test]
async fn first_failed_write_aborts_remaining_batch() {
    let provider = MemoryProvider::new();
    provider.fail_write_at(1);
    let (engine, _events) = engine_with(
        StaticAddressSource::ipv4([1, 2, 3, 4]),
        &provider,
        &["a", "b", "c"],
    );

    let result = engine.run_cycle().await;

    assert!(result.is_err());
    // "a" was created, "b" failed, "c" was never attempted
    assert_eq!(provider.write_calls().len(), 2);
    let names: Vec<String> = provider.records().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["a".to_string()]);
}

#[tokio::test]
async fn second_cycle_is_a_no_op() {
    let provider = MemoryProvider::new();
    let (engine, _events) = engine_with(
        StaticAddressSource::new(AddressSet {
            ipv4: Some(Ipv4Addr::new(1, 2, 3, 4)),
            ipv6: Some("2001:db8::1".parse().unwrap()),
        }),
        &provider,
        &["@", "www"],
    );

    let first = engine.run_cycle().await.unwrap();
    assert_eq!(
        first,
        CycleOutcome::Applied {
            created: 4,
            updated: 0
        }
    );

    let writes_after_first = provider.write_calls().len();
    let second = engine.run_cycle().await.unwrap();

    assert_eq!(second, CycleOutcome::InSync);
    assert_eq!(provider.write_calls().len(), writes_after_first);
    assert_eq!(provider.list_call_count(), 2);
}

#[tokio::test]
async fn dry_run_plans_without_writing() {
    let provider = MemoryProvider::with_records(vec![ObservedRecord::new(
        "r1",
        "@",
        RecordType::A,
        "1.2.3.3",
    )]);
    let mut config = minimal_config(&["@", "www"]);
    config.engine.dry_run = true;
    let (engine, _events) = SyncEngine::new(
        Box::new(StaticAddressSource::ipv4([1, 2, 3, 4])),
        Box::new(provider.clone()),
        config,
    )
    .unwrap();

    let outcome = engine.run_cycle().await.unwrap();

    match outcome {
        CycleOutcome::Planned(plan) => {
            assert_eq!(plan.to_update.len(), 1);
            assert_eq!(plan.to_create.len(), 1);
        }
        other => panic!("expected a plan, got {:?}", other),
    }
    assert!(provider.write_calls().is_empty());
    assert_eq!(provider.records()[0].value, "1.2.3.3");
}

#[tokio::test]
async fn applied_operations_are_reported_as_events() {
    let provider = MemoryProvider::new();
    let (engine, mut events) =
        engine_with(StaticAddressSource::ipv4([1, 2, 3, 4]), &provider, &["www"]);

    engine.run_cycle().await.unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        EngineEvent::RecordCreated {
            name: "www".to_string(),
            record_type: RecordType::A,
            value: [1, 2, 3, 4].into(),
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        EngineEvent::CycleCompleted {
            created: 1,
            updated: 0
        }
    );
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let provider = MemoryProvider::new();
    let source = StaticAddressSource::ipv4([1, 2, 3, 4]);
    let counter = source.fetch_counter();

    let result = SyncEngine::new(
        Box::new(source),
        Box::new(provider),
        minimal_config(&[]),
    );

    assert!(matches!(result, Err(Error::Config(_))));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}
