//! End-to-end: tasks flow from a submitter through the worker and back.

use std::time::Duration;

use sluice_core::{EntityId, ScaleOutput, VolumeOutput};
use sluice_engine::{AliasPolicy, Engine, EngineConfig};
use sluice_log::LogBuffer;
use sluice_test_utils::{order, test_config};

#[test]
fn scale_doubles_value() {
    let engine = Engine::launch(test_config()).unwrap();
    let done = engine.scale(50).unwrap();
    assert_eq!(done.wait(), Ok(ScaleOutput { value: 100 }));
}

#[test]
fn aggregate_totals_logs_and_accumulates() {
    let mut engine = Engine::launch(test_config()).unwrap();
    let started = engine.clock().now_ns();

    let done = engine
        .aggregate(order(1, 100.0, 5), Some(LogBuffer::with_capacity(4096)))
        .unwrap();
    let out = done.wait().unwrap();
    assert_eq!(out.total, 500.0);
    assert_eq!(out.slot, 1);
    assert_eq!(out.volume, 500.0);
    assert!(out.processed_at_ns >= started);

    let log = out.log.unwrap();
    let text = std::str::from_utf8(log.as_bytes()).unwrap();
    assert!(text.starts_with("ts="));
    assert!(text.contains(" type=order uid=1 "));
    assert!(text.ends_with("msg=processed\n"));

    let volume = engine.volume(EntityId(1)).unwrap().wait().unwrap();
    assert_eq!(
        volume,
        VolumeOutput {
            slot: 1,
            volume: 500.0
        }
    );

    let report = engine.shutdown();
    let table = report.state_table.unwrap();
    assert_eq!(table.value_at(1), Some(500.0));
}

#[test]
fn orders_accumulate_per_entity() {
    let mut engine = Engine::launch(test_config()).unwrap();
    for _ in 0..10 {
        engine.aggregate(order(7, 2.5, 4), None).unwrap().wait().unwrap();
    }
    let out = engine.aggregate(order(8, 1.0, 1), None).unwrap().wait().unwrap();
    assert_eq!(out.volume, 1.0);

    let report = engine.shutdown();
    let table = report.state_table.unwrap();
    assert_eq!(table.value_at(7), Some(100.0));
    assert_eq!(table.total(), 101.0);
    assert_eq!(report.tasks_processed, 11);
}

#[test]
fn reject_policy_reports_task_error_and_keeps_running() {
    let config = EngineConfig {
        alias_policy: AliasPolicy::Reject,
        ..test_config()
    };
    let engine = Engine::launch(config).unwrap();
    let err = engine
        .aggregate(order(4096, 1.0, 1), None)
        .unwrap()
        .wait()
        .unwrap_err();
    assert!(err.to_string().contains("4096"));

    // The worker carries on after a per-task failure.
    assert_eq!(engine.scale(2).unwrap().wait(), Ok(ScaleOutput { value: 4 }));
    let m = engine.metrics();
    assert_eq!(m.task_errors, 1);
    assert_eq!(m.processed, 2);
}

#[test]
fn shard_policy_aliases_past_table_size() {
    let engine = Engine::launch(test_config()).unwrap();
    let size = EngineConfig::DEFAULT_STATE_TABLE_SIZE as u64;
    let out = engine
        .aggregate(order(size + 1, 1.0, 1), None)
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(out.slot, 1);
}

#[test]
fn undersized_log_buffer_is_counted() {
    let engine = Engine::launch(test_config()).unwrap();
    let out = engine
        .aggregate(order(1, 1.0, 1), Some(LogBuffer::with_capacity(10)))
        .unwrap()
        .wait()
        .unwrap();
    assert!(out.log.unwrap().is_truncated());
    assert_eq!(out.total, 1.0);
    assert_eq!(engine.metrics().log_truncations, 1);
}

#[test]
fn idle_worker_wakes_for_late_submission() {
    let engine = Engine::launch(test_config()).unwrap();
    // Long enough for the worker to reach the parking phase.
    std::thread::sleep(Duration::from_millis(50));
    assert!(engine.metrics().idle_sleeps > 0);
    let done = engine.scale(3).unwrap();
    assert_eq!(
        done.wait_timeout(Duration::from_secs(5)),
        Ok(Some(ScaleOutput { value: 6 }))
    );
}
