//! An arena too small for a handler stops the worker without hanging callers.

use std::time::Duration;

use sluice_core::CompletionError;
use sluice_engine::{Engine, EngineConfig, SubmitError, WorkerFault, WorkerState};
use sluice_test_utils::{config_with_region, wait_for};

#[test]
fn arena_exhaustion_faults_worker() {
    let mut engine = Engine::launch(config_with_region(4)).unwrap();

    let done = engine.scale(1).unwrap();
    assert_eq!(done.wait(), Err(CompletionError::Abandoned));

    assert!(wait_for(Duration::from_secs(5), || !engine.is_accepting()));
    assert!(matches!(engine.scale(2), Err(SubmitError::Shutdown(_))));
    assert!(wait_for(Duration::from_secs(5), || {
        engine.worker_state() == WorkerState::Stopped
    }));

    let report = engine.shutdown();
    assert!(matches!(report.fault, Some(WorkerFault::Arena(_))));
    assert_eq!(report.tasks_processed, 0);
    assert!(report.worker_joined);
    assert_eq!(engine.metrics().rejected_shutdown, 1);
}

#[test]
fn queued_tasks_behind_a_fault_are_abandoned() {
    let mut engine = Engine::new(config_with_region(4)).unwrap();
    let pending: Vec<_> = (0..5).map(|v| engine.scale(v).unwrap()).collect();
    engine.start().unwrap();
    for done in pending {
        assert_eq!(done.wait(), Err(CompletionError::Abandoned));
    }
    let report = engine.shutdown();
    assert!(report.fault.is_some());
}

#[test]
fn volume_queries_need_no_arena() {
    let engine = Engine::launch(config_with_region(4)).unwrap();
    let out = engine
        .volume(sluice_core::EntityId(3))
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(out.volume, 0.0);
    assert!(engine.is_accepting());
}

#[test]
fn region_must_hold_a_whole_batch() {
    // 15 bytes fit one aligned i64 wherever the region starts, never two.
    let batched = EngineConfig {
        reset_every: 4,
        ..config_with_region(15)
    };
    let mut engine = Engine::new(batched).unwrap();
    let pending: Vec<_> = (1..=4).map(|v| engine.scale(v).unwrap()).collect();
    engine.start().unwrap();
    let mut results = pending.into_iter().map(|done| done.wait());
    assert_eq!(results.next().map(|r| r.map(|o| o.value)), Some(Ok(2)));
    assert!(results.all(|r| r == Err(CompletionError::Abandoned)));
    assert!(matches!(engine.shutdown().fault, Some(WorkerFault::Arena(_))));

    let per_task = EngineConfig {
        reset_every: 1,
        ..config_with_region(15)
    };
    let mut engine = Engine::new(per_task).unwrap();
    let pending: Vec<_> = (1..=4).map(|v| engine.scale(v).unwrap()).collect();
    engine.start().unwrap();
    for (v, done) in (1..=4).zip(pending) {
        assert_eq!(done.wait().unwrap().value, v * 2);
    }
    assert!(engine.shutdown().fault.is_none());
}
