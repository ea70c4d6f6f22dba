//! Submit work from several threads to one pinned worker.
//!
//! ```text
//! RUST_LOG=sluice_engine=debug cargo run -p sluice-engine --example quickstart
//! ```

use std::sync::Arc;
use std::thread;

use sluice_core::{EntityId, Order};
use sluice_engine::{Engine, EngineConfig, SubmitError};
use sluice_log::LogBuffer;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .init();

    let config = EngineConfig {
        pin_core: Some(0),
        ..EngineConfig::default()
    };
    let engine = Arc::new(Engine::launch(config)?);

    let submitters: Vec<_> = (0..4u64)
        .map(|uid| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || -> Result<(), SubmitError> {
                for i in 0..250 {
                    let order = Order {
                        id: EntityId(uid),
                        price: 10.0 + i as f64,
                        quantity: 3,
                    };
                    let buf = LogBuffer::with_capacity(4096);
                    let out = match engine.aggregate(order, Some(buf)) {
                        Ok(done) => done.wait(),
                        // Back-pressure: a real frontend would answer 503 here.
                        Err(e) if e.is_full() => continue,
                        Err(e) => return Err(e),
                    };
                    if let (0, Ok(out)) = (i % 100, out) {
                        if let Some(log) = out.log {
                            print!("{}", String::from_utf8_lossy(log.as_bytes()));
                        }
                    }
                }
                Ok(())
            })
        })
        .collect();

    for handle in submitters {
        if let Ok(Err(e)) = handle.join() {
            eprintln!("submitter stopped: {e}");
        }
    }

    let doubled = engine.scale(21)?.wait()?;
    println!("scale(21) = {}", doubled.value);

    let metrics = engine.metrics();
    println!(
        "submitted={} processed={} rejected_full={} idle_sleeps={}",
        metrics.submitted, metrics.processed, metrics.rejected_full, metrics.idle_sleeps
    );

    let Some(mut engine) = Arc::into_inner(engine) else {
        return Ok(());
    };
    let report = engine.shutdown();
    if let Some(table) = report.state_table {
        for uid in 0..4 {
            println!("uid={uid} volume={:?}", table.value_at(uid));
        }
    }
    println!(
        "shutdown in {}ms, {} tasks processed",
        report.total_ms, report.tasks_processed
    );
    Ok(())
}
