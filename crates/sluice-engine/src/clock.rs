//! Cached wall clock refreshed by a background thread.
//!
//! The worker never makes a time syscall: it reads the latest value a
//! `sluice-clock` thread stored into a shared atomic. Readings lag real
//! time by at most one cadence (plus scheduling delay).

use std::io;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Read-only handle to a cached clock cell.
#[derive(Clone, Debug)]
pub struct ClockReader {
    now: Arc<AtomicI64>,
}

impl ClockReader {
    /// The cached time in Unix nanoseconds. One relaxed load.
    #[inline]
    pub fn now_ns(&self) -> i64 {
        self.now.load(Ordering::Relaxed)
    }

    /// A reader that always returns `ns`. No thread updates it.
    pub fn frozen(ns: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(ns)),
        }
    }
}

/// Owner of the clock cell and its updater thread.
#[derive(Debug)]
pub struct ClockCache {
    now: Arc<AtomicI64>,
    stop: Arc<AtomicBool>,
    updater: Option<JoinHandle<()>>,
}

impl ClockCache {
    /// Seed the cell with the current time and spawn the updater.
    pub fn start(cadence: Duration) -> io::Result<Self> {
        let now = Arc::new(AtomicI64::new(wall_clock_ns()));
        let stop = Arc::new(AtomicBool::new(false));

        let cell = Arc::clone(&now);
        let stop_flag = Arc::clone(&stop);
        let updater = thread::Builder::new()
            .name("sluice-clock".into())
            .spawn(move || {
                while !stop_flag.load(Ordering::Acquire) {
                    thread::park_timeout(cadence);
                    cell.store(wall_clock_ns(), Ordering::Relaxed);
                }
            })?;
        tracing::debug!(cadence_us = cadence.as_micros() as u64, "clock cache started");

        Ok(Self {
            now,
            stop,
            updater: Some(updater),
        })
    }

    /// A handle for reading the cached time.
    pub fn reader(&self) -> ClockReader {
        ClockReader {
            now: Arc::clone(&self.now),
        }
    }

    /// Stop and join the updater. Readers keep the last stored value.
    pub fn stop(&mut self) {
        let Some(handle) = self.updater.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();
        if handle.join().is_err() {
            tracing::warn!("clock updater panicked");
        }
        tracing::debug!("clock cache stopped");
    }

    /// Whether the updater is still running.
    pub fn is_running(&self) -> bool {
        self.updater.is_some()
    }
}

impl Drop for ClockCache {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wall-clock time in Unix nanoseconds. Saturates instead of wrapping.
fn wall_clock_ns() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_nanos()).unwrap_or(i64::MAX),
        // Clock set before 1970.
        Err(e) => i64::try_from(e.duration().as_nanos()).map_or(i64::MIN, |ns| -ns),
    }
}
