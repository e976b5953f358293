//! Restartable single-shot timer driving the poll loop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use tokio::task::JoinHandle;

/// Shortest interval accepted from a bare millisecond count.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1_000);
/// Default delay between rounds.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(25);
/// Default delay after a round in which every request failed.
pub const DEFAULT_ERROR_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Timer configuration.
///
/// Deserializes from either a bare number of milliseconds or
/// `{ "interval": ms, "errorInterval": ms }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "IntervalRepr")]
pub struct IntervalConfig {
    /// Delay between the end of one round and the start of the next.
    pub interval: Duration,
    /// Delay used instead of `interval` after a fully failed round.
    pub error_interval: Duration,
}

impl IntervalConfig {
    /// Build from a bare millisecond count, clamped to [`MIN_INTERVAL`].
    pub fn from_millis(ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(ms).max(MIN_INTERVAL),
            ..Self::default()
        }
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            error_interval: DEFAULT_ERROR_INTERVAL,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntervalRepr {
    Millis(u64),
    Options {
        #[serde(default = "default_interval_ms")]
        interval: u64,
        #[serde(default = "default_error_interval_ms", alias = "errorInterval")]
        error_interval: u64,
    },
}

fn default_interval_ms() -> u64 { DEFAULT_INTERVAL.as_millis() as u64 }
fn default_error_interval_ms() -> u64 { DEFAULT_ERROR_INTERVAL.as_millis() as u64 }

impl From<IntervalRepr> for IntervalConfig {
    fn from(repr: IntervalRepr) -> Self {
        match repr {
            IntervalRepr::Millis(ms) => Self::from_millis(ms),
            IntervalRepr::Options { interval, error_interval } => Self {
                interval: Duration::from_millis(interval),
                error_interval: Duration::from_millis(error_interval),
            },
        }
    }
}

#[derive(Default)]
struct TimerSlot {
    generation: u64,
    running: bool,
    handle: Option<JoinHandle<()>>,
}

/// Single-shot timer: `start` arms it, it fires once, then stays inert
/// until armed again. Arming while armed replaces the pending fire.
///
/// Must be used from within a Tokio runtime.
pub struct IntervalTimer {
    config: IntervalConfig,
    slot: Arc<Mutex<TimerSlot>>,
}

impl IntervalTimer {
    pub fn new(config: IntervalConfig) -> Self {
        Self {
            config,
            slot: Arc::new(Mutex::new(TimerSlot::default())),
        }
    }

    pub fn config(&self) -> IntervalConfig {
        self.config
    }

    /// Arm the timer to call `tick` once after the configured interval.
    pub fn start<F>(&self, tick: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.start_after(self.config.interval, tick);
    }

    /// Arm the timer to call `tick` once after `delay`.
    pub fn start_after<F>(&self, delay: Duration, tick: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.slot.lock().unwrap();
        if let Some(pending) = slot.handle.take() {
            pending.abort();
        }
        slot.generation += 1;
        slot.running = true;

        let generation = slot.generation;
        let shared = self.slot.clone();
        slot.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slot = shared.lock().unwrap();
                if slot.generation != generation {
                    return;
                }
                // Firing: `tick` may rearm, which must not abort this task.
                slot.handle = None;
            }
            tick();
            let mut slot = shared.lock().unwrap();
            if slot.generation == generation {
                slot.running = false;
            }
        }));
    }

    /// Cancel any pending fire.
    pub fn stop(&self) {
        let mut slot = self.slot.lock().unwrap();
        slot.generation += 1;
        slot.running = false;
        if let Some(pending) = slot.handle.take() {
            pending.abort();
        }
    }

    /// `true` while a fire is pending (or its tick is executing).
    pub fn is_running(&self) -> bool {
        self.slot.lock().unwrap().running
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            if let Some(pending) = slot.handle.take() {
                pending.abort();
            }
        }
    }
}

impl std::fmt::Debug for IntervalTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalTimer")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}
