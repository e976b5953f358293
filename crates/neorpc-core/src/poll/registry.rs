//! `PollRegistry`: maps a poll configuration to the runner serving it.
//!
//! Only an explicit [`PollingPolicy`] is coalesced: every request that
//! names the same policy shares one runner. A bare interval always gets a
//! fresh policy and runner of its own, alive as long as the returned
//! policy handle is held.

use std::sync::atomic::{AtomicU64, Ordering};

use super::policy::PollingPolicy;
use super::runner::PollRunner;
use crate::timer::IntervalConfig;

/// How a service call should poll.
#[derive(Debug, Clone)]
pub enum PollConfig {
    /// Milliseconds between rounds (clamped to one second).
    Interval(u64),
    /// Explicit interval and error interval.
    Options(IntervalConfig),
    /// Shared policy; all calls naming it are coalesced.
    Policy(PollingPolicy),
}

impl From<u64> for PollConfig {
    fn from(ms: u64) -> Self {
        Self::Interval(ms)
    }
}

impl From<IntervalConfig> for PollConfig {
    fn from(config: IntervalConfig) -> Self {
        Self::Options(config)
    }
}

impl From<PollingPolicy> for PollConfig {
    fn from(policy: PollingPolicy) -> Self {
        Self::Policy(policy)
    }
}

impl From<&PollingPolicy> for PollConfig {
    fn from(policy: &PollingPolicy) -> Self {
        Self::Policy(policy.clone())
    }
}

/// Resolves poll configurations to runners.
#[derive(Debug, Default)]
pub struct PollRegistry {
    created: AtomicU64,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the policy for `config` and its runner, starting the runner
    /// if needed.
    ///
    /// Requires a Tokio runtime when a runner has to be started.
    pub fn runner_for(&self, config: &PollConfig) -> (PollingPolicy, PollRunner) {
        let policy = match config {
            PollConfig::Policy(policy) => policy.clone(),
            PollConfig::Interval(ms) => PollingPolicy::from_millis(*ms),
            PollConfig::Options(options) => PollingPolicy::new(*options),
        };
        let runner = policy.runner_or_start(|| self.record_start());
        (policy, runner)
    }

    /// Number of runners this registry has started.
    pub fn runners_created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    fn record_start(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }
}
