//! `PollRunner`: drives repeated rounds for one policy.
//!
//! State transitions:
//! - created → first round scheduled at zero delay
//! - round start: snapshot the policy's requests, dispatch all of them
//! - round end (every request settled): tick callback, then rearm unless paused
//! - `pause()`: stop the timer; a round in flight still finishes and ticks
//! - `play()`: only when paused, rearm for one interval
//!
//! The policy owns its runner; the runner only links back weakly. Once the
//! last policy handle is gone the runner stops scheduling rounds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use futures::future::join_all;

use super::policy::{AttemptOutcome, PolicyShared, PollingPolicy, RequestFactory};
use crate::timer::IntervalTimer;

static NEXT_RUNNER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
struct RunnerState {
    paused: bool,
    in_round: bool,
    rounds: u64,
}

pub(crate) struct RunnerCore {
    id: u64,
    policy: Weak<PolicyShared>,
    timer: IntervalTimer,
    state: Mutex<RunnerState>,
}

/// Handle to the runner polling on behalf of one [`PollingPolicy`].
#[derive(Clone)]
pub struct PollRunner {
    core: Arc<RunnerCore>,
}

impl PollRunner {
    /// Create a runner and schedule its first round. Requires a Tokio runtime.
    pub(crate) fn start(policy: &PollingPolicy) -> Self {
        let core = Arc::new(RunnerCore {
            id: NEXT_RUNNER_ID.fetch_add(1, Ordering::Relaxed),
            timer: IntervalTimer::new(policy.config()),
            policy: policy.downgrade(),
            state: Mutex::new(RunnerState::default()),
        });
        tracing::debug!(
            runner = core.id,
            interval_ms = core.timer.config().interval.as_millis() as u64,
            "poll runner created"
        );
        core.arm(Duration::ZERO);
        Self { core }
    }

    pub(crate) fn from_core(core: Arc<RunnerCore>) -> Self {
        Self { core }
    }

    pub(crate) fn core(&self) -> Arc<RunnerCore> {
        self.core.clone()
    }

    pub(crate) fn downgrade(&self) -> Weak<RunnerCore> {
        Arc::downgrade(&self.core)
    }

    pub fn id(&self) -> u64 {
        self.core.id
    }

    /// The policy this runner polls for, while it is still alive.
    pub fn policy(&self) -> Option<PollingPolicy> {
        PollingPolicy::upgrade(&self.core.policy)
    }

    /// Register a request with the policy; it joins the next round.
    pub fn add_request(&self, factory: RequestFactory) -> &Self {
        if let Some(policy) = self.policy() {
            policy.add_request(factory);
        }
        self
    }

    /// Stop scheduling rounds. A round already in flight completes.
    pub fn pause(&self) {
        let mut state = self.core.state.lock().unwrap();
        if !state.paused {
            tracing::info!(runner = self.core.id, "polling paused");
        }
        state.paused = true;
        self.core.timer.stop();
    }

    /// Resume after [`pause`](Self::pause); no effect otherwise.
    pub fn play(&self) {
        let mut state = self.core.state.lock().unwrap();
        if state.paused {
            state.paused = false;
            tracing::info!(runner = self.core.id, "polling resumed");
            self.core.arm(self.core.timer.config().interval);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.core.state.lock().unwrap().paused
    }

    /// `true` while a round is in flight or the next one is scheduled.
    pub fn is_polling(&self) -> bool {
        let state = self.core.state.lock().unwrap();
        state.in_round || self.core.timer.is_running()
    }

    /// Number of rounds started so far.
    pub fn rounds(&self) -> u64 {
        self.core.state.lock().unwrap().rounds
    }

    /// `true` if both handles refer to the same runner.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl std::fmt::Debug for PollRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollRunner")
            .field("id", &self.core.id)
            .field("policy", &self.policy())
            .field("polling", &self.is_polling())
            .finish()
    }
}

impl RunnerCore {
    fn arm(self: &Arc<Self>, delay: Duration) {
        let core = self.clone();
        self.timer.start_after(delay, move || core.run_round());
    }

    /// Stop scheduling; called when the owning policy goes away.
    pub(crate) fn shutdown(&self) {
        tracing::debug!(runner = self.id, "policy released, poll runner stopped");
        self.timer.stop();
    }

    fn run_round(self: &Arc<Self>) {
        let Some(policy) = PollingPolicy::upgrade(&self.policy) else {
            return;
        };
        let (round, requests) = {
            let mut state = self.state.lock().unwrap();
            if state.paused || state.in_round {
                return;
            }
            state.in_round = true;
            state.rounds += 1;
            (state.rounds, policy.snapshot_requests())
        };
        drop(policy);

        tracing::debug!(runner = self.id, round, requests = requests.len(), "poll round started");

        if requests.is_empty() {
            self.finish_round(round, 0, 0);
            return;
        }

        let core = self.clone();
        tokio::spawn(async move {
            let outcomes = join_all(requests.iter().map(|request| request())).await;
            let failed = outcomes
                .iter()
                .filter(|o| **o == AttemptOutcome::TransportFailed)
                .count();
            core.finish_round(round, outcomes.len(), failed);
        });
    }

    fn finish_round(self: &Arc<Self>, round: u64, total: usize, failed: usize) {
        let policy = PollingPolicy::upgrade(&self.policy);
        if let Some(on_tick) = policy.as_ref().and_then(PollingPolicy::tick_callback) {
            on_tick();
        }

        let config = self.timer.config();
        let mut state = self.state.lock().unwrap();
        if !state.paused && policy.is_some() {
            let delay = if total > 0 && failed == total {
                tracing::warn!(
                    runner = self.id,
                    round,
                    failed,
                    delay_ms = config.error_interval.as_millis() as u64,
                    "every request in round failed, backing off"
                );
                config.error_interval
            } else {
                config.interval
            };
            self.arm(delay);
        }
        state.in_round = false;

        tracing::debug!(
            runner = self.id,
            round,
            total,
            failed,
            paused = state.paused,
            "poll round complete"
        );
    }
}
