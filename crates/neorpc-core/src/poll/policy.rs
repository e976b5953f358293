//! `PollingPolicy`: the shared group all coalesced requests register with.

use std::sync::{Arc, Mutex, Weak};

use futures::future::BoxFuture;

use super::runner::{PollRunner, RunnerCore};
use crate::future::PollControl;
use crate::timer::IntervalConfig;

/// How a single attempt inside a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The transport answered (the service may still have reported an error).
    Completed,
    /// The transport call itself failed.
    TransportFailed,
}

/// Zero-argument factory performing one attempt per call.
pub type RequestFactory = Arc<dyn Fn() -> BoxFuture<'static, AttemptOutcome> + Send + Sync>;

type TickCallback = Arc<dyn Fn() + Send + Sync>;

pub(crate) struct PolicyShared {
    config: IntervalConfig,
    requests: Mutex<Vec<RequestFactory>>,
    on_tick: Mutex<Option<TickCallback>>,
    runner: Mutex<Option<Arc<RunnerCore>>>,
}

impl Drop for PolicyShared {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.runner.lock() {
            if let Some(core) = slot.take() {
                core.shutdown();
            }
        }
    }
}

/// A named group of polled requests plus one round-completion callback.
///
/// All requests dispatched with the same policy handle are coalesced onto a
/// single runner and timer. Cloning the handle shares the policy.
///
/// Once started, the runner stays attached to the policy for as long as
/// any handle to the policy exists; pausing never releases it.
#[derive(Clone)]
pub struct PollingPolicy {
    shared: Arc<PolicyShared>,
}

impl PollingPolicy {
    pub fn new(config: IntervalConfig) -> Self {
        Self {
            shared: Arc::new(PolicyShared {
                config,
                requests: Mutex::new(Vec::new()),
                on_tick: Mutex::new(None),
                runner: Mutex::new(None),
            }),
        }
    }

    /// Policy polling every `ms` milliseconds (clamped to one second).
    pub fn from_millis(ms: u64) -> Self {
        Self::new(IntervalConfig::from_millis(ms))
    }

    pub fn config(&self) -> IntervalConfig {
        self.shared.config
    }

    /// Set the callback fired once after every request of a round settled.
    /// Replaces any previous callback.
    pub fn on_tick<F>(&self, f: F) -> &Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.shared.on_tick.lock().unwrap() = Some(Arc::new(f));
        self
    }

    /// Append a request; it joins the next round that starts.
    pub fn add_request(&self, factory: RequestFactory) -> &Self {
        self.shared.requests.lock().unwrap().push(factory);
        self
    }

    pub fn request_count(&self) -> usize {
        self.shared.requests.lock().unwrap().len()
    }

    /// Pause the runner, if one exists.
    pub fn pause(&self) {
        if let Some(runner) = self.runner() {
            runner.pause();
        }
    }

    /// Resume a paused runner, if one exists.
    pub fn play(&self) {
        if let Some(runner) = self.runner() {
            runner.play();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.runner().is_some_and(|r| r.is_polling())
    }

    /// The live runner of this policy, if any.
    pub fn runner(&self) -> Option<PollRunner> {
        self.shared.runner.lock().unwrap().clone().map(PollRunner::from_core)
    }

    /// `true` if both handles refer to the same policy.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Return the live runner or start a new one. The check and the start
    /// happen under one lock so a policy never gets two runners.
    pub(crate) fn runner_or_start(&self, on_start: impl FnOnce()) -> PollRunner {
        let mut slot = self.shared.runner.lock().unwrap();
        if let Some(core) = slot.as_ref() {
            return PollRunner::from_core(core.clone());
        }
        let runner = PollRunner::start(self);
        *slot = Some(runner.core());
        on_start();
        runner
    }

    pub(crate) fn downgrade(&self) -> Weak<PolicyShared> {
        Arc::downgrade(&self.shared)
    }

    pub(crate) fn upgrade(shared: &Weak<PolicyShared>) -> Option<Self> {
        shared.upgrade().map(|shared| Self { shared })
    }

    pub(crate) fn snapshot_requests(&self) -> Vec<RequestFactory> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub(crate) fn tick_callback(&self) -> Option<TickCallback> {
        self.shared.on_tick.lock().unwrap().clone()
    }
}

impl PollControl for PollingPolicy {
    fn stop_polling(&self) {
        self.pause();
    }

    fn is_polling(&self) -> bool {
        PollingPolicy::is_polling(self)
    }
}

impl std::fmt::Debug for PollingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingPolicy")
            .field("config", &self.shared.config)
            .field("requests", &self.request_count())
            .finish()
    }
}
