//! Polling engine: coalesces requests sharing one policy into rounds.
//!
//! ```text
//! PollConfig ─▶ PollRegistry ─▶ PollingPolicy ──owns──▶ PollRunner ──owns──▶ IntervalTimer
//!                                    ▲                       │
//!                                    └───────weak────────────┘
//! ```
//!
//! A round dispatches every registered request concurrently, waits for all
//! of them to settle, fires the policy's tick callback once and rearms the
//! timer unless the runner was paused.

pub mod policy;
pub mod registry;
pub mod runner;

pub use policy::{AttemptOutcome, PollingPolicy, RequestFactory};
pub use registry::{PollConfig, PollRegistry};
pub use runner::PollRunner;
