//! `ExtendedFuture`: a one-shot future with a repeatable notify channel.
//!
//! A one-shot call settles exactly once through [`Deferred::resolve`] or
//! [`Deferred::reject`]. A polling call is never resolved: each round's
//! result arrives through [`Deferred::notify`] and the future only settles
//! if the service reports an error.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};

use crate::error::ServiceError;

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;
type Subscribers<T> = Arc<Mutex<Vec<Subscriber<T>>>>;
type Outcome<T> = Result<T, ServiceError>;

/// Polling hooks a future exposes while it is registered with a runner.
pub trait PollControl: Send + Sync {
    fn stop_polling(&self);
    fn is_polling(&self) -> bool;
}

/// Create a connected producer/consumer pair.
pub fn deferred<T>() -> (Deferred<T>, ExtendedFuture<T>) {
    let (tx, rx) = oneshot::channel();
    let subscribers: Subscribers<T> = Arc::new(Mutex::new(Vec::new()));
    (
        Deferred {
            subscribers: subscribers.clone(),
            settle: Arc::new(Mutex::new(Some(tx))),
        },
        ExtendedFuture {
            rx,
            subscribers,
            control: None,
        },
    )
}

/// Producer side of an [`ExtendedFuture`].
///
/// Dropping every clone without settling makes the consumer observe
/// [`ServiceError::Abandoned`].
pub struct Deferred<T> {
    subscribers: Subscribers<T>,
    settle: Arc<Mutex<Option<oneshot::Sender<Outcome<T>>>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
            settle: self.settle.clone(),
        }
    }
}

impl<T> Deferred<T> {
    /// Settle successfully. Returns `false` if already settled.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Settle with an error. Returns `false` if already settled.
    pub fn reject(&self, error: ServiceError) -> bool {
        self.settle(Err(error))
    }

    /// Deliver the same `value` to every subscriber, in registration order.
    pub fn notify(&self, value: &T) {
        // Snapshot so a subscriber may register further subscribers.
        let subscribers: Vec<Subscriber<T>> = self.subscribers.lock().unwrap().clone();
        for subscriber in subscribers {
            subscriber(value);
        }
    }

    fn settle(&self, outcome: Outcome<T>) -> bool {
        let Some(tx) = self.settle.lock().unwrap().take() else {
            return false;
        };
        // The consumer may already be gone; settling still counts.
        let _ = tx.send(outcome);
        true
    }
}

/// Consumer side: await the terminal outcome, subscribe to notifications.
pub struct ExtendedFuture<T> {
    rx: oneshot::Receiver<Outcome<T>>,
    subscribers: Subscribers<T>,
    control: Option<Arc<dyn PollControl>>,
}

impl<T> ExtendedFuture<T> {
    /// Subscribe `f` to every notified value. Subscribers run in the order
    /// they were added.
    ///
    /// Subscribers do not pipe into each other: each one receives the value
    /// as notified, and whatever it computes is not passed to the next.
    pub fn notify<F>(self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribers.lock().unwrap().push(Arc::new(f));
        self
    }

    /// Subscribe a channel to every notified value.
    pub fn notifications(&self) -> mpsc::UnboundedReceiver<T>
    where
        T: Clone + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap()
            .push(Arc::new(move |value: &T| {
                let _ = tx.send(value.clone());
            }));
        rx
    }

    /// Pause the runner this future polls on. No-op for one-shot calls.
    pub fn stop_polling(&self) {
        if let Some(control) = &self.control {
            control.stop_polling();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.control.as_ref().is_some_and(|c| c.is_polling())
    }

    pub(crate) fn attach_control(&mut self, control: Arc<dyn PollControl>) {
        self.control = Some(control);
    }
}

impl<T> Future for ExtendedFuture<T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            Err(_) => Err(ServiceError::Abandoned),
        })
    }
}
