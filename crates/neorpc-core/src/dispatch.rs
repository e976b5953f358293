//! `RequestDispatcher`: turns request options into an [`ExtendedFuture`],
//! either firing once or registering with a poll runner.

use std::sync::{Arc, Weak};

use futures::FutureExt;
use serde_json::Value;

use crate::error::ServiceError;
use crate::future::{deferred, Deferred, ExtendedFuture};
use crate::poll::runner::RunnerCore;
use crate::poll::{AttemptOutcome, PollConfig, PollRegistry, PollRunner, RequestFactory};
use crate::request::{is_truthy, HttpRequest, RequestOptions, Transform};
use crate::transport::ProtocolClient;

/// Future returned by every service method.
pub type ServiceFuture = ExtendedFuture<Value>;

/// Collaborators every service dispatches through.
#[derive(Clone)]
pub struct ServiceContext {
    client: Arc<dyn ProtocolClient>,
    registry: Arc<PollRegistry>,
}

impl ServiceContext {
    /// Context with a private poll registry.
    pub fn new(client: Arc<dyn ProtocolClient>) -> Self {
        Self {
            client,
            registry: Arc::new(PollRegistry::new()),
        }
    }

    /// Share a registry between contexts.
    pub fn with_registry(mut self, registry: Arc<PollRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn client(&self) -> &Arc<dyn ProtocolClient> {
        &self.client
    }

    pub fn registry(&self) -> &Arc<PollRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> RequestDispatcher {
        RequestDispatcher { ctx: self.clone() }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("client", &self.client.name())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Entry point used by every service method.
#[derive(Clone, Debug)]
pub struct RequestDispatcher {
    ctx: ServiceContext,
}

impl RequestDispatcher {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Dispatch one service call.
    ///
    /// Configuration errors are returned immediately. Without `poll` the
    /// call is invoked once and the future resolves or rejects. With `poll`
    /// the built request is registered with the matching runner and every
    /// round's result is delivered through the future's notify channel.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(
        &self,
        options: RequestOptions,
        poll: Option<&PollConfig>,
    ) -> Result<ServiceFuture, ServiceError> {
        options.validate()?;
        let request = self.ctx.client.build_request_options(&options)?;
        let (deferred, mut future) = deferred();

        let mut attempt = Attempt {
            client: self.ctx.client.clone(),
            request,
            on_success: options.transform_success.unwrap_or_else(noop_transform),
            on_error: options.transform_error.unwrap_or_else(noop_transform),
            deferred,
            runner: None,
        };

        match poll {
            None => {
                tracing::debug!(method = %attempt.request.method, url = %attempt.request.url, "dispatching request");
                tokio::spawn(async move {
                    attempt.run().await;
                });
            }
            Some(config) => {
                let (policy, runner) = self.ctx.registry.runner_for(config);
                tracing::debug!(
                    method = %attempt.request.method,
                    url = %attempt.request.url,
                    runner = runner.id(),
                    "registering polled request"
                );
                attempt.runner = Some(runner.downgrade());
                policy.add_request(attempt.into_factory());
                future.attach_control(Arc::new(policy));
            }
        }

        Ok(future)
    }
}

fn noop_transform() -> Transform {
    Arc::new(|_| Value::Null)
}

/// One request as the runner sees it: built once, invoked every round.
struct Attempt {
    client: Arc<dyn ProtocolClient>,
    request: HttpRequest,
    on_success: Transform,
    on_error: Transform,
    deferred: Deferred<Value>,
    runner: Option<Weak<RunnerCore>>,
}

impl Attempt {
    fn into_factory(self) -> RequestFactory {
        let attempt = Arc::new(self);
        Arc::new(move || {
            let attempt = attempt.clone();
            async move { attempt.run().await }.boxed()
        })
    }

    fn polling(&self) -> bool {
        self.runner.is_some()
    }

    async fn run(&self) -> AttemptOutcome {
        let response = match self.client.invoke(self.request.clone()).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(url = %self.request.url, error = %err, "request failed");
                self.deferred.reject(err.into());
                return AttemptOutcome::TransportFailed;
            }
        };

        let data = (self.on_success)(&response);
        if !is_truthy(&data) {
            let error = (self.on_error)(&response);
            if is_truthy(&error) {
                tracing::debug!(url = %self.request.url, %error, "service reported an error");
                self.deferred.reject(ServiceError::Rejected(error));
                self.halt_polling();
                return AttemptOutcome::Completed;
            }
        }

        if self.polling() {
            self.deferred.notify(&data);
        } else {
            self.deferred.resolve(data);
        }
        AttemptOutcome::Completed
    }

    fn halt_polling(&self) {
        let Some(runner) = self.runner.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        let runner = PollRunner::from_core(runner);
        if runner.is_polling() {
            runner.pause();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::PollingPolicy;
    use crate::request::{field_transform, HttpMethod, RawResponse};
    use crate::test_support::MockClient;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::sleep;

    fn rpc_options(url: &str) -> RequestOptions {
        RequestOptions::new(HttpMethod::Post, url)
            .with_transform_success(field_transform("result"))
            .with_transform_error(field_transform("error"))
    }

    #[tokio::test]
    async fn one_shot_resolves_with_transformed_value() {
        let client = MockClient::new();
        client.respond("http://node", RawResponse::ok(json!({"result": 1234})));
        let dispatcher = ServiceContext::new(client.clone()).dispatcher();

        let fut = dispatcher.dispatch(rpc_options("http://node"), None).unwrap();
        assert!(!fut.is_polling());
        assert_eq!(fut.await.unwrap(), json!(1234));
        assert_eq!(client.calls("http://node"), 1);
    }

    #[tokio::test]
    async fn one_shot_semantic_error_rejects_without_runner() {
        let client = MockClient::new();
        client.respond(
            "http://node",
            RawResponse::ok(json!({"result": null, "error": {"code": -32601, "message": "Method not found"}})),
        );
        let ctx = ServiceContext::new(client.clone());

        let err = ctx
            .dispatcher()
            .dispatch(rpc_options("http://node"), None)
            .unwrap()
            .await
            .unwrap_err();

        match err {
            ServiceError::Rejected(value) => assert_eq!(value["code"], -32601),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(ctx.registry().runners_created(), 0);
    }

    #[tokio::test]
    async fn falsy_value_without_error_resolves_as_is() {
        let client = MockClient::new();
        client.respond("http://node", RawResponse::ok(json!({"result": 0})));
        let dispatcher = ServiceContext::new(client).dispatcher();

        let value = dispatcher.dispatch(rpc_options("http://node"), None).unwrap().await.unwrap();
        assert_eq!(value, json!(0));
    }

    #[tokio::test]
    async fn transport_failure_rejects() {
        let client = MockClient::new();
        client.fail("http://down", "connection refused");
        let dispatcher = ServiceContext::new(client).dispatcher();

        let err = dispatcher.dispatch(rpc_options("http://down"), None).unwrap().await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }

    #[tokio::test]
    async fn missing_url_fails_synchronously() {
        let client = MockClient::new();
        let dispatcher = ServiceContext::new(client.clone()).dispatcher();
        let result = dispatcher.dispatch(RequestOptions::new(HttpMethod::Get, ""), None);
        assert!(matches!(result, Err(ServiceError::Config(_))));
        assert_eq!(client.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_notifies_every_round_and_never_resolves() {
        let client = MockClient::new();
        client.respond("http://node", RawResponse::ok(json!({"result": 7})));
        let dispatcher = ServiceContext::new(client.clone()).dispatcher();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut fut = dispatcher
            .dispatch(rpc_options("http://node"), Some(&PollConfig::Interval(1_000)))
            .unwrap()
            .notify(move |v| sink.lock().unwrap().push(v.clone()));
        assert!(fut.is_polling());

        let settled = tokio::time::timeout(Duration::from_millis(2_500), &mut fut).await;
        assert!(settled.is_err(), "a polling future must not resolve");
        assert_eq!(*seen.lock().unwrap(), vec![json!(7), json!(7), json!(7)]);
        assert_eq!(client.calls("http://node"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn chained_notify_runs_in_order_every_tick() {
        let client = MockClient::new();
        client.respond("http://node", RawResponse::ok(json!({"result": "h"})));
        let dispatcher = ServiceContext::new(client).dispatcher();
        let order = Arc::new(Mutex::new(Vec::new()));
        let (o1, o2) = (order.clone(), order.clone());

        let _fut = dispatcher
            .dispatch(rpc_options("http://node"), Some(&PollConfig::Interval(1_000)))
            .unwrap()
            .notify(move |_| o1.lock().unwrap().push("f1"))
            .notify(move |_| o2.lock().unwrap().push("f2"));

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(*order.lock().unwrap(), vec!["f1", "f2", "f1", "f2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn shared_policy_coalesces_into_one_round() {
        let client = MockClient::new();
        client.respond("http://a", RawResponse::ok(json!({"result": 1})));
        client.respond("http://b", RawResponse::ok(json!({"result": 2})));
        let ctx = ServiceContext::new(client.clone());
        let dispatcher = ctx.dispatcher();

        let policy = PollingPolicy::from_millis(1_000);
        let ticks = Arc::new(AtomicU32::new(0));
        let t = ticks.clone();
        policy.on_tick(move || {
            t.fetch_add(1, Ordering::SeqCst);
        });
        let poll = PollConfig::from(&policy);

        let a = dispatcher.dispatch(rpc_options("http://a"), Some(&poll)).unwrap();
        let b = dispatcher.dispatch(rpc_options("http://b"), Some(&poll)).unwrap();

        sleep(Duration::from_millis(1)).await;
        assert_eq!(ctx.registry().runners_created(), 1);
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        assert_eq!(client.calls("http://a"), 1);
        assert_eq!(client.calls("http://b"), 1);

        a.stop_polling();
        assert!(!b.is_polling(), "both futures share the paused runner");
        policy.play();
        sleep(Duration::from_millis(1_010)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn policy_resumes_after_every_future_is_dropped() {
        let client = MockClient::new();
        client.respond("http://node", RawResponse::ok(json!({"result": 5})));
        let dispatcher = ServiceContext::new(client.clone()).dispatcher();
        let policy = PollingPolicy::from_millis(1_000);
        let notified = Arc::new(AtomicU32::new(0));
        let n = notified.clone();

        let fut = dispatcher
            .dispatch(rpc_options("http://node"), Some(&PollConfig::from(&policy)))
            .unwrap()
            .notify(move |_| {
                n.fetch_add(1, Ordering::SeqCst);
            });
        drop(fut);

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(client.calls("http://node"), 2);
        assert_eq!(notified.load(Ordering::SeqCst), 2);

        policy.pause();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(client.calls("http://node"), 2);
        assert!(!policy.is_polling());
        assert!(policy.runner().is_some(), "runner stays attached while paused");

        policy.play();
        assert!(policy.is_polling());
        sleep(Duration::from_millis(4_500)).await;
        assert_eq!(client.calls("http://node"), 6);
        assert_eq!(notified.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn halted_policy_resumes_after_rejected_future_is_consumed() {
        let client = MockClient::new();
        client.respond_sequence(
            "http://node",
            vec![
                RawResponse::ok(json!({"result": null, "error": {"message": "syncing"}})),
                RawResponse::ok(json!({"result": 10})),
            ],
        );
        let dispatcher = ServiceContext::new(client.clone()).dispatcher();
        let policy = PollingPolicy::from_millis(1_000);

        let fut = dispatcher
            .dispatch(rpc_options("http://node"), Some(&PollConfig::from(&policy)))
            .unwrap();
        assert!(fut.await.unwrap_err().is_semantic());
        sleep(Duration::from_secs(3)).await;
        assert_eq!(client.calls("http://node"), 1);

        policy.play();
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(client.calls("http://node"), 2);
        assert!(policy.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn bare_interval_requests_get_independent_runners() {
        let client = MockClient::new();
        client.respond("http://node", RawResponse::ok(json!({"result": 1})));
        let ctx = ServiceContext::new(client);
        let dispatcher = ctx.dispatcher();
        let poll = PollConfig::Interval(1_000);

        let futures: Vec<_> = (0..3)
            .map(|_| dispatcher.dispatch(rpc_options("http://node"), Some(&poll)).unwrap())
            .collect();

        assert_eq!(ctx.registry().runners_created(), 3);
        futures[0].stop_polling();
        assert!(!futures[0].is_polling());
        assert!(futures[1].is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn semantic_error_on_third_round_halts_after_its_tick() {
        let client = MockClient::new();
        client.respond_sequence(
            "http://node",
            vec![
                RawResponse::ok(json!({"result": 1})),
                RawResponse::ok(json!({"result": 2})),
                RawResponse::ok(json!({"result": null, "error": {"message": "gone"}})),
            ],
        );
        let dispatcher = ServiceContext::new(client.clone()).dispatcher();

        let policy = PollingPolicy::from_millis(1_000);
        let ticks = Arc::new(AtomicU32::new(0));
        let t = ticks.clone();
        policy.on_tick(move || {
            t.fetch_add(1, Ordering::SeqCst);
        });
        let notified = Arc::new(AtomicU32::new(0));
        let n = notified.clone();

        let fut = dispatcher
            .dispatch(rpc_options("http://node"), Some(&PollConfig::from(&policy)))
            .unwrap()
            .notify(move |_| {
                n.fetch_add(1, Ordering::SeqCst);
            });

        let err = fut.await.unwrap_err();
        assert!(err.is_semantic());

        sleep(Duration::from_millis(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3, "round 3 still ticks");
        assert_eq!(notified.load(Ordering::SeqCst), 2);
        assert!(!policy.is_polling());

        sleep(Duration::from_secs(10)).await;
        assert_eq!(client.calls("http://node"), 3, "no round 4");
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_while_polling_keeps_polling() {
        let client = MockClient::new();
        client.fail("http://flaky", "timeout");
        let dispatcher = ServiceContext::new(client.clone()).dispatcher();
        let poll = PollConfig::Options(crate::timer::IntervalConfig {
            interval: Duration::from_secs(1),
            error_interval: Duration::from_secs(2),
        });

        let fut = dispatcher.dispatch(rpc_options("http://flaky"), Some(&poll)).unwrap();
        sleep(Duration::from_millis(4_500)).await;

        assert!(fut.is_polling());
        assert_eq!(client.calls("http://flaky"), 3);
        assert!(matches!(fut.await, Err(ServiceError::Transport(_))));
    }
}
