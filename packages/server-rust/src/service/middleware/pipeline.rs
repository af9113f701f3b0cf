//! Pipeline composition: combines all middleware layers into a single service stack.

use tower::util::BoxCloneSyncService;
use tower::ServiceBuilder;

use super::load_shed::LoadShedLayer;
use super::metrics::MetricsLayer;
use super::timeout::TimeoutLayer;
use crate::service::config::ServerConfig;
use crate::service::invocation::{Invocation, InvocationError};
use crate::service::router::FunctionRouter;

/// Type-erased pipeline, shareable across HTTP handlers.
pub type BoxedPipeline = BoxCloneSyncService<Invocation, azfn_core::Completion, InvocationError>;

/// Build the invocation pipeline by wrapping the `FunctionRouter` with middleware layers.
///
/// Layer order (outermost to innermost):
/// 1. `LoadShedLayer` -- reject when overloaded (fail fast before doing any work)
/// 2. `TimeoutLayer` -- enforce per-invocation timeouts
/// 3. `MetricsLayer` -- record timing and outcome (closest to the actual function)
#[must_use]
pub fn build_invocation_pipeline(router: FunctionRouter, config: &ServerConfig) -> BoxedPipeline {
    let svc = ServiceBuilder::new()
        .layer(LoadShedLayer::new(config.max_concurrent_invocations))
        .layer(TimeoutLayer)
        .layer(MetricsLayer)
        .service(router);
    BoxCloneSyncService::new(svc)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use azfn_core::{ErrorClassifier, FunctionError, ModuleIdentity, Returned, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::service::function::FunctionHandler;
    use crate::service::invocation::{InvocationContext, InvocationRequest};

    struct Sleepy {
        delay_ms: u64,
    }

    #[async_trait]
    impl FunctionHandler for Sleepy {
        fn output_bindings(&self) -> Vec<String> {
            vec!["af:HttpOutput".to_string()]
        }

        async fn invoke(&self, _request: InvocationRequest) -> Result<Returned, FunctionError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            Ok(Returned::from(Value::from("done")))
        }
    }

    /// Sleeps while counting how many copies run at once.
    #[derive(Default)]
    struct Counted {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    struct CountedSleepy {
        delay_ms: u64,
        counts: Arc<Counted>,
    }

    #[async_trait]
    impl FunctionHandler for CountedSleepy {
        fn output_bindings(&self) -> Vec<String> {
            vec!["af:QueueOutput".to_string()]
        }

        async fn invoke(&self, _request: InvocationRequest) -> Result<Returned, FunctionError> {
            let now = self.counts.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.counts.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            self.counts.running.fetch_sub(1, Ordering::SeqCst);
            Ok(Returned::from(Value::from("done")))
        }
    }

    fn pipeline(delay_ms: u64) -> BoxedPipeline {
        let mut router =
            FunctionRouter::new(ErrorClassifier::with_tracing(ModuleIdentity::default()));
        router.register("sleepy", Arc::new(Sleepy { delay_ms }));
        build_invocation_pipeline(router, &ServerConfig::default())
    }

    fn make_inv(function: &str, timeout_ms: u64) -> Invocation {
        Invocation::new(
            InvocationContext::new(42, "inv-42", function, timeout_ms),
            InvocationRequest::default(),
        )
    }

    #[tokio::test]
    async fn pipeline_routes_through_all_layers() {
        let resp = pipeline(0).oneshot(make_inv("sleepy", 5000)).await.unwrap();
        let body = resp.unwrap().resp.unwrap().body;
        assert_eq!(body, Some(Value::from("done")));
    }

    #[tokio::test]
    async fn pipeline_times_out_slow_functions() {
        let err = pipeline(500).oneshot(make_inv("sleepy", 20)).await.unwrap_err();
        assert!(matches!(err, InvocationError::Timeout { timeout_ms: 20 }));
    }

    #[tokio::test]
    async fn pipeline_reports_unknown_function() {
        let err = pipeline(0).oneshot(make_inv("missing", 5000)).await.unwrap_err();
        assert!(matches!(err, InvocationError::UnknownFunction { .. }));
    }

    #[tokio::test]
    async fn pipeline_clones_share_concurrency_limit() {
        let mut router =
            FunctionRouter::new(ErrorClassifier::with_tracing(ModuleIdentity::default()));
        router.register("sleepy", Arc::new(Sleepy { delay_ms: 300 }));
        let config = ServerConfig {
            max_concurrent_invocations: 1,
            ..ServerConfig::default()
        };
        let svc = build_invocation_pipeline(router, &config);

        let first = tokio::spawn(svc.clone().oneshot(make_inv("sleepy", 5000)));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let err = svc.oneshot(make_inv("sleepy", 5000)).await.unwrap_err();
        assert!(matches!(err, InvocationError::Overloaded));
        assert!(first.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn timed_out_function_keeps_its_slot() {
        let counts = Arc::new(Counted::default());
        let mut router =
            FunctionRouter::new(ErrorClassifier::with_tracing(ModuleIdentity::default()));
        router.register(
            "sleepy",
            Arc::new(CountedSleepy {
                delay_ms: 300,
                counts: Arc::clone(&counts),
            }),
        );
        let config = ServerConfig {
            max_concurrent_invocations: 1,
            ..ServerConfig::default()
        };
        let svc = build_invocation_pipeline(router, &config);

        let err = svc.clone().oneshot(make_inv("sleepy", 20)).await.unwrap_err();
        assert!(matches!(err, InvocationError::Timeout { .. }));

        for _ in 0..4 {
            let err = svc.clone().oneshot(make_inv("sleepy", 20)).await.unwrap_err();
            assert!(matches!(err, InvocationError::Overloaded));
        }
        assert_eq!(counts.running.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(counts.running.load(Ordering::SeqCst), 0);
        let resp = svc.oneshot(make_inv("sleepy", 5000)).await.unwrap();
        assert!(resp.is_ok());
        assert_eq!(counts.peak.load(Ordering::SeqCst), 1);
    }
}
