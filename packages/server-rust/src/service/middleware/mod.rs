//! Tower middleware layers for the invocation pipeline.
//!
//! - [`timeout`]: Per-invocation timeout enforcement
//! - [`metrics`]: Invocation timing and outcome via `tracing` spans
//! - [`load_shed`]: Semaphore-based concurrency limiting
//! - [`pipeline`]: Composes all layers into a single service stack

pub mod load_shed;
pub mod metrics;
pub mod pipeline;
pub mod timeout;

pub use load_shed::LoadShedLayer;
pub use metrics::MetricsLayer;
pub use pipeline::{build_invocation_pipeline, BoxedPipeline};
pub use timeout::TimeoutLayer;

/// Stub services shared by the middleware tests.
#[cfg(test)]
pub(crate) mod test_support {
    use std::task::{Context, Poll};
    use std::time::Duration;

    use azfn_core::{ResponseEnvelope, Value};
    use tower::Service;

    use crate::service::invocation::{
        Invocation, InvocationContext, InvocationError, InvocationFuture, InvocationRequest,
    };

    /// Completes with `outMsg: call_id` after `delay_ms`.
    #[derive(Clone)]
    pub(crate) struct SlowService {
        pub(crate) delay_ms: u64,
    }

    impl Service<Invocation> for SlowService {
        type Response = azfn_core::Completion;
        type Error = InvocationError;
        type Future = InvocationFuture;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, inv: Invocation) -> Self::Future {
            let delay = self.delay_ms;
            #[allow(clippy::cast_possible_wrap)]
            let call_id = inv.ctx.call_id as i64;
            let leases = inv.leases;
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                drop(leases);
                Ok(Ok(ResponseEnvelope::out_msg(Value::Int(call_id))))
            })
        }
    }

    pub(crate) fn make_inv(call_id: u64, timeout_ms: u64) -> Invocation {
        Invocation::new(
            InvocationContext::new(call_id, "inv", "test", timeout_ms),
            InvocationRequest::default(),
        )
    }
}
