//! Metrics middleware for invocations.
//!
//! Records invocation duration and outcome using `tracing` spans, not a
//! full metrics crate.

use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::invocation::{Invocation, InvocationError, InvocationFuture};

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments invocations with timing and outcome.
#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

/// Service wrapper that records invocation duration and outcome in a span.
#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S> Service<Invocation> for MetricsService<S>
where
    S: Service<Invocation, Response = azfn_core::Completion, Error = InvocationError> + Send,
    S::Future: Send + 'static,
{
    type Response = azfn_core::Completion;
    type Error = InvocationError;
    type Future = InvocationFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, inv: Invocation) -> Self::Future {
        let span = info_span!(
            "invocation",
            function = %inv.ctx.function_name,
            invocation_id = %inv.ctx.invocation_id,
            call_id = inv.ctx.call_id,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(inv);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = start.elapsed().as_millis() as u64;
                let outcome = outcome_label(&result);

                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);
                tracing::info!(duration_ms, outcome, "invocation complete");

                result
            }
            .instrument(span),
        )
    }
}

/// `ok` for an envelope, `failed` for a function failure, `error` when the
/// pipeline itself gave up.
fn outcome_label(result: &Result<azfn_core::Completion, InvocationError>) -> &'static str {
    match result {
        Ok(Ok(_)) => "ok",
        Ok(Err(_)) => "failed",
        Err(_) => "error",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use azfn_core::{FunctionError, ModuleIdentity, ResponseEnvelope, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::service::middleware::test_support::{make_inv, SlowService};

    #[tokio::test]
    async fn metrics_layer_passes_through_response() {
        let svc = MetricsLayer.layer(SlowService { delay_ms: 0 });
        let resp = svc.oneshot(make_inv(42, 5000)).await.unwrap();
        assert_eq!(resp, Ok(ResponseEnvelope::out_msg(Value::Int(42))));
    }

    #[test]
    fn outcome_labels() {
        let failure = FunctionError::new(ModuleIdentity::default().tag("X"), "x");
        assert_eq!(outcome_label(&Ok(Ok(ResponseEnvelope::default()))), "ok");
        assert_eq!(outcome_label(&Ok(Err(failure))), "failed");
        assert_eq!(outcome_label(&Err(InvocationError::Overloaded)), "error");
    }
}
