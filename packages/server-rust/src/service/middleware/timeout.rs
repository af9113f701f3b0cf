//! Timeout middleware for invocations.
//!
//! Stops waiting for invocations that exceed their `call_timeout_ms` and
//! returns `InvocationError::Timeout`. The function keeps running on its
//! own task and still reports its outcome, which is then discarded.

use std::task::{Context, Poll};
use std::time::Duration;

use tower::{Layer, Service};

use crate::service::invocation::{Invocation, InvocationError, InvocationFuture};

// ---------------------------------------------------------------------------
// TimeoutLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps services with per-invocation timeout enforcement.
///
/// The timeout is read from each invocation's `ctx.call_timeout_ms` field.
#[derive(Debug, Clone)]
pub struct TimeoutLayer;

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService { inner }
    }
}

// ---------------------------------------------------------------------------
// TimeoutService
// ---------------------------------------------------------------------------

/// Service wrapper that enforces per-invocation timeouts.
#[derive(Debug, Clone)]
pub struct TimeoutService<S> {
    inner: S,
}

impl<S> Service<Invocation> for TimeoutService<S>
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
        let timeout_ms = inv.ctx.call_timeout_ms;
        let fut = self.inner.call(inv);
        Box::pin(async move {
            let duration = Duration::from_millis(timeout_ms);
            match tokio::time::timeout(duration, fut).await {
                Ok(result) => result,
                Err(_elapsed) => Err(InvocationError::Timeout { timeout_ms }),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
