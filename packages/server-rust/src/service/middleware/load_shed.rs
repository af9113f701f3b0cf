//! Concurrency limit for running functions.
//!
//! A permit is taken per invocation and attached to its [`Leases`], so it
//! counts the function until it finishes, not until the caller stops
//! waiting. Invocations beyond the limit fail fast with
//! `InvocationError::Overloaded`.
//!
//! [`Leases`]: crate::service::invocation::Leases

use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::Semaphore;
use tower::{Layer, Service};

use crate::service::invocation::{Invocation, InvocationError, InvocationFuture};

/// Layer sharing one semaphore across every service it builds.
#[derive(Debug, Clone)]
pub struct LoadShedLayer {
    semaphore: Arc<Semaphore>,
}

impl LoadShedLayer {
    #[must_use]
    pub fn new(max_concurrent: u32) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent as usize)),
        }
    }
}

impl<S> Layer<S> for LoadShedLayer {
    type Service = LoadShedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoadShedService {
            inner,
            semaphore: Arc::clone(&self.semaphore),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadShedService<S> {
    inner: S,
    semaphore: Arc<Semaphore>,
}

impl<S> Service<Invocation> for LoadShedService<S>
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

    fn call(&mut self, mut inv: Invocation) -> Self::Future {
        let Ok(permit) = Arc::clone(&self.semaphore).try_acquire_owned() else {
            tracing::warn!(
                function = %inv.ctx.function_name,
                available = self.semaphore.available_permits(),
                "shedding invocation: at capacity"
            );
            return Box::pin(async { Err(InvocationError::Overloaded) });
        };

        inv.leases.hold(permit);
        Box::pin(self.inner.call(inv))
    }
}
