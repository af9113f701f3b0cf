//! Function handlers and the service that runs them.
//!
//! A `FunctionService` runs its handler on a dedicated task and reports the
//! outcome through a `CompletionCallback`. The service future only waits on
//! the completion receiver, so a caller that stops waiting (timeout, client
//! gone) never prevents the outcome from being reported once.

use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use azfn_core::{
    completion_channel, CompletionCallback, ErrorClassifier, FunctionError, InvocationCallback,
    OutputBindings, Returned,
};
use tokio::task::JoinError;
use tower::Service;

use super::invocation::{Invocation, InvocationError, InvocationFuture, InvocationRequest};

/// Type name of the error reported for a handler that panicked.
pub const FUNCTION_PANICKED: &str = "FunctionPanicked";

/// A deployable function.
#[async_trait]
pub trait FunctionHandler: Send + Sync + 'static {
    /// Output binding annotation names, in declaration order. Qualified
    /// names (`module:HttpOutput`) are accepted.
    fn output_bindings(&self) -> Vec<String>;

    /// Runs the function.
    ///
    /// A returned `Err` is a raised failure. A function may also return
    /// `Returned::Error` to report a failure as a value.
    async fn invoke(&self, request: InvocationRequest) -> Result<Returned, FunctionError>;
}

/// Tower service running one `FunctionHandler`.
#[derive(Clone)]
pub struct FunctionService {
    handler: Arc<dyn FunctionHandler>,
    bindings: OutputBindings,
    classifier: ErrorClassifier,
}

impl FunctionService {
    /// Wraps `handler`, resolving its output bindings once.
    #[must_use]
    pub fn new(handler: Arc<dyn FunctionHandler>, classifier: ErrorClassifier) -> Self {
        let bindings = OutputBindings::from_annotations(&handler.output_bindings());
        Self {
            handler,
            bindings,
            classifier,
        }
    }

    #[must_use]
    pub fn bindings(&self) -> &OutputBindings {
        &self.bindings
    }
}

impl Service<Invocation> for FunctionService {
    type Response = azfn_core::Completion;
    type Error = InvocationError;
    type Future = InvocationFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, inv: Invocation) -> Self::Future {
        let (signal, rx) = completion_channel();
        let callback =
            CompletionCallback::new(signal, self.bindings.clone(), self.classifier.clone());
        let handler = Arc::clone(&self.handler);
        let identity = self.classifier.identity().clone();
        let Invocation {
            ctx,
            request,
            leases,
        } = inv;

        tokio::spawn(async move {
            let run = tokio::spawn(async move { handler.invoke(request).await });
            match run.await {
                Ok(Ok(returned)) => callback.notify_success(returned),
                Ok(Err(error)) => callback.notify_failure(error),
                Err(join_error) => {
                    let error = panic_error(&identity, &ctx.function_name, &join_error);
                    callback.notify_failure(error);
                }
            }
            // Released only once the function has finished.
            drop(leases);
        });

        Box::pin(async move { rx.await.map_err(|_| InvocationError::Abandoned) })
    }
}

fn panic_error(
    identity: &azfn_core::ModuleIdentity,
    function: &str,
    join_error: &JoinError,
) -> FunctionError {
    // Runtime-raised, but reported as foreign so it is wrapped like any
    // other unexpected failure.
    let tag = azfn_core::TypeTag {
        module: azfn_core::ModuleIdentity::new(identity.org.clone(), "runtime"),
        type_name: FUNCTION_PANICKED.to_string(),
    };
    FunctionError::new(tag, format!("function {function} aborted: {join_error}"))
}
