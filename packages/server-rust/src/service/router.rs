//! Function routing: dispatches `Invocation` to registered functions by name.

use std::collections::HashMap;
use std::sync::Arc;
use std::task::{Context, Poll};

use azfn_core::ErrorClassifier;
use tower::Service;

use super::function::{FunctionHandler, FunctionService};
use super::invocation::{Invocation, InvocationError, InvocationFuture};

// ---------------------------------------------------------------------------
// FunctionRouter
// ---------------------------------------------------------------------------

/// Routes `Invocation` values to the function registered under
/// `ctx.function_name`.
///
/// Invocations naming an unregistered function return
/// `InvocationError::UnknownFunction`. Cloning is cheap: the function
/// table is shared.
#[derive(Clone)]
pub struct FunctionRouter {
    classifier: ErrorClassifier,
    functions: Arc<HashMap<String, FunctionService>>,
}

impl FunctionRouter {
    /// Create an empty router whose functions classify failures with
    /// `classifier`.
    #[must_use]
    pub fn new(classifier: ErrorClassifier) -> Self {
        Self {
            classifier,
            functions: Arc::new(HashMap::new()),
        }
    }

    /// Register `handler` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn FunctionHandler>) {
        let service = FunctionService::new(handler, self.classifier.clone());
        Arc::make_mut(&mut self.functions).insert(name.into(), service);
    }

    /// Registered function names, sorted.
    #[must_use]
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl Service<Invocation> for FunctionRouter {
    type Response = azfn_core::Completion;
    type Error = InvocationError;
    type Future = InvocationFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Function services are always ready; each call spawns its own task.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, inv: Invocation) -> Self::Future {
        match self.functions.get(&inv.ctx.function_name) {
            Some(svc) => svc.clone().call(inv),
            None => {
                let name = inv.ctx.function_name;
                Box::pin(async move { Err(InvocationError::UnknownFunction { name }) })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
