//! Invocation types carried through the pipeline.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use azfn_core::{Completion, Value};
use indexmap::IndexMap;

/// Context carried with every invocation through the pipeline.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Process-local sequence number.
    pub call_id: u64,
    /// Host-assigned invocation id, or a generated UUID.
    pub invocation_id: String,
    pub function_name: String,
    pub call_timeout_ms: u64,
}

impl InvocationContext {
    #[must_use]
    pub fn new(
        call_id: u64,
        invocation_id: impl Into<String>,
        function_name: impl Into<String>,
        call_timeout_ms: u64,
    ) -> Self {
        Self {
            call_id,
            invocation_id: invocation_id.into(),
            function_name: function_name.into(),
            call_timeout_ms,
        }
    }
}

/// Input handed to a function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationRequest {
    /// Input binding payloads keyed by binding name.
    pub data: IndexMap<String, Value>,
    /// Trigger metadata.
    pub metadata: IndexMap<String, Value>,
}

/// Guards that stay alive until the function's task finishes.
///
/// Layers attach what they hand out (concurrency permits, in-flight
/// guards) here instead of holding it in their future, so a caller that
/// stops waiting does not release it while the function still runs.
#[derive(Default)]
pub struct Leases(Vec<Box<dyn Any + Send + Sync>>);

impl Leases {
    pub fn hold(&mut self, lease: impl Any + Send + Sync) {
        self.0.push(Box::new(lease));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Leases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Leases").field(&self.0.len()).finish()
    }
}

/// One function invocation.
#[derive(Debug)]
pub struct Invocation {
    pub ctx: InvocationContext,
    pub request: InvocationRequest,
    pub leases: Leases,
}

impl Invocation {
    #[must_use]
    pub fn new(ctx: InvocationContext, request: InvocationRequest) -> Self {
        Self {
            ctx,
            request,
            leases: Leases::default(),
        }
    }
}

/// Boxed future returned by every service in the pipeline.
pub type InvocationFuture =
    Pin<Box<dyn Future<Output = Result<Completion, InvocationError>> + Send>>;

/// Errors raised by the pipeline itself, as opposed to failures of the
/// function, which travel inside the `Completion`.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("unknown function: {name}")]
    UnknownFunction { name: String },
    #[error("invocation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("server overloaded, try again later")]
    Overloaded,
    #[error("invocation finished without reporting an outcome")]
    Abandoned,
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl InvocationError {
    /// Short machine-readable kind, used in failure bodies and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            InvocationError::UnknownFunction { .. } => "UnknownFunction",
            InvocationError::Timeout { .. } => "InvocationTimeout",
            InvocationError::Overloaded => "Overloaded",
            InvocationError::Abandoned => "Abandoned",
            InvocationError::Internal(_) => "InternalError",
        }
    }
}

/// Errors from turning a host request into an `Invocation`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("invalid function name: {name:?}")]
    InvalidFunctionName { name: String },
}
