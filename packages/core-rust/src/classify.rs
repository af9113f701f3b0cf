//! Failure classification and diagnostic trace emission.

use std::sync::Arc;

use crate::error::FunctionError;
use crate::identity::{ModuleIdentity, SERVICE_EXECUTION_ERROR};

/// Prefix of the message carried by a `ServiceExecutionError` wrapper.
pub const SERVICE_EXECUTION_PREFIX: &str = "service method invocation failed: ";

/// Destination for diagnostic traces of failed invocations.
///
/// Emission is best-effort: an `Err` is logged and otherwise ignored, it
/// never stops an invocation from completing.
pub trait TraceSink: Send + Sync {
    /// Writes the diagnostic trace of `error`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink could not record the trace.
    fn emit(&self, error: &FunctionError) -> anyhow::Result<()>;
}

/// Default sink: writes the trace through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, error: &FunctionError) -> anyhow::Result<()> {
        tracing::error!(
            error_type = %error.tag,
            trace = %error.trace(),
            "{}",
            error.message
        );
        Ok(())
    }
}

/// Decides how an invocation failure is reported.
///
/// Errors declared by the classifier's own module pass through untouched.
/// Any other error is wrapped in a `ServiceExecutionError` that keeps the
/// original as its cause.
#[derive(Clone)]
pub struct ErrorClassifier {
    identity: ModuleIdentity,
    sink: Arc<dyn TraceSink>,
}

impl ErrorClassifier {
    #[must_use]
    pub fn new(identity: ModuleIdentity, sink: Arc<dyn TraceSink>) -> Self {
        Self { identity, sink }
    }

    /// A classifier that traces through `tracing`.
    #[must_use]
    pub fn with_tracing(identity: ModuleIdentity) -> Self {
        Self::new(identity, Arc::new(TracingSink))
    }

    #[must_use]
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// Whether `error` belongs to this classifier's module.
    #[must_use]
    pub fn is_domain_error(&self, error: &FunctionError) -> bool {
        error.is_owned_by(&self.identity)
    }

    /// Emits the trace of `error`, swallowing sink failures.
    pub fn emit_trace(&self, error: &FunctionError) {
        if let Err(e) = self.sink.emit(error) {
            tracing::warn!(error = %e, "failed to emit invocation failure trace");
        }
    }

    /// Classifies a raised invocation failure.
    ///
    /// The trace of `error` is emitted first, for domain and foreign
    /// errors alike.
    #[must_use]
    pub fn classify(&self, error: FunctionError) -> FunctionError {
        self.emit_trace(&error);
        if self.is_domain_error(&error) {
            return error;
        }
        self.wrap(error)
    }

    fn wrap(&self, error: FunctionError) -> FunctionError {
        let message = format!("{SERVICE_EXECUTION_PREFIX}{}", error.message);
        FunctionError::new(self.identity.tag(SERVICE_EXECUTION_ERROR), message).with_cause(error)
    }
}

impl std::fmt::Debug for ErrorClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorClassifier")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Sink that records every emitted error, for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) emitted: parking_lot::Mutex<Vec<FunctionError>>,
}

#[cfg(test)]
impl TraceSink for RecordingSink {
    fn emit(&self, error: &FunctionError) -> anyhow::Result<()> {
        self.emitted.lock().push(error.clone());
        Ok(())
    }
}

/// Sink whose every emit fails.
#[cfg(test)]
pub(crate) struct FailingSink;

#[cfg(test)]
impl TraceSink for FailingSink {
    fn emit(&self, _error: &FunctionError) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("log pipe closed"))
    }
}
