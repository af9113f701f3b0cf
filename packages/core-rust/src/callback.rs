//! Invocation completion: turns a function's outcome into the value its
//! caller is waiting for.

use crate::binding::OutputBindings;
use crate::classify::ErrorClassifier;
use crate::completion::{Completion, CompletionError, CompletionSignal};
use crate::error::FunctionError;
use crate::project::project;
use crate::result::ResultValue;
use crate::types::Returned;

/// Type name of the error raised when a function declares no output
/// binding.
pub const MISSING_OUTPUT_BINDING: &str = "MissingOutputBinding";

/// Receiver of a single invocation outcome.
///
/// Implementations are notified exactly once per invocation, on either
/// channel.
pub trait InvocationCallback: Send + Sync {
    /// The function returned normally. `result` may still be an error
    /// value.
    fn notify_success(&self, result: Returned);

    /// The function raised `error`.
    fn notify_failure(&self, error: FunctionError);
}

/// Shapes the outcome of one invocation and fulfills its completion
/// signal.
#[derive(Debug, Clone)]
pub struct CompletionCallback {
    signal: CompletionSignal,
    bindings: OutputBindings,
    classifier: ErrorClassifier,
}

impl CompletionCallback {
    #[must_use]
    pub fn new(
        signal: CompletionSignal,
        bindings: OutputBindings,
        classifier: ErrorClassifier,
    ) -> Self {
        Self {
            signal,
            bindings,
            classifier,
        }
    }

    /// Computes the completion for a normal return.
    ///
    /// A returned error value skips projection and is handed back as is.
    /// Its trace is emitted only when the error is foreign.
    #[must_use]
    pub fn complete_success(&self, result: Returned) -> Completion {
        let value = match result {
            Returned::Error(error) => {
                if !self.classifier.is_domain_error(&error) {
                    self.classifier.emit_trace(&error);
                }
                return Err(error);
            }
            Returned::Value(value) => value,
        };

        let Some(kind) = self.bindings.primary() else {
            let missing = FunctionError::new(
                self.classifier.identity().tag(MISSING_OUTPUT_BINDING),
                "no output binding declared for the function",
            );
            return Err(self.classifier.classify(missing));
        };

        let resolved = ResultValue::resolve(value, self.classifier.identity());
        tracing::trace!(binding = %kind, "projecting invocation result");
        Ok(project(kind, resolved))
    }

    /// Computes the completion for a raised failure.
    #[must_use]
    pub fn complete_failure(&self, error: FunctionError) -> Completion {
        Err(self.classifier.classify(error))
    }

    fn fulfill(&self, outcome: Completion) {
        if let Err(CompletionError::AlreadyCompleted) = self.signal.complete(outcome) {
            tracing::error!("invocation reported more than one outcome; extra outcome dropped");
        }
    }
}

impl InvocationCallback for CompletionCallback {
    fn notify_success(&self, result: Returned) {
        let outcome = self.complete_success(result);
        self.fulfill(outcome);
    }

    fn notify_failure(&self, error: FunctionError) {
        let outcome = self.complete_failure(error);
        self.fulfill(outcome);
    }
}
