//! Error values raised or returned by service functions.

use std::fmt::Write;

use crate::identity::{ModuleIdentity, TypeTag};

/// A failure produced by a service function or by the runtime itself.
///
/// Every error carries the type it was declared as, so ownership by a
/// module can be checked without inspecting the message. The cause chain
/// is exposed through `std::error::Error::source`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct FunctionError {
    pub tag: TypeTag,
    pub message: String,
    #[source]
    pub cause: Option<Box<FunctionError>>,
}

impl FunctionError {
    #[must_use]
    pub fn new(tag: TypeTag, message: impl Into<String>) -> Self {
        Self {
            tag,
            message: message.into(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: FunctionError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Whether the error's declared type belongs to `identity`.
    #[must_use]
    pub fn is_owned_by(&self, identity: &ModuleIdentity) -> bool {
        identity.owns(&self.tag)
    }

    /// Iterates this error followed by each nested cause.
    pub fn chain(&self) -> impl Iterator<Item = &FunctionError> {
        std::iter::successors(Some(self), |e| e.cause.as_deref())
    }

    /// Multi-line diagnostic rendering: one line per error in the chain.
    #[must_use]
    pub fn trace(&self) -> String {
        let mut out = String::new();
        for (depth, err) in self.chain().enumerate() {
            if depth > 0 {
                out.push_str("\n  caused by: ");
            }
            let _ = write!(out, "{} {}", err.tag, err.message);
        }
        out
    }
}
