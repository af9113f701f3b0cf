//! Custom-handler wire types exchanged with the functions host.
//!
//! The host POSTs one `HostRequest` per invocation and expects a
//! `HostResponse` back, with the projected envelope under `Outputs`. All
//! field names are PascalCase on the wire.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::envelope::ResponseEnvelope;
use crate::error::FunctionError;
use crate::types::Value;

/// Invocation request body sent by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostRequest {
    /// Input binding payloads keyed by binding name.
    #[serde(default)]
    pub data: IndexMap<String, Value>,
    /// Trigger metadata supplied by the host.
    #[serde(default)]
    pub metadata: IndexMap<String, Value>,
}

/// Invocation response body returned to the host on success.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostResponse {
    pub outputs: ResponseEnvelope,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub return_value: serde_json::Value,
}

impl From<ResponseEnvelope> for HostResponse {
    fn from(outputs: ResponseEnvelope) -> Self {
        Self {
            outputs,
            logs: Vec::new(),
            return_value: serde_json::Value::Null,
        }
    }
}

/// Failure body returned to the host when an invocation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub error: ErrorBody,
}

/// One error in a failure chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cause: Option<Box<ErrorBody>>,
}

impl ErrorBody {
    /// A runtime-level error with no cause, e.g. an unknown function.
    #[must_use]
    pub fn plain(error_type: &str, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.to_string(),
            message: message.into(),
            cause: None,
        }
    }
}

impl From<&FunctionError> for ErrorBody {
    fn from(error: &FunctionError) -> Self {
        Self {
            error_type: error.tag.to_string(),
            message: error.message.clone(),
            cause: error.cause.as_deref().map(|c| Box::new(ErrorBody::from(c))),
        }
    }
}

impl From<&FunctionError> for FailureResponse {
    fn from(error: &FunctionError) -> Self {
        Self {
            error: ErrorBody::from(error),
        }
    }
}
