//! Response envelope handed back to the host on success.
//!
//! Field names are part of the host's binding protocol and must not change:
//! `outMsg` for queue, document and blob outputs, `resp` for HTTP and every
//! other binding.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Top-level success container. Exactly one of the two fields is set by
/// the projector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Queue/document payload verbatim, or base64 text for blobs.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub out_msg: Option<Value>,
    /// HTTP-shaped response.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resp: Option<HttpResponse>,
}

impl ResponseEnvelope {
    #[must_use]
    pub fn out_msg(value: Value) -> Self {
        Self {
            out_msg: Some(value),
            resp: None,
        }
    }

    #[must_use]
    pub fn resp(resp: HttpResponse) -> Self {
        Self {
            out_msg: None,
            resp: Some(resp),
        }
    }
}

/// Nested HTTP response container.
///
/// `body` distinguishes absent (`None`) from an explicit null
/// (`Some(Value::Null)`); the latter is written as `"body": null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// Decimal status code.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status_code: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "present"
    )]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub headers: Option<IndexMap<String, Value>>,
}

impl HttpResponse {
    /// A response that carries only a body.
    #[must_use]
    pub fn body_only(body: Value) -> Self {
        Self {
            status_code: None,
            body: Some(body),
            headers: None,
        }
    }
}

/// Keeps a present `null` as `Some(Value::Null)` instead of `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
