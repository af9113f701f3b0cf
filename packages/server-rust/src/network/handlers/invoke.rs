//! Invocation endpoint: `POST /{function}`.
//!
//! The host sends one request per invocation with a JSON body of input
//! data and trigger metadata. Success is answered with the projected
//! envelope under `Outputs`; every failure is answered with an `error`
//! body carrying the cause chain.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use azfn_core::{ErrorBody, FailureResponse, HostRequest, HostResponse};
use bytes::Bytes;
use tower::ServiceExt;

use super::AppState;
use crate::service::InvocationError;

/// Header through which the host passes its invocation id.
pub const INVOCATION_ID_HEADER: &str = "x-azure-functions-invocationid";

/// Runs the named function and maps its outcome to an HTTP response.
///
/// | outcome                      | status |
/// |------------------------------|--------|
/// | envelope                     | 200    |
/// | function failure             | 500    |
/// | malformed body / bad name    | 400    |
/// | unknown function             | 404    |
/// | overloaded or draining       | 503    |
/// | timed out                    | 504    |
pub async fn invoke_handler(
    State(state): State<AppState>,
    Path(function): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.shutdown.is_accepting() {
        return failure(
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorBody::plain("Unavailable", "handler is not accepting invocations"),
        );
    }
    let guard = state.shutdown.in_flight_guard();

    let request = if body.is_empty() {
        HostRequest::default()
    } else {
        match serde_json::from_slice::<HostRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(function = %function, error = %e, "rejecting malformed invocation body");
                return failure(
                    StatusCode::BAD_REQUEST,
                    ErrorBody::plain("MalformedRequest", format!("invalid invocation body: {e}")),
                );
            }
        }
    };

    let invocation_id = headers
        .get(INVOCATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut invocation = match state.intake.intake(&function, invocation_id, request) {
        Ok(invocation) => invocation,
        Err(e) => return failure(StatusCode::BAD_REQUEST, ErrorBody::plain("InvalidFunction", e.to_string())),
    };
    // Keeps the drain waiting until the function itself finishes.
    invocation.leases.hold(guard);

    match state.pipeline.clone().oneshot(invocation).await {
        Ok(Ok(envelope)) => (StatusCode::OK, Json(HostResponse::from(envelope))).into_response(),
        Ok(Err(error)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FailureResponse::from(&error)),
        )
            .into_response(),
        Err(e) => {
            if let InvocationError::Internal(ref source) = e {
                tracing::error!(function = %function, error = ?source, "invocation pipeline failed");
            }
            failure(status_for(&e), ErrorBody::plain(e.kind(), e.to_string()))
        }
    }
}

fn status_for(error: &InvocationError) -> StatusCode {
    match error {
        InvocationError::UnknownFunction { .. } => StatusCode::NOT_FOUND,
        InvocationError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        InvocationError::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
        InvocationError::Abandoned | InvocationError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn failure(status: StatusCode, error: ErrorBody) -> Response {
    (status, Json(FailureResponse { error })).into_response()
}
