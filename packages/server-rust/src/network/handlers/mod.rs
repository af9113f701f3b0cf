//! HTTP handler definitions for the custom handler.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod health;
pub mod invoke;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use invoke::{invoke_handler, INVOCATION_ID_HEADER};

use std::sync::Arc;
use std::time::Instant;

use crate::service::{BoxedPipeline, InvocationService};

use super::ShutdownController;

/// Shared application state passed to all axum handlers via `State`.
///
/// Cloning is cheap: everything is behind `Arc` or is itself a shared
/// handle.
#[derive(Clone)]
pub struct AppState {
    /// Builds invocations from host requests.
    pub intake: Arc<InvocationService>,
    /// Middleware-wrapped function router.
    pub pipeline: BoxedPipeline,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Names of registered functions, for health reporting.
    pub functions: Arc<Vec<String>>,
    /// Process start time, used for uptime calculation.
    pub start_time: Instant,
}
