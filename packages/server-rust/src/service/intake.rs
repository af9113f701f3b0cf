//! Intake: converts host requests into typed `Invocation` values.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use azfn_core::HostRequest;

use super::config::ServerConfig;
use super::invocation::{IntakeError, Invocation, InvocationContext, InvocationRequest};

/// Builds `Invocation` values from incoming host requests.
///
/// Each call gets a unique call ID. The invocation id is taken from the
/// host when it supplies one, otherwise a UUID v4 is generated.
pub struct InvocationService {
    config: Arc<ServerConfig>,
    call_id_counter: AtomicU64,
}

impl InvocationService {
    #[must_use]
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self {
            config,
            call_id_counter: AtomicU64::new(1),
        }
    }

    fn next_call_id(&self) -> u64 {
        self.call_id_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Build an `Invocation` for `function_name` from a host request.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidFunctionName` unless the name starts
    /// with an ASCII letter and contains only ASCII letters, digits, `-`
    /// and `_`.
    pub fn intake(
        &self,
        function_name: &str,
        invocation_id: Option<String>,
        body: HostRequest,
    ) -> Result<Invocation, IntakeError> {
        if !is_valid_function_name(function_name) {
            return Err(IntakeError::InvalidFunctionName {
                name: function_name.to_string(),
            });
        }

        let invocation_id = invocation_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let ctx = InvocationContext::new(
            self.next_call_id(),
            invocation_id,
            function_name,
            self.config.default_invocation_timeout_ms,
        );
        Ok(Invocation::new(
            ctx,
            InvocationRequest {
                data: body.data,
                metadata: body.metadata,
            },
        ))
    }
}

fn is_valid_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
