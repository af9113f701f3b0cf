//! Network configuration types for the custom-handler process.

use std::time::Duration;

/// Environment variable through which the functions host assigns the
/// handler's listen port.
pub const PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";

/// Top-level network configuration for the server.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Maximum time to wait for an HTTP request to complete. Should exceed
    /// the invocation timeout so the pipeline reports timeouts itself.
    pub request_timeout: Duration,
    /// Maximum time to wait for in-flight invocations during shutdown.
    pub drain_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout: Duration::from_secs(60),
            drain_timeout: Duration::from_secs(30),
        }
    }
}
