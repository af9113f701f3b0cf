use azfn_core::ModuleIdentity;

/// Server-level configuration for the invocation pipeline.
///
/// Controls invocation timeouts, concurrency limits, and the module
/// identity used to recognize the runtime's own types and errors.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Identity that owns domain errors and the HTTP response record.
    pub identity: ModuleIdentity,
    /// Default timeout for invocations in milliseconds.
    pub default_invocation_timeout_ms: u64,
    /// Maximum number of concurrent invocations before load shedding.
    pub max_concurrent_invocations: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            identity: ModuleIdentity::default(),
            default_invocation_timeout_ms: 30_000,
            max_concurrent_invocations: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.identity, ModuleIdentity::default());
        assert_eq!(config.default_invocation_timeout_ms, 30_000);
        assert_eq!(config.max_concurrent_invocations, 1000);
    }
}
