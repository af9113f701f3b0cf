//! Custom-handler process for the functions host.
//!
//! The host starts this binary, passes the listen port through
//! `FUNCTIONS_CUSTOMHANDLER_PORT`, and POSTs one request per invocation to
//! `/{function}`.

use std::time::Duration;

use azfn_core::{ErrorClassifier, ModuleIdentity};
use azfn_server::network::{NetworkConfig, NetworkModule, PORT_ENV};
use azfn_server::service::domain::register_builtin_functions;
use azfn_server::service::{FunctionRouter, ServerConfig};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

/// Custom handler command line arguments.
#[derive(Parser, Debug)]
#[command(name = "azfn-handler")]
#[command(about = "Serverless custom handler serving registered functions over HTTP")]
struct Args {
    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Listen port; 0 asks the OS for one
    #[arg(long, env = PORT_ENV, default_value_t = 0)]
    port: u16,

    /// Per-invocation deadline in milliseconds
    #[arg(long, default_value_t = 30_000)]
    invocation_timeout_ms: u64,

    /// Invocations allowed to run at once before shedding
    #[arg(long, default_value_t = 1000)]
    max_concurrent: u32,

    /// Organisation part of the module identity
    #[arg(long, default_value = azfn_core::identity::DEFAULT_ORG)]
    org: String,

    /// Module name part of the module identity
    #[arg(long, default_value = azfn_core::identity::DEFAULT_MODULE)]
    module: String,

    /// Seconds to wait for in-flight invocations on shutdown
    #[arg(long, default_value_t = 30)]
    drain_secs: u64,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let server = ServerConfig {
        identity: ModuleIdentity::new(args.org, args.module),
        default_invocation_timeout_ms: args.invocation_timeout_ms,
        max_concurrent_invocations: args.max_concurrent,
    };
    let network = NetworkConfig {
        host: args.host,
        port: args.port,
        // Leave room for the pipeline to report its own timeout.
        request_timeout: Duration::from_millis(args.invocation_timeout_ms) + Duration::from_secs(5),
        drain_timeout: Duration::from_secs(args.drain_secs),
    };

    let mut router = FunctionRouter::new(ErrorClassifier::with_tracing(server.identity.clone()));
    register_builtin_functions(&mut router, &server.identity);

    info!(identity = %server.identity, "starting custom handler");
    let mut module = NetworkModule::new(network, server, router);
    let port = module.start().await?;
    info!(port, "listening");

    module
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await
}
