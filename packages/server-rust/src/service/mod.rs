//! Invocation routing and execution framework.
//!
//! This module implements the function invocation pipeline:
//!
//! 1. **Intake** (`intake`): host request -> `Result<Invocation, IntakeError>`
//! 2. **Middleware** (`middleware`): Tower layers (load-shedding, timeout, metrics)
//! 3. **Routing** (`router`): Dispatch to registered functions by name
//! 4. **Functions** (`function`): Run a handler and complete its invocation once
//! 5. **Built-in functions** (`domain`): Sample functions for each binding kind

pub mod config;
pub mod domain;
pub mod function;
pub mod intake;
pub mod invocation;
pub mod middleware;
pub mod router;

// Re-export key types for convenient access.
pub use config::ServerConfig;
pub use function::{FunctionHandler, FunctionService};
pub use intake::InvocationService;
pub use invocation::{
    IntakeError, Invocation, InvocationContext, InvocationError, InvocationFuture,
    InvocationRequest, Leases,
};
pub use middleware::{build_invocation_pipeline, BoxedPipeline};
pub use router::FunctionRouter;
