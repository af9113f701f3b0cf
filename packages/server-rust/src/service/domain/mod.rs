//! Built-in functions.
//!
//! One small function per output binding kind, registered by the handler
//! binary so a fresh deployment can be smoke-tested against the host.

use std::sync::Arc;

use async_trait::async_trait;
use azfn_core::{FunctionError, ModuleIdentity, Returned, Value};

use crate::service::function::FunctionHandler;
use crate::service::invocation::InvocationRequest;
use crate::service::router::FunctionRouter;

/// Type name of the error returned for requests the built-ins cannot use.
pub const BAD_REQUEST: &str = "BadRequest";

/// Looks up `Data.<binding>.<field>` in the host request.
fn input_field<'a>(request: &'a InvocationRequest, binding: &str, field: &str) -> Option<&'a Value> {
    request.data.get(binding)?.as_map()?.get(field)
}

// ---------------------------------------------------------------------------
// HelloFunction (HTTP)
// ---------------------------------------------------------------------------

/// Greets `Query.name` from the HTTP trigger, defaulting to "world".
pub struct HelloFunction {
    identity: ModuleIdentity,
}

impl HelloFunction {
    #[must_use]
    pub fn new(identity: ModuleIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl FunctionHandler for HelloFunction {
    fn output_bindings(&self) -> Vec<String> {
        vec![format!("{}:HttpOutput", self.identity.name)]
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<Returned, FunctionError> {
        let name = input_field(&request, "req", "Query")
            .and_then(Value::as_map)
            .and_then(|query| query.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("world");
        let resp = self
            .identity
            .http_response(200)
            .with_body(format!("Hello, {name}!"));
        Ok(resp.into())
    }
}

// ---------------------------------------------------------------------------
// EnqueueFunction (queue)
// ---------------------------------------------------------------------------

/// Forwards the HTTP request body to the output queue unchanged.
pub struct EnqueueFunction {
    identity: ModuleIdentity,
}

impl EnqueueFunction {
    #[must_use]
    pub fn new(identity: ModuleIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl FunctionHandler for EnqueueFunction {
    fn output_bindings(&self) -> Vec<String> {
        vec![format!("{}:QueueOutput", self.identity.name)]
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<Returned, FunctionError> {
        match input_field(&request, "req", "Body") {
            Some(body) => Ok(Returned::from(body.clone())),
            // Reported as a value: the caller sent nothing to enqueue.
            None => Ok(Returned::Error(FunctionError::new(
                self.identity.tag(BAD_REQUEST),
                "request body is required",
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ArchiveFunction (blob)
// ---------------------------------------------------------------------------

/// Stores the UTF-8 bytes of the HTTP request body as a blob.
pub struct ArchiveFunction {
    identity: ModuleIdentity,
}

impl ArchiveFunction {
    #[must_use]
    pub fn new(identity: ModuleIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl FunctionHandler for ArchiveFunction {
    fn output_bindings(&self) -> Vec<String> {
        vec![format!("{}:BlobOutput", self.identity.name)]
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<Returned, FunctionError> {
        let body = input_field(&request, "req", "Body")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                FunctionError::new(self.identity.tag(BAD_REQUEST), "text body is required")
            })?;
        Ok(Returned::from(Value::Bytes(body.as_bytes().to_vec())))
    }
}

/// Registers `hello`, `enqueue` and `archive` on `router`.
pub fn register_builtin_functions(router: &mut FunctionRouter, identity: &ModuleIdentity) {
    router.register("hello", Arc::new(HelloFunction::new(identity.clone())));
    router.register("enqueue", Arc::new(EnqueueFunction::new(identity.clone())));
    router.register("archive", Arc::new(ArchiveFunction::new(identity.clone())));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
