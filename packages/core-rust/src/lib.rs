//! azfn Core — output binding resolution, response projection, error
//! classification and the one-shot completion signal of a function
//! invocation.

pub mod binding;
pub mod callback;
pub mod classify;
pub mod completion;
pub mod envelope;
pub mod error;
pub mod host;
pub mod identity;
pub mod project;
pub mod result;
pub mod types;

pub use binding::{resolve, BindingKind, OutputBindings};
pub use callback::{CompletionCallback, InvocationCallback};
pub use classify::{ErrorClassifier, TraceSink, TracingSink};
pub use completion::{
    completion_channel, Completion, CompletionError, CompletionReceiver, CompletionSignal,
};
pub use envelope::{HttpResponse, ResponseEnvelope};
pub use error::FunctionError;
pub use host::{ErrorBody, FailureResponse, HostRequest, HostResponse};
pub use identity::{ModuleIdentity, TypeTag};
pub use project::project;
pub use result::{ResultValue, StructuredHttpResponse};
pub use types::{Returned, ServiceValue, Value};
