//! Custom-handler server: HTTP surface and invocation pipeline for functions
//! whose completion protocol lives in `azfn-core`.

pub mod network;
pub mod service;

pub use network::{NetworkConfig, NetworkModule};
pub use service::{FunctionHandler, FunctionRouter, ServerConfig};
