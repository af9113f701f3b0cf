//! Module identity used to decide whether a type or error belongs to this
//! runtime's own domain.

use std::fmt;

use indexmap::IndexMap;

use crate::types::{ServiceValue, Value};

/// Organization of the built-in identity.
pub const DEFAULT_ORG: &str = "azfn";
/// Module name of the built-in identity.
pub const DEFAULT_MODULE: &str = "functions";

/// Type name of the module's HTTP response record.
pub const HTTP_RESPONSE_TYPE: &str = "HttpResponse";
/// Type name of the wrapper produced for foreign invocation failures.
pub const SERVICE_EXECUTION_ERROR: &str = "ServiceExecutionError";

/// Organization plus module name identifying a package of types.
///
/// Components that check domain ownership hold one of these instead of
/// comparing against global constants, so the same code can be exercised
/// against any identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    pub org: String,
    pub name: String,
}

impl ModuleIdentity {
    #[must_use]
    pub fn new(org: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
        }
    }

    /// A type tag for `type_name` declared in this module.
    #[must_use]
    pub fn tag(&self, type_name: &str) -> TypeTag {
        TypeTag {
            module: self.clone(),
            type_name: type_name.to_string(),
        }
    }

    /// Whether `tag` names a type declared in this module.
    #[must_use]
    pub fn owns(&self, tag: &TypeTag) -> bool {
        tag.module == *self
    }

    /// Starts a structured HTTP response record owned by this module.
    ///
    /// The record carries `status: {code}`; body, headers and media type
    /// are added with the `ServiceValue` builder methods.
    #[must_use]
    pub fn http_response(&self, code: i64) -> ServiceValue {
        let mut status = IndexMap::new();
        status.insert("code".to_string(), Value::Int(code));
        let mut record = IndexMap::new();
        record.insert("status".to_string(), Value::Map(status));
        ServiceValue::tagged(self.tag(HTTP_RESPONSE_TYPE), Value::Map(record))
    }
}

impl Default for ModuleIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_ORG, DEFAULT_MODULE)
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.name)
    }
}

/// Declared type of a value or error: owning module plus type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag {
    pub module: ModuleIdentity,
    pub type_name: String,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.type_name)
    }
}
