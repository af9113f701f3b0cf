//! Output binding resolution.
//!
//! A function's output bindings arrive as the annotation names attached to
//! it, in declaration order. The first one decides how the result is
//! shaped for the host.

use std::fmt;

/// Recognized output binding categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Queue,
    CosmosDocument,
    Blob,
    Http,
    /// Any binding not listed above.
    Generic,
}

impl BindingKind {
    /// Maps an unqualified binding name to its kind. Unknown names map to
    /// `Generic`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "QueueOutput" | "Queue" => BindingKind::Queue,
            "CosmosDBOutput" | "CosmosDocument" => BindingKind::CosmosDocument,
            "BlobOutput" | "Blob" => BindingKind::Blob,
            "HttpOutput" | "Http" => BindingKind::Http,
            _ => BindingKind::Generic,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BindingKind::Queue => "queue",
            BindingKind::CosmosDocument => "cosmos_document",
            BindingKind::Blob => "blob",
            BindingKind::Http => "http",
            BindingKind::Generic => "generic",
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects the primary binding kind from unqualified binding names.
///
/// Only the first name is considered. An empty list resolves to
/// `Generic`; callers that must reject it use [`OutputBindings::primary`].
#[must_use]
pub fn resolve<S: AsRef<str>>(names: &[S]) -> BindingKind {
    names
        .first()
        .map_or(BindingKind::Generic, |name| BindingKind::from_name(name.as_ref()))
}

/// Strips the module prefix from a qualified annotation name:
/// `"azfn/functions:HttpOutput"` becomes `"HttpOutput"`.
#[must_use]
pub fn unqualified(annotation: &str) -> &str {
    annotation.rsplit(':').next().unwrap_or(annotation)
}

/// The ordered, unqualified output binding names of one function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBindings {
    names: Vec<String>,
}

impl OutputBindings {
    /// Builds the list from annotation names as they were declared,
    /// qualified or not.
    #[must_use]
    pub fn from_annotations<S: AsRef<str>>(annotations: &[S]) -> Self {
        Self {
            names: annotations
                .iter()
                .map(|a| unqualified(a.as_ref()).to_string())
                .collect(),
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The primary binding kind, or `None` when no binding was declared.
    #[must_use]
    pub fn primary(&self) -> Option<BindingKind> {
        if self.names.is_empty() {
            None
        } else {
            Some(resolve(&self.names))
        }
    }
}
