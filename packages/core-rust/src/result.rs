//! Resolution of a returned value into the shapes the projector knows.
//!
//! The structured-response check happens exactly once, here, when a
//! function's result enters the completion path. Projection then matches
//! on `ResultValue` instead of probing the value's shape again.

use indexmap::IndexMap;

use crate::identity::ModuleIdentity;
use crate::types::{ServiceValue, Value};

const STATUS: &str = "status";
const CODE: &str = "code";
const BODY: &str = "body";
const HEADERS: &str = "headers";
const MEDIA_TYPE: &str = "mediaType";

/// A result recognized as the module's own HTTP response record.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredHttpResponse {
    pub status_code: i64,
    pub body: Option<Value>,
    pub headers: Option<IndexMap<String, Value>>,
    pub media_type: Option<Value>,
}

/// A function result, classified at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
    /// The module's HTTP response record. `source` is the value as
    /// returned, used when a binding wants the whole result verbatim.
    StructuredHttp {
        response: StructuredHttpResponse,
        source: Value,
    },
    /// Anything else.
    Opaque(Value),
}

impl ResultValue {
    /// Classifies `returned` against the module `identity`.
    ///
    /// A result is a structured HTTP response iff its declared type is
    /// owned by `identity`, it is a map, and it has a `status` sub-object
    /// carrying an integer `code`. A `headers` field that is not a map is
    /// treated as absent.
    #[must_use]
    pub fn resolve(returned: ServiceValue, identity: &ModuleIdentity) -> Self {
        let owned = returned.tag.as_ref().is_some_and(|tag| identity.owns(tag));
        if !owned {
            return ResultValue::Opaque(returned.value);
        }
        match structured_parts(&returned.value) {
            Some(response) => ResultValue::StructuredHttp {
                response,
                source: returned.value,
            },
            None => ResultValue::Opaque(returned.value),
        }
    }

    /// The value as returned by the function.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            ResultValue::StructuredHttp { source, .. } => source,
            ResultValue::Opaque(value) => value,
        }
    }
}

fn structured_parts(value: &Value) -> Option<StructuredHttpResponse> {
    let fields = value.as_map()?;
    let status_code = fields.get(STATUS)?.as_map()?.get(CODE)?.as_int()?;
    Some(StructuredHttpResponse {
        status_code,
        body: fields.get(BODY).cloned(),
        headers: fields.get(HEADERS).and_then(Value::as_map).cloned(),
        media_type: fields.get(MEDIA_TYPE).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn owned_record_with_status_is_structured() {
        let id = ModuleIdentity::default();
        let resolved = ResultValue::resolve(
            id.http_response(404).with_body("nf").with_media_type("text/html"),
            &id,
        );
        let ResultValue::StructuredHttp { response, .. } = resolved else {
            panic!("expected structured response");
        };
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, Some(Value::from("nf")));
        assert_eq!(response.media_type, Some(Value::from("text/html")));
        assert!(response.headers.is_none());
    }

    #[test]
    fn same_shape_from_foreign_module_is_opaque() {
        let id = ModuleIdentity::default();
        let other = ModuleIdentity::new("acme", "http");
        let value = other.http_response(200);
        let expected = value.value.clone();
        assert_eq!(ResultValue::resolve(value, &id), ResultValue::Opaque(expected));
    }

    #[test]
    fn untagged_map_is_opaque() {
        let id = ModuleIdentity::default();
        let value = Value::from(json!({"status": {"code": 200}}));
        let resolved = ResultValue::resolve(ServiceValue::plain(value.clone()), &id);
        assert_eq!(resolved, ResultValue::Opaque(value));
    }

    #[test]
    fn owned_record_without_status_is_opaque() {
        let id = ModuleIdentity::default();
        let value = Value::from(json!({"body": "x"}));
        let resolved = ResultValue::resolve(ServiceValue::tagged(id.tag("Other"), value.clone()), &id);
        assert_eq!(resolved, ResultValue::Opaque(value));
    }

    #[test]
    fn non_integer_code_is_opaque() {
        let id = ModuleIdentity::default();
        let value = Value::from(json!({"status": {"code": "200"}}));
        let resolved =
            ResultValue::resolve(ServiceValue::tagged(id.tag("HttpResponse"), value.clone()), &id);
        assert_eq!(resolved, ResultValue::Opaque(value));
    }

    #[test]
    fn non_map_headers_are_dropped() {
        let id = ModuleIdentity::default();
        let value = id.http_response(200).with_field("headers", "nope");
        let ResultValue::StructuredHttp { response, .. } = ResultValue::resolve(value, &id) else {
            panic!("expected structured response");
        };
        assert!(response.headers.is_none());
    }

    #[test]
    fn into_value_returns_source() {
        let id = ModuleIdentity::default();
        let value = id.http_response(200);
        let source = value.value.clone();
        assert_eq!(ResultValue::resolve(value, &id).into_value(), source);
    }
}
