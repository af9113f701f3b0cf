//! Response projection: shapes a function result for its primary output
//! binding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use indexmap::IndexMap;

use crate::binding::BindingKind;
use crate::envelope::{HttpResponse, ResponseEnvelope};
use crate::result::{ResultValue, StructuredHttpResponse};
use crate::types::Value;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Builds the response envelope for `result` under binding `kind`.
///
/// - `Queue`, `CosmosDocument`: `{outMsg: result}` verbatim.
/// - `Blob`: `{outMsg: base64(result)}` for binary results. Any other
///   result gets the generic shape.
/// - `Http`: structured responses become `{resp: {statusCode, body?,
///   headers}}`; everything else gets the generic shape.
/// - `Generic`: `{resp: {body: result}}`.
#[must_use]
pub fn project(kind: BindingKind, result: ResultValue) -> ResponseEnvelope {
    match (kind, result) {
        (BindingKind::Queue | BindingKind::CosmosDocument, result) => {
            ResponseEnvelope::out_msg(result.into_value())
        }
        (BindingKind::Blob, ResultValue::Opaque(Value::Bytes(bytes))) => {
            ResponseEnvelope::out_msg(Value::String(STANDARD.encode(bytes)))
        }
        (BindingKind::Http, ResultValue::StructuredHttp { response, .. }) => {
            ResponseEnvelope::resp(http_response(response))
        }
        (BindingKind::Blob | BindingKind::Http | BindingKind::Generic, result) => {
            ResponseEnvelope::resp(HttpResponse::body_only(result.into_value()))
        }
    }
}

fn http_response(response: StructuredHttpResponse) -> HttpResponse {
    let mut headers = response.headers.unwrap_or_default();
    let existing = content_type_key(&headers);
    match (existing, response.media_type) {
        (Some(key), Some(media_type)) => {
            headers.insert(key, media_type);
        }
        (None, Some(media_type)) => {
            headers.insert(CONTENT_TYPE.to_string(), media_type);
        }
        (None, None) => {
            headers.insert(
                CONTENT_TYPE.to_string(),
                Value::String(DEFAULT_CONTENT_TYPE.to_string()),
            );
        }
        (Some(_), None) => {}
    }

    HttpResponse {
        status_code: Some(response.status_code.to_string()),
        body: response.body,
        headers: Some(headers),
    }
}

/// The header key matching `Content-Type` case-insensitively, as spelled
/// by the caller.
fn content_type_key(headers: &IndexMap<String, Value>) -> Option<String> {
    headers
        .keys()
        .find(|k| k.eq_ignore_ascii_case(CONTENT_TYPE))
        .cloned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::identity::ModuleIdentity;
    use crate::types::ServiceValue;

    fn structured(value: ServiceValue) -> ResultValue {
        ResultValue::resolve(value, &ModuleIdentity::default())
    }

    fn wire(env: &ResponseEnvelope) -> serde_json::Value {
        serde_json::to_value(env).unwrap()
    }

    #[test]
    fn queue_and_document_wrap_verbatim() {
        let value = Value::from(json!({"order": 7, "items": ["a", "b"]}));
        for kind in [BindingKind::Queue, BindingKind::CosmosDocument] {
            let env = project(kind, ResultValue::Opaque(value.clone()));
            assert_eq!(env, ResponseEnvelope::out_msg(value.clone()));
        }
    }

    #[test]
    fn queue_does_not_inspect_structured_responses() {
        let id = ModuleIdentity::default();
        let record = id.http_response(200).with_body("x");
        let source = record.value.clone();
        let env = project(BindingKind::Queue, structured(record));
        assert_eq!(env, ResponseEnvelope::out_msg(source));
    }

    #[test]
    fn blob_bytes_are_base64() {
        let env = project(BindingKind::Blob, ResultValue::Opaque(Value::Bytes(b"hello".to_vec())));
        assert_eq!(wire(&env), json!({"outMsg": "aGVsbG8="}));
    }

    #[test]
    fn blob_non_binary_falls_back_to_generic() {
        let env = project(BindingKind::Blob, ResultValue::Opaque(Value::from("text")));
        assert_eq!(wire(&env), json!({"resp": {"body": "text"}}));
    }

    #[test]
    fn http_structured_defaults_content_type() {
        let id = ModuleIdentity::default();
        let record = id
            .http_response(404)
            .with_body("nf")
            .with_field("headers", Value::Map(IndexMap::new()));
        let env = project(BindingKind::Http, structured(record));
        assert_eq!(
            wire(&env),
            json!({"resp": {"statusCode": "404", "body": "nf", "headers": {"Content-Type": "text/plain"}}})
        );
    }

    #[test]
    fn http_structured_without_headers_synthesizes_them() {
        let id = ModuleIdentity::default();
        let env = project(BindingKind::Http, structured(id.http_response(204)));
        assert_eq!(
            wire(&env),
            json!({"resp": {"statusCode": "204", "headers": {"Content-Type": "text/plain"}}})
        );
    }

    #[test]
    fn http_existing_content_type_is_kept() {
        let id = ModuleIdentity::default();
        let record = id
            .http_response(200)
            .with_body("{}")
            .with_header("content-type", "application/json");
        let env = project(BindingKind::Http, structured(record));
        let headers = env.resp.unwrap().headers.unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["content-type"], Value::from("application/json"));
    }

    #[test]
    fn http_media_type_wins() {
        let id = ModuleIdentity::default();
        let record = id
            .http_response(200)
            .with_header("Content-Type", "text/plain")
            .with_media_type("application/xml");
        let env = project(BindingKind::Http, structured(record));
        let headers = env.resp.unwrap().headers.unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[CONTENT_TYPE], Value::from("application/xml"));
    }

    #[test]
    fn http_media_type_without_headers() {
        let id = ModuleIdentity::default();
        let record = id.http_response(200).with_media_type("application/json");
        let env = project(BindingKind::Http, structured(record));
        assert_eq!(
            env.resp.unwrap().headers.unwrap()[CONTENT_TYPE],
            Value::from("application/json")
        );
    }

    #[test]
    fn http_header_order_is_preserved() {
        let id = ModuleIdentity::default();
        let record = id
            .http_response(200)
            .with_header("X-B", "2")
            .with_header("X-A", "1");
        let env = project(BindingKind::Http, structured(record));
        let keys: Vec<_> = env.resp.unwrap().headers.unwrap().keys().cloned().collect();
        assert_eq!(keys, ["X-B", "X-A", CONTENT_TYPE]);
    }

    #[test]
    fn http_opaque_result_is_body_only() {
        let value = Value::from(json!({"status": {"code": 200}}));
        let env = project(BindingKind::Http, ResultValue::Opaque(value));
        assert_eq!(wire(&env), json!({"resp": {"body": {"status": {"code": 200}}}}));
    }

    #[test]
    fn generic_wraps_whole_result() {
        let id = ModuleIdentity::default();
        let record = id.http_response(500).with_body("x");
        let source = record.value.clone();
        let env = project(BindingKind::Generic, structured(record));
        assert_eq!(env, ResponseEnvelope::resp(HttpResponse::body_only(source)));

        let env = project(BindingKind::Generic, ResultValue::Opaque(Value::Null));
        assert_eq!(wire(&env), json!({"resp": {"body": null}}));
    }
}
