use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FunctionError;
use crate::identity::TypeTag;

/// Generic runtime value produced and consumed by service functions.
///
/// Supports all JSON-compatible types plus binary data. Map entries keep
/// their insertion order so header mappings round-trip in the order the
/// function wrote them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON integer (signed 64-bit).
    Int(i64),
    /// JSON floating-point (64-bit IEEE 754).
    Float(f64),
    /// JSON number with no exact `i64` or `f64` form, kept as written.
    Number(serde_json::Number),
    /// JSON string (UTF-8).
    String(String),
    /// Binary data. Rendered to JSON as an array of byte integers.
    Bytes(Vec<u8>),
    /// JSON array (ordered sequence of values).
    Array(Vec<Value>),
    /// JSON object, insertion-ordered.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns the map entries if this value is a `Map`.
    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the integer if this value is an `Int`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string slice if this value is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// `Int` or `Float` when the number converts exactly, `Number` otherwise.
fn number(n: serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::Int(i);
    }
    match n.as_f64() {
        Some(f) if serde_json::Number::from_f64(f).is_some_and(|exact| exact == n) => {
            Value::Float(f)
        }
        _ => Value::Number(n),
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_unit(),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(bytes) => serializer.collect_seq(bytes),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Map(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// A value returned by a service function, optionally carrying its
/// declared type.
///
/// The tag is what distinguishes a domain record (for example the
/// module's own HTTP response type) from an arbitrary map with the same
/// shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceValue {
    pub tag: Option<TypeTag>,
    pub value: Value,
}

impl ServiceValue {
    /// An untagged value.
    #[must_use]
    pub fn plain(value: impl Into<Value>) -> Self {
        Self {
            tag: None,
            value: value.into(),
        }
    }

    /// A value declared as the given type.
    #[must_use]
    pub fn tagged(tag: TypeTag, value: Value) -> Self {
        Self {
            tag: Some(tag),
            value,
        }
    }

    /// Adds or replaces a field when the value is a map. No-op otherwise.
    #[must_use]
    pub fn with_field(mut self, key: &str, field: impl Into<Value>) -> Self {
        if let Value::Map(map) = &mut self.value {
            map.insert(key.to_string(), field.into());
        }
        self
    }

    /// Sets the `body` field of a response record.
    #[must_use]
    pub fn with_body(self, body: impl Into<Value>) -> Self {
        self.with_field("body", body)
    }

    /// Sets the `mediaType` field of a response record.
    #[must_use]
    pub fn with_media_type(self, media_type: &str) -> Self {
        self.with_field("mediaType", media_type)
    }

    /// Appends a header to the `headers` field of a response record,
    /// creating the mapping on first use.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Value::Map(map) = &mut self.value {
            let headers = map
                .entry("headers".to_string())
                .or_insert_with(|| Value::Map(IndexMap::new()));
            if let Value::Map(headers) = headers {
                headers.insert(name.to_string(), value.into());
            }
        }
        self
    }
}

impl From<Value> for ServiceValue {
    fn from(value: Value) -> Self {
        Self { tag: None, value }
    }
}

/// What a service function hands back through its success channel.
///
/// A function may surface a failure as a returned value instead of a
/// raised error; `Error` carries that case so it can be told apart by
/// inspection.
#[derive(Debug, Clone)]
pub enum Returned {
    Value(ServiceValue),
    Error(FunctionError),
}

impl From<ServiceValue> for Returned {
    fn from(value: ServiceValue) -> Self {
        Returned::Value(value)
    }
}

impl From<Value> for Returned {
    fn from(value: Value) -> Self {
        Returned::Value(ServiceValue::from(value))
    }
}

impl From<FunctionError> for Returned {
    fn from(error: FunctionError) -> Self {
        Returned::Error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_integers_stay_integers() {
        assert_eq!(Value::from(json!(42)), Value::Int(42));
        assert_eq!(Value::from(json!(1.5)), Value::Float(1.5));
    }

    #[test]
    fn map_keeps_insertion_order() {
        let value = Value::from(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<_> = value.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn bytes_serialize_as_integer_array() {
        let value = Value::Bytes(vec![1, 2, 255]);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!([1, 2, 255]));
    }

    #[test]
    fn non_finite_float_serializes_as_null() {
        let value = Value::Float(f64::INFINITY);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!(null));
    }

    #[test]
    fn parsed_map_keeps_key_order() {
        let value: Value = serde_json::from_str(r#"{"z": 1, "a": {"y": 2, "b": 3}, "m": 4}"#).unwrap();
        let keys: Vec<_> = value.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"z":1,"a":{"y":2,"b":3},"m":4}"#
        );
    }

    #[test]
    fn numbers_without_exact_form_are_kept_as_written() {
        let text = r#"[18446744073709551615,12345678901234567890.5,2.50,-7,0.25]"#;
        let value: Value = serde_json::from_str(text).unwrap();
        let Value::Array(items) = &value else {
            panic!("expected array, got {value:?}");
        };
        assert!(matches!(items[0], Value::Number(_)));
        assert!(matches!(items[1], Value::Number(_)));
        assert!(matches!(items[2], Value::Number(_)));
        assert_eq!(items[3], Value::Int(-7));
        assert_eq!(items[4], Value::Float(0.25));
        assert_eq!(serde_json::to_string(&value).unwrap(), text);
    }

    #[test]
    fn with_header_creates_headers_map() {
        let sv = ServiceValue::plain(Value::Map(IndexMap::new()))
            .with_header("X-One", "1")
            .with_header("X-Two", "2");
        let headers = sv.value.as_map().unwrap()["headers"].as_map().unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["X-Two"], Value::from("2"));
    }

    #[test]
    fn with_field_ignores_non_maps() {
        let sv = ServiceValue::plain("text").with_body("ignored");
        assert_eq!(sv.value, Value::from("text"));
    }
}
