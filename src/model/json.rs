use serde::{Deserialize, Serialize};
use std::fmt;

/// Response body in the shape the structural differ works on.
///
/// Bodies arrive as arbitrary JSON; they are normalized into this closed set
/// of variants when a snapshot is deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    /// Kept as parsed so large integer ids survive a save/load cycle.
    Number(serde_json::Number),
    String(String),
    Array(Vec<JsonValue>),
    /// Keys keep the order they had in the response body.
    Object(Vec<(String, JsonValue)>),
}

/// Kind of a JSON value, ignoring its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(name)
    }
}

impl JsonValue {
    pub fn kind(&self) -> JsonKind {
        match self {
            JsonValue::Null => JsonKind::Null,
            JsonValue::Bool(_) => JsonKind::Boolean,
            JsonValue::Number(_) => JsonKind::Number,
            JsonValue::String(_) => JsonKind::String,
            JsonValue::Array(_) => JsonKind::Array,
            JsonValue::Object(_) => JsonKind::Object,
        }
    }

    /// Look up an object member by key. Returns `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => JsonValue::Number(n),
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for serde_json::Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => serde_json::Value::Null,
            JsonValue::Bool(b) => serde_json::Value::Bool(b),
            JsonValue::Number(n) => serde_json::Value::Number(n),
            JsonValue::String(s) => serde_json::Value::String(s),
            JsonValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            JsonValue::Object(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = serde_json::Value::from(self.clone());
        write!(f, "{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_nested_body() {
        let value = JsonValue::from(json!({"id": 1, "tags": ["a"], "owner": null}));
        match &value {
            JsonValue::Object(entries) => {
                let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["id", "tags", "owner"]);
            }
            other => panic!("expected object, got {:?}", other),
        }
        assert_eq!(value.get("id").map(JsonValue::kind), Some(JsonKind::Number));
        assert_eq!(value.get("tags").map(JsonValue::kind), Some(JsonKind::Array));
        assert_eq!(value.get("owner"), Some(&JsonValue::Null));
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn test_integers_serialize_without_fraction() {
        let value = JsonValue::from(json!({"id": 7, "ratio": 0.5}));
        assert_eq!(value.to_string(), r#"{"id":7,"ratio":0.5}"#);
    }

    #[test]
    fn test_large_integers_keep_every_digit() {
        let value: JsonValue = serde_json::from_str(r#"{"id": 9007199254740993}"#).unwrap();
        assert_eq!(value.to_string(), r#"{"id":9007199254740993}"#);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"id":9007199254740993}"#
        );
    }

    #[test]
    fn test_deserialize_through_serde() {
        let value: JsonValue = serde_json::from_str(r#"[true, "x", {"k": 2}]"#).unwrap();
        let kinds: Vec<JsonKind> = match &value {
            JsonValue::Array(items) => items.iter().map(JsonValue::kind).collect(),
            _ => vec![],
        };
        assert_eq!(
            kinds,
            vec![JsonKind::Boolean, JsonKind::String, JsonKind::Object]
        );
    }
}
