use crate::error::{DecodeError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use plist::Value as Node;
use std::collections::BTreeMap;

/// JSON key used to carry binary data through the JSON views.
const JSON_DATA_KEY: &str = "$base64";

/// Any value a container dictionary node can hold.
///
/// Maps are kept in a `BTreeMap`, so key order is canonical (sorted) after a
/// round trip through the container codec.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    List(Vec<ParameterValue>),
    Map(BTreeMap<String, ParameterValue>),
}

impl ParameterValue {
    /// Build a map value from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<ParameterValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParameterValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ParameterValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` when this value is a map.
    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int(_) => "integer",
            Self::Double(_) => "real",
            Self::Bool(_) => "boolean",
            Self::Bytes(_) => "data",
            Self::List(_) => "array",
            Self::Map(_) => "dictionary",
        }
    }

    /// Structural mirror onto the container node tree. Never fails.
    pub fn to_node(&self) -> Node {
        match self {
            Self::String(s) => Node::String(s.clone()),
            Self::Int(i) => Node::Integer((*i).into()),
            Self::Double(f) => Node::Real(*f),
            Self::Bool(b) => Node::Boolean(*b),
            Self::Bytes(bytes) => Node::Data(bytes.clone()),
            Self::List(items) => Node::Array(items.iter().map(Self::to_node).collect()),
            Self::Map(map) => Node::Dictionary(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_node()))
                    .collect(),
            ),
        }
    }

    /// Decode an untyped node by probing, in order: string, integer, real,
    /// boolean, data, array, dictionary. The first match wins.
    pub fn from_node(node: &Node) -> Result<Self> {
        if let Some(s) = node.as_string() {
            return Ok(Self::String(s.to_string()));
        }
        if let Some(i) = node.as_signed_integer() {
            return Ok(Self::Int(i));
        }
        if let Some(f) = node.as_real() {
            return Ok(Self::Double(f));
        }
        if let Some(b) = node.as_boolean() {
            return Ok(Self::Bool(b));
        }
        if let Some(bytes) = node.as_data() {
            return Ok(Self::Bytes(bytes.to_vec()));
        }
        if let Some(items) = node.as_array() {
            return items
                .iter()
                .map(Self::from_node)
                .collect::<Result<Vec<_>>>()
                .map(Self::List);
        }
        if let Some(dict) = node.as_dictionary() {
            let mut map = BTreeMap::new();
            for (key, value) in dict {
                map.insert(key.clone(), Self::from_node(value)?);
            }
            return Ok(Self::Map(map));
        }
        Err(DecodeError::UnrepresentableNode(describe_node(node)))
    }

    /// Convert loosely typed JSON. Integers stay integers; `null` is rejected.
    /// An object of the form `{"$base64": "..."}` becomes binary data.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;
        match value {
            Json::Null => Err(DecodeError::UnrepresentableNode("JSON null".to_string())),
            Json::Bool(b) => Ok(Self::Bool(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => n
                    .as_f64()
                    .map(Self::Double)
                    .ok_or_else(|| DecodeError::UnrepresentableNode(format!("number {n}"))),
            },
            Json::String(s) => Ok(Self::String(s.clone())),
            Json::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            Json::Object(obj) => {
                if obj.len() == 1 {
                    if let Some(Json::String(encoded)) = obj.get(JSON_DATA_KEY) {
                        let bytes = BASE64
                            .decode(encoded)
                            .map_err(|_| DecodeError::invalid(JSON_DATA_KEY, "base64 text"))?;
                        return Ok(Self::Bytes(bytes));
                    }
                }
                let mut map = BTreeMap::new();
                for (key, value) in obj {
                    map.insert(key.clone(), Self::from_json(value)?);
                }
                Ok(Self::Map(map))
            }
        }
    }

    /// Human-readable JSON view. Non-finite reals render as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::String(s) => Json::String(s.clone()),
            Self::Int(i) => Json::from(*i),
            Self::Double(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::Bool(b) => Json::Bool(*b),
            Self::Bytes(bytes) => serde_json::json!({ JSON_DATA_KEY: BASE64.encode(bytes) }),
            Self::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => Json::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

fn describe_node(node: &Node) -> String {
    match node {
        Node::Date(date) => format!("date {date:?}"),
        Node::Uid(uid) => format!("uid {}", uid.get()),
        Node::Integer(i) => format!("integer {i:?} out of signed 64-bit range"),
        other => format!("{other:?}"),
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<u8>> for ParameterValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<ParameterValue>> for ParameterValue {
    fn from(value: Vec<ParameterValue>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, ParameterValue>> for ParameterValue {
    fn from(value: BTreeMap<String, ParameterValue>) -> Self {
        Self::Map(value)
    }
}
