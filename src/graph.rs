// Strongly-typed schema graph. Everything downstream matches on these variants;
// `serde_json::Value` only appears at the conversion boundary.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::{Result, SchemaError};

/// Only local definition pointers are understood.
static DEFS_POINTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#/\$defs/([^/]+)$").expect("static pointer pattern")
});

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object(SchemaObject),
    /// Positional role only: the value of `anyOf`, `required`, `examples`, ...
    Array(Vec<SchemaNode>),
    Scalar(Scalar),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// One JSON object of the schema, in producer (or canonical) key order.
///
/// Equality ignores key order; compare serialized text when order matters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaObject {
    entries: IndexMap<String, SchemaNode>,
}

/// The raw producer output: a root object plus its `$defs` registry.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    root: SchemaObject,
}

// ————————————————————————————————————————————————————————————————————————————
// NODES
// ————————————————————————————————————————————————————————————————————————————

impl SchemaNode {
    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            SchemaNode::Object(obj) => Some(obj),
            _ => None,
        }
    }
    pub fn as_array(&self) -> Option<&[SchemaNode]> {
        match self {
            SchemaNode::Array(xs) => Some(xs),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SchemaNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
    pub fn is_null(&self) -> bool {
        matches!(self, SchemaNode::Scalar(Scalar::Null))
    }
    pub fn is_bool(&self) -> bool {
        matches!(self, SchemaNode::Scalar(Scalar::Bool(_)))
    }
    pub fn string(s: impl Into<String>) -> Self {
        SchemaNode::Scalar(Scalar::String(s.into()))
    }
}

impl SchemaObject {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.entries.get(key)
    }
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
    /// Replaces in place when the key exists, appends otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: SchemaNode) -> Option<SchemaNode> {
        self.entries.insert(key.into(), value)
    }
    pub fn remove(&mut self, key: &str) -> Option<SchemaNode> {
        self.entries.shift_remove(key)
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
    pub fn into_entries(self) -> IndexMap<String, SchemaNode> {
        self.entries
    }
    pub fn from_entries(entries: IndexMap<String, SchemaNode>) -> Self {
        Self { entries }
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(SchemaNode::as_str)
    }

    /// `type` when it is a single name. List-valued types are read with [`Self::type_names`].
    pub fn type_name(&self) -> Option<&str> {
        self.get_str("type")
    }
    pub fn type_names(&self) -> Vec<&str> {
        match self.get("type") {
            Some(SchemaNode::Scalar(Scalar::String(s))) => vec![s.as_str()],
            Some(SchemaNode::Array(xs)) => xs.iter().filter_map(SchemaNode::as_str).collect(),
            _ => Vec::new(),
        }
    }
    pub fn is_null_type(&self) -> bool {
        self.type_name() == Some("null")
    }
    pub fn reference(&self) -> Option<&str> {
        self.get_str("$ref")
    }
    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }
    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }
    pub fn alias(&self) -> Option<&str> {
        self.get_str("alias")
    }
    pub fn properties(&self) -> Option<&SchemaObject> {
        self.get("properties").and_then(SchemaNode::as_object)
    }
    pub fn definitions(&self) -> Option<&SchemaObject> {
        self.get("$defs").and_then(SchemaNode::as_object)
    }
    pub fn items(&self) -> Option<&SchemaObject> {
        self.get("items").and_then(SchemaNode::as_object)
    }
    /// Variants of `anyOf` / `oneOf` / `allOf`; non-object members are skipped.
    pub fn variants(&self, key: &str) -> impl Iterator<Item = &SchemaObject> {
        self.get(key)
            .and_then(SchemaNode::as_array)
            .unwrap_or_default()
            .iter()
            .filter_map(SchemaNode::as_object)
    }
    /// Names listed in this node's own `required`.
    pub fn required(&self) -> BTreeSet<&str> {
        self.get("required")
            .and_then(SchemaNode::as_array)
            .unwrap_or_default()
            .iter()
            .filter_map(SchemaNode::as_str)
            .collect()
    }
    pub fn examples(&self) -> &[SchemaNode] {
        self.get("examples").and_then(SchemaNode::as_array).unwrap_or_default()
    }
    /// The declared default, unless absent or explicitly `null`.
    pub fn default_value(&self) -> Option<&SchemaNode> {
        self.get("default").filter(|v| !v.is_null())
    }
}

impl IntoIterator for SchemaObject {
    type Item = (String, SchemaNode);
    type IntoIter = indexmap::map::IntoIter<String, SchemaNode>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, SchemaNode)> for SchemaObject {
    fn from_iter<T: IntoIterator<Item = (String, SchemaNode)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// GRAPH
// ————————————————————————————————————————————————————————————————————————————

impl SchemaGraph {
    pub fn new(root: SchemaNode) -> Result<Self> {
        match root {
            SchemaNode::Object(root) => Ok(Self { root }),
            _ => Err(SchemaError::malformed("", "an object at the schema root")),
        }
    }
    pub fn root(&self) -> &SchemaObject {
        &self.root
    }
    pub fn to_node(&self) -> SchemaNode {
        SchemaNode::Object(self.root.clone())
    }
    /// The `$defs` registry, in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.root.definitions().into_iter().flat_map(SchemaObject::iter)
    }
    pub fn definition(&self, name: &str) -> Option<&SchemaNode> {
        self.root.definitions().and_then(|defs| defs.get(name))
    }
    /// Looks up a definition by name; a missing name is fatal.
    pub fn resolve(&self, name: &str) -> Result<&SchemaObject> {
        match self.definition(name) {
            Some(SchemaNode::Object(def)) => Ok(def),
            Some(_) => Err(SchemaError::malformed(
                pointer_child("/$defs", name),
                "a schema object",
            )),
            None => Err(SchemaError::UnresolvedReference {
                reference: format!("#/$defs/{name}"),
                name: name.to_string(),
            }),
        }
    }
    /// Resolves a `$ref` string to the definition name and its schema.
    pub fn resolve_ref<'a>(&'a self, pointer: &'a str) -> Result<(&'a str, &'a SchemaObject)> {
        let name = ref_target(pointer)?;
        Ok((name, self.resolve(name)?))
    }
}

/// `#/$defs/Name` → `Name`.
pub fn ref_target(pointer: &str) -> Result<&str> {
    DEFS_POINTER
        .captures(pointer)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| SchemaError::UnsupportedReference(pointer.to_string()))
}

/// Extends a JSON Pointer by one (escaped) token.
pub fn pointer_child(at: &str, token: &str) -> String {
    format!("{at}/{}", token.replace('~', "~0").replace('/', "~1"))
}

// ————————————————————————————————————————————————————————————————————————————
// SERDE
// ————————————————————————————————————————————————————————————————————————————

impl From<Value> for SchemaNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SchemaNode::Scalar(Scalar::Null),
            Value::Bool(b) => SchemaNode::Scalar(Scalar::Bool(b)),
            Value::Number(n) => SchemaNode::Scalar(Scalar::Number(n)),
            Value::String(s) => SchemaNode::Scalar(Scalar::String(s)),
            Value::Array(xs) => SchemaNode::Array(xs.into_iter().map(SchemaNode::from).collect()),
            Value::Object(map) => SchemaNode::Object(
                map.into_iter().map(|(k, v)| (k, SchemaNode::from(v))).collect(),
            ),
        }
    }
}

impl From<&SchemaNode> for Value {
    fn from(node: &SchemaNode) -> Self {
        match node {
            SchemaNode::Scalar(Scalar::Null) => Value::Null,
            SchemaNode::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            SchemaNode::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            SchemaNode::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            SchemaNode::Array(xs) => Value::Array(xs.iter().map(Value::from).collect()),
            SchemaNode::Object(obj) => Value::Object(
                obj.iter().map(|(k, v)| (k.to_string(), Value::from(v))).collect(),
            ),
        }
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            SchemaNode::Object(obj) => obj.serialize(serializer),
            SchemaNode::Array(xs) => serializer.collect_seq(xs),
            SchemaNode::Scalar(Scalar::Null) => serializer.serialize_unit(),
            SchemaNode::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            SchemaNode::Scalar(Scalar::Number(n)) => n.serialize(serializer),
            SchemaNode::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for SchemaObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(&self.entries)
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(SchemaNode::from)
    }
}
