//! Canonical form of a producer schema.
//!
//! Turns the raw draft-07 graph into something a TOML language server can
//! embed, and that diffs cleanly in version control:
//! - `"default": null` is dropped (TOML has no null);
//! - `null` variants are stripped from unions, and a union left with a single
//!   variant is inlined into its parent (`Optional[T]` → `T`);
//! - nested schemas are normalized by key role, maps of schemas are sorted;
//! - keys are reordered as header ⧺ sorted middle ⧺ footer.
//!
//! The transform is pure: the input is borrowed and a new tree is returned.
//! It is idempotent, so canonical output fed back in comes out byte-identical.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};
use crate::graph::{pointer_child, SchemaGraph, SchemaNode, SchemaObject};

// ------------------------------- Policy ---------------------------------- //

/// Keys emitted first, in this order, when present.
pub const HEADER_ORDER: &[&str] = &[
    "$schema",
    "$id",
    "$ref",
    "title",
    "deprecated",
    "description",
    "type",
    "required",
    "additionalProperties",
    "default",
    "items",
    "properties",
    "patternProperties",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "format",
    "minimum",
    "exclusiveMinimum",
    "maximum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "multipleOf",
    "pattern",
];

/// Keys emitted last, in this order, when present.
pub const FOOTER_ORDER: &[&str] = &["examples", "$defs"];

/// Union keywords, in the order their null variants are stripped.
pub const UNION_KEYS: &[&str] = &["anyOf", "allOf", "oneOf"];

// ------------------------------ Entry points ------------------------------ //

/// Normalizes a whole schema document. The root must be an object.
pub fn normalize(node: &SchemaNode) -> Result<SchemaNode> {
    match node {
        SchemaNode::Object(obj) => normalize_object(obj, "").map(SchemaNode::Object),
        _ => Err(SchemaError::malformed("", "an object at the schema root")),
    }
}

pub fn normalize_graph(graph: &SchemaGraph) -> Result<SchemaNode> {
    debug!(
        definitions = graph.definitions().count(),
        "normalizing schema graph"
    );
    normalize_object(graph.root(), "").map(SchemaNode::Object)
}

/// Canonical text: 2-space indentation, canonical key order, trailing newline.
pub fn to_canonical_json(node: &SchemaNode) -> Result<String> {
    let mut text = serde_json::to_string_pretty(node)?;
    text.push('\n');
    Ok(text)
}

/// Normalizes one schema object; `at` is its JSON Pointer, for errors.
pub fn normalize_object(obj: &SchemaObject, at: &str) -> Result<SchemaObject> {
    let stripped = strip_nulls(obj, at)?;

    let mut out = SchemaObject::new();
    for (key, value) in stripped {
        let at_key = pointer_child(at, &key);
        let value = match key.as_str() {
            "items" => {
                let items = value
                    .as_object()
                    .ok_or_else(|| SchemaError::malformed(&at_key, "a schema object under `items`"))?;
                SchemaNode::Object(normalize_object(items, &at_key)?)
            }
            "properties" | "$defs" => sort_nested(value, &at_key)?,
            "patternProperties" => sort_nested_strict(&value, &at_key)?,
            "additionalProperties" => match value {
                SchemaNode::Object(schema) => SchemaNode::Object(normalize_object(&schema, &at_key)?),
                flag if flag.is_bool() => flag,
                _ => {
                    return Err(SchemaError::malformed(
                        at_key,
                        "a schema object or boolean under `additionalProperties`",
                    ));
                }
            },
            // Union variants were normalized while stripping nulls.
            _ => value,
        };
        out.insert(key, value);
    }

    Ok(reorder(out))
}

// ------------------------------ Null policy ------------------------------ //

/// Drops `"default": null` and null union variants, collapsing single-variant
/// unions into the node itself. Surviving variants come back normalized.
fn strip_nulls(obj: &SchemaObject, at: &str) -> Result<SchemaObject> {
    let mut out = obj.clone();

    if out.get("default").is_some_and(SchemaNode::is_null) {
        out.remove("default");
    }

    for &key in UNION_KEYS {
        let Some(value) = out.get(key) else { continue };
        let at_key = pointer_child(at, key);
        let variants = value
            .as_array()
            .ok_or_else(|| SchemaError::malformed(&at_key, "an array of schema objects"))?;

        let mut kept = Vec::with_capacity(variants.len());
        for (index, variant) in variants.iter().enumerate() {
            let at_variant = pointer_child(&at_key, &index.to_string());
            let variant = variant
                .as_object()
                .ok_or_else(|| SchemaError::malformed(&at_variant, "a schema object"))?;
            let variant = normalize_object(variant, &at_variant)?;
            if !variant.is_null_type() {
                kept.push(variant);
            }
        }

        if kept.len() == 1 {
            trace!(at = %at_key, "inlining single-variant union");
            out.remove(key);
            for (k, v) in kept.remove(0) {
                out.insert(k, v);
            }
        } else {
            // An emptied union stays as `[]`: valid, never satisfiable.
            out.insert(key, SchemaNode::Array(kept.into_iter().map(SchemaNode::Object).collect()));
        }
    }

    Ok(out)
}

// ------------------------------ Recursion -------------------------------- //

/// `properties` / `$defs`: sort by name, normalize object values, pass the rest.
fn sort_nested(value: SchemaNode, at: &str) -> Result<SchemaNode> {
    let SchemaNode::Object(map) = value else {
        return Ok(value);
    };
    let mut entries = map.into_entries();
    entries.sort_keys();
    let mut out = SchemaObject::new();
    for (name, schema) in entries {
        let schema = match schema {
            SchemaNode::Object(obj) => SchemaNode::Object(normalize_object(&obj, &pointer_child(at, &name))?),
            other => other,
        };
        out.insert(name, schema);
    }
    Ok(SchemaNode::Object(out))
}

/// `patternProperties`: pattern → schema, every value must be a schema object.
fn sort_nested_strict(value: &SchemaNode, at: &str) -> Result<SchemaNode> {
    let map = value
        .as_object()
        .ok_or_else(|| SchemaError::malformed(at, "a map of pattern to schema object"))?;
    let mut patterns: Vec<(&str, &SchemaNode)> = map.iter().collect();
    patterns.sort_by(|a, b| a.0.cmp(b.0));
    let mut out = SchemaObject::new();
    for (pattern, schema) in patterns {
        let at_pattern = pointer_child(at, pattern);
        let schema = schema
            .as_object()
            .ok_or_else(|| SchemaError::malformed(&at_pattern, "a schema object"))?;
        out.insert(pattern, SchemaNode::Object(normalize_object(schema, &at_pattern)?));
    }
    Ok(SchemaNode::Object(out))
}

// ------------------------------ Key order -------------------------------- //

fn reorder(obj: SchemaObject) -> SchemaObject {
    let mut rest = obj.into_entries();
    let mut ordered = IndexMap::with_capacity(rest.len());

    for &key in HEADER_ORDER {
        if let Some(value) = rest.shift_remove(key) {
            ordered.insert(key.to_string(), value);
        }
    }
    let mut footer = Vec::new();
    for &key in FOOTER_ORDER {
        if let Some(value) = rest.shift_remove(key) {
            footer.push((key.to_string(), value));
        }
    }

    rest.sort_keys();
    ordered.extend(rest);
    ordered.extend(footer);
    SchemaObject::from_entries(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn norm(v: Value) -> Value {
        let node = normalize(&SchemaNode::from(v)).expect("normalizes");
        Value::from(&node)
    }

    fn key_order(v: &Value) -> Vec<&str> {
        v.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn optional_string_loses_union_and_null_default() {
        let out = norm(json!({
            "anyOf": [{"type": "string"}, {"type": "null"}],
            "default": null
        }));
        assert_eq!(out.to_string(), r#"{"type":"string"}"#);
    }

    #[test]
    fn optional_property_collapses_to_plain_type() {
        let out = norm(json!({
            "properties": {"p": {"anyOf": [{"type": "integer"}, {"type": "null"}]}}
        }));
        assert_eq!(out.to_string(), r#"{"properties":{"p":{"type":"integer"}}}"#);
    }

    #[test]
    fn inlined_variant_overrides_parent_keys() {
        let out = norm(json!({
            "description": "outer",
            "oneOf": [{"type": "null"}, {"type": "array", "items": {"type": "string"}, "description": "inner"}]
        }));
        assert_eq!(
            out,
            json!({"description": "inner", "type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn multi_variant_union_keeps_order_minus_nulls() {
        let out = norm(json!({
            "anyOf": [
                {"type": "string", "minLength": 1},
                {"type": "null"},
                {"$ref": "#/$defs/Table"}
            ]
        }));
        assert_eq!(
            out.to_string(),
            r##"{"anyOf":[{"type":"string","minLength":1},{"$ref":"#/$defs/Table"}]}"##
        );
    }

    #[test]
    fn all_null_union_becomes_empty_array() {
        let out = norm(json!({"allOf": [{"type": "null"}], "title": "t"}));
        assert_eq!(out.to_string(), r#"{"title":"t","allOf":[]}"#);
    }

    #[test]
    fn non_null_default_is_kept() {
        let out = norm(json!({"type": "boolean", "default": false}));
        assert_eq!(out, json!({"type": "boolean", "default": false}));
    }

    #[test]
    fn keys_follow_header_middle_footer() {
        let out = norm(json!({
            "zeta": 1,
            "examples": ["e"],
            "$defs": {},
            "alpha": 2,
            "type": "object",
            "$schema": "s",
            "pattern": "^x$",
            "description": "d"
        }));
        assert_eq!(
            key_order(&out),
            vec!["$schema", "description", "type", "pattern", "alpha", "zeta", "examples", "$defs"]
        );
    }

    #[test]
    fn properties_and_defs_are_sorted_and_recursed() {
        let out = norm(json!({
            "$defs": {"B": {"type": "object", "title": "B"}, "A": {"default": null, "type": "string"}},
            "properties": {"z": {"type": "string"}, "a": true}
        }));
        assert_eq!(
            out.to_string(),
            r#"{"properties":{"a":true,"z":{"type":"string"}},"$defs":{"A":{"type":"string"},"B":{"title":"B","type":"object"}}}"#
        );
    }

    #[test]
    fn pattern_properties_are_two_level_normalized() {
        let out = norm(json!({
            "patternProperties": {
                "^z": {"anyOf": [{"type": "null"}, {"type": "number"}]},
                "^a": {"type": "string", "default": null}
            }
        }));
        assert_eq!(
            out.to_string(),
            r#"{"patternProperties":{"^a":{"type":"string"},"^z":{"type":"number"}}}"#
        );
    }

    #[test]
    fn additional_properties_schema_or_flag() {
        let out = norm(json!({
            "additionalProperties": {"anyOf": [{"type": "string"}, {"type": "null"}]}
        }));
        assert_eq!(out, json!({"additionalProperties": {"type": "string"}}));
        let out = norm(json!({"additionalProperties": false}));
        assert_eq!(out, json!({"additionalProperties": false}));
    }

    #[test]
    fn items_are_normalized() {
        let out = norm(json!({
            "type": "array",
            "items": {"minLength": 1, "anyOf": [{"type": "null"}, {"type": "string"}]}
        }));
        assert_eq!(out.to_string(), r#"{"type":"array","items":{"type":"string","minLength":1}}"#);
    }

    #[test]
    fn malformed_shapes_are_fatal() {
        let err = normalize(&SchemaNode::from(json!({"anyOf": ["string"]}))).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { ref at, .. } if at == "/anyOf/0"));

        let err = normalize(&SchemaNode::from(json!({"properties": {"x": {"items": [1]}}}))).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { ref at, .. } if at == "/properties/x/items"));

        assert!(normalize(&SchemaNode::from(json!({"additionalProperties": 3}))).is_err());
        assert!(normalize(&SchemaNode::from(json!({"oneOf": {"type": "x"}}))).is_err());
        assert!(normalize(&SchemaNode::from(json!({"patternProperties": {"^a": false}}))).is_err());
        assert!(normalize(&SchemaNode::from(json!("string"))).is_err());
    }

    #[test]
    fn idempotent_on_nested_unions() {
        let raw = SchemaNode::from(json!({
            "title": "root",
            "properties": {
                "deps": {
                    "anyOf": [
                        {"type": "object", "additionalProperties": {"oneOf": [{"type": "string"}, {"type": "null"}]}},
                        {"type": "null"}
                    ],
                    "default": null
                },
                "mixed": {"anyOf": [{"type": "string"}, {"type": "integer"}, {"type": "null"}]},
                "never": {"oneOf": [{"type": "null"}]}
            },
            "$defs": {"T": {"allOf": [{"$ref": "#/$defs/U"}]}, "U": {"type": "string"}}
        }));
        let once = normalize(&raw).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(
            to_canonical_json(&once).unwrap(),
            to_canonical_json(&twice).unwrap()
        );
    }

    #[test]
    fn canonical_text_is_two_space_indented() {
        let out = to_canonical_json(&normalize(&SchemaNode::from(json!({"type": "string", "title": "t"}))).unwrap()).unwrap();
        assert_eq!(out, "{\n  \"title\": \"t\",\n  \"type\": \"string\"\n}\n");
    }

    #[test]
    fn input_is_left_untouched() {
        let raw = SchemaNode::from(json!({"anyOf": [{"type": "string"}, {"type": "null"}]}));
        let before = serde_json::to_string(&raw).unwrap();
        let _ = normalize(&raw).unwrap();
        assert_eq!(serde_json::to_string(&raw).unwrap(), before);
    }
}
