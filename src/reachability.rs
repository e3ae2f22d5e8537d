//! Which `$defs` entries are actually used, and which ones hang directly off
//! the manifest root.
//!
//! Walks follow literal nesting only and never jump through a `$ref`, so they
//! terminate on self-referential definitions.

use std::collections::BTreeSet;

use crate::error::{Result, SchemaError};
use crate::graph::{pointer_child, ref_target, SchemaGraph, SchemaNode, SchemaObject};

/// Every definition name referenced anywhere, `$defs` bodies included.
pub fn collect_used_defs(graph: &SchemaGraph) -> BTreeSet<String> {
    fn visit(node: &SchemaNode, used: &mut BTreeSet<String>) {
        match node {
            SchemaNode::Object(obj) => {
                if let Some(name) = obj.reference().and_then(|r| ref_target(r).ok()) {
                    used.insert(name.to_string());
                }
                for (_, value) in obj.iter() {
                    visit(value, used);
                }
            }
            SchemaNode::Array(xs) => xs.iter().for_each(|x| visit(x, used)),
            SchemaNode::Scalar(_) => {}
        }
    }

    let mut used = BTreeSet::new();
    for (_, value) in graph.root().iter() {
        visit(value, &mut used);
    }
    if let Some(name) = graph.root().reference().and_then(|r| ref_target(r).ok()) {
        used.insert(name.to_string());
    }
    used
}

/// `(root property, definition)` pairs for every root property that is a
/// direct `$ref` or lists one among its `anyOf` options, in property order.
pub fn top_level_refs(graph: &SchemaGraph) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let Some(props) = graph.root().properties() else {
        return out;
    };
    for (property, section) in props.iter() {
        let Some(section) = section.as_object() else { continue };
        let direct = section.reference().into_iter();
        let options = section.variants("anyOf").filter_map(SchemaObject::reference);
        for pointer in direct.chain(options) {
            if let Ok(name) = ref_target(pointer) {
                out.push((property.to_string(), name.to_string()));
            }
        }
    }
    out
}

/// Definitions that get a primary section rather than an appendix one.
pub fn top_level_defs(graph: &SchemaGraph) -> BTreeSet<String> {
    top_level_refs(graph).into_iter().map(|(_, name)| name).collect()
}

/// Fails on the first `$ref` that is not a `#/$defs/<Name>` string naming an
/// existing definition.
pub fn check_references(graph: &SchemaGraph) -> Result<()> {
    fn check_object(graph: &SchemaGraph, obj: &SchemaObject, at: &str) -> Result<()> {
        if let Some(pointer) = obj.get("$ref") {
            let pointer = pointer
                .as_str()
                .ok_or_else(|| SchemaError::malformed(pointer_child(at, "$ref"), "a string"))?;
            let name = ref_target(pointer)?;
            if graph.definition(name).is_none() {
                return Err(SchemaError::UnresolvedReference {
                    reference: pointer.to_string(),
                    name: name.to_string(),
                });
            }
        }
        for (key, value) in obj.iter() {
            check_node(graph, value, &pointer_child(at, key))?;
        }
        Ok(())
    }

    fn check_node(graph: &SchemaGraph, node: &SchemaNode, at: &str) -> Result<()> {
        match node {
            SchemaNode::Object(obj) => check_object(graph, obj, at),
            SchemaNode::Array(xs) => xs
                .iter()
                .enumerate()
                .try_for_each(|(i, x)| check_node(graph, x, &pointer_child(at, &i.to_string()))),
            SchemaNode::Scalar(_) => Ok(()),
        }
    }

    check_object(graph, graph.root(), "")
}
