//! Reading the producer's output.
//!
//! The schema usually arrives as a bare document, but it can also be picked
//! out of a larger one with a JSON Pointer and/or a jq filter.
pub mod jq;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::graph::{SchemaGraph, SchemaNode};

#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// jq filter applied first; must yield exactly one value.
    pub jq_expr: Option<String>,
    /// JSON Pointer applied to the (filtered) document, e.g. `/components/manifest`.
    pub json_pointer: Option<String>,
}

/// Parse JSON text, reporting the JSON path of the failure.
pub fn parse_document(src: &str) -> Result<Value> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, Value>(de).map_err(|err| SchemaError::Parse {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn select_schema(document: Value, selection: &Selection) -> Result<SchemaNode> {
    let document = match selection.jq_expr.as_deref() {
        None => document,
        Some(filter) => {
            let mut outputs = jq::run_jaq(filter, &document)?;
            if outputs.len() != 1 {
                return Err(SchemaError::Select(format!(
                    "jq filter `{filter}` produced {} values, expected exactly one",
                    outputs.len()
                )));
            }
            outputs.remove(0)
        }
    };
    let document = match selection.json_pointer.as_deref() {
        None => document,
        Some(pointer) => document
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| SchemaError::Select(format!("JSON pointer `{pointer}` matched nothing")))?,
    };
    Ok(SchemaNode::from(document))
}

/// Text → selected → graph. The root must be an object.
pub fn load_schema(src: &str, selection: &Selection) -> Result<SchemaGraph> {
    let document = parse_document(src)?;
    let node = select_schema(document, selection)?;
    let graph = SchemaGraph::new(node)?;
    debug!(
        root_keys = graph.root().len(),
        definitions = graph.definitions().count(),
        "loaded schema graph"
    );
    Ok(graph)
}
