//! Canonical schema and reference docs for the configuration manifest.
//!
//! One raw JSON-Schema (draft-07 shaped) graph comes in from the model
//! compiler and goes to exactly one of two outputs:
//! - [`normalize`]: a deterministic, TOML-embeddable canonical schema;
//! - [`render`]: hierarchical Markdown reference documentation.
pub mod error;
pub mod graph;
pub mod identity;
pub mod input;
pub mod normalize;
pub mod reachability;
pub mod render;

pub use error::{Result, SchemaError};
pub use graph::{Scalar, SchemaGraph, SchemaNode, SchemaObject};
