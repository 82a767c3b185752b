//! # Codec
//!
//! Bidirectional conversion between the YAML document format and the
//! [`Document`] store.
//!
//! Decode conventions:
//!
//! - a mapping value of the shape `{ "$ref": name }` becomes a `Ref` node
//! - every other mapping becomes an `Object`, every sequence an `Array`,
//!   and each is registered under its bare name and its full path
//! - a bare scalar under a mapping key is wrapped as a one-child `Array`
//!   so "append a sibling value under this key" edits stay structurally
//!   uniform
//!
//! Encode substitutes the empty string for `null` leaves so a cleared
//! field survives the round trip. Round-trip law:
//! `decode(encode(decode(text)))` is structurally equivalent to
//! `decode(text)`.

use crate::document::Document;
use crate::node::{Node, NodeKind, Scalar};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

pub const REF_KEY: &str = "$ref";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("top-level document must be a mapping")]
    NotAMapping,
}

/// Parse YAML text into a document. Absent or blank input decodes to an
/// empty document rather than failing.
pub fn decode(text: &str) -> Result<Document, CodecError> {
    if text.trim().is_empty() {
        return Ok(Document::new());
    }

    let value: Value = serde_yaml::from_str(text)?;
    let map = match value {
        Value::Mapping(map) => map,
        Value::Null => return Ok(Document::new()),
        _ => return Err(CodecError::NotAMapping),
    };

    let mut doc = Document::new();
    let root = doc.root().to_string();
    for (key, entry) in map {
        let name = key_text(&key);
        build_mapping_entry(&mut doc, &root, &name, entry);
    }
    Ok(doc)
}

/// Serialize a document back to YAML text.
pub fn encode(doc: &Document) -> Result<String, CodecError> {
    let value = materialize(doc, doc.root());
    Ok(serde_yaml::to_string(&value)?)
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => to_scalar(other.clone()).as_text(),
    }
}

fn ref_target(map: &Mapping) -> Option<String> {
    if map.len() != 1 {
        return None;
    }
    match map.iter().next() {
        Some((Value::String(key), Value::String(target))) if key == REF_KEY => {
            Some(target.clone())
        }
        _ => None,
    }
}

fn build_mapping_entry(doc: &mut Document, parent: &str, name: &str, value: Value) {
    match value {
        Value::Mapping(map) => {
            if let Some(target) = ref_target(&map) {
                let id = doc.next_id();
                doc.add_child(parent, Node::reference(id, name, target));
                return;
            }
            let id = doc.next_id();
            if doc.add_child(parent, Node::object(id.clone(), name)).is_some() {
                doc.register_container(&id);
                for (key, entry) in map {
                    let child_name = key_text(&key);
                    build_mapping_entry(doc, &id, &child_name, entry);
                }
            }
        }
        Value::Sequence(items) => {
            let id = doc.next_id();
            if doc.add_child(parent, Node::array(id.clone(), name)).is_some() {
                doc.register_container(&id);
                for (index, item) in items.into_iter().enumerate() {
                    build_sequence_item(doc, &id, index, item);
                }
            }
        }
        Value::Tagged(tagged) => build_mapping_entry(doc, parent, name, tagged.value),
        scalar => {
            // key: value shorthand decodes as a one-item array so the
            // distinction never leaks into editing code
            let id = doc.next_id();
            if doc.add_child(parent, Node::array(id.clone(), name)).is_some() {
                doc.register_container(&id);
                let leaf_id = doc.next_id();
                doc.add_child(&id, Node::leaf(leaf_id, "0", to_scalar(scalar)));
            }
        }
    }
}

fn build_sequence_item(doc: &mut Document, parent: &str, index: usize, value: Value) {
    let name = index.to_string();
    match value {
        Value::Mapping(map) => {
            if let Some(target) = ref_target(&map) {
                let id = doc.next_id();
                doc.add_child(parent, Node::reference(id, name, target));
                return;
            }
            let id = doc.next_id();
            if doc.add_child(parent, Node::object(id.clone(), &name)).is_some() {
                doc.register_container(&id);
                for (key, entry) in map {
                    let child_name = key_text(&key);
                    build_mapping_entry(doc, &id, &child_name, entry);
                }
            }
        }
        Value::Sequence(items) => {
            let id = doc.next_id();
            if doc.add_child(parent, Node::array(id.clone(), &name)).is_some() {
                doc.register_container(&id);
                for (child_index, item) in items.into_iter().enumerate() {
                    build_sequence_item(doc, &id, child_index, item);
                }
            }
        }
        Value::Tagged(tagged) => build_sequence_item(doc, parent, index, tagged.value),
        scalar => {
            let id = doc.next_id();
            doc.add_child(parent, Node::leaf(id, name, to_scalar(scalar)));
        }
    }
}

fn to_scalar(value: Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(b),
        Value::Number(n) => Scalar::Number(n.as_f64().unwrap_or_default()),
        Value::String(s) => Scalar::String(s),
        // containers are handled before this point
        _ => Scalar::Null,
    }
}

fn materialize(doc: &Document, id: &str) -> Value {
    let Some(node) = doc.get(id) else {
        return Value::Null;
    };
    match &node.kind {
        NodeKind::Leaf { value } => scalar_value(value),
        NodeKind::Ref { target } => {
            let mut map = Mapping::new();
            map.insert(
                Value::String(REF_KEY.to_string()),
                Value::String(target.clone()),
            );
            Value::Mapping(map)
        }
        NodeKind::Object { children } => {
            let mut map = Mapping::new();
            for child in children {
                if let Some(child_node) = doc.get(child) {
                    map.insert(
                        Value::String(child_node.name.clone()),
                        materialize(doc, child),
                    );
                }
            }
            Value::Mapping(map)
        }
        NodeKind::Array { children } => {
            Value::Sequence(children.iter().map(|child| materialize(doc, child)).collect())
        }
    }
}

fn scalar_value(scalar: &Scalar) -> Value {
    match scalar {
        // an empty field never serializes as null
        Scalar::Null => Value::String(String::new()),
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Number(n) => Value::Number(serde_yaml::Number::from(*n)),
        Scalar::String(s) => Value::String(s.clone()),
    }
}
