use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node identity. Generated by [`crate::IdGenerator`], never reused
/// within a session.
pub type NodeId = String;

/// Reserved leaf value. When an array's first child holds this value the
/// array is resolved in consistent-random mode: one draw is made per pass
/// and reused for every later read of the same name.
pub const CONSISTENT_MARKER: &str = "$consistent";

/// Scalar payload of a leaf node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Text form used by expansion and display. `Null` renders as the
    /// empty string so a cleared field never resolves to the word "null".
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(value) => value.to_string(),
            Scalar::Number(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            Scalar::String(value) => value.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

/// Closed set of node shapes. Every traversal site matches exhaustively;
/// there is no duck-typing on decoded value shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeKind {
    /// Container keyed by child name. Insertion order is preserved and
    /// meaningful for serialization.
    Object { children: Vec<NodeId> },

    /// Container keyed by position. The wildcard shape: children are
    /// mutually exclusive alternatives.
    Array { children: Vec<NodeId> },

    /// Scalar value.
    Leaf { value: Scalar },

    /// Symbolic pointer at a same-named Object/Array defined elsewhere.
    /// Has no children of its own.
    Ref { target: String },
}

/// One element of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Key under which the parent holds this node, or the positional index
    /// when the parent is an array.
    pub name: String,
    pub kind: NodeKind,
    /// UI collapse flag for containers.
    pub collapsed: bool,
}

impl Node {
    pub fn object(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Object { children: Vec::new() },
            collapsed: false,
        }
    }

    pub fn array(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Array { children: Vec::new() },
            collapsed: false,
        }
    }

    pub fn leaf(id: NodeId, name: impl Into<String>, value: Scalar) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Leaf { value },
            collapsed: false,
        }
    }

    pub fn reference(id: NodeId, name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: NodeKind::Ref { target: target.into() },
            collapsed: false,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Object { .. } | NodeKind::Array { .. })
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, NodeKind::Object { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, NodeKind::Array { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn is_ref(&self) -> bool {
        matches!(self.kind, NodeKind::Ref { .. })
    }

    /// Child list for containers, `None` for leaves and refs.
    pub fn children(&self) -> Option<&Vec<NodeId>> {
        match &self.kind {
            NodeKind::Object { children } | NodeKind::Array { children } => Some(children),
            NodeKind::Leaf { .. } | NodeKind::Ref { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Object { children } | NodeKind::Array { children } => Some(children),
            NodeKind::Leaf { .. } | NodeKind::Ref { .. } => None,
        }
    }

    /// Leaf value, `None` for other kinds.
    pub fn leaf_value(&self) -> Option<&Scalar> {
        match &self.kind {
            NodeKind::Leaf { value } => Some(value),
            _ => None,
        }
    }

    /// True for a leaf holding the consistent-random sentinel.
    pub fn is_consistent_marker(&self) -> bool {
        matches!(&self.kind, NodeKind::Leaf { value: Scalar::String(s) } if s == CONSISTENT_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_text_forms() {
        assert_eq!(Scalar::Null.as_text(), "");
        assert_eq!(Scalar::Bool(true).as_text(), "true");
        assert_eq!(Scalar::Number(3.0).as_text(), "3");
        assert_eq!(Scalar::Number(1.5).as_text(), "1.5");
        assert_eq!(Scalar::from("red dress").as_text(), "red dress");
    }

    #[test]
    fn test_node_kind_predicates() {
        let object = Node::object("a-1".to_string(), "outfit");
        assert!(object.is_container());
        assert!(object.children().is_some());

        let leaf = Node::leaf("a-2".to_string(), "0", Scalar::from("blue"));
        assert!(!leaf.is_container());
        assert!(leaf.children().is_none());
        assert_eq!(leaf.leaf_value(), Some(&Scalar::from("blue")));

        let reference = Node::reference("a-3".to_string(), "outfit", "outfit");
        assert!(reference.is_ref());
        assert!(!reference.is_container());
    }

    #[test]
    fn test_node_serialization() {
        let node = Node::array("a-1".to_string(), "outfit");
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);

        let leaf = Node::leaf("a-2".to_string(), "0", Scalar::from("red dress"));
        let json = serde_json::to_string(&leaf).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(leaf, back);
    }

    #[test]
    fn test_consistent_marker_detection() {
        let marker = Node::leaf("a-1".to_string(), "0", Scalar::from(CONSISTENT_MARKER));
        assert!(marker.is_consistent_marker());

        let plain = Node::leaf("a-2".to_string(), "0", Scalar::from("casual"));
        assert!(!plain.is_consistent_marker());
    }
}
