//! # Document store
//!
//! Flat node store plus the indices that make names resolvable:
//!
//! - `names`: display name → defining node (last write wins)
//! - `paths`: slash-joined structural path → node
//! - `refs`: referenced name → every `Ref` node pointing at it
//!
//! All mutation primitives are synchronous, in-place, and assume
//! single-writer access. Precondition failures are silent no-ops so an
//! interactive caller can keep editing; see the editor crate for the
//! typed failures on top of these primitives.

use crate::id_generator::IdGenerator;
use crate::node::{Node, NodeId, NodeKind, Scalar};
use std::collections::HashMap;

/// The full tree plus its name/path/reverse-reference indices.
#[derive(Debug, Clone)]
pub struct Document {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
    parents: HashMap<NodeId, NodeId>,
    names: HashMap<String, NodeId>,
    paths: HashMap<String, NodeId>,
    refs: HashMap<String, Vec<NodeId>>,
    ids: IdGenerator,
}

impl Document {
    /// Empty document: a lone root object.
    pub fn new() -> Self {
        Self::with_ids(IdGenerator::default())
    }

    /// Empty document seeded from a source path, so node ids differ
    /// across documents loaded from different files.
    pub fn with_seed(path: &str) -> Self {
        Self::with_ids(IdGenerator::new(path))
    }

    fn with_ids(mut ids: IdGenerator) -> Self {
        let root_id = ids.new_id();
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), Node::object(root_id.clone(), "root"));

        Self {
            root: root_id,
            nodes,
            parents: HashMap::new(),
            names: HashMap::new(),
            paths: HashMap::new(),
            refs: HashMap::new(),
            ids,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn next_id(&mut self) -> NodeId {
        self.ids.new_id()
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(|p| p.as_str())
    }

    /// Child ids of a container, empty for leaves/refs/missing nodes.
    pub fn children_of(&self, id: &str) -> Vec<NodeId> {
        self.get(id)
            .and_then(|node| node.children())
            .cloned()
            .unwrap_or_default()
    }

    pub fn index_in_parent(&self, id: &str) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.get(parent)?
            .children()?
            .iter()
            .position(|child| child == id)
    }

    /// True if `ancestor` lies on the parent chain of `id` (not reflexive).
    pub fn is_ancestor_of(&self, ancestor: &str, id: &str) -> bool {
        let mut current = self.parent_of(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent_of(p);
        }
        false
    }

    /// Parent chain from the closest parent up to and including the root.
    pub fn ancestors(&self, id: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(p) = current {
            out.push(p.to_string());
            current = self.parent_of(p);
        }
        out
    }

    /// Append a node to a container. Registers the parent link and, for
    /// `Ref` nodes, the reverse reference index. No-op (`None`) if the
    /// parent is missing or cannot have children.
    pub fn add_child(&mut self, parent: &str, node: Node) -> Option<NodeId> {
        let len = self.get(parent)?.children()?.len();
        self.insert_child_at(parent, len, node)
    }

    /// Positional insert used by reorder/splice paths. Index is clamped.
    pub fn insert_child_at(&mut self, parent: &str, index: usize, node: Node) -> Option<NodeId> {
        if !self.get(parent).is_some_and(|n| n.is_container()) {
            return None;
        }

        let id = node.id.clone();
        if let NodeKind::Ref { target } = &node.kind {
            self.refs.entry(target.clone()).or_default().push(id.clone());
        }
        self.nodes.insert(id.clone(), node);
        self.parents.insert(id.clone(), parent.to_string());

        let children = self.nodes.get_mut(parent)?.children_mut()?;
        let at = index.min(children.len());
        children.insert(at, id.clone());
        Some(id)
    }

    /// Unlink a subtree from its parent without destroying it. The caller
    /// is expected to splice it back in somewhere (drag-and-drop moves).
    pub fn detach(&mut self, id: &str) -> bool {
        if id == self.root {
            return false;
        }
        let Some(parent) = self.parents.get(id).cloned() else {
            return false;
        };
        if let Some(children) = self.nodes.get_mut(&parent).and_then(|n| n.children_mut()) {
            children.retain(|child| child != id);
        }
        self.parents.remove(id);
        true
    }

    /// Re-link a detached (or freshly created) subtree under `parent` at
    /// `index`. Index is clamped.
    pub fn splice(&mut self, parent: &str, index: usize, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        let Some(children) = self.nodes.get_mut(parent).and_then(|n| n.children_mut()) else {
            return false;
        };
        let at = index.min(children.len());
        children.insert(at, id.to_string());
        self.parents.insert(id.to_string(), parent.to_string());
        true
    }

    /// Delete a subtree: detach from the parent, then drop every
    /// descendant from the store and from all three indices. The root
    /// is never deleted.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if id == self.root || !self.nodes.contains_key(id) {
            return false;
        }
        if let Some(parent) = self.parents.get(id).cloned() {
            if let Some(children) = self.nodes.get_mut(&parent).and_then(|n| n.children_mut()) {
                children.retain(|child| child != id);
            }
        }
        self.remove_subtree(id);
        true
    }

    fn remove_subtree(&mut self, id: &str) {
        for child in self.children_of(id) {
            self.remove_subtree(&child);
        }

        if let Some(node) = self.nodes.remove(id) {
            self.parents.remove(id);
            if self.names.get(&node.name).is_some_and(|d| d == id) {
                self.names.remove(&node.name);
            }
            self.paths.retain(|_, v| v != id);
            if let NodeKind::Ref { target } = &node.kind {
                if let Some(list) = self.refs.get_mut(target) {
                    list.retain(|r| r != id);
                    if list.is_empty() {
                        self.refs.remove(target);
                    }
                }
            }
        }
    }

    pub fn set_leaf_value(&mut self, id: &str, value: Scalar) {
        if let Some(node) = self.nodes.get_mut(id) {
            if let NodeKind::Leaf { value: slot } = &mut node.kind {
                *slot = value;
            }
        }
    }

    pub fn toggle_collapsed(&mut self, id: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.is_container() {
                node.collapsed = !node.collapsed;
            }
        }
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.is_container() {
                node.collapsed = collapsed;
            }
        }
    }

    /// Rename a node, repointing the definition index old → new for
    /// non-Ref containers (refs never define names). Path index entries
    /// under the old name are refreshed for the whole subtree.
    pub fn rename_node(&mut self, id: &str, new_name: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let old_name = std::mem::replace(&mut node.name, new_name.to_string());
        let is_defining_kind = node.is_container();

        if is_defining_kind {
            if self.names.get(&old_name).is_some_and(|d| d == id) {
                self.names.remove(&old_name);
            }
            self.names.insert(new_name.to_string(), id.to_string());
        }
        self.refresh_paths(id);
    }

    /// Repoint a `Ref` node at a different name, keeping the reverse
    /// index exact.
    pub fn retarget_ref(&mut self, id: &str, new_target: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let NodeKind::Ref { target } = &mut node.kind else {
            return;
        };
        let old_target = std::mem::replace(target, new_target.to_string());

        if let Some(list) = self.refs.get_mut(&old_target) {
            list.retain(|r| r != id);
            if list.is_empty() {
                self.refs.remove(&old_target);
            }
        }
        self.refs
            .entry(new_target.to_string())
            .or_default()
            .push(id.to_string());
    }

    /// Promote a leaf into a single-child array holding the original
    /// value, reusing the leaf's identity for the array. Returns the new
    /// child's id so callers can keep editing in place.
    pub fn convert_leaf_to_array(&mut self, id: &str) -> Option<NodeId> {
        let value = self.get(id)?.leaf_value()?.clone();

        let child_id = self.next_id();
        let child = Node::leaf(child_id.clone(), "0", value);
        self.replace_kind(id, NodeKind::Array { children: vec![child_id.clone()] });
        self.nodes.insert(child_id.clone(), child);
        self.parents.insert(child_id.clone(), id.to_string());
        self.register_container(id);
        Some(child_id)
    }

    /// Reconstruct a node under the same key with a different shape.
    /// Structural rewrites that reuse an identity go through here rather
    /// than mutating a differently-shaped record field by field.
    pub fn replace_kind(&mut self, id: &str, kind: NodeKind) {
        if let Some(old) = self.nodes.remove(id) {
            self.nodes.insert(
                id.to_string(),
                Node {
                    id: old.id,
                    name: old.name,
                    kind,
                    collapsed: old.collapsed,
                },
            );
        }
    }

    /// Register a container under its bare name and full path, last
    /// write wins. The codec calls this for every decoded container;
    /// editing operations call it for containers they synthesize.
    pub fn register_container(&mut self, id: &str) {
        let Some(node) = self.get(id) else {
            return;
        };
        if !node.is_container() {
            return;
        }
        let name = node.name.clone();
        self.names.insert(name, id.to_string());

        let path = self.path_of(id);
        if !path.is_empty() {
            self.paths.insert(path, id.to_string());
        }
    }

    /// Defining node for a name, definition index only.
    pub fn definition_of(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(|id| id.as_str())
    }

    /// Resolve a name: definition index, then path index, then the first
    /// node in document order with a matching display name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        if let Some(id) = self.names.get(name) {
            return Some(id.clone());
        }
        if let Some(id) = self.paths.get(name) {
            return Some(id.clone());
        }
        self.walk()
            .into_iter()
            .skip(1)
            .find(|id| self.get(id).is_some_and(|n| n.name == name))
    }

    /// Slash-joined structural path, root segment stripped. Empty for
    /// the root itself.
    pub fn path_of(&self, id: &str) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id.to_string());
        while let Some(node_id) = current {
            if node_id == self.root {
                break;
            }
            match self.get(&node_id) {
                Some(node) => segments.push(node.name.clone()),
                None => return String::new(),
            }
            current = self.parent_of(&node_id).map(|p| p.to_string());
        }
        segments.reverse();
        segments.join("/")
    }

    /// Every `Ref` node currently pointing at `name`.
    pub fn refs_to(&self, name: &str) -> &[NodeId] {
        self.refs.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Pre-order traversal from the root (root included, children in
    /// list order). This is the document order used for name fallback
    /// lookups and navigation.
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(&id) {
                out.push(id.clone());
                if let Some(children) = node.children() {
                    for child in children.iter().rev() {
                        stack.push(child.clone());
                    }
                }
            }
        }
        out
    }

    /// Drop stale path-index keys for a subtree and re-register its
    /// containers under their current paths. Structural rewrites call
    /// this after re-parenting.
    pub fn refresh_subtree_paths(&mut self, id: &str) {
        self.refresh_paths(id);
    }

    /// Structural self-check. Returns one message per violated invariant:
    /// dangling children, parent links that disagree with child lists,
    /// stale definition/path/reverse-reference entries, unreachable nodes.
    /// Empty means the document is sound.
    pub fn integrity_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for (id, node) in &self.nodes {
            if let Some(children) = node.children() {
                for child in children {
                    if !self.nodes.contains_key(child) {
                        violations.push(format!("dangling child {child} under {id}"));
                    } else if self.parents.get(child) != Some(id) {
                        violations.push(format!("parent link of {child} does not point at {id}"));
                    }
                }
            }
        }

        for (child, parent) in &self.parents {
            let listed = self
                .nodes
                .get(parent)
                .and_then(|n| n.children())
                .map(|c| c.iter().filter(|x| *x == child).count())
                .unwrap_or(0);
            if listed != 1 {
                violations.push(format!(
                    "{child} appears {listed} times in child list of {parent}"
                ));
            }
        }

        let reachable: std::collections::HashSet<NodeId> = self.walk().into_iter().collect();
        for id in self.nodes.keys() {
            if !reachable.contains(id) {
                violations.push(format!("unreachable node {id}"));
            }
        }

        for (name, id) in &self.names {
            match self.nodes.get(id) {
                None => violations.push(format!("definition of {name} points at missing node")),
                Some(node) => {
                    if node.is_ref() || &node.name != name {
                        violations.push(format!("stale definition entry for {name}"));
                    }
                }
            }
        }

        for (path, id) in &self.paths {
            if !self.nodes.contains_key(id) {
                violations.push(format!("path {path} points at missing node"));
            } else if &self.path_of(id) != path {
                violations.push(format!("stale path entry {path}"));
            }
        }

        for (target, ref_ids) in &self.refs {
            for ref_id in ref_ids {
                match self.nodes.get(ref_id) {
                    Some(Node { kind: NodeKind::Ref { target: t }, .. }) if t == target => {}
                    _ => violations.push(format!("stale reverse reference to {target}")),
                }
            }
        }

        violations
    }

    fn refresh_paths(&mut self, id: &str) {
        let mut subtree = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < subtree.len() {
            let current = subtree[cursor].clone();
            subtree.extend(self.children_of(&current));
            cursor += 1;
        }

        self.paths.retain(|_, v| !subtree.contains(v));
        for node_id in subtree {
            if self.get(&node_id).is_some_and(|n| n.is_container()) {
                let path = self.path_of(&node_id);
                if !path.is_empty() {
                    self.paths.insert(path, node_id);
                }
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
