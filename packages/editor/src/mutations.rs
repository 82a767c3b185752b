//! # Structural mutations
//!
//! High-level semantic operations on wildcards documents.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: Each operation represents one user gesture
//! 2. **Validated**: Preconditions reject with a tagged [`EditError`]
//! 3. **Identity-stable**: Rewrites that restructure a container keep its
//!    id and name, so external references stay valid
//!
//! ## Operation Semantics
//!
//! ### Insert-by-selection
//! - No selection: new wildcard array at the root with one empty value
//! - One leaf: promote it to an array and add a sibling value
//! - One object: insert a child array with one default value
//! - One array: append one empty value
//! - Multi-selection rejects
//!
//! ### Drop
//! - Resolution order: collapsed-container sibling insert → array
//!   split/wrap rewrite → container nesting → plain reorder/move
//! - Dropping a node onto itself or into its own subtree rejects
//!
//! ### Delete
//! - Removes nodes and all descendants
//! - Returns the replacement selection: next surviving sibling, previous
//!   surviving sibling, surviving non-root parent, nearest surviving
//!   non-root ancestor

use crate::errors::EditError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use wildcards_document::{Document, Node, NodeId, NodeKind, Scalar};

/// What the UI needs to focus a freshly inserted node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOutcome {
    pub node_id: NodeId,
    /// Enter rename/edit mode with the text selected.
    pub begin_rename: bool,
}

/// Where a dragged node lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPosition {
    Before,
    After,
}

/// Context-sensitive insert. Adapts to whatever is selected and expands
/// collapsed ancestors so the new node is visible.
pub fn insert_for_selection(
    doc: &mut Document,
    selection: &[NodeId],
) -> Result<InsertOutcome, EditError> {
    if selection.len() > 1 {
        return Err(EditError::MultiSelection);
    }

    let outcome = match selection.first() {
        None => {
            let root = doc.root().to_string();
            let name = fresh_child_name(doc, &root, "untitled");
            let array_id = doc.next_id();
            doc.add_child(&root, Node::array(array_id.clone(), name));
            doc.register_container(&array_id);
            let leaf_id = doc.next_id();
            doc.add_child(&array_id, Node::leaf(leaf_id, "0", Scalar::Null));
            InsertOutcome {
                node_id: array_id,
                begin_rename: true,
            }
        }
        Some(selected) => {
            let node = doc
                .get(selected)
                .ok_or_else(|| EditError::NodeNotFound(selected.clone()))?;
            match &node.kind {
                NodeKind::Leaf { .. } => {
                    doc.convert_leaf_to_array(selected)
                        .ok_or_else(|| EditError::NodeNotFound(selected.clone()))?;
                    let leaf_id = doc.next_id();
                    doc.add_child(selected, Node::leaf(leaf_id.clone(), "1", Scalar::Null));
                    InsertOutcome {
                        node_id: leaf_id,
                        begin_rename: true,
                    }
                }
                NodeKind::Object { .. } => {
                    let name = fresh_child_name(doc, selected, "untitled");
                    let array_id = doc.next_id();
                    doc.add_child(selected, Node::array(array_id.clone(), name));
                    doc.register_container(&array_id);
                    let leaf_id = doc.next_id();
                    doc.add_child(&array_id, Node::leaf(leaf_id, "0", Scalar::Null));
                    InsertOutcome {
                        node_id: array_id,
                        begin_rename: true,
                    }
                }
                NodeKind::Array { children } => {
                    let index = children.len();
                    let leaf_id = doc.next_id();
                    doc.add_child(
                        selected,
                        Node::leaf(leaf_id.clone(), index.to_string(), Scalar::Null),
                    );
                    InsertOutcome {
                        node_id: leaf_id,
                        begin_rename: true,
                    }
                }
                NodeKind::Ref { .. } => return Err(EditError::UnsupportedSelection),
            }
        }
    };

    for ancestor in doc.ancestors(&outcome.node_id) {
        doc.set_collapsed(&ancestor, false);
    }
    Ok(outcome)
}

/// Drag-and-drop re-parenting. Resolves, in priority order: collapsed
/// sibling insert, array split/wrap around a dropped container, container
/// nesting, plain reorder/splice.
pub fn drop_node(
    doc: &mut Document,
    source: &str,
    target: &str,
    position: DropPosition,
) -> Result<(), EditError> {
    if source == target {
        return Err(EditError::DropOnSelf);
    }
    if doc.get(source).is_none() {
        return Err(EditError::NodeNotFound(source.to_string()));
    }
    if doc.get(target).is_none() {
        return Err(EditError::NodeNotFound(target.to_string()));
    }
    if doc.is_ancestor_of(source, target) {
        return Err(EditError::DropIntoDescendant);
    }
    if target == doc.root() || source == doc.root() {
        return Err(EditError::RootImmutable);
    }

    // 1. Drops around a collapsed container never dive inside it: insert
    // as a plain sibling of the collapsed node instead.
    if let Some(anchor) = collapsed_anchor(doc, target) {
        return insert_as_sibling(doc, source, &anchor, position);
    }

    let source_is_container = doc.get(source).is_some_and(|n| n.is_container());
    let target_parent = doc.parent_of(target).map(str::to_string);

    // 2. A container dropped between the children of an array restructures
    // that array in place (same id, same name).
    if source_is_container {
        if let Some(parent_id) = &target_parent {
            if doc.get(parent_id).is_some_and(|n| n.is_array()) && !doc.is_ancestor_of(source, parent_id)
            {
                let anchor_index = doc.index_in_parent(target).unwrap_or(0);
                let at = anchor_index + matches!(position, DropPosition::After) as usize;
                return split_array_around(doc, source, parent_id, at);
            }
        }
    }

    // 3. Container dropped onto a container nests into it.
    if source_is_container {
        let target_node = doc
            .get(target)
            .ok_or_else(|| EditError::NodeNotFound(target.to_string()))?;
        match &target_node.kind {
            NodeKind::Object { .. } => return nest_into_object(doc, source, target),
            NodeKind::Array { .. } => {
                doc.detach(source);
                wrap_array_with(doc, target, source, false);
                return Ok(());
            }
            NodeKind::Leaf { .. } | NodeKind::Ref { .. } => {}
        }
    }

    // 4. Ordinary same-parent reorder or cross-parent move.
    insert_as_sibling(doc, source, target, position)
}

/// Replace the shared array parent of the selected leaves with an object
/// holding one single-item array per unselected child plus one array of
/// the selected children, original order preserved throughout. The parent
/// keeps its id and name. Returns the group array's id.
pub fn group_selected(doc: &mut Document, selection: &[NodeId]) -> Result<NodeId, EditError> {
    if selection.is_empty() {
        return Err(EditError::EmptySelection);
    }
    for id in selection {
        let node = doc
            .get(id)
            .ok_or_else(|| EditError::NodeNotFound(id.clone()))?;
        if !node.is_leaf() {
            return Err(EditError::MixedSelection);
        }
    }

    let parent = doc
        .parent_of(&selection[0])
        .ok_or(EditError::RootImmutable)?
        .to_string();
    for id in &selection[1..] {
        if doc.parent_of(id) != Some(parent.as_str()) {
            return Err(EditError::CrossParentSelection);
        }
    }
    if !doc.get(&parent).is_some_and(|n| n.is_array()) {
        return Err(EditError::NotAnArray(parent));
    }

    let original = doc.children_of(&parent);
    let selected: HashSet<&str> = selection.iter().map(|s| s.as_str()).collect();

    doc.replace_kind(&parent, NodeKind::Object { children: Vec::new() });

    let mut temp_count = 0;
    for child in original.iter().filter(|c| !selected.contains(c.as_str())) {
        temp_count += 1;
        let name = if temp_count == 1 {
            "temp".to_string()
        } else {
            format!("temp{temp_count}")
        };
        let wrap_id = doc.next_id();
        doc.add_child(&parent, Node::array(wrap_id.clone(), name));
        doc.register_container(&wrap_id);
        doc.splice(&wrap_id, 0, child);
        renumber_array_children(doc, &wrap_id);
    }

    let group_id = doc.next_id();
    doc.add_child(&parent, Node::array(group_id.clone(), "group"));
    doc.register_container(&group_id);
    for (index, child) in original
        .iter()
        .filter(|c| selected.contains(c.as_str()))
        .enumerate()
    {
        doc.splice(&group_id, index, child);
    }
    renumber_array_children(doc, &group_id);
    doc.refresh_subtree_paths(&parent);

    Ok(group_id)
}

/// Deep-copy a subtree (fresh identities throughout) under a target
/// parent with the given name. `None` if source or parent is missing or
/// the parent cannot hold children.
pub fn clone_subtree(
    doc: &mut Document,
    source: &str,
    target_parent: &str,
    name: &str,
) -> Option<NodeId> {
    let template = doc.get(source)?.clone();
    let new_id = doc.next_id();
    let kind = match &template.kind {
        NodeKind::Object { .. } => NodeKind::Object { children: Vec::new() },
        NodeKind::Array { .. } => NodeKind::Array { children: Vec::new() },
        NodeKind::Leaf { value } => NodeKind::Leaf { value: value.clone() },
        NodeKind::Ref { target } => NodeKind::Ref { target: target.clone() },
    };
    let copy = Node {
        id: new_id.clone(),
        name: name.to_string(),
        kind,
        collapsed: template.collapsed,
    };
    doc.add_child(target_parent, copy)?;
    if template.is_container() {
        doc.register_container(&new_id);
        for child in doc.children_of(source) {
            let child_name = doc.get(&child)?.name.clone();
            clone_subtree(doc, &child, &new_id, &child_name);
        }
    }
    Some(new_id)
}

/// Clone a node and place the copy immediately after the source among its
/// siblings.
pub fn duplicate_node(doc: &mut Document, source: &str) -> Option<NodeId> {
    let parent = doc.parent_of(source)?.to_string();
    let name = doc.get(source)?.name.clone();
    let parent_is_array = doc.get(&parent).is_some_and(|n| n.is_array());
    let copy_name = if parent_is_array {
        name
    } else {
        fresh_child_name(doc, &parent, &name)
    };

    let clone_id = clone_subtree(doc, source, &parent, &copy_name)?;
    doc.detach(&clone_id);
    let at = doc.index_in_parent(source)? + 1;
    doc.splice(&parent, at, &clone_id);
    if parent_is_array {
        renumber_array_children(doc, &parent);
    }
    doc.refresh_subtree_paths(&clone_id);
    Some(clone_id)
}

/// Delete a selection and return the replacement selection, deduplicated
/// in discovery order.
pub fn remove_selection(doc: &mut Document, selection: &[NodeId]) -> Vec<NodeId> {
    let mut doomed: HashSet<NodeId> = HashSet::new();
    for id in selection {
        collect_subtree(doc, id, &mut doomed);
    }

    let mut replacements: Vec<NodeId> = Vec::new();
    for id in selection {
        if let Some(replacement) = replacement_for(doc, id, &doomed) {
            if !replacements.contains(&replacement) {
                replacements.push(replacement);
            }
        }
    }

    let affected_parents: HashSet<NodeId> = selection
        .iter()
        .filter_map(|id| doc.parent_of(id).map(str::to_string))
        .collect();
    for id in selection {
        doc.remove_node(id);
    }
    for parent in affected_parents {
        renumber_array_children(doc, &parent);
    }
    replacements
}

/// Collapse or expand every container except the root.
pub fn set_all_collapsed(doc: &mut Document, collapsed: bool) {
    let root = doc.root().to_string();
    for id in doc.walk() {
        if id != root {
            doc.set_collapsed(&id, collapsed);
        }
    }
}

fn collect_subtree(doc: &Document, id: &str, out: &mut HashSet<NodeId>) {
    if !out.insert(id.to_string()) {
        return;
    }
    for child in doc.children_of(id) {
        collect_subtree(doc, &child, out);
    }
}

fn replacement_for(doc: &Document, id: &str, doomed: &HashSet<NodeId>) -> Option<NodeId> {
    let parent = doc.parent_of(id)?.to_string();
    let siblings = doc.children_of(&parent);
    let index = siblings.iter().position(|s| s == id)?;

    for sibling in &siblings[index + 1..] {
        if !doomed.contains(sibling) {
            return Some(sibling.clone());
        }
    }
    for sibling in siblings[..index].iter().rev() {
        if !doomed.contains(sibling) {
            return Some(sibling.clone());
        }
    }
    let root = doc.root();
    for ancestor in doc.ancestors(id) {
        if ancestor != root && !doomed.contains(&ancestor) {
            return Some(ancestor);
        }
    }
    None
}

fn collapsed_anchor(doc: &Document, target: &str) -> Option<NodeId> {
    let node = doc.get(target)?;
    if node.is_container() && node.collapsed {
        return Some(target.to_string());
    }
    let parent = doc.parent_of(target)?;
    if parent == doc.root() {
        return None;
    }
    let parent_node = doc.get(parent)?;
    if parent_node.is_container() && parent_node.collapsed {
        return Some(parent.to_string());
    }
    None
}

fn insert_as_sibling(
    doc: &mut Document,
    source: &str,
    anchor: &str,
    position: DropPosition,
) -> Result<(), EditError> {
    let parent = doc
        .parent_of(anchor)
        .ok_or(EditError::RootImmutable)?
        .to_string();
    let anchor_index = doc.index_in_parent(anchor).unwrap_or(0);
    let source_parent = doc.parent_of(source).map(str::to_string);
    let source_index = doc.index_in_parent(source);

    doc.detach(source);

    let mut at = anchor_index + matches!(position, DropPosition::After) as usize;
    if source_parent.as_deref() == Some(parent.as_str()) {
        if let Some(old_index) = source_index {
            if old_index < anchor_index {
                at -= 1;
            }
        }
    }
    doc.splice(&parent, at, source);
    renumber_array_children(doc, &parent);
    doc.refresh_subtree_paths(source);
    Ok(())
}

/// Restructure `array_id` in place because a container was dropped at
/// child index `at`. Strictly between two children: split into two new
/// arrays left/right of the insertion point and nest all three under an
/// object at the original id. At a boundary: wrap the whole array as one
/// "items" child instead.
fn split_array_around(
    doc: &mut Document,
    source: &str,
    array_id: &str,
    at: usize,
) -> Result<(), EditError> {
    doc.detach(source);
    let children = doc.children_of(array_id);
    let at = at.min(children.len());

    if at == 0 || at == children.len() {
        wrap_array_with(doc, array_id, source, at == 0);
        return Ok(());
    }

    let (left, right) = children.split_at(at);
    let left: Vec<NodeId> = left.to_vec();
    let right: Vec<NodeId> = right.to_vec();

    doc.replace_kind(array_id, NodeKind::Object { children: Vec::new() });

    let left_id = doc.next_id();
    doc.add_child(array_id, Node::array(left_id.clone(), "items"));
    doc.register_container(&left_id);
    for (index, child) in left.iter().enumerate() {
        doc.splice(&left_id, index, child);
    }
    renumber_array_children(doc, &left_id);

    let right_id = doc.next_id();
    doc.add_child(array_id, Node::array(right_id.clone(), "items2"));
    doc.register_container(&right_id);
    for (index, child) in right.iter().enumerate() {
        doc.splice(&right_id, index, child);
    }
    renumber_array_children(doc, &right_id);

    doc.splice(array_id, 1, source);
    doc.refresh_subtree_paths(array_id);
    Ok(())
}

/// Turn `array_id` into an object at the same id whose children are one
/// "items" array holding the original children, plus `source`. The caller
/// has already detached `source`.
fn wrap_array_with(doc: &mut Document, array_id: &str, source: &str, source_first: bool) {
    let old_children = doc.children_of(array_id);
    doc.replace_kind(array_id, NodeKind::Object { children: Vec::new() });

    let items_id = doc.next_id();
    doc.add_child(array_id, Node::array(items_id.clone(), "items"));
    doc.register_container(&items_id);
    for (index, child) in old_children.iter().enumerate() {
        doc.splice(&items_id, index, child);
    }
    renumber_array_children(doc, &items_id);

    let at = if source_first { 0 } else { 1 };
    doc.splice(array_id, at, source);
    doc.refresh_subtree_paths(array_id);
}

fn nest_into_object(doc: &mut Document, source: &str, target: &str) -> Result<(), EditError> {
    doc.detach(source);
    let name = doc
        .get(source)
        .map(|n| n.name.clone())
        .ok_or_else(|| EditError::NodeNotFound(source.to_string()))?;
    let fresh = fresh_child_name(doc, target, &name);
    if fresh != name {
        doc.rename_node(source, &fresh);
    }
    let len = doc.children_of(target).len();
    doc.splice(target, len, source);
    doc.refresh_subtree_paths(source);
    Ok(())
}

/// Keep positional display names in step with actual order after a
/// reorder inside an array.
fn renumber_array_children(doc: &mut Document, parent: &str) {
    if !doc.get(parent).is_some_and(|n| n.is_array()) {
        return;
    }
    for (index, child) in doc.children_of(parent).iter().enumerate() {
        let want = index.to_string();
        if doc.get(child).is_some_and(|n| n.name != want) {
            doc.rename_node(child, &want);
        }
    }
}

fn fresh_child_name(doc: &Document, parent: &str, base: &str) -> String {
    let sibling_names: Vec<String> = doc
        .children_of(parent)
        .iter()
        .filter_map(|child| doc.get(child).map(|n| n.name.clone()))
        .collect();
    if !sibling_names.iter().any(|n| n == base) {
        return base.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}{counter}");
        if !sibling_names.iter().any(|n| n == &candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildcards_document::decode;

    fn leaf_values(doc: &Document, id: &str) -> Vec<String> {
        doc.children_of(id)
            .iter()
            .filter_map(|c| doc.get(c).and_then(|n| n.leaf_value()).map(|v| v.as_text()))
            .collect()
    }

    #[test]
    fn test_insert_with_no_selection_creates_root_array() {
        let mut doc = Document::new();
        let outcome = insert_for_selection(&mut doc, &[]).unwrap();

        assert!(outcome.begin_rename);
        let node = doc.get(&outcome.node_id).unwrap();
        assert!(node.is_array());
        assert_eq!(doc.parent_of(&outcome.node_id), Some(doc.root()));
        assert_eq!(doc.children_of(&outcome.node_id).len(), 1);
    }

    #[test]
    fn test_insert_with_leaf_selection_promotes_to_array() {
        let mut doc = decode("outfit:\n  - casual\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let leaf = doc.children_of(&outfit)[0].clone();

        let outcome = insert_for_selection(&mut doc, &[leaf.clone()]).unwrap();
        let promoted = doc.get(&leaf).unwrap();
        assert!(promoted.is_array());
        let children = doc.children_of(&leaf);
        assert_eq!(children.len(), 2);
        assert_eq!(children[1], outcome.node_id);
        assert_eq!(leaf_values(&doc, &leaf), vec!["casual".to_string(), String::new()]);
    }

    #[test]
    fn test_insert_with_array_selection_appends_leaf() {
        let mut doc = decode("outfit:\n  - casual\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();

        let outcome = insert_for_selection(&mut doc, &[outfit.clone()]).unwrap();
        assert_eq!(doc.children_of(&outfit).len(), 2);
        assert_eq!(doc.parent_of(&outcome.node_id), Some(outfit.as_str()));
    }

    #[test]
    fn test_insert_expands_collapsed_ancestors() {
        let mut doc = decode("outfit:\n  - casual\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        doc.set_collapsed(&outfit, true);

        insert_for_selection(&mut doc, &[outfit.clone()]).unwrap();
        // the array itself stays as it was; its ancestors are expanded
        assert!(!doc.get(doc.root()).unwrap().collapsed);
    }

    #[test]
    fn test_insert_multi_selection_rejected() {
        let mut doc = decode("outfit:\n  - casual\npose:\n  - standing\n").unwrap();
        let a = doc.find_by_name("outfit").unwrap();
        let b = doc.find_by_name("pose").unwrap();

        assert_eq!(
            insert_for_selection(&mut doc, &[a, b]),
            Err(EditError::MultiSelection)
        );
    }

    #[test]
    fn test_drop_reorders_within_parent() {
        let mut doc = decode("outfit:\n  - a\n  - b\n  - c\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let children = doc.children_of(&outfit);

        // move a after c
        drop_node(&mut doc, &children[0], &children[2], DropPosition::After).unwrap();
        assert_eq!(leaf_values(&doc, &outfit), vec!["b", "c", "a"]);
        // positional names follow
        let renamed = doc.children_of(&outfit);
        assert_eq!(doc.get(&renamed[0]).unwrap().name, "0");
        assert_eq!(doc.get(&renamed[2]).unwrap().name, "2");
    }

    #[test]
    fn test_drop_moves_across_parents() {
        let mut doc = decode("outfit:\n  - a\n  - b\npose:\n  - standing\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let pose = doc.find_by_name("pose").unwrap();
        let a = doc.children_of(&outfit)[0].clone();
        let standing = doc.children_of(&pose)[0].clone();

        drop_node(&mut doc, &a, &standing, DropPosition::Before).unwrap();
        assert_eq!(leaf_values(&doc, &outfit), vec!["b"]);
        assert_eq!(leaf_values(&doc, &pose), vec!["a", "standing"]);
        assert_eq!(doc.parent_of(&a), Some(pose.as_str()));
    }

    #[test]
    fn test_drop_onto_self_and_descendant_rejected() {
        let mut doc = decode("outfit:\n  d:\n    - a\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let d = doc.find_by_name("outfit/d").unwrap();

        assert_eq!(
            drop_node(&mut doc, &outfit, &outfit, DropPosition::Before),
            Err(EditError::DropOnSelf)
        );
        assert_eq!(
            drop_node(&mut doc, &outfit, &d, DropPosition::Before),
            Err(EditError::DropIntoDescendant)
        );
    }

    #[test]
    fn test_drop_near_collapsed_container_inserts_as_sibling() {
        let mut doc = decode("outfit:\n  - a\npose:\n  - standing\nstyle:\n  - neat\n").unwrap();
        let pose = doc.find_by_name("pose").unwrap();
        let style = doc.find_by_name("style").unwrap();
        doc.set_collapsed(&pose, true);

        drop_node(&mut doc, &style, &pose, DropPosition::Before).unwrap();
        let order: Vec<String> = doc
            .children_of(doc.root())
            .iter()
            .map(|c| doc.get(c).unwrap().name.clone())
            .collect();
        assert_eq!(order, vec!["outfit", "style", "pose"]);
        // style was not nested inside the collapsed container
        assert_eq!(doc.parent_of(&style), Some(doc.root()));
    }

    #[test]
    fn test_container_dropped_between_array_children_splits_it() {
        let mut doc = decode("outfit:\n  - a\n  - b\n  - c\npose:\n  - standing\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let pose = doc.find_by_name("pose").unwrap();
        let b = doc.children_of(&outfit)[1].clone();

        drop_node(&mut doc, &pose, &b, DropPosition::After).unwrap();

        // outfit keeps its id and name but is an object now
        let rebuilt = doc.get(&outfit).unwrap();
        assert!(rebuilt.is_object());
        assert_eq!(rebuilt.name, "outfit");

        let children = doc.children_of(&outfit);
        assert_eq!(children.len(), 3);
        assert_eq!(doc.get(&children[0]).unwrap().name, "items");
        assert_eq!(children[1], pose);
        assert_eq!(doc.get(&children[2]).unwrap().name, "items2");
        assert_eq!(leaf_values(&doc, &children[0]), vec!["a", "b"]);
        assert_eq!(leaf_values(&doc, &children[2]), vec!["c"]);
    }

    #[test]
    fn test_container_dropped_at_array_boundary_wraps_items() {
        let mut doc = decode("outfit:\n  - a\n  - b\npose:\n  - standing\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let pose = doc.find_by_name("pose").unwrap();
        let a = doc.children_of(&outfit)[0].clone();

        drop_node(&mut doc, &pose, &a, DropPosition::Before).unwrap();

        let rebuilt = doc.get(&outfit).unwrap();
        assert!(rebuilt.is_object());
        let children = doc.children_of(&outfit);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], pose);
        assert_eq!(doc.get(&children[1]).unwrap().name, "items");
        assert_eq!(leaf_values(&doc, &children[1]), vec!["a", "b"]);
    }

    #[test]
    fn test_container_dropped_onto_object_nests() {
        let mut doc = decode("outfit:\n  d:\n    - a\npose:\n  - standing\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let pose = doc.find_by_name("pose").unwrap();

        drop_node(&mut doc, &pose, &outfit, DropPosition::After).unwrap();
        assert_eq!(doc.parent_of(&pose), Some(outfit.as_str()));
        assert_eq!(doc.path_of(&pose), "outfit/pose");
        assert!(doc.find_by_name("outfit/pose").is_some());
    }

    #[test]
    fn test_container_dropped_onto_array_wraps_existing_children() {
        let mut doc = decode("outfit:\n  - a\n  - b\npose:\n  - standing\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let pose = doc.find_by_name("pose").unwrap();

        drop_node(&mut doc, &pose, &outfit, DropPosition::After).unwrap();

        let rebuilt = doc.get(&outfit).unwrap();
        assert!(rebuilt.is_object());
        let children = doc.children_of(&outfit);
        assert_eq!(children.len(), 2);
        assert_eq!(doc.get(&children[0]).unwrap().name, "items");
        assert_eq!(children[1], pose);
        assert_eq!(leaf_values(&doc, &children[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_group_selected_leaves() {
        let mut doc = decode("p:\n  - x\n  - y\n  - z\n").unwrap();
        let p = doc.find_by_name("p").unwrap();
        let children = doc.children_of(&p);
        let x = children[0].clone();
        let z = children[2].clone();

        let group = group_selected(&mut doc, &[x.clone(), z.clone()]).unwrap();

        let rebuilt = doc.get(&p).unwrap();
        assert!(rebuilt.is_object());
        assert_eq!(rebuilt.name, "p");

        let object_children = doc.children_of(&p);
        assert_eq!(object_children.len(), 2);
        assert_eq!(doc.get(&object_children[0]).unwrap().name, "temp");
        assert_eq!(leaf_values(&doc, &object_children[0]), vec!["y"]);
        assert_eq!(object_children[1], group);
        assert_eq!(leaf_values(&doc, &group), vec!["x", "z"]);
    }

    #[test]
    fn test_group_rejects_cross_parent_and_mixed_selection() {
        let mut doc = decode("a:\n  - one\nb:\n  - two\n").unwrap();
        let a = doc.find_by_name("a").unwrap();
        let b = doc.find_by_name("b").unwrap();
        let one = doc.children_of(&a)[0].clone();
        let two = doc.children_of(&b)[0].clone();

        assert_eq!(
            group_selected(&mut doc, &[one.clone(), two]),
            Err(EditError::CrossParentSelection)
        );
        assert_eq!(
            group_selected(&mut doc, &[one, a]),
            Err(EditError::MixedSelection)
        );
        assert_eq!(group_selected(&mut doc, &[]), Err(EditError::EmptySelection));
    }

    #[test]
    fn test_clone_subtree_uses_fresh_ids() {
        let mut doc = decode("outfit:\n  d:\n    - a\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let root = doc.root().to_string();

        let copy = clone_subtree(&mut doc, &outfit, &root, "outfit_copy").unwrap();
        assert_ne!(copy, outfit);
        assert_eq!(doc.get(&copy).unwrap().name, "outfit_copy");

        // deep copy with its own identities
        let original_d = doc.find_by_name("outfit/d").unwrap();
        let copied_d = doc.find_by_name("outfit_copy/d").unwrap();
        assert_ne!(original_d, copied_d);
        assert_eq!(leaf_values(&doc, &copied_d), vec!["a"]);
    }

    #[test]
    fn test_duplicate_places_copy_after_source() {
        let mut doc = decode("outfit:\n  - a\n  - b\n").unwrap();
        let outfit = doc.find_by_name("outfit").unwrap();
        let a = doc.children_of(&outfit)[0].clone();

        let copy = duplicate_node(&mut doc, &a).unwrap();
        let children = doc.children_of(&outfit);
        assert_eq!(children.len(), 3);
        assert_eq!(children[1], copy);
        assert_eq!(leaf_values(&doc, &outfit), vec!["a", "a", "b"]);
    }

    #[test]
    fn test_remove_selection_prefers_next_sibling() {
        let mut doc = decode("p:\n  - a\n  - b\n  - c\n").unwrap();
        let p = doc.find_by_name("p").unwrap();
        let children = doc.children_of(&p);
        let b = children[1].clone();
        let c = children[2].clone();

        let replacement = remove_selection(&mut doc, &[b]);
        assert_eq!(replacement, vec![c]);
        assert_eq!(leaf_values(&doc, &p), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_selection_falls_back_to_previous_sibling() {
        let mut doc = decode("p:\n  - a\n  - b\n  - c\n").unwrap();
        let p = doc.find_by_name("p").unwrap();
        let children = doc.children_of(&p);
        let a = children[0].clone();
        let b = children[1].clone();
        let c = children[2].clone();

        let replacement = remove_selection(&mut doc, &[b, c]);
        assert_eq!(replacement, vec![a]);
    }

    #[test]
    fn test_remove_selection_falls_back_to_parent() {
        let mut doc = decode("p:\n  - a\n").unwrap();
        let p = doc.find_by_name("p").unwrap();
        let a = doc.children_of(&p)[0].clone();

        let replacement = remove_selection(&mut doc, &[a]);
        assert_eq!(replacement, vec![p]);
    }
}
