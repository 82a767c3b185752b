//! # Navigation
//!
//! Visible-order traversal for keyboard movement. The visible list is the
//! depth-first pre-order of the document minus the root, minus anything
//! hidden inside a collapsed container, minus nodes failing the filter.
//! Descent stops at collapsed containers; a filter-failing container is
//! itself hidden but its children are still considered.

use wildcards_document::{Document, Node, NodeId};

/// Nodes in visible order for the current collapse state and filter.
pub fn visible_nodes(doc: &Document, filter: Option<&str>) -> Vec<NodeId> {
    let mut out = Vec::new();
    visit_children(doc, doc.root(), filter, &mut out);
    out
}

/// Keyboard "move by delta" over the visible list. Clamps at the ends.
/// If the current selection is no longer visible (its container just
/// collapsed, or the filter changed), falls back to the nearest visible
/// ancestor, or the first visible node.
pub fn move_selection(
    doc: &Document,
    current: Option<&str>,
    delta: isize,
    filter: Option<&str>,
) -> Option<NodeId> {
    let visible = visible_nodes(doc, filter);
    if visible.is_empty() {
        return None;
    }
    let Some(current) = current else {
        return Some(visible[0].clone());
    };

    let base = match visible.iter().position(|id| id == current) {
        Some(position) => position as isize,
        None => {
            for ancestor in doc.ancestors(current) {
                if visible.iter().any(|id| *id == ancestor) {
                    return Some(ancestor);
                }
            }
            return Some(visible[0].clone());
        }
    };

    let target = (base + delta).clamp(0, visible.len() as isize - 1) as usize;
    Some(visible[target].clone())
}

fn visit_children(doc: &Document, id: &str, filter: Option<&str>, out: &mut Vec<NodeId>) {
    for child in doc.children_of(id) {
        let Some(node) = doc.get(&child) else {
            continue;
        };
        if matches_filter(node, filter) {
            out.push(child.clone());
        }
        if node.is_container() && !node.collapsed {
            visit_children(doc, &child, filter, out);
        }
    }
}

fn matches_filter(node: &Node, filter: Option<&str>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let needle = filter.to_lowercase();
    if node.name.to_lowercase().contains(&needle) {
        return true;
    }
    node.leaf_value()
        .map(|value| value.as_text().to_lowercase().contains(&needle))
        .unwrap_or(false)
}
