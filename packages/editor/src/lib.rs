//! # Wildcards Editor
//!
//! Structural editing engine for wildcards documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: YAML text → tree                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Load/save documents                      │
//! │  - Insert/drop/group/duplicate with         │
//! │    tagged no-op failures                    │
//! │  - Visible-order keyboard navigation        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ expansion: tree → prompt text               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth**: YAML text is a derived view
//! 2. **Identity-stable rewrites**: restructured containers keep their id
//!    and name so references stay valid
//! 3. **No-op over exception**: precondition failures come back as tagged
//!    [`EditError`] values, never panics
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wildcards_editor::{Document, insert_for_selection, drop_node, DropPosition};
//!
//! let mut doc = Document::load("wildcards.yaml".into())?;
//!
//! let outcome = doc.apply(|tree| insert_for_selection(tree, &selection))?;
//!
//! doc.save()?;
//! ```

mod document;
mod errors;
mod mutations;
mod navigation;

pub use document::{Document, DocumentStorage};
pub use errors::{EditError, EditorError};
pub use mutations::{
    clone_subtree, drop_node, duplicate_node, group_selected, insert_for_selection,
    remove_selection, set_all_collapsed, DropPosition, InsertOutcome,
};
pub use navigation::{move_selection, visible_nodes};

// Re-export the model for convenience
pub use wildcards_document::Document as TreeDocument;
