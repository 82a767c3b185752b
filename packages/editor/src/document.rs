//! # Document Handle
//!
//! Editing-state wrapper around the tree store.
//!
//! A Document represents a single wildcards YAML file and its editing
//! state. Documents can be:
//! - **Memory-backed**: Temporary, for testing or in-memory operations
//! - **File-backed**: Single-user editing with disk persistence
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Decode → Edit → Expand → Encode → Save
//!   ↓      ↓        ↓       ↓        ↓       ↓
//! File   Tree   Mutations  Text    YAML    File
//! ```
//!
//! Mutual exclusion across concurrent load-mutate-save sequences on the
//! same file belongs to the embedding application, not this handle.

use crate::errors::EditorError;
use std::path::PathBuf;
use wildcards_document::{codec, Document as TreeDocument};

/// Editable wildcards document
#[derive(Debug)]
pub struct Document {
    /// Path to source file (if any)
    pub path: PathBuf,

    /// Current version number (increments on each mutation)
    pub version: u64,

    /// Backing storage strategy
    storage: DocumentStorage,
}

/// Storage backend for document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only (for testing, temp docs)
    Memory { tree: TreeDocument },

    /// File-backed (single-user editing)
    File { tree: TreeDocument, dirty: bool },
}

impl Document {
    /// Create document from YAML text (memory-backed)
    pub fn from_source(path: PathBuf, source: &str) -> Result<Self, EditorError> {
        let tree = codec::decode(source)?;

        Ok(Self {
            path,
            version: 0,
            storage: DocumentStorage::Memory { tree },
        })
    }

    /// Load document from file (file-backed)
    pub fn load(path: PathBuf) -> Result<Self, EditorError> {
        let source = std::fs::read_to_string(&path)?;
        let tree = codec::decode(&source)?;

        Ok(Self {
            path,
            version: 0,
            storage: DocumentStorage::File { tree, dirty: false },
        })
    }

    /// Current tree
    pub fn tree(&self) -> &TreeDocument {
        match &self.storage {
            DocumentStorage::Memory { tree } => tree,
            DocumentStorage::File { tree, .. } => tree,
        }
    }

    /// Apply one editing operation. Bumps the version and marks
    /// file-backed storage dirty regardless of whether the operation
    /// reports a structural no-op; callers inspect the returned value.
    pub fn apply<T>(&mut self, op: impl FnOnce(&mut TreeDocument) -> T) -> T {
        self.version += 1;
        match &mut self.storage {
            DocumentStorage::Memory { tree } => op(tree),
            DocumentStorage::File { tree, dirty } => {
                *dirty = true;
                op(tree)
            }
        }
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            DocumentStorage::Memory { .. } => false,
        }
    }

    /// Serialize the current tree back to YAML text
    pub fn source(&self) -> Result<String, EditorError> {
        Ok(codec::encode(self.tree())?)
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        let text = codec::encode(self.tree())?;
        match &mut self.storage {
            DocumentStorage::File { dirty, .. } => {
                std::fs::write(&self.path, text)?;
                *dirty = false;
                Ok(())
            }
            DocumentStorage::Memory { .. } => Err(EditorError::NotFileBacked),
        }
    }
}
