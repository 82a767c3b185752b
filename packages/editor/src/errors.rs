//! Error types for the editor

use thiserror::Error;

/// Tagged no-op results for structural operations. Preconditions that do
/// not hold reject the edit without interrupting the session; callers
/// surface these inline and keep going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("Selection is empty")]
    EmptySelection,

    #[error("Operation requires a single selected node")]
    MultiSelection,

    #[error("Selection mixes node kinds")]
    MixedSelection,

    #[error("Selection spans multiple parents")]
    CrossParentSelection,

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Cannot drop a node onto itself")]
    DropOnSelf,

    #[error("Cannot drop a node into its own subtree")]
    DropIntoDescendant,

    #[error("Grouping requires leaves of one array: {0}")]
    NotAnArray(String),

    #[error("The root cannot be moved, renamed, or removed")]
    RootImmutable,

    #[error("Selected node kind does not support this operation")]
    UnsupportedSelection,
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Codec error: {0}")]
    Codec(#[from] wildcards_document::CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Edit rejected: {0}")]
    Edit(#[from] EditError),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
