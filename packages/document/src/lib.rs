//! # Wildcards Document
//!
//! Tree document model for hand-editable wildcards files.
//!
//! A wildcards document is a tree of named containers and leaf values:
//! objects keyed by name, arrays keyed by position, scalar leaves, and
//! symbolic references at other named containers. The [`Document`] store
//! owns the nodes and keeps three indices exact under arbitrary edits —
//! name definitions, structural paths, and reverse references.
//!
//! The [`codec`] module converts between the YAML surface format and the
//! store; the editor and expansion crates build on the primitives here.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wildcards_document::codec;
//!
//! let doc = codec::decode("outfit:\n  - casual\n  - formal\n")?;
//! let outfit = doc.find_by_name("outfit").unwrap();
//! let text = codec::encode(&doc)?;
//! ```

pub mod codec;
mod document;
mod id_generator;
mod node;

pub use codec::{decode, encode, CodecError, REF_KEY};
pub use document::Document;
pub use id_generator::{get_document_seed, IdGenerator};
pub use node::{Node, NodeId, NodeKind, Scalar, CONSISTENT_MARKER};
