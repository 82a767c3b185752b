//! # Wildcards Expansion
//!
//! Turns wildcards documents into flat generation-prompt text.
//!
//! ## Purpose
//!
//! The engine resolves tag references — names with optional weight
//! suffixes — against a document tree: arrays are wildcards whose
//! children are mutually exclusive alternatives, everything else
//! degrades to literal text. Selection honors external pins, replays
//! prior generations, keeps consistent-random names stable across a
//! pass, and propagates disable directives between zones.
//!
//! ## Determinism boundaries
//!
//! Fresh draws come from OS entropy and are not reproducible. Every
//! deterministic path is explicit instead:
//!
//! - a pinned reference always resolves to its pinned text
//! - a replayed pass (`previous` resolutions) reproduces itself exactly
//! - a consistent-random name resolves once per pass, however many
//!   zones read it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wildcards_expansion::{expand, MemoryPins, ZoneReader};
//! use std::collections::{BTreeMap, HashSet};
//!
//! let doc = wildcards_document::decode(source)?;
//! let pins = MemoryPins::new();
//!
//! // single expansion call
//! let mut visited = HashSet::new();
//! let result = expand(
//!     &["outfit/d:1.2".to_string()],
//!     &doc,
//!     &mut visited,
//!     &pins,
//!     &BTreeMap::new(),
//!     None,
//!     None,
//! );
//!
//! // or a whole zone pass
//! let mut reader = ZoneReader::new();
//! let pass = reader.read(&doc, &pins);
//! ```

mod directives;
mod expander;
mod pins;
mod zones;

pub use directives::{
    parse_composition, parse_disables, strip_directives, DisableContext, COMPOSITION_PREFIX,
    DISABLES_PREFIX,
};
pub use expander::{expand, ExpandedEntry, Expansion};
pub use pins::{MemoryPins, PinRecord, PinStore};
pub use zones::{write_zone_text, ZonePass, ZoneRead, ZoneReader, ZONES};
