//! # Zone reader
//!
//! Thin driver over the expansion engine for the reserved top-level
//! prompt zones. Zones expand in a fixed order against one shared
//! disable context, because directives selected in the first zone govern
//! what the later zones may emit. Each zone's resolutions feed forward
//! so consistent-random names stay stable across the whole pass.

use crate::directives::{parse_composition, strip_directives, DisableContext};
use crate::expander::{expand, Expansion};
use crate::pins::PinStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::instrument;
use wildcards_document::{Document, Node, NodeId, Scalar};

/// Reserved top-level wildcard names, in expansion order.
pub const ZONES: [&str; 5] = ["all", "zone1", "zone2", "negative", "inpainting"];

/// One zone's final text (directive markers stripped) and resolutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRead {
    pub zone: String,
    pub text: String,
    pub resolutions: BTreeMap<String, String>,
}

/// Result of reading every zone present in a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonePass {
    /// `composition=` token found in the first zone's expansion.
    pub composition: Option<String>,
    pub zones: Vec<ZoneRead>,
}

/// Reads zones and remembers the pass, so re-reading returns the same
/// choices until [`ZoneReader::reset`] is called.
#[derive(Debug, Default)]
pub struct ZoneReader {
    remembered: Option<BTreeMap<String, String>>,
}

impl ZoneReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand the zones in their fixed order. Later zones see the
    /// disables emitted by earlier ones, and directives discovered
    /// mid-pass suppress matching output from every zone of this pass.
    #[instrument(skip_all)]
    pub fn read(&mut self, doc: &Document, pins: &dyn PinStore) -> ZonePass {
        let previous = self.remembered.clone();
        let mut shared = DisableContext::new();
        let mut existing: BTreeMap<String, String> = BTreeMap::new();
        let mut expanded: Vec<(String, Expansion)> = Vec::new();
        let mut composition = None;

        for zone in ZONES {
            if doc.find_by_name(zone).is_none() {
                continue;
            }
            let mut visited = HashSet::new();
            let result = expand(
                &[zone.to_string()],
                doc,
                &mut visited,
                pins,
                &existing,
                previous.as_ref(),
                Some(&mut shared),
            );
            if zone == ZONES[0] {
                composition = parse_composition(&result.prompt_text());
            }
            for (key, value) in result.resolutions.clone() {
                existing.entry(key).or_insert(value);
            }
            expanded.push((zone.to_string(), result));
        }

        let mut zones = Vec::new();
        let mut remembered = BTreeMap::new();
        for (zone, mut result) in expanded {
            result.retain_enabled(&shared);
            remembered.extend(result.resolutions.clone());
            zones.push(ZoneRead {
                zone,
                text: strip_directives(&result.prompt_text()),
                resolutions: result.resolutions,
            });
        }
        // a replayed pass leaves the remembered choices untouched
        if self.remembered.is_none() {
            self.remembered = Some(remembered);
        }

        ZonePass { composition, zones }
    }

    /// Forget the remembered pass; the next read draws fresh choices.
    pub fn reset(&mut self) {
        self.remembered = None;
    }
}

/// Write resolved text back into the document, synthesizing the zone
/// array and its leaf on demand. Returns the leaf holding the text.
pub fn write_zone_text(doc: &mut Document, zone: &str, text: &str) -> NodeId {
    let array_id = match doc
        .find_by_name(zone)
        .filter(|id| doc.get(id).is_some_and(|n| n.is_array()))
    {
        Some(id) => id,
        None => {
            let id = doc.next_id();
            let root = doc.root().to_string();
            doc.add_child(&root, Node::array(id.clone(), zone));
            doc.register_container(&id);
            id
        }
    };

    let existing_leaf = doc
        .children_of(&array_id)
        .into_iter()
        .find(|child| doc.get(child).is_some_and(|n| n.is_leaf()));
    match existing_leaf {
        Some(leaf_id) => {
            doc.set_leaf_value(&leaf_id, Scalar::String(text.to_string()));
            leaf_id
        }
        None => {
            let leaf_id = doc.next_id();
            let index = doc.children_of(&array_id).len();
            doc.add_child(
                &array_id,
                Node::leaf(leaf_id.clone(), index.to_string(), Scalar::String(text.to_string())),
            );
            leaf_id
        }
    }
}
