//! # Expansion engine
//!
//! Resolves tag references against a wildcards document into flat prompt
//! text.
//!
//! ## Resolution model
//!
//! A reference is a name with an optional weight suffix (`name:1.3`; a
//! weight of exactly 1.0 is treated as absent). The name is looked up via
//! the definition index, then the path index, then the first node in
//! document order. A name resolving to an array is a wildcard: its
//! children form a candidate list and exactly one is selected. Anything
//! else — missing names included — degrades to literal text.
//!
//! Selection precedence:
//!
//! 1. an enabled pin/override with a non-empty value
//! 2. a caller-supplied previous resolution (replay): reused verbatim,
//!    no further candidate recursion
//! 3. for consistent-random arrays, a resolution already made earlier in
//!    the pass
//! 4. a uniform draw from OS entropy
//!
//! The chosen candidate is expanded again recursively — it may itself
//! name further wildcards — and the resolution map records the flattened
//! result, unwrapped. A weight suffix wraps only the emitted text, as
//! `(text:weight)`.
//!
//! ## Cycle guard
//!
//! The `visited` set is scoped per top-level call and threaded through
//! the recursive sub-expansion of each reference (added before
//! recursing, removed after). A name already on the stack logs a warning
//! and contributes no text instead of recursing forever.
//!
//! ## Disables
//!
//! When a selected candidate embeds a `disables=[...]` marker, the named
//! references join the shared [`DisableContext`] before the candidate is
//! expanded further. Every later reference in the same context is
//! dropped when its resolved name or structural path matches, and
//! already-emitted output — weight-wrapped forms included — is
//! suppressed retroactively.

use crate::directives::{parse_disables, DisableContext};
use crate::pins::PinStore;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument, warn};
use wildcards_document::{Document, NodeId, NodeKind};

/// One emitted reference: the resolved name, its structural path (empty
/// when the name never resolved to a node), and the display text with
/// any weight wrapping applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedEntry {
    pub name: String,
    pub path: String,
    pub text: String,
}

/// Result of one expansion call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expansion {
    pub entries: Vec<ExpandedEntry>,
    /// Reference name → the flattened text it resolved to (unwrapped).
    pub resolutions: BTreeMap<String, String>,
}

impl Expansion {
    /// Ordered display texts, one per emitted reference.
    pub fn expanded_text(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.text.clone()).collect()
    }

    /// The whole expansion as one comma-joined prompt string.
    pub fn prompt_text(&self) -> String {
        self.expanded_text().join(", ")
    }

    /// Drop every emitted entry the context now suppresses, along with
    /// its resolution. Used for retroactive disables.
    pub fn retain_enabled(&mut self, disables: &DisableContext) {
        let dropped: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| disables.is_disabled(&entry.name, &entry.path))
            .map(|entry| entry.name.clone())
            .collect();
        if dropped.is_empty() {
            return;
        }
        self.entries
            .retain(|entry| !disables.is_disabled(&entry.name, &entry.path));
        for name in dropped {
            self.resolutions.remove(&name);
        }
    }

    fn push_resolved(&mut self, name: &str, path: &str, text: String, weight: Option<f64>) {
        if text.is_empty() {
            self.resolutions.insert(name.to_string(), text);
            return;
        }
        let display = match weight {
            Some(value) => format!("({text}:{value})"),
            None => text.clone(),
        };
        self.entries.push(ExpandedEntry {
            name: name.to_string(),
            path: path.to_string(),
            text: display,
        });
        self.resolutions.insert(name.to_string(), text);
    }
}

/// Expand a list of references against a document.
///
/// `visited` is the cycle guard for this top-level call; callers pass an
/// empty set. `existing` holds resolutions from earlier calls of the
/// same pass (consistent-random reuse); `previous` holds resolutions
/// from a prior generation (replay). `shared` threads one disable
/// context across the calls of a pass — without it, disables still apply
/// within this call only.
#[instrument(skip_all, fields(references = references.len()))]
pub fn expand(
    references: &[String],
    doc: &Document,
    visited: &mut HashSet<String>,
    pins: &dyn PinStore,
    existing: &BTreeMap<String, String>,
    previous: Option<&BTreeMap<String, String>>,
    shared: Option<&mut DisableContext>,
) -> Expansion {
    let mut local = DisableContext::new();
    let disables = match shared {
        Some(context) => context,
        None => &mut local,
    };

    let mut out = Expansion::default();
    expand_into(references, doc, visited, pins, existing, previous, disables, &mut out);
    out.retain_enabled(disables);
    out
}

#[allow(clippy::too_many_arguments)]
fn expand_into(
    references: &[String],
    doc: &Document,
    visited: &mut HashSet<String>,
    pins: &dyn PinStore,
    existing: &BTreeMap<String, String>,
    previous: Option<&BTreeMap<String, String>>,
    disables: &mut DisableContext,
    out: &mut Expansion,
) {
    for raw in references {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let (name, weight) = split_weight(raw);

        let node_id = doc.find_by_name(&name);
        let path = node_id
            .as_deref()
            .map(|id| doc.path_of(id))
            .unwrap_or_default();
        if disables.is_disabled(&name, &path) {
            debug!(reference = %name, "reference disabled, dropping");
            continue;
        }

        let wildcard = node_id.filter(|id| doc.get(id).is_some_and(|n| n.is_array()));
        let Some(id) = wildcard else {
            // not found, or found as a leaf/object/ref: literal text
            out.push_resolved(&name, &path, name.clone(), weight);
            continue;
        };

        if visited.contains(&name) {
            warn!(reference = %name, "circular wildcard reference, skipping");
            continue;
        }

        let pinned = pins
            .pin(&name)
            .filter(|record| record.enabled)
            .and_then(|record| record.value)
            .filter(|value| !value.is_empty());

        // replay: reuse the stored text verbatim, no candidate recursion
        if pinned.is_none() {
            if let Some(stored) = previous.and_then(|map| map.get(&name)) {
                debug!(reference = %name, "replaying previous resolution");
                out.push_resolved(&name, &path, stored.clone(), weight);
                continue;
            }
        }

        let children = doc.children_of(&id);
        let consistent = children
            .first()
            .and_then(|child| doc.get(child))
            .is_some_and(|node| node.is_consistent_marker());

        // consistent-random: one draw per pass, reused for later reads
        if pinned.is_none() && consistent {
            if let Some(done) = out
                .resolutions
                .get(&name)
                .cloned()
                .or_else(|| existing.get(&name).cloned())
            {
                out.push_resolved(&name, &path, done, weight);
                continue;
            }
        }

        visited.insert(name.clone());
        let chosen = match pinned {
            Some(text) => Some(text),
            None => {
                let candidates =
                    candidate_texts(doc, &children, visited, pins, existing, previous, disables, out);
                pick_random(candidates)
            }
        };
        let Some(chosen) = chosen else {
            visited.remove(&name);
            out.resolutions.insert(name.clone(), String::new());
            continue;
        };

        // embedded disables take effect before the candidate recurses,
        // and reach back over anything already emitted
        let newly_disabled = parse_disables(&chosen);
        if !newly_disabled.is_empty() {
            for entry in newly_disabled {
                debug!(reference = %name, disabled = %entry, "collected disable directive");
                disables.disable(entry);
            }
            out.retain_enabled(disables);
        }

        // the candidate may itself name further wildcards
        let tokens = tokenize(&chosen);
        let merged = merged_existing(existing, &out.resolutions);
        let mut sub = Expansion::default();
        expand_into(&tokens, doc, visited, pins, &merged, previous, disables, &mut sub);
        visited.remove(&name);

        let flattened = sub.prompt_text();
        for (key, value) in sub.resolutions {
            out.resolutions.entry(key).or_insert(value);
        }
        out.push_resolved(&name, &path, flattened, weight);
    }
}

/// Literal text of each candidate: leaves contribute their value, refs
/// delegate to the resolution of the referenced name, anything else its
/// own display name. A leading consistent-random marker is skipped.
#[allow(clippy::too_many_arguments)]
fn candidate_texts(
    doc: &Document,
    children: &[NodeId],
    visited: &mut HashSet<String>,
    pins: &dyn PinStore,
    existing: &BTreeMap<String, String>,
    previous: Option<&BTreeMap<String, String>>,
    disables: &DisableContext,
    out: &Expansion,
) -> Vec<String> {
    let mut texts = Vec::new();
    for (index, child_id) in children.iter().enumerate() {
        let Some(child) = doc.get(child_id) else {
            continue;
        };
        if index == 0 && child.is_consistent_marker() {
            continue;
        }
        let text = match &child.kind {
            NodeKind::Leaf { value } => value.as_text(),
            NodeKind::Ref { target } => {
                // candidate building must not leak directives from
                // candidates that end up unchosen; a chosen candidate
                // re-surfaces its markers in the flattened text
                let mut scratch = disables.clone();
                let merged = merged_existing(existing, &out.resolutions);
                let mut sub = Expansion::default();
                expand_into(
                    &[target.clone()],
                    doc,
                    visited,
                    pins,
                    &merged,
                    previous,
                    &mut scratch,
                    &mut sub,
                );
                sub.resolutions
                    .get(target)
                    .cloned()
                    .unwrap_or_else(|| sub.prompt_text())
            }
            NodeKind::Object { .. } | NodeKind::Array { .. } => child.name.clone(),
        };
        texts.push(text);
    }
    texts
}

/// Uniform draw from OS entropy. A general-purpose PRNG would bias
/// low-entropy sessions that expand many wildcards concurrently.
fn pick_random(candidates: Vec<String>) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }
    if candidates.len() == 1 {
        return candidates.into_iter().next();
    }
    let index = OsRng.gen_range(0..candidates.len());
    candidates.into_iter().nth(index)
}

/// Split `name:weight`. A missing or unparsable suffix, or a weight of
/// exactly 1.0, yields no weight.
fn split_weight(raw: &str) -> (String, Option<f64>) {
    if let Some((head, tail)) = raw.rsplit_once(':') {
        if let Ok(weight) = tail.trim().parse::<f64>() {
            let head = head.trim();
            if !head.is_empty() {
                if (weight - 1.0).abs() < f64::EPSILON {
                    return (head.to_string(), None);
                }
                return (head.to_string(), Some(weight));
            }
        }
    }
    (raw.to_string(), None)
}

/// Comma-split that leaves `disables=[a,b]` markers whole.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                let token = current.trim();
                if !token.is_empty() {
                    tokens.push(token.to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    let token = current.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    tokens
}

fn merged_existing(
    existing: &BTreeMap<String, String>,
    resolved: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = existing.clone();
    for (key, value) in resolved {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
