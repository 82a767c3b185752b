//! # Directives
//!
//! Markers document authors embed in plain candidate text:
//!
//! - `disables=[name(,name)*]` — suppress other references for the rest
//!   of the current pass
//! - `composition=token` — layout hint for the caller
//!
//! The engine only collects `disables` names into the shared context when
//! a candidate carrying them is selected. Stripping markers from display
//! text and interpreting `composition=` belong to the zone reader.

use std::collections::HashSet;

pub const DISABLES_PREFIX: &str = "disables=[";
pub const COMPOSITION_PREFIX: &str = "composition=";

/// Names listed in every `disables=[...]` marker in `text`.
pub fn parse_disables(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(DISABLES_PREFIX) {
        let tail = &rest[start + DISABLES_PREFIX.len()..];
        let Some(end) = tail.find(']') else {
            break;
        };
        for part in tail[..end].split(',') {
            let name = part.trim();
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
        rest = &tail[end + 1..];
    }
    names
}

/// Token of the first `composition=` marker, if any.
pub fn parse_composition(text: &str) -> Option<String> {
    let start = text.find(COMPOSITION_PREFIX)?;
    let tail = &text[start + COMPOSITION_PREFIX.len()..];
    let token: String = tail
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != ',')
        .collect();
    (!token.is_empty()).then_some(token)
}

/// Remove both marker forms from display text, tidying the separators
/// they leave behind.
pub fn strip_directives(text: &str) -> String {
    let mut cleaned = String::new();
    let mut rest = text;
    while let Some(start) = rest.find(DISABLES_PREFIX) {
        cleaned.push_str(&rest[..start]);
        let tail = &rest[start + DISABLES_PREFIX.len()..];
        match tail.find(']') {
            Some(end) => rest = &tail[end + 1..],
            None => {
                rest = "";
                break;
            }
        }
    }
    cleaned.push_str(rest);

    cleaned
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && !token.starts_with(COMPOSITION_PREFIX))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shared mutable context threaded across the expansion calls of one
/// generation pass: disabled names plus caller-supplied prefix patterns.
#[derive(Debug, Clone, Default)]
pub struct DisableContext {
    names: HashSet<String>,
    patterns: Vec<String>,
}

impl DisableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn add_pattern(&mut self, prefix: impl Into<String>) {
        self.patterns.push(prefix.into());
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.patterns.is_empty()
    }

    /// True when a reference with this resolved name and structural path
    /// must be suppressed. An entry matches on the exact name or path, or
    /// as a slash-prefix of either — so disabling a container name
    /// suppresses everything reachable under it. Exact and prefix matches
    /// carry equal weight; the first hit wins.
    pub fn is_disabled(&self, name: &str, path: &str) -> bool {
        self.names
            .iter()
            .any(|entry| matches_entry(entry, name) || matches_entry(entry, path))
            || self
                .patterns
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()) || path.starts_with(prefix.as_str()))
    }
}

fn matches_entry(entry: &str, subject: &str) -> bool {
    if subject.is_empty() {
        return false;
    }
    subject == entry
        || (subject.len() > entry.len()
            && subject.starts_with(entry)
            && subject.as_bytes()[entry.len()] == b'/')
}
