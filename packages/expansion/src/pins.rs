//! # Pin/override store
//!
//! Externally supplied forced values for specific reference names, used
//! for deterministic testing and manual selection. The engine reads the
//! store through [`PinStore`]; the write side belongs entirely to the
//! embedding UI, which keeps the engine side-effect-free.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One override record. Takes effect only while `enabled` is set and a
/// non-empty `value` is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinRecord {
    pub enabled: bool,
    pub value: Option<String>,
}

/// Read interface injected into every expansion call.
pub trait PinStore {
    fn pin(&self, name: &str) -> Option<PinRecord>;
}

/// In-memory pin store for tests and simple embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryPins {
    records: HashMap<String, PinRecord>,
}

impl MemoryPins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, record: PinRecord) {
        self.records.insert(name.into(), record);
    }

    /// Enable a pin with a literal override in one step.
    pub fn pin_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.records.insert(
            name.into(),
            PinRecord {
                enabled: true,
                value: Some(value.into()),
            },
        );
    }

    pub fn clear(&mut self, name: &str) {
        self.records.remove(name);
    }
}

impl PinStore for MemoryPins {
    fn pin(&self, name: &str) -> Option<PinRecord> {
        self.records.get(name).cloned()
    }
}
