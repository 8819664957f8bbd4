//! Ordered per-module style storage.
//!
//! Records are keyed by the originating module id. Re-recording an origin
//! replaces its text in place, so iteration (and therefore the cascade order
//! of the concatenated payload) stays at first-insertion order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStyleRecord {
    pub origin: String,
    pub code: String,
}

#[derive(Debug, Clone, Default)]
pub struct StyleCache {
    records: Vec<ModuleStyleRecord>,
    positions: HashMap<String, usize>,
}

impl StyleCache {
    pub fn new() -> Self {
        StyleCache::default()
    }

    /// Insert or replace the style text for `origin`.
    pub fn record(&mut self, origin: &str, code: &str) {
        match self.positions.get(origin) {
            Some(&pos) => self.records[pos].code = code.to_string(),
            None => {
                self.positions.insert(origin.to_string(), self.records.len());
                self.records.push(ModuleStyleRecord {
                    origin: origin.to_string(),
                    code: code.to_string(),
                });
            }
        }
    }

    /// Join every recorded style text in insertion order, no separator.
    pub fn concatenate(&self) -> String {
        let total = self.records.iter().map(|r| r.code.len()).sum();
        let mut out = String::with_capacity(total);
        for record in &self.records {
            out.push_str(&record.code);
        }
        out
    }

    pub fn get(&self, origin: &str) -> Option<&str> {
        self.positions
            .get(origin)
            .map(|&pos| self.records[pos].code.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleStyleRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
