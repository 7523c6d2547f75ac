//! Monotonic identifier allocation
//!
//! Every produced node gets a deterministic identifier of the form
//! `<key>-<counter>`, the counter starting at 1 and zero-padded to four
//! digits. Counters are independent per key and live as long as the
//! allocator, so one allocator belongs to exactly one composition run.

use std::collections::HashMap;

/// Per-key monotonic counters
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    counters: HashMap<String, u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next counter value for `key`, starting at 1
    pub fn next(&mut self, key: &str) -> u32 {
        let counter = self.counters.entry(key.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Next identifier for `key`, e.g. `DO-PRODUCT-0003`
    pub fn next_id(&mut self, key: &str) -> String {
        format_id(key, self.next(key))
    }

    /// Forget the counter for `key`; the next call restarts at 1
    pub fn reset(&mut self, key: &str) {
        self.counters.remove(key);
    }

    /// Current value for `key` without advancing it (0 when unused)
    pub fn current(&self, key: &str) -> u32 {
        self.counters.get(key).copied().unwrap_or(0)
    }
}

/// Format a key and counter the way [`IdAllocator::next_id`] does
pub fn format_id(key: &str, counter: u32) -> String {
    format!("{key}-{counter:04}")
}
