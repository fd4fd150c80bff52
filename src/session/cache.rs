//! ResultCache: Page-Identity Result Memo
//!
//! Keyed by URL + body markup length: a cheap, imperfect fingerprint. It
//! misses edits that keep the markup length and re-scans length-changing
//! edits that are structurally irrelevant. Eviction is strict FIFO by first
//! insertion; lookups do not refresh an entry.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::MAX_CANDIDATES;
use crate::scanner::candidate::Candidate;

/// Cached extraction output for one page identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub candidates: Vec<Candidate>,
    /// Wall clock at insertion, Unix millis
    pub timestamp_ms: i64,
}

/// Page-identity key
pub fn cache_key(url: &str, markup_len: usize) -> String {
    format!("{}_{}", url, markup_len)
}

/// Bounded FIFO cache
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Insert or overwrite. Overwriting keeps the key's original position.
    pub fn put(&mut self, key: &str, mut candidates: Vec<Candidate>) {
        candidates.truncate(MAX_CANDIDATES);
        let entry = CacheEntry {
            key: key.to_string(),
            candidates,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        };

        if self.entries.insert(key.to_string(), entry).is_none() {
            self.order.push_back(key.to_string());
        }

        while self.entries.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
