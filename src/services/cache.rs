// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory memoization of decoded Strava payloads.
//!
//! Entries expire after a fixed TTL so new activities show up without a
//! restart, and the map never grows past its capacity.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a payload is served from memory.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);
/// Upper bound on cached payloads across all tokens.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Every input that affects a fetch result. The token is part of the key so a
/// payload is never served to a different credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    token: String,
    path: String,
    query: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(token: &str, path: &str, query: &[(String, String)]) -> Self {
        Self {
            token: token.to_string(),
            path: path.to_string(),
            query: query.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(payload: Value, ttl: Duration) -> Self {
        Self {
            payload,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Shared response cache; clones share the same map.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL, DEFAULT_CACHE_CAPACITY)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached payload for `key`, unless it has expired.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if !entry.is_expired() {
            return Some(entry.payload.clone());
        }
        // Release the shard lock before removing
        drop(entry);
        self.entries.remove_if(key, |_, entry| entry.is_expired());
        None
    }

    pub fn insert(&self, key: CacheKey, payload: Value) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.make_room();
        }
        self.entries.insert(key, CacheEntry::new(payload, self.ttl));
    }

    /// Drop expired entries, then the oldest one if the map is still full.
    fn make_room(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
        if self.entries.len() < self.capacity {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            tracing::debug!(capacity = self.capacity, "Response cache full, evicted oldest entry");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
