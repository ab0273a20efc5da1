//! Per-request resolution cache
//!
//! Memoizes remote query results by cache key for the lifetime of one
//! completion request. Guarantees:
//! - At most one remote call per distinct key
//! - Re-entrant resolution of an in-flight key yields an empty result
//!   instead of a second call or a deadlock
//! - A failed key stays failed for the rest of the request without
//!   affecting other keys
//!
//! The cache is created fresh per completion request and discarded with
//! it; nothing persists across shell keystrokes.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::complete::candidate::Candidate;
use crate::error::ForgeError;

/// State of one cache entry.
#[derive(Debug, Clone)]
pub enum CacheState {
    /// Resolution for this key is in flight.
    Pending,

    /// The key resolved to candidates.
    Ready(Vec<Candidate>),

    /// The key failed to resolve; treated as empty for this request.
    Failed,
}

/// Process-local memo for remote lookups, scoped to one completion request.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: RwLock<HashMap<String, CacheState>>,
}

impl ResolutionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a key, running `fetch` only when the key has never been
    /// seen in this request.
    ///
    /// # Arguments
    /// * `key` - Cache key identifying the bound query variables
    /// * `fetch` - Performs the remote call on a cache miss
    ///
    /// # Returns
    /// * `Vec<Candidate>` - The memoized candidates; empty on failure,
    ///   re-entrant resolution, or an empty remote result
    pub fn resolve_with<F>(&self, key: &str, fetch: F) -> Vec<Candidate>
    where
        F: FnOnce() -> Result<Vec<Candidate>, ForgeError>,
    {
        {
            let entries = self.entries.read().unwrap();
            match entries.get(key) {
                Some(CacheState::Ready(candidates)) => {
                    debug!(key, "resolution cache hit");
                    return candidates.clone();
                }
                Some(CacheState::Pending) => {
                    // Same key re-entered while its resolution is in
                    // flight; resolve to empty rather than double-issue.
                    warn!(key, "re-entrant resolution, returning empty");
                    return Vec::new();
                }
                Some(CacheState::Failed) => {
                    debug!(key, "resolution cache hit (failed)");
                    return Vec::new();
                }
                None => {}
            }
        }

        // The lock is not held across the fetch so a re-entrant lookup
        // observes Pending instead of blocking on the write lock.
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), CacheState::Pending);

        match fetch() {
            Ok(candidates) => {
                self.entries
                    .write()
                    .unwrap()
                    .insert(key.to_string(), CacheState::Ready(candidates.clone()));
                candidates
            }
            Err(err) => {
                warn!(key, error = %err, "resolution failed, degrading to empty");
                self.entries
                    .write()
                    .unwrap()
                    .insert(key.to_string(), CacheState::Failed);
                Vec::new()
            }
        }
    }

    /// Inspect the state of a key. Mostly useful for diagnostics.
    pub fn state_of(&self, key: &str) -> Option<CacheState> {
        self.entries.read().unwrap().get(key).cloned()
    }
}
