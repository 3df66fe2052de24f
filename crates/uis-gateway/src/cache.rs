//! Normalized response cache keyed by operation identity.
//!
//! An entry is identified by operation name + canonicalized variables
//! (serde_json orders object keys, so serialization is canonical). Entries
//! are written only from successful responses; a failed revalidation never
//! evicts last-known-good data.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

/// How a fresh response combines with a cached one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Deep-merge JSON objects field-by-field; arrays and scalars are
    /// replaced. The default for all operations.
    Normalized,
    /// A fresh response fully supersedes the cached one. Used for list
    /// operations (`patients`, `appointments`) where a server-side filter
    /// change must not leave stale rows behind.
    Replace,
}

/// When a binding consults the cache versus the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Serve cached data and stop; go to the network only on a miss.
    CacheFirst,
    /// Serve cached data immediately if present, then revalidate against
    /// the network and update (stale-while-revalidate). The default.
    #[default]
    CacheAndNetwork,
}

/// In-memory response cache shared by all bindings of one client.
#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<(String, String), Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached payload for an operation + variables pair, if any.
    pub fn lookup(&self, operation: &str, variables: &Value) -> Option<Value> {
        let key = (operation.to_string(), canonical(variables));
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(&key).cloned()
    }

    /// Merge a fresh successful response into the cache under the
    /// operation's policy and return the stored result.
    pub fn store(
        &self,
        operation: &str,
        variables: &Value,
        fresh: Value,
        policy: MergePolicy,
    ) -> Value {
        let key = (operation.to_string(), canonical(variables));
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let stored = match (policy, entries.remove(&key)) {
            (MergePolicy::Replace, _) | (MergePolicy::Normalized, None) => fresh,
            (MergePolicy::Normalized, Some(existing)) => deep_merge(existing, fresh),
        };

        entries.insert(key, stored.clone());
        stored
    }

    /// Drop every cached entry. Used on logout so one user's data never
    /// renders for the next.
    pub fn purge(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let dropped = entries.len();
        entries.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "Query cache purged");
        }
    }
}

fn canonical(variables: &Value) -> String {
    serde_json::to_string(variables).unwrap_or_else(|_| "null".to_string())
}

/// Field-by-field merge: objects recurse, everything else is replaced by
/// the incoming value.
fn deep_merge(existing: Value, fresh: Value) -> Value {
    match (existing, fresh) {
        (Value::Object(mut base), Value::Object(incoming)) => {
            for (field, value) in incoming {
                let merged = match base.remove(&field) {
                    Some(prior) => deep_merge(prior, value),
                    None => value,
                };
                base.insert(field, merged);
            }
            Value::Object(base)
        }
        (_, fresh) => fresh,
    }
}
