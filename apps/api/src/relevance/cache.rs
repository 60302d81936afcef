//! Per-text embedding memo with an injectable eviction policy.
//!
//! `Unbounded` grows monotonically for the process lifetime (one entry per distinct
//! text ever embedded). `Lru` caps the entry count with least-recently-used
//! eviction and no admission filter, so a newly embedded text is always kept;
//! evicted texts are simply re-embedded on their next appearance.

use std::collections::HashMap;
use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use parking_lot::RwLock;

/// Shared, immutable embedding vector.
pub type Embedding = Arc<[f32]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Unbounded,
    Lru { capacity: u64 },
}

impl CachePolicy {
    /// `0` means unbounded.
    pub fn from_capacity(capacity: u64) -> Self {
        if capacity == 0 {
            CachePolicy::Unbounded
        } else {
            CachePolicy::Lru { capacity }
        }
    }
}

enum Store {
    Unbounded(RwLock<HashMap<String, Embedding>>),
    Bounded(Cache<String, Embedding>),
}

/// Embedding cache keyed by the exact text. Individual operations are thread-safe;
/// the relevance engine serializes whole lookup-or-insert passes on top of this.
pub struct EmbeddingCache {
    policy: CachePolicy,
    store: Store,
}

impl EmbeddingCache {
    pub fn new(policy: CachePolicy) -> Self {
        let store = match policy {
            CachePolicy::Unbounded => Store::Unbounded(RwLock::new(HashMap::new())),
            CachePolicy::Lru { capacity } => {
                Store::Bounded(
                    Cache::builder()
                        .max_capacity(capacity)
                        .eviction_policy(EvictionPolicy::lru())
                        .build(),
                )
            }
        };
        Self { policy, store }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn get(&self, text: &str) -> Option<Embedding> {
        match &self.store {
            Store::Unbounded(map) => map.read().get(text).cloned(),
            Store::Bounded(cache) => cache.get(text),
        }
    }

    pub fn insert(&self, text: String, embedding: Embedding) {
        match &self.store {
            Store::Unbounded(map) => {
                map.write().insert(text, embedding);
            }
            Store::Bounded(cache) => cache.insert(text, embedding),
        }
    }

    /// Number of cached texts. For the bounded store, pending evictions are applied first.
    pub fn len(&self) -> u64 {
        match &self.store {
            Store::Unbounded(map) => map.read().len() as u64,
            Store::Bounded(cache) => {
                cache.run_pending_tasks();
                cache.entry_count()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(x: f32) -> Embedding {
        Arc::from(vec![x, 1.0 - x])
    }

    #[test]
    fn test_policy_from_capacity() {
        assert_eq!(CachePolicy::from_capacity(0), CachePolicy::Unbounded);
        assert_eq!(
            CachePolicy::from_capacity(64),
            CachePolicy::Lru { capacity: 64 }
        );
    }

    #[test]
    fn test_unbounded_keeps_every_entry() {
        let cache = EmbeddingCache::new(CachePolicy::Unbounded);
        for i in 0..500 {
            cache.insert(format!("text {i}"), vector(0.1));
        }
        assert_eq!(cache.len(), 500);
        assert!(cache.get("text 0").is_some());
    }

    #[test]
    fn test_lookup_is_exact_string() {
        let cache = EmbeddingCache::new(CachePolicy::Unbounded);
        cache.insert("Rust".to_string(), vector(0.3));
        assert!(cache.get("Rust").is_some());
        assert!(cache.get("rust").is_none());
        assert!(cache.get("Rust ").is_none());
    }

    #[test]
    fn test_bounded_never_exceeds_capacity() {
        let cache = EmbeddingCache::new(CachePolicy::Lru { capacity: 16 });
        for i in 0..200 {
            cache.insert(format!("text {i}"), vector(0.5));
        }
        assert!(cache.len() <= 16, "len was {}", cache.len());
    }

    #[test]
    fn test_bounded_admits_new_text_over_hot_entries() {
        let cache = EmbeddingCache::new(CachePolicy::Lru { capacity: 2 });
        cache.insert("a".to_string(), vector(0.1));
        cache.insert("b".to_string(), vector(0.2));
        for _ in 0..20 {
            assert!(cache.get("a").is_some());
        }
        for _ in 0..20 {
            assert!(cache.get("b").is_some());
        }

        cache.insert("c".to_string(), vector(0.3));
        assert!(cache.len() <= 2);
        assert!(cache.get("c").is_some(), "newest text must be retained");
    }

    #[test]
    fn test_bounded_returns_inserted_value() {
        let cache = EmbeddingCache::new(CachePolicy::Lru { capacity: 4 });
        cache.insert("a".to_string(), vector(0.25));
        assert_eq!(cache.get("a").as_deref(), Some(&[0.25_f32, 0.75][..]));
        assert!(!cache.is_empty());
    }
}
