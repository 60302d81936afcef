//! Relevance engine — normalized semantic similarity between resume texts and a
//! job description.
//!
//! Texts are embedded in a single batch per call and memoized by exact string; the
//! target text is embedded fresh on every call. Cosine similarity in [-1, 1] is
//! mapped onto [0, 1] via `(cos + 1) / 2`.

pub mod cache;
pub mod embedder;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::resume::NEUTRAL_METRIC;

pub use cache::{CachePolicy, Embedding, EmbeddingCache};
pub use embedder::{Embedder, HashingEmbedder, HttpEmbedder};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed embedding response: {0}")]
    Malformed(String),
}

pub struct RelevanceEngine {
    embedder: Arc<dyn Embedder>,
    cache: EmbeddingCache,
    /// Held for a whole lookup-embed-insert pass so concurrent callers never embed
    /// the same text twice.
    fill_lock: Mutex<()>,
}

impl RelevanceEngine {
    pub fn new(embedder: Arc<dyn Embedder>, policy: CachePolicy) -> Self {
        Self {
            embedder,
            cache: EmbeddingCache::new(policy),
            fill_lock: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// Similarity of each text to `target`, in [0, 1], same length and order as `texts`.
    ///
    /// Empty `texts` → empty result. A `target` that is empty or whitespace-only
    /// counts as absent: 0.5 for every text, and the embedder is not called.
    pub async fn similarities(
        &self,
        texts: &[String],
        target: &str,
    ) -> Result<Vec<f64>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if target.trim().is_empty() {
            return Ok(vec![NEUTRAL_METRIC; texts.len()]);
        }

        let text_vectors = self.embed_cached(texts).await?;

        let mut target_vectors = self.embedder.encode(&[target.to_string()]).await?;
        if target_vectors.len() != 1 {
            return Err(EmbeddingError::Malformed(format!(
                "expected 1 target embedding, received {}",
                target_vectors.len()
            )));
        }
        let target_vector = target_vectors.remove(0);

        if let Some(bad) = text_vectors.iter().find(|v| v.len() != target_vector.len()) {
            return Err(EmbeddingError::Malformed(format!(
                "dimension mismatch: text embedding has {} dims, target has {}",
                bad.len(),
                target_vector.len()
            )));
        }

        let queries: Vec<&[f32]> = text_vectors.iter().map(|v| &v[..]).collect();
        let matrix = self
            .embedder
            .similarity(&queries, &[target_vector.as_slice()]);

        matrix
            .into_iter()
            .map(|row| {
                row.first()
                    .map(|cos| ((cos + 1.0) / 2.0).clamp(0.0, 1.0))
                    .ok_or_else(|| EmbeddingError::Malformed("empty similarity row".to_string()))
            })
            .collect()
    }

    /// Embeddings for `texts`, embedding only the distinct texts not already cached,
    /// in one batch.
    async fn embed_cached(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let _guard = self.fill_lock.lock().await;

        let mut resolved: HashMap<String, Embedding> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut missing: Vec<String> = Vec::new();

        for text in texts {
            if !seen.insert(text.as_str()) {
                continue;
            }
            match self.cache.get(text) {
                Some(embedding) => {
                    resolved.insert(text.clone(), embedding);
                }
                None => missing.push(text.clone()),
            }
        }

        debug!(
            "Embedding cache: {} hits, {} misses ({} texts requested)",
            resolved.len(),
            missing.len(),
            texts.len()
        );

        if !missing.is_empty() {
            let vectors = self.embedder.encode(&missing).await?;
            if vectors.len() != missing.len() {
                return Err(EmbeddingError::Malformed(format!(
                    "requested {} embeddings, received {}",
                    missing.len(),
                    vectors.len()
                )));
            }
            for (text, vector) in missing.into_iter().zip(vectors) {
                let embedding: Embedding = Arc::from(vector);
                self.cache.insert(text.clone(), embedding.clone());
                resolved.insert(text, embedding);
            }
        }

        texts
            .iter()
            .map(|t| {
                resolved
                    .get(t)
                    .cloned()
                    .ok_or_else(|| EmbeddingError::Malformed(format!("no embedding for '{t}'")))
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embedder returning fixed vectors per text (default `[0, 1]`) and counting work.
    #[derive(Default)]
    pub(crate) struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        pub calls: AtomicUsize,
        pub texts_encoded: AtomicUsize,
    }

    impl StubEmbedder {
        pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
            self.vectors.insert(text.to_string(), vector);
            self
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts_encoded.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| self.vectors.get(t).cloned().unwrap_or_else(|| vec![0.0, 1.0]))
                .collect())
        }
    }

    pub(crate) struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Unavailable("model not loaded".to_string()))
        }
    }

    struct ShortEmbedder;

    #[async_trait]
    impl Embedder for ShortEmbedder {
        async fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn engine(stub: &Arc<StubEmbedder>) -> RelevanceEngine {
        RelevanceEngine::new(stub.clone(), CachePolicy::Unbounded)
    }

    #[tokio::test]
    async fn test_empty_texts_returns_empty_without_embedding() {
        let stub = Arc::new(StubEmbedder::default());
        let sims = engine(&stub).similarities(&[], "Rust engineer").await.unwrap();
        assert!(sims.is_empty());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_target_returns_neutral_scores() {
        let stub = Arc::new(StubEmbedder::default());
        let engine = engine(&stub);
        let texts = strings(&["a", "b", "c"]);
        assert_eq!(engine.similarities(&texts, "").await.unwrap(), vec![0.5; 3]);
        assert_eq!(engine.similarities(&texts, "   ").await.unwrap(), vec![0.5; 3]);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cosine_is_normalized_to_unit_interval() {
        let stub = Arc::new(
            StubEmbedder::default()
                .with("job", vec![1.0, 0.0])
                .with("same", vec![2.0, 0.0])
                .with("opposite", vec![-1.0, 0.0])
                .with("orthogonal", vec![0.0, 5.0]),
        );
        let sims = engine(&stub)
            .similarities(&strings(&["same", "opposite", "orthogonal"]), "job")
            .await
            .unwrap();
        assert!((sims[0] - 1.0).abs() < 1e-9);
        assert!(sims[1].abs() < 1e-9);
        assert!((sims[2] - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_texts_are_embedded_once_across_calls() {
        let stub = Arc::new(StubEmbedder::default());
        let engine = engine(&stub);
        let texts = strings(&["a", "b", "a"]);

        engine.similarities(&texts, "job").await.unwrap();
        // 2 distinct texts + 1 target
        assert_eq!(stub.texts_encoded.load(Ordering::SeqCst), 3);

        engine.similarities(&texts, "job").await.unwrap();
        // cache hits for a/b; the target is re-embedded
        assert_eq!(stub.texts_encoded.load(Ordering::SeqCst), 4);
        assert_eq!(engine.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_misses_are_batched_into_one_call() {
        let stub = Arc::new(StubEmbedder::default());
        let engine = engine(&stub);
        engine
            .similarities(&strings(&["a", "b", "c", "d"]), "job")
            .await
            .unwrap();
        // one batch for the texts, one for the target
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_target_is_never_cached() {
        let stub = Arc::new(StubEmbedder::default());
        let engine = engine(&stub);
        engine.similarities(&strings(&["a"]), "job").await.unwrap();
        assert!(engine.cache().get("job").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_callers_do_not_duplicate_embeddings() {
        let stub = Arc::new(StubEmbedder::default());
        let engine = engine(&stub);
        let texts = strings(&["x", "y"]);
        let (a, b) = tokio::join!(
            engine.similarities(&texts, "job"),
            engine.similarities(&texts, "job")
        );
        assert_eq!(a.unwrap(), b.unwrap());
        // 2 texts once + 2 targets
        assert_eq!(stub.texts_encoded.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_embedder_failure_propagates_and_caches_nothing() {
        let engine = RelevanceEngine::new(Arc::new(FailingEmbedder), CachePolicy::Unbounded);
        let err = engine
            .similarities(&strings(&["a"]), "job")
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Unavailable(_)));
        assert!(engine.cache().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_batch_size_is_malformed() {
        let engine = RelevanceEngine::new(Arc::new(ShortEmbedder), CachePolicy::Unbounded);
        let err = engine
            .similarities(&strings(&["a", "b"]), "job")
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_bounded_cache_still_answers_every_text() {
        let stub = Arc::new(StubEmbedder::default());
        let engine = RelevanceEngine::new(stub.clone(), CachePolicy::Lru { capacity: 2 });
        let texts: Vec<String> = (0..10).map(|i| format!("text {i}")).collect();
        let sims = engine.similarities(&texts, "job").await.unwrap();
        assert_eq!(sims.len(), 10);
        assert!(engine.cache().len() <= 2);
    }
}
