// Tailoring: score every bullet/entry/keyword against a job description, sort, trim.
// Embeddings go through the relevance engine only; nothing here talks to a backend.

pub mod handlers;
pub mod keywords;
pub mod pipeline;
pub mod trim;

pub use pipeline::{compute_weighted_score, ScoringPipeline, ScoringWeights};
pub use trim::{trim, TrimLimits};
