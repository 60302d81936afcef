//! Scoring pipeline — scores every bullet, entry and keyword of a resume against a
//! job description, then sorts each level by score.
//!
//! Order of operations (later steps read fields set by earlier ones):
//! 1. collect bullets: experience, projects, volunteer
//! 2. one batched similarity call → `bullet.similarity`
//! 3. `bullet.score = sim * w_sim + imp * w_imp` (absent operands count as 0.5)
//! 4. per entry: mean similarity / impressiveness, weighted score, sort bullets
//! 5. sort each section's entries
//! 6. keyword score: 1.0 on case-insensitive whole-word hit, else 0.0
//! 7. sort technologies and languages
//!
//! All sorts are descending and stable.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::TailorError;
use crate::models::resume::{BulletGroup, Metrics, Resume, NEUTRAL_METRIC};
use crate::relevance::RelevanceEngine;
use crate::tailoring::keywords::keyword_score;
use crate::tailoring::trim::{trim, TrimLimits};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub similarity: f64,
    pub impressiveness: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity: 0.4,
            impressiveness: 0.6,
        }
    }
}

impl ScoringWeights {
    pub fn new(similarity: f64, impressiveness: f64) -> Result<Self, TailorError> {
        for (name, value) in [("similarity", similarity), ("impressiveness", impressiveness)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TailorError::InvalidArgument(format!(
                    "{name} weight must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(Self {
            similarity,
            impressiveness,
        })
    }
}

/// Weighted score of a metric set: `sim * w_sim + imp * w_imp`, absent values as 0.5.
pub fn compute_weighted_score(metrics: &Metrics, weights: &ScoringWeights) -> f64 {
    metrics.similarity.unwrap_or(NEUTRAL_METRIC) * weights.similarity
        + metrics.impressiveness.unwrap_or(NEUTRAL_METRIC) * weights.impressiveness
}

pub struct ScoringPipeline {
    engine: Arc<RelevanceEngine>,
    weights: ScoringWeights,
}

impl ScoringPipeline {
    pub fn new(engine: Arc<RelevanceEngine>, weights: ScoringWeights) -> Self {
        Self { engine, weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Scores, sorts and trims `resume` in place.
    ///
    /// If the embedding call fails the resume is left exactly as it was passed in.
    pub async fn tailor(
        &self,
        resume: &mut Resume,
        job_description: &str,
        limits: &TrimLimits,
    ) -> Result<(), TailorError> {
        self.score(resume, job_description).await?;
        trim(resume, limits);

        info!(
            "Tailored resume: {} experience, {} projects, {} volunteer, {} technologies, {} languages",
            resume.experience.len(),
            resume.projects.len(),
            resume.volunteer.len(),
            resume.technologies.len(),
            resume.languages.len()
        );
        Ok(())
    }

    /// Runs scoring and sorting without trimming.
    pub async fn score(&self, resume: &mut Resume, job_description: &str) -> Result<(), TailorError> {
        // Steps 1–2: nothing is written until the similarity call has succeeded.
        let texts: Vec<String> = resume.bullets().map(|b| b.text.clone()).collect();
        let similarities = self.engine.similarities(&texts, job_description).await?;
        debug!("Scored {} bullets against job description", texts.len());

        // Step 3
        for (bullet, similarity) in resume.bullets_mut().zip(similarities) {
            bullet.metrics.similarity = Some(similarity);
            bullet.metrics.score = Some(compute_weighted_score(&bullet.metrics, &self.weights));
        }

        // Steps 4–5
        score_entries(&mut resume.experience, &self.weights);
        score_entries(&mut resume.projects, &self.weights);
        score_entries(&mut resume.volunteer, &self.weights);

        // Steps 6–7
        for keyword in resume.keywords_mut() {
            let score = keyword_score(keyword.text(), job_description);
            keyword.set_score(score);
        }
        sort_descending(&mut resume.technologies, |k| k.score());
        sort_descending(&mut resume.languages, |k| k.score());

        Ok(())
    }
}

fn score_entries<G: BulletGroup>(entries: &mut [G], weights: &ScoringWeights) {
    for entry in entries.iter_mut() {
        let similarity = entry.mean_similarity();
        let impressiveness = entry.mean_impressiveness();
        let metrics = entry.metrics_mut();
        metrics.similarity = Some(similarity);
        metrics.impressiveness = Some(impressiveness);
        metrics.score = Some(compute_weighted_score(metrics, weights));

        sort_descending(entry.bullets_mut(), |b| b.metrics.score);
    }
    sort_descending(entries, |e| e.metrics().score);
}

/// Stable sort, highest score first; unset scores sort as 0.
fn sort_descending<T>(items: &mut [T], score: impl Fn(&T) -> Option<f64>) {
    items.sort_by(|a, b| {
        score(b)
            .unwrap_or(0.0)
            .total_cmp(&score(a).unwrap_or(0.0))
    });
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
