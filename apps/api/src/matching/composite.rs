//! Composite scoring: merges semantic similarity and skill coverage into one
//! bounded score with explain output.
//!
//! Default backend: `TfIdfSkillScorer` (pure, deterministic, no I/O).
//! `AppState` holds an `Arc<dyn CandidateScorer>` so handlers never name the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::matching::normalize::parse_required_skills;
use crate::matching::semantic::{round2, semantic_similarity, ScoringDegraded};
use crate::matching::skills::match_skills;
use crate::models::job::JobRequirement;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub semantic: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.6,
            semantic: 0.4,
        }
    }
}

/// Weighted sum of two fractions in [0, 1], as a 0–100 percentage.
pub fn compute_total_score(skills_fraction: f64, semantic_fraction: f64, weights: &ScoringWeights) -> f64 {
    ((weights.skills * skills_fraction + weights.semantic * semantic_fraction) * 100.0)
        .clamp(0.0, 100.0)
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("could not build skill pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Score of one candidate text against one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub total_score: f64,
    pub jd_match: f64,
    pub skills_match: f64,
    pub found_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// Set when a sub-score is a fallback zero rather than a measured one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<ScoringDegraded>,
}

impl MatchResult {
    /// The all-zero result used when scoring fails internally.
    pub fn zeroed() -> Self {
        Self {
            degraded: Some(ScoringDegraded::Internal),
            ..Self::default()
        }
    }

    pub fn found_skills_display(&self) -> String {
        self.found_skills.join(", ")
    }

    pub fn missing_skills_display(&self) -> String {
        self.missing_skills.join(", ")
    }
}

/// The candidate scorer trait. Implement this to swap backends without touching
/// the batch pipeline or handlers.
pub trait CandidateScorer: Send + Sync {
    /// Never fails: internal errors degrade to `MatchResult::zeroed()`.
    fn score(&self, candidate_text: &str, job: &JobRequirement) -> MatchResult;

    fn backend(&self) -> &'static str;
}

/// TF-IDF similarity (`semantic`) plus whole-word skill coverage (`skills`).
#[derive(Debug, Clone, Default)]
pub struct TfIdfSkillScorer {
    pub weights: ScoringWeights,
}

impl CandidateScorer for TfIdfSkillScorer {
    fn score(&self, candidate_text: &str, job: &JobRequirement) -> MatchResult {
        match compute_match(candidate_text, &job.job_description, &job.required_skills, &self.weights) {
            Ok(result) => result,
            Err(e) => {
                warn!("Match calculation error, scoring as zero: {e}");
                MatchResult::zeroed()
            }
        }
    }

    fn backend(&self) -> &'static str {
        "tfidf-skills"
    }
}

/// Scores with default weights. Convenience entry point for callers without state.
#[allow(dead_code)]
pub fn score(candidate_text: &str, job_description: &str, required_skills_raw: &str) -> MatchResult {
    TfIdfSkillScorer::default().score(
        candidate_text,
        &JobRequirement {
            job_description: job_description.to_string(),
            required_skills: required_skills_raw.to_string(),
        },
    )
}

fn compute_match(
    candidate_text: &str,
    job_description: &str,
    required_skills_raw: &str,
    weights: &ScoringWeights,
) -> Result<MatchResult, ScoringError> {
    let required = parse_required_skills(required_skills_raw);

    let similarity = semantic_similarity(job_description, candidate_text);
    if let Some(reason) = similarity.degraded() {
        debug!(?reason, "Semantic score degraded to zero");
    }
    let skill_match = match_skills(candidate_text, &required)?;

    let jd_fraction = similarity.fraction();
    let skills_fraction = skill_match.fraction();

    Ok(MatchResult {
        total_score: round2(compute_total_score(skills_fraction, jd_fraction, weights)),
        jd_match: round2(jd_fraction * 100.0),
        skills_match: round2(skills_fraction * 100.0),
        found_skills: skill_match.found,
        missing_skills: skill_match.missing,
        degraded: similarity.degraded(),
    })
}
