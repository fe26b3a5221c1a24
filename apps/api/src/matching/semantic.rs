//! Semantic similarity: TF-IDF over the two-document corpus `{job, candidate}`.
//!
//! Algorithm `tfidf-v1` (parameters are pinned; scores must be reproducible):
//! - tokens: `\b\w\w+\b` on lowercased, punctuation-stripped text
//! - English stop words removed (see `stop_words.rs`)
//! - min_df = 1, raw term counts
//! - smooth idf: `ln((1 + n) / (1 + df)) + 1`
//! - L2-normalized rows, cosine similarity
//!
//! The vocabulary is a `BTreeMap` so feature order, and therefore every floating
//! point sum, is identical across runs.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::normalize::clean_text;
use crate::matching::stop_words::is_stop_word;

pub const ALGORITHM_VERSION: &str = "tfidf-v1";

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Why a semantic score fell back to zero without measuring anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringDegraded {
    /// One of the texts was blank after cleaning.
    EmptyText,
    /// Nothing survived tokenization and stop-word removal.
    EmptyVocabulary,
    /// The composite scorer hit an internal failure and zeroed the whole result.
    Internal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VectorizeError {
    #[error("empty vocabulary; perhaps the documents only contain stop words")]
    EmptyVocabulary,
}

/// Result of a similarity measurement. A degraded result is a zero with a reason.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Similarity {
    /// Cosine similarity in [0, 1].
    Score(f64),
    Degraded(ScoringDegraded),
}

impl Similarity {
    pub fn fraction(&self) -> f64 {
        match self {
            Similarity::Score(v) => *v,
            Similarity::Degraded(_) => 0.0,
        }
    }

    pub fn degraded(&self) -> Option<ScoringDegraded> {
        match self {
            Similarity::Score(_) => None,
            Similarity::Degraded(reason) => Some(*reason),
        }
    }
}

/// TF-IDF vectorizer fitted on a small corpus.
#[derive(Debug, Default)]
pub struct TfIdfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
        TOKEN
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|t| !is_stop_word(t))
    }

    /// Learns the vocabulary and idf weights, then returns one L2-normalized row per document.
    pub fn fit_transform(&mut self, documents: &[&str]) -> Result<Vec<Vec<f64>>, VectorizeError> {
        let counts: Vec<BTreeMap<String, f64>> = documents
            .iter()
            .map(|doc| {
                let lowered = doc.to_lowercase();
                let mut tf = BTreeMap::new();
                for token in Self::tokenize(&lowered) {
                    *tf.entry(token.to_string()).or_insert(0.0) += 1.0;
                }
                tf
            })
            .collect();

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for tf in &counts {
            for term in tf.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        if document_frequency.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let n = documents.len() as f64;
        self.vocabulary = document_frequency
            .keys()
            .enumerate()
            .map(|(i, term)| (term.to_string(), i))
            .collect();
        self.idf = document_frequency
            .values()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Ok(counts
            .iter()
            .map(|tf| {
                let mut row = vec![0.0; self.idf.len()];
                for (term, count) in tf {
                    if let Some(&idx) = self.vocabulary.get(term) {
                        row[idx] = count * self.idf[idx];
                    }
                }
                l2_normalize(&mut row);
                row
            })
            .collect())
    }

    #[allow(dead_code)]
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Cosine of the angle between two equal-length vectors; 0 when either is all zeros.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Measures job/candidate similarity, reporting why when no signal was available.
pub fn semantic_similarity(job_text: &str, candidate_text: &str) -> Similarity {
    let job_clean = clean_text(job_text);
    let candidate_clean = clean_text(candidate_text);

    if job_clean.trim().is_empty() || candidate_clean.trim().is_empty() {
        return Similarity::Degraded(ScoringDegraded::EmptyText);
    }

    let mut vectorizer = TfIdfVectorizer::default();
    match vectorizer.fit_transform(&[job_clean.as_str(), candidate_clean.as_str()]) {
        Ok(rows) => Similarity::Score(cosine_similarity(&rows[0], &rows[1]).clamp(0.0, 1.0)),
        Err(VectorizeError::EmptyVocabulary) => {
            Similarity::Degraded(ScoringDegraded::EmptyVocabulary)
        }
    }
}

/// Similarity as a 0–100 percentage rounded to 2 decimals.
#[allow(dead_code)]
pub fn semantic_score(job_text: &str, candidate_text: &str) -> f64 {
    round2(semantic_similarity(job_text, candidate_text).fraction() * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_score_100() {
        let text = "Senior Python developer building SQL data pipelines";
        assert_eq!(semantic_score(text, text), 100.0);
    }

    #[test]
    fn test_disjoint_texts_score_0() {
        let sim = semantic_similarity("python developer", "pastry chef baking");
        assert_eq!(sim, Similarity::Score(0.0));
    }

    #[test]
    fn test_empty_text_is_degraded_not_genuine_zero() {
        assert_eq!(
            semantic_similarity("", "python developer"),
            Similarity::Degraded(ScoringDegraded::EmptyText)
        );
        assert_eq!(
            semantic_similarity("python developer", "  ...  "),
            Similarity::Degraded(ScoringDegraded::EmptyText)
        );
        assert_eq!(semantic_score("", "python"), 0.0);
    }

    #[test]
    fn test_stop_words_only_is_empty_vocabulary() {
        assert_eq!(
            semantic_similarity("the and of", "with which a"),
            Similarity::Degraded(ScoringDegraded::EmptyVocabulary)
        );
    }

    #[test]
    fn test_known_value_for_partial_overlap() {
        // job: {python, developer}, candidate: {python, chef}
        // idf(shared) = 1, idf(unique) = ln(3/2) + 1
        // cos = 1 / (1 + u^2) with u = ln(1.5) + 1
        let u = 1.5_f64.ln() + 1.0;
        let expected = 1.0 / (1.0 + u * u);
        match semantic_similarity("Python developer", "python chef") {
            Similarity::Score(v) => assert!((v - expected).abs() < 1e-12, "got {v}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_punctuation_insensitive() {
        assert_eq!(
            semantic_score("python, sql; docker!", "docker sql python"),
            semantic_score("python sql docker", "docker sql python"),
        );
    }

    #[test]
    fn test_single_char_tokens_ignored() {
        let mut v = TfIdfVectorizer::default();
        v.fit_transform(&["c r rust"]).unwrap();
        assert_eq!(v.vocabulary().collect::<Vec<_>>(), vec!["rust"]);
    }

    #[test]
    fn test_only_single_char_tokens_is_empty_vocabulary() {
        let mut v = TfIdfVectorizer::default();
        assert!(matches!(
            v.fit_transform(&["a b c", "x y z"]),
            Err(VectorizeError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_deterministic_across_runs() {
        let job = "Backend engineer: Rust, Kafka, Postgres, distributed systems, on-call";
        let cv = "Built Kafka consumers in Rust; tuned Postgres; mentored engineers";
        let first = semantic_score(job, cv);
        for _ in 0..20 {
            assert_eq!(semantic_score(job, cv), first);
        }
        assert!(first > 0.0 && first < 100.0);
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let mut v = TfIdfVectorizer::default();
        v.fit_transform(&["zebra apple", "mango"]).unwrap();
        assert_eq!(v.vocabulary().collect::<Vec<_>>(), vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(0.0), 0.0);
    }
}
