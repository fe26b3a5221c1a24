// Matching Engine
// Implements: skill normalization, TF-IDF similarity, skill matching, composite scoring,
// ranking, batch CV analysis and job recommendations.
// Everything below handlers is synchronous and I/O free except batch, which drives extraction.

pub mod batch;
pub mod composite;
pub mod handlers;
pub mod jobs;
pub mod normalize;
pub mod ranking;
pub mod semantic;
pub mod skills;
pub mod stop_words;
