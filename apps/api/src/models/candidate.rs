use serde::{Deserialize, Serialize};

use crate::matching::composite::MatchResult;

/// One scored upload. Lives only for the duration of a batch response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub identifier: String,
    pub analysis: MatchResult,
    pub text_preview: String,
}

/// An upload excluded from ranking, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedDocument {
    pub filename: String,
    pub code: String,
    pub reason: String,
}

/// One job scored against a seeker profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub match_score: f64,
}

/// First `max_chars` characters of the text, with `...` when truncated.
pub fn text_preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
