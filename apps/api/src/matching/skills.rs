use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::matching::normalize::{clean_text, SkillToken};

/// Found/missing split of the required skills. Both lists are de-duplicated and
/// keep first-occurrence order, so they behave as sets with a stable display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    pub found: Vec<SkillToken>,
    pub missing: Vec<SkillToken>,
}

impl SkillMatch {
    /// `|found| / |distinct required|`; 0 when nothing was required.
    pub fn fraction(&self) -> f64 {
        let total = self.found.len() + self.missing.len();
        if total == 0 {
            return 0.0;
        }
        self.found.len() as f64 / total as f64
    }
}

/// Builds the whole-word pattern for one normalized skill.
pub fn skill_pattern(skill: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\b{}\b", regex::escape(skill)))
}

/// Tests each required skill for a whole-word occurrence in the candidate text.
///
/// Multi-word skills only match as the exact space-joined phrase.
pub fn match_skills(
    candidate_text: &str,
    required: &[SkillToken],
) -> Result<SkillMatch, regex::Error> {
    let cleaned = clean_text(candidate_text);
    let mut result = SkillMatch::default();

    for skill in required {
        if skill.is_empty() || result.found.contains(skill) || result.missing.contains(skill) {
            continue;
        }
        if skill_pattern(skill)?.is_match(&cleaned) {
            result.found.push(skill.clone());
        } else {
            result.missing.push(skill.clone());
        }
    }

    Ok(result)
}
