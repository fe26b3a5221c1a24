use once_cell::sync::Lazy;
use regex::Regex;

static NON_SKILL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// A normalized skill: lowercase, only word characters, hyphens and single spaces.
pub type SkillToken = String;

/// Canonicalizes a skill string into a comparable token. Idempotent.
pub fn normalize(raw: &str) -> SkillToken {
    let lowered = raw.to_lowercase();
    let stripped = NON_SKILL_CHARS.replace_all(&lowered, "");
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Splits a comma-separated skills string into normalized tokens.
/// Blank entries are dropped; duplicates are kept.
pub fn parse_required_skills(raw: &str) -> Vec<SkillToken> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lowercases and turns every punctuation character into a space.
/// Shared by the semantic scorer and the skill matcher.
pub fn clean_text(text: &str) -> String {
    PUNCTUATION.replace_all(&text.to_lowercase(), " ").into_owned()
}
