use crate::models::candidate::{CandidateScore, JobMatch};

/// Anything that can be ordered by a 0–100 score.
pub trait Scored {
    fn score(&self) -> f64;
}

impl Scored for CandidateScore {
    fn score(&self) -> f64 {
        self.analysis.total_score
    }
}

impl Scored for JobMatch {
    fn score(&self) -> f64 {
        self.match_score
    }
}

/// Sorts descending by score. The sort is stable: ties keep their input order.
pub fn rank<T: Scored>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| b.score().total_cmp(&a.score()));
    items
}

/// The top item of an already ranked sequence.
pub fn best<T>(ranked: &[T]) -> Option<&T> {
    ranked.first()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::composite::MatchResult;

    fn candidate(id: &str, total: f64) -> CandidateScore {
        CandidateScore {
            identifier: id.to_string(),
            analysis: MatchResult {
                total_score: total,
                ..MatchResult::default()
            },
            text_preview: String::new(),
        }
    }

    #[test]
    fn test_descending_and_stable_on_ties() {
        let ranked = rank(vec![
            candidate("a", 40.0),
            candidate("b", 90.0),
            candidate("c", 90.0),
            candidate("d", 10.0),
        ]);
        let scores: Vec<f64> = ranked.iter().map(Scored::score).collect();
        let ids: Vec<&str> = ranked.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(scores, vec![90.0, 90.0, 40.0, 10.0]);
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_best_candidate() {
        let ranked = rank(vec![candidate("low", 5.0), candidate("high", 75.5)]);
        assert_eq!(best(&ranked).map(|c| c.identifier.as_str()), Some("high"));
    }

    #[test]
    fn test_empty_batch_has_no_best() {
        let ranked: Vec<CandidateScore> = rank(vec![]);
        assert!(best(&ranked).is_none());
    }

    #[test]
    fn test_jobs_rank_with_same_rule() {
        let job = |id: &str, score: f64| JobMatch {
            job_id: id.to_string(),
            job_title: id.to_uppercase(),
            company_name: String::new(),
            match_score: score,
        };
        let ranked = rank(vec![job("x", 0.0), job("y", 55.0), job("z", 0.0)]);
        let ids: Vec<&str> = ranked.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["y", "x", "z"]);
    }
}
