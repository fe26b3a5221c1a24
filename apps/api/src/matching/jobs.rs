use crate::matching::composite::CandidateScorer;
use crate::matching::ranking::rank;
use crate::models::candidate::JobMatch;
use crate::models::job::{JobPosting, SeekerProfile};

/// Scores one profile against every posting and returns the postings best first.
/// A profile without skills scores 0 everywhere; ties keep the input order.
pub fn rank_jobs_for_profile(
    scorer: &dyn CandidateScorer,
    profile: &SeekerProfile,
    jobs: &[JobPosting],
) -> Vec<JobMatch> {
    let candidate_text = profile.candidate_text();

    let matches = jobs
        .iter()
        .map(|job| JobMatch {
            job_id: job.id.clone(),
            job_title: job.job_title.clone(),
            company_name: job.company_name.clone(),
            match_score: candidate_text
                .map(|text| scorer.score(text, &job.requirement()).total_score)
                .unwrap_or(0.0),
        })
        .collect();

    rank(matches)
}
