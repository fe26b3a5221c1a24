use serde::{Deserialize, Serialize};

/// The two job fields the engine consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequirement {
    pub job_description: String,
    /// Comma-separated, as typed by the recruiter.
    pub required_skills: String,
}

/// A posting as supplied by the caller when ranking jobs for one profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    pub job_description: String,
    pub required_skills: String,
}

impl JobPosting {
    pub fn requirement(&self) -> JobRequirement {
        JobRequirement {
            job_description: self.job_description.clone(),
            required_skills: self.required_skills.clone(),
        }
    }
}

/// The parts of a job seeker's profile that feed scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeekerProfile {
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
}

impl SeekerProfile {
    /// Résumé text when present, otherwise the typed skills list.
    /// `None` means the profile has no skills and cannot be scored.
    pub fn candidate_text(&self) -> Option<&str> {
        let skills = self.skills.as_deref().filter(|s| !s.trim().is_empty())?;
        Some(
            self.resume_text
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(skills),
        )
    }
}
