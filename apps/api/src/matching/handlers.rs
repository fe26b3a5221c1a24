//! Axum route handlers for the Matching API.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::extraction::{sanitize_filename, RawDocument};
use crate::matching::batch::{analyze_batch, run_bounded, BatchError, BatchReport};
use crate::matching::composite::MatchResult;
use crate::matching::jobs::rank_jobs_for_profile;
use crate::models::candidate::{JobMatch, RejectedDocument};
use crate::models::job::{JobPosting, JobRequirement, SeekerProfile};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub candidate_text: String,
    pub job_description: String,
    #[serde(default)]
    pub required_skills: String,
}

#[derive(Debug, Deserialize)]
pub struct RankJobsRequest {
    pub profile: SeekerProfile,
    pub jobs: Vec<JobPosting>,
}

#[derive(Debug, Serialize)]
pub struct RankJobsResponse {
    pub jobs: Vec<JobMatch>,
    pub best_job: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub filename: String,
    pub text: String,
}

/// Text fields and files of a multipart upload form.
#[derive(Debug, Default)]
struct UploadForm {
    job_description: Option<String>,
    required_skills: Option<String>,
    documents: Vec<RawDocument>,
}

const FILE_FIELDS: &[&str] = &["cv_files", "resume_file"];

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => form.job_description = Some(field.text().await?),
            "required_skills" => form.required_skills = Some(field.text().await?),
            n if FILE_FIELDS.contains(&n) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty, unnamed part when no file was picked.
                if filename.is_empty() {
                    continue;
                }
                form.documents.push(RawDocument::new(filename, bytes));
            }
            _ => debug!(field = %name, "Ignoring unknown multipart field"),
        }
    }

    Ok(form)
}

fn require_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match/score
///
/// Scores one already-extracted candidate text against a job.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<MatchResult>, AppError> {
    let job = JobRequirement {
        job_description: request.job_description,
        required_skills: request.required_skills,
    };
    Ok(Json(state.scorer.score(&request.candidate_text, &job)))
}

/// POST /api/v1/match/analyze
///
/// Multipart: `job_description`, `required_skills`, and one or more `cv_files`.
/// Returns every readable CV ranked best first, plus the uploads that were skipped.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BatchReport>, AppError> {
    let form = read_upload_form(multipart).await?;
    let job = JobRequirement {
        job_description: require_text(form.job_description, "job_description")?,
        required_skills: require_text(form.required_skills, "required_skills")?,
    };

    info!(documents = form.documents.len(), "Analyzing CV batch");

    let report = analyze_batch(
        state.extractor.clone(),
        Arc::clone(&state.scorer),
        job,
        form.documents,
        Arc::clone(&state.extraction_limiter),
        state.batch_options(),
    )
    .await?;

    Ok(Json(report))
}

/// POST /api/v1/match/extract
///
/// Multipart `resume_file`: returns the text of the first upload that extracts cleanly.
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let form = read_upload_form(multipart).await?;
    let timeout = state.batch_options().timeout;
    let mut rejected = Vec::new();

    for document in form.documents {
        let filename = document.filename.clone();
        let extractor = state.extractor.clone();
        let outcome = run_bounded(&state.extraction_limiter, timeout, filename.clone(), move || {
            extractor.extract_upload(&document)
        })
        .await;

        match outcome {
            Ok(text) => {
                return Ok(Json(ExtractResponse {
                    filename: sanitize_filename(&filename),
                    text,
                }))
            }
            Err(e) => {
                warn!(%filename, code = e.code(), "Error processing resume: {e}");
                rejected.push(RejectedDocument {
                    filename,
                    code: e.code().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Err(BatchError::NoValidDocuments(rejected).into())
}

/// POST /api/v1/match/rank-jobs
///
/// Ranks job postings for one seeker profile, best match first.
pub async fn handle_rank_jobs(
    State(state): State<AppState>,
    Json(request): Json<RankJobsRequest>,
) -> Result<Json<RankJobsResponse>, AppError> {
    let jobs = rank_jobs_for_profile(state.scorer.as_ref(), &request.profile, &request.jobs);
    let best_job = jobs.first().map(|j| j.job_id.clone());
    Ok(Json(RankJobsResponse { jobs, best_job }))
}
