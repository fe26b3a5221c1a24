//! Batch analysis: extracts, scores and ranks every upload for one job.
//!
//! Each document runs on the blocking pool behind a shared semaphore, with a
//! per-document timeout. A failing document becomes a `RejectedDocument`; the
//! batch only fails when nothing could be scored.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::extraction::{sanitize_filename, ExtractionError, RawDocument, TextExtractor};
use crate::matching::composite::CandidateScorer;
use crate::matching::ranking::{best, rank};
use crate::models::candidate::{text_preview, CandidateScore, RejectedDocument};
use crate::models::job::JobRequirement;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub timeout: Duration,
    pub preview_chars: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            preview_chars: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub scorer_backend: String,
    /// Ranked, best first.
    pub candidates: Vec<CandidateScore>,
    /// Identifier of the top candidate.
    pub best_candidate: Option<String>,
    pub rejected: Vec<RejectedDocument>,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No valid CVs processed. Please upload PDF or DOCX files.")]
    NoValidDocuments(Vec<RejectedDocument>),
}

/// Extracts and scores one upload. Synchronous; run it off the async executor.
pub fn process_document(
    extractor: &TextExtractor,
    scorer: &dyn CandidateScorer,
    job: &JobRequirement,
    document: &RawDocument,
    identifier: String,
    preview_chars: usize,
) -> Result<CandidateScore, ExtractionError> {
    let text = extractor.extract_upload(document)?;
    let analysis = scorer.score(&text, job);
    debug!(
        %identifier,
        total = analysis.total_score,
        found = %analysis.found_skills_display(),
        missing = %analysis.missing_skills_display(),
        "Scored candidate"
    );
    Ok(CandidateScore {
        identifier,
        analysis,
        text_preview: text_preview(&text, preview_chars),
    })
}

/// Display identifier for an upload, falling back to its position in the batch.
pub fn candidate_identifier(filename: &str, index: usize) -> String {
    let sanitized = sanitize_filename(filename);
    if sanitized.is_empty() {
        format!("document-{}", index + 1)
    } else {
        sanitized
    }
}

/// Identifiers for a whole upload, unique within the batch.
///
/// A repeated name gets its 1-based upload position appended to the stem
/// (`cv.pdf`, `cv-2.pdf`).
pub fn candidate_identifiers<'a>(filenames: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken = HashSet::new();
    filenames
        .into_iter()
        .enumerate()
        .map(|(index, filename)| {
            let base = candidate_identifier(filename, index);
            let mut identifier = base.clone();
            let mut n = index + 1;
            while !taken.insert(identifier.clone()) {
                identifier = with_suffix(&base, n);
                n += 1;
            }
            identifier
        })
        .collect()
}

fn with_suffix(identifier: &str, n: usize) -> String {
    match identifier.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{n}.{ext}"),
        _ => format!("{identifier}-{n}"),
    }
}

pub async fn analyze_batch(
    extractor: TextExtractor,
    scorer: Arc<dyn CandidateScorer>,
    job: JobRequirement,
    documents: Vec<RawDocument>,
    limiter: Arc<Semaphore>,
    options: BatchOptions,
) -> Result<BatchReport, BatchError> {
    let job = Arc::new(job);
    let total = documents.len();
    let identifiers = candidate_identifiers(documents.iter().map(|d| d.filename.as_str()));

    let handles: Vec<_> = documents
        .into_iter()
        .zip(identifiers)
        .map(|(document, identifier)| {
            let filename = document.filename.clone();
            let handle = tokio::spawn(run_one(
                extractor.clone(),
                Arc::clone(&scorer),
                Arc::clone(&job),
                document,
                identifier,
                Arc::clone(&limiter),
                options.clone(),
            ));
            (filename, handle)
        })
        .collect();

    // Awaiting in upload order keeps ranking ties in upload order.
    let mut outcomes = Vec::with_capacity(total);
    for (filename, handle) in handles {
        let outcome = handle.await.unwrap_or_else(|e| {
            Err(ExtractionError::ExtractionFailed {
                filename: filename.clone(),
                cause: format!("worker failed: {e}"),
            })
        });
        outcomes.push((filename, outcome));
    }

    assemble_report(outcomes, scorer.backend())
}

async fn run_one(
    extractor: TextExtractor,
    scorer: Arc<dyn CandidateScorer>,
    job: Arc<JobRequirement>,
    document: RawDocument,
    identifier: String,
    limiter: Arc<Semaphore>,
    options: BatchOptions,
) -> Result<CandidateScore, ExtractionError> {
    let filename = document.filename.clone();
    run_bounded(&limiter, options.timeout, filename, move || {
        process_document(
            &extractor,
            scorer.as_ref(),
            &job,
            &document,
            identifier,
            options.preview_chars,
        )
    })
    .await
}

/// Runs blocking document work under the shared limit and a timeout.
///
/// The permit travels with the blocking work, so an abandoned (timed out)
/// parse still counts against the limit until it really finishes.
pub async fn run_bounded<T, F>(
    limiter: &Arc<Semaphore>,
    timeout: Duration,
    filename: String,
    work: F,
) -> Result<T, ExtractionError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ExtractionError> + Send + 'static,
{
    let permit = Arc::clone(limiter).acquire_owned().await.map_err(|_| {
        ExtractionError::ExtractionFailed {
            filename: filename.clone(),
            cause: "extraction pool is shut down".to_string(),
        }
    })?;

    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    });

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => Err(ExtractionError::ExtractionFailed {
            filename,
            cause: format!("worker failed: {e}"),
        }),
        Err(_) => Err(ExtractionError::TimedOut {
            filename,
            secs: timeout.as_secs(),
        }),
    }
}

/// Splits per-document outcomes into ranked candidates and rejections.
pub fn assemble_report(
    outcomes: Vec<(String, Result<CandidateScore, ExtractionError>)>,
    scorer_backend: &str,
) -> Result<BatchReport, BatchError> {
    let mut scored = Vec::new();
    let mut rejected = Vec::new();

    for (filename, outcome) in outcomes {
        match outcome {
            Ok(candidate) => scored.push(candidate),
            Err(e) => {
                warn!(%filename, code = e.code(), "Error processing {filename}: {e}");
                rejected.push(RejectedDocument {
                    filename,
                    code: e.code().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if scored.is_empty() {
        return Err(BatchError::NoValidDocuments(rejected));
    }

    let candidates = rank(scored);
    let best_candidate = best(&candidates).map(|c| c.identifier.clone());

    info!(
        processed = candidates.len(),
        rejected = rejected.len(),
        best = ?best_candidate,
        "Batch analysis complete"
    );

    Ok(BatchReport {
        batch_id: Uuid::new_v4(),
        analyzed_at: Utc::now(),
        scorer_backend: scorer_backend.to_string(),
        candidates,
        best_candidate,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::docx::fixtures::docx_from_paragraphs;
    use crate::matching::composite::{MatchResult, TfIdfSkillScorer};
    use tempfile::TempDir;

    fn job() -> JobRequirement {
        JobRequirement {
            job_description: "Backend developer with Python, SQL and Docker".to_string(),
            required_skills: "Python, SQL, Docker".to_string(),
        }
    }

    async fn run(dir: &TempDir, documents: Vec<RawDocument>) -> Result<BatchReport, BatchError> {
        analyze_batch(
            TextExtractor::new(dir.path()),
            Arc::new(TfIdfSkillScorer::default()),
            job(),
            documents,
            Arc::new(Semaphore::new(2)),
            BatchOptions::default(),
        )
        .await
    }

    #[tokio::test]
    async fn test_ranks_valid_documents_and_rejects_bad_ones() {
        let dir = TempDir::new().unwrap();
        let documents = vec![
            RawDocument::new("weak.docx", docx_from_paragraphs(&["Pastry chef"])),
            RawDocument::new("fake.pdf", b"plain text pretending to be a pdf".to_vec()),
            RawDocument::new(
                "strong.docx",
                docx_from_paragraphs(&["Python developer", "SQL and Docker daily"]),
            ),
            RawDocument::new("notes.txt", b"python sql docker".to_vec()),
        ];

        let report = run(&dir, documents).await.unwrap();

        let ids: Vec<&str> = report.candidates.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["strong.docx", "weak.docx"]);
        assert_eq!(report.best_candidate.as_deref(), Some("strong.docx"));
        assert_eq!(report.candidates[0].analysis.skills_match, 100.0);

        let codes: Vec<(&str, &str)> = report
            .rejected
            .iter()
            .map(|r| (r.filename.as_str(), r.code.as_str()))
            .collect();
        assert_eq!(
            codes,
            vec![("fake.pdf", "UNSUPPORTED_FORMAT"), ("notes.txt", "DISALLOWED_EXTENSION")]
        );
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_all_invalid_is_batch_failure() {
        let dir = TempDir::new().unwrap();
        let err = run(&dir, vec![RawDocument::new("a.txt", b"x".to_vec())])
            .await
            .unwrap_err();
        let BatchError::NoValidDocuments(rejected) = err;
        assert_eq!(rejected.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_upload_is_batch_failure() {
        let dir = TempDir::new().unwrap();
        assert!(run(&dir, vec![]).await.is_err());
    }

    #[tokio::test]
    async fn test_ties_keep_upload_order() {
        let dir = TempDir::new().unwrap();
        let same = docx_from_paragraphs(&["Python developer"]);
        let documents = (0..5)
            .map(|i| RawDocument::new(format!("cv{i}.docx"), same.clone()))
            .collect();
        let report = run(&dir, documents).await.unwrap();
        let ids: Vec<&str> = report.candidates.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["cv0.docx", "cv1.docx", "cv2.docx", "cv3.docx", "cv4.docx"]);
    }

    #[tokio::test]
    async fn test_preview_is_truncated() {
        let dir = TempDir::new().unwrap();
        let long = "python ".repeat(100);
        let report = analyze_batch(
            TextExtractor::new(dir.path()),
            Arc::new(TfIdfSkillScorer::default()),
            job(),
            vec![RawDocument::new("long.docx", docx_from_paragraphs(&[&long]))],
            Arc::new(Semaphore::new(1)),
            BatchOptions {
                preview_chars: 10,
                ..BatchOptions::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(report.candidates[0].text_preview, "python pyt...");
    }

    struct SlowScorer;

    impl CandidateScorer for SlowScorer {
        fn score(&self, _text: &str, _job: &JobRequirement) -> MatchResult {
            std::thread::sleep(Duration::from_millis(300));
            MatchResult::default()
        }

        fn backend(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_timeout_rejects_document() {
        let dir = TempDir::new().unwrap();
        let err = analyze_batch(
            TextExtractor::new(dir.path()),
            Arc::new(SlowScorer),
            job(),
            vec![RawDocument::new("cv.docx", docx_from_paragraphs(&["x"]))],
            Arc::new(Semaphore::new(1)),
            BatchOptions {
                timeout: Duration::from_millis(20),
                ..BatchOptions::default()
            },
        )
        .await
        .unwrap_err();
        let BatchError::NoValidDocuments(rejected) = err;
        assert_eq!(rejected[0].code, "EXTRACTION_TIMEOUT");
    }

    #[test]
    fn test_candidate_identifier_fallback() {
        assert_eq!(candidate_identifier("My CV.pdf", 0), "My_CV.pdf");
        assert_eq!(candidate_identifier("???", 2), "document-3");
    }

    #[test]
    fn test_candidate_identifiers_are_unique() {
        assert_eq!(
            candidate_identifiers(["cv.pdf", "cv.pdf", "cv-2.pdf", "", "notes"]),
            vec!["cv.pdf", "cv-2.pdf", "cv-2-3.pdf", "document-4", "notes"]
        );
        assert_eq!(candidate_identifiers(["x", "x"]), vec!["x", "x-2"]);
    }

    #[tokio::test]
    async fn test_same_filename_uploads_get_distinct_identifiers() {
        let dir = TempDir::new().unwrap();
        let documents = vec![
            RawDocument::new("cv.docx", docx_from_paragraphs(&["Pastry chef"])),
            RawDocument::new(
                "cv.docx",
                docx_from_paragraphs(&["Python developer", "SQL and Docker daily"]),
            ),
        ];
        let report = run(&dir, documents).await.unwrap();
        let ids: Vec<&str> = report.candidates.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["cv-2.docx", "cv.docx"]);
        assert_eq!(report.best_candidate.as_deref(), Some("cv-2.docx"));
    }
}
