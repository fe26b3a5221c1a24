use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::matching::batch::BatchOptions;
use crate::matching::composite::CandidateScorer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every field is read-only or a concurrency limit.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub extractor: TextExtractor,
    /// Pluggable candidate scorer. Default: TfIdfSkillScorer.
    pub scorer: Arc<dyn CandidateScorer>,
    /// Bounds concurrent document parses across all requests.
    pub extraction_limiter: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: Config, scorer: Arc<dyn CandidateScorer>) -> Self {
        Self {
            extractor: TextExtractor::new(config.scratch_dir.clone()),
            extraction_limiter: Arc::new(Semaphore::new(config.max_concurrent_extractions)),
            scorer,
            config,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            timeout: Duration::from_secs(self.config.extraction_timeout_secs),
            preview_chars: self.config.preview_chars,
        }
    }
}
