use crate::error::PipelineError;
use std::time::Duration;

/// HTTP settings for the document fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upper bound for a single request, connect through body.
    pub timeout: Duration,
    pub max_redirects: usize,
    /// Responses larger than this are rejected.
    pub max_document_bytes: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_redirects: 5,
            max_document_bytes: 64 * 1024 * 1024,
            user_agent: format!("mpn-validator/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Batching and concurrency for corpus construction.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// References are processed in sequential batches of this size.
    pub batch_size: usize,
    /// Documents fetched and extracted at once within a batch.
    pub concurrency: usize,
    /// Overall budget per batch; unfinished documents are dropped when it runs out.
    pub batch_timeout: Option<Duration>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self { batch_size: 100, concurrency: 16, batch_timeout: Some(Duration::from_secs(300)) }
    }
}

/// Thresholds for the part matcher.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Minimum similarity ratio for a fuzzy match.
    pub fuzzy_cutoff: f64,
    /// Documents with this many characters or fewer are treated as scanned.
    pub unreadable_threshold: usize,
    /// Number of matcher threads. Zero means available parallelism.
    pub workers: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { fuzzy_cutoff: 0.65, unreadable_threshold: 100, workers: 0 }
    }
}

impl MatchConfig {
    pub(crate) fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    pub fetch: FetchConfig,
    pub corpus: CorpusConfig,
    pub matching: MatchConfig,
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.corpus.batch_size == 0 {
            return Err(PipelineError::InvalidConfig("batch size must be at least 1".into()));
        }
        if self.corpus.concurrency == 0 {
            return Err(PipelineError::InvalidConfig("concurrency must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.matching.fuzzy_cutoff) {
            return Err(PipelineError::InvalidConfig(format!(
                "fuzzy cutoff {} is outside [0, 1]",
                self.matching.fuzzy_cutoff
            )));
        }
        if self.fetch.timeout.is_zero() {
            return Err(PipelineError::InvalidConfig("fetch timeout must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ValidationConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.corpus.batch_size, 100);
        assert_eq!(cfg.fetch.timeout, Duration::from_secs(10));
        assert_eq!(cfg.matching.unreadable_threshold, 100);
    }

    #[test]
    fn rejects_out_of_range_cutoff() {
        let mut cfg = ValidationConfig::default();
        cfg.matching.fuzzy_cutoff = 1.5;
        assert!(matches!(cfg.validate(), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let mut cfg = ValidationConfig::default();
        cfg.corpus.batch_size = 0;
        assert!(cfg.validate().is_err());
    }
}
