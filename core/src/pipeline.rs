use crate::config::ValidationConfig;
use crate::corpus::{BuildStats, Corpus, CorpusBuilder};
use crate::error::PipelineError;
use crate::fetch::Fetcher;
use crate::matcher::match_parts;
use crate::{DocumentRef, MatchStatus, MatchVerdict, PartRecord};
use std::collections::{BTreeMap, HashSet};
use tokio_util::sync::CancellationToken;

/// Result of one validation run.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// One verdict per input record, in input order.
    pub verdicts: Vec<MatchVerdict>,
    pub stats: BuildStats,
}

impl ValidationReport {
    pub fn status_counts(&self) -> BTreeMap<MatchStatus, usize> {
        let mut counts: BTreeMap<MatchStatus, usize> = MatchStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for v in &self.verdicts {
            *counts.entry(v.status()).or_insert(0) += 1;
        }
        counts
    }
}

/// Fetches datasheets and validates part numbers against them.
pub struct Validator {
    config: ValidationConfig,
    builder: CorpusBuilder,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let fetcher = Fetcher::new(&config.fetch)?;
        let builder = CorpusBuilder::new(fetcher, config.corpus.clone());
        Ok(Self { config, builder })
    }

    pub fn config(&self) -> &ValidationConfig { &self.config }

    pub async fn build_corpus(&self, refs: &[DocumentRef], cancel: &CancellationToken) -> (Corpus, BuildStats) {
        self.builder.build(refs, cancel).await
    }

    /// Fetch `documents` plus every document a record is scoped to, then match all records.
    pub async fn validate(
        &self,
        documents: &[DocumentRef],
        parts: Vec<PartRecord>,
        cancel: &CancellationToken,
    ) -> ValidationReport {
        let refs = documents_to_fetch(documents, &parts);
        tracing::info!(parts = parts.len(), documents = refs.len(), "starting validation");
        let (corpus, stats) = self.build_corpus(&refs, cancel).await;
        let verdicts = self.match_all(corpus, parts).await;
        ValidationReport { verdicts, stats }
    }

    /// Match records against a corpus built earlier, without touching the network.
    pub async fn validate_with_corpus(&self, corpus: Corpus, parts: Vec<PartRecord>) -> ValidationReport {
        let verdicts = self.match_all(corpus, parts).await;
        ValidationReport { verdicts, stats: BuildStats::default() }
    }

    async fn match_all(&self, corpus: Corpus, parts: Vec<PartRecord>) -> Vec<MatchVerdict> {
        let blank = parts.iter().filter(|p| p.part.trim().is_empty()).count();
        if blank > 0 {
            tracing::warn!(records = blank, "blank part identifiers reported as not found");
        }
        let config = self.config.matching.clone();
        let joined = tokio::task::spawn_blocking(move || match_parts(&corpus, &parts, &config)).await;
        match joined {
            Ok(verdicts) => verdicts,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}

/// Explicit documents first, then documents named by scoped records, without duplicates.
pub fn documents_to_fetch(documents: &[DocumentRef], parts: &[PartRecord]) -> Vec<DocumentRef> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .chain(parts.iter().filter_map(|p| p.document.as_ref()))
        .filter(|r| seen.insert(r.as_str()))
        .cloned()
        .collect()
}
