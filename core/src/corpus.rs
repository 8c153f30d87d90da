use crate::config::CorpusConfig;
use crate::error::DocumentError;
use crate::extract::extract_text;
use crate::fetch::Fetcher;
use crate::DocumentRef;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use tokio::sync::{oneshot, Semaphore};
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
struct Entry {
    text: String,
    chars: usize,
}

/// Extracted text keyed by document reference. Built once per run, read-only afterwards.
///
/// Iteration follows insertion order so corpus-wide scans are deterministic.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: HashMap<DocumentRef, Entry>,
    order: Vec<DocumentRef>,
}

impl Corpus {
    pub fn new() -> Self { Self::default() }

    /// Build a corpus from already extracted texts. A repeated reference keeps its first position
    /// and its last text.
    pub fn from_texts<I, R, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = (R, T)>,
        R: Into<DocumentRef>,
        T: Into<String>,
    {
        let mut corpus = Self::new();
        for (reference, text) in texts {
            corpus.insert(reference.into(), text.into());
        }
        corpus
    }

    fn insert(&mut self, reference: DocumentRef, text: String) {
        let chars = text.chars().count();
        if !self.entries.contains_key(&reference) {
            self.order.push(reference.clone());
        }
        self.entries.insert(reference, Entry { text, chars });
    }

    pub fn get(&self, reference: &str) -> Option<&str> {
        self.entries.get(reference).map(|e| e.text.as_str())
    }

    /// Character count of a document's text.
    pub fn char_count(&self, reference: &str) -> Option<usize> {
        self.entries.get(reference).map(|e| e.chars)
    }

    pub fn contains(&self, reference: &str) -> bool { self.entries.contains_key(reference) }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn references(&self) -> impl Iterator<Item = &DocumentRef> { self.order.iter() }

    /// `(reference, text, char_count)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&DocumentRef, &str, usize)> {
        self.order.iter().filter_map(move |r| self.entries.get(r).map(|e| (r, e.text.as_str(), e.chars)))
    }
}

/// Counters for one corpus build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub requested: usize,
    pub extracted: usize,
    pub fetch_failed: usize,
    pub extract_failed: usize,
    pub timed_out: usize,
    pub cancelled: usize,
}

/// Fetches and extracts documents in sequential batches with bounded concurrency.
pub struct CorpusBuilder {
    fetcher: Fetcher,
    config: CorpusConfig,
}

impl CorpusBuilder {
    pub fn new(fetcher: Fetcher, config: CorpusConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetch and extract every reference. Failed references are logged and left out of the
    /// corpus. Cancellation is honoured between batches and returns what was built so far.
    pub async fn build(&self, refs: &[DocumentRef], cancel: &CancellationToken) -> (Corpus, BuildStats) {
        let unique = dedup(refs);
        let mut stats = BuildStats { requested: unique.len(), ..Default::default() };
        let mut corpus = Corpus::new();
        let batch_size = self.config.batch_size.max(1);
        let batches = unique.chunks(batch_size).count();

        for (n, batch) in unique.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                stats.cancelled += unique.len() - n * batch_size;
                tracing::warn!(batch = n, skipped = stats.cancelled, "corpus build cancelled");
                break;
            }
            tracing::info!(batch = n + 1, batches, documents = batch.len(), "fetching batch");
            self.build_batch(batch, &mut corpus, &mut stats).await;
        }

        tracing::info!(
            requested = stats.requested,
            extracted = stats.extracted,
            fetch_failed = stats.fetch_failed,
            extract_failed = stats.extract_failed,
            timed_out = stats.timed_out,
            cancelled = stats.cancelled,
            "corpus built"
        );
        (corpus, stats)
    }

    async fn build_batch(&self, batch: &[DocumentRef], corpus: &mut Corpus, stats: &mut BuildStats) {
        let permits = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut inflight = Vec::with_capacity(batch.len());
        for reference in batch {
            let fetcher = self.fetcher.clone();
            let permits = permits.clone();
            let reference = reference.clone();
            inflight.push(tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                load_document(&fetcher, &reference).await
            }));
        }

        let deadline = self.config.batch_timeout.map(|t| Instant::now() + t);
        for (reference, handle) in batch.iter().zip(inflight) {
            let abort = handle.abort_handle();
            let joined = match deadline {
                Some(at) => match timeout_at(at, handle).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        // Stops the fetch; a parse already running is left to finish on its
                        // detached thread and its result is discarded.
                        abort.abort();
                        stats.timed_out += 1;
                        tracing::warn!(reference = %reference, "batch budget exhausted, dropping document");
                        continue;
                    }
                },
                None => handle.await,
            };
            let outcome = joined.unwrap_or_else(|_| Err(DocumentError::Aborted(reference.clone())));
            match outcome {
                Ok(text) => {
                    corpus.insert(reference.clone(), text);
                    stats.extracted += 1;
                }
                Err(err) => {
                    match err {
                        DocumentError::Fetch(_) => stats.fetch_failed += 1,
                        DocumentError::Extract { .. } | DocumentError::Aborted(_) => stats.extract_failed += 1,
                    }
                    tracing::warn!(reference = %reference, error = %err, "document unavailable");
                }
            }
        }
    }
}

async fn load_document(fetcher: &Fetcher, reference: &DocumentRef) -> Result<String, DocumentError> {
    let bytes = fetcher.fetch(reference).await?;
    let extracted = detached(move || extract_text(&bytes))
        .await
        .ok_or_else(|| DocumentError::Aborted(reference.clone()))?;
    extracted.map_err(|source| DocumentError::Extract { reference: reference.clone(), source })
}

/// Run blocking work on its own OS thread and await the result.
///
/// Unlike `spawn_blocking`, the thread is not owned by the runtime: dropping the returned
/// future abandons the work, and runtime shutdown does not wait for it. `None` when the
/// thread could not be started or died before sending.
async fn detached<T, F>(work: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let spawned = thread::Builder::new().name("pdf-extract".into()).spawn(move || {
        let _ = tx.send(work());
    });
    if let Err(err) = spawned {
        tracing::error!(error = %err, "could not start extraction thread");
        return None;
    }
    rx.await.ok()
}

fn dedup(refs: &[DocumentRef]) -> Vec<DocumentRef> {
    let mut seen = HashSet::new();
    refs.iter().filter(|r| seen.insert(r.as_str())).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_texts_preserves_order_and_counts_chars() {
        let corpus = Corpus::from_texts([("b", "ééé"), ("a", "xy"), ("b", "late")]);
        let refs: Vec<&str> = corpus.references().map(DocumentRef::as_str).collect();
        assert_eq!(refs, vec!["b", "a"]);
        assert_eq!(corpus.get("b"), Some("late"));
        assert_eq!(corpus.char_count("a"), Some(2));
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn multibyte_text_counts_characters_not_bytes() {
        let corpus = Corpus::from_texts([("d", "µ".repeat(60))]);
        assert_eq!(corpus.char_count("d"), Some(60));
    }

    #[test]
    fn abandoned_extraction_does_not_hold_the_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_time().build().unwrap();
        let started = std::time::Instant::now();
        runtime.block_on(async {
            let stuck = detached(|| thread::sleep(std::time::Duration::from_secs(5)));
            assert!(tokio::time::timeout(std::time::Duration::from_millis(50), stuck).await.is_err());
        });
        drop(runtime);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[tokio::test]
    async fn detached_work_returns_its_value() {
        assert_eq!(detached(|| 6 * 7).await, Some(42));
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let refs: Vec<DocumentRef> = ["x", "y", "x", "z"].into_iter().map(DocumentRef::from).collect();
        let unique: Vec<String> = dedup(&refs).into_iter().map(|r| r.to_string()).collect();
        assert_eq!(unique, vec!["x", "y", "z"]);
    }
}
