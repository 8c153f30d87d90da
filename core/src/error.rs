use crate::DocumentRef;
use thiserror::Error;

/// Failure to retrieve a document's bytes.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid document reference '{reference}': {reason}")]
    InvalidReference { reference: DocumentRef, reason: String },
    #[error("timed out fetching '{reference}'")]
    Timeout { reference: DocumentRef },
    #[error("'{reference}' returned HTTP {status}")]
    Status { reference: DocumentRef, status: u16 },
    #[error("'{reference}' is {bytes} bytes, over the {limit} byte limit")]
    TooLarge { reference: DocumentRef, bytes: usize, limit: usize },
    #[error("transport error fetching '{reference}': {source}")]
    Transport {
        reference: DocumentRef,
        #[source]
        source: reqwest::Error,
    },
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failure to turn fetched bytes into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("payload is not a PDF")]
    NotPdf,
    #[error("PDF parsing failed: {0}")]
    Parse(String),
    #[error("PDF parser panicked: {0}")]
    ParserPanic(String),
}

/// Why a reference is absent from the corpus.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("extracting '{reference}': {source}")]
    Extract {
        reference: DocumentRef,
        #[source]
        source: ExtractError,
    },
    #[error("extraction task for '{0}' did not complete")]
    Aborted(DocumentRef),
}

/// Failures that stop a whole run. Raised while constructing the validator, before any
/// fetching starts.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Client(#[from] FetchError),
}
