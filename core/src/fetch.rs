use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::DocumentRef;
use reqwest::{Client, Url};

/// Retrieves document bytes over HTTP.
///
/// Cloning is cheap and clones share one connection pool; calls keep no other state.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    max_document_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, max_document_bytes: config.max_document_bytes })
    }

    /// Fetch the raw body behind `reference`. Every failure comes back as a [`FetchError`]
    /// naming the reference.
    pub async fn fetch(&self, reference: &DocumentRef) -> Result<Vec<u8>, FetchError> {
        let url = resolve_url(reference)?;
        let transport = |e: reqwest::Error| classify(reference, e);

        let mut resp = self.client.get(url).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { reference: reference.clone(), status: status.as_u16() });
        }
        let limit = self.max_document_bytes;
        if let Some(len) = resp.content_length() {
            if len as usize > limit {
                return Err(FetchError::TooLarge { reference: reference.clone(), bytes: len as usize, limit });
            }
        }

        // Read chunk by chunk so a server that lies about its length still hits the cap.
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(transport)? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge {
                    reference: reference.clone(),
                    bytes: body.len() + chunk.len(),
                    limit,
                });
            }
            body.extend_from_slice(&chunk);
        }
        tracing::debug!(reference = %reference, bytes = body.len(), "fetched document");
        Ok(body)
    }
}

/// Parse a reference as a URL, assuming https when the scheme is missing.
pub fn resolve_url(reference: &DocumentRef) -> Result<Url, FetchError> {
    let s = reference.as_str().trim();
    Url::parse(s)
        .or_else(|_| Url::parse(&format!("https://{}", s)))
        .map_err(|e| FetchError::InvalidReference { reference: reference.clone(), reason: e.to_string() })
}

fn classify(reference: &DocumentRef, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout { reference: reference.clone() }
    } else {
        FetchError::Transport { reference: reference.clone(), source: e }
    }
}
