//! reqwest-backed fetcher for `legis.senado.leg.br/dadosabertos`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use senado_core::{XmlError, parse_document};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::fetch::{Fetcher, LogNotifier, Notifier};

pub const DEFAULT_BASE_URL: &str = "https://legis.senado.leg.br/dadosabertos";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("XML parse error: {0}")]
    Xml(#[from] XmlError),
}

/// Connection settings for [`SenadoClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bound on each request, connect to last byte.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for the Senate open data service.
///
/// Every call is a fresh round trip: no retries, no backoff, no caching.
pub struct SenadoClient {
    client: reqwest::Client,
    base_url: String,
    notifier: Arc<dyn Notifier>,
}

impl SenadoClient {
    /// Create a client from `config`. Failures are only logged until a
    /// notifier is attached with [`with_notifier`](Self::with_notifier).
    ///
    /// The base URL should be like `https://legis.senado.leg.br/dadosabertos`;
    /// a trailing slash is trimmed.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            notifier: Arc::new(LogNotifier),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an endpoint path such as `/materia/atualizadas`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET and decode, reporting the failure kind.
    pub async fn try_fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = self.url(path);

        info!(url = %url, params = params.len(), "fetching from senado");
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, "application/xml")
            .query(params)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let doc = parse_document(&text)?;
        info!(url = %url, bytes = text.len(), "decoded response");
        Ok(doc)
    }
}

#[async_trait]
impl Fetcher for SenadoClient {
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> Option<Value> {
        match self.try_fetch(path, params).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                let url = self.url(path);
                error!(url = %url, error = %e, "fetch failed");
                self.notifier.notify(&format!("failed to fetch {url}: {e}"));
                None
            }
        }
    }
}
