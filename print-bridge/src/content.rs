//! Invoice content sources
//!
//! No timeout and no retry: a failed fetch is reported once and the flow
//! that asked for it is abandoned.

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::error::{BridgeError, BridgeResult};

/// Fetchable text resource holding the invoice body
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    async fn fetch_text(&self) -> BridgeResult<String>;

    /// Human readable location, for logs
    fn location(&self) -> String;
}

/// Invoice served over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: reqwest::Client,
    url: String,
}

impl HttpContentSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl ContentSource for HttpContentSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_text(&self) -> BridgeResult<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BridgeError::ContentLoadFailure(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::ContentLoadFailure(format!(
                "{} returned {}",
                self.url, status
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| BridgeError::ContentLoadFailure(format!("{}: {}", self.url, e)))?;
        info!(bytes = text.len(), "Invoice content fetched");
        Ok(text)
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

/// Invoice read from a local file
#[derive(Debug, Clone)]
pub struct FileContentSource {
    path: PathBuf,
}

impl FileContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentSource for FileContentSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_text(&self) -> BridgeResult<String> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            BridgeError::ContentLoadFailure(format!("{}: {}", self.path.display(), e))
        })?;
        info!(bytes = text.len(), "Invoice content read");
        Ok(text)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Source picked from a location string: `http(s)://` URLs or file paths
#[derive(Debug, Clone)]
pub enum InvoiceSource {
    Http(HttpContentSource),
    File(FileContentSource),
}

impl InvoiceSource {
    pub fn from_location(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Http(HttpContentSource::new(location))
        } else {
            Self::File(FileContentSource::new(location))
        }
    }
}

impl ContentSource for InvoiceSource {
    async fn fetch_text(&self) -> BridgeResult<String> {
        match self {
            Self::Http(source) => source.fetch_text().await,
            Self::File(source) => source.fetch_text().await,
        }
    }

    fn location(&self) -> String {
        match self {
            Self::Http(source) => source.location(),
            Self::File(source) => source.location(),
        }
    }
}
