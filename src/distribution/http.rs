//! HTTP client for the code-distribution service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};

use crate::config::AddressRecord;
use crate::distribution::definition::CapabilityDefinition;
use crate::distribution::source::CodeSource;
use crate::error::{FetchError, NodeError};

/// Fetches definitions with `GET {base}/capabilities/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCodeSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpCodeSource {
    /// Build a source for the given code-server endpoint.
    pub fn new(server: &AddressRecord, timeout: Duration) -> Result<Self, NodeError> {
        let host = server
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| NodeError::Resolver("code server host is not set".to_string()))?;
        let base = Url::parse(&format!("http://{}:{}/", host, server.port))
            .map_err(|e| NodeError::Resolver(format!("invalid code server address: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NodeError::Resolver(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    fn definition_url(&self, id: &str) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport {
                id: id.to_string(),
                reason: "code server URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["capabilities", id]);
        Ok(url)
    }
}

#[async_trait]
impl CodeSource for HttpCodeSource {
    fn label(&self) -> String {
        self.base.to_string()
    }

    async fn fetch(&self, id: &str) -> Result<CapabilityDefinition, FetchError> {
        let url = self.definition_url(id)?;
        tracing::debug!(capability = id, url = %url, "Requesting capability definition");

        let transport = |e: reqwest::Error| FetchError::Transport {
            id: id.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound { id: id.to_string() }),
            status if !status.is_success() => {
                return Err(FetchError::Transport {
                    id: id.to_string(),
                    reason: format!("code server answered {}", status),
                });
            }
            _ => {}
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|e| FetchError::InvalidDefinition {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }
}
