//! Spec lookup over HTTP
//!
//! Identifiers that are already `http(s)://` URLs are fetched directly. Anything else is
//! resolved through the discovery service, which answers `GET {discovery_url}/{id}` with a
//! JSON object carrying the spec URL.

use super::{SpecLocator, SpecSource};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// Discovery service answer
#[derive(Debug, Deserialize)]
struct DiscoveryEntry {
    #[serde(rename = "openapiUrl", alias = "url")]
    openapi_url: String,
}

/// [`SpecLocator`] backed by the discovery service and plain HTTP fetches
pub struct HttpSpecLocator {
    client: reqwest::Client,
    discovery_url: String,
}

impl HttpSpecLocator {
    pub fn new(client: reqwest::Client, discovery_url: impl Into<String>) -> Self {
        Self {
            client,
            discovery_url: discovery_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn discover(&self, id: &str) -> Result<String> {
        let lookup_url = format!("{}/{}", self.discovery_url, urlencoding::encode(id));
        debug!("Resolving spec id '{}' via {}", id, lookup_url);

        let response = self.client.get(&lookup_url).send().await?;
        match response.status() {
            status if status.is_success() => {
                let entry: DiscoveryEntry = response.json().await?;
                Ok(entry.openapi_url)
            }
            StatusCode::NOT_FOUND => Err(BridgeError::not_found(format!(
                "No OpenAPI specification is known for '{}'",
                id
            ))),
            status => Err(BridgeError::upstream(lookup_url, status.as_u16())),
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching specification from {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::upstream(url, status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Whether the identifier is a direct link to a raw spec
pub fn is_direct_url(id: &str) -> bool {
    id.starts_with("http://") || id.starts_with("https://")
}

#[async_trait]
impl SpecLocator for HttpSpecLocator {
    async fn locate(&self, id: &str) -> Result<SpecSource> {
        let url = if is_direct_url(id) {
            id.to_string()
        } else {
            self.discover(id).await?
        };

        let text = self.fetch(&url).await?;
        Ok(SpecSource { url, text })
    }
}
