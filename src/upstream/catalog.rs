//! Capability catalog fetched over HTTP

use super::CapabilityCatalog;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;

/// [`CapabilityCatalog`] reading a plain-text listing from one URL
pub struct HttpCapabilityCatalog {
    client: reqwest::Client,
    catalog_url: String,
}

impl HttpCapabilityCatalog {
    pub fn new(client: reqwest::Client, catalog_url: impl Into<String>) -> Self {
        Self {
            client,
            catalog_url: catalog_url.into(),
        }
    }
}

#[async_trait]
impl CapabilityCatalog for HttpCapabilityCatalog {
    async fn catalog_text(&self) -> Result<String> {
        let response = self.client.get(&self.catalog_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::upstream(&self.catalog_url, status.as_u16()));
        }
        Ok(response.text().await?.trim().to_string())
    }
}
