//! Swagger 2.0 → OpenAPI 3.x conversion through a remote converter
//!
//! Speaks the swagger.io converter API: `GET {converter_url}?url={spec_url}`. The bounded
//! wait lives in the normalizer, not here.

use super::SwaggerConverter;
use crate::error::{BridgeError, Result};
use crate::spec::normalizer::parse_document;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

pub struct HttpSwaggerConverter {
    client: reqwest::Client,
    converter_url: String,
}

impl HttpSwaggerConverter {
    pub fn new(client: reqwest::Client, converter_url: impl Into<String>) -> Self {
        Self {
            client,
            converter_url: converter_url.into(),
        }
    }
}

#[async_trait]
impl SwaggerConverter for HttpSwaggerConverter {
    async fn convert(&self, source_url: &str) -> Result<Value> {
        debug!("Requesting conversion of {} from {}", source_url, self.converter_url);

        let response = self
            .client
            .get(&self.converter_url)
            .query(&[("url", source_url)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::upstream(&self.converter_url, status.as_u16()));
        }

        // Some converter deployments answer in YAML regardless of Accept
        parse_document(&response.text().await?)
    }
}
