//! Locate → normalize → overview/detail, per request
//!
//! Nothing is cached between calls: every request fetches and normalizes its specification
//! afresh, so concurrent requests share no mutable state.

use crate::config::UpstreamConfig;
use crate::error::{BridgeError, Result};
use crate::spec::dereference::{Dereferencer, JsonPointerDereferencer};
use crate::spec::matcher::{match_operation, operation_not_found};
use crate::spec::normalizer::SpecNormalizer;
use crate::spec::overview::{OverviewGenerator, MAX_OVERVIEW_LENGTH};
use crate::spec::resolver::DetailResolver;
use crate::spec::types::NormalizedSpec;
use crate::upstream::{build_http_client, HttpSpecLocator, HttpSwaggerConverter, SpecLocator, SwaggerConverter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// The two spec-browsing operations behind the MCP tools and HTTP routes
pub struct SpecPipeline {
    locator: Arc<dyn SpecLocator>,
    normalizer: SpecNormalizer,
    overview: OverviewGenerator,
    resolver: DetailResolver,
    max_overview_length: usize,
}

impl SpecPipeline {
    pub fn new(
        locator: Arc<dyn SpecLocator>,
        converter: Arc<dyn SwaggerConverter>,
        dereferencer: Arc<dyn Dereferencer>,
        detail_base_url: impl Into<String>,
    ) -> Self {
        Self {
            locator,
            normalizer: SpecNormalizer::new(converter),
            overview: OverviewGenerator::new(detail_base_url),
            resolver: DetailResolver::new(dereferencer),
            max_overview_length: MAX_OVERVIEW_LENGTH,
        }
    }

    /// Wire the HTTP collaborators described by the upstream configuration
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let client = build_http_client(Duration::from_secs(config.request_timeout_secs))?;

        let pipeline = Self::new(
            Arc::new(HttpSpecLocator::new(client.clone(), &config.discovery_url)),
            Arc::new(HttpSwaggerConverter::new(client, &config.converter_url)),
            Arc::new(JsonPointerDereferencer::new()),
            &config.detail_base_url,
        )
        .with_conversion_timeout(Duration::from_secs(config.conversion_timeout_secs));

        Ok(pipeline)
    }

    pub fn with_conversion_timeout(mut self, timeout: Duration) -> Self {
        self.normalizer = self.normalizer.with_conversion_timeout(timeout);
        self
    }

    pub fn with_max_overview_length(mut self, limit: usize) -> Self {
        self.max_overview_length = limit;
        self
    }

    /// Overview of every operation in the spec identified by `id`
    pub async fn api_overview(&self, id: &str) -> Result<String> {
        let spec = self.load(id).await?;
        let overview = self.overview.generate(id, &spec);

        let length = overview.chars().count();
        if length > self.max_overview_length {
            return Err(BridgeError::too_large(length, self.max_overview_length));
        }

        info!("Generated overview for '{}' ({} characters)", id, length);
        Ok(overview)
    }

    /// Dereferenced YAML detail of one operation
    pub async fn api_operation(&self, id: &str, token: &str) -> Result<String> {
        let token = token.trim();
        if token.is_empty() {
            return Err(BridgeError::validation("operationIdOrRoute must not be empty"));
        }

        let spec = self.load(id).await?;
        let matched = match_operation(&spec, token).ok_or_else(|| operation_not_found(&spec, token))?;
        debug!(
            "Token '{}' matched {} {} in '{}'",
            token, matched.method, matched.original_path, id
        );

        self.resolver.resolve(&spec, &matched)
    }

    async fn load(&self, id: &str) -> Result<NormalizedSpec> {
        let id = id.trim();
        if id.is_empty() {
            return Err(BridgeError::validation("id must not be empty"));
        }

        let source = self.locator.locate(id).await?;
        debug!("Located '{}' at {} ({} bytes)", id, source.url, source.text.len());
        self.normalizer.normalize(&source.text, &source.url).await
    }
}
