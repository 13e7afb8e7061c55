//! Format detection and normalization
//!
//! Raw specification text is parsed as JSON first and YAML second, classified as OpenAPI 3.x
//! or legacy Swagger, and legacy documents are sent through the [`SwaggerConverter`]
//! collaborator. Downstream components only ever see a [`NormalizedSpec`].

use crate::error::{BridgeError, Result};
use crate::spec::types::{openapi_version, NormalizedSpec};
use crate::upstream::SwaggerConverter;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bounded wait on the converter
pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Shape of a parsed document, decided once at the normalization boundary
#[derive(Debug, Clone, PartialEq)]
pub enum SpecShape {
    /// `openapi` field starting with "3."
    OpenApi3(Value),
    /// `swagger` field present, or no usable `openapi` version
    Swagger2(Value),
    /// Root is not a mapping at all
    Unrecognized(Value),
}

impl SpecShape {
    /// Classify a parsed document
    pub fn classify(document: Value) -> Self {
        let Some(root) = document.as_object() else {
            return SpecShape::Unrecognized(document);
        };

        let is_openapi3 = root.get("swagger").is_none()
            && openapi_version(&document)
                .map(|version| version.starts_with("3."))
                .unwrap_or(false);

        if is_openapi3 {
            SpecShape::OpenApi3(document)
        } else {
            SpecShape::Swagger2(document)
        }
    }

    /// Short label for logging
    pub fn label(&self) -> &'static str {
        match self {
            SpecShape::OpenApi3(_) => "openapi3",
            SpecShape::Swagger2(_) => "swagger2",
            SpecShape::Unrecognized(_) => "unrecognized",
        }
    }
}

/// Parse raw spec text: strict JSON first, YAML as the fallback
pub fn parse_document(raw_text: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(raw_text) {
        Ok(document) => Ok(document),
        Err(json_error) => {
            debug!("Spec is not JSON ({}), trying YAML", json_error);
            serde_yaml::from_str::<Value>(raw_text).map_err(|yaml_error| {
                BridgeError::parse(format!(
                    "Specification is neither valid JSON ({}) nor valid YAML ({})",
                    json_error, yaml_error
                ))
            })
        }
    }
}

/// Turns raw specification text into a canonical OpenAPI 3.x document
pub struct SpecNormalizer {
    converter: Arc<dyn SwaggerConverter>,
    conversion_timeout: Duration,
}

impl SpecNormalizer {
    /// Create a normalizer with the default 10 second conversion wait
    pub fn new(converter: Arc<dyn SwaggerConverter>) -> Self {
        Self {
            converter,
            conversion_timeout: DEFAULT_CONVERSION_TIMEOUT,
        }
    }

    /// Override the bounded wait on the converter
    pub fn with_conversion_timeout(mut self, timeout: Duration) -> Self {
        self.conversion_timeout = timeout;
        self
    }

    /// Normalize raw spec text fetched from `source_url`
    pub async fn normalize(&self, raw_text: &str, source_url: &str) -> Result<NormalizedSpec> {
        let shape = SpecShape::classify(parse_document(raw_text)?);
        debug!("Classified {} as {}", source_url, shape.label());

        match shape {
            SpecShape::OpenApi3(document) => NormalizedSpec::from_document(document),
            SpecShape::Swagger2(_) => {
                let converted = self.convert(source_url).await?;
                match SpecShape::classify(converted) {
                    SpecShape::OpenApi3(document) => {
                        info!("Converted legacy specification {} to OpenAPI 3.x", source_url);
                        NormalizedSpec::from_document(document)
                    }
                    other => Err(BridgeError::conversion(format!(
                        "Converter returned a {} document for {}, expected OpenAPI 3.x",
                        other.label(),
                        source_url
                    ))),
                }
            }
            SpecShape::Unrecognized(_) => Err(BridgeError::parse(
                "Specification root must be a JSON object or YAML mapping",
            )),
        }
    }

    async fn convert(&self, source_url: &str) -> Result<Value> {
        match tokio::time::timeout(self.conversion_timeout, self.converter.convert(source_url)).await {
            Ok(Ok(document)) => Ok(document),
            Ok(Err(e)) => {
                warn!("Swagger conversion of {} failed: {}", source_url, e);
                Err(BridgeError::conversion(format!(
                    "Could not convert Swagger 2.0 specification {}: {}",
                    source_url, e
                )))
            }
            Err(_) => {
                warn!(
                    "Swagger conversion of {} timed out after {:?}",
                    source_url, self.conversion_timeout
                );
                Err(BridgeError::conversion(format!(
                    "Conversion of {} did not finish within {} seconds",
                    source_url,
                    self.conversion_timeout.as_secs()
                )))
            }
        }
    }
}
