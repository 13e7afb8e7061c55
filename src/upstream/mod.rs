//! External collaborators of the spec pipeline
//!
//! Each collaborator is a single-method trait so the pipeline can be driven by the HTTP
//! implementations in production and by in-process fakes in tests.

pub mod catalog;
pub mod converter;
pub mod locator;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

pub use catalog::HttpCapabilityCatalog;
pub use converter::HttpSwaggerConverter;
pub use locator::HttpSpecLocator;

/// Raw specification text together with the URL it was fetched from
#[derive(Debug, Clone)]
pub struct SpecSource {
    pub url: String,
    pub text: String,
}

/// Maps a spec identifier to its raw specification text
#[async_trait]
pub trait SpecLocator: Send + Sync {
    async fn locate(&self, id: &str) -> Result<SpecSource>;
}

/// Live text listing known specification identifiers
#[async_trait]
pub trait CapabilityCatalog: Send + Sync {
    async fn catalog_text(&self) -> Result<String>;
}

/// Converts the Swagger 2.0 document at a URL into OpenAPI 3.x
#[async_trait]
pub trait SwaggerConverter: Send + Sync {
    async fn convert(&self, source_url: &str) -> Result<Value>;
}

/// Shared reqwest client with a finite timeout
pub fn build_http_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
