//! Typed view of a canonical OpenAPI 3.x document
//!
//! The view is deliberately lenient: upstream specifications are duck-typed, so every field
//! the pipeline does not need is ignored and malformed path items degrade to "no operations"
//! instead of failing the whole document.

use crate::error::{BridgeError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// HTTP methods exposed by the pipeline, in overview and matching order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Fixed method order used everywhere operations are enumerated
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    /// Parse a method name in any case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(name))
    }

    /// Key of this method inside a path item
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Info object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Server object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// Parameter object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Parameter {
    /// Schema `type` of the parameter, `string` when unspecified
    pub fn type_name(&self) -> &str {
        self.schema
            .as_ref()
            .and_then(|schema| schema.get("type"))
            .and_then(|t| match t {
                Value::String(s) => Some(s.as_str()),
                // OpenAPI 3.1 allows `type: [integer, "null"]`
                Value::Array(types) => types.iter().filter_map(Value::as_str).find(|t| *t != "null"),
                _ => None,
            })
            .unwrap_or("string")
    }
}

/// A parameter entry as it appears in an operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(Parameter),
    /// Anything the typed view cannot read; kept so one odd parameter does not drop the operation
    Unknown(Value),
}

/// Operation object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,
    #[serde(rename = "requestBody", default)]
    pub request_body: Option<Value>,
    #[serde(default)]
    pub responses: Value,
    #[serde(default)]
    pub servers: Option<Vec<Server>>,
}

/// Path item restricted to the methods the pipeline exposes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,
    #[serde(default)]
    pub post: Option<Operation>,
    #[serde(default)]
    pub put: Option<Operation>,
    #[serde(default)]
    pub patch: Option<Operation>,
    #[serde(default)]
    pub delete: Option<Operation>,
}

impl PathItem {
    /// Operation declared for a method, if any
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
        }
    }

    /// Declared operations in fixed method order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|op| (method, op)))
    }
}

/// Canonical OpenAPI 3.x document
#[derive(Debug, Clone)]
pub struct NormalizedSpec {
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    /// The full canonical document; components and extensions live here
    pub document: Value,
}

impl NormalizedSpec {
    /// Build the typed view of a document whose `openapi` field starts with "3."
    pub fn from_document(document: Value) -> Result<Self> {
        let openapi = openapi_version(&document)
            .filter(|version| version.starts_with("3."))
            .ok_or_else(|| BridgeError::conversion("Document has no OpenAPI 3.x version field"))?;

        let info = document
            .get("info")
            .cloned()
            .map(serde_json::from_value::<Info>)
            .transpose()
            .unwrap_or_else(|e| {
                warn!("Ignoring malformed info object: {}", e);
                None
            })
            .unwrap_or_default();

        let servers = document
            .get("servers")
            .cloned()
            .map(serde_json::from_value::<Vec<Server>>)
            .transpose()
            .unwrap_or_else(|e| {
                warn!("Ignoring malformed servers array: {}", e);
                None
            })
            .unwrap_or_default();

        let mut paths = IndexMap::new();
        if let Some(raw_paths) = document.get("paths").and_then(Value::as_object) {
            for (route, raw_item) in raw_paths {
                let item = serde_json::from_value::<PathItem>(raw_item.clone()).unwrap_or_else(|e| {
                    warn!("Ignoring malformed path item '{}': {}", route, e);
                    PathItem::default()
                });
                paths.insert(route.clone(), item);
            }
        }

        Ok(Self {
            openapi,
            info,
            servers,
            paths,
            document,
        })
    }

    /// All operations in document order, then fixed method order
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths.iter().flat_map(|(route, item)| {
            item.operations()
                .map(move |(method, operation)| (route.as_str(), method, operation))
        })
    }

    /// Resolve a parameter entry, following `#/components/parameters/*` references
    pub fn resolve_parameter(&self, parameter: &ParameterOrRef) -> Option<Parameter> {
        match parameter {
            ParameterOrRef::Item(item) => Some(item.clone()),
            ParameterOrRef::Reference { reference } => {
                let pointer = reference.strip_prefix('#')?;
                let target = self.document.pointer(pointer)?;
                serde_json::from_value(target.clone()).ok()
            }
            ParameterOrRef::Unknown(_) => None,
        }
    }
}

/// The resolved target of an operation lookup
#[derive(Debug, Clone)]
pub struct MatchedOperation {
    pub operation: Operation,
    pub original_path: String,
    pub method: HttpMethod,
}

/// The `openapi` field as text; YAML reads an unquoted `openapi: 3.1` as a number
pub fn openapi_version(document: &Value) -> Option<String> {
    match document.get("openapi")? {
        Value::String(version) => Some(version.clone()),
        Value::Number(version) => Some(version.to_string()),
        _ => None,
    }
}

/// Accept numeric versions such as `version: 1.0` written unquoted in YAML
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
