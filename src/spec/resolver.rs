//! Self-contained specification of a single operation

use crate::error::Result;
use crate::spec::dereference::Dereferencer;
use crate::spec::types::{MatchedOperation, NormalizedSpec};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds the dereferenced YAML document for one matched operation
pub struct DetailResolver {
    dereferencer: Arc<dyn Dereferencer>,
}

impl DetailResolver {
    pub fn new(dereferencer: Arc<dyn Dereferencer>) -> Self {
        Self { dereferencer }
    }

    pub fn resolve(&self, spec: &NormalizedSpec, matched: &MatchedOperation) -> Result<String> {
        let sub_document = sub_document(spec, matched)?;

        // Pointers resolve against the full document; only what the operation reaches is expanded
        let detail = match self.dereferencer.dereference(&sub_document, &spec.document) {
            Ok(dereferenced) => dereferenced,
            Err(e) => {
                warn!(
                    "Could not dereference {} {}: {}; returning references unresolved",
                    matched.method, matched.original_path, e
                );
                sub_document
            }
        };

        debug!("Resolved detail for {} {}", matched.method, matched.original_path);
        Ok(serde_yaml::to_string(&detail)?)
    }
}

/// Minimal document holding exactly one path and method. `tags`, `webhooks` and `components`
/// are never copied.
fn sub_document(spec: &NormalizedSpec, matched: &MatchedOperation) -> Result<Value> {
    let raw_item = spec
        .document
        .get("paths")
        .and_then(|paths| paths.get(&matched.original_path));

    let operation = match raw_item.and_then(|item| item.get(matched.method.as_str())) {
        Some(raw) => raw.clone(),
        None => serde_json::to_value(&matched.operation)?,
    };

    let mut path_item = Map::new();
    for shared in ["parameters", "servers"] {
        if let Some(value) = raw_item.and_then(|item| item.get(shared)) {
            path_item.insert(shared.to_string(), value.clone());
        }
    }
    path_item.insert(matched.method.as_str().to_string(), operation);

    let mut root = Map::new();
    root.insert("openapi".to_string(), json!(spec.openapi));
    for key in ["info", "servers"] {
        if let Some(value) = spec.document.get(key) {
            root.insert(key.to_string(), value.clone());
        }
    }
    let mut paths = Map::new();
    paths.insert(matched.original_path.clone(), Value::Object(path_item));
    root.insert("paths".to_string(), Value::Object(paths));

    Ok(Value::Object(root))
}
