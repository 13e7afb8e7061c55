//! Local `$ref` expansion
//!
//! Only same-document JSON pointer references (`#/...`) are supported. Expansion starts at the
//! node being rendered and follows references into the root document, so parts of the root that
//! the node never reaches are not visited. A reference that is already being expanded further up
//! the tree is left in place as `{"$ref": ...}` so cyclic schemas terminate.

use crate::error::{BridgeError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Nesting limit of reference expansion; deeper references stay as `$ref`
const MAX_DEPTH: usize = 64;

/// Total number of references one expansion may inline
const MAX_INLINED_REFS: usize = 10_000;

/// Inlines the references of a document fragment
pub trait Dereferencer: Send + Sync {
    /// Expand every reference reachable from `node`, resolving pointers against `root`
    fn dereference(&self, node: &Value, root: &Value) -> Result<Value>;
}

/// [`Dereferencer`] that resolves local JSON pointers against the root document
#[derive(Debug, Clone)]
pub struct JsonPointerDereferencer {
    max_depth: usize,
    max_inlined: usize,
}

impl Default for JsonPointerDereferencer {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_inlined: MAX_INLINED_REFS,
        }
    }
}

impl JsonPointerDereferencer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// State of one `dereference` call
struct Expansion<'a> {
    root: &'a Value,
    max_depth: usize,
    max_inlined: usize,
    stack: Vec<String>,
    /// Expanded targets that did not depend on the stack above them, with the number of
    /// references each one inlines
    cache: HashMap<String, (Value, usize)>,
    inlined: usize,
    /// Lowest stack index a cycle was cut at since the last reset
    lowest_cut: usize,
}

impl<'a> Expansion<'a> {
    /// Count `references` inlined ones against the limit
    fn charge(&mut self, references: usize) -> Result<()> {
        self.inlined += references;
        if self.inlined > self.max_inlined {
            return Err(BridgeError::validation(format!(
                "Expansion inlines more than {} references",
                self.max_inlined
            )));
        }
        Ok(())
    }

    fn expand(&mut self, node: &Value) -> Result<Value> {
        match node {
            Value::Object(object) => {
                if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
                    return self.expand_reference(object, reference);
                }
                let mut expanded = Map::with_capacity(object.len());
                for (key, value) in object {
                    expanded.insert(key.clone(), self.expand(value)?);
                }
                Ok(Value::Object(expanded))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.expand(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn expand_reference(&mut self, object: &Map<String, Value>, reference: &str) -> Result<Value> {
        if let Some(position) = self.stack.iter().position(|seen| seen == reference) {
            self.lowest_cut = self.lowest_cut.min(position);
            return Ok(Value::Object(object.clone()));
        }
        if self.stack.len() >= self.max_depth {
            self.lowest_cut = 0;
            return Ok(Value::Object(object.clone()));
        }

        let cached_count = self.cache.get(reference).map(|(_, count)| *count);
        let mut resolved = match cached_count {
            Some(count) => {
                self.charge(count)?;
                self.cache[reference].0.clone()
            }
            None => {
                self.charge(1)?;
                let target = lookup(self.root, reference)?;
                let depth = self.stack.len();
                let inlined_before = self.inlined;
                let outer_cut = std::mem::replace(&mut self.lowest_cut, usize::MAX);

                self.stack.push(reference.to_string());
                let resolved = self.expand(target);
                self.stack.pop();
                let resolved = resolved?;

                // Only cache results whose cycle cuts stay within this reference
                if self.lowest_cut >= depth {
                    let count = self.inlined - inlined_before + 1;
                    self.cache.insert(reference.to_string(), (resolved.clone(), count));
                }
                self.lowest_cut = self.lowest_cut.min(outer_cut);
                resolved
            }
        };

        // OpenAPI 3.1 allows siblings next to $ref; they override the target
        if let Value::Object(resolved_object) = &mut resolved {
            for (key, value) in object.iter().filter(|(key, _)| key.as_str() != "$ref") {
                resolved_object.insert(key.clone(), self.expand(value)?);
            }
        }

        Ok(resolved)
    }
}

impl Dereferencer for JsonPointerDereferencer {
    fn dereference(&self, node: &Value, root: &Value) -> Result<Value> {
        Expansion {
            root,
            max_depth: self.max_depth,
            max_inlined: self.max_inlined,
            stack: Vec::new(),
            cache: HashMap::new(),
            inlined: 0,
            lowest_cut: usize::MAX,
        }
        .expand(node)
    }
}

fn lookup<'a>(root: &'a Value, reference: &str) -> Result<&'a Value> {
    let pointer = reference.strip_prefix('#').ok_or_else(|| {
        BridgeError::validation(format!("External reference '{}' is not supported", reference))
    })?;
    let pointer = urlencoding::decode(pointer)
        .map_err(|e| BridgeError::validation(format!("Malformed reference '{}': {}", reference, e)))?;

    root.pointer(&pointer)
        .ok_or_else(|| BridgeError::validation(format!("Unresolvable reference '{}'", reference)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inlines_component_refs() {
        let document = json!({
            "paths": {"/pets": {"get": {"responses": {"200": {"$ref": "#/components/responses/Pets"}}}}},
            "components": {
                "responses": {"Pets": {"description": "ok", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}}},
                "schemas": {"Pet": {"type": "object", "properties": {"name": {"type": "string"}}}}
            }
        });

        let resolved = JsonPointerDereferencer::new().dereference(&document, &document).unwrap();
        let schema = &resolved["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
        assert_eq!(schema["properties"]["name"]["type"], "string");
        assert!(!resolved.to_string().contains("$ref"));
    }

    #[test]
    fn test_cyclic_ref_is_left_in_place() {
        let document = json!({
            "root": {"$ref": "#/components/schemas/Node"},
            "components": {"schemas": {"Node": {
                "type": "object",
                "properties": {"children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}}}
            }}}
        });

        let resolved = JsonPointerDereferencer::new().dereference(&document, &document).unwrap();
        assert_eq!(resolved["root"]["type"], "object");
        assert_eq!(
            resolved["root"]["properties"]["children"]["items"],
            json!({"$ref": "#/components/schemas/Node"})
        );
    }

    #[test]
    fn test_siblings_override_target() {
        let document = json!({
            "field": {"$ref": "#/defs/Id", "description": "local"},
            "defs": {"Id": {"type": "string", "description": "shared"}}
        });

        let resolved = JsonPointerDereferencer::new().dereference(&document, &document).unwrap();
        assert_eq!(resolved["field"], json!({"type": "string", "description": "local"}));
    }

    #[test]
    fn test_escaped_pointer_segments() {
        let document = json!({
            "use": {"$ref": "#/paths/~1pets~1{id}"},
            "paths": {"/pets/{id}": {"summary": "one pet"}}
        });

        let resolved = JsonPointerDereferencer::new().dereference(&document, &document).unwrap();
        assert_eq!(resolved["use"]["summary"], "one pet");
    }

    #[test]
    fn test_dangling_and_external_refs_fail() {
        let dereferencer = JsonPointerDereferencer::new();
        let dangling = json!({"a": {"$ref": "#/missing"}});
        let external = json!({"a": {"$ref": "other.yaml#/x"}});
        assert!(dereferencer.dereference(&dangling, &dangling).is_err());
        assert!(dereferencer.dereference(&external, &external).is_err());
    }

    #[test]
    fn test_unreached_parts_of_root_are_ignored() {
        let root = json!({
            "paths": {"/pets": {"get": {"responses": {"200": {"$ref": "#/components/responses/Pets"}}}}},
            "components": {
                "responses": {"Pets": {"description": "ok"}},
                "schemas": {"Unrelated": {"$ref": "common.yaml#/Thing"}, "Gone": {"$ref": "#/nowhere"}}
            }
        });

        let resolved = JsonPointerDereferencer::new().dereference(&root["paths"], &root).unwrap();
        assert_eq!(resolved["/pets"]["get"]["responses"]["200"]["description"], "ok");
    }

    #[test]
    fn test_shared_refs_in_a_deep_dag_stay_cheap() {
        // Level i references level i + 1 twice; unrelated to the rendered node
        let mut schemas = Map::new();
        for level in 0..40 {
            let next = format!("#/components/schemas/L{}", level + 1);
            schemas.insert(
                format!("L{}", level),
                json!({"type": "object", "properties": {"left": {"$ref": next}, "right": {"$ref": next}}}),
            );
        }
        schemas.insert("L40".to_string(), json!({"type": "string"}));
        let root = json!({
            "paths": {"/ping": {"get": {"responses": {"200": {"description": "pong"}}}}},
            "components": {"schemas": schemas}
        });

        let dereferencer = JsonPointerDereferencer::new();
        let resolved = dereferencer.dereference(&root["paths"], &root).unwrap();
        assert_eq!(resolved["/ping"]["get"]["responses"]["200"]["description"], "pong");

        // Reaching the DAG itself hits the inlining limit instead of blowing up
        let reaching = json!({"schema": {"$ref": "#/components/schemas/L0"}});
        assert!(dereferencer.dereference(&reaching, &root).is_err());
    }

    #[test]
    fn test_repeated_refs_are_expanded_once_and_reused() {
        let root = json!({
            "node": {"a": {"$ref": "#/defs/Id"}, "b": {"$ref": "#/defs/Id"}},
            "defs": {"Id": {"type": "string", "format": "uuid"}}
        });

        let resolved = JsonPointerDereferencer::new().dereference(&root["node"], &root).unwrap();
        assert_eq!(resolved["a"], resolved["b"]);
        assert_eq!(resolved["b"]["format"], "uuid");
    }
}
