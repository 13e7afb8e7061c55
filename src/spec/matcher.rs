//! Operation lookup by route or operationId

use crate::error::BridgeError;
use crate::spec::types::{HttpMethod, MatchedOperation, NormalizedSpec};

/// Find the operation a user token refers to.
///
/// A `METHOD /route` token names one operation exactly. Any other token is tried as a literal
/// route (GET only) before it is compared against operationIds. Duplicate operationIds are
/// shadowed by declaration order.
pub fn match_operation(spec: &NormalizedSpec, token: &str) -> Option<MatchedOperation> {
    if let Some((method, route)) = token
        .split_once(' ')
        .and_then(|(method, route)| Some((HttpMethod::from_name(method)?, route.trim())))
    {
        if let Some(matched) = match_route(spec, route, method) {
            return Some(matched);
        }
    }

    if let Some(matched) = match_route(spec, token, HttpMethod::Get) {
        return Some(matched);
    }

    let operation_id = token.strip_prefix('/').unwrap_or(token);
    spec.operations()
        .find(|(_, _, operation)| operation.operation_id.as_deref() == Some(operation_id))
        .map(|(path, method, operation)| MatchedOperation {
            operation: operation.clone(),
            original_path: path.to_string(),
            method,
        })
}

fn match_route(spec: &NormalizedSpec, route: &str, method: HttpMethod) -> Option<MatchedOperation> {
    let route = if route.starts_with('/') {
        route.to_string()
    } else {
        format!("/{}", route)
    };

    let operation = spec.paths.get(&route)?.operation(method)?;
    Some(MatchedOperation {
        operation: operation.clone(),
        original_path: route,
        method,
    })
}

/// Build the not-found error, enumerating every operationId and route as remediation data
pub fn operation_not_found(spec: &NormalizedSpec, token: &str) -> BridgeError {
    let operation_ids: Vec<&str> = spec
        .operations()
        .filter_map(|(_, _, operation)| operation.operation_id.as_deref())
        .collect();
    let routes: Vec<String> = spec
        .operations()
        .map(|(path, method, _)| format!("{} {}", method, path))
        .collect();

    let mut message = format!(
        "No operation matches '{}'. Use one of the operationIds or routes below.\n",
        token
    );

    message.push_str("\nOperation IDs:\n");
    if operation_ids.is_empty() {
        message.push_str("  (none)\n");
    }
    for id in &operation_ids {
        message.push_str(&format!("  {}\n", id));
    }

    message.push_str("\nRoutes:\n");
    if routes.is_empty() {
        message.push_str("  (none)\n");
    }
    for route in &routes {
        message.push_str(&format!("  {}\n", route));
    }

    BridgeError::not_found(message.trim_end())
}
