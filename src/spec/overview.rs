//! Compact, line-oriented overview of every operation in a specification

use crate::spec::types::{HttpMethod, NormalizedSpec, Operation, ParameterLocation, Server};
use std::fmt;
use url::{Origin, Url};

/// Above this many characters of serialized paths the METHOD/route segment is dropped
pub const COMPACT_THRESHOLD: usize = 50_000;

/// Overviews longer than this are rejected rather than truncated
pub const MAX_OVERVIEW_LENGTH: usize = 250_000;

/// One rendered operation of the overview
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewLine {
    pub operation_id: Option<String>,
    pub path_part: Option<String>,
    pub summary_part: Option<String>,
    pub spec_url: String,
}

impl fmt::Display for OverviewLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if let Some(id) = &self.operation_id {
            parts.push(id.clone());
        }
        if let Some(path) = &self.path_part {
            parts.push(path.clone());
        }
        if let Some(summary) = &self.summary_part {
            parts.push(format!("- {}", summary));
        }
        parts.push(format!("( Spec: {} )", self.spec_url));
        write!(f, "- {}", parts.join(" "))
    }
}

/// Renders overviews; the only state is where per-operation pointer URLs point
#[derive(Debug, Clone)]
pub struct OverviewGenerator {
    detail_base_url: String,
}

impl OverviewGenerator {
    pub fn new(detail_base_url: impl Into<String>) -> Self {
        Self {
            detail_base_url: detail_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Render the full overview text. Never fails; missing fields only change formatting.
    pub fn generate(&self, host_label: &str, spec: &NormalizedSpec) -> String {
        let lines = self.lines(host_label, spec);
        let root_origin = first_server_origin(&spec.servers);

        let mut header = format!("{} v{}", spec.info.title, spec.info.version);
        if !root_origin.is_empty() {
            header.push_str(&format!(" - {}", root_origin));
        }

        let mut output = vec![header];
        if let Some(description) = spec.info.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            output.push(description.to_string());
        }
        output.push(String::new());
        output.extend(lines.iter().map(ToString::to_string));
        output.push(String::new());
        output.push(format!(
            "{} endpoint{} available. Use getApiOperation with id '{}' and an operationId or route to get the full specification of one endpoint.",
            lines.len(),
            if lines.len() == 1 { "" } else { "s" },
            host_label
        ));

        output.join("\n")
    }

    /// One line per operation, in document order then method order
    pub fn lines(&self, host_label: &str, spec: &NormalizedSpec) -> Vec<OverviewLine> {
        let compact = is_compact(spec);
        let root_origin = first_server_origin(&spec.servers);
        let encoded_label = urlencoding::encode(host_label);

        spec.operations()
            .map(|(route, method, operation)| {
                let origin = operation
                    .servers
                    .as_deref()
                    .map(first_server_origin)
                    .filter(|origin| !origin.is_empty())
                    .unwrap_or_else(|| root_origin.clone());

                let path_part = (!compact).then(|| {
                    format!("{} {}{}{}", method, origin, route, query_string(spec, operation))
                });

                let pointer = detail_pointer(route, method, operation);

                OverviewLine {
                    operation_id: operation.operation_id.clone(),
                    path_part,
                    summary_part: operation.summary.as_deref().map(single_line).filter(|s| !s.is_empty()),
                    spec_url: format!("{}/{}/operations/{}", self.detail_base_url, encoded_label, pointer),
                }
            })
            .collect()
    }
}

/// Whether the spec is large enough to drop the METHOD/route segment
fn is_compact(spec: &NormalizedSpec) -> bool {
    spec.document
        .get("paths")
        .and_then(|paths| serde_json::to_string(paths).ok())
        .map(|serialized| serialized.chars().count() > COMPACT_THRESHOLD)
        .unwrap_or(false)
}

/// Token that `getApiOperation` resolves back to this operation, percent-encoded per segment.
/// Routes without an operationId are only matched as GET, so other methods get `METHOD /route`.
fn detail_pointer(route: &str, method: HttpMethod, operation: &Operation) -> String {
    let token = match (&operation.operation_id, method) {
        (Some(id), _) => id.clone(),
        (None, HttpMethod::Get) => route.trim_start_matches('/').to_string(),
        (None, method) => format!("{} {}", method, route),
    };

    token
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `?name=type&...` for every query parameter, empty when there are none
fn query_string(spec: &NormalizedSpec, operation: &Operation) -> String {
    let pairs: Vec<String> = operation
        .parameters
        .iter()
        .filter_map(|parameter| spec.resolve_parameter(parameter))
        .filter(|parameter| parameter.location == ParameterLocation::Query)
        .map(|parameter| format!("{}={}", parameter.name, parameter.type_name()))
        .collect();

    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

fn first_server_origin(servers: &[Server]) -> String {
    servers
        .first()
        .map(|server| server_origin(&server.url))
        .unwrap_or_default()
}

/// Origin of a server URL, falling back to its first `/`-separated segment
pub fn server_origin(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => match url.origin() {
            origin @ Origin::Tuple(..) => origin.ascii_serialization(),
            Origin::Opaque(_) => first_segment(raw),
        },
        Err(_) => first_segment(raw),
    }
}

fn first_segment(raw: &str) -> String {
    raw.split('/').next().unwrap_or_default().to_string()
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
