//! OpenAPI processing: normalization, operation matching, overview and detail rendering

pub mod dereference;
pub mod matcher;
pub mod normalizer;
pub mod overview;
pub mod pipeline;
pub mod resolver;
pub mod types;

pub use dereference::{Dereferencer, JsonPointerDereferencer};
pub use matcher::{match_operation, operation_not_found};
pub use normalizer::{parse_document, SpecNormalizer, SpecShape};
pub use overview::{OverviewGenerator, OverviewLine, COMPACT_THRESHOLD, MAX_OVERVIEW_LENGTH};
pub use pipeline::SpecPipeline;
pub use resolver::DetailResolver;
pub use types::{HttpMethod, MatchedOperation, NormalizedSpec, Operation, PathItem};
