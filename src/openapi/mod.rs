//! OpenAPI / Swagger support
//!
//! Schema reference resolution is the core; the remaining modules are the
//! document helpers the schema and endpoint views are built on.

pub mod components;
pub mod document;
pub mod example;
pub mod resolve;
pub mod validate;
pub mod version;

pub use components::{ComponentGraph, RefSite};
pub use document::{group_by_tags, is_wrapper_name, parse_spec_text, EndpointSummary, SpecDocument};
pub use example::build_example;
pub use resolve::{resolve_schema, SchemaResolver};
pub use validate::{SpecValidationReport, SpecValidatorCache, OPENAPI_SCHEMA_VERSIONS, SWAGGER_SCHEMA_VERSION};
pub use version::{detect_version, find_best_match, version_info, DetectedVersion, VersionInfo};
