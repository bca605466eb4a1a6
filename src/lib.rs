//! Entity Lens
//!
//! Turns uploaded entity descriptors and OpenAPI documents into data a
//! diagram or schema viewer can render directly.
//!
//! ## Features
//!
//! - **Descriptor Parsing**: TypeORM-style column/relation maps, column
//!   arrays and legacy relation lists normalize into one [`Entity`] shape
//! - **Foreign Key Inference**: owning-side join columns are synthesized
//!   from relation metadata when not declared
//! - **Relation Analysis**: dangling links dropped, cardinality computed,
//!   duplicates collapsed by derived id
//! - **Graph Projection**: grid-positioned nodes and column-anchored edges
//! - **Schema Resolution**: cycle-safe `$ref` / `allOf` / `anyOf` / `oneOf`
//!   expansion for OpenAPI 3.x and Swagger 2.0
//! - **Spec Validation**: whole documents checked against the embedded
//!   Swagger 2.0 / OpenAPI 3.x meta-schemas
//!
//! ## Pipeline
//!
//! ```text
//! documents ──► descriptor::parse_descriptor (per document)
//!                   │
//!                   ▼
//!           entity map + relation list
//!                   │
//!                   ▼
//!           analyzer::analyze_relations
//!                   │
//!                   ▼
//!           projection::GraphProjector ──► { nodes, edges }
//! ```

pub mod analyzer;
pub mod batch;
pub mod checksum;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod model;
pub mod openapi;
pub mod projection;
pub mod validate;

pub use analyzer::analyze_relations;
pub use batch::{BatchOutcome, BatchParser, DocumentFailure, ParsedBatch};
pub use checksum::Checksum;
pub use config::LensConfig;
pub use descriptor::{parse_descriptor, SourceDocument};
pub use error::{LensError, Result};
pub use model::{Cardinality, Column, Entity, EntityMap, Index, Relation, RelationType};
pub use openapi::{resolve_schema, SchemaResolver, SpecDocument, SpecValidatorCache};
pub use projection::{EntityGraph, GraphProjector};
pub use validate::{DescriptorKind, ValidationReport, ValidatorCache};
