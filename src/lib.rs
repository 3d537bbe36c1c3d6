//! # Sift
//!
//! A shared library of query DTOs, schema capability introspection, and
//! condition-building utilities for multi-entity APIs in Rust.
//!
//! ## Features
//!
//! - **Capability Annotations**: Mark schema leaves as filterable, sortable,
//!   or queryable without mutating shared sub-schemas
//! - **Schema Walking**: Derive pruned capability trees and dotted path
//!   indexes from annotated schemas, safe against self-referential graphs
//! - **Condition Building**: Translate client filter/search payloads into
//!   backend-agnostic condition trees, validated against model metadata
//! - **Fixed Operator Vocabulary**: Every operator carries an operand-shape
//!   contract enforced before any condition is built
//! - **Relation-Aware Search**: OR together case-insensitive matches across
//!   all searchable fields reachable through the relation graph
//! - **Configuration-Based Models**: Define models, attributes, and
//!   relations via YAML configuration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sift::prelude::*;
//! use sift::schema::{object, string, number};
//!
//! // Annotate a schema once at start-up
//! let user = object([
//!     ("name", string().queryable(true)),
//!     ("age", number().filterable(true).sortable(true)),
//!     ("mail", string().queryable(true).path(["email"])),
//! ]);
//!
//! // Derive capability maps for request validation
//! let queryable = user.queryable_fields(); // {"name": true, "email": true}
//!
//! // Translate a client payload into a backend condition tree
//! let registry = ModelsConfig::from_yaml_file("models.yaml")?.build_registry();
//! let model = registry.expect("user")?;
//! let condition = ConditionBuilder::new(&registry, model).build(&payload)?;
//! ```

pub mod conditions;
pub mod core;
pub mod model;
pub mod schema;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        error::{SiftError, SiftResult},
        field::FieldValue,
        query::{FilterItem, FilterPayload, Page, PageMeta, Pagination, SortItem, SortOrder},
    };

    // === Schema ===
    pub use crate::schema::{
        node::SchemaNode,
        walk::{Capability, CapabilityMap},
    };

    // === Models ===
    pub use crate::model::{
        AttributeDef, Cardinality, ModelDescriptor, ModelRegistry, Relation,
        config::ModelsConfig,
    };

    // === Conditions ===
    pub use crate::conditions::{
        builder::{Condition, ConditionBuilder},
        operator::FilterOperator,
    };

    // === External dependencies ===
    pub use anyhow::Result;
    pub use chrono::{DateTime, Utc};
    pub use indexmap::IndexMap;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;
    pub use uuid::Uuid;
}
