//! Backend model metadata: attributes, relations, and the registry
//!
//! Relation targets are model **names**, not direct references. This keeps
//! the metadata layer decoupled from concrete model types and makes cyclic
//! relation graphs (bidirectional associations) representable; the
//! [`ModelRegistry`] resolves names when conditions are built.

pub mod config;

use crate::core::error::{SiftError, SiftResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Cardinality of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// Metadata for a single model attribute
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Whether free-text search should match this attribute
    #[serde(default)]
    pub searchable: bool,
}

impl AttributeDef {
    /// An attribute included in free-text search
    pub fn searchable() -> Self {
        Self { searchable: true }
    }
}

/// A declared relation to another model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Name of the target model, resolved through the registry
    pub target: String,

    pub cardinality: Cardinality,
}

impl Relation {
    pub fn new(target: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            target: target.into(),
            cardinality,
        }
    }
}

/// Metadata describing one backend entity
///
/// Attribute and relation order follows declaration order, so derived
/// conditions and search clauses are deterministic.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    name: String,
    attributes: IndexMap<String, AttributeDef>,
    relations: IndexMap<String, Relation>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            relations: IndexMap::new(),
        }
    }

    /// Add an attribute (builder style)
    pub fn attribute(mut self, name: impl Into<String>, def: AttributeDef) -> Self {
        self.attributes.insert(name.into(), def);
        self
    }

    /// Add a relation (builder style)
    pub fn relation(mut self, name: impl Into<String>, relation: Relation) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute_def(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Attributes flagged for free-text search, in declaration order
    pub fn searchable_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|(_, def)| def.searchable)
            .map(|(name, _)| name.as_str())
    }

    pub fn relation_def(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.relations
            .iter()
            .map(|(name, relation)| (name.as_str(), relation))
    }
}

/// Registry of all models known to the application
///
/// Built once at start-up and read-only afterwards.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model descriptor, replacing any previous one of that name
    pub fn register(&mut self, descriptor: ModelDescriptor) {
        tracing::debug!(model = %descriptor.name(), "registering model descriptor");
        self.models
            .insert(descriptor.name().to_string(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.get(name)
    }

    /// Like [`get`](Self::get), but a miss is an [`SiftError::UnknownModel`]
    pub fn expect(&self, name: &str) -> SiftResult<&ModelDescriptor> {
        self.models
            .get(name)
            .ok_or_else(|| SiftError::unknown_model(name))
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}
