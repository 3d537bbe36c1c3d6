//! Configuration loading for model metadata
//!
//! Models, attributes, and relations are declared in YAML and materialized
//! into a [`ModelRegistry`] at start-up.

use super::{AttributeDef, Cardinality, ModelDescriptor, ModelRegistry, Relation};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration for a single attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeConfig {
    pub name: String,

    #[serde(default)]
    pub searchable: bool,
}

/// Configuration for a single relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationConfig {
    pub name: String,

    /// Target model name
    pub target: String,

    #[serde(default = "default_cardinality")]
    pub cardinality: Cardinality,
}

fn default_cardinality() -> Cardinality {
    Cardinality::OneToMany
}

/// Configuration for a single model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name (singular, e.g. "user")
    pub name: String,

    #[serde(default)]
    pub attributes: Vec<AttributeConfig>,

    #[serde(default)]
    pub relations: Vec<RelationConfig>,
}

/// Complete model configuration for an application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub models: Vec<ModelConfig>,
}

impl ModelsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Materialize the configuration into a registry
    ///
    /// Relations pointing at models absent from the configuration are kept
    /// (permissive mode, matching the rest of the config layer) but logged,
    /// since they will surface as `UNKNOWN_MODEL` if a filter traverses them.
    pub fn build_registry(&self) -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        for model in &self.models {
            for relation in &model.relations {
                if !self.models.iter().any(|m| m.name == relation.target) {
                    tracing::warn!(
                        model = %model.name,
                        relation = %relation.name,
                        target = %relation.target,
                        "relation targets a model absent from the configuration"
                    );
                }
            }

            let mut descriptor = ModelDescriptor::new(&model.name);
            for attribute in &model.attributes {
                let def = if attribute.searchable {
                    AttributeDef::searchable()
                } else {
                    AttributeDef::default()
                };
                descriptor = descriptor.attribute(&attribute.name, def);
            }
            for relation in &model.relations {
                descriptor = descriptor.relation(
                    &relation.name,
                    Relation::new(&relation.target, relation.cardinality),
                );
            }
            registry.register(descriptor);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        models:
          - name: user
            attributes:
              - name: name
                searchable: true
              - name: age
            relations:
              - name: company
                target: company
                cardinality: one-to-many
          - name: company
            attributes:
              - name: title
                searchable: true
            relations:
              - name: employees
                target: user
                cardinality: many-to-many
    "#;

    #[test]
    fn test_from_yaml_str() {
        let config = ModelsConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].name, "user");
        assert!(config.models[0].attributes[0].searchable);
        assert!(!config.models[0].attributes[1].searchable);
    }

    #[test]
    fn test_default_cardinality() {
        let yaml = r#"
            models:
              - name: user
                relations:
                  - name: company
                    target: company
        "#;
        let config = ModelsConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.models[0].relations[0].cardinality,
            Cardinality::OneToMany
        );
    }

    #[test]
    fn test_build_registry_resolves_both_sides() {
        let registry = ModelsConfig::from_yaml_str(SAMPLE).unwrap().build_registry();
        let user = registry.get("user").unwrap();
        let company = registry.get("company").unwrap();
        assert_eq!(user.relation_def("company").unwrap().target, "company");
        assert_eq!(company.relation_def("employees").unwrap().target, "user");
    }

    #[test]
    fn test_build_registry_keeps_dangling_relations() {
        let yaml = r#"
            models:
              - name: user
                relations:
                  - name: badge
                    target: badge
        "#;
        let registry = ModelsConfig::from_yaml_str(yaml).unwrap().build_registry();
        let user = registry.get("user").unwrap();
        assert!(user.relation_def("badge").is_some());
        assert!(registry.get("badge").is_none());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config =
            ModelsConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.models.len(), 2);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(ModelsConfig::from_yaml_str("models: 12").is_err());
    }
}
