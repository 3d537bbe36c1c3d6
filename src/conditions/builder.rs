//! Building backend condition trees from client filter payloads
//!
//! The builder validates every payload key against the model's field set
//! (resolving dotted paths through the relation graph) and every operand
//! against the operator vocabulary, then assembles a [`Condition`] tree:
//! AND of the validated top-level filters, with an OR of search conditions
//! appended when a search term is present.

use super::operator::FilterOperator;
use crate::core::error::{SiftError, SiftResult};
use crate::core::query::{FilterItem, FilterPayload};
use crate::model::{ModelDescriptor, ModelRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A backend-agnostic query condition
///
/// This is the output contract of the builder: handed to a query backend,
/// it expresses the validated filters of one request. String-matching
/// operators are normalized to `like`/`iLike` with builder-inserted
/// wildcards, so backends never see `startsWith`/`endsWith`/`substring`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    Compare {
        field: String,
        operator: FilterOperator,
        value: Value,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    /// An equality comparison
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Condition::Compare {
            field: field.into(),
            operator: FilterOperator::Eq,
            value,
        }
    }
}

/// Collapse a clause list into a single condition without needless nesting
fn all_of(mut clauses: Vec<Condition>) -> Condition {
    if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        Condition::And(clauses)
    }
}

/// Translates filter/search payloads into [`Condition`] trees for one model
pub struct ConditionBuilder<'a> {
    registry: &'a ModelRegistry,
    model: &'a ModelDescriptor,
}

impl<'a> ConditionBuilder<'a> {
    pub fn new(registry: &'a ModelRegistry, model: &'a ModelDescriptor) -> Self {
        Self { registry, model }
    }

    /// Build the condition tree for a client payload
    ///
    /// Validation short-circuits on the first invalid key; the result is
    /// `And(filter conditions ++ [Or(search conditions)])`.
    pub fn build(&self, payload: &FilterPayload) -> SiftResult<Condition> {
        let mut clauses = Vec::new();

        if let Some(filters) = &payload.filters {
            for (key, value) in filters {
                clauses.push(self.condition_for_key(key, value)?);
            }
        }

        if let Some(term) = payload.search.as_deref() {
            let term = term.trim();
            if !term.is_empty() {
                let matches = self.search_conditions(term);
                if !matches.is_empty() {
                    clauses.push(Condition::Or(matches));
                }
            }
        }

        Ok(Condition::And(clauses))
    }

    /// Build a condition tree from caller-constructed filter items
    ///
    /// The operator names here are wired in by the caller, so an unknown
    /// name raises the hard [`SiftError::UnsupportedOperator`] instead of a
    /// client-input error.
    pub fn build_items(&self, items: &[FilterItem]) -> SiftResult<Condition> {
        let mut clauses = Vec::new();
        for item in items {
            let op = FilterOperator::require(&item.operator)?;
            let field = self.resolve_field(&item.field)?;
            let mut map = Map::new();
            map.insert(op.as_str().to_string(), item.value.clone());
            clauses.push(all_of(self.field_conditions(&field, &map)?));
        }
        Ok(Condition::And(clauses))
    }

    /// Condition for one top-level payload entry
    ///
    /// A key is either a dotted field path known to the model, or an
    /// `or`/`and` combinator over nested filter objects. Other operator
    /// names are rejected here: without a field context they have nothing
    /// to compare.
    fn condition_for_key(&self, key: &str, value: &Value) -> SiftResult<Condition> {
        if let Some(op) = FilterOperator::parse(key) {
            if op.is_combinator() {
                return self.combinator(op, value, |builder, map| {
                    let mut clauses = Vec::new();
                    for (k, v) in map {
                        clauses.push(builder.condition_for_key(k, v)?);
                    }
                    Ok(all_of(clauses))
                });
            }
            return Err(SiftError::invalid_filter_key(key));
        }

        let field = self.resolve_field(key)?;
        match value {
            Value::Object(map) => Ok(all_of(self.field_conditions(&field, map)?)),
            Value::Array(_) => Ok(compare(&field, FilterOperator::In, value)),
            _ => Ok(compare(&field, FilterOperator::Eq, value)),
        }
    }

    /// Conditions for an operator map applied to one field
    ///
    /// Every key must parse as an operator; the first unrecognized key
    /// fails with `InvalidFilterKey`. Nested `or`/`and` combine operator
    /// maps over the same field.
    fn field_conditions(&self, field: &str, map: &Map<String, Value>) -> SiftResult<Vec<Condition>> {
        let mut out = Vec::new();
        for (op_name, operand) in map {
            let Some(op) = FilterOperator::parse(op_name) else {
                return Err(SiftError::invalid_filter_key(op_name));
            };

            if op.is_combinator() {
                out.push(self.combinator(op, operand, |builder, sub| {
                    Ok(all_of(builder.field_conditions(field, sub)?))
                })?);
                continue;
            }

            op.validate_operand(operand)
                .map_err(|messages| SiftError::operator_validation(op.as_str(), messages))?;
            out.push(compare(field, op, operand));
        }
        Ok(out)
    }

    /// Shared handling for `or`/`and`: validate the operand, then build one
    /// branch per element through `branch`
    fn combinator(
        &self,
        op: FilterOperator,
        operand: &Value,
        branch: impl Fn(&Self, &Map<String, Value>) -> SiftResult<Condition>,
    ) -> SiftResult<Condition> {
        op.validate_operand(operand)
            .map_err(|messages| SiftError::operator_validation(op.as_str(), messages))?;

        let Some(items) = operand.as_array() else {
            return Err(SiftError::operator_validation(
                op.as_str(),
                vec![format!("'{}' expects an array of filter objects", op.as_str())],
            ));
        };

        let mut branches = Vec::new();
        for item in items {
            let Some(map) = item.as_object() else {
                return Err(SiftError::operator_validation(
                    op.as_str(),
                    vec![format!(
                        "'{}' elements must be filter objects",
                        op.as_str()
                    )],
                ));
            };
            branches.push(branch(self, map)?);
        }

        Ok(match op {
            FilterOperator::Or => Condition::Or(branches),
            _ => Condition::And(branches),
        })
    }

    /// Resolve a dotted key against the model's attributes and relations
    ///
    /// Every segment but the last must name a relation; the last must name
    /// an attribute of the model reached. A missing segment is the client's
    /// mistake (`InvalidFilterKey`); a relation pointing at an unregistered
    /// model is ours (`UnknownModel`).
    fn resolve_field(&self, dotted: &str) -> SiftResult<String> {
        let mut model = self.model;
        let mut segments = dotted.split('.').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                if model.has_attribute(segment) {
                    return Ok(dotted.to_string());
                }
                return Err(SiftError::invalid_filter_key(dotted));
            }
            let Some(relation) = model.relation_def(segment) else {
                return Err(SiftError::invalid_filter_key(dotted));
            };
            model = self.registry.expect(&relation.target)?;
        }
        Err(SiftError::invalid_filter_key(dotted))
    }

    /// OR-able conditions matching the search term against every searchable
    /// attribute reachable through the relation graph
    ///
    /// The walk carries a visited set of model names so bidirectional
    /// relation graphs terminate, each model contributing its fields once.
    fn search_conditions(&self, term: &str) -> Vec<Condition> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        self.collect_search(self.model, "", term, &mut visited, &mut out);
        out
    }

    fn collect_search(
        &self,
        model: &ModelDescriptor,
        prefix: &str,
        term: &str,
        visited: &mut HashSet<String>,
        out: &mut Vec<Condition>,
    ) {
        if !visited.insert(model.name().to_string()) {
            return;
        }

        for name in model.searchable_attributes() {
            out.push(Condition::Compare {
                field: join_field(prefix, name),
                operator: FilterOperator::ILike,
                value: Value::String(format!("%{term}%")),
            });
        }

        for (name, relation) in model.relations() {
            match self.registry.get(&relation.target) {
                Some(target) => {
                    self.collect_search(target, &join_field(prefix, name), term, visited, out);
                }
                None => {
                    tracing::debug!(
                        model = %model.name(),
                        relation = name,
                        target = %relation.target,
                        "skipping search through unresolved relation"
                    );
                }
            }
        }
    }
}

fn join_field(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Build a comparison, normalizing string-matching operators
fn compare(field: &str, op: FilterOperator, value: &Value) -> Condition {
    let (operator, value) = match (op, value.as_str()) {
        (
            FilterOperator::Like
            | FilterOperator::NotLike
            | FilterOperator::ILike
            | FilterOperator::NotILike,
            Some(s),
        ) => (op, Value::String(format!("%{s}%"))),
        (FilterOperator::Substring, Some(s)) => {
            (FilterOperator::Like, Value::String(format!("%{s}%")))
        }
        (FilterOperator::StartsWith, Some(s)) => {
            (FilterOperator::Like, Value::String(format!("{s}%")))
        }
        (FilterOperator::EndsWith, Some(s)) => {
            (FilterOperator::Like, Value::String(format!("%{s}")))
        }
        _ => (op, value.clone()),
    };
    Condition::Compare {
        field: field.to_string(),
        operator,
        value,
    }
}
