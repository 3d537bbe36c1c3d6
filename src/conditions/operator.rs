//! The fixed filter operator vocabulary and operand shape contracts

use crate::core::error::{SiftError, SiftResult};
use crate::core::field::FieldValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recognized filter operator
///
/// Every operator carries an operand-shape contract checked by
/// [`validate_operand`](FilterOperator::validate_operand) before any
/// condition is built. Dates travel as ISO-8601 strings in JSON payloads,
/// so the date-accepting operators validate them as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    NotLike,
    ILike,
    NotILike,
    Between,
    NotBetween,
    Is,
    Not,
    Or,
    And,
    StartsWith,
    EndsWith,
    Substring,
}

/// The complete vocabulary, in table order
pub const ALL_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Ne,
    FilterOperator::Gt,
    FilterOperator::Gte,
    FilterOperator::Lt,
    FilterOperator::Lte,
    FilterOperator::In,
    FilterOperator::NotIn,
    FilterOperator::Like,
    FilterOperator::NotLike,
    FilterOperator::ILike,
    FilterOperator::NotILike,
    FilterOperator::Between,
    FilterOperator::NotBetween,
    FilterOperator::Is,
    FilterOperator::Not,
    FilterOperator::Or,
    FilterOperator::And,
    FilterOperator::StartsWith,
    FilterOperator::EndsWith,
    FilterOperator::Substring,
];

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "notIn",
            FilterOperator::Like => "like",
            FilterOperator::NotLike => "notLike",
            FilterOperator::ILike => "iLike",
            FilterOperator::NotILike => "notILike",
            FilterOperator::Between => "between",
            FilterOperator::NotBetween => "notBetween",
            FilterOperator::Is => "is",
            FilterOperator::Not => "not",
            FilterOperator::Or => "or",
            FilterOperator::And => "and",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::Substring => "substring",
        }
    }

    /// Look up an operator by its payload name
    pub fn parse(name: &str) -> Option<Self> {
        ALL_OPERATORS.iter().copied().find(|op| op.as_str() == name)
    }

    /// Like [`parse`](Self::parse), but an unknown name is the hard
    /// [`SiftError::UnsupportedOperator`] error: use where the operator is
    /// wired in by the caller rather than read from a client payload.
    pub fn require(name: &str) -> SiftResult<Self> {
        Self::parse(name).ok_or_else(|| SiftError::unsupported_operator(name))
    }

    /// Whether this operator combines sub-conditions rather than comparing
    /// a field value
    pub fn is_combinator(&self) -> bool {
        matches!(self, FilterOperator::Or | FilterOperator::And)
    }

    /// Validate an operand against this operator's shape contract
    ///
    /// Returns every shape-mismatch message rather than stopping at the
    /// first.
    pub fn validate_operand(&self, value: &Value) -> Result<(), Vec<String>> {
        let mut messages = Vec::new();
        let name = self.as_str();

        match self {
            FilterOperator::Eq | FilterOperator::Ne | FilterOperator::Not => {
                if FieldValue::from_json(value).is_none() {
                    messages.push(format!(
                        "'{name}' expects a string, number, boolean, or null operand (got {})",
                        kind_of(value)
                    ));
                }
            }
            FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte => {
                if !value.is_number() && !value.is_string() {
                    messages.push(format!(
                        "'{name}' expects a number, date, or string operand (got {})",
                        kind_of(value)
                    ));
                }
            }
            FilterOperator::In | FilterOperator::NotIn => {
                if !value.is_array() {
                    messages.push(format!(
                        "'{name}' expects an array operand (got {})",
                        kind_of(value)
                    ));
                }
            }
            FilterOperator::Like
            | FilterOperator::NotLike
            | FilterOperator::ILike
            | FilterOperator::NotILike => match value.as_str() {
                Some(s) => {
                    if s.contains('%') {
                        messages.push(format!(
                            "'{name}' operand must not contain the '%' wildcard"
                        ));
                    }
                }
                None => {
                    messages.push(format!(
                        "'{name}' expects a string operand (got {})",
                        kind_of(value)
                    ));
                }
            },
            FilterOperator::Between | FilterOperator::NotBetween => match value.as_array() {
                Some(items) => {
                    if items.len() != 2 {
                        messages.push(format!(
                            "'{name}' expects exactly 2 elements (got {})",
                            items.len()
                        ));
                    }
                }
                None => {
                    messages.push(format!(
                        "'{name}' expects a two-element array operand (got {})",
                        kind_of(value)
                    ));
                }
            },
            FilterOperator::Is => {
                if !value.is_null() && !value.is_boolean() {
                    messages.push(format!(
                        "'{name}' expects a boolean or null operand (got {})",
                        kind_of(value)
                    ));
                }
            }
            FilterOperator::Or | FilterOperator::And => {
                if !value.is_array() {
                    messages.push(format!(
                        "'{name}' expects an array of sub-conditions (got {})",
                        kind_of(value)
                    ));
                }
            }
            FilterOperator::StartsWith | FilterOperator::EndsWith | FilterOperator::Substring => {
                if !value.is_string() {
                    messages.push(format!(
                        "'{name}' expects a string operand (got {})",
                        kind_of(value)
                    ));
                }
            }
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(messages)
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
