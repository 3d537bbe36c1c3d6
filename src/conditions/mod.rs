//! Filter operator vocabulary and backend condition building

pub mod builder;
pub mod operator;

pub use builder::{Condition, ConditionBuilder};
pub use operator::FilterOperator;
