//! Core module containing shared types for the library

pub mod error;
pub mod field;
pub mod query;

pub use error::{SiftError, SiftResult};
pub use field::FieldValue;
pub use query::{FilterItem, FilterPayload, Page, PageMeta, Pagination, SortItem, SortOrder};
