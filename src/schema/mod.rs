//! Schema tree definition, capability annotation, and traversal

pub mod node;
pub mod walk;

pub use node::{
    SchemaKind, SchemaNode, array, boolean, date, enumeration, extend, lazy, number, object,
    string,
};
pub use walk::{Capability, CapabilityMap, PathIndex, contains_path};
