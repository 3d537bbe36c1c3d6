//! Schema nodes and capability annotations
//!
//! A [`SchemaNode`] is a persistent, cheaply-cloneable value: annotation
//! calls return a *new* node sharing nothing mutable with the original, so
//! the same sub-schema can be referenced from several parents without one
//! parent's annotations leaking into another.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Resolver captured by a deferred node at definition time
///
/// Resolution failure is a recoverable "not a composite" outcome, never a
/// fatal error.
pub type DeferredResolver = Arc<dyn Fn() -> anyhow::Result<SchemaNode> + Send + Sync>;

/// The kind of a schema node
#[derive(Clone)]
pub enum SchemaKind {
    String,
    Number,
    Boolean,
    Date,
    Enum(Vec<String>),
    Object(IndexMap<String, SchemaNode>),
    Array(Box<SchemaNode>),
    /// A deferred reference, resolved on demand; used to express
    /// self-referential or mutually-recursive schemas
    Deferred(DeferredResolver),
}

impl fmt::Debug for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaKind::String => f.write_str("String"),
            SchemaKind::Number => f.write_str("Number"),
            SchemaKind::Boolean => f.write_str("Boolean"),
            SchemaKind::Date => f.write_str("Date"),
            SchemaKind::Enum(values) => f.debug_tuple("Enum").field(values).finish(),
            SchemaKind::Object(fields) => {
                let names: Vec<&String> = fields.keys().collect();
                f.debug_tuple("Object").field(&names).finish()
            }
            SchemaKind::Array(item) => f.debug_tuple("Array").field(item).finish(),
            SchemaKind::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Capability annotations attached to a node
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Annotations {
    pub(crate) filterable: Option<bool>,
    pub(crate) sortable: Option<bool>,
    pub(crate) queryable: Option<bool>,
    pub(crate) path: Option<Vec<String>>,
}

struct NodeInner {
    kind: SchemaKind,
    annotations: Annotations,
}

/// A node in a schema tree
///
/// Composite nodes (`Object`, `Array`) have children; every other kind is a
/// leaf. Leaves carry the capability annotations read by the walker.
#[derive(Clone)]
pub struct SchemaNode(Arc<NodeInner>);

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaNode")
            .field("kind", &self.0.kind)
            .field("annotations", &self.0.annotations)
            .finish()
    }
}

impl SchemaNode {
    fn new(kind: SchemaKind) -> Self {
        Self(Arc::new(NodeInner {
            kind,
            annotations: Annotations::default(),
        }))
    }

    /// The kind of this node
    pub fn kind(&self) -> &SchemaKind {
        &self.0.kind
    }

    /// Stable identity of this node value, used by the walker's visited set
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    fn annotate(&self, merge: impl FnOnce(&mut Annotations)) -> Self {
        let mut annotations = self.0.annotations.clone();
        merge(&mut annotations);
        Self(Arc::new(NodeInner {
            kind: self.0.kind.clone(),
            annotations,
        }))
    }

    // === Annotation chaining ===

    /// Return a new node marked filterable (or not)
    pub fn filterable(&self, on: bool) -> Self {
        self.annotate(|a| a.filterable = Some(on))
    }

    /// Return a new node marked sortable (or not)
    pub fn sortable(&self, on: bool) -> Self {
        self.annotate(|a| a.sortable = Some(on))
    }

    /// Return a new node marked queryable (or not)
    pub fn queryable(&self, on: bool) -> Self {
        self.annotate(|a| a.queryable = Some(on))
    }

    /// Return a new node aliased to a different dotted path
    ///
    /// The segments are relative to the leaf's parent: a leaf declared as
    /// `mail` with `path(["email"])` surfaces as `email` in queryable
    /// capability maps and path indexes.
    pub fn path<I, S>(&self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        self.annotate(|a| a.path = Some(segments))
    }

    // === Capability predicates ===

    pub fn is_filterable(&self) -> bool {
        self.0.annotations.filterable.unwrap_or(false)
    }

    pub fn is_sortable(&self) -> bool {
        self.0.annotations.sortable.unwrap_or(false)
    }

    pub fn is_queryable(&self) -> bool {
        self.0.annotations.queryable.unwrap_or(false)
    }

    /// The declared path alias, if any
    pub fn path_alias(&self) -> Option<&[String]> {
        self.0.annotations.path.as_deref()
    }

    pub fn has_path_alias(&self) -> bool {
        self.0
            .annotations
            .path
            .as_ref()
            .is_some_and(|p| !p.is_empty())
    }
}

// =============================================================================
// Construction helpers
// =============================================================================

/// A string leaf
pub fn string() -> SchemaNode {
    SchemaNode::new(SchemaKind::String)
}

/// A numeric leaf
pub fn number() -> SchemaNode {
    SchemaNode::new(SchemaKind::Number)
}

/// A boolean leaf
pub fn boolean() -> SchemaNode {
    SchemaNode::new(SchemaKind::Boolean)
}

/// A date leaf
pub fn date() -> SchemaNode {
    SchemaNode::new(SchemaKind::Date)
}

/// An enumerated string leaf
pub fn enumeration<I, S>(values: I) -> SchemaNode
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SchemaNode::new(SchemaKind::Enum(
        values.into_iter().map(Into::into).collect(),
    ))
}

/// An object node with named children, in declaration order
pub fn object<I, K>(fields: I) -> SchemaNode
where
    I: IntoIterator<Item = (K, SchemaNode)>,
    K: Into<String>,
{
    SchemaNode::new(SchemaKind::Object(
        fields
            .into_iter()
            .map(|(name, node)| (name.into(), node))
            .collect(),
    ))
}

/// An array node with a single repeated child
pub fn array(item: SchemaNode) -> SchemaNode {
    SchemaNode::new(SchemaKind::Array(Box::new(item)))
}

/// A deferred node, resolved on demand through `resolver`
///
/// Use for self-referential entity graphs, typically together with a
/// `OnceLock`-backed schema function so resolution is identity-stable:
///
/// ```rust,ignore
/// fn user_schema() -> SchemaNode {
///     static NODE: OnceLock<SchemaNode> = OnceLock::new();
///     NODE.get_or_init(|| object([
///         ("name", string().queryable(true)),
///         ("company", lazy(|| Ok(company_schema()))),
///     ]))
///     .clone()
/// }
/// ```
pub fn lazy<F>(resolver: F) -> SchemaNode
where
    F: Fn() -> anyhow::Result<SchemaNode> + Send + Sync + 'static,
{
    SchemaNode::new(SchemaKind::Deferred(Arc::new(resolver)))
}

/// Wrap an already-built node into a fresh one
///
/// The copy keeps the kind and annotations but has its own identity, so a
/// sub-schema reused under several parents is walked once per `extend` site
/// rather than deduplicated by the visited set.
pub fn extend(node: &SchemaNode) -> SchemaNode {
    SchemaNode(Arc::new(NodeInner {
        kind: node.0.kind.clone(),
        annotations: node.0.annotations.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_defaults_are_false() {
        let node = string();
        assert!(!node.is_filterable());
        assert!(!node.is_sortable());
        assert!(!node.is_queryable());
        assert!(!node.has_path_alias());
        assert_eq!(node.path_alias(), None);
    }

    #[test]
    fn test_chaining_merges_annotations() {
        let node = string().filterable(true).sortable(true).queryable(true);
        assert!(node.is_filterable());
        assert!(node.is_sortable());
        assert!(node.is_queryable());
    }

    #[test]
    fn test_chaining_never_mutates_the_original() {
        let base = string();
        let annotated = base.filterable(true);
        assert!(!base.is_filterable());
        assert!(annotated.is_filterable());
    }

    #[test]
    fn test_later_annotation_overrides_earlier() {
        let node = string().queryable(true).queryable(false);
        assert!(!node.is_queryable());
    }

    #[test]
    fn test_path_alias() {
        let node = string().queryable(true).path(["email"]);
        assert!(node.has_path_alias());
        assert_eq!(node.path_alias(), Some(&["email".to_string()][..]));
    }

    #[test]
    fn test_shared_node_keeps_identity_across_clones() {
        let node = string();
        let clone = node.clone();
        assert_eq!(node.identity(), clone.identity());
    }

    #[test]
    fn test_extend_gets_fresh_identity() {
        let node = string().filterable(true);
        let extended = extend(&node);
        assert_ne!(node.identity(), extended.identity());
        assert!(extended.is_filterable());
    }

    #[test]
    fn test_object_preserves_declaration_order() {
        let node = object([("z", string()), ("a", number()), ("m", boolean())]);
        let SchemaKind::Object(fields) = node.kind() else {
            panic!("expected object kind");
        };
        let names: Vec<&String> = fields.keys().collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_annotations_compose_on_any_kind() {
        assert!(enumeration(["a", "b"]).filterable(true).is_filterable());
        assert!(date().sortable(true).is_sortable());
        assert!(array(string()).queryable(true).is_queryable());
        assert!(
            object([("x", string())])
                .filterable(true)
                .is_filterable()
        );
    }

    #[test]
    fn test_lazy_resolution_failure_is_recoverable() {
        let node = lazy(|| anyhow::bail!("schema not ready"));
        let SchemaKind::Deferred(resolver) = node.kind() else {
            panic!("expected deferred kind");
        };
        assert!(resolver().is_err());
    }
}
