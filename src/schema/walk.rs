//! Capability traversals over annotated schema trees
//!
//! The walker turns an object-shaped [`SchemaNode`] into pruned capability
//! maps (one per capability) and a dotted path index. Traversal mirrors
//! declaration order, never fails, and is cycle-safe: a visited set keyed on
//! node identity is carried through each walk, so a composite reached a
//! second time (shared or cyclic, typically through deferred nodes)
//! contributes an empty branch instead of recursing again. Reuse a sub-schema
//! under several parents through [`extend`](super::node::extend) when both
//! occurrences should be walked.

use super::node::{SchemaKind, SchemaNode};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// A pruned capability tree: field name to leaf marker or nested subtree
///
/// Invariant: a composite key is present only when its subtree is non-empty.
pub type CapabilityMap = IndexMap<String, Capability>;

/// Flat mapping from dotted logical path to dotted physical path
pub type PathIndex = IndexMap<String, String>;

/// A single entry in a capability tree
#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    /// This leaf has the capability; serializes as JSON `true`
    Leaf,
    /// Composite field with at least one capable descendant
    Tree(CapabilityMap),
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Capability::Leaf => serializer.serialize_bool(true),
            Capability::Tree(map) => map.serialize(serializer),
        }
    }
}

/// Check whether a dotted field name is present in a capability tree
///
/// Callers use this to validate client-supplied sort/filter field names
/// against the relevant capability map.
pub fn contains_path(map: &CapabilityMap, dotted: &str) -> bool {
    let mut current = map;
    let mut segments = dotted.split('.').peekable();
    while let Some(segment) = segments.next() {
        match current.get(segment) {
            Some(Capability::Leaf) => return segments.peek().is_none(),
            Some(Capability::Tree(sub)) => current = sub,
            None => return false,
        }
    }
    false
}

#[derive(Clone, Copy, PartialEq)]
enum CapabilityKind {
    Filterable,
    Sortable,
    Queryable,
}

/// Outcome of looking through a child node for a composite to descend into
enum Resolved {
    /// An object node to recurse into
    Composite(SchemaNode),
    /// A deferred node already seen on this walk; the branch is empty
    AlreadyVisited,
    /// Not object-shaped; treat as a leaf
    Leaf,
}

/// Look through arrays and deferred references for an object node
///
/// A resolver that fails is treated as "not a composite" and the node falls
/// back to ordinary leaf handling.
fn composite_view(node: &SchemaNode, visited: &mut HashSet<usize>) -> Resolved {
    match node.kind() {
        SchemaKind::Object(_) => Resolved::Composite(node.clone()),
        SchemaKind::Array(item) => composite_view(item, visited),
        SchemaKind::Deferred(resolver) => {
            if !visited.insert(node.identity()) {
                return Resolved::AlreadyVisited;
            }
            match resolver() {
                Ok(resolved) => composite_view(&resolved, visited),
                Err(err) => {
                    tracing::debug!(error = %err, "deferred schema node failed to resolve, treating as leaf");
                    Resolved::Leaf
                }
            }
        }
        _ => Resolved::Leaf,
    }
}

fn collect_fields(
    node: &SchemaNode,
    capability: CapabilityKind,
    visited: &mut HashSet<usize>,
) -> CapabilityMap {
    let mut out = CapabilityMap::new();
    let SchemaKind::Object(fields) = node.kind() else {
        return out;
    };

    for (name, child) in fields {
        match composite_view(child, visited) {
            Resolved::Composite(composite) => {
                if !visited.insert(composite.identity()) {
                    continue;
                }
                let sub = collect_fields(&composite, capability, visited);
                if !sub.is_empty() {
                    out.insert(name.clone(), Capability::Tree(sub));
                }
            }
            Resolved::AlreadyVisited => {}
            Resolved::Leaf => {
                let flagged = match capability {
                    CapabilityKind::Filterable => child.is_filterable(),
                    CapabilityKind::Sortable => child.is_sortable(),
                    CapabilityKind::Queryable => child.is_queryable(),
                };
                if !flagged {
                    continue;
                }
                match (capability, child.path_alias()) {
                    (CapabilityKind::Queryable, Some(alias)) if !alias.is_empty() => {
                        insert_alias(&mut out, alias);
                    }
                    _ => {
                        out.insert(name.clone(), Capability::Leaf);
                    }
                }
            }
        }
    }
    out
}

/// Record a leaf under its alias segments, nesting for multi-segment aliases
fn insert_alias(out: &mut CapabilityMap, segments: &[String]) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        out.entry(first.clone()).or_insert(Capability::Leaf);
        return;
    }
    let entry = out
        .entry(first.clone())
        .or_insert_with(|| Capability::Tree(CapabilityMap::new()));
    if let Capability::Tree(sub) = entry {
        insert_alias(sub, rest);
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn collect_paths(
    node: &SchemaNode,
    prefix: &str,
    out: &mut PathIndex,
    visited: &mut HashSet<usize>,
) {
    let SchemaKind::Object(fields) = node.kind() else {
        return;
    };

    for (name, child) in fields {
        match composite_view(child, visited) {
            Resolved::Composite(composite) => {
                if !visited.insert(composite.identity()) {
                    continue;
                }
                collect_paths(&composite, &join_path(prefix, name), out, visited);
            }
            Resolved::AlreadyVisited => {}
            Resolved::Leaf => {
                let logical = join_path(prefix, name);
                match child.path_alias() {
                    Some(alias) if !alias.is_empty() => {
                        let physical = join_path(prefix, &alias.join("."));
                        out.insert(logical, physical.clone());
                        // alias target maps to itself so lookups are idempotent
                        out.insert(physical.clone(), physical);
                    }
                    _ => {
                        out.insert(logical.clone(), logical);
                    }
                }
            }
        }
    }
}

impl SchemaNode {
    fn walk_capability(&self, capability: CapabilityKind) -> CapabilityMap {
        let mut visited = HashSet::new();
        visited.insert(self.identity());
        collect_fields(self, capability, &mut visited)
    }

    /// Pruned tree of fields marked filterable
    pub fn filterable_fields(&self) -> CapabilityMap {
        self.walk_capability(CapabilityKind::Filterable)
    }

    /// Pruned tree of fields marked sortable
    pub fn sortable_fields(&self) -> CapabilityMap {
        self.walk_capability(CapabilityKind::Sortable)
    }

    /// Pruned tree of fields marked queryable, with path aliases applied
    ///
    /// An aliased leaf is recorded under its alias segments instead of its
    /// declared key.
    pub fn queryable_fields(&self) -> CapabilityMap {
        self.walk_capability(CapabilityKind::Queryable)
    }

    /// Dotted path index over every leaf field
    ///
    /// Each leaf maps its structural dotted key to its physical dotted key:
    /// identity without an alias; the parent prefix joined with the alias
    /// segments otherwise, in which case the alias target also maps to
    /// itself.
    pub fn path_index(&self) -> PathIndex {
        let mut visited = HashSet::new();
        visited.insert(self.identity());
        let mut out = PathIndex::new();
        collect_paths(self, "", &mut out, &mut visited);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::{array, extend, lazy, number, object, string};
    use serde_json::json;
    use std::sync::OnceLock;

    fn as_json(map: &CapabilityMap) -> serde_json::Value {
        serde_json::to_value(map).expect("capability maps always serialize")
    }

    // === Pruning ===

    #[test]
    fn test_queryable_prunes_empty_branches() {
        let schema = object([
            ("name", string().queryable(true)),
            (
                "profile",
                object([
                    ("bio", string().queryable(true)),
                    ("website", string()),
                ]),
            ),
        ]);
        assert_eq!(
            as_json(&schema.queryable_fields()),
            json!({"name": true, "profile": {"bio": true}})
        );
    }

    #[test]
    fn test_fully_empty_composite_is_invisible() {
        let schema = object([
            ("name", string().queryable(true)),
            (
                "settings",
                object([("theme", string()), ("locale", string())]),
            ),
        ]);
        assert_eq!(as_json(&schema.queryable_fields()), json!({"name": true}));
    }

    #[test]
    fn test_deeply_nested_empty_branches_prune_transitively() {
        let schema = object([(
            "a",
            object([("b", object([("c", string())]))]),
        )]);
        assert!(schema.filterable_fields().is_empty());
    }

    #[test]
    fn test_non_object_root_yields_empty_maps() {
        assert!(string().queryable(true).queryable_fields().is_empty());
        assert!(array(string()).path_index().is_empty());
    }

    // === Parallel traversals ===

    #[test]
    fn test_capability_kinds_are_independent() {
        let schema = object([
            ("age", number().filterable(true).sortable(true)),
            ("name", string().queryable(true)),
        ]);
        assert_eq!(as_json(&schema.filterable_fields()), json!({"age": true}));
        assert_eq!(as_json(&schema.sortable_fields()), json!({"age": true}));
        assert_eq!(as_json(&schema.queryable_fields()), json!({"name": true}));
    }

    #[test]
    fn test_traversal_mirrors_declaration_order() {
        let schema = object([
            ("z", string().sortable(true)),
            ("a", string().sortable(true)),
            ("m", string().sortable(true)),
        ]);
        let sortable = schema.sortable_fields();
        let keys: Vec<&String> = sortable.keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    // === Arrays ===

    #[test]
    fn test_array_of_objects_recurses_into_item() {
        let schema = object([(
            "tags",
            array(object([("label", string().filterable(true))])),
        )]);
        assert_eq!(
            as_json(&schema.filterable_fields()),
            json!({"tags": {"label": true}})
        );
    }

    #[test]
    fn test_array_of_scalars_is_a_leaf() {
        let schema = object([("tags", array(string()).filterable(true))]);
        assert_eq!(as_json(&schema.filterable_fields()), json!({"tags": true}));
    }

    // === Path aliases ===

    #[test]
    fn test_queryable_alias_replaces_declared_key() {
        let schema = object([
            ("name", string().queryable(true)),
            ("mail", string().queryable(true).path(["email"])),
        ]);
        let fields = schema.queryable_fields();
        assert_eq!(as_json(&fields), json!({"name": true, "email": true}));
        assert!(!fields.contains_key("mail"));
    }

    #[test]
    fn test_multi_segment_alias_nests() {
        let schema = object([(
            "contact_mail",
            string().queryable(true).path(["contact", "email"]),
        )]);
        assert_eq!(
            as_json(&schema.queryable_fields()),
            json!({"contact": {"email": true}})
        );
    }

    #[test]
    fn test_alias_ignored_for_other_capabilities() {
        let schema = object([("mail", string().filterable(true).path(["email"]))]);
        assert_eq!(as_json(&schema.filterable_fields()), json!({"mail": true}));
    }

    // === Path index ===

    #[test]
    fn test_path_index_identity_and_alias_entries() {
        let schema = object([
            ("name", string()),
            (
                "profile",
                object([
                    ("mail", string().path(["email"])),
                    ("bio", string()),
                ]),
            ),
        ]);
        let index = schema.path_index();
        assert_eq!(index.get("name"), Some(&"name".to_string()));
        assert_eq!(index.get("profile.mail"), Some(&"profile.email".to_string()));
        assert_eq!(
            index.get("profile.email"),
            Some(&"profile.email".to_string())
        );
        assert_eq!(index.get("profile.bio"), Some(&"profile.bio".to_string()));
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_path_index_lookup_is_idempotent() {
        let schema = object([("mail", string().path(["email"]))]);
        let index = schema.path_index();
        let physical = index.get("mail").expect("structural key present");
        assert_eq!(index.get(physical), Some(physical));
    }

    // === Cycle safety ===

    fn side_a() -> SchemaNode {
        static NODE: OnceLock<SchemaNode> = OnceLock::new();
        NODE.get_or_init(|| {
            object([
                ("name", string().queryable(true).filterable(true)),
                ("b", lazy(|| Ok(side_b()))),
            ])
        })
        .clone()
    }

    fn side_b() -> SchemaNode {
        static NODE: OnceLock<SchemaNode> = OnceLock::new();
        NODE.get_or_init(|| {
            object([
                ("title", string().queryable(true)),
                ("a", lazy(|| Ok(side_a()))),
            ])
        })
        .clone()
    }

    #[test]
    fn test_mutually_lazy_schemas_resolve_each_side_once() {
        assert_eq!(
            as_json(&side_a().queryable_fields()),
            json!({"name": true, "b": {"title": true}})
        );
        assert_eq!(
            as_json(&side_b().queryable_fields()),
            json!({"title": true, "a": {"name": true}})
        );
    }

    #[test]
    fn test_cyclic_schema_terminates_for_every_walk() {
        let a = side_a();
        a.filterable_fields();
        a.sortable_fields();
        a.queryable_fields();
        let index = a.path_index();
        assert_eq!(index.get("name"), Some(&"name".to_string()));
        assert_eq!(index.get("b.title"), Some(&"b.title".to_string()));
        assert_eq!(index.get("b.a"), None);
    }

    #[test]
    fn test_self_referential_schema_terminates() {
        fn tree() -> SchemaNode {
            static NODE: OnceLock<SchemaNode> = OnceLock::new();
            NODE.get_or_init(|| {
                object([
                    ("label", string().queryable(true)),
                    ("children", array(lazy(|| Ok(tree())))),
                ])
            })
            .clone()
        }
        assert_eq!(as_json(&tree().queryable_fields()), json!({"label": true}));
    }

    // === Deferred resolution failure ===

    #[test]
    fn test_failing_resolver_is_skipped_silently() {
        let schema = object([
            ("name", string().queryable(true)),
            ("broken", lazy(|| anyhow::bail!("unavailable"))),
        ]);
        assert_eq!(as_json(&schema.queryable_fields()), json!({"name": true}));
    }

    #[test]
    fn test_failing_resolver_with_flags_is_an_ordinary_leaf() {
        let schema = object([(
            "broken",
            lazy(|| anyhow::bail!("unavailable")).queryable(true),
        )]);
        assert_eq!(as_json(&schema.queryable_fields()), json!({"broken": true}));
    }

    // === Shared sub-schemas ===

    #[test]
    fn test_extend_lets_a_subtree_appear_twice() {
        let address = object([("city", string().filterable(true))]);
        let schema = object([
            ("home", extend(&address)),
            ("work", extend(&address)),
        ]);
        assert_eq!(
            as_json(&schema.filterable_fields()),
            json!({"home": {"city": true}, "work": {"city": true}})
        );
    }

    // === contains_path ===

    #[test]
    fn test_contains_path_matches_leaves_only() {
        let schema = object([
            ("name", string().sortable(true)),
            ("profile", object([("bio", string().sortable(true))])),
        ]);
        let sortable = schema.sortable_fields();
        assert!(contains_path(&sortable, "name"));
        assert!(contains_path(&sortable, "profile.bio"));
        assert!(!contains_path(&sortable, "profile"));
        assert!(!contains_path(&sortable, "name.extra"));
        assert!(!contains_path(&sortable, "missing"));
    }
}
