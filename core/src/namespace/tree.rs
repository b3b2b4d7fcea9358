//! The namespace tree: an arena of nodes with a "current namespace" cursor.
//!
//! Nodes live in a generational arena and refer to each other by `NodeId`.
//! Each node exclusively owns its children (by id) and holds a map of entity
//! slots. An entity slot is an `Rc<RefCell<T>>`; linking clones the `Rc`, so
//! the strong count is the number of slots referencing the entity and the
//! value is handed to the liberator when the last slot goes away.
//!
//! A `FakeFs` is single-threaded (`!Send`, `!Sync`) and every mutating call
//! takes `&mut self`, so each operation has exclusive access for its duration.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use generational_arena::{Arena, Index};
use log::debug;

use super::liberator::{Liberator, NoopLiberator};
use super::path::{validate_name, NamespacePath, Resolution};
use crate::error::FsError;
use crate::settings::FsSettings;


/// Shared, mutable box behind every entity slot.
pub(crate) type EntityBox<T> = Rc<RefCell<T>>;


/// Handle to a namespace node. Stale handles (of deleted namespaces) never
/// alias a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);


pub(crate) struct Node<T> {
    /// Local label, empty for the root.
    pub(crate) name: String,
    /// Back-reference used for path reconstruction only.
    pub(crate) parent: Option<NodeId>,
    /// Owned children, in insertion order.
    pub(crate) children: Vec<NodeId>,
    pub(crate) entities: BTreeMap<String, EntityBox<T>>,
}

impl<T> Node<T> {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Node {
            name,
            parent,
            children: Vec::new(),
            entities: BTreeMap::new(),
        }
    }
}


/// Hierarchical namespace store ("fake filesystem") holding values of type
/// `T`, released through `L` when no slot references them any more.
pub struct FakeFs<T, L: Liberator<T> = NoopLiberator> {
    pub(crate) nodes: Arena<Node<T>>,
    pub(crate) root: NodeId,
    pub(crate) cursor: NodeId,
    pub(crate) liberator: L,
    pub(crate) settings: FsSettings,
}

impl<T> FakeFs<T, NoopLiberator> {
    /// Empty store for values that own no external resource.
    pub fn new() -> Self {
        Self::with_liberator(NoopLiberator)
    }
}

impl<T> Default for FakeFs<T, NoopLiberator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, L: Liberator<T>> FakeFs<T, L> {
    pub fn with_liberator(liberator: L) -> Self {
        Self::from_parts(liberator, FsSettings::default())
    }

    /// Fails with `FsError::Settings` if `settings` would break the save
    /// format (see `FsSettings::validate`).
    pub fn with_settings(liberator: L, settings: FsSettings) -> Result<Self, FsError> {
        settings.validate()?;
        Ok(Self::from_parts(liberator, settings))
    }

    fn from_parts(liberator: L, settings: FsSettings) -> Self {
        let mut nodes = Arena::new();
        let root = NodeId(nodes.insert(Node::new(String::new(), None)));
        FakeFs {
            nodes,
            root,
            cursor: root,
            liberator,
            settings,
        }
    }

    pub fn settings(&self) -> &FsSettings {
        &self.settings
    }

    pub fn liberator(&self) -> &L {
        &self.liberator
    }

    pub fn liberator_mut(&mut self) -> &mut L {
        &mut self.liberator
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The current namespace.
    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// Number of live namespaces, root included.
    pub fn namespace_count(&self) -> usize {
        self.nodes.len()
    }

    /// Checked lookup for handles that come from outside.
    pub(crate) fn live(&self, id: NodeId) -> Result<&Node<T>, FsError> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| FsError::NotFound(format!("{:?}", id)))
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.0]
    }

    // -------------------------------------------------------------------
    // Path resolution
    // -------------------------------------------------------------------

    pub fn parse_path(&self, path: &str) -> Result<NamespacePath, FsError> {
        NamespacePath::parse(path, self.settings.separator)
    }

    /// Resolve `path` as far as existing namespaces allow.
    ///
    /// Absolute paths start at the root, relative ones at the cursor. Never
    /// creates or mutates anything.
    pub fn resolve(&self, path: &str) -> Result<Resolution<NodeId>, FsError> {
        let parsed = self.parse_path(path)?;
        Ok(self.resolve_from(self.cursor, &parsed))
    }

    /// Resolve a parsed path; relative paths start at `start`.
    pub(crate) fn resolve_from(&self, start: NodeId, path: &NamespacePath) -> Resolution<NodeId> {
        let mut node = if path.absolute { self.root } else { start };
        let mut consumed = 0;
        for seg in &path.segments {
            match self.child(node, seg) {
                Some(next) => {
                    node = next;
                    consumed += 1;
                }
                None => break,
            }
        }
        Resolution {
            node,
            rest: path.segments[consumed..].to_vec(),
        }
    }

    pub(crate) fn child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.node(node)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).name == name)
    }

    /// Entities and child namespaces share one name space per node.
    pub(crate) fn name_taken(&self, node: NodeId, name: &str) -> bool {
        self.node(node).entities.contains_key(name) || self.child(node, name).is_some()
    }

    // -------------------------------------------------------------------
    // Namespace operations
    // -------------------------------------------------------------------

    /// Create every missing namespace along `path`.
    ///
    /// Fails with `AlreadyExists` if the path already names a namespace, or
    /// if the first missing segment is taken by an entity.
    pub fn create_namespace(&mut self, path: &str) -> Result<NodeId, FsError> {
        let parsed = self.parse_path(path)?;
        let res = self.resolve_from(self.cursor, &parsed);
        if res.is_complete() {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        if self.node(res.node).entities.contains_key(&res.rest[0]) {
            return Err(FsError::AlreadyExists(path.to_string()));
        }

        let mut node = res.node;
        for seg in res.rest {
            node = self.create_child(node, seg);
        }
        Ok(node)
    }

    /// Caller guarantees `name` is valid and free in `parent`.
    pub(crate) fn create_child(&mut self, parent: NodeId, name: String) -> NodeId {
        let id = NodeId(self.nodes.insert(Node::new(name, Some(parent))));
        self.node_mut(parent).children.push(id);
        id
    }

    /// Delete the namespace at `path` and everything below it.
    ///
    /// A path that does not fully resolve is a `NotFound` no-op. Entities in
    /// the subtree lose one reference per slot; those reaching zero are
    /// released. A cursor inside the subtree moves back to the root.
    pub fn delete_namespace(&mut self, path: &str) -> Result<(), FsError> {
        let parsed = self.parse_path(path)?;
        if !parsed.absolute && parsed.segments.is_empty() {
            return Err(FsError::invalid(path, "empty path"));
        }
        let res = self.resolve_from(self.cursor, &parsed);
        if !res.is_complete() {
            return Err(FsError::NotFound(path.to_string()));
        }
        let target = res.node;
        if target == self.root {
            return Err(FsError::RootNamespace);
        }

        if self.is_within(self.cursor, target) {
            self.cursor = self.root;
        }
        if let Some(parent) = self.node(target).parent {
            self.node_mut(parent).children.retain(|&c| c != target);
        }
        debug!("deleting namespace {}", self.path_of(target));
        self.destroy_subtree(target);
        Ok(())
    }

    pub fn exists_namespace(&self, path: &str) -> bool {
        self.resolve(path).map(|r| r.is_complete()).unwrap_or(false)
    }

    /// Move the cursor to `path`. On failure the cursor is unchanged.
    pub fn enter_namespace(&mut self, path: &str) -> Result<(), FsError> {
        let res = self.resolve(path)?;
        if !res.is_complete() {
            return Err(FsError::NotFound(path.to_string()));
        }
        self.cursor = res.node;
        Ok(())
    }

    /// Move the cursor to a namespace by handle.
    pub fn enter_node(&mut self, id: NodeId) -> Result<(), FsError> {
        if !self.nodes.contains(id.0) {
            return Err(FsError::NotFound(format!("{:?}", id)));
        }
        self.cursor = id;
        Ok(())
    }

    /// Absolute path of the cursor.
    pub fn actual_namespace(&self) -> String {
        self.path_of(self.cursor)
    }

    /// Absolute path of a namespace, or `NotFound` for a stale handle.
    pub fn namespace_path(&self, id: NodeId) -> Result<String, FsError> {
        self.live(id)?;
        Ok(self.path_of(id))
    }

    /// Rebuilt by walking parent links. `id` must be live.
    pub(crate) fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut node = id;
        while let Some(parent) = self.node(node).parent {
            names.push(self.node(node).name.as_str());
            node = parent;
        }
        let sep = self.settings.separator;
        if names.is_empty() {
            return sep.to_string();
        }
        let mut out = String::new();
        for name in names.iter().rev() {
            out.push(sep);
            out.push_str(name);
        }
        out
    }

    /// Names of the cursor's direct children, in insertion order.
    pub fn list_namespaces(&self) -> Vec<String> {
        self.child_names(self.node(self.cursor))
    }

    pub fn children_of(&self, id: NodeId) -> Result<Vec<String>, FsError> {
        Ok(self.child_names(self.live(id)?))
    }

    fn child_names(&self, node: &Node<T>) -> Vec<String> {
        node.children.iter().map(|&c| self.node(c).name.clone()).collect()
    }

    /// Drop the whole tree and start over with an empty root.
    pub fn clear(&mut self) {
        let old_root = self.root;
        self.destroy_subtree(old_root);
        self.root = NodeId(self.nodes.insert(Node::new(String::new(), None)));
        self.cursor = self.root;
    }

    // -------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------

    /// True if `node` is `ancestor` or lies below it.
    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Remove `id` and all descendants from the arena, releasing every
    /// entity slot they hold. Does not touch the parent's child list.
    fn destroy_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.nodes.remove(next.0) else {
                continue;
            };
            stack.extend(node.children);
            for slot in node.entities.into_values() {
                release_slot(&mut self.liberator, slot);
            }
        }
    }

    /// Validate `name` against the configured separator.
    pub(crate) fn check_name(&self, name: &str) -> Result<(), FsError> {
        validate_name(name, self.settings.separator)
    }
}

impl<T, L: Liberator<T>> Drop for FakeFs<T, L> {
    fn drop(&mut self) {
        let root = self.root;
        self.destroy_subtree(root);
    }
}


/// Give up one reference; the last one hands the value to the liberator.
pub(crate) fn release_slot<T, L: Liberator<T>>(liberator: &mut L, slot: EntityBox<T>) {
    if let Ok(cell) = Rc::try_unwrap(slot) {
        liberator.release(cell.into_inner());
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FakeFs<String> {
        FakeFs::new()
    }

    #[test]
    fn new_store_is_at_root() {
        let fs = store();
        assert_eq!(fs.actual_namespace(), "/");
        assert_eq!(fs.cursor(), fs.root());
        assert!(fs.list_namespaces().is_empty());
        assert_eq!(fs.namespace_count(), 1);
    }

    #[test]
    fn create_namespace_builds_missing_segments() {
        let mut fs = store();
        fs.create_namespace("/a/b/c").unwrap();
        assert!(fs.exists_namespace("/a"));
        assert!(fs.exists_namespace("/a/b"));
        assert!(fs.exists_namespace("/a/b/c"));
        assert_eq!(fs.namespace_count(), 4);
    }

    #[test]
    fn create_namespace_reuses_prefix() {
        let mut fs = store();
        fs.create_namespace("/a/b").unwrap();
        fs.create_namespace("/a/c").unwrap();
        fs.enter_namespace("/a").unwrap();
        assert_eq!(fs.list_namespaces(), vec!["b", "c"]);
    }

    #[test]
    fn create_namespace_twice_fails() {
        let mut fs = store();
        fs.create_namespace("x").unwrap();
        fs.enter_namespace("x").unwrap();
        fs.create_entity("keep", "me".to_string()).unwrap();
        fs.enter_namespace("/").unwrap();

        let err = fs.create_namespace("x").unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists(_)));

        fs.enter_namespace("x").unwrap();
        assert_eq!(fs.entity_value("keep"), "me");
    }

    #[test]
    fn create_root_fails() {
        let mut fs = store();
        assert!(fs.create_namespace("/").is_err());
        assert!(fs.create_namespace("").is_err());
    }

    #[test]
    fn create_namespace_over_entity_fails() {
        let mut fs = store();
        fs.create_entity("x", "v".to_string()).unwrap();
        let err = fs.create_namespace("x/y").unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists(_)));
        assert!(!fs.exists_namespace("x"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut fs = store();
        fs.create_namespace("/a/b").unwrap();
        fs.enter_namespace("/a").unwrap();

        let rel = fs.resolve("b").unwrap();
        let abs = fs.resolve("/a/b").unwrap();
        assert!(rel.is_complete());
        assert_eq!(rel.node, abs.node);

        let missing = fs.resolve("c").unwrap();
        assert_eq!(missing.node, fs.cursor());
        assert_eq!(missing.rest, vec!["c"]);
        assert_eq!(fs.namespace_path(missing.node).unwrap(), "/a");
    }

    #[test]
    fn resolve_stops_at_first_missing_segment() {
        let mut fs = store();
        fs.create_namespace("/a").unwrap();
        let res = fs.resolve("/a/x/y").unwrap();
        assert_eq!(fs.namespace_path(res.node).unwrap(), "/a");
        assert_eq!(res.rest, vec!["x", "y"]);
    }

    #[test]
    fn enter_namespace_missing_leaves_cursor() {
        let mut fs = store();
        fs.create_namespace("/a").unwrap();
        fs.enter_namespace("/a").unwrap();
        assert!(fs.enter_namespace("/nope").is_err());
        assert_eq!(fs.actual_namespace(), "/a");
    }

    #[test]
    fn relative_enter_walks_from_cursor() {
        let mut fs = store();
        fs.create_namespace("/a/b/c").unwrap();
        fs.enter_namespace("a").unwrap();
        fs.enter_namespace("b/c").unwrap();
        assert_eq!(fs.actual_namespace(), "/a/b/c");
    }

    #[test]
    fn delete_namespace_removes_subtree() {
        let mut fs = store();
        fs.create_namespace("/a/b/c").unwrap();
        fs.create_namespace("/a/d").unwrap();
        fs.delete_namespace("/a/b").unwrap();
        assert!(!fs.exists_namespace("/a/b"));
        assert!(!fs.exists_namespace("/a/b/c"));
        assert!(fs.exists_namespace("/a/d"));
        assert_eq!(fs.namespace_count(), 3);
    }

    #[test]
    fn delete_missing_namespace_is_not_found() {
        let mut fs = store();
        fs.create_namespace("/a").unwrap();
        let err = fs.delete_namespace("/a/zzz").unwrap_err();
        assert!(matches!(err, FsError::NotFound(_)));
        assert!(fs.exists_namespace("/a"));
    }

    #[test]
    fn delete_root_is_rejected() {
        let mut fs = store();
        assert!(matches!(fs.delete_namespace("/"), Err(FsError::RootNamespace)));
        assert!(matches!(fs.delete_namespace(""), Err(FsError::InvalidPath { .. })));
    }

    #[test]
    fn delete_namespace_containing_cursor_resets_cursor() {
        let mut fs = store();
        fs.create_namespace("/a/b").unwrap();
        fs.enter_namespace("/a/b").unwrap();
        fs.delete_namespace("/a").unwrap();
        assert_eq!(fs.actual_namespace(), "/");
    }

    #[test]
    fn stale_node_handle_is_rejected() {
        let mut fs = store();
        let id = fs.create_namespace("/a").unwrap();
        fs.delete_namespace("/a").unwrap();
        fs.create_namespace("/b").unwrap();
        assert!(fs.enter_node(id).is_err());
    }

    #[test]
    fn stale_node_handle_in_queries() {
        let mut fs = store();
        let id = fs.create_namespace("/a/b").unwrap();
        fs.delete_namespace("/a").unwrap();
        assert!(matches!(fs.namespace_path(id), Err(FsError::NotFound(_))));
        assert!(matches!(fs.children_of(id), Err(FsError::NotFound(_))));
        assert!(matches!(fs.entities_of(id), Err(FsError::NotFound(_))));
        assert_eq!(fs.children_of(fs.root()).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn actual_namespace_reports_path() {
        let mut fs = store();
        fs.create_namespace("/chars/heroes").unwrap();
        fs.enter_namespace("/chars/heroes").unwrap();
        assert_eq!(fs.actual_namespace(), "/chars/heroes");
    }

    #[test]
    fn custom_separator() {
        let settings = FsSettings { separator: ':', ..FsSettings::default() };
        let mut fs: FakeFs<String> = FakeFs::with_settings(NoopLiberator, settings).unwrap();
        fs.create_namespace(":cfg:video").unwrap();
        fs.enter_namespace(":cfg:video").unwrap();
        assert_eq!(fs.actual_namespace(), ":cfg:video");
    }

    #[test]
    fn settings_that_break_the_format_are_rejected() {
        let settings = FsSettings { separator: '{', ..FsSettings::default() };
        let res: Result<FakeFs<String>, _> = FakeFs::with_settings(NoopLiberator, settings);
        assert!(matches!(res, Err(FsError::Settings(_))));
    }

    #[test]
    fn listing_reflects_live_children_only() {
        let mut fs = store();
        fs.create_namespace("a").unwrap();
        fs.create_namespace("b").unwrap();
        fs.create_namespace("c").unwrap();
        fs.delete_namespace("b").unwrap();
        fs.create_namespace("b").unwrap();
        assert_eq!(fs.list_namespaces(), vec!["a", "c", "b"]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut fs = store();
        fs.create_namespace("/a/b").unwrap();
        fs.enter_namespace("/a").unwrap();
        fs.create_entity("k", "v".to_string()).unwrap();
        fs.clear();
        assert_eq!(fs.actual_namespace(), "/");
        assert!(fs.list_namespaces().is_empty());
        assert!(fs.list_entities().is_empty());
        assert_eq!(fs.namespace_count(), 1);
    }

    #[test]
    fn invalid_path_is_reported() {
        let mut fs = store();
        assert!(matches!(
            fs.create_namespace("a/../b"),
            Err(FsError::InvalidPath { .. })
        ));
        assert!(!fs.exists_namespace(".."));
    }
}
