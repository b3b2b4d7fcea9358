//! Entity operations: named, reference-counted values inside a namespace.
//!
//! The public methods act on the cursor's namespace. The `*_in` variants
//! take an explicit node and back both the public API and `load`.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use super::liberator::Liberator;
use super::tree::{release_slot, FakeFs, NodeId};
use crate::error::FsError;


impl<T, L: Liberator<T>> FakeFs<T, L> {
    /// Create an entity with refcount 1 in the current namespace.
    ///
    /// Fails if the name is invalid or taken by an entity or a child
    /// namespace. A rejected `value` is handed to the liberator.
    pub fn create_entity(&mut self, name: &str, value: T) -> Result<(), FsError> {
        self.create_entity_in(self.cursor, name, value)
    }

    pub(crate) fn create_entity_in(&mut self, node: NodeId, name: &str, value: T) -> Result<(), FsError> {
        let checked = match self.check_name(name) {
            Ok(()) if self.name_taken(node, name) => Err(FsError::AlreadyExists(name.to_string())),
            other => other,
        };
        if let Err(e) = checked {
            self.liberator.release(value);
            return Err(e);
        }
        self.node_mut(node)
            .entities
            .insert(name.to_string(), Rc::new(RefCell::new(value)));
        Ok(())
    }

    /// Drop the slot `name`. The value is released if this was its last
    /// slot. Returns false (and does nothing) if there is no such entity.
    pub fn delete_entity(&mut self, name: &str) -> bool {
        let cursor = self.cursor;
        let removed = self.node_mut(cursor).entities.remove(name);
        match removed {
            Some(slot) => {
                release_slot(&mut self.liberator, slot);
                true
            }
            None => false,
        }
    }

    pub fn exists_entity(&self, name: &str) -> bool {
        self.node(self.cursor).entities.contains_key(name)
    }

    /// Overwrite the value in place; every alias sees the new value.
    ///
    /// The liberator is *not* called on the previous value: it is handed
    /// back and releasing it is up to the caller.
    pub fn set_entity_value(&mut self, name: &str, value: T) -> Result<T, FsError> {
        let slot = self.slot(name)?;
        let old = slot.replace(value);
        Ok(old)
    }

    /// Mutate the value in place through `f`.
    pub fn update_entity<R>(&mut self, name: &str, f: impl FnOnce(&mut T) -> R) -> Result<R, FsError> {
        let slot = self.slot(name)?;
        let mut value = slot.borrow_mut();
        Ok(f(&mut value))
    }

    /// Borrow the value, or `None` if absent.
    pub fn get_entity(&self, name: &str) -> Option<Ref<'_, T>> {
        self.node(self.cursor).entities.get(name).map(|slot| slot.borrow())
    }

    /// A copy of the value, or `T::default()` if absent.
    ///
    /// A stored default and a missing entity look the same here; pair with
    /// `exists_entity` (or use `get_entity`) when that matters.
    pub fn entity_value(&self, name: &str) -> T
    where
        T: Clone + Default,
    {
        self.get_entity(name).map(|v| v.clone()).unwrap_or_default()
    }

    /// How many slots currently reference the entity.
    pub fn entity_refcount(&self, name: &str) -> Option<usize> {
        self.node(self.cursor).entities.get(name).map(Rc::strong_count)
    }

    /// Add a slot `name` in the current namespace sharing the entity at
    /// `target`.
    ///
    /// `target` must name an entity: its last segment has to be an entity
    /// in the namespace the rest of the path resolves to.
    pub fn link(&mut self, name: &str, target: &str) -> Result<(), FsError> {
        self.link_in(self.cursor, name, target)
    }

    /// Relative targets resolve against `node`.
    pub(crate) fn link_in(&mut self, node: NodeId, name: &str, target: &str) -> Result<(), FsError> {
        self.check_name(name)?;
        if self.name_taken(node, name) {
            return Err(FsError::AlreadyExists(name.to_string()));
        }

        let parsed = self.parse_path(target)?;
        let res = self.resolve_from(node, &parsed);
        if res.is_complete() {
            return Err(FsError::NotAnEntity(target.to_string()));
        }
        if res.rest.len() != 1 {
            return Err(FsError::NotFound(target.to_string()));
        }
        let shared = self
            .node(res.node)
            .entities
            .get(&res.rest[0])
            .cloned()
            .ok_or_else(|| FsError::NotFound(target.to_string()))?;

        self.node_mut(node).entities.insert(name.to_string(), shared);
        Ok(())
    }

    /// Move the slot `from` to `to` within the current namespace. The
    /// reference count is unchanged.
    pub fn rename_entity(&mut self, from: &str, to: &str) -> Result<(), FsError> {
        self.check_name(to)?;
        let cursor = self.cursor;
        if !self.node(cursor).entities.contains_key(from) {
            return Err(FsError::NotFound(from.to_string()));
        }
        if from == to {
            return Ok(());
        }
        if self.name_taken(cursor, to) {
            return Err(FsError::AlreadyExists(to.to_string()));
        }
        let entities = &mut self.node_mut(cursor).entities;
        if let Some(slot) = entities.remove(from) {
            entities.insert(to.to_string(), slot);
        }
        Ok(())
    }

    /// Entity names in the current namespace.
    pub fn list_entities(&self) -> Vec<String> {
        self.node(self.cursor).entities.keys().cloned().collect()
    }

    /// `NotFound` for a stale handle.
    pub fn entities_of(&self, id: NodeId) -> Result<Vec<String>, FsError> {
        Ok(self.live(id)?.entities.keys().cloned().collect())
    }

    fn slot(&self, name: &str) -> Result<&RefCell<T>, FsError> {
        self.node(self.cursor)
            .entities
            .get(name)
            .map(|slot| &**slot)
            .ok_or_else(|| FsError::NotFound(name.to_string()))
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
