//! Component Stores - Per-slot state that survives matched updates.
//!
//! A store is created when a component slot is first attached and handed
//! from the old virtual node to the new one on every matched update. It is
//! freed when the slot is torn down.
//!
//! Besides user values it keeps the slot's lifecycle hooks and a pointer to
//! the virtual node currently rendering it, so `refresh()` always lands on
//! the live instance.

use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::error::Result;

use super::arena::VNodeId;
use super::context::ComponentContext;

/// Handle to a component store. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(u64);

/// Component lifecycle hook.
pub type Hook = Rc<dyn Fn(&mut ComponentContext<'_>) -> Result<()>>;

/// Single-slot hook references. Registering replaces the previous hook.
#[derive(Default, Clone)]
pub(crate) struct LifecycleHooks {
    pub(crate) created: Option<Hook>,
    pub(crate) updated: Option<Hook>,
    pub(crate) rendered: Option<Hook>,
    pub(crate) removed: Option<Hook>,
}

/// Typed key-value state of one component slot.
pub struct Store {
    values: HashMap<String, Box<dyn Any>>,
    pub(crate) hooks: LifecycleHooks,
    pub(crate) component: String,
    pub(crate) vnode: VNodeId,
    /// Rendering or reconciling its subtree.
    pub(crate) busy: bool,
    pub(crate) removed: bool,
}

impl Store {
    pub(crate) fn new(component: impl Into<String>, vnode: VNodeId) -> Self {
        Self {
            values: HashMap::new(),
            hooks: LifecycleHooks::default(),
            component: component.into(),
            vnode,
            busy: false,
            removed: false,
        }
    }

    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref())
    }

    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Store a value, returning the previous one if it had the same type.
    pub fn insert<T: 'static>(&mut self, key: impl Into<String>, value: T) -> Option<T> {
        self.values
            .insert(key.into(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Get the value under `key`, initialising it first if it is missing or
    /// holds another type.
    pub fn get_or_insert_with<T: 'static>(&mut self, key: &str, init: impl FnOnce() -> T) -> &mut T {
        let value = match self.values.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if !entry.get().is::<T>() {
                    entry.insert(Box::new(init()));
                }
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(Box::new(init())),
        };
        match value.downcast_mut::<T>() {
            Some(value) => value,
            None => unreachable!("store entry type checked on insert"),
        }
    }

    pub fn remove<T: 'static>(&mut self, key: &str) -> Option<T> {
        self.values
            .remove(key)
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("component", &self.component)
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .field("busy", &self.busy)
            .field("removed", &self.removed)
            .finish()
    }
}

// =============================================================================
// Store Table
// =============================================================================

#[derive(Default)]
pub(crate) struct Stores {
    stores: HashMap<StoreId, Store>,
    next_id: u64,
}

impl Stores {
    pub(crate) fn create(&mut self, store: Store) -> StoreId {
        let id = StoreId(self.next_id);
        self.next_id += 1;
        self.stores.insert(id, store);
        id
    }

    pub(crate) fn get(&self, id: StoreId) -> Option<&Store> {
        self.stores.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: StoreId) -> Option<&mut Store> {
        self.stores.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: StoreId) -> Option<Store> {
        self.stores.remove(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.stores.len()
    }

    pub(crate) fn ids(&self) -> Vec<StoreId> {
        self.stores.keys().copied().collect()
    }

    /// Clear every busy flag after a failed pass.
    pub(crate) fn reset_busy(&mut self) {
        for store in self.stores.values_mut() {
            store.busy = false;
        }
    }
}

impl Index<StoreId> for Stores {
    type Output = Store;

    fn index(&self, id: StoreId) -> &Store {
        self.get(id).expect("component store used after release")
    }
}

impl IndexMut<StoreId> for Stores {
    fn index_mut(&mut self, id: StoreId) -> &mut Store {
        self.get_mut(id).expect("component store used after release")
    }
}

// =============================================================================
// Refresh Handle
// =============================================================================

/// Lets code outside a pass re-render one component slot.
///
/// Obtained from [`ComponentContext::refresh_handle`]. A handle whose slot
/// has been torn down is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshHandle {
    pub(crate) store: StoreId,
}
