//! VDOM Engine - Virtual node arena, position ledger and reconciler.
//!
//! The engine manages the core data structures:
//! - Arena: Index allocation for virtual nodes, with a free index pool
//! - Ledger: Links and Hubs tracking sibling order under each real parent
//! - Stores: Per-component-slot state and lifecycle hooks
//! - Plugins: Scoped node-creation and attribute interceptors
//! - Reconciler: `execute(new, old)` and keyed/positional child matching
//!
//! # Architecture
//!
//! Virtual nodes are NOT objects holding pointers. They are indices into an
//! arena, and every cross reference (parent, children, links, stores) is an
//! index or a side table keyed by `NodeId`:
//!
//! ```text
//! VNode 0: Raw wrapper  (parent=-, node=container, links=[L0])
//! VNode 1: Element div  (parent=0, node=#4,        links=[L1])   hub(container) = [L1]
//! VNode 2: List         (parent=1,                 links=[L2,L3]) hub(#4) = [L2, L3]
//! VNode 3: Text "a"     (parent=2, node=#5,        links=[L2])
//! VNode 4: Text "b"     (parent=2, node=#6,        links=[L3])
//! ```
//!
//! One `Vdom` owns all of it together with the document it renders into.

mod arena;
mod context;
mod ledger;
mod lifecycle;
mod linked_list;
mod plugins;
mod reconciler;
mod store;

use std::collections::HashMap;

pub use context::ComponentContext;
pub use linked_list::LinkedList;
pub use plugins::{
    AttributeChange, CreateNode, CreateNodePlugin, PluginId, PluginRegistry, SetAttributePlugin,
};
pub use store::{Hook, RefreshHandle, Store, StoreId};

pub(crate) use arena::{VNode, VNodeArena, VNodeId, VNodeKind};
pub(crate) use ledger::{Ledger, RootSeed};
pub(crate) use store::Stores;

use crate::config::Config;
use crate::document::{Document, NodeId};
use crate::types::NodeFlags;

// =============================================================================
// Vdom
// =============================================================================

/// A document plus everything needed to keep reconciling into it.
pub struct Vdom {
    pub(crate) doc: Document,
    pub(crate) config: Config,
    pub(crate) arena: VNodeArena,
    pub(crate) ledger: Ledger,
    pub(crate) plugins: PluginRegistry,
    pub(crate) stores: Stores,
    pub(crate) flags: HashMap<NodeId, NodeFlags>,
    /// Render roots by container.
    pub(crate) roots: HashMap<NodeId, VNodeId>,
    /// Strict-sync roots by target node.
    pub(crate) synced: HashMap<NodeId, VNodeId>,
    /// Nesting depth of running passes.
    pub(crate) depth: usize,
    /// A failed pass left virtual nodes behind.
    pub(crate) pending_sweep: bool,
    pub(crate) sweeping: bool,
}

impl Vdom {
    pub fn new(doc: Document) -> Self {
        Self::with_config(doc, Config::default())
    }

    pub fn with_config(doc: Document, config: Config) -> Self {
        Self {
            doc,
            config,
            arena: VNodeArena::default(),
            ledger: Ledger::default(),
            plugins: PluginRegistry::default(),
            stores: Stores::default(),
            flags: HashMap::new(),
            roots: HashMap::new(),
            synced: HashMap::new(),
            depth: 0,
            pending_sweep: false,
            sweeping: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Direct document access between passes.
    ///
    /// Nodes the engine tracks can be edited freely; moving or removing them
    /// is picked up (and undone where needed) by the next pass.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    /// What the engine knows about `node`.
    pub fn node_flags(&self, node: NodeId) -> NodeFlags {
        self.flags.get(&node).copied().unwrap_or_default()
    }

    /// Number of live virtual nodes.
    pub fn vnode_count(&self) -> usize {
        self.arena.len()
    }

    /// Number of live component stores.
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    pub(crate) fn mark(&mut self, node: NodeId, flags: NodeFlags) {
        *self.flags.entry(node).or_default() |= flags;
    }

    pub(crate) fn forget_node(&mut self, node: NodeId) {
        self.flags.remove(&node);
    }

    /// Real nodes currently produced by a virtual node.
    pub(crate) fn nodes_of(&self, vnode: VNodeId) -> Vec<NodeId> {
        self.arena
            .get(vnode)
            .map(|v| self.ledger.nodes(&v.links))
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Vdom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vdom")
            .field("config", &self.config)
            .field("vnodes", &self.arena.len())
            .field("links", &self.ledger.len())
            .field("stores", &self.stores.len())
            .field("roots", &self.roots.len())
            .finish_non_exhaustive()
    }
}
