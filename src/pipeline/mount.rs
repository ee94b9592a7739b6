//! Mount API - Entry points that run a reconciliation pass.
//!
//! - [`Vdom::render`] renders into a container, reusing the previous tree
//!   rendered there
//! - [`Vdom::sync`] patches one node in place and insists the output is
//!   exactly that node
//! - [`Vdom::unmount`] tears a rendered tree down
//! - [`Vdom::refresh`] re-renders one component slot as a nested pass
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{Document, Vdom, element, text};
//!
//! let mut doc = Document::new();
//! let root = doc.create_element("body");
//! let mut vdom = Vdom::new(doc);
//!
//! vdom.render(root, element("p").child(text("hello")))?;
//! vdom.render(root, element("p").child(text("hello again")))?; // text updated in place
//!
//! vdom.unmount(root)?;
//! ```

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::document::NodeId;
use crate::engine::{RefreshHandle, RootSeed, StoreId, VNode, VNodeId, VNodeKind, Vdom};
use crate::error::{Result, VdomError};
use crate::primitives::Spec;

// =============================================================================
// Pass Runner
// =============================================================================

impl Vdom {
    /// Run one pass. When the outermost pass fails, transient pass state is
    /// reset so the engine stays usable.
    fn run_pass(&mut self, kind: &'static str, pass: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        let span = tracing::debug_span!("pass", kind, depth = self.depth);
        let _guard = span.enter();

        self.depth += 1;
        let result = pass(self);
        self.depth -= 1;

        if self.depth == 0 {
            match &result {
                Ok(()) => debug_assert_eq!(self.plugins.active_depth(), 0, "plugin scope leaked"),
                Err(err) => {
                    warn!(error = %err, "pass failed");
                    self.plugins.reset();
                    self.stores.reset_busy();
                }
            }
        }
        result
    }

    /// Give up the tree rooted at `key` after its pass failed. Its entry in
    /// the root maps must already be gone.
    fn abandon(&mut self, key: NodeId) {
        self.forget_subtree(key);
        self.pending_sweep = true;
        self.settle();
    }

    /// Sweep what failed passes left behind, once no pass is running.
    fn settle(&mut self) {
        if self.depth > 0 || self.sweeping {
            return;
        }
        self.sweeping = true;
        while std::mem::take(&mut self.pending_sweep) {
            self.sweep();
        }
        self.sweeping = false;
    }

    fn reachable(&self) -> HashSet<VNodeId> {
        let mut live = HashSet::new();
        let mut stack: Vec<VNodeId> = self.roots.values().chain(self.synced.values()).copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(vnode) = self.arena.get(id) {
                if live.insert(id) {
                    stack.extend_from_slice(&vnode.children);
                }
            }
        }
        live
    }

    /// Free every virtual node no root reaches, along with its links and
    /// store. The document is left alone.
    fn sweep(&mut self) {
        let live = self.reachable();
        let kept: HashSet<StoreId> = live.iter().filter_map(|id| self.arena[*id].kind.store()).collect();
        let orphans: Vec<StoreId> = self.stores.ids().into_iter().filter(|s| !kept.contains(s)).collect();

        // Every orphan is marked removed before any removed hook runs
        for store in &orphans {
            if let Some(entry) = self.stores.get_mut(*store) {
                entry.removed = true;
            }
        }
        for store in orphans {
            self.drop_store(store);
        }

        let live = self.reachable();
        let dead: Vec<VNodeId> = self.arena.ids().filter(|id| !live.contains(id)).collect();
        debug!(count = dead.len(), "sweeping orphaned virtual nodes");
        for id in dead {
            self.arena.remove(id);
        }
        self.ledger.retain_owned(|owner| live.contains(&owner));
    }

    fn check_target(&self, node: NodeId) -> Result<()> {
        if self.doc.is_live(node) {
            Ok(())
        } else {
            Err(VdomError::invalid(format!(
                "node {} does not exist in the document",
                node.index()
            )))
        }
    }

    // =========================================================================
    // Mount
    // =========================================================================

    /// Render `spec` into `container`, returning the top-level nodes
    /// produced.
    ///
    /// Rendering into the same container again diffs against the previous
    /// tree. Content already in the container is adopted where it fits the
    /// spec (see [`Config::adopt_existing`](crate::Config::adopt_existing)).
    pub fn render(&mut self, container: NodeId, spec: impl Into<Spec>) -> Result<Vec<NodeId>> {
        self.check_target(container)?;
        if !self.doc.is_element(container) {
            return Err(VdomError::invalid("render container must be an element"));
        }
        let spec = spec.into();
        spec.check_keys()?;

        let kind = VNodeKind::Raw {
            node: container,
            child: Some(spec),
        };
        let root = self.arena.insert(VNode::root(kind, RootSeed::default()));
        let old = self.roots.get(&container).copied();

        match self.run_pass("render", |vdom| vdom.execute(Some(root), old)) {
            Ok(()) => {
                self.roots.insert(container, root);
                self.settle();
                let child = self.arena[root].children.first().copied();
                Ok(child.map(|c| self.nodes_of(c)).unwrap_or_default())
            }
            Err(err) => {
                self.roots.remove(&container);
                self.abandon(container);
                Err(err)
            }
        }
    }

    /// Render `spec` at `node`'s position, adopting `node` itself.
    ///
    /// Fails with [`VdomError::SyncMismatch`] unless the output is exactly
    /// `[node]`, e.g. when the element tag differs from the node's or the
    /// output spans several nodes.
    pub fn sync(&mut self, node: NodeId, spec: impl Into<Spec>) -> Result<NodeId> {
        self.check_target(node)?;
        let spec = spec.into();
        spec.check_keys()?;

        let seed = RootSeed {
            parent_node: self.doc.parent(node),
            prev: self.doc.previous_sibling(node),
            hint: Some(node),
        };
        let root = self.create_vnode(spec, None)?;
        self.arena[root].seed = Some(seed);
        let old = self.synced.get(&node).copied();

        if let Err(err) = self.run_pass("sync", |vdom| vdom.execute(Some(root), old)) {
            self.synced.remove(&node);
            self.abandon(node);
            return Err(err);
        }
        self.synced.insert(node, root);
        self.settle();

        let actual = self.nodes_of(root);
        if actual == [node] {
            Ok(node)
        } else {
            Err(VdomError::SyncMismatch {
                expected: node,
                actual,
            })
        }
    }

    /// Tear down the tree rendered into (or synced onto) `node`.
    ///
    /// The container of a render is left in place; a synced node is removed
    /// along with the rest of the output.
    pub fn unmount(&mut self, node: NodeId) -> Result<()> {
        let root = match self.roots.remove(&node) {
            Some(root) => root,
            None => match self.synced.remove(&node) {
                Some(root) => root,
                None => return Ok(()),
            },
        };
        let result = self.run_pass("unmount", |vdom| vdom.execute(None, Some(root)));
        match result {
            Ok(()) => self.settle(),
            Err(_) => self.abandon(node),
        }
        result
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Re-render the component slot behind `handle` now.
    ///
    /// A handle whose slot was torn down is a no-op. Refreshing a component
    /// that is still rendering fails with [`VdomError::Reentrant`]. If the
    /// refresh fails, the whole tree holding the slot is dropped like a
    /// failed render.
    pub fn refresh(&mut self, handle: &RefreshHandle) -> Result<()> {
        let Some(store) = self.stores.get(handle.store) else {
            debug!("refresh of a released component ignored");
            return Ok(());
        };
        if store.removed {
            debug!(component = %store.component, "refresh of a removed component ignored");
            return Ok(());
        }
        if store.busy {
            return Err(VdomError::Reentrant {
                component: store.component.clone(),
            });
        }

        let current = store.vnode;
        let Some(fresh) = self.fork_component(current) else {
            return Ok(());
        };
        let result = self.run_pass("refresh", |vdom| vdom.execute(Some(fresh), Some(current)));
        match &result {
            Ok(()) => self.settle(),
            Err(_) => {
                // The whole tree the slot lives in goes
                let top = self.arena.ancestors(fresh).last().copied().unwrap_or(fresh);
                match self.take_root(top) {
                    Some(key) => self.abandon(key),
                    None => self.pending_sweep = true,
                }
            }
        }
        result
    }

    /// Remove the root map entry holding `root`, returning its key.
    fn take_root(&mut self, root: VNodeId) -> Option<NodeId> {
        if let Some(key) = self.roots.iter().find(|(_, r)| **r == root).map(|(k, _)| *k) {
            self.roots.remove(&key);
            return Some(key);
        }
        let key = self.synced.iter().find(|(_, r)| **r == root).map(|(k, _)| *k)?;
        self.synced.remove(&key);
        Some(key)
    }

    /// New instance of the component at `current`, put in its place.
    fn fork_component(&mut self, current: VNodeId) -> Option<VNodeId> {
        let vnode = self.arena.get(current)?;
        let VNodeKind::Component { spec, .. } = &vnode.kind else {
            return None;
        };
        let mut fork = VNode::new(
            VNodeKind::Component {
                spec: spec.clone(),
                store: None,
            },
            vnode.parent,
        );
        fork.seed = vnode.seed;
        let parent = vnode.parent;
        let fresh = self.arena.insert(fork);

        match parent {
            Some(parent) => self.arena.replace_child(parent, current, fresh),
            None => {
                for root in self.roots.values_mut().chain(self.synced.values_mut()) {
                    if *root == current {
                        *root = fresh;
                    }
                }
            }
        }
        Some(fresh)
    }
}
