//! VNode Arena - Index allocation for virtual nodes.
//!
//! Virtual nodes are slots in a vector, addressed by `VNodeId`:
//! - Free index pool for O(1) reuse
//! - Parent back-reference and ordered children per slot
//! - `transplant` as the single place a parent reference changes after
//!   creation
//!
//! Indices are recycled, so nothing outside a pass may hold a `VNodeId`
//! for longer than the node lives. Component stores keep theirs current.

use std::ops::{Index, IndexMut};

use crate::document::NodeId;
use crate::primitives::{ComponentSpec, ElementSpec, InlineFn, ListSpec, Spec};
use crate::types::Key;

use super::ledger::{LinkId, RootSeed};
use super::store::StoreId;

// =============================================================================
// VNode
// =============================================================================

/// Handle to a virtual node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct VNodeId(usize);

/// The closed set of virtual node variants.
pub(crate) enum VNodeKind {
    Element(ElementSpec),
    Component {
        spec: ComponentSpec,
        store: Option<StoreId>,
    },
    Text(String),
    Inline(InlineFn),
    Null,
    /// Existing node. `child` is set for the synthetic wrapper at a render
    /// root, which the engine never owns.
    Raw {
        node: NodeId,
        child: Option<Spec>,
    },
    List(ListSpec),
}

/// Fieldless mirror of `VNodeKind`, for dispatch without holding a borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Element,
    Component,
    Text,
    Inline,
    Null,
    Raw,
    RootWrapper,
    List,
}

impl VNodeKind {
    pub(crate) fn tag(&self) -> Kind {
        match self {
            VNodeKind::Element(_) => Kind::Element,
            VNodeKind::Component { .. } => Kind::Component,
            VNodeKind::Text(_) => Kind::Text,
            VNodeKind::Inline(_) => Kind::Inline,
            VNodeKind::Null => Kind::Null,
            VNodeKind::Raw { child: None, .. } => Kind::Raw,
            VNodeKind::Raw { child: Some(_), .. } => Kind::RootWrapper,
            VNodeKind::List(_) => Kind::List,
        }
    }

    pub(crate) fn key(&self) -> Option<&Key> {
        match self {
            VNodeKind::Element(e) => e.key.as_ref(),
            VNodeKind::Component { spec, .. } => spec.key.as_ref(),
            VNodeKind::List(l) => l.key.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn store(&self) -> Option<StoreId> {
        match self {
            VNodeKind::Component { store, .. } => *store,
            _ => None,
        }
    }

    /// Whether this variant owns a real node of its own.
    pub(crate) fn materializes(&self) -> bool {
        matches!(
            self,
            VNodeKind::Element(_) | VNodeKind::Text(_) | VNodeKind::Raw { .. }
        )
    }

    pub(crate) fn label(&self) -> &str {
        match self {
            VNodeKind::Element(e) => &e.tag,
            VNodeKind::Component { spec, .. } => spec.component.name(),
            VNodeKind::Text(_) => "#text",
            VNodeKind::Inline(_) => "#function",
            VNodeKind::Null => "#null",
            VNodeKind::Raw { .. } => "#raw",
            VNodeKind::List(_) => "#list",
        }
    }
}

/// One virtual node.
pub(crate) struct VNode {
    pub(crate) kind: VNodeKind,
    pub(crate) parent: Option<VNodeId>,
    pub(crate) children: Vec<VNodeId>,
    /// Position links under the real parent, shared with ancestors up to
    /// the nearest node-owning one.
    pub(crate) links: Vec<LinkId>,
    /// Set once a child has taken over this node's first link.
    pub(crate) branched: bool,
    /// Real node, for node-owning variants once attached.
    pub(crate) node: Option<NodeId>,
    /// Position supplied by the caller, for reconciliation roots.
    pub(crate) seed: Option<RootSeed>,
}

impl VNode {
    pub(crate) fn new(kind: VNodeKind, parent: Option<VNodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            links: Vec::new(),
            branched: false,
            node: None,
            seed: None,
        }
    }

    pub(crate) fn root(kind: VNodeKind, seed: RootSeed) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(kind, None)
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Slot storage with a free index pool.
#[derive(Default)]
pub(crate) struct VNodeArena {
    slots: Vec<Option<VNode>>,
    free: Vec<usize>,
}

impl VNodeArena {
    pub(crate) fn insert(&mut self, vnode: VNode) -> VNodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(vnode);
                VNodeId(index)
            }
            None => {
                self.slots.push(Some(vnode));
                VNodeId(self.slots.len() - 1)
            }
        }
    }

    /// Release a slot. Children are not touched.
    pub(crate) fn remove(&mut self, id: VNodeId) -> Option<VNode> {
        let vnode = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(vnode)
    }

    pub(crate) fn get(&self, id: VNodeId) -> Option<&VNode> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: VNodeId) -> Option<&mut VNode> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn contains(&self, id: VNodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Ids of every live slot.
    pub(crate) fn ids(&self) -> impl Iterator<Item = VNodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| VNodeId(index))
    }

    /// Move `child` under `new_parent`, replacing whatever children it had.
    ///
    /// The only place a parent reference changes after creation, so a node
    /// has exactly one owner at any time.
    pub(crate) fn transplant(&mut self, child: VNodeId, new_parent: VNodeId) {
        if let Some(old_parent) = self[child].parent {
            if let Some(old) = self.get_mut(old_parent) {
                old.children.retain(|&c| c != child);
            }
        }
        self[child].parent = Some(new_parent);
        self[new_parent].children = vec![child];
    }

    /// Swap `old` for `new` in `parent`'s children.
    pub(crate) fn replace_child(&mut self, parent: VNodeId, old: VNodeId, new: VNodeId) {
        if let Some(p) = self.get_mut(parent) {
            for child in p.children.iter_mut().filter(|c| **c == old) {
                *child = new;
            }
        }
    }

    /// Ancestors of `id`, nearest first.
    pub(crate) fn ancestors(&self, id: VNodeId) -> Vec<VNodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).and_then(|v| v.parent);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.get(current).and_then(|v| v.parent);
        }
        out
    }
}

impl Index<VNodeId> for VNodeArena {
    type Output = VNode;

    fn index(&self, id: VNodeId) -> &VNode {
        self.get(id).expect("virtual node used after release")
    }
}

impl IndexMut<VNodeId> for VNodeArena {
    fn index_mut(&mut self, id: VNodeId) -> &mut VNode {
        self.get_mut(id).expect("virtual node used after release")
    }
}
