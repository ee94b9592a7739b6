//! Real-node placement: capture, positioning and refinement.
//!
//! Capture reuses content the engine did not create. It only runs under a
//! real parent that is neither engine-created nor refined yet, looking at
//! the node right after the expected previous sibling. A node of the right
//! kind is taken over; an unowned node of the wrong kind is dropped. A sync
//! root only ever considers its target node.
//!
//! Refinement happens once per adopted parent, after its children settled:
//! the parent is marked so capture never runs there again, and unowned
//! children left behind the last tracked node are pruned.

use tracing::{debug, trace, warn};

use crate::document::{Document, NodeId};
use crate::engine::Vdom;
use crate::engine::arena::VNodeId;
use crate::engine::ledger::LinkId;
use crate::engine::plugins::{AttributeChange, PluginRegistry};
use crate::types::{AttrValue, NodeFlags};

/// Kind of node a virtual node wants to capture.
#[derive(Debug, Clone, Copy)]
pub(super) enum Want<'a> {
    Element(&'a str),
    Text,
}

impl Want<'_> {
    fn accepts(self, doc: &Document, node: NodeId) -> bool {
        match self {
            Want::Element(tag) => doc.tag(node) == Some(tag),
            Want::Text => doc.is_text(node),
        }
    }
}

/// Where a node-owning virtual node must land.
#[derive(Debug, Clone, Copy)]
pub(super) struct Slot {
    pub(super) link: LinkId,
    pub(super) parent: Option<NodeId>,
    pub(super) prev: Option<NodeId>,
}

impl Vdom {
    pub(super) fn slot_of(&self, id: VNodeId) -> Option<Slot> {
        let link = *self.arena[id].links.first()?;
        Some(Slot {
            link,
            parent: self.ledger.link(link).and_then(|l| l.parent_node),
            prev: self.ledger.previous_node(link),
        })
    }

    /// Find a pre-existing node to reuse for `slot`.
    pub(super) fn capture(&mut self, slot: Slot, want: Want<'_>) -> Option<NodeId> {
        let hint = self
            .ledger
            .link(slot.link)
            .and_then(|l| l.seed)
            .and_then(|seed| seed.hint);
        // A hinted root never looks past its hint
        if let Some(hint) = hint {
            if self.doc.is_live(hint) && want.accepts(&self.doc, hint) {
                trace!(node = hint.index(), "captured root hint");
                return Some(hint);
            }
            debug!(node = hint.index(), "root hint is of the wrong kind");
            return None;
        }

        if !self.config.adopt_existing {
            return None;
        }
        let parent = slot.parent?;
        if self
            .node_flags(parent)
            .intersects(NodeFlags::CREATED | NodeFlags::REFINED)
        {
            return None;
        }
        let candidate = match slot.prev {
            Some(prev) => self.doc.next_sibling(prev),
            None => self.doc.first_child(parent),
        }?;
        if self.doc.parent(candidate) != Some(parent)
            || self.node_flags(candidate).contains(NodeFlags::OWNED)
        {
            return None;
        }

        if want.accepts(&self.doc, candidate) {
            trace!(node = candidate.index(), parent = parent.index(), "captured existing node");
            Some(candidate)
        } else {
            warn!(
                node = candidate.index(),
                parent = parent.index(),
                "discarding foreign node of the wrong kind"
            );
            self.doc.remove(candidate);
            self.forget_node(candidate);
            None
        }
    }

    /// Put `node` right after the expected previous sibling of `link`.
    pub(super) fn position_link(&mut self, link: LinkId, node: NodeId) {
        let Some(parent) = self.ledger.link(link).and_then(|l| l.parent_node) else {
            return;
        };
        let prev = self.ledger.previous_node(link);
        if self.doc.parent(node) == Some(parent) && self.doc.previous_sibling(node) == prev {
            return;
        }
        let reference = match prev {
            Some(prev) if self.doc.parent(prev) == Some(parent) => self.doc.next_sibling(prev),
            Some(_) => None,
            None => self.doc.first_child(parent),
        };
        trace!(node = node.index(), parent = parent.index(), "moving node into place");
        self.doc.insert_before(parent, node, reference);
    }

    pub(super) fn position(&mut self, id: VNodeId, node: NodeId) {
        if let Some(link) = self.arena[id].links.first().copied() {
            self.position_link(link, node);
        }
    }

    /// Take over `node` for `id`: flag it and record it in the ledger.
    pub(super) fn claim(&mut self, id: VNodeId, node: NodeId, created: bool) {
        let flags = if created {
            NodeFlags::CREATED | NodeFlags::OWNED
        } else {
            NodeFlags::OWNED
        };
        self.mark(node, flags);
        self.ledger.materialize(&mut self.arena, id, node);
    }

    /// Mark `node` refined, pruning stray foreign children the first time.
    pub(super) fn refine(&mut self, node: NodeId) {
        let flags = self.node_flags(node);
        if flags.contains(NodeFlags::REFINED) {
            return;
        }
        self.mark(node, NodeFlags::REFINED);
        if flags.intersects(NodeFlags::CREATED | NodeFlags::RAW) || !self.config.prune_foreign {
            return;
        }

        let children = self.doc.children(node).to_vec();
        let start = match self.ledger.last_node(node) {
            Some(last) => children.iter().position(|c| *c == last).map_or(0, |i| i + 1),
            None => 0,
        };
        let stray: Vec<NodeId> = children[start..]
            .iter()
            .copied()
            .filter(|c| !self.node_flags(*c).contains(NodeFlags::OWNED))
            .collect();
        if !stray.is_empty() {
            debug!(node = node.index(), count = stray.len(), "pruning foreign children");
        }
        for child in stray {
            self.doc.remove(child);
        }
    }

    /// Remove the real node of a leaf-like virtual node.
    pub(super) fn remove_own_node(&mut self, id: VNodeId, parent_removed: bool) {
        let Some(node) = self.own_node(id) else {
            return;
        };
        if !parent_removed {
            self.doc.remove(node);
        }
        self.ledger.close_hub(node);
        self.forget_node(node);
    }

    /// Forget everything known about `root`'s subtree so the next pass
    /// adopts it from scratch.
    pub(crate) fn forget_subtree(&mut self, root: NodeId) {
        let mut stack = self.doc.children(root).to_vec();
        while let Some(node) = stack.pop() {
            stack.extend_from_slice(self.doc.children(node));
            self.flags.remove(&node);
            self.ledger.close_hub(node);
        }
        self.ledger.close_hub(root);
        if let Some(flags) = self.flags.get_mut(&root) {
            flags.remove(NodeFlags::REFINED);
        }
    }
}

/// Write one attribute through the active interceptors, or directly.
pub(super) fn write_attribute(
    doc: &mut Document,
    plugins: &PluginRegistry,
    node: NodeId,
    name: &str,
    value: Option<&AttrValue>,
    previous: Option<&AttrValue>,
) {
    let change = AttributeChange {
        node,
        name,
        value,
        previous,
    };
    if plugins.set_attribute(doc, &change).is_some() {
        return;
    }
    match value.and_then(AttrValue::as_attribute) {
        Some(text) => {
            if doc.attribute(node, name) != Some(text.as_str()) {
                doc.set_attribute(node, name, &text);
            }
        }
        None => {
            if doc.attribute(node, name).is_some() {
                doc.remove_attribute(node, name);
            }
        }
    }
}
