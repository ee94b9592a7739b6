//! Text, Raw, Inline and List variants, plus the render-root wrapper.

use tracing::trace;

use crate::engine::Vdom;
use crate::engine::arena::{VNodeId, VNodeKind};
use crate::error::Result;
use crate::primitives::InlineContext;
use crate::types::NodeFlags;

use super::dom::Want;

impl Vdom {
    // =========================================================================
    // Text
    // =========================================================================

    pub(super) fn attach_text(&mut self, id: VNodeId) -> Result<()> {
        let VNodeKind::Text(content) = &self.arena[id].kind else {
            return Ok(());
        };
        let content = content.clone();
        let slot = self.slot_of(id);

        let node = match slot.and_then(|slot| self.capture(slot, Want::Text)) {
            Some(node) => {
                if self.doc.text(node) != Some(content.as_str()) {
                    self.doc.set_text(node, &content);
                }
                self.claim(id, node, false);
                node
            }
            None => {
                let node = self.doc.create_text(&content);
                trace!(node = node.index(), "created text");
                self.claim(id, node, true);
                node
            }
        };
        self.position(id, node);
        Ok(())
    }

    pub(super) fn update_text(&mut self, new: VNodeId, old: VNodeId) -> Result<()> {
        let Some(node) = self.own_node(old) else {
            return self.attach_text(new);
        };
        self.claim(new, node, false);
        if let VNodeKind::Text(content) = &self.arena[new].kind {
            if self.doc.text(node) != Some(content.as_str()) {
                self.doc.set_text(node, content);
            }
        }
        self.position(new, node);
        Ok(())
    }

    // =========================================================================
    // Raw
    // =========================================================================

    pub(super) fn attach_raw(&mut self, id: VNodeId) -> Result<()> {
        let VNodeKind::Raw { node, .. } = self.arena[id].kind else {
            return Ok(());
        };
        self.mark(node, NodeFlags::RAW);
        self.claim(id, node, false);
        self.position(id, node);
        Ok(())
    }

    pub(super) fn update_raw(&mut self, new: VNodeId, _old: VNodeId) -> Result<()> {
        self.attach_raw(new)
    }

    // =========================================================================
    // Render Root Wrapper
    // =========================================================================

    /// The container itself. Never moved, never removed.
    pub(super) fn attach_wrapper(&mut self, id: VNodeId) -> Result<()> {
        let VNodeKind::Raw {
            node,
            child: Some(child),
        } = &self.arena[id].kind
        else {
            return Ok(());
        };
        let (node, child) = (*node, child.clone());
        self.ledger.materialize(&mut self.arena, id, node);
        self.create_children(id, vec![child])
    }

    pub(super) fn update_wrapper(&mut self, new: VNodeId, _old: VNodeId) -> Result<()> {
        self.attach_wrapper(new)
    }

    pub(super) fn wrapper_settled(&mut self, id: VNodeId) {
        if let Some(node) = self.own_node(id) {
            self.mark(node, NodeFlags::REFINED | NodeFlags::RAW);
        }
    }

    // =========================================================================
    // Inline Function
    // =========================================================================

    /// Call the function with its position and wrap the result.
    pub(super) fn render_inline(&mut self, id: VNodeId, previous: Option<VNodeId>) -> Result<()> {
        let VNodeKind::Inline(f) = &self.arena[id].kind else {
            return Ok(());
        };
        let f = f.clone();
        let nodes = previous.map(|p| self.nodes_of(p)).unwrap_or_default();
        let context = InlineContext {
            document: &self.doc,
            parent: self.ledger.parent_node(&self.arena[id].links),
            node: nodes.first().copied(),
            nodes,
        };
        let spec = f(&context);
        spec.check_keys()?;
        self.create_children(id, vec![spec])
    }

    // =========================================================================
    // List
    // =========================================================================

    pub(super) fn wrap_items(&mut self, id: VNodeId) -> Result<()> {
        let VNodeKind::List(list) = &self.arena[id].kind else {
            return Ok(());
        };
        let items = list.items.clone();
        self.create_children(id, items)
    }
}
