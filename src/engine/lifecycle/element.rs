//! Element variant.

use tracing::trace;

use crate::engine::Vdom;
use crate::engine::arena::{VNodeId, VNodeKind};
use crate::engine::plugins::CreateNode;
use crate::error::Result;
use crate::primitives::{ListSpec, Spec};
use crate::types::{ON_CREATE, ON_REMOVE, ON_RENDER, ON_UPDATE};

use super::dom::{Want, write_attribute};

impl Vdom {
    pub(super) fn attach_element(&mut self, id: VNodeId) -> Result<()> {
        let VNodeKind::Element(spec) = &self.arena[id].kind else {
            return Ok(());
        };
        let tag = spec.tag.clone();
        let slot = self.slot_of(id);

        let captured = slot.and_then(|slot| self.capture(slot, Want::Element(&tag)));
        let node = match captured {
            Some(node) => {
                self.claim(id, node, false);
                node
            }
            None => {
                let VNodeKind::Element(spec) = &self.arena[id].kind else {
                    return Ok(());
                };
                let request = CreateNode {
                    spec,
                    parent: slot.and_then(|s| s.parent),
                };
                let node = self
                    .plugins
                    .create_node(&mut self.doc, &request)
                    .filter(|node| self.doc.is_live(*node))
                    .unwrap_or_else(|| self.doc.create_element(&tag));
                trace!(node = node.index(), tag = %tag, "created element");
                self.claim(id, node, true);
                node
            }
        };
        self.position(id, node);

        if let VNodeKind::Element(spec) = &self.arena[id].kind {
            for (name, value) in spec.attributes.iter().filter(|(_, v)| !v.is_hook()) {
                write_attribute(&mut self.doc, &self.plugins, node, name, Some(value), None);
            }
        }
        self.wrap_element_children(id)
    }

    pub(super) fn update_element(&mut self, new: VNodeId, old: VNodeId) -> Result<()> {
        let Some(node) = self.own_node(old) else {
            return self.attach_element(new);
        };
        self.claim(new, node, false);
        self.position(new, node);

        if let (VNodeKind::Element(spec), VNodeKind::Element(previous)) =
            (&self.arena[new].kind, &self.arena[old].kind)
        {
            for (name, value) in spec.attributes.iter().filter(|(_, v)| !v.is_hook()) {
                let before = previous.attributes.get(name);
                if before != Some(value) {
                    write_attribute(&mut self.doc, &self.plugins, node, name, Some(value), before);
                }
            }
            for (name, before) in previous.attributes.iter().filter(|(_, v)| !v.is_hook()) {
                if !spec.attributes.contains_key(name) {
                    write_attribute(&mut self.doc, &self.plugins, node, name, None, Some(before));
                }
            }
        }
        self.wrap_element_children(new)
    }

    /// An element's children live under one list child.
    fn wrap_element_children(&mut self, id: VNodeId) -> Result<()> {
        let VNodeKind::Element(spec) = &self.arena[id].kind else {
            return Ok(());
        };
        let list = ListSpec {
            key: None,
            items: spec.children.clone(),
        };
        self.create_children(id, vec![Spec::List(list)])
    }

    pub(super) fn element_attached(&mut self, id: VNodeId) -> Result<()> {
        self.settle_element(id, &[ON_CREATE, ON_RENDER]);
        Ok(())
    }

    pub(super) fn element_updated(&mut self, id: VNodeId) -> Result<()> {
        self.settle_element(id, &[ON_UPDATE, ON_RENDER]);
        Ok(())
    }

    fn settle_element(&mut self, id: VNodeId, hooks: &[&str]) {
        let Some(node) = self.own_node(id) else {
            return;
        };
        self.refine(node);
        self.run_node_hooks(id, node, hooks);
    }

    fn run_node_hooks(&mut self, id: VNodeId, node: crate::document::NodeId, hooks: &[&str]) {
        let VNodeKind::Element(spec) = &self.arena[id].kind else {
            return;
        };
        let hooks: Vec<_> = hooks.iter().filter_map(|name| spec.hook_named(name)).collect();
        for hook in hooks {
            hook(&mut self.doc, node);
        }
    }

    pub(super) fn detach_element(&mut self, id: VNodeId, parent_removed: bool) {
        if let Some(node) = self.own_node(id) {
            self.run_node_hooks(id, node, &[ON_REMOVE]);
        }
        self.remove_own_node(id, parent_removed);
    }
}
