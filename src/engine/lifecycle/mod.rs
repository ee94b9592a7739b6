//! VNode Lifecycle - The seven operations, dispatched per variant.
//!
//! | variant   | attach                  | update                  | detach          |
//! |-----------|-------------------------|-------------------------|-----------------|
//! | Element   | capture or create node  | diff attributes         | remove node     |
//! | Component | new store, unbox        | move store, unbox       | removed hook    |
//! | Text      | capture or create node  | rewrite content         | remove node     |
//! | Inline    | call function           | call function           |                 |
//! | Null      |                         |                         |                 |
//! | Raw       | insert existing node    | reposition              | remove node     |
//! | List      | wrap items              | wrap items              |                 |
//!
//! `attached` / `updated` / `detached` run after the subtree pass. Element
//! hooks, component hooks and refinement live there.

mod component;
mod dom;
mod element;
mod leaf;

use crate::document::NodeId;
use crate::error::{Result, VdomError};
use crate::primitives::Spec;

use super::Vdom;
use super::arena::{Kind, VNode, VNodeId, VNodeKind};

/// What an update asks of the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Reconcile children as usual.
    Continue,
    /// Children were left untouched.
    Leave,
}

impl Vdom {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Wrap a spec in a new virtual node. Nothing is registered or attached.
    pub(crate) fn create_vnode(&mut self, spec: Spec, parent: Option<VNodeId>) -> Result<VNodeId> {
        let kind = match spec {
            Spec::Element(element) => {
                if element.tag.is_empty() {
                    return Err(VdomError::invalid("element spec with an empty tag name"));
                }
                VNodeKind::Element(element)
            }
            Spec::Component(spec) => VNodeKind::Component { spec, store: None },
            Spec::Text(content) => VNodeKind::Text(content),
            Spec::Null => VNodeKind::Null,
            Spec::Function(f) => VNodeKind::Inline(f),
            Spec::Raw(node) => {
                if !self.doc.is_live(node) {
                    return Err(VdomError::invalid(format!(
                        "raw node {} does not exist in the document",
                        node.index()
                    )));
                }
                VNodeKind::Raw { node, child: None }
            }
            Spec::List(list) => VNodeKind::List(list),
        };
        Ok(self.arena.insert(VNode::new(kind, parent)))
    }

    /// Replace `parent`'s children with fresh nodes for `specs`.
    pub(crate) fn create_children(&mut self, parent: VNodeId, specs: Vec<Spec>) -> Result<()> {
        let children = specs
            .into_iter()
            .map(|spec| self.create_vnode(spec, Some(parent)))
            .collect::<Result<Vec<_>>>()?;
        self.arena[parent].children = children;
        Ok(())
    }

    /// Whether `new` may update `old` in place.
    pub(crate) fn matches(&self, new: VNodeId, old: VNodeId) -> bool {
        match (&self.arena[new].kind, &self.arena[old].kind) {
            (VNodeKind::Element(a), VNodeKind::Element(b)) => a.tag == b.tag,
            (VNodeKind::Component { spec: a, .. }, VNodeKind::Component { spec: b, .. }) => {
                a.component == b.component
            }
            (VNodeKind::Text(_), VNodeKind::Text(_))
            | (VNodeKind::Inline(_), VNodeKind::Inline(_))
            | (VNodeKind::Null, VNodeKind::Null)
            | (VNodeKind::List(_), VNodeKind::List(_)) => true,
            (VNodeKind::Raw { node: a, child: ca }, VNodeKind::Raw { node: b, child: cb }) => {
                a == b && ca.is_some() == cb.is_some()
            }
            _ => false,
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub(crate) fn attach(&mut self, id: VNodeId) -> Result<()> {
        match self.arena[id].kind.tag() {
            Kind::Element => self.attach_element(id),
            Kind::Component => self.attach_component(id),
            Kind::Text => self.attach_text(id),
            Kind::Inline => self.render_inline(id, None),
            Kind::Null => Ok(()),
            Kind::Raw => self.attach_raw(id),
            Kind::RootWrapper => self.attach_wrapper(id),
            Kind::List => self.wrap_items(id),
        }
    }

    pub(crate) fn attached(&mut self, id: VNodeId) -> Result<()> {
        match self.arena[id].kind.tag() {
            Kind::Element => self.element_attached(id),
            Kind::Component => self.component_attached(id),
            Kind::RootWrapper => {
                self.wrapper_settled(id);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn update(&mut self, new: VNodeId, old: VNodeId) -> Result<Flow> {
        match self.arena[new].kind.tag() {
            Kind::Element => self.update_element(new, old).map(|_| Flow::Continue),
            Kind::Component => self.update_component(new, old),
            Kind::Text => self.update_text(new, old).map(|_| Flow::Continue),
            Kind::Inline => self.render_inline(new, Some(old)).map(|_| Flow::Continue),
            Kind::Null => Ok(Flow::Continue),
            Kind::Raw => self.update_raw(new, old).map(|_| Flow::Continue),
            Kind::RootWrapper => self.update_wrapper(new, old).map(|_| Flow::Continue),
            Kind::List => self.wrap_items(new).map(|_| Flow::Continue),
        }
    }

    pub(crate) fn updated(&mut self, new: VNodeId, old: VNodeId) -> Result<()> {
        match self.arena[new].kind.tag() {
            Kind::Element => self.element_updated(new),
            Kind::Component => self.component_updated(new, old),
            Kind::RootWrapper => {
                self.wrapper_settled(new);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Start tearing `id` down. Returns whether its descendants' real nodes
    /// already left the document with it.
    pub(crate) fn detach(&mut self, id: VNodeId, parent_removed: bool) -> Result<bool> {
        match self.arena[id].kind.tag() {
            Kind::Element => {
                self.detach_element(id, parent_removed);
                Ok(true)
            }
            Kind::Component => self.detach_component(id).map(|_| parent_removed),
            Kind::Text | Kind::Raw => {
                self.remove_own_node(id, parent_removed);
                Ok(true)
            }
            Kind::RootWrapper => Ok(false),
            Kind::Inline | Kind::Null | Kind::List => Ok(parent_removed),
        }
    }

    pub(crate) fn detached(&mut self, id: VNodeId) -> Result<()> {
        if self.arena[id].kind.tag() == Kind::Component {
            self.component_detached(id);
        }
        Ok(())
    }

    /// Real node of a node-owning virtual node.
    pub(crate) fn own_node(&self, id: VNodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|v| v.node)
    }
}
