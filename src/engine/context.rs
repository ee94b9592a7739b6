//! Component Context - What a render function and its hooks can reach.
//!
//! The context is passed explicitly to every render call and every
//! lifecycle hook. It borrows the whole engine mutably for the duration of
//! the call, so hooks may touch the document or trigger a nested refresh.

use std::rc::Rc;

use crate::document::{Document, NodeId};
use crate::error::Result;
use crate::primitives::{Rendered, Spec};

use super::Vdom;
use super::arena::{VNodeId, VNodeKind};
use super::store::{Hook, LifecycleHooks, RefreshHandle, Store, StoreId};

/// Handle given to a component's render function and lifecycle hooks.
pub struct ComponentContext<'a> {
    pub(crate) vdom: &'a mut Vdom,
    pub(crate) vnode: VNodeId,
    pub(crate) store: StoreId,
    /// The instance this one replaces, on updates.
    pub(crate) previous: Option<VNodeId>,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(vdom: &'a mut Vdom, vnode: VNodeId, store: StoreId, previous: Option<VNodeId>) -> Self {
        Self {
            vdom,
            vnode,
            store,
            previous,
        }
    }

    /// Name of the component being rendered.
    pub fn component_name(&self) -> &str {
        &self.vdom.stores[self.store].component
    }

    /// Props of the current call.
    pub fn props<P: 'static>(&self) -> Option<&P> {
        props_of(self.vdom, self.vnode)
    }

    /// Props the previous pass rendered with. `None` on first render.
    pub fn previous_props<P: 'static>(&self) -> Option<&P> {
        props_of(self.vdom, self.previous?)
    }

    /// Child specs passed to the component call.
    pub fn children(&self) -> &[Spec] {
        match self.vdom.arena.get(self.vnode).map(|v| &v.kind) {
            Some(VNodeKind::Component { spec, .. }) => &spec.children,
            _ => &[],
        }
    }

    pub fn store(&self) -> &Store {
        &self.vdom.stores[self.store]
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.vdom.stores[self.store]
    }

    /// First real node this component currently produces.
    pub fn node(&self) -> Option<NodeId> {
        self.nodes().first().copied()
    }

    /// Real nodes this component currently produces, in document order.
    ///
    /// While rendering an update these are the previous pass's nodes.
    pub fn nodes(&self) -> Vec<NodeId> {
        let current = self.vdom.nodes_of(self.vnode);
        match self.previous {
            Some(previous) if current.is_empty() => self.vdom.nodes_of(previous),
            _ => current,
        }
    }

    pub fn document(&self) -> &Document {
        &self.vdom.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.vdom.doc
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    fn set_hook(&mut self, slot: fn(&mut LifecycleHooks) -> &mut Option<Hook>, hook: Hook) {
        *slot(&mut self.vdom.stores[self.store].hooks) = Some(hook);
    }

    /// Run after the first attach of this slot completes.
    pub fn on_created(&mut self, hook: impl Fn(&mut ComponentContext<'_>) -> Result<()> + 'static) {
        self.set_hook(|h| &mut h.created, Rc::new(hook));
    }

    /// Run after every matched update completes.
    pub fn on_updated(&mut self, hook: impl Fn(&mut ComponentContext<'_>) -> Result<()> + 'static) {
        self.set_hook(|h| &mut h.updated, Rc::new(hook));
    }

    /// Run after both attach and update.
    pub fn on_rendered(&mut self, hook: impl Fn(&mut ComponentContext<'_>) -> Result<()> + 'static) {
        self.set_hook(|h| &mut h.rendered, Rc::new(hook));
    }

    /// Run when the slot is torn down.
    pub fn on_removed(&mut self, hook: impl Fn(&mut ComponentContext<'_>) -> Result<()> + 'static) {
        self.set_hook(|h| &mut h.removed, Rc::new(hook));
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Re-render this component now, as a nested pass.
    ///
    /// Fails with [`VdomError::Reentrant`](crate::VdomError::Reentrant)
    /// while the component is still rendering.
    pub fn refresh(&mut self) -> Result<()> {
        self.vdom.refresh(&self.refresh_handle())
    }

    /// Re-render another component slot now, as a nested pass.
    ///
    /// Same rules as [`Vdom::refresh`]: a torn down slot is a no-op and a
    /// component that is still rendering fails with
    /// [`VdomError::Reentrant`](crate::VdomError::Reentrant).
    pub fn refresh_slot(&mut self, handle: &RefreshHandle) -> Result<()> {
        self.vdom.refresh(handle)
    }

    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle { store: self.store }
    }

    /// Keep the previous output untouched this pass.
    pub fn leave(&self) -> Rendered {
        Rendered::Leave
    }
}

fn props_of<P: 'static>(vdom: &Vdom, vnode: VNodeId) -> Option<&P> {
    match &vdom.arena.get(vnode)?.kind {
        VNodeKind::Component { spec, .. } => spec.props.downcast_ref(),
        _ => None,
    }
}
