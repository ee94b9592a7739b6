//! Component variant: unboxing, store hand-over and lifecycle hooks.

use tracing::{trace, warn};

use crate::engine::Vdom;
use crate::engine::arena::{VNodeId, VNodeKind};
use crate::engine::context::ComponentContext;
use crate::engine::store::{Hook, LifecycleHooks, Store, StoreId};
use crate::error::Result;
use crate::primitives::{ComponentId, Rendered, Spec};

use super::Flow;

impl Vdom {
    fn component_of(&self, id: VNodeId) -> Option<(ComponentId, Option<StoreId>)> {
        match &self.arena.get(id)?.kind {
            VNodeKind::Component { spec, store } => Some((spec.component.id(), *store)),
            _ => None,
        }
    }

    fn set_store(&mut self, id: VNodeId, store: Option<StoreId>) {
        if let VNodeKind::Component { store: slot, .. } = &mut self.arena[id].kind {
            *slot = store;
        }
    }

    /// Call the render function. The output's static keys are checked
    /// before anything is reconciled.
    fn unbox(&mut self, id: VNodeId, store: StoreId, previous: Option<VNodeId>) -> Result<Rendered> {
        let VNodeKind::Component { spec, .. } = &self.arena[id].kind else {
            return Ok(Rendered::Spec(Spec::Null));
        };
        let render = spec.component.render_fn();
        let props = spec.props.clone();
        trace!(component = spec.component.name(), "unboxing");

        let rendered = {
            let mut ctx = ComponentContext::new(self, id, store, previous);
            render(&mut ctx, &*props)?
        };
        if let Rendered::Spec(spec) = &rendered {
            spec.check_keys()?;
        }
        Ok(rendered)
    }

    pub(super) fn attach_component(&mut self, id: VNodeId) -> Result<()> {
        let VNodeKind::Component { spec, .. } = &self.arena[id].kind else {
            return Ok(());
        };
        let component = spec.component.id();
        let store = self.stores.create(Store::new(spec.component.name(), id));
        self.set_store(id, Some(store));

        self.plugins.install(component);
        self.stores[store].busy = true;
        let child = match self.unbox(id, store, None)? {
            Rendered::Spec(spec) => spec,
            Rendered::Leave => Spec::Null,
        };
        self.create_children(id, vec![child])
    }

    pub(super) fn component_attached(&mut self, id: VNodeId) -> Result<()> {
        let Some((component, Some(store))) = self.component_of(id) else {
            return Ok(());
        };
        self.plugins.uninstall(component);
        self.stores[store].busy = false;
        self.fire(id, store, None, |h| h.created.clone())?;
        self.fire(id, store, None, |h| h.rendered.clone())
    }

    pub(super) fn update_component(&mut self, new: VNodeId, old: VNodeId) -> Result<Flow> {
        let Some((component, store)) = self.component_of(old) else {
            return self.attach_component(new).map(|_| Flow::Continue);
        };
        let Some(store) = store else {
            return self.attach_component(new).map(|_| Flow::Continue);
        };
        self.set_store(old, None);
        self.set_store(new, Some(store));
        self.stores[store].vnode = new;

        self.plugins.install(component);
        self.stores[store].busy = true;
        match self.unbox(new, store, Some(old))? {
            Rendered::Spec(spec) => {
                self.create_children(new, vec![spec])?;
                Ok(Flow::Continue)
            }
            Rendered::Leave => {
                self.plugins.uninstall(component);
                self.stores[store].busy = false;
                if let Some(child) = self.arena[old].children.first().copied() {
                    let adopted = self.ledger.adopt(&mut self.arena, new, child);
                    for link in adopted {
                        if let Some(node) = self.ledger.link(link).and_then(|l| l.node) {
                            self.position_link(link, node);
                        }
                    }
                }
                Ok(Flow::Leave)
            }
        }
    }

    pub(super) fn component_updated(&mut self, new: VNodeId, old: VNodeId) -> Result<()> {
        let Some((component, Some(store))) = self.component_of(new) else {
            return Ok(());
        };
        self.plugins.uninstall(component);
        self.stores[store].busy = false;
        self.fire(new, store, Some(old), |h| h.updated.clone())?;
        self.fire(new, store, Some(old), |h| h.rendered.clone())
    }

    pub(super) fn detach_component(&mut self, id: VNodeId) -> Result<()> {
        let Some((_, Some(store))) = self.component_of(id) else {
            return Ok(());
        };
        if let Some(entry) = self.stores.get_mut(store) {
            entry.removed = true;
        }
        self.fire(id, store, None, |h| h.removed.clone())
    }

    pub(super) fn component_detached(&mut self, id: VNodeId) {
        if let Some((_, Some(store))) = self.component_of(id) {
            self.stores.remove(store);
            self.set_store(id, None);
        }
    }

    /// Tear down a store whose slot a failed pass left behind. The removed
    /// hook still runs; its error is only logged.
    pub(crate) fn drop_store(&mut self, store: StoreId) {
        let Some(entry) = self.stores.get_mut(store) else {
            return;
        };
        entry.removed = true;
        let id = entry.vnode;
        if let Err(err) = self.fire(id, store, None, |h| h.removed.clone()) {
            warn!(error = %err, "removed hook failed while dropping an orphaned store");
        }
        self.stores.remove(store);
    }

    /// Run one lifecycle hook, unless a nested refresh already replaced
    /// this instance.
    fn fire(
        &mut self,
        id: VNodeId,
        store: StoreId,
        previous: Option<VNodeId>,
        pick: fn(&LifecycleHooks) -> Option<Hook>,
    ) -> Result<()> {
        let Some(entry) = self.stores.get(store) else {
            return Ok(());
        };
        if entry.vnode != id || !self.arena.contains(id) {
            return Ok(());
        }
        let Some(hook) = pick(&entry.hooks) else {
            return Ok(());
        };
        let mut ctx = ComponentContext::new(self, id, store, previous);
        hook(&mut ctx)
    }
}
