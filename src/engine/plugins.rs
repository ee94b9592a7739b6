//! Plugin Registry - Scoped interceptors for node creation and attributes.
//!
//! Two extension points:
//! - create node: return `Some(node)` to supply the real node for an element
//! - set attribute: return `Some(())` to take over writing one attribute
//!
//! Interceptors are registered against a component. They are active while
//! that component renders and while its subtree is reconciled, and nowhere
//! else. Within one lookup the most recently installed scope goes first,
//! and inside a scope the most recently registered interceptor goes first.
//! The same interceptor instance (same `Rc`) runs at most once per lookup
//! even if several active scopes registered it.

use std::collections::HashMap;
use std::rc::Rc;

use crate::document::{Document, NodeId};
use crate::primitives::{Component, ComponentId, ElementSpec};
use crate::types::AttrValue;

/// Request to create the real node for an element spec.
pub struct CreateNode<'a> {
    pub spec: &'a ElementSpec,
    /// Real parent the node will be inserted under.
    pub parent: Option<NodeId>,
}

/// One attribute write. `value` is `None` when the attribute goes away.
pub struct AttributeChange<'a> {
    pub node: NodeId,
    pub name: &'a str,
    pub value: Option<&'a AttrValue>,
    pub previous: Option<&'a AttrValue>,
}

/// Node creation interceptor.
pub type CreateNodePlugin = Rc<dyn Fn(&mut Document, &CreateNode<'_>) -> Option<NodeId>>;

/// Attribute interceptor.
pub type SetAttributePlugin = Rc<dyn Fn(&mut Document, &AttributeChange<'_>) -> Option<()>>;

/// Registration handle, used to remove an interceptor again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId(usize);

#[derive(Default)]
struct Scope {
    create_node: Vec<(PluginId, CreateNodePlugin)>,
    set_attribute: Vec<(PluginId, SetAttributePlugin)>,
}

/// Interceptors by component, plus the stack of active scopes.
#[derive(Default)]
pub struct PluginRegistry {
    scopes: HashMap<ComponentId, Scope>,
    active: Vec<ComponentId>,
    next_id: usize,
}

impl PluginRegistry {
    fn next_id(&mut self) -> PluginId {
        let id = PluginId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Intercept node creation inside `component`'s subtree.
    pub fn on_create_node(&mut self, component: &Component, plugin: CreateNodePlugin) -> PluginId {
        let id = self.next_id();
        self.scopes
            .entry(component.id())
            .or_default()
            .create_node
            .push((id, plugin));
        id
    }

    /// Intercept attribute writes inside `component`'s subtree.
    pub fn on_set_attribute(&mut self, component: &Component, plugin: SetAttributePlugin) -> PluginId {
        let id = self.next_id();
        self.scopes
            .entry(component.id())
            .or_default()
            .set_attribute
            .push((id, plugin));
        id
    }

    /// Remove a registration. Returns false if it was already gone.
    pub fn remove(&mut self, id: PluginId) -> bool {
        let mut found = false;
        for scope in self.scopes.values_mut() {
            let before = scope.create_node.len() + scope.set_attribute.len();
            scope.create_node.retain(|(plugin_id, _)| *plugin_id != id);
            scope.set_attribute.retain(|(plugin_id, _)| *plugin_id != id);
            found |= before != scope.create_node.len() + scope.set_attribute.len();
        }
        self.scopes
            .retain(|_, s| !s.create_node.is_empty() || !s.set_attribute.is_empty());
        found
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    // =========================================================================
    // Scope Stack
    // =========================================================================

    pub(crate) fn install(&mut self, component: ComponentId) {
        self.active.push(component);
    }

    pub(crate) fn uninstall(&mut self, component: ComponentId) {
        if let Some(at) = self.active.iter().rposition(|c| *c == component) {
            self.active.remove(at);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.active.clear();
    }

    pub(crate) fn active_depth(&self) -> usize {
        self.active.len()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    fn active_plugins<P: ?Sized>(&self, pick: impl Fn(&Scope) -> &[(PluginId, Rc<P>)]) -> Vec<Rc<P>> {
        let mut seen: Vec<*const ()> = Vec::new();
        let mut out = Vec::new();
        for component in self.active.iter().rev() {
            let Some(scope) = self.scopes.get(component) else {
                continue;
            };
            for (_, plugin) in pick(scope).iter().rev() {
                let identity = Rc::as_ptr(plugin) as *const ();
                if !seen.contains(&identity) {
                    seen.push(identity);
                    out.push(plugin.clone());
                }
            }
        }
        out
    }

    /// Ask active interceptors for a node. `None` means use the default.
    pub(crate) fn create_node(&self, doc: &mut Document, request: &CreateNode<'_>) -> Option<NodeId> {
        self.active_plugins(|s| s.create_node.as_slice())
            .iter()
            .find_map(|plugin| plugin(doc, request))
    }

    /// Ask active interceptors to write an attribute. `None` means use the
    /// default.
    pub(crate) fn set_attribute(&self, doc: &mut Document, change: &AttributeChange<'_>) -> Option<()> {
        self.active_plugins(|s| s.set_attribute.as_slice())
            .iter()
            .find_map(|plugin| plugin(doc, change))
    }
}
