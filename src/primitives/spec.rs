//! Spec types - Immutable descriptions of the desired tree.
//!
//! Application code builds a fresh `Spec` tree every pass. The engine wraps
//! it in virtual nodes and diffs it against the previous pass.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{element, text, list};
//!
//! let spec = element("ul")
//!     .attr("class", "todo")
//!     .child(list([
//!         element("li").key(1).child(text("write")),
//!         element("li").key(2).child(text("test")),
//!     ]));
//! ```

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::document::{Document, NodeId};
use crate::error::{Result, VdomError};
use crate::types::{AttrValue, Key, NodeHook, ON_CREATE, ON_REMOVE, ON_RENDER, ON_UPDATE};

use super::component::Component;

// =============================================================================
// Spec
// =============================================================================

/// Description of one desired node.
#[derive(Clone)]
pub enum Spec {
    /// Tag with attributes and children.
    Element(ElementSpec),
    /// Component call, unboxed during reconciliation.
    Component(ComponentSpec),
    /// Text node.
    Text(String),
    /// Nothing.
    Null,
    /// Function invoked with its position, rendering whatever it returns.
    Function(InlineFn),
    /// An already-existing node, inserted as-is.
    Raw(NodeId),
    /// Ordered group without a wrapper node.
    List(ListSpec),
}

impl Spec {
    /// Identity key, if this kind carries one.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Spec::Element(e) => e.key.as_ref(),
            Spec::Component(c) => c.key.as_ref(),
            Spec::List(l) => l.key.as_ref(),
            _ => None,
        }
    }

    /// Attach a key. Kinds without a key slot are wrapped in a keyed list.
    pub fn with_key(self, key: impl Into<Key>) -> Spec {
        let key = Some(key.into());
        match self {
            Spec::Element(mut e) => {
                e.key = key;
                Spec::Element(e)
            }
            Spec::Component(mut c) => {
                c.key = key;
                Spec::Component(c)
            }
            Spec::List(mut l) => {
                l.key = key;
                Spec::List(l)
            }
            other => Spec::List(ListSpec {
                key,
                items: vec![other],
            }),
        }
    }

    /// Reject duplicate sibling keys anywhere in the static part of the tree.
    ///
    /// Component output is not known yet; it is checked when unboxed.
    pub fn check_keys(&self) -> Result<()> {
        match self {
            Spec::Element(e) => check_siblings(&e.children),
            Spec::List(l) => check_siblings(&l.items),
            Spec::Component(c) => check_siblings(&c.children),
            _ => Ok(()),
        }
    }
}

fn check_siblings(children: &[Spec]) -> Result<()> {
    let mut seen = HashSet::new();
    for child in children {
        if let Some(key) = child.key() {
            if !seen.insert(key) {
                return Err(VdomError::DuplicateKey { key: key.clone() });
            }
        }
        child.check_keys()?;
    }
    Ok(())
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Spec::Element(e) => e.fmt(f),
            Spec::Component(c) => c.fmt(f),
            Spec::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Spec::Null => f.write_str("Null"),
            Spec::Function(_) => f.write_str("Function"),
            Spec::Raw(node) => f.debug_tuple("Raw").field(node).finish(),
            Spec::List(l) => l.fmt(f),
        }
    }
}

impl From<ElementSpec> for Spec {
    fn from(value: ElementSpec) -> Self {
        Spec::Element(value)
    }
}

impl From<ComponentSpec> for Spec {
    fn from(value: ComponentSpec) -> Self {
        Spec::Component(value)
    }
}

impl From<ListSpec> for Spec {
    fn from(value: ListSpec) -> Self {
        Spec::List(value)
    }
}

impl From<&str> for Spec {
    fn from(value: &str) -> Self {
        Spec::Text(value.to_string())
    }
}

impl From<String> for Spec {
    fn from(value: String) -> Self {
        Spec::Text(value)
    }
}

impl From<NodeId> for Spec {
    fn from(value: NodeId) -> Self {
        Spec::Raw(value)
    }
}

impl From<Vec<Spec>> for Spec {
    fn from(items: Vec<Spec>) -> Self {
        Spec::List(ListSpec { key: None, items })
    }
}

impl<T: Into<Spec>> From<Option<T>> for Spec {
    fn from(value: Option<T>) -> Self {
        value.map_or(Spec::Null, Into::into)
    }
}

// =============================================================================
// Element Spec
// =============================================================================

/// Tag name, attributes and children.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementSpec {
    pub tag: String,
    pub key: Option<Key>,
    pub attributes: BTreeMap<String, AttrValue>,
    pub children: Vec<Spec>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: impl Into<Spec>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Spec>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Called once the element and its subtree are first attached.
    pub fn on_create(self, hook: impl Fn(&mut Document, NodeId) + 'static) -> Self {
        self.hook(ON_CREATE, Rc::new(hook))
    }

    /// Called after every matched update.
    pub fn on_update(self, hook: impl Fn(&mut Document, NodeId) + 'static) -> Self {
        self.hook(ON_UPDATE, Rc::new(hook))
    }

    /// Called after both attach and update.
    pub fn on_render(self, hook: impl Fn(&mut Document, NodeId) + 'static) -> Self {
        self.hook(ON_RENDER, Rc::new(hook))
    }

    /// Called right before the element is removed.
    pub fn on_remove(self, hook: impl Fn(&mut Document, NodeId) + 'static) -> Self {
        self.hook(ON_REMOVE, Rc::new(hook))
    }

    fn hook(mut self, name: &str, hook: NodeHook) -> Self {
        self.attributes.insert(name.to_string(), AttrValue::Hook(hook));
        self
    }

    pub(crate) fn hook_named(&self, name: &str) -> Option<NodeHook> {
        match self.attributes.get(name) {
            Some(AttrValue::Hook(hook)) => Some(hook.clone()),
            _ => None,
        }
    }
}

impl PartialEq for Spec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Spec::Element(a), Spec::Element(b)) => a == b,
            (Spec::Text(a), Spec::Text(b)) => a == b,
            (Spec::Null, Spec::Null) => true,
            (Spec::Raw(a), Spec::Raw(b)) => a == b,
            (Spec::List(a), Spec::List(b)) => a == b,
            (Spec::Function(a), Spec::Function(b)) => Rc::ptr_eq(a, b),
            (Spec::Component(a), Spec::Component(b)) => {
                a.component == b.component && a.key == b.key && Rc::ptr_eq(&a.props, &b.props)
            }
            _ => false,
        }
    }
}

// =============================================================================
// List Spec
// =============================================================================

/// Ordered group of specs with no node of its own.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListSpec {
    pub key: Option<Key>,
    pub items: Vec<Spec>,
}

impl ListSpec {
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

// =============================================================================
// Component Spec
// =============================================================================

/// A component call: render function, props and children.
#[derive(Clone)]
pub struct ComponentSpec {
    pub component: Component,
    pub key: Option<Key>,
    pub props: Rc<dyn Any>,
    pub children: Vec<Spec>,
}

impl ComponentSpec {
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn child(mut self, child: impl Into<Spec>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Spec>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("component", &self.component.name())
            .field("key", &self.key)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Inline Function
// =============================================================================

/// Position information handed to an inline function.
pub struct InlineContext<'a> {
    pub document: &'a Document,
    /// Real parent the output lands in.
    pub parent: Option<NodeId>,
    /// First node produced by the previous pass, if any.
    pub node: Option<NodeId>,
    /// All nodes produced by the previous pass.
    pub nodes: Vec<NodeId>,
}

/// Function spec, invoked on every pass.
pub type InlineFn = Rc<dyn Fn(&InlineContext<'_>) -> Spec>;

// =============================================================================
// Render Result
// =============================================================================

/// What a component render produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Rendered {
    /// New output to reconcile.
    Spec(Spec),
    /// Keep the previous output untouched.
    Leave,
}

impl From<Spec> for Rendered {
    fn from(value: Spec) -> Self {
        Rendered::Spec(value)
    }
}

impl From<ElementSpec> for Rendered {
    fn from(value: ElementSpec) -> Self {
        Rendered::Spec(value.into())
    }
}

impl From<ComponentSpec> for Rendered {
    fn from(value: ComponentSpec) -> Self {
        Rendered::Spec(value.into())
    }
}

impl From<ListSpec> for Rendered {
    fn from(value: ListSpec) -> Self {
        Rendered::Spec(value.into())
    }
}

impl From<&str> for Rendered {
    fn from(value: &str) -> Self {
        Rendered::Spec(value.into())
    }
}

impl From<String> for Rendered {
    fn from(value: String) -> Self {
        Rendered::Spec(value.into())
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Start an element spec.
pub fn element(tag: impl Into<String>) -> ElementSpec {
    ElementSpec::new(tag)
}

/// Text spec.
pub fn text(content: impl Into<String>) -> Spec {
    Spec::Text(content.into())
}

/// Unkeyed list spec.
pub fn list<I, S>(items: I) -> ListSpec
where
    I: IntoIterator<Item = S>,
    S: Into<Spec>,
{
    ListSpec {
        key: None,
        items: items.into_iter().map(Into::into).collect(),
    }
}

/// Inline function spec.
pub fn inline(f: impl Fn(&InlineContext<'_>) -> Spec + 'static) -> Spec {
    Spec::Function(Rc::new(f))
}

/// Spec wrapping an existing node.
pub fn raw(node: NodeId) -> Spec {
    Spec::Raw(node)
}
