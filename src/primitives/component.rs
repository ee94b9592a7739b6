//! Component - Named render functions with typed props.
//!
//! A component is identified by the render function it was created with.
//! Two specs match across passes only when they point at the same
//! `Component` (or a clone of it).
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{Component, element, text};
//!
//! struct Greeting { name: String }
//!
//! let greeting = Component::new("Greeting", |_ctx, props: &Greeting| {
//!     Ok(element("p").child(text(format!("Hello, {}!", props.name))).into())
//! });
//!
//! let spec = greeting.spec(Greeting { name: "Ada".into() });
//! ```

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::engine::ComponentContext;
use crate::error::{Result, VdomError};

use super::spec::{ComponentSpec, Rendered};

/// Process-unique component identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(0);

/// Type-erased render function.
pub(crate) type RenderFn = Rc<dyn Fn(&mut ComponentContext<'_>, &dyn Any) -> Result<Rendered>>;

struct ComponentDef {
    id: ComponentId,
    name: String,
    render: RenderFn,
}

/// A reusable render function.
#[derive(Clone)]
pub struct Component(Rc<ComponentDef>);

impl Component {
    /// Create a component from a render function taking props of type `P`.
    ///
    /// Passing props of another type at render time is an input-shape error.
    pub fn new<P, F>(name: impl Into<String>, render: F) -> Self
    where
        P: 'static,
        F: Fn(&mut ComponentContext<'_>, &P) -> Result<Rendered> + 'static,
    {
        let name = name.into();
        let expected = name.clone();
        let render: RenderFn = Rc::new(move |ctx: &mut ComponentContext<'_>, props: &dyn Any| {
            let props = props.downcast_ref::<P>().ok_or_else(|| {
                VdomError::invalid(format!("component `{expected}` received props of the wrong type"))
            })?;
            render(ctx, props)
        });
        Self(Rc::new(ComponentDef {
            id: ComponentId(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed)),
            name,
            render,
        }))
    }

    pub fn id(&self) -> ComponentId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub(crate) fn render_fn(&self) -> RenderFn {
        self.0.render.clone()
    }

    /// Build a spec calling this component with `props`.
    pub fn spec<P: 'static>(&self, props: P) -> ComponentSpec {
        ComponentSpec {
            component: self.clone(),
            key: None,
            props: Rc::new(props),
            children: Vec::new(),
        }
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Spec;

    #[test]
    fn test_identity() {
        let a = Component::new("A", |_ctx, _props: &()| Ok(Rendered::Spec(Spec::Null)));
        let b = Component::new("A", |_ctx, _props: &()| Ok(Rendered::Spec(Spec::Null)));

        assert_eq!(a, a.clone(), "clones share identity");
        assert_ne!(a, b, "same name is not the same component");
        assert_eq!(a.name(), "A");
    }

    #[test]
    fn test_spec_carries_props() {
        let c = Component::new("Counter", |_ctx, _props: &u32| Ok(Rendered::Leave));
        let spec = c.spec(5u32).key("k");
        assert_eq!(spec.props.downcast_ref::<u32>(), Some(&5));
        assert_eq!(spec.component, c);
        assert!(spec.key.is_some());
    }
}
