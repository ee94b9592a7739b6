//! Spec Primitives - The building blocks application code renders with.
//!
//! - [`element`], [`text`], [`list`], [`inline`], [`raw`] - spec builders
//! - [`Component`] - named render functions with typed props
//! - [`show`], [`each`] - conditional and keyed list helpers
//!
//! Specs are plain immutable values. Build a new tree every pass and hand
//! it to [`Vdom::render`](crate::Vdom::render); the engine works out what
//! changed.

mod component;
mod control_flow;
mod spec;

pub use component::{Component, ComponentId};
pub use control_flow::{each, show};
pub use spec::*;
