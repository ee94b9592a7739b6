//! # spark-vdom
//!
//! Virtual-tree reconciliation for mutable document trees.
//!
//! ## Architecture
//!
//! spark-vdom keeps virtual nodes in an arena rather than as linked objects.
//! Each virtual node is an index; parents, children and the real nodes it
//! produced are tracked through indices and side tables.
//!
//! A pass is a single depth-first walk:
//! ```text
//! Spec tree → VNode tree → execute(new, old) → Document mutations
//! ```
//!
//! ## Modules
//!
//! - [`document`] - The mutable node tree being rendered into
//! - [`primitives`] - Spec builders, components, control flow helpers
//! - [`engine`] - Arena, position ledger, stores, plugins, reconciler
//! - [`pipeline`] - `render`, `sync`, `unmount` and `refresh`
//! - [`types`] - Keys, attribute values, node flags
//! - [`config`] / [`error`] - Engine options and the error type

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::Config;
pub use document::{Document, MutationStats, NodeData, NodeId};
pub use error::{Result, VdomError};

pub use engine::{
    AttributeChange, ComponentContext, CreateNode, CreateNodePlugin, Hook, PluginId,
    PluginRegistry, RefreshHandle, SetAttributePlugin, Store, StoreId, Vdom,
};

pub use primitives::{
    Component, ComponentId, ComponentSpec, ElementSpec, InlineContext, ListSpec, Rendered, Spec,
    each, element, inline, list, raw, show, text,
};
