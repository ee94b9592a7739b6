//! Reconciliation Pipeline
//!
//! This module holds the public entry points that drive the engine.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Spec tree → VNode tree → execute(new, old) → Document mutations
//! ```
//!
//! ## Data Flow
//!
//! 1. **render / sync** - Validate keys, wrap the `Spec` in a root VNode
//! 2. **execute** - Pair the new tree with the previous one, depth first
//! 3. **lifecycle** - Attach, update and detach write to the document
//! 4. **settle** - Refinement and hooks run once a subtree is done
//!
//! ## Key Design Principles
//!
//! - **Specs are values**: every pass builds a new tree; nothing is patched by hand
//! - **Minimal writes**: unchanged text and attributes cost no mutation
//! - **Nested passes**: a hook may refresh its own slot or, through a
//!   `RefreshHandle`, another one

pub mod mount;
