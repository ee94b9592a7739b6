//! Core types for spark-vdom.
//!
//! Keys, attribute values and the engine-private node flags. These flow
//! through every spec and virtual node.

use std::fmt;
use std::rc::Rc;

use crate::document::{Document, NodeId};

// =============================================================================
// Key
// =============================================================================

/// Sibling identity across reconciliation passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{s:?}"),
            Key::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(i64::from(value))
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Int(i64::from(value))
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

// =============================================================================
// Attribute Values
// =============================================================================

/// Element lifecycle callback stored in an attribute slot.
pub type NodeHook = Rc<dyn Fn(&mut Document, NodeId)>;

/// Attribute names holding element lifecycle callbacks.
pub const ON_CREATE: &str = "oncreate";
pub const ON_UPDATE: &str = "onupdate";
pub const ON_RENDER: &str = "onrender";
pub const ON_REMOVE: &str = "onremove";

/// Value of one element attribute.
#[derive(Clone)]
pub enum AttrValue {
    /// Written verbatim.
    Text(String),
    /// `true` writes an empty attribute, `false` removes it.
    Bool(bool),
    /// Written using its shortest decimal form.
    Number(f64),
    /// Lifecycle callback. Never written to the document.
    Hook(NodeHook),
}

impl AttrValue {
    /// The string the document should hold, or `None` to remove it.
    pub fn as_attribute(&self) -> Option<String> {
        match self {
            AttrValue::Text(s) => Some(s.clone()),
            AttrValue::Bool(true) => Some(String::new()),
            AttrValue::Bool(false) => None,
            AttrValue::Number(n) => Some(n.to_string()),
            AttrValue::Hook(_) => None,
        }
    }

    pub fn is_hook(&self) -> bool {
        matches!(self, AttrValue::Hook(_))
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Text(a), AttrValue::Text(b)) => a == b,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Number(a), AttrValue::Number(b)) => a == b,
            (AttrValue::Hook(a), AttrValue::Hook(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            AttrValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            AttrValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            AttrValue::Hook(_) => f.write_str("Hook"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(f64::from(value))
    }
}

// =============================================================================
// Node Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// What the engine knows about a real node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Created by the engine.
        const CREATED = 0b0001;
        /// Currently tracked by a virtual node (created or captured).
        const OWNED   = 0b0010;
        /// Children are under engine control; no more capture inside.
        const REFINED = 0b0100;
        /// Supplied by the application; never pruned.
        const RAW     = 0b1000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(Key::from("row").to_string(), "\"row\"");
        assert_eq!(Key::from(7).to_string(), "7");
        assert_ne!(Key::from("1"), Key::from(1));
    }

    #[test]
    fn test_attr_as_attribute() {
        assert_eq!(AttrValue::from("x").as_attribute(), Some("x".to_string()));
        assert_eq!(AttrValue::from(true).as_attribute(), Some(String::new()));
        assert_eq!(AttrValue::from(false).as_attribute(), None);
        assert_eq!(AttrValue::from(1.5).as_attribute(), Some("1.5".to_string()));
        assert_eq!(AttrValue::from(3).as_attribute(), Some("3".to_string()));
    }

    #[test]
    fn test_hook_equality_is_identity() {
        let hook: NodeHook = Rc::new(|_, _| {});
        let same = AttrValue::Hook(hook.clone());
        let other = AttrValue::Hook(Rc::new(|_, _| {}));
        assert_eq!(AttrValue::Hook(hook), same);
        assert_ne!(same, other);
        assert!(same.is_hook());
        assert_eq!(same.as_attribute(), None);
    }

    #[test]
    fn test_node_flags() {
        let mut flags = NodeFlags::CREATED | NodeFlags::OWNED;
        assert!(flags.contains(NodeFlags::OWNED));
        assert!(!flags.contains(NodeFlags::REFINED));
        flags.insert(NodeFlags::REFINED);
        assert!(flags.contains(NodeFlags::REFINED));
    }
}
