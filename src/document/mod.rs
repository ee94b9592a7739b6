//! Document - A headless ordered tree of mutable nodes.
//!
//! This is the "real" tree the engine patches. Nodes are indices into a
//! node table, like components are indices into parallel arrays:
//!
//! ```text
//! Index 0: Element "body" (parent=None, children=[1, 2])
//! Index 1: Element "div"  (parent=0,    children=[3])
//! Index 2: Text    "tail" (parent=0)
//! Index 3: Text    "a"    (parent=1)
//! ```
//!
//! Unlike component indices, node ids are never reused. The engine keeps
//! side tables keyed by `NodeId`, and a recycled id would silently inherit
//! another node's records.

use std::collections::BTreeMap;
use std::fmt::Write as _;

// =============================================================================
// Node Identity
// =============================================================================

/// Stable handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Concrete node kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// =============================================================================
// Mutation Stats
// =============================================================================

/// Counters for every write made to a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    /// Nodes created.
    pub created: usize,
    /// Insertions, including moves of already-attached nodes.
    pub inserted: usize,
    /// Nodes detached from their parent.
    pub removed: usize,
    /// Attribute writes and removals.
    pub attributes: usize,
    /// Text content writes.
    pub texts: usize,
}

impl MutationStats {
    /// Mutations that change the shape of the tree.
    pub fn structural(&self) -> usize {
        self.created + self.inserted + self.removed
    }

    /// All mutations.
    pub fn total(&self) -> usize {
        self.structural() + self.attributes + self.texts
    }
}

// =============================================================================
// Document
// =============================================================================

/// Ordered tree of element and text nodes.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeEntry>,
    stats: MutationStats,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
        })
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(NodeData::Text(content.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            data,
            parent: None,
            children: Vec::new(),
        });
        self.stats.created += 1;
        id
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` under `parent` before `reference` (or last when `None`).
    ///
    /// A child that already has a parent is moved. A reference that is not a
    /// child of `parent` appends.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if !self.is_live(parent) || !self.is_live(child) || parent == child {
            return;
        }
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let position = reference
            .and_then(|r| siblings.iter().position(|&c| c == r))
            .unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
        self.stats.inserted += 1;
    }

    /// Detach `node` from its parent. The node stays valid and can be
    /// inserted again.
    pub fn remove(&mut self, node: NodeId) {
        if self.detach(node) {
            self.stats.removed += 1;
        }
    }

    fn detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.parent(node) else {
            return false;
        };
        self.nodes[parent.0].children.retain(|&c| c != node);
        self.nodes[node.0].parent = None;
        true
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(NodeData::Element { attributes, .. }) = self.data_mut(node) {
            attributes.insert(name.to_string(), value.to_string());
            self.stats.attributes += 1;
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(NodeData::Element { attributes, .. }) = self.data_mut(node) {
            if attributes.remove(name).is_some() {
                self.stats.attributes += 1;
            }
        }
    }

    pub fn set_text(&mut self, node: NodeId, content: &str) {
        if let Some(NodeData::Text(text)) = self.data_mut(node) {
            *text = content.to_string();
            self.stats.texts += 1;
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn is_live(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    pub fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0).map(|entry| &entry.data)
    }

    fn data_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node.0).map(|entry| &mut entry.data)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.data(node), Some(NodeData::Element { .. }))
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.data(node), Some(NodeData::Text(_)))
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.data(node) {
            Some(NodeData::Element { tag, .. }) => Some(tag),
            _ => None,
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.data(node) {
            Some(NodeData::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.data(node) {
            Some(NodeData::Element { attributes, .. }) => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|entry| entry.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&c| c == node)?;
        siblings.get(position + 1).copied()
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&c| c == node)?;
        position.checked_sub(1).map(|p| siblings[p])
    }

    pub fn stats(&self) -> MutationStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = MutationStats::default();
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Serialize `node` and its subtree.
    pub fn markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    /// Serialize the children of `node`, without `node` itself.
    pub fn inner_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_markup(child, &mut out);
        }
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        match self.data(node) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element { tag, attributes }) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for &child in self.children(node) {
                    self.write_markup(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
            None => {}
        }
    }
}
