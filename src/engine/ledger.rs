//! Position Ledger - Links and Hubs.
//!
//! Answers "which real node comes right before me?" for any virtual node,
//! including the many that never own a real node (components, lists,
//! nulls, inline functions).
//!
//! - A `Link` is one slot under a real parent. `node` is filled in once
//!   something materializes there.
//! - A `Hub` is the ordered list of links under one real parent. Its order
//!   is the document order of that parent's tracked children.
//! - Every virtual node holds the links of its subtree's top-level slots.
//!   Non-owning ancestors share those ids, up to the nearest ancestor that
//!   owns a real node.
//!
//! Link ids are never reused. A stale id in some old node's list is simply
//! ignored.

use std::collections::HashMap;

use crate::document::NodeId;

use super::arena::{VNodeArena, VNodeId};
use super::linked_list::LinkedList;

/// Handle to a link record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LinkId(u64);

/// Caller-supplied position of a reconciliation root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RootSeed {
    /// Real parent the root renders under.
    pub(crate) parent_node: Option<NodeId>,
    /// Host-tree sibling the root's output follows.
    pub(crate) prev: Option<NodeId>,
    /// Existing node to capture for the root's first node.
    pub(crate) hint: Option<NodeId>,
}

/// One slot under a real parent.
#[derive(Debug, Clone)]
pub(crate) struct Link {
    pub(crate) parent_node: Option<NodeId>,
    pub(crate) node: Option<NodeId>,
    /// Virtual node that frees this record on release.
    pub(crate) owner: VNodeId,
    pub(crate) seed: Option<RootSeed>,
}

/// Link records and the hubs that order them.
#[derive(Default)]
pub(crate) struct Ledger {
    links: HashMap<LinkId, Link>,
    hubs: HashMap<NodeId, LinkedList<LinkId>>,
    next_id: u64,
}

impl Ledger {
    // =========================================================================
    // Records
    // =========================================================================

    pub(crate) fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    fn create(&mut self, parent_node: Option<NodeId>, owner: VNodeId, seed: Option<RootSeed>) -> LinkId {
        let id = LinkId(self.next_id);
        self.next_id += 1;
        self.links.insert(
            id,
            Link {
                parent_node,
                node: None,
                owner,
                seed,
            },
        );
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    /// Real nodes behind `links`, in order, skipping pending slots.
    pub(crate) fn nodes(&self, links: &[LinkId]) -> Vec<NodeId> {
        links
            .iter()
            .filter_map(|id| self.links.get(id))
            .filter_map(|link| link.node)
            .collect()
    }

    pub(crate) fn parent_node(&self, links: &[LinkId]) -> Option<NodeId> {
        links
            .iter()
            .filter_map(|id| self.links.get(id))
            .find_map(|link| link.parent_node)
    }

    // =========================================================================
    // Hubs
    // =========================================================================

    fn is_hooked(&self, id: LinkId) -> bool {
        self.links
            .get(&id)
            .and_then(|link| link.parent_node)
            .and_then(|parent| self.hubs.get(&parent))
            .is_some_and(|hub| hub.contains(id))
    }

    /// Place `id` in its hub right after `anchor`, or first when `anchor`
    /// is not in the hub.
    fn hook_after(&mut self, id: LinkId, anchor: Option<LinkId>) {
        if let Some(parent) = self.links.get(&id).and_then(|link| link.parent_node) {
            self.hubs.entry(parent).or_default().insert_after(id, anchor);
        }
    }

    fn hook_back(&mut self, id: LinkId) {
        if let Some(parent) = self.links.get(&id).and_then(|link| link.parent_node) {
            self.hubs.entry(parent).or_default().push_back(id);
        }
    }

    fn unhook(&mut self, id: LinkId) {
        let Some(parent) = self.links.get(&id).and_then(|link| link.parent_node) else {
            return;
        };
        if let Some(hub) = self.hubs.get_mut(&parent) {
            hub.remove(id);
            if hub.is_empty() {
                self.hubs.remove(&parent);
            }
        }
    }

    /// Take every link of `id` out of its hub. Records stay until released.
    pub(crate) fn unhook_all(&mut self, arena: &VNodeArena, id: VNodeId) {
        for link in arena[id].links.clone() {
            self.unhook(link);
        }
    }

    /// Drop the hub anchored at a real node that is going away.
    pub(crate) fn close_hub(&mut self, node: NodeId) {
        self.hubs.remove(&node);
    }

    /// Last materialized node tracked under `parent`.
    pub(crate) fn last_node(&self, parent: NodeId) -> Option<NodeId> {
        let hub = self.hubs.get(&parent)?;
        let last = hub.last()?;
        std::iter::once(last)
            .chain(hub.iter_before(last))
            .filter_map(|id| self.links.get(&id))
            .find_map(|link| link.node)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Give a freshly created virtual node its position.
    pub(crate) fn register(&mut self, arena: &mut VNodeArena, id: VNodeId) {
        let Some(parent) = arena[id].parent else {
            let seed = arena[id].seed.unwrap_or_default();
            let link = self.create(seed.parent_node, id, Some(seed));
            self.hook_back(link);
            arena[id].links = vec![link];
            return;
        };

        let parent_owns_node = arena[parent].kind.materializes();
        if !parent_owns_node && !arena[parent].branched {
            let shared = arena[parent].links.clone();
            arena[parent].branched = true;
            arena[id].links = shared;
            return;
        }

        let parent_node = if parent_owns_node {
            arena[parent].node
        } else {
            self.parent_node(&arena[parent].links)
        };
        let anchor = self.preceding_link(arena, parent, id);
        let link = self.create(parent_node, id, None);
        self.hook_after(link, anchor);
        arena[id].links = vec![link];

        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if arena[ancestor].kind.materializes() {
                break;
            }
            let links = &mut arena[ancestor].links;
            let at = anchor
                .and_then(|a| links.iter().position(|l| *l == a))
                .map_or(0, |i| i + 1);
            links.insert(at, link);
            cursor = arena[ancestor].parent;
        }
    }

    /// Last live link of the nearest earlier sibling that has one.
    fn preceding_link(&self, arena: &VNodeArena, parent: VNodeId, id: VNodeId) -> Option<LinkId> {
        let siblings = &arena[parent].children;
        let index = siblings.iter().position(|c| *c == id)?;
        siblings[..index]
            .iter()
            .rev()
            .filter_map(|s| arena.get(*s))
            .find_map(|s| s.links.iter().rev().find(|l| self.is_hooked(**l)).copied())
    }

    /// Swap `old` for `new` in place: `new` gets one pending link right
    /// where `old`'s span was, and `old`'s links leave their hubs.
    pub(crate) fn replace(&mut self, arena: &mut VNodeArena, new: VNodeId, old: VNodeId) {
        let old_links = arena[old].links.clone();
        let seed = arena[new].seed;
        let parent_node = self
            .parent_node(&old_links)
            .or_else(|| seed.and_then(|s| s.parent_node));
        let anchor = old_links.iter().rev().find(|l| self.is_hooked(**l)).copied();

        let link = self.create(parent_node, new, seed);
        match anchor {
            Some(anchor) => self.hook_after(link, Some(anchor)),
            None => self.hook_back(link),
        }
        // Links `old` shared with a live ancestor go away with `old`
        let live = arena.ancestors(new);
        for old_link in &old_links {
            self.unhook(*old_link);
            if let Some(record) = self.links.get_mut(old_link) {
                if live.contains(&record.owner) {
                    record.owner = old;
                }
            }
        }
        arena[new].links = vec![link];

        let mut cursor = arena[new].parent;
        while let Some(ancestor) = cursor {
            if arena[ancestor].kind.materializes() {
                break;
            }
            splice(&mut arena[ancestor].links, &old_links, &[link]);
            cursor = arena[ancestor].parent;
        }
    }

    /// Hand `holder`'s position to `child`, an existing subtree kept as is.
    ///
    /// `child`'s links replace `holder`'s pending link in the hub and in
    /// every non-owning ancestor list, and the pending link is freed. Links
    /// that `child` only shared with its old ancestors become its own.
    /// Returns the adopted links.
    pub(crate) fn adopt(&mut self, arena: &mut VNodeArena, holder: VNodeId, child: VNodeId) -> Vec<LinkId> {
        let pending = arena[holder].links.clone();
        let adopted: Vec<LinkId> = arena[child]
            .links
            .iter()
            .copied()
            .filter(|l| self.links.contains_key(l))
            .collect();
        if adopted.is_empty() {
            return adopted;
        }

        let parent_node = self.parent_node(&pending);
        let mut live = arena.ancestors(holder);
        live.push(holder);
        let old_chain: Vec<VNodeId> = arena
            .ancestors(child)
            .into_iter()
            .filter(|a| !live.contains(a))
            .collect();
        let mut anchor = pending.iter().rev().find(|l| self.is_hooked(**l)).copied();
        for id in &adopted {
            self.unhook(*id);
            if let Some(link) = self.links.get_mut(id) {
                if parent_node.is_some() {
                    link.parent_node = parent_node;
                }
                if old_chain.contains(&link.owner) {
                    link.owner = child;
                }
            }
            match anchor {
                Some(a) => self.hook_after(*id, Some(a)),
                None => self.hook_back(*id),
            }
            anchor = Some(*id);
        }
        let seed = pending
            .iter()
            .find_map(|id| self.links.get(id).and_then(|l| l.seed));
        for id in &pending {
            self.unhook(*id);
            self.links.remove(id);
        }
        if let Some(first) = adopted.first().and_then(|id| self.links.get_mut(id)) {
            first.seed = first.seed.or(seed);
        }

        arena[holder].links = adopted.clone();
        let mut cursor = arena[holder].parent;
        while let Some(ancestor) = cursor {
            if arena[ancestor].kind.materializes() {
                break;
            }
            splice(&mut arena[ancestor].links, &pending, &adopted);
            cursor = arena[ancestor].parent;
        }
        arena.transplant(child, holder);
        adopted
    }

    /// Record `node` in every pending link of `id`.
    pub(crate) fn materialize(&mut self, arena: &mut VNodeArena, id: VNodeId, node: NodeId) {
        arena[id].node = Some(node);
        for link in &arena[id].links {
            if let Some(link) = self.links.get_mut(link) {
                if link.node.is_none() {
                    link.node = Some(node);
                }
            }
        }
    }

    /// Free the records `id` owns.
    pub(crate) fn release(&mut self, links: &[LinkId], id: VNodeId) {
        for link in links {
            if self.links.get(link).is_some_and(|l| l.owner == id) {
                self.unhook(*link);
                self.links.remove(link);
            }
        }
    }

    /// Free every record whose owner fails `live`, wherever it is hooked.
    pub(crate) fn retain_owned(&mut self, live: impl Fn(VNodeId) -> bool) {
        let dead: Vec<LinkId> = self
            .links
            .iter()
            .filter(|(_, link)| !live(link.owner))
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            self.unhook(id);
            self.links.remove(&id);
        }
    }

    // =========================================================================
    // Sibling Lookup
    // =========================================================================

    /// Real node that must come right before `id`'s slot.
    ///
    /// Two branches: a root link answers from its seed (the host tree), any
    /// other link walks its hub backward to the first materialized slot,
    /// stopping at a root's seed.
    pub(crate) fn previous_node(&self, id: LinkId) -> Option<NodeId> {
        let link = self.links.get(&id)?;
        if let Some(seed) = link.seed {
            return seed.prev;
        }
        let hub = self.hubs.get(&link.parent_node?)?;
        if !hub.contains(id) {
            return None;
        }
        for other in hub.iter_before(id) {
            let Some(other) = self.links.get(&other) else {
                continue;
            };
            if let Some(node) = other.node {
                return Some(node);
            }
            if let Some(seed) = other.seed {
                return seed.prev;
            }
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn hub_order(&self, parent: NodeId) -> Vec<LinkId> {
        self.hubs
            .get(&parent)
            .map(|hub| hub.iter().collect())
            .unwrap_or_default()
    }
}

/// Replace the run of `old` ids in `list` with `new`.
fn splice(list: &mut Vec<LinkId>, old: &[LinkId], new: &[LinkId]) {
    let Some(at) = list.iter().position(|l| old.contains(l)) else {
        return;
    };
    list.retain(|l| !old.contains(l));
    let at = at.min(list.len());
    list.splice(at..at, new.iter().copied());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::engine::arena::{VNode, VNodeKind};
    use crate::primitives::ListSpec;

    struct Fixture {
        arena: VNodeArena,
        ledger: Ledger,
        container: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut doc = Document::new();
            Self {
                arena: VNodeArena::default(),
                ledger: Ledger::default(),
                container: doc.create_element("root"),
            }
        }

        /// Render wrapper owning `container`, registered and materialized.
        fn wrapper(&mut self) -> VNodeId {
            let kind = VNodeKind::Raw {
                node: self.container,
                child: Some(crate::primitives::Spec::Null),
            };
            let id = self.arena.insert(VNode::root(kind, RootSeed::default()));
            self.ledger.register(&mut self.arena, id);
            self.ledger.materialize(&mut self.arena, id, self.container);
            id
        }

        fn child(&mut self, parent: VNodeId, kind: VNodeKind) -> VNodeId {
            let id = self.arena.insert(VNode::new(kind, Some(parent)));
            self.arena[parent].children.push(id);
            self.ledger.register(&mut self.arena, id);
            id
        }
    }

    fn list() -> VNodeKind {
        VNodeKind::List(ListSpec::default())
    }

    #[test]
    fn test_first_child_shares_parent_links() {
        let mut f = Fixture::new();
        let root = f.wrapper();
        let outer = f.child(root, list());
        let first = f.child(outer, VNodeKind::Null);

        assert_eq!(f.arena[first].links, f.arena[outer].links, "first child copies");
        assert!(f.arena[outer].branched);
        assert_eq!(f.ledger.hub_order(f.container).len(), 1);
    }

    #[test]
    fn test_later_children_get_ordered_links() {
        let mut f = Fixture::new();
        let root = f.wrapper();
        let outer = f.child(root, list());
        let a = f.child(outer, VNodeKind::Null);
        let b = f.child(outer, VNodeKind::Null);
        let c = f.child(outer, VNodeKind::Null);

        let order = f.ledger.hub_order(f.container);
        let expected: Vec<_> = [a, b, c].iter().map(|v| f.arena[*v].links[0]).collect();
        assert_eq!(order, expected, "hub follows sibling order");
        assert_eq!(f.arena[outer].links, expected, "ancestor list mirrors hub");
    }

    #[test]
    fn test_nested_list_links_stay_contiguous() {
        let mut f = Fixture::new();
        let root = f.wrapper();
        let outer = f.child(root, list());
        let inner = f.child(outer, list());
        let a1 = f.child(inner, VNodeKind::Null);
        let a2 = f.child(inner, VNodeKind::Null);
        let b = f.child(outer, VNodeKind::Null);

        let order = f.ledger.hub_order(f.container);
        let expected: Vec<_> = [a1, a2, b].iter().map(|v| f.arena[*v].links[0]).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_previous_node_skips_pending() {
        let mut f = Fixture::new();
        let mut doc = Document::new();
        let root = f.wrapper();
        let outer = f.child(root, list());
        let a = f.child(outer, VNodeKind::Text("a".into()));
        let gap = f.child(outer, VNodeKind::Null);
        let b = f.child(outer, VNodeKind::Text("b".into()));

        let node_a = doc.create_text("a");
        f.ledger.materialize(&mut f.arena, a, node_a);

        let b_link = f.arena[b].links[0];
        let gap_link = f.arena[gap].links[0];
        assert_eq!(f.ledger.previous_node(b_link), Some(node_a));
        assert_eq!(f.ledger.previous_node(gap_link), Some(node_a));
        assert_eq!(f.ledger.previous_node(f.arena[a].links[0]), None);
    }

    #[test]
    fn test_seeded_root_answers_from_seed() {
        let mut f = Fixture::new();
        let mut doc = Document::new();
        let before = doc.create_text("before");
        let seed = RootSeed {
            parent_node: Some(f.container),
            prev: Some(before),
            hint: None,
        };
        let root = f.arena.insert(VNode::root(list(), seed));
        f.ledger.register(&mut f.arena, root);
        let first = f.child(root, VNodeKind::Null);
        let second = f.child(root, VNodeKind::Null);

        assert_eq!(f.ledger.previous_node(f.arena[first].links[0]), Some(before));
        assert_eq!(
            f.ledger.previous_node(f.arena[second].links[0]),
            Some(before),
            "walk stops at the pending root link"
        );
    }

    #[test]
    fn test_replace_keeps_slot() {
        let mut f = Fixture::new();
        let root = f.wrapper();
        let outer = f.child(root, list());
        let a = f.child(outer, VNodeKind::Null);
        let b = f.child(outer, VNodeKind::Null);
        let c = f.child(outer, VNodeKind::Null);

        let fresh = f.arena.insert(VNode::new(VNodeKind::Null, Some(outer)));
        f.ledger.replace(&mut f.arena, fresh, b);
        f.arena.replace_child(outer, b, fresh);

        let order = f.ledger.hub_order(f.container);
        let expected: Vec<_> = [a, fresh, c].iter().map(|v| f.arena[*v].links[0]).collect();
        assert_eq!(order, expected);
        assert_eq!(f.arena[outer].links, expected);
    }

    #[test]
    fn test_release_frees_owned_only() {
        let mut f = Fixture::new();
        let root = f.wrapper();
        let outer = f.child(root, list());
        let a = f.child(outer, VNodeKind::Null);
        let b = f.child(outer, VNodeKind::Null);
        let before = f.ledger.len();

        let links = f.arena[a].links.clone();
        f.ledger.release(&links, a);
        assert_eq!(f.ledger.len(), before, "first child only shares its link");

        let links = f.arena[b].links.clone();
        f.ledger.release(&links, b);
        assert_eq!(f.ledger.len(), before - 1);
    }

    #[test]
    fn test_retain_owned_unhooks_dropped_records() {
        let mut f = Fixture::new();
        let root = f.wrapper();
        let outer = f.child(root, list());
        let a = f.child(outer, VNodeKind::Null);
        let b = f.child(outer, VNodeKind::Null);
        let c = f.child(outer, VNodeKind::Null);
        let before = f.ledger.len();

        f.ledger.retain_owned(|owner| owner != b);

        assert_eq!(f.ledger.len(), before - 1);
        assert!(f.ledger.link(f.arena[b].links[0]).is_none());
        let expected = vec![f.arena[a].links[0], f.arena[c].links[0]];
        assert_eq!(f.ledger.hub_order(f.container), expected);
    }

    #[test]
    fn test_replace_hands_shared_link_to_old() {
        let mut f = Fixture::new();
        let root = f.wrapper();
        let outer = f.child(root, list());
        let first = f.child(outer, VNodeKind::Null);
        let shared = f.arena[first].links[0];

        let fresh = f.arena.insert(VNode::new(VNodeKind::Null, Some(outer)));
        f.ledger.replace(&mut f.arena, fresh, first);
        f.arena.replace_child(outer, first, fresh);
        let before = f.ledger.len();

        f.ledger.release(&[shared], first);
        assert_eq!(f.ledger.len(), before - 1, "replaced slot is freed with the old node");
        assert_eq!(f.arena[outer].links, f.arena[fresh].links);
    }

    #[test]
    fn test_adopt_moves_subtree_links() {
        let mut f = Fixture::new();
        let mut doc = Document::new();
        let root = f.wrapper();
        let outer = f.child(root, list());
        let old_holder = f.child(outer, list());
        let kept = f.child(old_holder, VNodeKind::Text("kept".into()));
        let tail = f.child(outer, VNodeKind::Null);
        let node = doc.create_text("kept");
        f.ledger.materialize(&mut f.arena, kept, node);
        let kept_link = f.arena[kept].links[0];

        // New holder takes the old holder's slot, then adopts its child
        let holder = f.arena.insert(VNode::new(list(), Some(outer)));
        f.ledger.replace(&mut f.arena, holder, old_holder);
        f.arena.replace_child(outer, old_holder, holder);
        let adopted = f.ledger.adopt(&mut f.arena, holder, kept);

        assert_eq!(adopted, vec![kept_link]);
        assert_eq!(f.arena[kept].parent, Some(holder));
        assert_eq!(f.arena[holder].children, vec![kept]);
        assert_eq!(f.arena[holder].links, vec![kept_link]);
        let expected = vec![kept_link, f.arena[tail].links[0]];
        assert_eq!(f.ledger.hub_order(f.container), expected);
        assert_eq!(f.arena[outer].links, expected);
        assert_eq!(f.ledger.previous_node(f.arena[tail].links[0]), Some(node));
    }

    #[test]
    fn test_splice() {
        let ids: Vec<LinkId> = (0..5).map(LinkId).collect();
        let mut list = vec![ids[0], ids[1], ids[2]];
        splice(&mut list, &[ids[1]], &[ids[3], ids[4]]);
        assert_eq!(list, vec![ids[0], ids[3], ids[4], ids[2]]);
    }
}
