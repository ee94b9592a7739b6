//! Reconciler - `execute(new, old)` and keyed/positional child matching.
//!
//! `execute` drives a whole subtree depth first:
//! - matched pair: update in place, then pair up and execute the children
//! - old only: detach, dispose children post-order, detached
//! - new only: attach, build children pre-order, attached
//!
//! The old side is released once the new side has taken over. Releasing
//! frees the arena slot and the links the node owns; it never recurses,
//! because every old descendant is released by its own `execute`.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::trace;

use crate::error::{Result, VdomError};
use crate::types::Key;

use super::Vdom;
use super::arena::VNodeId;
use super::lifecycle::Flow;

/// Outcome of pairing new children with old ones.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Pairing {
    /// New children in order, with the old child they update.
    pub(crate) pairs: Vec<(VNodeId, Option<VNodeId>)>,
    /// Old children nobody claimed.
    pub(crate) unmatched: Vec<VNodeId>,
}

impl Vdom {
    pub(crate) fn execute(&mut self, new: Option<VNodeId>, old: Option<VNodeId>) -> Result<()> {
        let Some(new) = new else {
            return match old {
                Some(old) => self.dispose(old, false),
                None => Ok(()),
            };
        };

        let matched = old.filter(|old| self.matches(new, *old));
        match matched {
            Some(old) => self.reconcile(new, old),
            None => {
                self.ledger.register(&mut self.arena, new);
                if let Some(old) = old {
                    self.dispose(old, false)?;
                }
                self.build(new)
            }
        }
    }

    /// Attach `id` and its whole subtree.
    fn build(&mut self, id: VNodeId) -> Result<()> {
        trace!(kind = self.arena[id].kind.label(), "build");
        self.attach(id)?;
        for child in self.arena[id].children.clone() {
            self.execute(Some(child), None)?;
        }
        self.attached(id)
    }

    /// Tear `id` and its whole subtree down.
    fn dispose(&mut self, id: VNodeId, parent_removed: bool) -> Result<()> {
        trace!(kind = self.arena[id].kind.label(), "dispose");
        let removed = self.detach(id, parent_removed)?;
        self.ledger.unhook_all(&self.arena, id);
        for child in self.arena[id].children.clone() {
            self.dispose(child, removed)?;
        }
        self.detached(id)?;
        self.release(id);
        Ok(())
    }

    fn reconcile(&mut self, new: VNodeId, old: VNodeId) -> Result<()> {
        if self.arena[new].parent == self.arena[old].parent {
            self.ledger.replace(&mut self.arena, new, old);
        } else {
            self.ledger.register(&mut self.arena, new);
            self.ledger.unhook_all(&self.arena, old);
        }

        if self.update(new, old)? == Flow::Continue {
            let pairing = self.match_children(new, old)?;
            for stale in pairing.unmatched {
                self.dispose(stale, false)?;
            }
            for (child, previous) in pairing.pairs {
                self.execute(Some(child), previous)?;
            }
            self.updated(new, old)?;
        }
        self.release(old);
        Ok(())
    }

    fn release(&mut self, id: VNodeId) {
        if let Some(vnode) = self.arena.remove(id) {
            self.ledger.release(&vnode.links, id);
        }
    }

    /// Pair `new`'s children with `old`'s: by key when a child declares one,
    /// otherwise with the next unkeyed old child in order. A pairing only
    /// holds if the two match.
    pub(crate) fn match_children(&self, new: VNodeId, old: VNodeId) -> Result<Pairing> {
        let old_children = &self.arena[old].children;
        let mut keyed: HashMap<&Key, VNodeId> = HashMap::new();
        let mut queue: VecDeque<VNodeId> = VecDeque::new();
        for child in old_children {
            match self.arena[*child].kind.key() {
                Some(key) => {
                    keyed.entry(key).or_insert(*child);
                }
                None => queue.push_back(*child),
            }
        }

        let mut seen: HashSet<&Key> = HashSet::new();
        let mut claimed: HashSet<VNodeId> = HashSet::new();
        let mut pairs = Vec::new();
        for child in &self.arena[new].children {
            let candidate = match self.arena[*child].kind.key() {
                Some(key) => {
                    if !seen.insert(key) {
                        return Err(VdomError::DuplicateKey { key: key.clone() });
                    }
                    keyed.remove(key)
                }
                None => queue.pop_front(),
            };
            let paired = candidate.filter(|c| self.matches(*child, *c));
            if let Some(paired) = paired {
                claimed.insert(paired);
            }
            pairs.push((*child, paired));
        }

        let unmatched = old_children
            .iter()
            .copied()
            .filter(|c| !claimed.contains(c))
            .collect();
        Ok(Pairing { pairs, unmatched })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::engine::arena::{VNode, VNodeKind};
    use crate::primitives::{ListSpec, element, text};

    fn vdom() -> Vdom {
        Vdom::new(Document::new())
    }

    fn parent_with(vdom: &mut Vdom, specs: Vec<crate::primitives::Spec>) -> VNodeId {
        let parent = vdom
            .arena
            .insert(VNode::new(VNodeKind::List(ListSpec::default()), None));
        vdom.create_children(parent, specs).unwrap();
        parent
    }

    #[test]
    fn test_pairs_by_key_then_position() {
        let mut vdom = vdom();
        let old = parent_with(
            &mut vdom,
            vec![
                element("li").key(1).into(),
                element("li").key(2).into(),
                text("tail"),
            ],
        );
        let new = parent_with(
            &mut vdom,
            vec![
                element("li").key(2).into(),
                text("tail"),
                element("li").key(3).into(),
            ],
        );

        let pairing = vdom.match_children(new, old).unwrap();
        let old_children = vdom.arena[old].children.clone();
        let new_children = vdom.arena[new].children.clone();

        assert_eq!(pairing.pairs[0], (new_children[0], Some(old_children[1])), "key 2 pairs");
        assert_eq!(pairing.pairs[1], (new_children[1], Some(old_children[2])), "unkeyed by position");
        assert_eq!(pairing.pairs[2], (new_children[2], None), "new key is fresh");
        assert_eq!(pairing.unmatched, vec![old_children[0]]);
    }

    #[test]
    fn test_mismatching_candidate_is_not_paired() {
        let mut vdom = vdom();
        let old = parent_with(&mut vdom, vec![element("p").into()]);
        let new = parent_with(&mut vdom, vec![element("div").into()]);

        let pairing = vdom.match_children(new, old).unwrap();
        assert_eq!(pairing.pairs[0].1, None);
        assert_eq!(pairing.unmatched, vdom.arena[old].children.clone());
    }

    #[test]
    fn test_duplicate_new_key_fails() {
        let mut vdom = vdom();
        let old = parent_with(&mut vdom, vec![]);
        let new = parent_with(
            &mut vdom,
            vec![element("li").key("x").into(), element("li").key("x").into()],
        );
        assert_eq!(
            vdom.match_children(new, old),
            Err(VdomError::DuplicateKey { key: Key::from("x") })
        );
    }
}
