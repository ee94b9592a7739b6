//! Identity-keyed doubly linked list.
//!
//! Items are their own handles: every operation takes the item value and
//! finds its neighbours through a map, so inserting before/after or removing
//! a known item is O(1). Used as the ordered ledger of links under one real
//! parent node.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Copy)]
struct Neighbours<T> {
    prev: Option<T>,
    next: Option<T>,
}

/// Doubly linked list of unique, copyable items.
#[derive(Debug, Clone)]
pub struct LinkedList<T: Copy + Eq + Hash> {
    head: Option<T>,
    tail: Option<T>,
    entries: HashMap<T, Neighbours<T>>,
}

impl<T: Copy + Eq + Hash> Default for LinkedList<T> {
    fn default() -> Self {
        Self {
            head: None,
            tail: None,
            entries: HashMap::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> LinkedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item: T) -> bool {
        self.entries.contains_key(&item)
    }

    pub fn first(&self) -> Option<T> {
        self.head
    }

    pub fn last(&self) -> Option<T> {
        self.tail
    }

    pub fn prev(&self, item: T) -> Option<T> {
        self.entries.get(&item).and_then(|n| n.prev)
    }

    pub fn next(&self, item: T) -> Option<T> {
        self.entries.get(&item).and_then(|n| n.next)
    }

    pub fn push_back(&mut self, item: T) {
        self.insert_before(item, None);
    }

    pub fn push_front(&mut self, item: T) {
        self.insert_after(item, None);
    }

    /// Insert `item` before `before`, or at the end when `before` is `None`
    /// or not in the list. An item already in the list is moved.
    pub fn insert_before(&mut self, item: T, before: Option<T>) {
        self.remove(item);
        let before = before.filter(|b| self.contains(*b));
        let prev = match before {
            Some(b) => self.prev(b),
            None => self.tail,
        };
        self.link(item, prev, before);
    }

    /// Insert `item` after `after`, or at the start when `after` is `None`
    /// or not in the list. An item already in the list is moved.
    pub fn insert_after(&mut self, item: T, after: Option<T>) {
        self.remove(item);
        let after = after.filter(|a| self.contains(*a));
        let next = match after {
            Some(a) => self.next(a),
            None => self.head,
        };
        self.link(item, after, next);
    }

    fn link(&mut self, item: T, prev: Option<T>, next: Option<T>) {
        match prev {
            Some(p) => {
                if let Some(n) = self.entries.get_mut(&p) {
                    n.next = Some(item);
                }
            }
            None => self.head = Some(item),
        }
        match next {
            Some(n) => {
                if let Some(entry) = self.entries.get_mut(&n) {
                    entry.prev = Some(item);
                }
            }
            None => self.tail = Some(item),
        }
        self.entries.insert(item, Neighbours { prev, next });
    }

    /// Remove `item`. Returns false if it was not in the list.
    pub fn remove(&mut self, item: T) -> bool {
        let Some(Neighbours { prev, next }) = self.entries.remove(&item) else {
            return false;
        };
        match prev {
            Some(p) => {
                if let Some(entry) = self.entries.get_mut(&p) {
                    entry.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(entry) = self.entries.get_mut(&n) {
                    entry.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        true
    }

    /// Iterate front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            forward: true,
        }
    }

    /// Iterate back to front, starting just before `item`.
    pub fn iter_before(&self, item: T) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.prev(item),
            forward: false,
        }
    }
}

/// Iterator over a [`LinkedList`].
pub struct Iter<'a, T: Copy + Eq + Hash> {
    list: &'a LinkedList<T>,
    cursor: Option<T>,
    forward: bool,
}

impl<T: Copy + Eq + Hash> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let current = self.cursor?;
        self.cursor = if self.forward {
            self.list.next(current)
        } else {
            self.list.prev(current)
        };
        Some(current)
    }
}
