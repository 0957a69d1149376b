//! Doubly linked list backed by a [`SlotArena`].
//!
//! Nodes live in the arena and link to each other by [`SlotId`], so every
//! handle returned by a push stays valid until that node is removed, and
//! splicing a node to the front never moves or reallocates it.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬─────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                  │
//!   ├────────┼─────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, prev: None, next: Some(id_2) }  │
//!   │ id_2   │ { value: B, prev: Some(id_1), next: id_3 }  │
//!   │ id_3   │ { value: C, prev: Some(id_2), next: None }  │
//!   └────────┴─────────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//! ```
//!
//! ## Performance
//! - `push_front` / `push_back` / `pop_back`: O(1)
//! - `remove` / `move_to_front`: O(1)
//! - `iter` / `iter_rev`: O(n)
//!
//! Handles are generation-checked: passing a removed (or cleared) handle to
//! `remove`, `move_to_front`, `get` and friends is a miss, never a
//! corruption.
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Ordered sequence with O(1) push, removal and move-to-front by handle.
#[derive(Debug)]
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of nodes in the list.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of nodes the list can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Returns `true` if `id` is a live node of this list.
    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    /// Returns the value at the front.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    pub fn front_id(&self) -> Option<SlotId> {
        self.head
    }

    /// Returns the value at the back.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    /// Returns the handle of the node after `id` (towards the back).
    pub fn next_id(&self, id: SlotId) -> Option<SlotId> {
        self.arena.get(id).and_then(|node| node.next)
    }

    /// Returns the handle of the node before `id` (towards the front).
    pub fn prev_id(&self, id: SlotId) -> Option<SlotId> {
        self.arena.get(id).and_then(|node| node.prev)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Inserts a new node at the front and returns its handle.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: None,
            next: self.head,
        });
        match self.head.and_then(|head| self.arena.get_mut(head)) {
            Some(old_head) => old_head.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        id
    }

    /// Inserts a new node at the back and returns its handle.
    pub fn push_back(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: self.tail,
            next: None,
        });
        match self.tail.and_then(|tail| self.arena.get_mut(tail)) {
            Some(old_tail) => old_tail.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Removes and returns the back value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Unlinks node `id` and returns its value; `None` if `id` is not live.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.detach(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Splices node `id` to the front, keeping the order of all other nodes.
    ///
    /// Returns `false` if `id` is not live. Moving the current front is a
    /// no-op that returns `true`.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }
        self.detach(id);
        self.attach_front(id);
        true
    }

    /// Drops every node. All outstanding handles become dead.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterates values from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    /// Iterates values from back to front.
    pub fn iter_rev(&self) -> IterRev<'_, T> {
        IterRev {
            list: self,
            current: self.tail,
        }
    }

    /// Iterates handles from front to back.
    pub fn iter_ids(&self) -> IdIter<'_, T> {
        IdIter {
            list: self,
            current: self.head,
        }
    }

    /// Walks the links in both directions and checks them against `len`.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match (self.head, self.tail) {
            (None, None) => {
                if self.len() != 0 {
                    return Err(InvariantError::new(format!(
                        "list has no ends but len is {}",
                        self.len()
                    )));
                }
                return Ok(());
            },
            (Some(_), Some(_)) => {},
            _ => return Err(InvariantError::new("only one of head/tail is set")),
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new("forward walk reached a dead handle"))?;
            if node.prev != prev {
                return Err(InvariantError::new(format!(
                    "node {} has prev {:?}, expected {:?}",
                    id.index(),
                    node.prev.map(SlotId::index),
                    prev.map(SlotId::index)
                )));
            }
            count += 1;
            if count > self.len() {
                return Err(InvariantError::new("forward walk is longer than len (cycle?)"));
            }
            prev = Some(id);
            current = node.next;
        }
        if prev != self.tail {
            return Err(InvariantError::new("forward walk did not end at tail"));
        }
        if count != self.len() {
            return Err(InvariantError::new(format!(
                "forward walk visited {count} nodes, len is {}",
                self.len()
            )));
        }

        let backward = self.iter_rev().take(self.len() + 1).count();
        if backward != count {
            return Err(InvariantError::new(format!(
                "backward walk visited {backward} nodes, forward walk {count}"
            )));
        }
        Ok(())
    }

    fn step(&self, id: SlotId, forward: bool) -> Option<(&T, Option<SlotId>)> {
        let node = self.arena.get(id)?;
        let following = if forward { node.next } else { node.prev };
        Some((&node.value, following))
    }

    fn detach(&mut self, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(id)?;
            (node.prev, node.next)
        };

        match prev.and_then(|p| self.arena.get_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.arena.get_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }

        let node = self.arena.get_mut(id)?;
        node.prev = None;
        node.next = None;
        Some(())
    }

    fn attach_front(&mut self, id: SlotId) {
        let old_head = self.head;
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = None;
            node.next = old_head;
        } else {
            return;
        }
        match old_head.and_then(|h| self.arena.get_mut(h)) {
            Some(head_node) => head_node.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over values from front to back.
pub struct Iter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let (value, next) = self.list.step(self.current?, true)?;
        self.current = next;
        Some(value)
    }
}

/// Iterator over values from back to front.
pub struct IterRev<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for IterRev<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let (value, prev) = self.list.step(self.current?, false)?;
        self.current = prev;
        Some(value)
    }
}

/// Iterator over handles from front to back.
pub struct IdIter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for IdIter<'a, T> {
    type Item = SlotId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.list.next_id(id);
        Some(id)
    }
}

impl<'a, T> IntoIterator for &'a IntrusiveList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(list: &IntrusiveList<T>) -> Vec<T> {
        list.iter().copied().collect()
    }

    fn values_rev<T: Copy>(list: &IntrusiveList<T>) -> Vec<T> {
        list.iter_rev().copied().collect()
    }

    #[test]
    fn empty_list() {
        let list: IntrusiveList<i32> = IntrusiveList::new();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.front_id(), None);
        assert_eq!(list.back_id(), None);
        assert_eq!(list.capacity(), 0);
        list.check_invariants().unwrap();
    }

    #[test]
    fn with_capacity_reserves_nodes() {
        let mut list = IntrusiveList::with_capacity(16);
        assert!(list.capacity() >= 16);
        let reserved = list.capacity();
        for i in 0..16 {
            list.push_back(i);
        }
        assert_eq!(list.capacity(), reserved);
    }

    #[test]
    fn single_node_is_front_and_back() {
        let mut list = IntrusiveList::new();
        let id = list.push_front(1);
        assert_eq!(list.front_id(), Some(id));
        assert_eq!(list.back_id(), Some(id));
        assert_eq!(list.next_id(id), None);
        assert_eq!(list.prev_id(id), None);

        assert!(list.move_to_front(id));
        assert_eq!(values(&list), vec![1]);
        list.check_invariants().unwrap();

        assert_eq!(list.remove(id), Some(1));
        assert_eq!(list.front_id(), None);
        assert_eq!(list.back_id(), None);
        list.check_invariants().unwrap();
    }

    #[test]
    fn push_remove_and_alternate_pushes() {
        let mut list = IntrusiveList::new();
        list.push_front(10);
        list.push_back(20);
        list.push_back(30);
        assert_eq!(list.len(), 3);
        assert_eq!(values(&list), vec![10, 20, 30]);

        let middle = list.front_id().and_then(|id| list.next_id(id)).unwrap();
        assert_eq!(list.remove(middle), Some(20));
        assert_eq!(list.len(), 2);
        assert_eq!(values(&list), vec![10, 30]);

        for (i, v) in [40, 50, 60, 70, 80].into_iter().enumerate() {
            if i % 2 == 0 {
                list.push_front(v);
            } else {
                list.push_back(v);
            }
        }
        assert_eq!(list.len(), 7);
        assert_eq!(list.front(), Some(&80));
        assert_eq!(list.back(), Some(&70));
        assert_eq!(values(&list), vec![80, 60, 40, 10, 30, 50, 70]);

        let front = list.front_id().unwrap();
        list.move_to_front(front);
        let back = list.back_id().unwrap();
        list.move_to_front(back);
        assert_eq!(values(&list), vec![70, 80, 60, 40, 10, 30, 50]);
        list.check_invariants().unwrap();
    }

    #[test]
    fn remove_outer_nodes() {
        let mut list = IntrusiveList::new();
        let front = list.push_front(1);
        let back = list.push_back(2);
        assert_eq!(list.front_id(), Some(front));
        assert_eq!(list.back_id(), Some(back));

        list.remove(back);
        assert_eq!(list.len(), 1);
        assert_eq!(list.front_id(), list.back_id());

        list.push_back(2);
        list.remove(front);
        assert_eq!(list.len(), 1);
        assert_eq!(list.front_id(), list.back_id());
        assert_eq!(list.front(), Some(&2));

        let last = list.front_id().unwrap();
        list.remove(last);
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        list.check_invariants().unwrap();
    }

    #[test]
    fn move_to_front_keeps_relative_order() {
        let mut list = IntrusiveList::new();
        let a = list.push_back(1);
        list.push_back(2);
        let c = list.push_back(3);

        assert!(list.move_to_front(a));
        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(values_rev(&list), vec![3, 2, 1]);

        assert!(list.move_to_front(c));
        assert_eq!(values(&list), vec![3, 1, 2]);
        assert_eq!(values_rev(&list), vec![2, 1, 3]);

        let second = list.next_id(list.front_id().unwrap()).unwrap();
        assert!(list.move_to_front(second));
        assert_eq!(values(&list), vec![1, 3, 2]);
        assert_eq!(values_rev(&list), vec![2, 3, 1]);
        list.check_invariants().unwrap();
    }

    #[test]
    fn stale_handles_are_misses() {
        let mut list = IntrusiveList::new();
        let a = list.push_back("a");
        let b = list.push_back("b");
        assert_eq!(list.remove(a), Some("a"));

        // slot of `a` is reused by `c`
        let c = list.push_front("c");
        assert_eq!(c.index(), a.index());

        assert_eq!(list.remove(a), None);
        assert!(!list.move_to_front(a));
        assert_eq!(list.get(a), None);
        assert_eq!(values(&list), vec!["c", "b"]);

        list.clear();
        assert!(!list.move_to_front(b));
        assert_eq!(list.remove(c), None);
        list.check_invariants().unwrap();
    }

    #[test]
    fn pop_back_drains_in_reverse() {
        let mut list = IntrusiveList::new();
        list.push_back(1);
        list.push_back(2);
        list.push_back(3);
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn get_mut_updates_value_in_place() {
        let mut list = IntrusiveList::new();
        let id = list.push_back(10);
        if let Some(value) = list.get_mut(id) {
            *value = 20;
        }
        assert_eq!(list.get(id), Some(&20));
        assert_eq!(list.iter_ids().collect::<Vec<_>>(), vec![id]);
    }

    #[test]
    fn check_invariants_reports_broken_links() {
        let mut list = IntrusiveList::new();
        let a = list.push_back(1);
        list.push_back(2);
        if let Some(node) = list.arena.get_mut(a) {
            node.next = None;
        }
        assert!(list.check_invariants().is_err());
    }

    mod property {
        use std::collections::VecDeque;

        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            PushFront(u8),
            PushBack(u8),
            Remove(usize),
            MoveToFront(usize),
            PopBack,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                any::<u8>().prop_map(Op::PushFront),
                any::<u8>().prop_map(Op::PushBack),
                any::<usize>().prop_map(Op::Remove),
                any::<usize>().prop_map(Op::MoveToFront),
                Just(Op::PopBack),
            ]
        }

        proptest! {
            /// Property: the list matches a VecDeque of (handle, value) under any op sequence
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_matches_deque_model(ops in prop::collection::vec(op(), 0..200)) {
                let mut list = IntrusiveList::new();
                let mut model: VecDeque<(SlotId, u8)> = VecDeque::new();

                for op in ops {
                    match op {
                        Op::PushFront(v) => model.push_front((list.push_front(v), v)),
                        Op::PushBack(v) => model.push_back((list.push_back(v), v)),
                        Op::Remove(i) if !model.is_empty() => {
                            let (id, v) = model.remove(i % model.len()).unwrap();
                            prop_assert_eq!(list.remove(id), Some(v));
                            prop_assert_eq!(list.remove(id), None);
                        },
                        Op::MoveToFront(i) if !model.is_empty() => {
                            let entry = model.remove(i % model.len()).unwrap();
                            prop_assert!(list.move_to_front(entry.0));
                            model.push_front(entry);
                        },
                        Op::PopBack => {
                            prop_assert_eq!(list.pop_back(), model.pop_back().map(|(_, v)| v));
                        },
                        _ => {},
                    }

                    prop_assert_eq!(list.len(), model.len());
                    prop_assert!(list.check_invariants().is_ok());
                    let expected: Vec<u8> = model.iter().map(|(_, v)| *v).collect();
                    prop_assert_eq!(values(&list), expected);
                    let ids: Vec<SlotId> = model.iter().map(|(id, _)| *id).collect();
                    prop_assert_eq!(list.iter_ids().collect::<Vec<_>>(), ids);
                }
            }
        }
    }
}
