//! Doubly linked chains threaded through one slot vector.
//!
//! A [`ChainArena`] owns the nodes; a [`Chain`] is just a `head`/`tail`/`len`
//! triple naming one sequence of them. Any number of chains can share one
//! arena, which is what lets the LFU policy keep one recency chain per
//! frequency bucket without a separate allocation per bucket.
//!
//! ## Architecture
//!
//! ```text
//!   links: Vec<Option<Link<T>>>                       vacant: [3]
//!   ┌────────┬──────────────────────────────────────────────┐
//!   │ SlotId │ Link { value, prev, next }                   │
//!   ├────────┼──────────────────────────────────────────────┤
//!   │ 0      │ { value: A, prev: None,       next: 2 }      │  chain X
//!   │ 1      │ { value: B, prev: None,       next: None }   │  chain Y
//!   │ 2      │ { value: C, prev: Some(0),    next: None }   │  chain X
//!   │ 3      │ None (freed, reused by the next push)        │
//!   └────────┴──────────────────────────────────────────────┘
//!
//!   chain X: head ─► [0] ◄──► [2] ◄── tail
//!   chain Y: head ─► [1] ◄── tail
//! ```
//!
//! Front is the most-recently-used end, back the least-recently-used end.
//! Freed slots are reused before the vector grows, so a cache churning at
//! capacity stays at its peak node count.
//!
//! A node is linked into at most one chain at a time and callers must pass
//! the chain it is actually in; the arena cannot check membership.
//!
//! ## Performance
//! - `push_front` / `remove` / `pop_back` / `transfer_front`: O(1)
//! - `move_to_front`: O(1)
//! - `iter`: O(chain length)

/// Handle to one node of a [`ChainArena`].
///
/// Valid until the node is removed; the slot may then back a later node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct Link<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Head, tail and length of one sequence inside a [`ChainArena`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most-recently-used node.
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Least-recently-used node.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }
}

/// Node storage shared by any number of [`Chain`]s.
#[derive(Debug)]
pub struct ChainArena<T> {
    links: Vec<Option<Link<T>>>,
    vacant: Vec<usize>,
    live: usize,
}

impl<T> ChainArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Reserves room for `capacity` nodes up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
            vacant: Vec::new(),
            live: 0,
        }
    }

    /// Number of nodes across all chains.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.link(id).is_some()
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.link(id).map(|link| &link.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.link_mut(id).map(|link| &mut link.value)
    }

    /// Stores `value` and links it at the front of `chain`.
    pub fn push_front(&mut self, chain: &mut Chain, value: T) -> SlotId {
        let link = Link {
            value,
            prev: None,
            next: None,
        };
        let id = match self.vacant.pop() {
            Some(idx) => {
                self.links[idx] = Some(link);
                SlotId(idx)
            },
            None => {
                self.links.push(Some(link));
                SlotId(self.links.len() - 1)
            },
        };
        self.live += 1;
        self.attach_front(chain, id);
        id
    }

    /// Unlinks `id` from `chain` and frees its slot.
    pub fn remove(&mut self, chain: &mut Chain, id: SlotId) -> Option<T> {
        self.unlink(chain, id)?;
        let link = self.links.get_mut(id.0)?.take()?;
        self.vacant.push(id.0);
        self.live -= 1;
        Some(link.value)
    }

    /// Unlinks and frees the back (LRU) node of `chain`.
    pub fn pop_back(&mut self, chain: &mut Chain) -> Option<T> {
        let id = chain.tail?;
        self.remove(chain, id)
    }

    /// Moves `id` to the front of the chain it already belongs to.
    pub fn move_to_front(&mut self, chain: &mut Chain, id: SlotId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if chain.head == Some(id) {
            return true;
        }
        self.unlink(chain, id);
        self.attach_front(chain, id);
        true
    }

    /// Moves `id` out of `from` and onto the front of `to`.
    pub fn transfer_front(&mut self, from: &mut Chain, to: &mut Chain, id: SlotId) -> bool {
        if self.unlink(from, id).is_none() {
            return false;
        }
        self.attach_front(to, id);
        true
    }

    /// Iterates `chain` front to back.
    pub fn iter<'a>(&'a self, chain: &Chain) -> ChainIter<'a, T> {
        ChainIter {
            arena: self,
            current: chain.head,
            remaining: chain.len,
        }
    }

    /// Frees every node. Every `Chain` built on this arena must be reset too.
    pub fn clear(&mut self) {
        self.links.clear();
        self.vacant.clear();
        self.live = 0;
    }

    /// Walks `chain` and checks link symmetry, tail and length.
    pub fn validate_chain(&self, chain: &Chain) -> Result<(), String> {
        let mut prev = None;
        let mut current = chain.head;
        let mut count = 0usize;

        while let Some(id) = current {
            let link = self
                .link(id)
                .ok_or_else(|| format!("chain references freed slot {}", id.index()))?;
            if link.prev != prev {
                return Err(format!("slot {} has a stale prev link", id.index()));
            }
            count += 1;
            if count > chain.len {
                return Err(format!("chain is longer than its recorded len {}", chain.len));
            }
            prev = Some(id);
            current = link.next;
        }

        if chain.tail != prev {
            return Err("chain tail does not match the last node".to_string());
        }
        if count != chain.len {
            return Err(format!("chain len {} but walked {count} nodes", chain.len));
        }
        Ok(())
    }

    fn link(&self, id: SlotId) -> Option<&Link<T>> {
        self.links.get(id.0).and_then(Option::as_ref)
    }

    fn link_mut(&mut self, id: SlotId) -> Option<&mut Link<T>> {
        self.links.get_mut(id.0).and_then(Option::as_mut)
    }

    fn attach_front(&mut self, chain: &mut Chain, id: SlotId) {
        let old_head = chain.head;
        if let Some(link) = self.link_mut(id) {
            link.prev = None;
            link.next = old_head;
        } else {
            return;
        }
        match old_head.and_then(|head| self.link_mut(head)) {
            Some(head) => head.prev = Some(id),
            None => chain.tail = Some(id),
        }
        chain.head = Some(id);
        chain.len += 1;
    }

    fn unlink(&mut self, chain: &mut Chain, id: SlotId) -> Option<()> {
        let (prev, next) = {
            let link = self.link(id)?;
            (link.prev, link.next)
        };

        match prev.and_then(|p| self.link_mut(p)) {
            Some(prev_link) => prev_link.next = next,
            None => chain.head = next,
        }
        match next.and_then(|n| self.link_mut(n)) {
            Some(next_link) => next_link.prev = prev,
            None => chain.tail = prev,
        }

        if let Some(link) = self.link_mut(id) {
            link.prev = None;
            link.next = None;
        }
        chain.len -= 1;
        Some(())
    }
}

impl<T> Default for ChainArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back iterator over one chain, yielding `(SlotId, &T)`.
pub struct ChainIter<'a, T> {
    arena: &'a ChainArena<T>,
    current: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iterator for ChainIter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let arena = self.arena;
        let id = self.current?;
        let link = arena.link(id)?;
        self.current = link.next;
        self.remaining -= 1;
        Some((id, &link.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(arena: &ChainArena<T>, chain: &Chain) -> Vec<T> {
        arena.iter(chain).map(|(_, v)| *v).collect()
    }

    #[test]
    fn push_front_orders_mru_first() {
        let mut arena = ChainArena::new();
        let mut chain = Chain::new();
        arena.push_front(&mut chain, 1);
        arena.push_front(&mut chain, 2);
        arena.push_front(&mut chain, 3);

        assert_eq!(values(&arena, &chain), vec![3, 2, 1]);
        assert_eq!(chain.len(), 3);
        arena.validate_chain(&chain).unwrap();
    }

    #[test]
    fn move_to_front_from_middle_and_back() {
        let mut arena = ChainArena::new();
        let mut chain = Chain::new();
        let a = arena.push_front(&mut chain, "a");
        let b = arena.push_front(&mut chain, "b");
        let _c = arena.push_front(&mut chain, "c");

        assert!(arena.move_to_front(&mut chain, b));
        assert_eq!(values(&arena, &chain), vec!["b", "c", "a"]);

        assert!(arena.move_to_front(&mut chain, a));
        assert_eq!(values(&arena, &chain), vec!["a", "b", "c"]);
        arena.validate_chain(&chain).unwrap();
    }

    #[test]
    fn pop_back_returns_lru_and_frees_slot() {
        let mut arena = ChainArena::new();
        let mut chain = Chain::new();
        let first = arena.push_front(&mut chain, 10);
        arena.push_front(&mut chain, 20);

        assert_eq!(arena.pop_back(&mut chain), Some(10));
        assert!(!arena.contains(first));
        assert_eq!(arena.pop_back(&mut chain), Some(20));
        assert_eq!(arena.pop_back(&mut chain), None);
        assert!(chain.is_empty());
        assert_eq!(chain.front(), None);
        assert_eq!(chain.back(), None);
    }

    #[test]
    fn chains_share_one_arena() {
        let mut arena = ChainArena::new();
        let mut low = Chain::new();
        let mut high = Chain::new();
        let a = arena.push_front(&mut low, 'a');
        arena.push_front(&mut low, 'b');
        arena.push_front(&mut high, 'x');

        assert!(arena.transfer_front(&mut low, &mut high, a));
        assert_eq!(values(&arena, &low), vec!['b']);
        assert_eq!(values(&arena, &high), vec!['a', 'x']);
        assert_eq!(arena.len(), 3);
        arena.validate_chain(&low).unwrap();
        arena.validate_chain(&high).unwrap();
    }

    #[test]
    fn remove_middle_node_relinks_neighbours() {
        let mut arena = ChainArena::new();
        let mut chain = Chain::new();
        arena.push_front(&mut chain, 1);
        let mid = arena.push_front(&mut chain, 2);
        arena.push_front(&mut chain, 3);

        assert_eq!(arena.remove(&mut chain, mid), Some(2));
        assert_eq!(values(&arena, &chain), vec![3, 1]);
        assert_eq!(arena.remove(&mut chain, mid), None);
        arena.validate_chain(&chain).unwrap();
    }

    #[test]
    fn freed_slots_back_later_nodes() {
        let mut arena = ChainArena::with_capacity(2);
        let mut chain = Chain::new();
        let a = arena.push_front(&mut chain, "a");
        let b = arena.push_front(&mut chain, "b");

        assert_eq!(arena.remove(&mut chain, a), Some("a"));
        assert!(!arena.contains(a));
        assert_eq!(arena.len(), 1);

        let c = arena.push_front(&mut chain, "c");
        assert_eq!(c.index(), a.index());
        assert_eq!(arena.get(c), Some(&"c"));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(values(&arena, &chain), vec!["c", "b"]);
        arena.validate_chain(&chain).unwrap();
    }

    #[test]
    fn unknown_ids_are_absent() {
        let mut arena: ChainArena<u8> = ChainArena::new();
        let mut chain = Chain::new();
        assert_eq!(arena.get(SlotId(10)), None);
        assert_eq!(arena.get_mut(SlotId(10)), None);
        assert_eq!(arena.remove(&mut chain, SlotId(10)), None);
        assert!(!arena.move_to_front(&mut chain, SlotId(10)));
        assert!(chain.is_empty());
    }

    #[test]
    fn clear_frees_every_node() {
        let mut arena = ChainArena::new();
        let mut chain = Chain::new();
        let id = arena.push_front(&mut chain, 1);
        arena.push_front(&mut chain, 2);

        arena.clear();
        assert!(arena.is_empty());
        assert!(!arena.contains(id));

        let mut fresh = Chain::new();
        let reused = arena.push_front(&mut fresh, 3);
        assert_eq!(reused.index(), 0);
    }

    #[test]
    fn validate_detects_wrong_len() {
        let mut arena = ChainArena::new();
        let mut chain = Chain::new();
        arena.push_front(&mut chain, 1);
        let mut forged = chain;
        forged.len = 2;
        assert!(arena.validate_chain(&forged).is_err());
    }
}
