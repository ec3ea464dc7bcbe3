//! Flat scene-graph group
//!
//! Children live in a `Vec` and keep their slot for as long as they belong to
//! the group. Whether a child takes part in gameplay is tracked separately in
//! a bitset, so killed children stay allocated for reuse and are simply
//! skipped by `for_each_alive`.

use serde::{Deserialize, Serialize};

/// Handle to a child of a [`Group`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Growable bitset of live slots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LiveSet {
    words: Vec<u64>,
}

impl LiveSet {
    fn set(&mut self, index: usize, alive: bool) {
        let (word, bit) = (index / 64, index % 64);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        if alive {
            self.words[word] |= 1u64 << bit;
        } else {
            self.words[word] &= !(1u64 << bit);
        }
    }

    fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|w| w & (1u64 << (index % 64)) != 0)
    }

    fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn clear(&mut self) {
        self.words.clear();
    }
}

/// Owning container of entities with an alive flag per child
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group<T> {
    children: Vec<T>,
    live: LiveSet,
}

impl<T> Default for Group<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Group<T> {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            live: LiveSet::default(),
        }
    }

    /// Take ownership of `child`. New children start alive.
    pub fn add(&mut self, child: T) -> NodeId {
        let id = NodeId(self.children.len() as u32);
        self.children.push(child);
        self.live.set(id.index(), true);
        id
    }

    /// Detach every child, alive or not, handing them back to the caller
    pub fn remove_all(&mut self) -> Vec<T> {
        self.live.clear();
        std::mem::take(&mut self.children)
    }

    /// Visit alive children in insertion order
    pub fn for_each_alive(&mut self, mut visitor: impl FnMut(NodeId, &mut T)) {
        for (index, child) in self.children.iter_mut().enumerate() {
            if self.live.contains(index) {
                visitor(NodeId(index as u32), child);
            }
        }
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter(|(index, _)| self.live.contains(*index))
            .map(|(index, child)| (NodeId(index as u32), child))
    }

    /// Mark a child dead. Returns the id so it can go straight onto a free list.
    pub fn kill(&mut self, id: NodeId) -> NodeId {
        if id.index() < self.children.len() {
            self.live.set(id.index(), false);
        }
        id
    }

    /// Mark a child alive again, returning it for repositioning
    pub fn revive(&mut self, id: NodeId) -> Option<&mut T> {
        let child = self.children.get_mut(id.index())?;
        self.live.set(id.index(), true);
        Some(child)
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        id.index() < self.children.len() && self.live.contains(id.index())
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.children.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.children.get_mut(id.index())
    }

    /// Number of children, alive or dead
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.live.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_starts_alive() {
        let mut group = Group::new();
        let a = group.add("a");
        let b = group.add("b");
        assert_ne!(a, b);
        assert!(group.is_alive(a));
        assert!(group.is_alive(b));
        assert_eq!(group.len(), 2);
        assert_eq!(group.alive_count(), 2);
    }

    #[test]
    fn test_for_each_alive_skips_killed_children() {
        let mut group = Group::new();
        let ids: Vec<_> = (0..5).map(|n| group.add(n)).collect();
        let killed = group.kill(ids[1]);
        assert_eq!(killed, ids[1]);
        group.kill(ids[3]);

        let mut seen = Vec::new();
        group.for_each_alive(|_, n| seen.push(*n));
        assert_eq!(seen, vec![0, 2, 4]);

        // Killed children are still owned
        assert_eq!(group.len(), 5);
        assert_eq!(group.get(ids[1]), Some(&1));
    }

    #[test]
    fn test_revive_returns_same_child() {
        let mut group = Group::new();
        let id = group.add(10);
        group.kill(id);
        assert!(!group.is_alive(id));

        let child = group.revive(id).unwrap();
        *child += 1;
        assert!(group.is_alive(id));
        assert_eq!(group.get(id), Some(&11));
    }

    #[test]
    fn test_remove_all_detaches_dead_and_alive() {
        let mut group = Group::new();
        let a = group.add('a');
        group.add('b');
        group.kill(a);

        let removed = group.remove_all();
        assert_eq!(removed, vec!['a', 'b']);
        assert!(group.is_empty());
        assert_eq!(group.alive_count(), 0);
        assert!(!group.is_alive(a));
        assert_eq!(group.iter_alive().count(), 0);
    }

    #[test]
    fn test_live_set_spans_multiple_words() {
        let mut group = Group::new();
        let ids: Vec<_> = (0..130).map(|n| group.add(n)).collect();
        for id in ids.iter().filter(|id| id.index() % 2 == 0) {
            group.kill(*id);
        }
        assert_eq!(group.alive_count(), 65);
        assert!(group.is_alive(ids[129]));
        assert!(!group.is_alive(ids[128]));
        assert!(group.iter_alive().all(|(_, n)| n % 2 == 1));
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut group: Group<u8> = Group::new();
        let stray = NodeId(7);
        assert_eq!(group.kill(stray), stray);
        assert!(group.revive(stray).is_none());
        assert!(!group.is_alive(stray));
        assert_eq!(group.alive_count(), 0);
    }
}
