// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Ordered edge dictionary of the sweep.
//
// A circular doubly-linked list of active-region keys kept sorted by the
// sweep's edge order. The ordering depends on the current sweep event, so the
// comparison is supplied by the caller at every insertion or search instead
// of being stored in the dictionary.

use crate::mesh::INVALID;

pub type NodeIdx = u32;

/// The head sentinel; its key is `INVALID`.
pub const DICT_HEAD: NodeIdx = 0;

#[derive(Clone, Debug)]
struct DictNode {
    key: u32,
    next: NodeIdx,
    prev: NodeIdx,
}

pub struct Dict {
    nodes: Vec<DictNode>,
}

impl Dict {
    pub fn new() -> Self {
        Dict {
            nodes: vec![DictNode {
                key: INVALID,
                next: DICT_HEAD,
                prev: DICT_HEAD,
            }],
        }
    }

    /// Inserts `key` before `node`, walking towards the head while the
    /// predecessor sorts after `key`. `node_leq_key(k)` must answer
    /// "does existing key k sort at or before the new key".
    pub fn insert_before<F>(&mut self, mut node: NodeIdx, key: u32, node_leq_key: F) -> NodeIdx
    where
        F: Fn(u32) -> bool,
    {
        loop {
            node = self.nodes[node as usize].prev;
            let k = self.nodes[node as usize].key;
            if k == INVALID || node_leq_key(k) {
                break;
            }
        }
        let next = self.nodes[node as usize].next;
        let new_idx = self.nodes.len() as NodeIdx;
        self.nodes.push(DictNode { key, next, prev: node });
        self.nodes[node as usize].next = new_idx;
        self.nodes[next as usize].prev = new_idx;
        new_idx
    }

    /// Inserts `key` in sorted position counting from the end of the list.
    pub fn insert<F>(&mut self, key: u32, node_leq_key: F) -> NodeIdx
    where
        F: Fn(u32) -> bool,
    {
        self.insert_before(DICT_HEAD, key, node_leq_key)
    }

    pub fn delete(&mut self, node: NodeIdx) {
        let DictNode { next, prev, .. } = self.nodes[node as usize];
        self.nodes[next as usize].prev = prev;
        self.nodes[prev as usize].next = next;
        let n = &mut self.nodes[node as usize];
        n.key = INVALID;
        n.next = INVALID;
        n.prev = INVALID;
    }

    /// First node whose key sorts at or after the probe, or the head.
    /// `probe_leq_key(k)` answers "does the probe sort at or before k".
    pub fn search<F>(&self, probe_leq_key: F) -> NodeIdx
    where
        F: Fn(u32) -> bool,
    {
        let mut node = DICT_HEAD;
        loop {
            node = self.nodes[node as usize].next;
            let k = self.nodes[node as usize].key;
            if k == INVALID || probe_leq_key(k) {
                return node;
            }
        }
    }

    #[inline]
    pub fn key(&self, node: NodeIdx) -> u32 {
        self.nodes[node as usize].key
    }

    #[inline]
    pub fn min(&self) -> NodeIdx {
        self.nodes[DICT_HEAD as usize].next
    }

    #[inline]
    pub fn succ(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].next
    }

    #[inline]
    pub fn pred(&self, node: NodeIdx) -> NodeIdx {
        self.nodes[node as usize].prev
    }
}

impl Default for Dict {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(d: &Dict) -> Vec<u32> {
        let mut out = Vec::new();
        let mut n = d.min();
        while n != DICT_HEAD {
            out.push(d.key(n));
            n = d.succ(n);
        }
        out
    }

    #[test]
    fn empty_dict_points_to_head() {
        let d = Dict::new();
        assert_eq!(d.min(), DICT_HEAD);
        assert_eq!(d.key(DICT_HEAD), INVALID);
    }

    #[test]
    fn insertions_stay_sorted() {
        let mut d = Dict::new();
        for k in [3u32, 1, 2] {
            d.insert(k, |existing| existing <= k);
        }
        assert_eq!(keys(&d), vec![1, 2, 3]);
    }

    #[test]
    fn insert_before_walks_back_from_hint() {
        let mut d = Dict::new();
        d.insert(10, |e| e <= 10);
        let n30 = d.insert(30, |e| e <= 30);
        d.insert_before(n30, 20, |e| e <= 20);
        assert_eq!(keys(&d), vec![10, 20, 30]);
    }

    #[test]
    fn delete_unlinks_node() {
        let mut d = Dict::new();
        d.insert(1, |e| e <= 1);
        let n2 = d.insert(2, |e| e <= 2);
        d.insert(3, |e| e <= 3);
        d.delete(n2);
        assert_eq!(keys(&d), vec![1, 3]);
    }

    #[test]
    fn search_finds_first_key_at_or_after_probe() {
        let mut d = Dict::new();
        for k in [1u32, 3, 5] {
            d.insert(k, |e| e <= k);
        }
        assert_eq!(d.key(d.search(|k| 2 <= k)), 3);
        assert_eq!(d.key(d.search(|k| 3 <= k)), 3);
        assert_eq!(d.search(|k| 6 <= k), DICT_HEAD);
    }
}
