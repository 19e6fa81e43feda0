// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Event queue of the sweep.
//
// Two phases:
//   - Before `init`, inserts are appended to an array that `init` sorts once.
//     Handles into this array are negative.
//   - After `init`, inserts go to a binary min-heap with non-negative handles.
// The minimum is whichever of the two fronts sorts first. Both phases support
// deletion by handle.
//
// Keys are the (s, t) position of a vertex captured at insertion; the sweep
// never moves a vertex while it is queued.

use crate::geom::{vert_leq, Coord};
use crate::mesh::VertIdx;

/// Handle of a vertex that was never queued.
pub const NOT_QUEUED: i32 = i32::MAX;

#[derive(Clone, Copy, Debug)]
struct Entry {
    key: Coord,
    vert: VertIdx,
}

#[derive(Default)]
struct Heap {
    /// nodes[1..=size] hold handles; nodes[0] is unused.
    nodes: Vec<usize>,
    /// handle -> (entry, position in `nodes`)
    slots: Vec<(Option<Entry>, usize)>,
    free: Vec<usize>,
    size: usize,
}

impl Heap {
    fn new() -> Self {
        Heap {
            nodes: vec![0],
            ..Heap::default()
        }
    }

    fn key(&self, node: usize) -> Coord {
        match self.slots[self.nodes[node]].0 {
            Some(e) => e.key,
            None => Coord::default(),
        }
    }

    fn place(&mut self, pos: usize, handle: usize) {
        self.nodes[pos] = handle;
        self.slots[handle].1 = pos;
    }

    fn float_down(&mut self, mut curr: usize) {
        let h = self.nodes[curr];
        let key = self.key(curr);
        loop {
            let mut child = curr << 1;
            if child > self.size {
                break;
            }
            if child < self.size && vert_leq(self.key(child + 1), self.key(child)) {
                child += 1;
            }
            if vert_leq(key, self.key(child)) {
                break;
            }
            let hc = self.nodes[child];
            self.place(curr, hc);
            curr = child;
        }
        self.place(curr, h);
    }

    fn float_up(&mut self, mut curr: usize) {
        let h = self.nodes[curr];
        let key = self.key(curr);
        loop {
            let parent = curr >> 1;
            if parent == 0 || vert_leq(self.key(parent), key) {
                break;
            }
            let hp = self.nodes[parent];
            self.place(curr, hp);
            curr = parent;
        }
        self.place(curr, h);
    }

    fn insert(&mut self, entry: Entry) -> usize {
        self.size += 1;
        let handle = match self.free.pop() {
            Some(h) => {
                self.slots[h] = (Some(entry), self.size);
                h
            }
            None => {
                self.slots.push((Some(entry), self.size));
                self.slots.len() - 1
            }
        };
        if self.nodes.len() <= self.size {
            self.nodes.push(handle);
        } else {
            self.nodes[self.size] = handle;
        }
        self.float_up(self.size);
        handle
    }

    fn minimum(&self) -> Option<Entry> {
        if self.size == 0 {
            None
        } else {
            self.slots[self.nodes[1]].0
        }
    }

    fn delete(&mut self, handle: usize) {
        if self.slots.get(handle).map_or(true, |s| s.0.is_none()) {
            return;
        }
        let curr = self.slots[handle].1;
        let last = self.nodes[self.size];
        self.place(curr, last);
        self.size -= 1;
        if curr <= self.size {
            if curr <= 1 || vert_leq(self.key(curr >> 1), self.key(curr)) {
                self.float_down(curr);
            } else {
                self.float_up(curr);
            }
        }
        self.slots[handle].0 = None;
        self.free.push(handle);
    }

    fn extract_min(&mut self) -> Option<Entry> {
        let min = self.minimum()?;
        let handle = self.nodes[1];
        self.delete(handle);
        Some(min)
    }
}

pub struct PriorityQ {
    heap: Heap,
    sorted: Vec<Option<Entry>>,
    /// Indices into `sorted`, largest key first, so the minimum is at the end.
    order: Vec<usize>,
    initialized: bool,
}

impl PriorityQ {
    pub fn new() -> Self {
        PriorityQ {
            heap: Heap::new(),
            sorted: Vec::new(),
            order: Vec::new(),
            initialized: false,
        }
    }

    /// Returns a handle for later deletion.
    pub fn insert(&mut self, key: Coord, vert: VertIdx) -> i32 {
        let entry = Entry { key, vert };
        if self.initialized {
            return self.heap.insert(entry) as i32;
        }
        self.sorted.push(Some(entry));
        -(self.sorted.len() as i32)
    }

    /// Sorts everything inserted so far.
    pub fn init(&mut self) {
        let sorted = &self.sorted;
        let key = |i: usize| sorted[i].map(|e| e.key).unwrap_or_default();
        let mut order: Vec<usize> = (0..sorted.len()).collect();
        order.sort_by(|&a, &b| {
            let (ka, kb) = (key(a), key(b));
            if vert_leq(ka, kb) && vert_leq(kb, ka) {
                std::cmp::Ordering::Equal
            } else if vert_leq(ka, kb) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Less
            }
        });
        self.order = order;
        self.initialized = true;
    }

    fn sorted_min(&self) -> Option<Entry> {
        self.order.last().and_then(|&i| self.sorted[i])
    }

    fn trim_sorted(&mut self) {
        while let Some(&i) = self.order.last() {
            if self.sorted[i].is_some() {
                break;
            }
            self.order.pop();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty() && self.heap.size == 0
    }

    /// The vertex with the smallest key, without removing it.
    pub fn minimum(&self) -> Option<VertIdx> {
        match (self.sorted_min(), self.heap.minimum()) {
            (Some(s), Some(h)) => Some(if vert_leq(h.key, s.key) { h.vert } else { s.vert }),
            (Some(s), None) => Some(s.vert),
            (None, h) => h.map(|e| e.vert),
        }
    }

    pub fn extract_min(&mut self) -> Option<VertIdx> {
        let sorted = match self.sorted_min() {
            None => return self.heap.extract_min().map(|e| e.vert),
            Some(s) => s,
        };
        if let Some(h) = self.heap.minimum() {
            if vert_leq(h.key, sorted.key) {
                return self.heap.extract_min().map(|e| e.vert);
            }
        }
        if let Some(i) = self.order.pop() {
            self.sorted[i] = None;
        }
        self.trim_sorted();
        Some(sorted.vert)
    }

    /// Removes a queued vertex. Stale handles and [`NOT_QUEUED`] are ignored.
    pub fn delete(&mut self, handle: i32) {
        if handle == NOT_QUEUED {
            return;
        }
        if handle >= 0 {
            self.heap.delete(handle as usize);
            return;
        }
        let idx = (-(handle + 1)) as usize;
        if let Some(slot) = self.sorted.get_mut(idx) {
            *slot = None;
        }
        self.trim_sorted();
    }
}

impl Default for PriorityQ {
    fn default() -> Self {
        Self::new()
    }
}
