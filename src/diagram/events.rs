//! Circle-event priority queue
//!
//! Events are keyed by (ystar, breakpoint x); exact ties are processed in
//! LIFO order so re-armed events fire before older ones at the same point.
//! Cancelled events are not removed
//! eagerly: an entry is stale when its half-edge was deleted from the beach
//! line or re-armed with a different vertex, and such entries are skipped
//! when the queue is inspected.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::DVec2;

use crate::diagram::beach::Halfedge;

#[derive(Debug, Clone, Copy)]
struct CircleEvent {
    ystar: f64,
    x: f64,
    halfedge: usize,
    seq: u64,
}

impl PartialEq for CircleEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CircleEvent {}

impl PartialOrd for CircleEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CircleEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so the ordering is reversed: the
        // smallest (ystar, x) must compare greatest. Later insertions win
        // exact ties (LIFO).
        other
            .ystar
            .total_cmp(&self.ystar)
            .then(other.x.total_cmp(&self.x))
            .then(self.seq.cmp(&other.seq))
    }
}

/// Priority queue over pending circle events.
pub struct EventQueue {
    heap: BinaryHeap<CircleEvent>,
    seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Queue the circle event currently armed on `halfedge`.
    ///
    /// The caller must have set the half-edge's `vertex` and `ystar` first;
    /// those fields are what validates the entry at pop time.
    pub fn push(&mut self, halfedge: usize, ystar: f64, x: f64) {
        self.heap.push(CircleEvent {
            ystar,
            x,
            halfedge,
            seq: self.seq,
        });
        self.seq += 1;
    }

    fn is_current(ev: &CircleEvent, halfedges: &[Halfedge]) -> bool {
        let he = &halfedges[ev.halfedge];
        if he.deleted {
            return false;
        }
        match he.vertex {
            Some(v) => he.ystar == ev.ystar && v.x == ev.x,
            None => false,
        }
    }

    /// Key of the next live event, after discarding stale entries.
    ///
    /// Returns `(ystar, x)`, the point the sweep compares against the next
    /// site event.
    pub fn peek(&mut self, halfedges: &[Halfedge]) -> Option<(f64, f64)> {
        while let Some(ev) = self.heap.peek() {
            if Self::is_current(ev, halfedges) {
                return Some((ev.ystar, ev.x));
            }
            self.heap.pop();
        }
        None
    }

    /// Pop the next live event: the owning half-edge and its circumcenter.
    pub fn pop(&mut self, halfedges: &[Halfedge]) -> Option<(usize, DVec2)> {
        while let Some(ev) = self.heap.pop() {
            if Self::is_current(&ev, halfedges) {
                let he = &halfedges[ev.halfedge];
                if let Some(v) = he.vertex {
                    return Some((ev.halfedge, v));
                }
            }
        }
        None
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
