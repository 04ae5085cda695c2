//! The beach line of the sweep
//!
//! An arena of half-edges forming a doubly linked list between two sentinel
//! entries, plus an x-bucketed hash for fast left-neighbor lookup. Removed
//! half-edges stay in the arena with their `deleted` flag set; the hash is
//! cleaned lazily.

use glam::DVec2;

use crate::diagram::edge::{Edge, Lr};
use crate::diagram::site::SiteList;

/// One side of a diagram edge as it appears on the beach line.
#[derive(Debug, Clone)]
pub struct Halfedge {
    /// Owning diagram edge; `None` for the two sentinels.
    pub edge: Option<usize>,
    pub lr: Lr,
    /// Pending circle-event circumcenter, if this half-edge is armed.
    pub vertex: Option<DVec2>,
    /// Sweep coordinate at which the pending circle event fires.
    pub ystar: f64,
    prev: usize,
    next: usize,
    pub deleted: bool,
}

/// The ordered sequence of beach-line half-edges.
pub struct BeachLine {
    pub halfedges: Vec<Halfedge>,
    left_end: usize,
    right_end: usize,
    hash: Vec<Option<usize>>,
    xmin: f64,
    deltax: f64,
}

impl BeachLine {
    pub fn new(xmin: f64, deltax: f64, sqrt_nsites: usize) -> Self {
        let hash_size = 2 * sqrt_nsites.max(1);
        let mut beach = Self {
            halfedges: Vec::new(),
            left_end: 0,
            right_end: 0,
            hash: vec![None; hash_size],
            xmin,
            deltax,
        };
        beach.left_end = beach.create(None, Lr::Left);
        beach.right_end = beach.create(None, Lr::Left);
        let (l, r) = (beach.left_end, beach.right_end);
        beach.halfedges[l].next = r;
        beach.halfedges[r].prev = l;
        beach.hash[0] = Some(l);
        let last = beach.hash.len() - 1;
        beach.hash[last] = Some(r);
        beach
    }

    /// Allocate a new half-edge in the arena, not yet linked into the list.
    pub fn create(&mut self, edge: Option<usize>, lr: Lr) -> usize {
        let id = self.halfedges.len();
        self.halfedges.push(Halfedge {
            edge,
            lr,
            vertex: None,
            ystar: 0.0,
            prev: id,
            next: id,
            deleted: false,
        });
        id
    }

    #[inline]
    pub fn left_end(&self) -> usize {
        self.left_end
    }

    #[inline]
    pub fn left(&self, he: usize) -> usize {
        self.halfedges[he].prev
    }

    #[inline]
    pub fn right(&self, he: usize) -> usize {
        self.halfedges[he].next
    }

    pub fn insert_after(&mut self, lb: usize, he: usize) {
        let next = self.halfedges[lb].next;
        self.halfedges[he].prev = lb;
        self.halfedges[he].next = next;
        self.halfedges[next].prev = he;
        self.halfedges[lb].next = he;
    }

    /// Unlink a half-edge from the beach line and mark it dead.
    ///
    /// Stale hash entries and queued circle events referencing it are
    /// filtered out lazily.
    pub fn remove(&mut self, he: usize) {
        let prev = self.halfedges[he].prev;
        let next = self.halfedges[he].next;
        self.halfedges[prev].next = next;
        self.halfedges[next].prev = prev;
        self.halfedges[he].deleted = true;
        self.halfedges[he].vertex = None;
    }

    fn get_hash(&mut self, bucket: i64) -> Option<usize> {
        if bucket < 0 || bucket as usize >= self.hash.len() {
            return None;
        }
        match self.hash[bucket as usize] {
            Some(he) if self.halfedges[he].deleted => {
                // hash entry outlived the half-edge
                self.hash[bucket as usize] = None;
                None
            }
            entry => entry,
        }
    }

    /// Rightmost half-edge still left of `p`, found via the bucket hash and
    /// refined with the parabolic predicate.
    pub fn left_neighbor(&mut self, p: DVec2, edges: &[Edge], sites: &SiteList) -> usize {
        let hash_size = self.hash.len() as i64;
        let mut bucket = ((p.x - self.xmin) / self.deltax * hash_size as f64) as i64;
        bucket = bucket.clamp(0, hash_size - 1);

        let mut halfedge = self.get_hash(bucket);
        if halfedge.is_none() {
            // The sentinels live in the first and last buckets, so this scan
            // always terminates.
            let mut i = 1;
            loop {
                if let Some(he) = self.get_hash(bucket - i) {
                    halfedge = Some(he);
                    break;
                }
                if let Some(he) = self.get_hash(bucket + i) {
                    halfedge = Some(he);
                    break;
                }
                i += 1;
            }
        }
        let mut he = halfedge.unwrap_or(self.left_end);

        // Walk the linked list to the exact spot.
        if he == self.left_end || (he != self.right_end && self.is_left_of(he, p, edges, sites)) {
            loop {
                he = self.halfedges[he].next;
                if !(he != self.right_end && self.is_left_of(he, p, edges, sites)) {
                    break;
                }
            }
            he = self.halfedges[he].prev;
        } else {
            loop {
                he = self.halfedges[he].prev;
                if !(he != self.left_end && !self.is_left_of(he, p, edges, sites)) {
                    break;
                }
            }
        }

        if bucket > 0 && bucket < hash_size - 1 {
            self.hash[bucket as usize] = Some(he);
        }
        he
    }

    /// Whether `p` is to the left of the beach-line breakpoint traced by
    /// this half-edge.
    ///
    /// This is the classic Fortune predicate over the normalized bisector
    /// line, with sign-based fast paths; the slow path compares against the
    /// parabola through the edge's upper site.
    fn is_left_of(&self, he: usize, p: DVec2, edges: &[Edge], sites: &SiteList) -> bool {
        let halfedge = &self.halfedges[he];
        let edge = match halfedge.edge {
            Some(e) => &edges[e],
            None => return false,
        };
        let top_site = sites.coord(edge.right_site);
        let right_of_site = p.x > top_site.x;
        if right_of_site && halfedge.lr == Lr::Left {
            return true;
        }
        if !right_of_site && halfedge.lr == Lr::Right {
            return false;
        }

        let above;
        if edge.a == 1.0 {
            let dyp = p.y - top_site.y;
            let dxp = p.x - top_site.x;
            let mut fast = false;
            let mut above0;
            if (!right_of_site && edge.b < 0.0) || (right_of_site && edge.b >= 0.0) {
                above0 = dyp >= edge.b * dxp;
                fast = above0;
            } else {
                above0 = p.x + p.y * edge.b > edge.c;
                if edge.b < 0.0 {
                    above0 = !above0;
                }
                if !above0 {
                    fast = true;
                }
            }
            if !fast {
                let left_site = sites.coord(edge.left_site);
                let dxs = top_site.x - left_site.x;
                above0 = edge.b * (dxp * dxp - dyp * dyp)
                    < dxs * dyp * (1.0 + 2.0 * dxp / dxs + edge.b * edge.b);
                if edge.b < 0.0 {
                    above0 = !above0;
                }
            }
            above = above0;
        } else {
            // edge.b == 1.0
            let yl = edge.c - edge.a * p.x;
            let t1 = p.y - yl;
            let t2 = p.x - top_site.x;
            let t3 = yl - top_site.y;
            above = t1 * t1 > t2 * t2 + t3 * t3;
        }

        if halfedge.lr == Lr::Left {
            above
        } else {
            !above
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove_keep_links_consistent() {
        let mut beach = BeachLine::new(0.0, 100.0, 4);
        let le = beach.left_end();
        let a = beach.create(None, Lr::Left);
        let b = beach.create(None, Lr::Right);
        beach.insert_after(le, a);
        beach.insert_after(a, b);
        assert_eq!(beach.right(le), a);
        assert_eq!(beach.right(a), b);
        assert_eq!(beach.left(b), a);

        beach.remove(a);
        assert_eq!(beach.right(le), b);
        assert_eq!(beach.left(b), le);
        assert!(beach.halfedges[a].deleted);
    }
}
