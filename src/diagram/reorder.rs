//! Edge chain reordering
//!
//! The sweep hands each site its edges in creation order. To walk a region
//! polygon, those edges have to be rearranged into a connected chain and each
//! edge tagged with the orientation in which the chain traverses it.

use std::collections::VecDeque;

use crate::diagram::edge::{Edge, Lr};

/// What "connected" means while chaining: sharing a circumcenter vertex
/// (region polygons) or sharing a site (Delaunay neighbor walks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    ByVertex,
    BySite,
}

/// End of `edge` that the chain enters through, under the given criterion.
///
/// With `ByVertex` an unterminated end is `None`, and two `None` ends count
/// as connected: the unbounded edges of a border region chain through their
/// missing endpoints.
fn chain_point(edge: &Edge, lr: Lr, criterion: Criterion) -> Option<usize> {
    match criterion {
        Criterion::ByVertex => edge.vertex(lr),
        Criterion::BySite => Some(edge.site(lr)),
    }
}

/// Rearrange `edge_ids` into a connected chain.
///
/// Returns the chained edge ids together with one orientation per edge: the
/// orientation tells which end of the edge is the chain's entry point. An
/// edge set that cannot be chained (disconnected pieces) yields empty
/// vectors and the region is treated as degenerate.
pub fn reorder_edges(
    edge_ids: &[usize],
    edges: &[Edge],
    criterion: Criterion,
) -> (Vec<usize>, Vec<Lr>) {
    let n = edge_ids.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut done = vec![false; n];
    let mut ordered: VecDeque<usize> = VecDeque::with_capacity(n);
    let mut orientations: VecDeque<Lr> = VecDeque::with_capacity(n);

    let first_edge = &edges[edge_ids[0]];
    let mut first_point = chain_point(first_edge, Lr::Left, criterion);
    let mut last_point = chain_point(first_edge, Lr::Right, criterion);
    ordered.push_back(edge_ids[0]);
    orientations.push_back(Lr::Left);
    done[0] = true;
    let mut remaining = n - 1;

    while remaining > 0 {
        let mut progressed = false;
        for i in 1..n {
            if done[i] {
                continue;
            }
            let edge = &edges[edge_ids[i]];
            let left_point = chain_point(edge, Lr::Left, criterion);
            let right_point = chain_point(edge, Lr::Right, criterion);
            if left_point == last_point {
                last_point = right_point;
                ordered.push_back(edge_ids[i]);
                orientations.push_back(Lr::Left);
            } else if right_point == first_point {
                first_point = left_point;
                ordered.push_front(edge_ids[i]);
                orientations.push_front(Lr::Left);
            } else if left_point == first_point {
                first_point = right_point;
                ordered.push_front(edge_ids[i]);
                orientations.push_front(Lr::Right);
            } else if right_point == last_point {
                last_point = left_point;
                ordered.push_back(edge_ids[i]);
                orientations.push_back(Lr::Right);
            } else {
                continue;
            }
            done[i] = true;
            progressed = true;
            remaining -= 1;
        }
        if !progressed {
            // disconnected edge set
            return (Vec::new(), Vec::new());
        }
    }

    (ordered.into_iter().collect(), orientations.into_iter().collect())
}
