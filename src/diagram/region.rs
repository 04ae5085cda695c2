//! Region polygon assembly
//!
//! Once a site's edges are chained and clipped, the region polygon is built
//! by walking the chain and stitching consecutive clipped endpoints together.
//! Endpoints landing on different sides of the plot rectangle get one or two
//! rectangle corners inserted between them so border regions close properly.

use glam::DVec2;

use crate::diagram::edge::{Edge, Lr};
use crate::geom::{points_coincide, winding, Rect, Winding};

/// Coincidence tolerance when joining clipped endpoints.
const EPSILON: f64 = 0.005;

mod bounds_check {
    use super::{DVec2, Rect};

    pub const TOP: u8 = 1;
    pub const BOTTOM: u8 = 2;
    pub const LEFT: u8 = 4;
    pub const RIGHT: u8 = 8;

    /// Bitmask of the rectangle sides `point` lies exactly on.
    pub fn check(point: DVec2, bounds: &Rect) -> u8 {
        let mut value = 0;
        if point.x == bounds.left() {
            value |= LEFT;
        }
        if point.x == bounds.right() {
            value |= RIGHT;
        }
        if point.y == bounds.top() {
            value |= TOP;
        }
        if point.y == bounds.bottom() {
            value |= BOTTOM;
        }
        value
    }
}

/// Build the clipped region polygon for a chained edge set.
///
/// `edge_ids` and `orientations` come from `reorder_edges`; invisible edges
/// (clipped away entirely) are skipped. The polygon is returned in
/// counterclockwise winding. Returns an empty polygon when no edge survived
/// clipping.
pub fn build_region(
    edge_ids: &[usize],
    orientations: &[Lr],
    edges: &[Edge],
    bounds: &Rect,
) -> Vec<DVec2> {
    let n = edge_ids.len();
    let mut i = 0;
    while i < n && !edges[edge_ids[i]].visible() {
        i += 1;
    }
    if i == n {
        return Vec::new();
    }

    let mut points: Vec<DVec2> = Vec::new();
    let edge = &edges[edge_ids[i]];
    let orientation = orientations[i];
    // clipped_end is Some for every visible edge
    if let (Some(a), Some(b)) = (
        edge.clipped_end(orientation),
        edge.clipped_end(orientation.other()),
    ) {
        points.push(a);
        points.push(b);
    }

    for j in (i + 1)..n {
        if !edges[edge_ids[j]].visible() {
            continue;
        }
        connect(&mut points, j, edge_ids, orientations, edges, bounds, false);
    }
    // Close the polygon back to the first edge, inserting rectangle corners
    // if the loop crosses them.
    connect(&mut points, i, edge_ids, orientations, edges, bounds, true);

    if winding(&points) == Winding::Clockwise {
        points.reverse();
    }
    points
}

#[allow(clippy::too_many_arguments)]
fn connect(
    points: &mut Vec<DVec2>,
    j: usize,
    edge_ids: &[usize],
    orientations: &[Lr],
    edges: &[Edge],
    bounds: &Rect,
    closing_up: bool,
) {
    let right_point = match points.last() {
        Some(p) => *p,
        None => return,
    };
    let new_edge = &edges[edge_ids[j]];
    let new_orientation = orientations[j];
    let new_point = match new_edge.clipped_end(new_orientation) {
        Some(p) => p,
        None => return,
    };

    if !points_coincide(right_point, new_point, EPSILON) {
        // The endpoints were clipped at the bounds. If they sit on different
        // sides, hook them up through the rectangle corner(s) between them.
        if right_point.x != new_point.x && right_point.y != new_point.y {
            let right_check = bounds_check::check(right_point, bounds);
            let new_check = bounds_check::check(new_point, bounds);
            if right_check & bounds_check::RIGHT != 0 {
                let px = bounds.right();
                if new_check & bounds_check::BOTTOM != 0 {
                    points.push(DVec2::new(px, bounds.bottom()));
                } else if new_check & bounds_check::TOP != 0 {
                    points.push(DVec2::new(px, bounds.top()));
                } else if new_check & bounds_check::LEFT != 0 {
                    let py = if right_point.y - bounds.y + new_point.y - bounds.y < bounds.height
                    {
                        bounds.top()
                    } else {
                        bounds.bottom()
                    };
                    points.push(DVec2::new(px, py));
                    points.push(DVec2::new(bounds.left(), py));
                }
            } else if right_check & bounds_check::LEFT != 0 {
                let px = bounds.left();
                if new_check & bounds_check::BOTTOM != 0 {
                    points.push(DVec2::new(px, bounds.bottom()));
                } else if new_check & bounds_check::TOP != 0 {
                    points.push(DVec2::new(px, bounds.top()));
                } else if new_check & bounds_check::RIGHT != 0 {
                    let py = if right_point.y - bounds.y + new_point.y - bounds.y < bounds.height
                    {
                        bounds.top()
                    } else {
                        bounds.bottom()
                    };
                    points.push(DVec2::new(px, py));
                    points.push(DVec2::new(bounds.right(), py));
                }
            } else if right_check & bounds_check::TOP != 0 {
                let py = bounds.top();
                if new_check & bounds_check::RIGHT != 0 {
                    points.push(DVec2::new(bounds.right(), py));
                } else if new_check & bounds_check::LEFT != 0 {
                    points.push(DVec2::new(bounds.left(), py));
                } else if new_check & bounds_check::BOTTOM != 0 {
                    let px = if right_point.x - bounds.x + new_point.x - bounds.x < bounds.width {
                        bounds.left()
                    } else {
                        bounds.right()
                    };
                    points.push(DVec2::new(px, py));
                    points.push(DVec2::new(px, bounds.bottom()));
                }
            } else if right_check & bounds_check::BOTTOM != 0 {
                let py = bounds.bottom();
                if new_check & bounds_check::RIGHT != 0 {
                    points.push(DVec2::new(bounds.right(), py));
                } else if new_check & bounds_check::LEFT != 0 {
                    points.push(DVec2::new(bounds.left(), py));
                } else if new_check & bounds_check::TOP != 0 {
                    let px = if right_point.x - bounds.x + new_point.x - bounds.x < bounds.width {
                        bounds.left()
                    } else {
                        bounds.right()
                    };
                    points.push(DVec2::new(px, py));
                    points.push(DVec2::new(px, bounds.top()));
                }
            }
        }
        if closing_up {
            // The first edge's endpoints are already in the polygon.
            return;
        }
        points.push(new_point);
    }

    if let Some(new_right_point) = new_edge.clipped_end(new_orientation.other()) {
        if !points.is_empty() && !points_coincide(points[0], new_right_point, EPSILON) {
            points.push(new_right_point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_check_sides() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(
            bounds_check::check(DVec2::new(0.0, 0.0), &bounds),
            bounds_check::LEFT | bounds_check::TOP
        );
        assert_eq!(
            bounds_check::check(DVec2::new(100.0, 40.0), &bounds),
            bounds_check::RIGHT
        );
        assert_eq!(
            bounds_check::check(DVec2::new(50.0, 100.0), &bounds),
            bounds_check::BOTTOM
        );
        assert_eq!(bounds_check::check(DVec2::new(50.0, 50.0), &bounds), 0);
    }
}
