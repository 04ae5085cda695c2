//! Diagram-level Voronoi edges
//!
//! Each edge is the perpendicular bisector of a Delaunay site pair, stored as
//! the line `a*x + b*y = c` together with its (possibly missing) endpoint
//! vertices and, after clipping, its bounded endpoint pair.

use glam::DVec2;

use crate::geom::Rect;

/// Orientation tag distinguishing the two ends/sides of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lr {
    Left,
    Right,
}

impl Lr {
    #[inline]
    pub fn other(self) -> Lr {
        match self {
            Lr::Left => Lr::Right,
            Lr::Right => Lr::Left,
        }
    }

    #[inline]
    fn idx(self) -> usize {
        match self {
            Lr::Left => 0,
            Lr::Right => 1,
        }
    }
}

/// A Voronoi edge: the bisector between two sites, dual to a Delaunay edge.
///
/// The left/right vertices are circumcenters produced by circle events; a
/// missing vertex means the edge is unbounded on that side (the "at
/// infinity" case). The line equation keeps enough direction information to
/// extend unbounded edges to the plot rectangle during clipping.
#[derive(Debug, Clone)]
pub struct Edge {
    pub index: usize,
    /// Line equation coefficients for `a*x + b*y = c`, normalized so that
    /// the dominant coefficient is 1.0.
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Site on the left of the bisector (a Delaunay endpoint).
    pub left_site: usize,
    /// Site on the right of the bisector.
    pub right_site: usize,
    pub left_vertex: Option<usize>,
    pub right_vertex: Option<usize>,
    /// Endpoints after clipping to the plot bounds, indexed `[left, right]`.
    /// `None` means the edge lies entirely outside the bounds.
    clipped: Option<[DVec2; 2]>,
}

impl Edge {
    /// Create the bisecting edge between two sites.
    ///
    /// The line is normalized by the dominant delta axis so that either
    /// `a == 1.0` or `b == 1.0`, which the beach-line predicate relies on.
    pub fn bisecting(index: usize, site0: usize, p0: DVec2, site1: usize, p1: DVec2) -> Edge {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let mut c = p0.x * dx + p0.y * dy + (dx * dx + dy * dy) * 0.5;
        let (a, b);
        if dx.abs() > dy.abs() {
            a = 1.0;
            b = dy / dx;
            c /= dx;
        } else {
            b = 1.0;
            a = dx / dy;
            c /= dy;
        }
        Edge {
            index,
            a,
            b,
            c,
            left_site: site0,
            right_site: site1,
            left_vertex: None,
            right_vertex: None,
            clipped: None,
        }
    }

    #[inline]
    pub fn site(&self, lr: Lr) -> usize {
        match lr {
            Lr::Left => self.left_site,
            Lr::Right => self.right_site,
        }
    }

    #[inline]
    pub fn vertex(&self, lr: Lr) -> Option<usize> {
        match lr {
            Lr::Left => self.left_vertex,
            Lr::Right => self.right_vertex,
        }
    }

    pub fn set_vertex(&mut self, lr: Lr, vertex: usize) {
        match lr {
            Lr::Left => self.left_vertex = Some(vertex),
            Lr::Right => self.right_vertex = Some(vertex),
        }
    }

    /// Whether any part of the edge survived clipping.
    #[inline]
    pub fn visible(&self) -> bool {
        self.clipped.is_some()
    }

    /// Clipped endpoint for the given orientation, if the edge is visible.
    #[inline]
    pub fn clipped_end(&self, lr: Lr) -> Option<DVec2> {
        self.clipped.map(|ends| ends[lr.idx()])
    }

    /// Clip the edge to `bounds`, extending unbounded ends along the line.
    ///
    /// On success the clipped endpoint pair is stored keyed by orientation;
    /// an edge entirely outside the bounds stays invisible.
    pub fn clip_to_bounds(&mut self, vertices: &[DVec2], bounds: &Rect) {
        let xmin = bounds.left();
        let ymin = bounds.top();
        let xmax = bounds.right();
        let ymax = bounds.bottom();

        let left = self.left_vertex.map(|v| vertices[v]);
        let right = self.right_vertex.map(|v| vertices[v]);

        // Orient the traversal so coordinate 0 grows toward coordinate 1.
        let (vertex0, vertex1, zero_is_left) = if self.a == 1.0 && self.b >= 0.0 {
            (right, left, false)
        } else {
            (left, right, true)
        };

        let (x0, y0, x1, y1);
        if self.a == 1.0 {
            let mut py0 = ymin;
            if let Some(v0) = vertex0 {
                if v0.y > ymin {
                    py0 = v0.y;
                }
            }
            if py0 > ymax {
                return;
            }
            let mut px0 = self.c - self.b * py0;

            let mut py1 = ymax;
            if let Some(v1) = vertex1 {
                if v1.y < ymax {
                    py1 = v1.y;
                }
            }
            if py1 < ymin {
                return;
            }
            let mut px1 = self.c - self.b * py1;

            if (px0 > xmax && px1 > xmax) || (px0 < xmin && px1 < xmin) {
                return;
            }
            if px0 > xmax {
                px0 = xmax;
                py0 = (self.c - px0) / self.b;
            } else if px0 < xmin {
                px0 = xmin;
                py0 = (self.c - px0) / self.b;
            }
            if px1 > xmax {
                px1 = xmax;
                py1 = (self.c - px1) / self.b;
            } else if px1 < xmin {
                px1 = xmin;
                py1 = (self.c - px1) / self.b;
            }
            x0 = px0;
            y0 = py0;
            x1 = px1;
            y1 = py1;
        } else {
            let mut px0 = xmin;
            if let Some(v0) = vertex0 {
                if v0.x > xmin {
                    px0 = v0.x;
                }
            }
            if px0 > xmax {
                return;
            }
            let mut py0 = self.c - self.a * px0;

            let mut px1 = xmax;
            if let Some(v1) = vertex1 {
                if v1.x < xmax {
                    px1 = v1.x;
                }
            }
            if px1 < xmin {
                return;
            }
            let mut py1 = self.c - self.a * px1;

            if (py0 > ymax && py1 > ymax) || (py0 < ymin && py1 < ymin) {
                return;
            }
            if py0 > ymax {
                py0 = ymax;
                px0 = (self.c - py0) / self.a;
            } else if py0 < ymin {
                py0 = ymin;
                px0 = (self.c - py0) / self.a;
            }
            if py1 > ymax {
                py1 = ymax;
                px1 = (self.c - py1) / self.a;
            } else if py1 < ymin {
                py1 = ymin;
                px1 = (self.c - py1) / self.a;
            }
            x0 = px0;
            y0 = py0;
            x1 = px1;
            y1 = py1;
        }

        let p0 = DVec2::new(x0, y0);
        let p1 = DVec2::new(x1, y1);
        self.clipped = Some(if zero_is_left { [p0, p1] } else { [p1, p0] });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bisecting_horizontal_pair() {
        // Sites side by side: the bisector is the vertical line x = 50.
        let e = Edge::bisecting(0, 0, DVec2::new(25.0, 50.0), 1, DVec2::new(75.0, 50.0));
        assert_eq!(e.a, 1.0);
        assert_eq!(e.b, 0.0);
        assert_eq!(e.c, 50.0);
    }

    #[test]
    fn test_bisecting_vertical_pair() {
        // Sites stacked: the bisector is the horizontal line y = 50.
        let e = Edge::bisecting(0, 0, DVec2::new(50.0, 25.0), 1, DVec2::new(50.0, 75.0));
        assert_eq!(e.b, 1.0);
        assert_eq!(e.a, 0.0);
        assert_eq!(e.c, 50.0);
    }

    #[test]
    fn test_clip_unbounded_edge() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut e = Edge::bisecting(0, 0, DVec2::new(25.0, 50.0), 1, DVec2::new(75.0, 50.0));
        // No vertices at all: the full line x = 50 crosses the rectangle.
        e.clip_to_bounds(&[], &bounds);
        assert!(e.visible());
        let ends = [
            e.clipped_end(Lr::Left).unwrap(),
            e.clipped_end(Lr::Right).unwrap(),
        ];
        for p in ends {
            assert_eq!(p.x, 50.0);
            assert!(p.y == 0.0 || p.y == 100.0);
        }
        assert_ne!(ends[0], ends[1]);
    }

    #[test]
    fn test_clip_edge_outside_bounds() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut e = Edge::bisecting(
            0,
            0,
            DVec2::new(250.0, 50.0),
            1,
            DVec2::new(350.0, 50.0),
        );
        // Bisector x = 300, entirely to the right of the bounds.
        e.clip_to_bounds(&[], &bounds);
        assert!(!e.visible());
        assert_eq!(e.clipped_end(Lr::Left), None);
    }

    #[test]
    fn test_clip_respects_vertices() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let vertices = vec![DVec2::new(50.0, 40.0)];
        let mut e = Edge::bisecting(0, 0, DVec2::new(25.0, 50.0), 1, DVec2::new(75.0, 50.0));
        e.set_vertex(Lr::Left, 0);
        e.clip_to_bounds(&vertices, &bounds);
        assert!(e.visible());
        let l = e.clipped_end(Lr::Left).unwrap();
        let r = e.clipped_end(Lr::Right).unwrap();
        // One end stays at the vertex, the other is extended to the boundary.
        assert!((l - DVec2::new(50.0, 40.0)).length() < 1e-9);
        assert!(r.y == 0.0 || r.y == 100.0);
    }
}
