//! Geometry primitives shared by the diagram engine and the map graph.

use glam::DVec2;

/// Epsilon comparison used throughout the crate.
#[inline]
pub fn close_enough(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Point coincidence under a distance tolerance.
#[inline]
pub fn points_coincide(a: DVec2, b: DVec2, tolerance: f64) -> bool {
    a.distance(b) < tolerance
}

/// Axis-aligned rectangle describing the plot bounds of a map.
///
/// All diagram edges and cell polygons are clipped to this rectangle, and
/// its sides decide which graph corners count as border corners.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `p` lies on one of the four sides, within a 1-unit tolerance.
    pub fn lies_on_axes(&self, p: DVec2) -> bool {
        close_enough(p.x, self.x, 1.0)
            || close_enough(p.y, self.y, 1.0)
            || close_enough(p.x, self.right(), 1.0)
            || close_enough(p.y, self.bottom(), 1.0)
    }

    /// Whether `p` lies inside the rectangle (sides inclusive).
    pub fn in_bounds(&self, p: DVec2) -> bool {
        !(p.x < self.x || p.x > self.right() || p.y < self.y || p.y > self.bottom())
    }
}

/// Winding direction of a polygon given as an ordered point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
    None,
}

/// Twice the signed area of the polygon described by `points`.
///
/// Positive for counter-clockwise order under the usual mathematical
/// orientation, negative for clockwise.
pub fn signed_double_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    let mut area = 0.0;
    for i in 0..n {
        let p = points[i];
        let next = points[(i + 1) % n];
        area += p.x * next.y - next.x * p.y;
    }
    area
}

pub fn winding(points: &[DVec2]) -> Winding {
    let area = signed_double_area(points);
    if area < 0.0 {
        Winding::Clockwise
    } else if area > 0.0 {
        Winding::CounterClockwise
    } else {
        Winding::None
    }
}
