//! Sites and the sorted site list driving the sweep

use glam::DVec2;

use crate::diagram::edge::Lr;
use crate::geom::Rect;

/// An input point of the diagram, owning the edges of its Voronoi region.
#[derive(Debug, Clone)]
pub struct Site {
    pub coord: DVec2,
    /// External index, kept in agreement with the y-then-x sort order.
    pub index: usize,
    /// Optional caller-supplied weight; carried through, unused by the core.
    pub weight: f64,
    /// Diagram edges bounding this site's region, in creation order until
    /// `reorder` replaces them with a traversal-ordered chain.
    pub edges: Vec<usize>,
    /// Which end of each edge hooks up with the previous edge in `edges`.
    pub edge_orientations: Option<Vec<Lr>>,
    /// Ordered clipped region polygon, cached after first computation.
    pub region: Option<Vec<DVec2>>,
}

impl Site {
    fn new(coord: DVec2, index: usize, weight: f64) -> Self {
        Self {
            coord,
            index,
            weight,
            edges: Vec::new(),
            edge_orientations: None,
            region: None,
        }
    }
}

/// Compare two points by y first, then x; the global event order of the sweep.
pub fn compare_by_y_then_x(p0: DVec2, p1: DVec2) -> std::cmp::Ordering {
    p0.y.total_cmp(&p1.y).then(p0.x.total_cmp(&p1.x))
}

/// Sites sorted by (y, x), consumed in order by the sweep loop.
#[derive(Debug, Clone)]
pub struct SiteList {
    sites: Vec<Site>,
    current: usize,
}

impl SiteList {
    pub fn new(points: Vec<DVec2>) -> Self {
        let mut sites: Vec<Site> = points
            .into_iter()
            .enumerate()
            .map(|(i, p)| Site::new(p, i, 0.0))
            .collect();
        // Sort on y, then x, and re-assign each site's external index to
        // match its new position so index-based lookups stay valid.
        sites.sort_by(|a, b| compare_by_y_then_x(a.coord, b.coord));
        for (i, site) in sites.iter_mut().enumerate() {
            site.index = i;
        }
        Self { sites, current: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Next unconsumed site in sweep order.
    pub fn next(&mut self) -> Option<usize> {
        if self.current < self.sites.len() {
            self.current += 1;
            Some(self.current - 1)
        } else {
            None
        }
    }

    #[inline]
    pub fn coord(&self, site: usize) -> DVec2 {
        self.sites[site].coord
    }

    #[inline]
    pub fn site(&self, site: usize) -> &Site {
        &self.sites[site]
    }

    #[inline]
    pub fn site_mut(&mut self, site: usize) -> &mut Site {
        &mut self.sites[site]
    }

    pub fn add_edge(&mut self, site: usize, edge: usize) {
        self.sites[site].edges.push(edge);
    }

    /// All site coordinates, in sorted order.
    pub fn coords(&self) -> Vec<DVec2> {
        self.sites.iter().map(|s| s.coord).collect()
    }

    /// Bounding rectangle of the site set.
    ///
    /// Relies on the sites being sorted: the y range comes from the first
    /// and last entries, the x range from a scan.
    pub fn data_bounds(&self) -> Rect {
        if self.sites.is_empty() {
            return Rect::new(0.0, 0.0, 0.0, 0.0);
        }
        let mut xmin = f64::MAX;
        let mut xmax = f64::MIN;
        for site in &self.sites {
            xmin = xmin.min(site.coord.x);
            xmax = xmax.max(site.coord.x);
        }
        let ymin = self.sites[0].coord.y;
        let ymax = self.sites[self.sites.len() - 1].coord.y;
        Rect::new(xmin, ymin, xmax - xmin, ymax - ymin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_y_then_x() {
        let list = SiteList::new(vec![
            DVec2::new(5.0, 9.0),
            DVec2::new(3.0, 1.0),
            DVec2::new(8.0, 1.0),
            DVec2::new(1.0, 4.0),
        ]);
        let coords = list.coords();
        assert_eq!(coords[0], DVec2::new(3.0, 1.0));
        assert_eq!(coords[1], DVec2::new(8.0, 1.0));
        assert_eq!(coords[2], DVec2::new(1.0, 4.0));
        assert_eq!(coords[3], DVec2::new(5.0, 9.0));
        // Indices agree with sort order.
        for (i, c) in coords.iter().enumerate() {
            assert_eq!(list.site(i).coord, *c);
            assert_eq!(list.site(i).index, i);
        }
    }

    #[test]
    fn test_next_consumes_in_order() {
        let mut list = SiteList::new(vec![DVec2::new(0.0, 2.0), DVec2::new(0.0, 1.0)]);
        assert_eq!(list.next(), Some(0));
        assert_eq!(list.next(), Some(1));
        assert_eq!(list.next(), None);
    }

    #[test]
    fn test_data_bounds() {
        let list = SiteList::new(vec![
            DVec2::new(10.0, 20.0),
            DVec2::new(40.0, 5.0),
            DVec2::new(25.0, 30.0),
        ]);
        let b = list.data_bounds();
        assert_eq!(b.x, 10.0);
        assert_eq!(b.y, 5.0);
        assert_eq!(b.width, 30.0);
        assert_eq!(b.height, 25.0);
    }
}
