//! Bounded Voronoi diagram built with Fortune's sweep line
//!
//! The entry point is [`Voronoi::new`], which runs the sweep over a point set
//! and clips every edge to the plot rectangle. Regions are assembled lazily
//! per site and cached: the site's edges are chained by shared circumcenter
//! vertices, clipped endpoints are stitched along the rectangle boundary, and
//! the polygon is canonicalized to counterclockwise winding.

pub mod beach;
pub mod edge;
pub mod events;
pub mod region;
pub mod reorder;
pub mod site;

use glam::DVec2;

use crate::geom::Rect;

use beach::BeachLine;
use edge::{Edge, Lr};
use events::EventQueue;
use reorder::{reorder_edges, Criterion};
use site::{compare_by_y_then_x, SiteList};

/// A Voronoi diagram of a point set, clipped to a plot rectangle.
pub struct Voronoi {
    sites: SiteList,
    edges: Vec<Edge>,
    vertices: Vec<DVec2>,
    bounds: Rect,
}

impl Voronoi {
    /// Run the sweep over `points` and clip the result to `bounds`.
    ///
    /// Site indices returned by the accessors refer to the y-then-x sorted
    /// order, not the input order.
    pub fn new(points: Vec<DVec2>, bounds: Rect) -> Self {
        let sites = SiteList::new(points);
        let mut diagram = Self {
            sites,
            edges: Vec::new(),
            vertices: Vec::new(),
            bounds,
        };
        diagram.fortunes_algorithm();
        diagram
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Site coordinates in diagram (sorted) order.
    pub fn site_coords(&self) -> Vec<DVec2> {
        self.sites.coords()
    }

    #[inline]
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Delaunay neighbors of a site: the opposite site of each of its edges.
    pub fn neighbor_sites(&self, site: usize) -> Vec<usize> {
        self.sites
            .site(site)
            .edges
            .iter()
            .map(|&e| {
                let edge = &self.edges[e];
                if edge.left_site == site {
                    edge.right_site
                } else {
                    edge.left_site
                }
            })
            .collect()
    }

    /// Sites on the convex hull, chained in traversal order.
    ///
    /// Hull edges are the ones left unbounded on at least one side; chaining
    /// them by shared site identity walks the hull.
    pub fn hull_sites(&self) -> Vec<usize> {
        let hull_edges: Vec<usize> = self
            .edges
            .iter()
            .filter(|e| e.left_vertex.is_none() || e.right_vertex.is_none())
            .map(|e| e.index)
            .collect();
        let (ordered, orientations) = reorder_edges(&hull_edges, &self.edges, Criterion::BySite);
        ordered
            .iter()
            .zip(&orientations)
            .map(|(&e, &lr)| self.edges[e].site(lr))
            .collect()
    }

    /// Clipped region polygon of a site, in counterclockwise order.
    ///
    /// Degenerate sites (edges that cannot be chained) get an empty polygon.
    /// The result is cached on the site.
    pub fn region(&mut self, site: usize) -> Vec<DVec2> {
        if let Some(cached) = &self.sites.site(site).region {
            return cached.clone();
        }
        // Chain the site's edges once; later calls rebuild the polygon from
        // the stored chain.
        if self.sites.site(site).edge_orientations.is_none() {
            let edge_ids = self.sites.site(site).edges.clone();
            let (ordered, orientations) =
                reorder_edges(&edge_ids, &self.edges, Criterion::ByVertex);
            let s = self.sites.site_mut(site);
            s.edges = ordered;
            s.edge_orientations = Some(orientations);
        }
        let polygon = {
            let s = self.sites.site(site);
            let orientations = s.edge_orientations.as_deref().unwrap_or(&[]);
            region::build_region(&s.edges, orientations, &self.edges, &self.bounds)
        };
        self.sites.site_mut(site).region = Some(polygon.clone());
        polygon
    }

    /// Region polygons for every site, in site order.
    pub fn regions(&mut self) -> Vec<Vec<DVec2>> {
        (0..self.sites.len()).map(|s| self.region(s)).collect()
    }

    fn left_region(&self, beach: &BeachLine, he: usize, bottom_most: usize) -> usize {
        match beach.halfedges[he].edge {
            Some(e) => self.edges[e].site(beach.halfedges[he].lr),
            None => bottom_most,
        }
    }

    fn right_region(&self, beach: &BeachLine, he: usize, bottom_most: usize) -> usize {
        match beach.halfedges[he].edge {
            Some(e) => self.edges[e].site(beach.halfedges[he].lr.other()),
            None => bottom_most,
        }
    }

    /// Circumcenter candidate where the breakpoints of two half-edges meet.
    ///
    /// Returns `None` for parallel bisectors, shared right sites, or an
    /// intersection on the wrong side of the breakpoint.
    fn intersect(&self, beach: &BeachLine, he0: usize, he1: usize) -> Option<DVec2> {
        let e0 = beach.halfedges[he0].edge?;
        let e1 = beach.halfedges[he1].edge?;
        let edge0 = &self.edges[e0];
        let edge1 = &self.edges[e1];
        if edge0.right_site == edge1.right_site {
            return None;
        }

        let determinant = edge0.a * edge1.b - edge0.b * edge1.a;
        if determinant.abs() < 1.0e-10 {
            // parallel bisectors
            return None;
        }

        let ix = (edge0.c * edge1.b - edge1.c * edge0.b) / determinant;
        let iy = (edge1.c * edge0.a - edge0.c * edge1.a) / determinant;
        if !ix.is_finite() || !iy.is_finite() {
            return None;
        }

        let (he, edge) = if compare_by_y_then_x(
            self.sites.coord(edge0.right_site),
            self.sites.coord(edge1.right_site),
        ) == std::cmp::Ordering::Less
        {
            (he0, edge0)
        } else {
            (he1, edge1)
        };
        let right_of_site = ix >= self.sites.coord(edge.right_site).x;
        let lr = beach.halfedges[he].lr;
        if (right_of_site && lr == Lr::Left) || (!right_of_site && lr == Lr::Right) {
            return None;
        }

        Some(DVec2::new(ix, iy))
    }

    fn add_bisector(&mut self, site0: usize, site1: usize) -> usize {
        let index = self.edges.len();
        let edge = Edge::bisecting(
            index,
            site0,
            self.sites.coord(site0),
            site1,
            self.sites.coord(site1),
        );
        self.edges.push(edge);
        self.sites.add_edge(site0, index);
        self.sites.add_edge(site1, index);
        index
    }

    fn fortunes_algorithm(&mut self) {
        let data_bounds = self.sites.data_bounds();
        let sqrt_nsites = ((self.sites.len() + 4) as f64).sqrt() as usize;
        let mut beach = BeachLine::new(data_bounds.x, data_bounds.width, sqrt_nsites);
        let mut heap = EventQueue::new();

        let bottom_most = match self.sites.next() {
            Some(s) => s,
            None => return,
        };
        let mut new_site = self.sites.next();

        loop {
            let next_event = heap.peek(&beach.halfedges);

            let site_is_next = match (new_site, next_event) {
                (Some(s), Some((ystar, x))) => {
                    compare_by_y_then_x(self.sites.coord(s), DVec2::new(x, ystar))
                        == std::cmp::Ordering::Less
                }
                (Some(_), None) => true,
                (None, _) => false,
            };

            if site_is_next {
                let site = match new_site {
                    Some(s) => s,
                    None => break,
                };
                let p = self.sites.coord(site);

                let lbnd = beach.left_neighbor(p, &self.edges, &self.sites);
                let rbnd = beach.right(lbnd);
                let bottom = self.right_region(&beach, lbnd, bottom_most);

                let edge = self.add_bisector(bottom, site);

                let bisector = beach.create(Some(edge), Lr::Left);
                beach.insert_after(lbnd, bisector);
                if let Some(v) = self.intersect(&beach, lbnd, bisector) {
                    beach.halfedges[lbnd].vertex = Some(v);
                    beach.halfedges[lbnd].ystar = v.y + p.distance(v);
                    heap.push(lbnd, beach.halfedges[lbnd].ystar, v.x);
                }

                let bisector2 = beach.create(Some(edge), Lr::Right);
                beach.insert_after(bisector, bisector2);
                if let Some(v) = self.intersect(&beach, bisector2, rbnd) {
                    beach.halfedges[bisector2].vertex = Some(v);
                    beach.halfedges[bisector2].ystar = v.y + p.distance(v);
                    heap.push(bisector2, beach.halfedges[bisector2].ystar, v.x);
                }

                new_site = self.sites.next();
            } else if let Some((lbnd, v)) = heap.pop(&beach.halfedges) {
                let llbnd = beach.left(lbnd);
                let rbnd = beach.right(lbnd);
                let rrbnd = beach.right(rbnd);
                let mut bottom = self.left_region(&beach, lbnd, bottom_most);
                let mut top = self.right_region(&beach, rbnd, bottom_most);

                let vertex = self.vertices.len();
                self.vertices.push(v);
                if let Some(e) = beach.halfedges[lbnd].edge {
                    let lr = beach.halfedges[lbnd].lr;
                    self.edges[e].set_vertex(lr, vertex);
                }
                if let Some(e) = beach.halfedges[rbnd].edge {
                    let lr = beach.halfedges[rbnd].lr;
                    self.edges[e].set_vertex(lr, vertex);
                }
                beach.remove(lbnd);
                beach.halfedges[rbnd].vertex = None;
                beach.remove(rbnd);

                let mut lr = Lr::Left;
                if self.sites.coord(bottom).y > self.sites.coord(top).y {
                    std::mem::swap(&mut bottom, &mut top);
                    lr = Lr::Right;
                }
                let edge = self.add_bisector(bottom, top);
                let bisector = beach.create(Some(edge), lr);
                beach.insert_after(llbnd, bisector);
                self.edges[edge].set_vertex(lr.other(), vertex);

                let bottom_coord = self.sites.coord(bottom);
                if let Some(v2) = self.intersect(&beach, llbnd, bisector) {
                    beach.halfedges[llbnd].vertex = Some(v2);
                    beach.halfedges[llbnd].ystar = v2.y + bottom_coord.distance(v2);
                    heap.push(llbnd, beach.halfedges[llbnd].ystar, v2.x);
                }
                if let Some(v2) = self.intersect(&beach, bisector, rrbnd) {
                    beach.halfedges[bisector].vertex = Some(v2);
                    beach.halfedges[bisector].ystar = v2.y + bottom_coord.distance(v2);
                    heap.push(bisector, beach.halfedges[bisector].ystar, v2.x);
                }
            } else {
                break;
            }
        }

        let bounds = self.bounds;
        for edge in &mut self.edges {
            edge.clip_to_bounds(&self.vertices, &bounds);
        }
    }
}
