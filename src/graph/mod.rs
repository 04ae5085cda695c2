//! The map graph: cells, corners and the dual edge structure
//!
//! Built once from a Voronoi diagram, the graph carries three arenas indexed
//! by plain `usize` handles. Every edge is simultaneously a Voronoi edge
//! (between two corners) and a Delaunay edge (between two cell centers), and
//! all adjacency lists are wired symmetrically with duplicate suppression.
//! Terrain passes only ever touch this graph, never the diagram again.

use std::collections::HashMap;

use glam::DVec2;

use crate::diagram::edge::Lr;
use crate::diagram::Voronoi;
use crate::geom::Rect;
use crate::terrain::Biome;

/// A map cell, dual to one Voronoi site.
#[derive(Debug, Clone)]
pub struct Center {
    pub index: usize,
    pub loc: DVec2,
    /// Adjacent cells (Delaunay neighbors).
    pub neighbors: Vec<usize>,
    /// Edges bounding this cell.
    pub borders: Vec<usize>,
    /// Corners of this cell's polygon, sorted counterclockwise around `loc`.
    pub corners: Vec<usize>,
    /// Whether the cell touches the plot boundary.
    pub border: bool,
    pub water: bool,
    pub ocean: bool,
    pub coast: bool,
    pub elevation: f64,
    pub moisture: f64,
    pub biome: Biome,
    /// Polygon area, filled in by the terrain pipeline.
    pub area: f64,
}

/// A polygon corner, shared between the cells that meet there.
#[derive(Debug, Clone)]
pub struct Corner {
    pub index: usize,
    pub loc: DVec2,
    /// Whether the corner lies on the plot boundary.
    pub border: bool,
    pub water: bool,
    pub ocean: bool,
    pub coast: bool,
    pub elevation: f64,
    pub moisture: f64,
    /// River volume through this corner; 0 means no river.
    pub river: u32,
    /// Adjacent corner with the lowest elevation, set by the terrain
    /// pipeline. A corner that is its own local minimum points to itself.
    pub downslope: Option<usize>,
    /// Cells meeting at this corner.
    pub touches: Vec<usize>,
    /// Edges radiating from this corner.
    pub protrudes: Vec<usize>,
    /// Corners connected by one edge.
    pub adjacent: Vec<usize>,
}

/// An edge of the dual graph.
///
/// `d0`/`d1` are the two cells the edge separates; `v0`/`v1` the corners it
/// connects. A corner can be missing when the underlying Voronoi edge was
/// clipped away entirely; such edges still record cell adjacency but carry
/// no geometry.
#[derive(Debug, Clone)]
pub struct MapEdge {
    pub index: usize,
    pub d0: usize,
    pub d1: usize,
    pub v0: Option<usize>,
    pub v1: Option<usize>,
    /// Midpoint of the corner pair, when both corners exist.
    pub midpoint: Option<DVec2>,
    /// River volume along this edge; 0 means no river.
    pub river: u32,
}

/// The complete cell/corner/edge graph of a map.
#[derive(Debug, Clone)]
pub struct MapGraph {
    pub centers: Vec<Center>,
    pub corners: Vec<Corner>,
    pub edges: Vec<MapEdge>,
    pub bounds: Rect,
}

fn push_unique(list: &mut Vec<usize>, value: usize) {
    if !list.contains(&value) {
        list.push(value);
    }
}

impl MapGraph {
    /// Build the graph from a finished diagram.
    ///
    /// Cell indices equal diagram site indices; corners are deduplicated by
    /// quantizing their coordinates to integers (corners closer than one
    /// unit merge).
    pub fn build(voronoi: &Voronoi) -> MapGraph {
        let bounds = voronoi.bounds();
        let mut graph = MapGraph {
            centers: Vec::new(),
            corners: Vec::new(),
            edges: Vec::new(),
            bounds,
        };

        for (index, loc) in voronoi.site_coords().into_iter().enumerate() {
            graph.centers.push(Center {
                index,
                loc,
                neighbors: Vec::new(),
                borders: Vec::new(),
                corners: Vec::new(),
                border: false,
                water: false,
                ocean: false,
                coast: false,
                elevation: 0.0,
                moisture: 0.0,
                biome: Biome::Ocean,
                area: 0.0,
            });
        }

        let mut corner_map: HashMap<i64, usize> = HashMap::new();
        for lib_edge in voronoi.edges() {
            let index = graph.edges.len();
            let (p0, p1) = match (
                lib_edge.clipped_end(Lr::Left),
                lib_edge.clipped_end(Lr::Right),
            ) {
                (Some(p0), Some(p1)) => (Some(p0), Some(p1)),
                _ => (None, None),
            };
            let v0 = p0.and_then(|p| graph.make_corner(&mut corner_map, p));
            let v1 = p1.and_then(|p| graph.make_corner(&mut corner_map, p));
            let d0 = lib_edge.left_site;
            let d1 = lib_edge.right_site;
            let midpoint = match (p0, p1) {
                (Some(p0), Some(p1)) => Some((p0 + p1) * 0.5),
                _ => None,
            };
            graph.edges.push(MapEdge {
                index,
                d0,
                d1,
                v0,
                v1,
                midpoint,
                river: 0,
            });

            graph.centers[d0].borders.push(index);
            graph.centers[d1].borders.push(index);
            if let Some(v0) = v0 {
                graph.corners[v0].protrudes.push(index);
            }
            if let Some(v1) = v1 {
                if v1 != v0.unwrap_or(usize::MAX) {
                    graph.corners[v1].protrudes.push(index);
                }
            }

            push_unique(&mut graph.centers[d0].neighbors, d1);
            push_unique(&mut graph.centers[d1].neighbors, d0);

            if let (Some(v0), Some(v1)) = (v0, v1) {
                // Zero-length edges would make a corner adjacent to itself.
                if v0 != v1 {
                    push_unique(&mut graph.corners[v0].adjacent, v1);
                    push_unique(&mut graph.corners[v1].adjacent, v0);
                }
            }

            for d in [d0, d1] {
                if let Some(v0) = v0 {
                    push_unique(&mut graph.centers[d].corners, v0);
                }
                if let Some(v1) = v1 {
                    push_unique(&mut graph.centers[d].corners, v1);
                }
            }
            for v in [v0, v1].into_iter().flatten() {
                push_unique(&mut graph.corners[v].touches, d0);
                push_unique(&mut graph.corners[v].touches, d1);
            }
        }

        for center in &mut graph.centers {
            center.border = center.corners.iter().any(|&c| graph.corners[c].border);
        }

        graph.sort_corners_counterclockwise();
        graph
    }

    fn make_corner(&mut self, corner_map: &mut HashMap<i64, usize>, p: DVec2) -> Option<usize> {
        let key = (p.x as i64) + (p.y as i64) * (self.bounds.width as i64) * 2;
        if let Some(&existing) = corner_map.get(&key) {
            return Some(existing);
        }
        let index = self.corners.len();
        self.corners.push(Corner {
            index,
            loc: p,
            border: self.bounds.lies_on_axes(p),
            water: false,
            ocean: false,
            coast: false,
            elevation: 0.0,
            moisture: 0.0,
            river: 0,
            downslope: None,
            touches: Vec::new(),
            protrudes: Vec::new(),
            adjacent: Vec::new(),
        });
        corner_map.insert(key, index);
        Some(index)
    }

    /// Sort every cell's corner list counterclockwise around the cell center,
    /// so the list reads as an ordered polygon.
    fn sort_corners_counterclockwise(&mut self) {
        let locs: Vec<DVec2> = self.corners.iter().map(|c| c.loc).collect();
        for center in &mut self.centers {
            let origin = center.loc;
            center.corners.sort_by(|&a, &b| {
                let pa = locs[a] - origin;
                let pb = locs[b] - origin;
                pa.y.atan2(pa.x).total_cmp(&pb.y.atan2(pb.x))
            });
        }
    }

    /// Move every non-border corner to the centroid of the cells touching it.
    ///
    /// This smooths the sharp polygon artifacts of a raw diagram without
    /// changing any adjacency; edge midpoints are recomputed afterwards.
    pub fn improve_corners(&mut self) {
        let mut new_locs: Vec<DVec2> = Vec::with_capacity(self.corners.len());
        for corner in &self.corners {
            if corner.border || corner.touches.is_empty() {
                new_locs.push(corner.loc);
            } else {
                let mut sum = DVec2::ZERO;
                for &center in &corner.touches {
                    sum += self.centers[center].loc;
                }
                new_locs.push(sum / corner.touches.len() as f64);
            }
        }
        for (corner, loc) in self.corners.iter_mut().zip(&new_locs) {
            corner.loc = *loc;
        }
        for edge in &mut self.edges {
            if let (Some(v0), Some(v1)) = (edge.v0, edge.v1) {
                edge.midpoint = Some((self.corners[v0].loc + self.corners[v1].loc) * 0.5);
            }
        }
    }

    /// Land cells (not ocean, not lake).
    pub fn land_centers(&self) -> impl Iterator<Item = &Center> {
        self.centers.iter().filter(|c| !c.water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_graph() -> MapGraph {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let v = Voronoi::new(
            vec![
                DVec2::new(25.0, 25.0),
                DVec2::new(75.0, 25.0),
                DVec2::new(25.0, 75.0),
                DVec2::new(75.0, 75.0),
            ],
            bounds,
        );
        MapGraph::build(&v)
    }

    #[test]
    fn test_square_graph_arenas() {
        let graph = square_graph();
        assert_eq!(graph.centers.len(), 4);
        // One shared interior corner plus one corner per boundary crossing.
        assert_eq!(graph.corners.len(), 5);
        let interior: Vec<&Corner> =
            graph.corners.iter().filter(|c| !c.border).collect();
        assert_eq!(interior.len(), 1);
        assert!((interior[0].loc - DVec2::new(50.0, 50.0)).length() < 1e-9);
    }

    #[test]
    fn test_wiring_is_symmetric() {
        let graph = square_graph();
        for center in &graph.centers {
            for &n in &center.neighbors {
                assert!(graph.centers[n].neighbors.contains(&center.index));
            }
            for &c in &center.corners {
                assert!(graph.corners[c].touches.contains(&center.index));
            }
        }
        for corner in &graph.corners {
            for &a in &corner.adjacent {
                assert!(graph.corners[a].adjacent.contains(&corner.index));
                assert_ne!(a, corner.index);
            }
            for &e in &corner.protrudes {
                let edge = &graph.edges[e];
                assert!(edge.v0 == Some(corner.index) || edge.v1 == Some(corner.index));
            }
        }
    }

    #[test]
    fn test_interior_corner_touches_all_cells() {
        let graph = square_graph();
        let interior = graph
            .corners
            .iter()
            .find(|c| !c.border)
            .map(|c| c.index)
            .unwrap();
        let mut touches = graph.corners[interior].touches.clone();
        touches.sort_unstable();
        assert_eq!(touches, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_corners_sorted_counterclockwise() {
        let graph = square_graph();
        for center in &graph.centers {
            let angles: Vec<f64> = center
                .corners
                .iter()
                .map(|&c| {
                    let d = graph.corners[c].loc - center.loc;
                    d.y.atan2(d.x)
                })
                .collect();
            for pair in angles.windows(2) {
                assert!(pair[0] <= pair[1]);
            }
        }
    }

    #[test]
    fn test_improve_corners_keeps_border_fixed() {
        let mut graph = square_graph();
        let before: Vec<DVec2> = graph.corners.iter().map(|c| c.loc).collect();
        graph.improve_corners();
        for (corner, old) in graph.corners.iter().zip(&before) {
            if corner.border {
                assert_eq!(corner.loc, *old);
            }
        }
        // The interior corner of the symmetric grid is already the centroid.
        let interior = graph.corners.iter().find(|c| !c.border).unwrap();
        assert!((interior.loc - DVec2::new(50.0, 50.0)).length() < 1e-9);
    }
}
