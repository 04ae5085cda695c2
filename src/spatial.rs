//! Spatial indexing for fast position-to-cell lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::DVec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// Wrapper around a KD-tree for point-to-cell queries
///
/// Provides O(log n) nearest-neighbor lookups to convert map coordinates
/// into cell indices, used by [`crate::IslandMap::locate`].
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 2, 32>,
}

impl SpatialIndex {
    /// Build the index from cell center locations
    ///
    /// Called once at the end of map generation.
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_island_map::*;
    /// use glam::DVec2;
    ///
    /// let centers = vec![
    ///     DVec2::new(10.0, 10.0),
    ///     DVec2::new(90.0, 10.0),
    ///     DVec2::new(50.0, 90.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&centers);
    /// assert_eq!(index.find_nearest(DVec2::new(12.0, 8.0)), 0);
    /// ```
    pub fn new(centers: &[DVec2]) -> Self {
        let points: Vec<[f64; 2]> = centers.iter().map(|c| [c.x, c.y]).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
        }
    }

    /// Index of the cell center nearest to `position`.
    pub fn find_nearest(&self, position: DVec2) -> usize {
        let query = [position.x, position.y];
        let result = self.tree.nearest_one::<SquaredEuclidean>(&query);
        result.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_index_basic() {
        let centers = vec![
            DVec2::new(10.0, 10.0),
            DVec2::new(90.0, 10.0),
            DVec2::new(10.0, 90.0),
            DVec2::new(90.0, 90.0),
        ];

        let index = SpatialIndex::new(&centers);

        assert_eq!(index.find_nearest(DVec2::new(15.0, 5.0)), 0);
        assert_eq!(index.find_nearest(DVec2::new(80.0, 20.0)), 1);
        assert_eq!(index.find_nearest(DVec2::new(0.0, 100.0)), 2);
        assert_eq!(index.find_nearest(DVec2::new(99.0, 99.0)), 3);
    }

    #[test]
    fn test_spatial_index_exact_match() {
        let centers = vec![DVec2::new(25.0, 75.0), DVec2::new(75.0, 25.0)];
        let index = SpatialIndex::new(&centers);

        assert_eq!(index.find_nearest(centers[0]), 0);
        assert_eq!(index.find_nearest(centers[1]), 1);
    }
}
