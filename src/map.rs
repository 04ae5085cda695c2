//! IslandMap main structure

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::MapConfig;
use crate::diagram::Voronoi;
use crate::error::{MapError, Result};
use crate::graph::{Center, Corner, MapEdge, MapGraph};
use crate::terrain;
use crate::terrain::shape::{IslandShape, WaterShape};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// A complete generated island map
///
/// Holds the cell/corner/edge graph with all terrain attributes assigned.
/// The same configuration always regenerates the identical map.
///
/// # Examples
///
/// ```
/// use voronoi_island_map::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .num_sites(200)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let map = IslandMap::generate(config).unwrap();
/// assert_eq!(map.centers().len(), 200);
///
/// let land = map.centers().iter().filter(|c| !c.water).count();
/// println!("{} land cells", land);
/// ```
pub struct IslandMap {
    /// Configuration used to generate this map
    config: MapConfig,

    /// The terrain-annotated graph
    graph: MapGraph,

    /// Spatial index for fast point-to-cell lookups (requires the
    /// spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl IslandMap {
    /// Generate a map using the shape selected in the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation, or
    /// `GenerationFailed` if the site set degenerates (no usable diagram).
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_island_map::*;
    ///
    /// let config = MapConfigBuilder::new()
    ///     .seed(12345)
    ///     .num_sites(300)
    ///     .unwrap()
    ///     .build()
    ///     .unwrap();
    ///
    /// let map = IslandMap::generate(config).unwrap();
    /// assert!(map.centers().iter().any(|c| c.ocean));
    /// ```
    pub fn generate(config: MapConfig) -> Result<IslandMap> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let graph = Self::build_graph(&config, &mut rng)?;
        // Materialize the shape after site placement so both draw from the
        // same deterministic stream.
        let shape = IslandShape::materialize(config.shape, &mut rng);
        Self::finish(config, graph, &shape, rng)
    }

    /// Generate a map with a custom land/water shape
    ///
    /// The shape is queried once per corner; everything else follows the
    /// standard pipeline.
    pub fn generate_with_shape<S: WaterShape>(config: MapConfig, shape: &S) -> Result<IslandMap> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let graph = Self::build_graph(&config, &mut rng)?;
        Self::finish(config, graph, shape, rng)
    }

    fn build_graph(config: &MapConfig, rng: &mut ChaCha8Rng) -> Result<MapGraph> {
        let bounds = config.bounds;

        log::debug!("placing {} sites", config.num_sites);
        let mut points: Vec<DVec2> = (0..config.num_sites)
            .map(|_| {
                DVec2::new(
                    rng.gen::<f64>() * bounds.width + bounds.x,
                    rng.gen::<f64>() * bounds.height + bounds.y,
                )
            })
            .collect();

        let mut voronoi = Voronoi::new(points, bounds);
        for iteration in 0..config.lloyd_iterations {
            log::debug!("lloyd relaxation {}", iteration + 1);
            points = voronoi
                .regions()
                .into_iter()
                .zip(voronoi.site_coords())
                .map(|(region, old)| {
                    if region.is_empty() {
                        // Degenerate region: keep the site where it is.
                        old
                    } else {
                        region.iter().sum::<DVec2>() / region.len() as f64
                    }
                })
                .collect();
            voronoi = Voronoi::new(points, bounds);
        }

        let mut graph = MapGraph::build(&voronoi);
        if graph.corners.is_empty() {
            return Err(MapError::GenerationFailed(
                "diagram produced no usable cells".to_string(),
            ));
        }
        if config.improve_corners {
            graph.improve_corners();
        }
        Ok(graph)
    }

    fn finish(
        config: MapConfig,
        mut graph: MapGraph,
        shape: &dyn WaterShape,
        mut rng: ChaCha8Rng,
    ) -> Result<IslandMap> {
        terrain::run(&mut graph, shape, &mut rng);
        log::debug!(
            "map ready: {} cells, {} corners, {} edges",
            graph.centers.len(),
            graph.corners.len(),
            graph.edges.len()
        );

        #[cfg(feature = "spatial-index")]
        let spatial_index = {
            let locs: Vec<DVec2> = graph.centers.iter().map(|c| c.loc).collect();
            SpatialIndex::new(&locs)
        };

        Ok(IslandMap {
            config,
            graph,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    /// The configuration this map was generated from.
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// The full graph, for callers that want to walk it directly.
    #[inline]
    pub fn graph(&self) -> &MapGraph {
        &self.graph
    }

    #[inline]
    pub fn centers(&self) -> &[Center] {
        &self.graph.centers
    }

    #[inline]
    pub fn corners(&self) -> &[Corner] {
        &self.graph.corners
    }

    #[inline]
    pub fn edges(&self) -> &[MapEdge] {
        &self.graph.edges
    }

    /// Index of the cell whose center is nearest to `(x, y)`
    ///
    /// With the `spatial-index` feature this is an O(log n) KD-tree query;
    /// without it, a linear scan.
    pub fn locate(&self, x: f64, y: f64) -> usize {
        let p = DVec2::new(x, y);
        #[cfg(feature = "spatial-index")]
        {
            self.spatial_index.find_nearest(p)
        }
        #[cfg(not(feature = "spatial-index"))]
        {
            let mut best = 0;
            let mut best_dist = f64::MAX;
            for center in &self.graph.centers {
                let d = center.loc.distance_squared(p);
                if d < best_dist {
                    best_dist = d;
                    best = center.index;
                }
            }
            best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigBuilder;
    use crate::geom::Rect;
    use crate::terrain::Biome;

    fn small_config(seed: u64) -> MapConfig {
        MapConfigBuilder::new()
            .seed(seed)
            .num_sites(200)
            .unwrap()
            .bounds(Rect::new(0.0, 0.0, 400.0, 400.0))
            .unwrap()
            .lloyd_iterations(2)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_generate_produces_expected_cell_count() {
        let map = IslandMap::generate(small_config(42)).unwrap();
        assert_eq!(map.centers().len(), 200);
        assert!(!map.corners().is_empty());
        assert!(!map.edges().is_empty());
    }

    #[test]
    fn test_generate_rejects_invalid_config() {
        let mut config = small_config(1);
        config.num_sites = 1;
        assert!(IslandMap::generate(config).is_err());
    }

    #[test]
    fn test_map_has_ocean_and_border_cells_are_ocean() {
        let map = IslandMap::generate(small_config(7)).unwrap();
        for center in map.centers() {
            if center.border {
                assert!(center.ocean);
                assert_eq!(center.biome, Biome::Ocean);
            }
        }
    }

    #[test]
    fn test_same_seed_same_map() {
        let a = IslandMap::generate(small_config(1234)).unwrap();
        let b = IslandMap::generate(small_config(1234)).unwrap();

        assert_eq!(a.centers().len(), b.centers().len());
        for (ca, cb) in a.centers().iter().zip(b.centers()) {
            assert_eq!(ca.loc, cb.loc);
            assert_eq!(ca.elevation, cb.elevation);
            assert_eq!(ca.moisture, cb.moisture);
            assert_eq!(ca.biome, cb.biome);
        }
        for (ea, eb) in a.edges().iter().zip(b.edges()) {
            assert_eq!(ea.river, eb.river);
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = IslandMap::generate(small_config(1)).unwrap();
        let b = IslandMap::generate(small_config(2)).unwrap();
        let same = a
            .centers()
            .iter()
            .zip(b.centers())
            .all(|(ca, cb)| ca.loc == cb.loc);
        assert!(!same);
    }

    #[test]
    fn test_locate_finds_nearest_center() {
        let map = IslandMap::generate(small_config(9)).unwrap();
        for &idx in &[0usize, 50, 199] {
            let loc = map.centers()[idx].loc;
            assert_eq!(map.locate(loc.x, loc.y), idx);
        }
    }

    #[test]
    fn test_elevations_and_moisture_within_range() {
        let map = IslandMap::generate(small_config(3)).unwrap();
        for center in map.centers() {
            assert!(center.elevation >= 0.0);
            assert!(center.elevation <= 1.0 + 1e-9);
            assert!(center.moisture >= 0.0);
            assert!(center.moisture <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_lake_and_ocean_are_distinct() {
        // Over a handful of seeds at least one map has a lake; lakes must
        // never be flagged ocean.
        for seed in 0..8u64 {
            let map = IslandMap::generate(small_config(seed)).unwrap();
            for center in map.centers() {
                if center.ocean {
                    assert!(center.water);
                }
                if center.biome == Biome::Lake {
                    assert!(!center.ocean);
                }
            }
        }
    }
}
