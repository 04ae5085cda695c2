//! Island map configuration and builder
//!
//! This module provides configuration types for deterministic island map
//! generation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geom::Rect;

/// Selection of the land/water shape used to seed elevation
///
/// The shape decides, for every graph corner, whether it starts out as water.
/// Concrete shapes are materialized from the run RNG at generation time, so
/// the same configuration always yields the same coastline.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeConfig {
    /// Radial sinusoid island (the default): an irregular blob with
    /// randomized bumps and a single inlet.
    Radial,
    /// Value-noise continents: white noise smoothed `octave_count` times over
    /// a `noise_width` x `noise_height` grid, split at the histogram median.
    Perlin {
        octave_count: u32,
        noise_width: usize,
        noise_height: usize,
    },
    /// A fixed blob-with-eyes test shape.
    Blob,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        ShapeConfig::Radial
    }
}

/// Configuration for deterministic island map generation
///
/// The same configuration always produces the identical map: every random
/// draw (site placement, shape parameters, river trials) comes from one
/// ChaCha stream seeded with `seed`.
///
/// # Serialization
///
/// Only the configuration is serialized (with the `serde` feature), not the
/// generated graph. A map is regenerated from its configuration when loading.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Random seed for deterministic map generation
    pub seed: u64,

    /// Number of Voronoi sites (one map cell per site)
    pub num_sites: usize,

    /// Plot bounds: every cell polygon is clipped to this rectangle
    pub bounds: Rect,

    /// Number of Lloyd relaxation iterations applied to the site set
    ///
    /// - 0: raw random sites (irregular cells)
    /// - 2: decent uniformity (default)
    /// - 5+: diminishing returns, slower generation
    pub lloyd_iterations: usize,

    /// Whether to run the corner smoothing pass after graph construction
    ///
    /// Smoothing moves every non-border corner to the centroid of its
    /// touching cells, softening sharp polygon artifacts without changing
    /// the graph topology.
    pub improve_corners: bool,

    /// Land/water shape selection
    pub shape: ShapeConfig,
}

impl MapConfig {
    /// Validate the configuration, mirroring the builder's checks
    ///
    /// `generate` calls this so that hand-assembled configurations get the
    /// same fail-fast treatment as built ones.
    pub fn validate(&self) -> Result<()> {
        if self.num_sites < 3 {
            return Err(MapError::InvalidConfig(format!(
                "at least 3 sites are needed for a non-degenerate diagram (got {})",
                self.num_sites
            )));
        }
        if self.bounds.width <= 0.0 || self.bounds.height <= 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "bounds must have positive area (got {}x{})",
                self.bounds.width, self.bounds.height
            )));
        }
        if self.lloyd_iterations > 20 {
            return Err(MapError::InvalidConfig(format!(
                "Lloyd iterations must be <= 20 (got {})",
                self.lloyd_iterations
            )));
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfigBuilder::new().build().unwrap()
    }
}

/// Builder for creating a MapConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_island_map::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .num_sites(2000)
///     .unwrap()
///     .bounds(Rect::new(0.0, 0.0, 1000.0, 1000.0))
///     .unwrap()
///     .lloyd_iterations(2)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<u64>,
    num_sites: usize,
    bounds: Rect,
    lloyd_iterations: usize,
    improve_corners: bool,
    shape: ShapeConfig,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: random
    /// - num_sites: 1000
    /// - bounds: 1000 x 1000 at the origin
    /// - lloyd_iterations: 2
    /// - improve_corners: true
    /// - shape: Radial
    pub fn new() -> Self {
        Self {
            seed: None,
            num_sites: 1000,
            bounds: Rect::new(0.0, 0.0, 1000.0, 1000.0),
            lloyd_iterations: 2,
            improve_corners: true,
            shape: ShapeConfig::Radial,
        }
    }

    /// Set the random seed for map generation
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of Voronoi sites
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if fewer than 3 sites are requested; the
    /// diagram degenerates below that.
    pub fn num_sites(mut self, num_sites: usize) -> Result<Self> {
        if num_sites < 3 {
            return Err(MapError::InvalidConfig(format!(
                "at least 3 sites are needed for a non-degenerate diagram (got {})",
                num_sites
            )));
        }
        self.num_sites = num_sites;
        Ok(self)
    }

    /// Set the plot bounds
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the rectangle has zero or negative area.
    pub fn bounds(mut self, bounds: Rect) -> Result<Self> {
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "bounds must have positive area (got {}x{})",
                bounds.width, bounds.height
            )));
        }
        self.bounds = bounds;
        Ok(self)
    }

    /// Set the number of Lloyd relaxation iterations
    ///
    /// Each iteration replaces every site with the centroid of its cell,
    /// evening out the distribution.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations > 20 (excessive and impractical)
    pub fn lloyd_iterations(mut self, iterations: usize) -> Result<Self> {
        if iterations > 20 {
            return Err(MapError::InvalidConfig(format!(
                "Lloyd iterations must be <= 20 (got {})",
                iterations
            )));
        }
        self.lloyd_iterations = iterations;
        Ok(self)
    }

    /// Enable or disable the corner smoothing pass
    pub fn improve_corners(mut self, improve: bool) -> Self {
        self.improve_corners = improve;
        self
    }

    /// Select the land/water shape
    pub fn shape(mut self, shape: ShapeConfig) -> Self {
        self.shape = shape;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed.
    pub fn build(self) -> Result<MapConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);
        Ok(MapConfig {
            seed,
            num_sites: self.num_sites,
            bounds: self.bounds,
            lloyd_iterations: self.lloyd_iterations,
            improve_corners: self.improve_corners,
            shape: self.shape,
        })
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MapConfigBuilder::new().build().unwrap();
        assert_eq!(config.num_sites, 1000);
        assert_eq!(config.lloyd_iterations, 2);
        assert!(config.improve_corners);
        assert_eq!(config.shape, ShapeConfig::Radial);
        assert_eq!(config.bounds, Rect::new(0.0, 0.0, 1000.0, 1000.0));
    }

    #[test]
    fn test_builder_custom() {
        let config = MapConfigBuilder::new()
            .seed(42)
            .num_sites(500)
            .unwrap()
            .bounds(Rect::new(0.0, 0.0, 300.0, 200.0))
            .unwrap()
            .lloyd_iterations(3)
            .unwrap()
            .shape(ShapeConfig::Blob)
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.num_sites, 500);
        assert_eq!(config.lloyd_iterations, 3);
        assert_eq!(config.shape, ShapeConfig::Blob);
    }

    #[test]
    fn test_builder_too_few_sites() {
        assert!(MapConfigBuilder::new().num_sites(2).is_err());
        assert!(MapConfigBuilder::new().num_sites(0).is_err());
    }

    #[test]
    fn test_builder_invalid_bounds() {
        assert!(MapConfigBuilder::new()
            .bounds(Rect::new(0.0, 0.0, 0.0, 100.0))
            .is_err());
        assert!(MapConfigBuilder::new()
            .bounds(Rect::new(0.0, 0.0, 100.0, -5.0))
            .is_err());
    }

    #[test]
    fn test_builder_too_many_iterations() {
        assert!(MapConfigBuilder::new().lloyd_iterations(21).is_err());
    }

    #[test]
    fn test_validate_hand_built() {
        let mut config = MapConfig::default();
        config.num_sites = 1;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = MapConfigBuilder::new().seed(12345).build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let restored: MapConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
