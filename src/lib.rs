//! Procedural island map generation on a bounded Voronoi graph
//!
//! A standalone library that turns a random point set into a polygonal
//! island map: a Fortune's-algorithm Voronoi diagram clipped to a rectangle,
//! a cell/corner/edge dual graph, and a deterministic terrain pipeline
//! (elevation, ocean and coast, rivers, moisture, biomes).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_island_map::*;
//!
//! // Generate a map
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .num_sites(1000).unwrap()
//!     .lloyd_iterations(2).unwrap()
//!     .build().unwrap();
//!
//! let map = IslandMap::generate(config).unwrap();
//!
//! // Walk the cells
//! for center in map.centers() {
//!     println!("cell {} at {}: {:?}", center.index, center.loc, center.biome);
//! }
//!
//! // Point queries
//! let cell = map.locate(500.0, 500.0);
//! println!("(500, 500) falls in cell {}", cell);
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): O(log n) point-to-cell lookups using a KD-tree
//! - `serde`: serialization support for the configuration

// Modules
pub mod error;
pub mod config;
pub mod geom;
pub mod diagram;
pub mod graph;
pub mod terrain;
pub mod map;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{MapError, Result};
pub use config::{MapConfig, MapConfigBuilder, ShapeConfig};
pub use geom::Rect;
pub use diagram::Voronoi;
pub use graph::{Center, Corner, MapEdge, MapGraph};
pub use terrain::Biome;
pub use terrain::shape::{BlobShape, IslandShape, PerlinShape, RadialShape, WaterShape};
pub use map::IslandMap;

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
