//! # Isleforge Procedural Generation
//!
//! Deterministic island generation over a point mesh.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same island
//! 2. **Staged**: Each stage makes one pass over the sites of one mesh
//! 3. **Total**: Degenerate input yields an empty island, not an error
//! 4. **No global state**: Noise and RNGs are built per run from the seed
//!
//! ## Core Components
//!
//! - `PointSampler`: Poisson disk site placement
//! - `MeshBuilder`: Delaunay triangulation, edges and Voronoi regions
//! - `ElevationField`: Fractal noise under an island mask
//! - `BiomeClassifier`: Rainfall, moisture and biome table
//! - `HydrologySolver`: Downslope flow and rivers
//! - `FeatureScatter`: Trees and rocks via an `EntitySpawner`
//! - `IslandGenerator`: Runs all of the above from a `GenerationConfig`
//!
//! ## Example
//!
//! ```rust
//! use isleforge_procgen::{EntitySpawner, GenerationConfig, IslandGenerator, Point2};
//!
//! struct Discard;
//!
//! impl EntitySpawner for Discard {
//!     type Handle = ();
//!
//!     fn create_entity_at(&mut self, _kind: &str, _position: Point2) -> Option<()> {
//!         None
//!     }
//! }
//!
//! let generator = IslandGenerator::new(GenerationConfig::default()).unwrap();
//! let report = generator.generate(&mut Discard);
//!
//! for site in &report.mesh.sites {
//!     assert_eq!(site.is_water, site.elevation < 0.0);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod biome;
pub mod config;
pub mod delaunay;
pub mod elevation;
pub mod error;
pub mod features;
pub mod geometry;
pub mod hydrology;
pub mod mesh;
pub mod noise;
pub mod pipeline;
pub mod sampling;

pub use biome::{Biome, BiomeClassifier};
pub use config::GenerationConfig;
pub use delaunay::{Triangulation, EMPTY};
pub use elevation::{ElevationField, WATER_LEVEL};
pub use error::{ProcgenError, ProcgenResult};
pub use features::{EntitySpawner, FeatureKind, FeatureScatter, PlacedFeature};
pub use geometry::{Bounds, Point2};
pub use hydrology::{HydrologySolver, HydrologyStats, NeighborStrategy};
pub use mesh::{Edge, MeshBuilder, MeshData, Region, RiverSegment, Site, Triangle};
pub use noise::{NoiseBank, SimplexNoise, WorldSeed};
pub use pipeline::{GenerationReport, IslandGenerator};
pub use sampling::{boundary_points, generate_points, PointSampler};
