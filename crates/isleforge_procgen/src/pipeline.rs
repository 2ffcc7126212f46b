//! # Island Pipeline
//!
//! Runs every stage in order over one mesh:
//!
//! ```text
//! sample -> triangulate -> elevation -> biomes -> rivers -> features
//! ```
//!
//! A failed triangulation is recorded on the report and the remaining
//! stages still run over the bare sites.

use std::time::Instant;

use crate::biome::BiomeClassifier;
use crate::config::GenerationConfig;
use crate::elevation::ElevationField;
use crate::error::{ProcgenError, ProcgenResult};
use crate::features::{EntitySpawner, FeatureScatter, PlacedFeature};
use crate::geometry::Point2;
use crate::hydrology::{HydrologySolver, HydrologyStats};
use crate::mesh::{MeshBuilder, MeshData};
use crate::noise::{NoiseBank, WorldSeed};
use crate::sampling::{boundary_points, PointSampler};

/// Everything one run produced.
#[derive(Debug)]
pub struct GenerationReport {
    /// The annotated mesh.
    pub mesh: MeshData,
    /// Why triangulation failed, if it did.
    pub triangulation_error: Option<ProcgenError>,
    /// Hydrology summary.
    pub hydrology: HydrologyStats,
    /// Feature placements.
    pub features: Vec<PlacedFeature>,
}

/// Generates islands from a validated config.
#[derive(Clone, Debug)]
pub struct IslandGenerator {
    config: GenerationConfig,
}

impl IslandGenerator {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns [`ProcgenError::InvalidConfig`] if the config fails validation.
    pub fn new(config: GenerationConfig) -> ProcgenResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The config in use.
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Runs the whole pipeline.
    pub fn generate<S: EntitySpawner>(&self, spawner: &mut S) -> GenerationReport {
        let seed = WorldSeed::new(self.config.seed);
        let (points, ring_start) = self.sample_sites(seed);
        self.run(seed, &points, ring_start, spawner)
    }

    /// Runs every stage after sampling over caller-supplied sites.
    ///
    /// The sites are used as given, so this is the path on which the mesh
    /// stage can fail (for example on a non-finite coordinate). The later
    /// stages still run and the error lands on the report.
    pub fn generate_from_sites<S: EntitySpawner>(
        &self,
        sites: &[Point2],
        spawner: &mut S,
    ) -> GenerationReport {
        self.run(WorldSeed::new(self.config.seed), sites, sites.len(), spawner)
    }

    fn run<S: EntitySpawner>(
        &self,
        seed: WorldSeed,
        points: &[Point2],
        ring_start: usize,
        spawner: &mut S,
    ) -> GenerationReport {
        let config = &self.config;
        let start = Instant::now();
        let noise = NoiseBank::new(seed);

        let mut mesh = MeshData::new(seed, config.bounds, points);
        let triangulation_error = MeshBuilder::new().build(&mut mesh).err();
        if let Some(err) = &triangulation_error {
            tracing::warn!(%err, "mesh stage failed; continuing without triangles");
        }
        // After the build, which resets boundary flags to the hull.
        for site in &mut mesh.sites[ring_start..] {
            site.is_boundary = true;
        }

        ElevationField::new(&noise.elevation, config.elevation_frequency)
            .assign(&mut mesh, config.island_exponent);
        BiomeClassifier::new(&noise, config.base_rainfall, config.wind_angle_deg).assign(&mut mesh);
        let hydrology = HydrologySolver::new(config.min_flow_for_river)
            .with_strategy(config.neighbor_strategy)
            .generate_rivers(&mut mesh);
        let features = FeatureScatter::new(&noise.placement).place(&mesh, spawner);

        tracing::info!(
            seed = config.seed,
            sites = mesh.sites.len(),
            land = mesh.land_count(),
            triangles = mesh.triangles.len(),
            rivers = hydrology.segments,
            features = features.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "island generated"
        );

        GenerationReport {
            mesh,
            triangulation_error,
            hydrology,
            features,
        }
    }

    /// Poisson sites followed by the optional boundary ring, plus the
    /// index where the ring starts.
    fn sample_sites(&self, seed: WorldSeed) -> (Vec<Point2>, usize) {
        let config = &self.config;
        let mut points = PointSampler::new(config.min_distance)
            .with_attempts(config.attempts)
            .generate(&config.bounds, seed);
        let ring_start = points.len();
        if let Some(spacing) = config.boundary_spacing {
            points.extend(boundary_points(&config.bounds, spacing));
        }
        (points, ring_start)
    }
}
