//! # Feature Scatter
//!
//! Noise-gated placement of trees and rocks.
//!
//! Each land site runs two independent trials. A trial fires when the
//! placement noise, remapped to `[0, 1]`, exceeds `1 - chance` for the
//! site's biome. The entity itself is created by an [`EntitySpawner`]
//! supplied by the caller.
//!
//! Noise is sampled at positions relative to the box minimum, so a world
//! far from the origin scatters the same way as one at the origin.

use serde::{Deserialize, Serialize};

use crate::biome::Biome;
use crate::geometry::Point2;
use crate::mesh::MeshData;
use crate::noise::SimplexNoise;

/// Creates world entities for placed features.
pub trait EntitySpawner {
    /// Handle to a created entity.
    type Handle;

    /// Creates an entity of `kind` at `position`; `None` if declined.
    fn create_entity_at(&mut self, kind: &str, position: Point2) -> Option<Self::Handle>;
}

/// Decorative feature kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// A tree.
    Tree,
    /// A boulder.
    Rock,
}

impl FeatureKind {
    /// Entity kind passed to the spawner.
    #[must_use]
    pub const fn entity_kind(self) -> &'static str {
        match self {
            Self::Tree => "tree_pine",
            Self::Rock => "rock_large",
        }
    }
}

/// One placement decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedFeature {
    /// Originating site.
    pub site: usize,
    /// What was placed.
    pub kind: FeatureKind,
    /// Jittered world position.
    pub position: Point2,
    /// Whether the spawner created an entity.
    pub spawned: bool,
}

/// Biome-dependent trial parameters.
struct Gate {
    /// Acceptance probability.
    chance: f64,
    /// Noise frequency.
    frequency: f64,
    /// Noise domain offset (decorrelates biomes).
    offset: f64,
}

/// Places trees and rocks on land sites.
pub struct FeatureScatter<'a> {
    /// Placement noise channel.
    noise: &'a SimplexNoise,
}

impl<'a> FeatureScatter<'a> {
    /// Largest jitter per axis, in world units.
    pub const JITTER: f64 = 5.0;

    /// Jitter noise frequency.
    const JITTER_FREQUENCY: f64 = 10.0;
    /// Jitter domain offset for rocks.
    const ROCK_JITTER_OFFSET: f64 = 20.0;

    /// Creates a scatter over the given noise channel.
    #[must_use]
    pub const fn new(noise: &'a SimplexNoise) -> Self {
        Self { noise }
    }

    fn tree_gate(biome: Biome) -> Option<Gate> {
        match biome {
            Biome::Forest => Some(Gate { chance: 0.7, frequency: 0.1, offset: 0.0 }),
            Biome::Grassland => Some(Gate { chance: 0.2, frequency: 0.1, offset: 5.0 }),
            _ => None,
        }
    }

    fn rock_gate(biome: Biome) -> Option<Gate> {
        match biome {
            Biome::Rocky => Some(Gate { chance: 0.5, frequency: 0.05, offset: 10.0 }),
            Biome::Grassland => Some(Gate { chance: 0.1, frequency: 0.05, offset: 15.0 }),
            _ => None,
        }
    }

    /// Runs both trials for every land site.
    pub fn place<S: EntitySpawner>(&self, mesh: &MeshData, spawner: &mut S) -> Vec<PlacedFeature> {
        let mut placed = Vec::new();

        let origin = Point2::new(mesh.bounds.min_x, mesh.bounds.min_y);

        for site in mesh.sites.iter().filter(|s| !s.is_water) {
            let p = site.position;
            let local = Point2::new(p.x - origin.x, p.y - origin.y);

            if let Some(gate) = Self::tree_gate(site.biome) {
                if self.fires(&gate, local) {
                    let position = Self::offset(p, self.jitter(local, 0.0));
                    placed.push(Self::spawn(spawner, site.id, FeatureKind::Tree, position));
                }
            }

            if let Some(gate) = Self::rock_gate(site.biome) {
                if self.fires(&gate, local) {
                    let position = Self::offset(p, self.jitter(local, Self::ROCK_JITTER_OFFSET));
                    placed.push(Self::spawn(spawner, site.id, FeatureKind::Rock, position));
                }
            }
        }

        tracing::debug!(
            trees = placed.iter().filter(|f| f.kind == FeatureKind::Tree).count(),
            rocks = placed.iter().filter(|f| f.kind == FeatureKind::Rock).count(),
            declined = placed.iter().filter(|f| !f.spawned).count(),
            "features placed"
        );
        placed
    }

    fn fires(&self, gate: &Gate, p: Point2) -> bool {
        let roll = self
            .noise
            .sample_unit(p.x * gate.frequency + gate.offset, p.y * gate.frequency + gate.offset);
        roll > 1.0 - gate.chance
    }

    /// Offset in `[-JITTER, JITTER]` per axis.
    fn jitter(&self, local: Point2, offset: f64) -> Point2 {
        let f = Self::JITTER_FREQUENCY;
        let dx = self.noise.sample(local.x * f + offset, local.y * f + offset) * Self::JITTER;
        let dy = self.noise.sample(local.y * f + offset, local.x * f + offset) * Self::JITTER;
        Point2::new(dx, dy)
    }

    fn offset(p: Point2, by: Point2) -> Point2 {
        Point2::new(p.x + by.x, p.y + by.y)
    }

    fn spawn<S: EntitySpawner>(
        spawner: &mut S,
        site: usize,
        kind: FeatureKind,
        position: Point2,
    ) -> PlacedFeature {
        let spawned = spawner.create_entity_at(kind.entity_kind(), position).is_some();
        PlacedFeature { site, kind, position, spawned }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::noise::{NoiseBank, WorldSeed};

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, Point2)>,
        accept: bool,
    }

    impl EntitySpawner for Recorder {
        type Handle = usize;

        fn create_entity_at(&mut self, kind: &str, position: Point2) -> Option<usize> {
            self.calls.push((kind.to_string(), position));
            self.accept.then_some(self.calls.len())
        }
    }

    fn uniform_mesh(biome: Biome, is_water: bool) -> MeshData {
        let points: Vec<Point2> = (0..400)
            .map(|i| Point2::new(f64::from(i % 20) * 7.3, f64::from(i / 20) * 6.1))
            .collect();
        let mut mesh = MeshData::new(WorldSeed::new(9), Bounds::new(0.0, 0.0, 150.0, 125.0), &points);
        for site in &mut mesh.sites {
            site.biome = biome;
            site.is_water = is_water;
            site.elevation = if is_water { -0.5 } else { 0.3 };
        }
        mesh
    }

    #[test]
    fn test_water_gets_nothing() {
        let bank = NoiseBank::new(WorldSeed::new(9));
        let mut spawner = Recorder::default();
        let placed = FeatureScatter::new(&bank.placement).place(&uniform_mesh(Biome::ShallowWater, true), &mut spawner);
        assert!(placed.is_empty());
        assert!(spawner.calls.is_empty());
    }

    #[test]
    fn test_barren_biomes_get_nothing() {
        let bank = NoiseBank::new(WorldSeed::new(9));
        for biome in [Biome::Beach, Biome::Snow] {
            let mut spawner = Recorder::default();
            let placed = FeatureScatter::new(&bank.placement).place(&uniform_mesh(biome, false), &mut spawner);
            assert!(placed.is_empty(), "{biome:?} should stay bare");
        }
    }

    #[test]
    fn test_forest_grows_trees_only() {
        let bank = NoiseBank::new(WorldSeed::new(9));
        let mut spawner = Recorder { accept: true, ..Recorder::default() };
        let mesh = uniform_mesh(Biome::Forest, false);
        let placed = FeatureScatter::new(&bank.placement).place(&mesh, &mut spawner);

        assert!(!placed.is_empty());
        assert!(placed.iter().all(|f| f.kind == FeatureKind::Tree && f.spawned));
        assert!(spawner.calls.iter().all(|(kind, _)| kind == "tree_pine"));
        // Dense forest: well over the grassland rate.
        assert!(placed.len() > mesh.sites.len() / 4, "only {} trees", placed.len());
    }

    #[test]
    fn test_rocky_places_rocks_only() {
        let bank = NoiseBank::new(WorldSeed::new(9));
        let mut spawner = Recorder::default();
        let placed = FeatureScatter::new(&bank.placement).place(&uniform_mesh(Biome::Rocky, false), &mut spawner);

        assert!(!placed.is_empty());
        assert!(placed.iter().all(|f| f.kind == FeatureKind::Rock));
        assert!(placed.iter().all(|f| !f.spawned), "spawner declined every call");
    }

    #[test]
    fn test_jitter_is_bounded() {
        let bank = NoiseBank::new(WorldSeed::new(9));
        let mesh = uniform_mesh(Biome::Grassland, false);
        let mut spawner = Recorder { accept: true, ..Recorder::default() };
        let placed = FeatureScatter::new(&bank.placement).place(&mesh, &mut spawner);

        for feature in &placed {
            let origin = mesh.sites[feature.site].position;
            assert!((feature.position.x - origin.x).abs() <= FeatureScatter::JITTER);
            assert!((feature.position.y - origin.y).abs() <= FeatureScatter::JITTER);
        }
    }

    #[test]
    fn test_deterministic() {
        let bank = NoiseBank::new(WorldSeed::new(21));
        let mesh = uniform_mesh(Biome::Grassland, false);
        let a = FeatureScatter::new(&bank.placement).place(&mesh, &mut Recorder::default());
        let b = FeatureScatter::new(&bank.placement).place(&mesh, &mut Recorder::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_tree_and_rock_gates_are_independent() {
        let bank = NoiseBank::new(WorldSeed::new(9));
        let scatter = FeatureScatter::new(&bank.placement);
        let points: Vec<Point2> = (0..3600)
            .map(|i| Point2::new(f64::from(i % 60) * 7.3, f64::from(i / 60) * 6.1))
            .collect();
        let mut mesh = MeshData::new(WorldSeed::new(9), Bounds::new(0.0, 0.0, 440.0, 370.0), &points);
        for site in &mut mesh.sites {
            site.biome = Biome::Grassland;
            site.elevation = 0.3;
        }

        let placed = scatter.place(&mesh, &mut Recorder::default());
        let tree_gate = FeatureScatter::tree_gate(Biome::Grassland).unwrap();
        let rock_gate = FeatureScatter::rock_gate(Biome::Grassland).unwrap();

        let mut both = 0;
        for site in &mesh.sites {
            let has = |kind| placed.iter().any(|f| f.site == site.id && f.kind == kind);
            let tree = has(FeatureKind::Tree);
            let rock = has(FeatureKind::Rock);
            assert_eq!(tree, scatter.fires(&tree_gate, site.position), "site {}", site.id);
            assert_eq!(rock, scatter.fires(&rock_gate, site.position), "site {}", site.id);
            if tree && rock {
                both += 1;
            }
        }
        assert!(both > 0, "no grassland site carries both a tree and a rock");
    }

    #[test]
    fn test_far_world_scatters_like_origin() {
        let bank = NoiseBank::new(WorldSeed::new(9));
        let scatter = FeatureScatter::new(&bank.placement);
        let near = uniform_mesh(Biome::Forest, false);

        let shift = 3.0e8;
        let points: Vec<Point2> = near
            .sites
            .iter()
            .map(|s| Point2::new(s.position.x + shift, s.position.y + shift))
            .collect();
        let bounds = Bounds::new(shift, shift, shift + 150.0, shift + 125.0);
        let mut far = MeshData::new(WorldSeed::new(9), bounds, &points);
        for site in &mut far.sites {
            site.biome = Biome::Forest;
            site.elevation = 0.3;
        }

        let a = scatter.place(&near, &mut Recorder::default());
        let b = scatter.place(&far, &mut Recorder::default());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!((x.site, x.kind), (y.site, y.kind));
        }
    }
}
