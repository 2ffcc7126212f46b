//! # Hydrology
//!
//! Downslope flow accumulation.
//!
//! ## Algorithm
//!
//! 1. Moist land above sea level starts with a little flow
//! 2. Sites are visited from highest to lowest elevation; each one routes
//!    its flow to the neighbor with the steepest drop
//! 3. Routing to land accumulates flow there; water sites are sinks
//! 4. Strong flows record river segments and soak the ground
//!
//! The visiting order is the whole point: a site has received every
//! upstream contribution before it routes its own flow onward.

use serde::{Deserialize, Serialize};

use crate::mesh::{MeshData, RiverSegment};

/// How downslope candidates are found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborStrategy {
    /// Every site within 15% of the shorter box side.
    #[default]
    Radius,
    /// Delaunay neighbors only (falls back to `Radius` without edges).
    MeshAdjacency,
}

/// Summary of one hydrology pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HydrologyStats {
    /// Sites that started with flow.
    pub sources: usize,
    /// Sites that routed flow to a neighbor.
    pub routed: usize,
    /// River segments recorded.
    pub segments: usize,
    /// Largest accumulated flow.
    pub max_flow: f64,
}

/// Routes surface water downhill and records rivers.
#[derive(Clone, Copy, Debug)]
pub struct HydrologySolver {
    /// Flow at or above which a river segment is recorded.
    min_flow_for_river: f64,
    /// Candidate search.
    strategy: NeighborStrategy,
}

impl Default for HydrologySolver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_FLOW_FOR_RIVER)
    }
}

impl HydrologySolver {
    /// Default river threshold.
    pub const DEFAULT_MIN_FLOW_FOR_RIVER: f64 = 0.01;

    /// Flow below this is ignored.
    const FLOW_EPSILON: f64 = 1e-5;
    /// Moisture from which land sites start with flow.
    const SOURCE_MOISTURE: f64 = 0.3;
    /// Share of moisture turned into initial flow.
    const SOURCE_FLOW_FACTOR: f64 = 0.1;
    /// Search radius as a share of the shorter box side.
    const RADIUS_FACTOR: f64 = 0.15;
    /// Moisture gained per unit of river flow.
    const SOAK_FACTOR: f64 = 2.0;

    /// Creates a solver using the radius strategy.
    #[must_use]
    pub const fn new(min_flow_for_river: f64) -> Self {
        Self {
            min_flow_for_river,
            strategy: NeighborStrategy::Radius,
        }
    }

    /// Sets the candidate search strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: NeighborStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Runs the pass, overwriting flow, downslope links and rivers.
    pub fn generate_rivers(&self, mesh: &mut MeshData) -> HydrologyStats {
        let mut stats = HydrologyStats::default();
        mesh.river_segments.clear();

        for site in &mut mesh.sites {
            site.downslope = None;
            site.river_flow = if !site.is_water
                && site.moisture >= Self::SOURCE_MOISTURE
                && site.elevation > 0.0
            {
                stats.sources += 1;
                site.moisture * Self::SOURCE_FLOW_FACTOR
            } else {
                0.0
            };
        }

        let candidates = self.candidates(mesh);

        let mut order: Vec<usize> = (0..mesh.sites.len()).collect();
        // Stable: equal elevations keep id order.
        order.sort_by(|&a, &b| mesh.sites[b].elevation.total_cmp(&mesh.sites[a].elevation));

        for &id in &order {
            let site = &mesh.sites[id];
            if site.is_water || site.river_flow < Self::FLOW_EPSILON {
                continue;
            }

            let Some(target) = candidates.steepest_drop(mesh, id) else {
                continue;
            };

            let flow = site.river_flow;
            mesh.sites[id].downslope = Some(target);
            stats.routed += 1;

            if !mesh.sites[target].is_water {
                mesh.sites[target].river_flow += flow;
            }
            if flow >= self.min_flow_for_river {
                mesh.river_segments.push(RiverSegment { from: id, to: target });
            }
        }

        for site in &mut mesh.sites {
            stats.max_flow = stats.max_flow.max(site.river_flow);
            if !site.is_water && site.river_flow >= self.min_flow_for_river {
                site.moisture = (site.moisture + site.river_flow * Self::SOAK_FACTOR).min(1.0);
            }
        }

        stats.segments = mesh.river_segments.len();
        tracing::debug!(
            sources = stats.sources,
            routed = stats.routed,
            segments = stats.segments,
            max_flow = stats.max_flow,
            strategy = ?self.strategy,
            "rivers generated"
        );
        stats
    }

    fn candidates(&self, mesh: &MeshData) -> Candidates {
        match self.strategy {
            NeighborStrategy::MeshAdjacency if !mesh.edges.is_empty() => {
                Candidates::Adjacent(mesh.site_neighbors())
            }
            strategy => {
                if strategy == NeighborStrategy::MeshAdjacency {
                    tracing::debug!("mesh has no edges; using radius search");
                }
                let r = Self::RADIUS_FACTOR * mesh.bounds.width().min(mesh.bounds.height());
                Candidates::Radius(r * r)
            }
        }
    }
}

/// Where downslope candidates come from.
enum Candidates {
    /// Squared search radius.
    Radius(f64),
    /// Per-site neighbor lists, sorted by id.
    Adjacent(Vec<Vec<usize>>),
}

impl Candidates {
    /// Lower neighbor with the largest drop; the lowest id wins ties.
    fn steepest_drop(&self, mesh: &MeshData, id: usize) -> Option<usize> {
        let origin = &mesh.sites[id];
        let mut best = None;
        let mut best_drop = 0.0;

        let mut consider = |other: usize| {
            let drop = origin.elevation - mesh.sites[other].elevation;
            if drop > best_drop {
                best_drop = drop;
                best = Some(other);
            }
        };

        match self {
            Self::Radius(radius_sq) => {
                for other in &mesh.sites {
                    if other.id != id && origin.position.distance_sq(other.position) < *radius_sq {
                        consider(other.id);
                    }
                }
            }
            Self::Adjacent(neighbors) => {
                for &other in &neighbors[id] {
                    consider(other);
                }
            }
        }
        best
    }
}
