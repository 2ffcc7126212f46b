//! # Island Mesh
//!
//! The arena every stage mutates, plus the [`MeshBuilder`] that fills in
//! its triangles, edges and Voronoi regions.
//!
//! Sites live in one `Vec` and refer to each other by index. A site's
//! `id` always equals its index; no stage reorders or removes sites.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::biome::Biome;
use crate::delaunay::{next_halfedge, Triangulation, EMPTY};
use crate::error::ProcgenResult;
use crate::geometry::{Bounds, Point2};
use crate::noise::WorldSeed;

/// A point of the mesh with its terrain attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Stable id (equal to the index in [`MeshData::sites`]).
    pub id: usize,
    /// World position.
    pub position: Point2,
    /// True for sites on the outer ring or the convex hull.
    pub is_boundary: bool,
    /// Elevation, roughly in `[-1, 1]`.
    pub elevation: f64,
    /// True exactly when `elevation < 0`.
    pub is_water: bool,
    /// Rainfall in `[0, 1]`.
    pub rainfall: f64,
    /// Moisture in `[0, 1]`.
    pub moisture: f64,
    /// Terrain classification.
    pub biome: Biome,
    /// Accumulated surface flow.
    pub river_flow: f64,
    /// Neighbor receiving this site's flow.
    pub downslope: Option<usize>,
}

impl Site {
    /// Creates an unclassified site.
    #[must_use]
    pub fn new(id: usize, position: Point2) -> Self {
        Self {
            id,
            position,
            is_boundary: false,
            elevation: 0.0,
            is_water: false,
            rainfall: 0.0,
            moisture: 0.0,
            biome: Biome::Unknown,
            river_flow: 0.0,
            downslope: None,
        }
    }
}

/// A triangle of the Delaunay mesh (counter-clockwise).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    /// Triangle index.
    pub id: usize,
    /// Site ids.
    pub sites: [usize; 3],
}

/// An undirected Delaunay edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Edge index.
    pub id: usize,
    /// Lower site id.
    pub a: usize,
    /// Higher site id.
    pub b: usize,
}

/// The Voronoi cell around one site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region id (same as its site).
    pub id: usize,
    /// Site position.
    pub centroid: Point2,
    /// Circumcenters of the triangles around the site, in fan order.
    /// Open (not closed) for hull sites.
    pub vertices: Vec<Point2>,
    /// Delaunay-adjacent site ids.
    pub neighbors: Vec<usize>,
}

/// A directed river step from a site to its downslope neighbor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiverSegment {
    /// Upstream site.
    pub from: usize,
    /// Downstream site.
    pub to: usize,
}

/// The island being generated.
#[derive(Clone, Debug)]
pub struct MeshData {
    /// Generation seed.
    pub seed: WorldSeed,
    /// World box.
    pub bounds: Bounds,
    /// Sites, indexed by id.
    pub sites: Vec<Site>,
    /// Delaunay triangles.
    pub triangles: Vec<Triangle>,
    /// Unique Delaunay edges.
    pub edges: Vec<Edge>,
    /// One region per site.
    pub regions: Vec<Region>,
    /// River steps recorded by the hydrology stage.
    pub river_segments: Vec<RiverSegment>,
    triangulation: Option<Triangulation>,
}

impl MeshData {
    /// Creates a mesh with one unclassified site per point.
    #[must_use]
    pub fn new(seed: WorldSeed, bounds: Bounds, points: &[Point2]) -> Self {
        let sites = points
            .iter()
            .enumerate()
            .map(|(id, &p)| Site::new(id, p))
            .collect();
        let regions = points
            .iter()
            .enumerate()
            .map(|(id, &p)| Region {
                id,
                centroid: p,
                vertices: Vec::new(),
                neighbors: Vec::new(),
            })
            .collect();

        Self {
            seed,
            bounds,
            sites,
            triangles: Vec::new(),
            edges: Vec::new(),
            regions,
            river_segments: Vec::new(),
            triangulation: None,
        }
    }

    /// Site positions, by id.
    #[must_use]
    pub fn positions(&self) -> Vec<Point2> {
        self.sites.iter().map(|s| s.position).collect()
    }

    /// Half-edge structure from the last successful build.
    #[must_use]
    pub fn triangulation(&self) -> Option<&Triangulation> {
        self.triangulation.as_ref()
    }

    /// Adjacency lists derived from `edges` (sorted by id).
    #[must_use]
    pub fn site_neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.sites.len()];
        for edge in &self.edges {
            neighbors[edge.a].push(edge.b);
            neighbors[edge.b].push(edge.a);
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }
        neighbors
    }

    /// Closest site to `point`; lowest id on ties.
    #[must_use]
    pub fn nearest_site(&self, point: Point2) -> Option<usize> {
        let mut best = None;
        let mut best_d = f64::INFINITY;
        for site in &self.sites {
            let d = site.position.distance_sq(point);
            if d < best_d {
                best_d = d;
                best = Some(site.id);
            }
        }
        best
    }

    /// Number of land sites.
    #[must_use]
    pub fn land_count(&self) -> usize {
        self.sites.iter().filter(|s| !s.is_water).count()
    }

    /// Drops everything the mesh stage derives, hull flags included.
    fn clear_topology(&mut self) {
        self.triangles.clear();
        self.edges.clear();
        self.triangulation = None;
        for site in &mut self.sites {
            site.is_boundary = false;
        }
        for region in &mut self.regions {
            region.vertices.clear();
            region.neighbors.clear();
        }
    }
}

/// Connects the mesh sites with a Delaunay triangulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshBuilder;

impl MeshBuilder {
    /// Creates a builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Fills triangles, edges and regions from the site positions.
    ///
    /// Fewer than three sites leaves the topology empty. Hull sites are
    /// marked as boundary.
    ///
    /// # Errors
    ///
    /// Returns [`ProcgenError::NonFiniteCoordinate`](crate::ProcgenError::NonFiniteCoordinate)
    /// when a site position is NaN or infinite. The topology is left empty.
    pub fn build(&self, mesh: &mut MeshData) -> ProcgenResult<()> {
        mesh.clear_topology();

        if mesh.sites.len() < 3 {
            tracing::debug!(sites = mesh.sites.len(), "too few sites to triangulate");
            return Ok(());
        }

        let triangulation = match Triangulation::new(&mesh.positions()) {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(%err, "triangulation input rejected");
                return Err(err);
            }
        };

        mesh.triangles = (0..triangulation.triangle_count())
            .map(|id| Triangle {
                id,
                sites: triangulation.triangle(id),
            })
            .collect();
        mesh.edges = unique_edges(&triangulation);

        let inedges = triangulation.incoming_edges();
        let neighbors = triangulation.neighbors();
        for (region, (&start, around)) in mesh
            .regions
            .iter_mut()
            .zip(inedges.iter().zip(neighbors))
        {
            region.vertices = triangulation
                .edges_around_point(start)
                .into_iter()
                .map(|e| triangulation.circumcenter(e / 3))
                .collect();
            region.neighbors = around;
        }

        for &site in triangulation.hull() {
            mesh.sites[site].is_boundary = true;
        }

        tracing::debug!(
            triangles = mesh.triangles.len(),
            edges = mesh.edges.len(),
            hull = triangulation.hull().len(),
            "mesh built"
        );

        mesh.triangulation = Some(triangulation);
        Ok(())
    }
}

/// Each undirected edge once, in half-edge order.
fn unique_edges(triangulation: &Triangulation) -> Vec<Edge> {
    let triangles = triangulation.triangles();
    let halfedges = triangulation.halfedges();
    let mut seen = HashSet::new();
    let mut edges = Vec::with_capacity(triangles.len() / 2 + 1);

    for e in 0..triangles.len() {
        // Interior edges are visited twice; keep the larger half-edge.
        if halfedges[e] != EMPTY && halfedges[e] > e {
            continue;
        }
        let (p, q) = (triangles[e], triangles[next_halfedge(e)]);
        let (a, b) = if p < q { (p, q) } else { (q, p) };
        if seen.insert((a, b)) {
            edges.push(Edge { id: edges.len(), a, b });
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_of(raw: &[(f64, f64)]) -> MeshData {
        let points: Vec<Point2> = raw.iter().map(|&(x, y)| Point2::new(x, y)).collect();
        MeshData::new(WorldSeed::new(1), Bounds::new(0.0, 0.0, 100.0, 100.0), &points)
    }

    #[test]
    fn test_new_mesh_ids_match_indices() {
        let mesh = mesh_of(&[(1.0, 1.0), (5.0, 5.0), (9.0, 2.0)]);
        for (i, site) in mesh.sites.iter().enumerate() {
            assert_eq!(site.id, i);
            assert_eq!(site.biome, Biome::Unknown);
            assert_eq!(site.downslope, None);
        }
        assert_eq!(mesh.regions.len(), 3);
        assert!(mesh.triangulation().is_none());
    }

    #[test]
    fn test_three_sites_one_triangle() {
        let mut mesh = mesh_of(&[(10.0, 10.0), (50.0, 10.0), (30.0, 40.0)]);
        MeshBuilder::new().build(&mut mesh).unwrap();

        assert_eq!(mesh.triangles.len(), 1);
        let mut ids = mesh.triangles[0].sites;
        ids.sort_unstable();
        assert_eq!(ids, [0, 1, 2]);
        assert_eq!(mesh.edges.len(), 3);
        assert!(mesh.sites.iter().all(|s| s.is_boundary));
    }

    #[test]
    fn test_two_sites_is_empty_not_error() {
        let mut mesh = mesh_of(&[(10.0, 10.0), (50.0, 10.0)]);
        MeshBuilder::new().build(&mut mesh).unwrap();
        assert!(mesh.triangles.is_empty());
        assert!(mesh.edges.is_empty());
    }

    #[test]
    fn test_non_finite_site_fails_build() {
        let mut mesh = mesh_of(&[(10.0, 10.0), (f64::INFINITY, 10.0), (30.0, 40.0)]);
        assert!(MeshBuilder::new().build(&mut mesh).is_err());
        assert!(mesh.triangles.is_empty());
        assert!(mesh.triangulation().is_none());
    }

    #[test]
    fn test_edges_are_unique_and_neighbors_symmetric() {
        let mut mesh = mesh_of(&[
            (0.0, 0.0),
            (40.0, 0.0),
            (40.0, 40.0),
            (0.0, 40.0),
            (20.0, 21.0),
        ]);
        MeshBuilder::new().build(&mut mesh).unwrap();

        assert_eq!(mesh.triangles.len(), 4);
        assert_eq!(mesh.edges.len(), 8);

        let neighbors = mesh.site_neighbors();
        assert_eq!(neighbors[4], vec![0, 1, 2, 3]);
        for (site, list) in neighbors.iter().enumerate() {
            for &other in list {
                assert!(neighbors[other].contains(&site));
            }
        }
        assert!(!mesh.sites[4].is_boundary);
        assert_eq!(mesh.regions[4].vertices.len(), 4);
    }

    #[test]
    fn test_rebuild_resets_hull_flags() {
        let mut mesh = mesh_of(&[(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0), (20.0, 21.0)]);
        MeshBuilder::new().build(&mut mesh).unwrap();
        assert!(mesh.sites[0].is_boundary);

        // Move the corner inside the others' hull and rebuild.
        mesh.sites[0].position = Point2::new(20.0, 19.0);
        mesh.sites[4].position = Point2::new(20.0, -10.0);
        MeshBuilder::new().build(&mut mesh).unwrap();
        assert!(!mesh.sites[0].is_boundary);
        assert!(mesh.sites[4].is_boundary);

        // A failed build leaves no hull behind.
        mesh.sites[2].position = Point2::new(f64::NAN, 0.0);
        assert!(MeshBuilder::new().build(&mut mesh).is_err());
        assert!(mesh.sites.iter().all(|s| !s.is_boundary));
    }

    #[test]
    fn test_nearest_site() {
        let mesh = mesh_of(&[(10.0, 10.0), (90.0, 90.0)]);
        assert_eq!(mesh.nearest_site(Point2::new(20.0, 5.0)), Some(0));
        assert_eq!(mesh.nearest_site(Point2::new(70.0, 99.0)), Some(1));
        assert_eq!(mesh_of(&[]).nearest_site(Point2::new(0.0, 0.0)), None);
    }
}
