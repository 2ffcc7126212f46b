//! # Elevation Field
//!
//! Fractal noise shaped by a radial island mask.
//!
//! Each site's elevation depends only on the seed, its position, the box
//! and the mask exponent, so sites can be processed in any order.

use crate::geometry::{Bounds, Point2};
use crate::mesh::MeshData;
use crate::noise::SimplexNoise;

/// Elevation at or above which a site is land.
pub const WATER_LEVEL: f64 = 0.0;

/// Assigns elevation and the land/water split.
pub struct ElevationField<'a> {
    /// Elevation noise channel.
    noise: &'a SimplexNoise,
    /// Base frequency applied to normalized coordinates.
    frequency: f64,
}

impl<'a> ElevationField<'a> {
    /// Default mask exponent.
    pub const DEFAULT_ISLAND_EXPONENT: f64 = 2.0;
    /// Default base frequency.
    pub const DEFAULT_FREQUENCY: f64 = 1.0;

    /// Octave count.
    const OCTAVES: u32 = 4;
    /// Amplitude decay per octave.
    const PERSISTENCE: f64 = 0.5;
    /// Frequency growth per octave.
    const LACUNARITY: f64 = 2.0;

    /// Creates a field over the given noise channel.
    #[must_use]
    pub const fn new(noise: &'a SimplexNoise, frequency: f64) -> Self {
        Self { noise, frequency }
    }

    /// Elevation of a single point.
    ///
    /// A point with a non-finite coordinate is deep water (`-1`).
    #[must_use]
    pub fn elevation_at(&self, point: Point2, bounds: &Bounds, island_exponent: f64) -> f64 {
        if !point.is_finite() {
            return -1.0;
        }
        let (nx, ny) = bounds.normalize(point);
        let n = self.noise.octaved(
            nx * self.frequency,
            ny * self.frequency,
            Self::OCTAVES,
            Self::PERSISTENCE,
            Self::LACUNARITY,
        );
        let height = (n + 1.0) * 0.5;

        let max_distance = bounds.half_diagonal();
        let ratio = if max_distance > 0.0 {
            point.distance(bounds.center()) / max_distance
        } else {
            0.0
        };
        let mask = (1.0 - ratio.powf(island_exponent)).clamp(0.0, 1.0);

        height * mask * 2.0 - 1.0
    }

    /// Sets `elevation` and `is_water` on every site.
    pub fn assign(&self, mesh: &mut MeshData, island_exponent: f64) {
        let bounds = mesh.bounds;
        for site in &mut mesh.sites {
            site.elevation = self.elevation_at(site.position, &bounds, island_exponent);
            site.is_water = site.elevation < WATER_LEVEL;
        }
        tracing::debug!(
            sites = mesh.sites.len(),
            land = mesh.land_count(),
            island_exponent,
            "elevation assigned"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{NoiseBank, WorldSeed};

    #[test]
    fn test_pure_function() {
        let bank = NoiseBank::new(WorldSeed::new(12345));
        let field = ElevationField::new(&bank.elevation, 1.0);
        let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);

        for i in 0..50 {
            let p = Point2::new(f64::from(i) * 1.9, f64::from(i) * 1.3);
            let a = field.elevation_at(p, &bounds, 2.0);
            let b = field.elevation_at(p, &bounds, 2.0);
            assert_eq!(a.to_bits(), b.to_bits());
            assert!((-1.0..=1.0).contains(&a));
        }
    }

    #[test]
    fn test_corners_are_water() {
        let bank = NoiseBank::new(WorldSeed::new(7));
        let field = ElevationField::new(&bank.elevation, 1.0);
        let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);

        // Mask is zero at the half-diagonal.
        for corner in [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)] {
            let e = field.elevation_at(Point2::new(corner.0, corner.1), &bounds, 2.0);
            assert!(e < -0.999_999, "corner elevation {e}");
        }
    }

    #[test]
    fn test_water_flag_matches_elevation() {
        let bank = NoiseBank::new(WorldSeed::new(3));
        let points: Vec<Point2> = (0..100)
            .map(|i| Point2::new(f64::from(i % 10) * 10.0 + 5.0, f64::from(i / 10) * 10.0 + 5.0))
            .collect();
        let mut mesh = MeshData::new(WorldSeed::new(3), Bounds::new(0.0, 0.0, 100.0, 100.0), &points);

        ElevationField::new(&bank.elevation, 1.0).assign(&mut mesh, 2.0);

        for site in &mesh.sites {
            assert_eq!(site.is_water, site.elevation < 0.0);
        }
    }

    #[test]
    fn test_order_independent() {
        let bank = NoiseBank::new(WorldSeed::new(11));
        let field = ElevationField::new(&bank.elevation, 1.0);
        let bounds = Bounds::new(0.0, 0.0, 50.0, 50.0);
        let forward = [Point2::new(10.0, 10.0), Point2::new(25.0, 30.0), Point2::new(40.0, 5.0)];

        let mut a = MeshData::new(WorldSeed::new(11), bounds, &forward);
        let reversed: Vec<Point2> = forward.iter().rev().copied().collect();
        let mut b = MeshData::new(WorldSeed::new(11), bounds, &reversed);
        field.assign(&mut a, 2.0);
        field.assign(&mut b, 2.0);

        for i in 0..3 {
            assert_eq!(a.sites[i].elevation, b.sites[2 - i].elevation);
        }
    }

    #[test]
    fn test_degenerate_bounds_stay_total() {
        let bank = NoiseBank::new(WorldSeed::new(5));
        let field = ElevationField::new(&bank.elevation, 1.0);
        let point = Point2::new(3.0, 3.0);
        let e = field.elevation_at(point, &Bounds::new(3.0, 3.0, 3.0, 3.0), 2.0);
        assert!(e.is_finite());
    }

    #[test]
    fn test_non_finite_point_is_deep_water() {
        let bank = NoiseBank::new(WorldSeed::new(4));
        let field = ElevationField::new(&bank.elevation, 1.0);
        let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);

        for p in [Point2::new(f64::INFINITY, 50.0), Point2::new(50.0, f64::NAN)] {
            assert_eq!(field.elevation_at(p, &bounds, 2.0), -1.0);
        }
    }
}
