//! # Point Sampling
//!
//! Blue-noise site generation with Bridson's Poisson disk algorithm.
//!
//! ## Guarantees
//!
//! - Every returned point lies in `[min, max)` of the bounds
//! - Every pair of points is at least `min_distance` apart
//! - Same bounds, distance, attempts and seed = same points, same order
//!
//! The background grid uses cells of `min_distance / sqrt(2)`, so a cell
//! holds at most one point and a 5x5 cell window covers every point that
//! could be closer than `min_distance`.

use std::f64::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::geometry::{Bounds, Point2};
use crate::noise::WorldSeed;

/// Poisson disk sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointSampler {
    /// Minimum distance between any two points.
    min_distance: f64,
    /// Candidates tried around an active point before retiring it (`k`).
    attempts: u32,
}

impl PointSampler {
    /// Default candidate attempts per active point.
    pub const DEFAULT_ATTEMPTS: u32 = 30;

    /// Creates a sampler with the default attempt count.
    #[must_use]
    pub const fn new(min_distance: f64) -> Self {
        Self {
            min_distance,
            attempts: Self::DEFAULT_ATTEMPTS,
        }
    }

    /// Sets the candidate attempt count (`k`).
    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Generates the point set.
    ///
    /// Returns an empty set for bounds without positive area and for a
    /// non-positive or non-finite `min_distance`. A distance at or beyond
    /// the box diagonal yields the first point only.
    #[must_use]
    pub fn generate(&self, bounds: &Bounds, seed: WorldSeed) -> Vec<Point2> {
        let r = self.min_distance;
        if !bounds.has_area() || !r.is_finite() || r <= 0.0 {
            tracing::debug!(?bounds, min_distance = r, "poisson sampling skipped: degenerate input");
            return Vec::new();
        }
        // No two points of the half-open box are a full diagonal apart.
        let r = r.min(bounds.half_diagonal() * 2.0);

        let mut rng = ChaCha8Rng::seed_from_u64(seed.value());
        let mut grid = BackgroundGrid::new(bounds, r / std::f64::consts::SQRT_2);
        let mut samples = Vec::new();
        let mut active: Vec<usize> = Vec::new();

        let first = Point2::new(
            rng.gen_range(bounds.min_x..bounds.max_x),
            rng.gen_range(bounds.min_y..bounds.max_y),
        );
        grid.insert(first, 0);
        samples.push(first);
        active.push(0);

        let r_sq = r * r;

        while !active.is_empty() {
            let slot = rng.gen_range(0..active.len());
            let origin = samples[active[slot]];

            let mut accepted = None;
            for _ in 0..self.attempts {
                // Area-uniform radius in [r, 2r)
                let angle = rng.gen_range(0.0..TAU);
                let radius = r * rng.gen_range(1.0..4.0_f64).sqrt();
                let candidate = Point2::new(
                    origin.x + angle.cos() * radius,
                    origin.y + angle.sin() * radius,
                );

                if in_half_open_bounds(bounds, candidate)
                    && grid.is_clear(candidate, &samples, r_sq)
                {
                    accepted = Some(candidate);
                    break;
                }
            }

            match accepted {
                Some(point) => {
                    let index = samples.len();
                    grid.insert(point, index);
                    samples.push(point);
                    active.push(index);
                }
                None => {
                    active.swap_remove(slot);
                }
            }
        }

        tracing::debug!(points = samples.len(), min_distance = r, "poisson sampling complete");
        samples
    }
}

/// Generates Poisson points with the default attempt count.
#[must_use]
pub fn generate_points(bounds: &Bounds, spacing: f64, seed: WorldSeed) -> Vec<Point2> {
    PointSampler::new(spacing).generate(bounds, seed)
}

/// Generates an evenly spaced ring of points along the box edges.
///
/// Walks top, right, bottom, left starting at the minimum corner. Each
/// edge stops one step short of the next corner, so corners appear once.
#[must_use]
pub fn boundary_points(bounds: &Bounds, spacing: f64) -> Vec<Point2> {
    if !bounds.has_area() || !spacing.is_finite() || spacing <= 0.0 {
        return Vec::new();
    }

    let steps = |extent: f64| -> u32 {
        // Count of offsets `i * spacing` strictly below `extent`.
        let mut n = 0u32;
        while f64::from(n) * spacing < extent {
            n += 1;
        }
        n
    };
    let across = steps(bounds.width());
    let down = steps(bounds.height());

    let mut points = Vec::with_capacity(2 * (across + down) as usize);
    for i in 0..across {
        points.push(Point2::new(bounds.min_x + f64::from(i) * spacing, bounds.min_y));
    }
    for i in 0..down {
        points.push(Point2::new(bounds.max_x, bounds.min_y + f64::from(i) * spacing));
    }
    for i in 0..across {
        points.push(Point2::new(bounds.max_x - f64::from(i) * spacing, bounds.max_y));
    }
    for i in 0..down {
        points.push(Point2::new(bounds.min_x, bounds.max_y - f64::from(i) * spacing));
    }
    points
}

#[inline]
fn in_half_open_bounds(bounds: &Bounds, p: Point2) -> bool {
    p.x >= bounds.min_x && p.x < bounds.max_x && p.y >= bounds.min_y && p.y < bounds.max_y
}

/// Uniform acceleration grid; each cell stores at most one sample index.
struct BackgroundGrid {
    origin: Point2,
    cell: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Option<usize>>,
}

impl BackgroundGrid {
    fn new(bounds: &Bounds, cell: f64) -> Self {
        let cols = ((bounds.width() / cell).ceil() as usize).max(1);
        let rows = ((bounds.height() / cell).ceil() as usize).max(1);
        Self {
            origin: Point2::new(bounds.min_x, bounds.min_y),
            cell,
            cols,
            rows,
            cells: vec![None; cols * rows],
        }
    }

    #[inline]
    fn cell_of(&self, p: Point2) -> (usize, usize) {
        let gx = ((p.x - self.origin.x) / self.cell).floor().max(0.0) as usize;
        let gy = ((p.y - self.origin.y) / self.cell).floor().max(0.0) as usize;
        (gx.min(self.cols - 1), gy.min(self.rows - 1))
    }

    fn insert(&mut self, p: Point2, index: usize) {
        let (gx, gy) = self.cell_of(p);
        self.cells[gy * self.cols + gx] = Some(index);
    }

    /// True when no stored sample in the 5x5 window is closer than `sqrt(r_sq)`.
    fn is_clear(&self, p: Point2, samples: &[Point2], r_sq: f64) -> bool {
        let (gx, gy) = self.cell_of(p);
        let x_range = gx.saturating_sub(2)..=(gx + 2).min(self.cols - 1);
        for y in gy.saturating_sub(2)..=(gy + 2).min(self.rows - 1) {
            for x in x_range.clone() {
                if let Some(index) = self.cells[y * self.cols + x] {
                    if samples[index].distance_sq(p) < r_sq {
                        return false;
                    }
                }
            }
        }
        true
    }
}
