//! # Delaunay Triangulation
//!
//! Sweep-hull construction with recursive edge flipping.
//!
//! ## Half-edge Layout
//!
//! Triangle `t` owns half-edges `3t`, `3t + 1` and `3t + 2`. Half-edge `e`
//! starts at site `triangles[e]` and ends at `triangles[next_halfedge(e)]`.
//! `halfedges[e]` is the opposite half-edge in the neighboring triangle, or
//! [`EMPTY`] when `e` lies on the convex hull.
//!
//! Every triangle is stored counter-clockwise (y up), so the interior of a
//! triangle is on the left of each of its half-edges and the hull is walked
//! counter-clockwise through `hull_next`.
//!
//! ## Algorithm
//!
//! 1. Seed triangle: the site nearest the bounding-box center, its nearest
//!    neighbor, and the third site giving the smallest circumcircle
//! 2. Remaining sites are inserted by distance from the seed circumcenter,
//!    so every new site lies outside the current hull
//! 3. Each insertion fans triangles over the visible hull edges (found via
//!    an angular hash) and flips edges until the empty-circumcircle property
//!    holds again

use crate::error::{ProcgenError, ProcgenResult};
use crate::geometry::Point2;

/// Sentinel for "no half-edge" / "not on the hull".
pub const EMPTY: usize = usize::MAX;

/// Near-duplicate tolerance for consecutive sites in sweep order.
const EPSILON: f64 = f64::EPSILON * 2.0;

/// Next half-edge within the same triangle.
#[inline]
#[must_use]
pub const fn next_halfedge(e: usize) -> usize {
    if e % 3 == 2 { e - 2 } else { e + 1 }
}

/// Previous half-edge within the same triangle.
#[inline]
#[must_use]
pub const fn prev_halfedge(e: usize) -> usize {
    if e % 3 == 0 { e + 2 } else { e - 1 }
}

/// A Delaunay triangulation with half-edge adjacency and hull traversal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    /// Input points (site positions).
    points: Vec<Point2>,
    /// Site index for each half-edge start; three per triangle.
    triangles: Vec<usize>,
    /// Opposite half-edge, or `EMPTY` on the hull.
    halfedges: Vec<usize>,
    /// Hull sites in counter-clockwise order.
    hull: Vec<usize>,
    /// Next hull site per site (`EMPTY` when not on the hull).
    hull_next: Vec<usize>,
    /// Previous hull site per site (`EMPTY` when not on the hull).
    hull_prev: Vec<usize>,
}

impl Triangulation {
    /// Triangulates a flat `[x0, y0, x1, y1, ...]` buffer.
    ///
    /// # Errors
    ///
    /// - [`ProcgenError::MismatchedCoordinates`] if the buffer length is odd
    /// - [`ProcgenError::NonFiniteCoordinate`] if any coordinate is NaN or infinite
    pub fn from_coords(coords: &[f64]) -> ProcgenResult<Self> {
        if coords.len() % 2 != 0 {
            return Err(ProcgenError::MismatchedCoordinates { len: coords.len() });
        }
        let points: Vec<Point2> = coords
            .chunks_exact(2)
            .map(|pair| Point2::new(pair[0], pair[1]))
            .collect();
        Self::new(&points)
    }

    /// Triangulates a point set.
    ///
    /// Fewer than three points, fully collinear input, and coincident
    /// points produce no triangles (not an error).
    ///
    /// # Errors
    ///
    /// Returns [`ProcgenError::NonFiniteCoordinate`] if any point is NaN or infinite.
    pub fn new(points: &[Point2]) -> ProcgenResult<Self> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(ProcgenError::NonFiniteCoordinate { index });
        }
        Ok(Sweep::run(points))
    }

    /// Input points.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Flat triangle list: sites `[3t, 3t + 1, 3t + 2]` form triangle `t`.
    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[usize] {
        &self.triangles
    }

    /// Opposite half-edge table (`EMPTY` marks hull edges).
    #[inline]
    #[must_use]
    pub fn halfedges(&self) -> &[usize] {
        &self.halfedges
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// The three sites of triangle `t`, counter-clockwise.
    #[inline]
    #[must_use]
    pub fn triangle(&self, t: usize) -> [usize; 3] {
        [
            self.triangles[3 * t],
            self.triangles[3 * t + 1],
            self.triangles[3 * t + 2],
        ]
    }

    /// Opposite half-edge, or `None` on the convex hull.
    #[inline]
    #[must_use]
    pub fn opposite(&self, e: usize) -> Option<usize> {
        match self.halfedges.get(e) {
            Some(&o) if o != EMPTY => Some(o),
            _ => None,
        }
    }

    /// Hull sites, counter-clockwise.
    #[inline]
    #[must_use]
    pub fn hull(&self) -> &[usize] {
        &self.hull
    }

    /// Next hull site after `site`, if `site` is on the hull.
    #[must_use]
    pub fn hull_next(&self, site: usize) -> Option<usize> {
        self.hull_next.get(site).copied().filter(|&s| s != EMPTY)
    }

    /// Previous hull site before `site`, if `site` is on the hull.
    #[must_use]
    pub fn hull_prev(&self, site: usize) -> Option<usize> {
        self.hull_prev.get(site).copied().filter(|&s| s != EMPTY)
    }

    /// Circumcenter of triangle `t`.
    #[must_use]
    pub fn circumcenter(&self, t: usize) -> Point2 {
        let [a, b, c] = self.triangle(t);
        circumcenter(self.points[a], self.points[b], self.points[c])
    }

    /// One incoming half-edge per site (`EMPTY` for sites in no triangle).
    ///
    /// Hull sites get their hull half-edge, so a walk started there
    /// visits the whole fan before reaching the hull again.
    #[must_use]
    pub fn incoming_edges(&self) -> Vec<usize> {
        let mut inedges = vec![EMPTY; self.points.len()];
        for e in 0..self.triangles.len() {
            let end = self.triangles[next_halfedge(e)];
            if self.halfedges[e] == EMPTY || inedges[end] == EMPTY {
                inedges[end] = e;
            }
        }
        inedges
    }

    /// Incoming half-edges around the site that `start` points into.
    #[must_use]
    pub fn edges_around_point(&self, start: usize) -> Vec<usize> {
        let mut fan = Vec::new();
        if start == EMPTY {
            return fan;
        }
        let mut incoming = start;
        loop {
            fan.push(incoming);
            incoming = self.halfedges[next_halfedge(incoming)];
            if incoming == EMPTY || incoming == start {
                break;
            }
        }
        fan
    }

    /// Delaunay neighbors of every site, in fan order.
    #[must_use]
    pub fn neighbors(&self) -> Vec<Vec<usize>> {
        let inedges = self.incoming_edges();
        inedges
            .iter()
            .map(|&start| {
                let fan = self.edges_around_point(start);
                let mut around: Vec<usize> = fan.iter().map(|&e| self.triangles[e]).collect();
                if let Some(&last) = fan.last() {
                    // Open fan on the hull: the final outgoing edge adds one more site.
                    let outgoing = next_halfedge(last);
                    if self.halfedges[outgoing] == EMPTY {
                        around.push(self.triangles[next_halfedge(outgoing)]);
                    }
                }
                around
            })
            .collect()
    }
}

/// Construction state for one sweep.
struct Sweep<'a> {
    points: &'a [Point2],
    triangles: Vec<usize>,
    halfedges: Vec<usize>,
    hull_prev: Vec<usize>,
    hull_next: Vec<usize>,
    hull_tri: Vec<usize>,
    hull_hash: Vec<usize>,
    hull_start: usize,
    center: Point2,
    edge_stack: Vec<usize>,
}

impl<'a> Sweep<'a> {
    fn run(points: &'a [Point2]) -> Triangulation {
        let n = points.len();
        if n < 3 {
            return Triangulation::degenerate(points, (0..n).collect());
        }

        let Some((i0, i1, i2)) = seed_triangle(points) else {
            return Triangulation::degenerate(points, collinear_hull(points));
        };

        let center = circumcenter(points[i0], points[i1], points[i2]);
        let mut ids: Vec<usize> = (0..n).collect();
        let dists: Vec<f64> = points.iter().map(|p| p.distance_sq(center)).collect();
        ids.sort_by(|&a, &b| dists[a].total_cmp(&dists[b]));

        let hash_size = (n as f64).sqrt().ceil() as usize;
        let max_triangles = (2 * n).saturating_sub(5).max(1);
        let mut sweep = Sweep {
            points,
            triangles: Vec::with_capacity(max_triangles * 3),
            halfedges: Vec::with_capacity(max_triangles * 3),
            hull_prev: vec![EMPTY; n],
            hull_next: vec![EMPTY; n],
            hull_tri: vec![EMPTY; n],
            hull_hash: vec![EMPTY; hash_size],
            hull_start: i0,
            center,
            edge_stack: Vec::new(),
        };

        sweep.hull_next[i0] = i1;
        sweep.hull_prev[i2] = i1;
        sweep.hull_next[i1] = i2;
        sweep.hull_prev[i0] = i2;
        sweep.hull_next[i2] = i0;
        sweep.hull_prev[i1] = i0;

        sweep.hull_tri[i0] = 0;
        sweep.hull_tri[i1] = 1;
        sweep.hull_tri[i2] = 2;

        for seed in [i0, i1, i2] {
            let key = sweep.hash_key(points[seed]);
            sweep.hull_hash[key] = seed;
        }

        sweep.add_triangle(i0, i1, i2, EMPTY, EMPTY, EMPTY);
        let mut hull_size = 3usize;

        let mut previous: Option<Point2> = None;
        for &i in &ids {
            let p = points[i];

            if let Some(prev) = previous {
                if (p.x - prev.x).abs() <= EPSILON && (p.y - prev.y).abs() <= EPSILON {
                    continue;
                }
            }
            previous = Some(p);

            if i == i0 || i == i1 || i == i2 {
                continue;
            }

            let Some(start) = sweep.find_visible_start(p) else {
                continue;
            };
            let Some(mut e) = sweep.first_visible_edge(p, start) else {
                // Likely a near-duplicate of a hull site.
                continue;
            };

            let t = sweep.add_triangle(e, i, sweep.hull_next[e], EMPTY, EMPTY, sweep.hull_tri[e]);
            sweep.hull_tri[i] = sweep.legalize(t + 2);
            sweep.hull_tri[e] = t;
            hull_size += 1;

            // Walk forward through the hull.
            let mut next = sweep.hull_next[e];
            loop {
                let q = sweep.hull_next[next];
                if !is_visible(p, points[next], points[q]) {
                    break;
                }
                let t = sweep.add_triangle(next, i, q, sweep.hull_tri[i], EMPTY, sweep.hull_tri[next]);
                sweep.hull_tri[i] = sweep.legalize(t + 2);
                sweep.hull_next[next] = next; // removed from hull
                hull_size -= 1;
                next = q;
            }

            // Walk backward from the other side.
            if e == start {
                loop {
                    let q = sweep.hull_prev[e];
                    if !is_visible(p, points[q], points[e]) {
                        break;
                    }
                    let t = sweep.add_triangle(q, i, e, EMPTY, sweep.hull_tri[e], sweep.hull_tri[q]);
                    sweep.legalize(t + 2);
                    sweep.hull_tri[q] = t;
                    sweep.hull_next[e] = e; // removed from hull
                    hull_size -= 1;
                    e = q;
                }
            }

            sweep.hull_start = e;
            sweep.hull_prev[i] = e;
            sweep.hull_next[e] = i;
            sweep.hull_prev[next] = i;
            sweep.hull_next[i] = next;

            let key = sweep.hash_key(p);
            sweep.hull_hash[key] = i;
            let key = sweep.hash_key(points[e]);
            sweep.hull_hash[key] = e;
        }

        let mut hull = Vec::with_capacity(hull_size);
        let mut e = sweep.hull_start;
        for _ in 0..hull_size {
            hull.push(e);
            e = sweep.hull_next[e];
        }

        let mut triangulation = Triangulation {
            points: points.to_vec(),
            triangles: sweep.triangles,
            halfedges: sweep.halfedges,
            hull: Vec::new(),
            hull_next: Vec::new(),
            hull_prev: Vec::new(),
        };
        triangulation.set_hull(hull);
        triangulation
    }

    /// A hull site whose outgoing edge may be visible from `p`.
    fn find_visible_start(&self, p: Point2) -> Option<usize> {
        let size = self.hull_hash.len();
        let key = self.hash_key(p);
        let found = (0..size)
            .map(|j| self.hull_hash[(key + j) % size])
            .find(|&s| s != EMPTY && s != self.hull_next[s])
            .unwrap_or(self.hull_start);
        let start = self.hull_prev[found];
        (start != EMPTY).then_some(start)
    }

    /// First hull edge `e -> hull_next[e]` that `p` sees, walking from `start`.
    fn first_visible_edge(&self, p: Point2, start: usize) -> Option<usize> {
        let mut e = start;
        loop {
            let q = self.hull_next[e];
            if is_visible(p, self.points[e], self.points[q]) {
                return Some(e);
            }
            e = q;
            if e == start {
                return None;
            }
        }
    }

    fn hash_key(&self, p: Point2) -> usize {
        let size = self.hull_hash.len();
        let angle = pseudo_angle(p.x - self.center.x, p.y - self.center.y);
        ((angle * size as f64).floor() as usize) % size
    }

    fn add_triangle(&mut self, i0: usize, i1: usize, i2: usize, a: usize, b: usize, c: usize) -> usize {
        let t = self.triangles.len();
        self.triangles.extend_from_slice(&[i0, i1, i2]);
        self.halfedges.extend_from_slice(&[EMPTY; 3]);
        self.link(t, a);
        self.link(t + 1, b);
        self.link(t + 2, c);
        t
    }

    #[inline]
    fn link(&mut self, a: usize, b: usize) {
        self.halfedges[a] = b;
        if b != EMPTY {
            self.halfedges[b] = a;
        }
    }

    /// Flips edges until the pair across `a` (and every edge it touches)
    /// is locally Delaunay. Returns the half-edge leaving the new site
    /// along the hull.
    ///
    /// ```text
    ///           pl                    pl
    ///          /||\                  /  \
    ///       al/ || \bl            al/    \a
    ///        /  ||  \              /      \
    ///       /  a||b  \    flip    /___ar___\
    ///     p0\   ||   /p1   =>   p0\---bl---/p1
    ///        \  ||  /              \      /
    ///       ar\ || /br             b\    /br
    ///          \||/                  \  /
    ///           pr                    pr
    /// ```
    fn legalize(&mut self, mut a: usize) -> usize {
        let mut ar;
        loop {
            let b = self.halfedges[a];
            let a0 = a - a % 3;
            ar = a0 + (a + 2) % 3;

            if b == EMPTY {
                match self.edge_stack.pop() {
                    Some(next) => {
                        a = next;
                        continue;
                    }
                    None => break,
                }
            }

            let b0 = b - b % 3;
            let al = a0 + (a + 1) % 3;
            let bl = b0 + (b + 2) % 3;

            let p0 = self.triangles[ar];
            let pr = self.triangles[a];
            let pl = self.triangles[al];
            let p1 = self.triangles[bl];

            let illegal = in_circle(
                self.points[p0],
                self.points[pr],
                self.points[pl],
                self.points[p1],
            );

            if illegal {
                self.triangles[a] = p1;
                self.triangles[b] = p0;

                let hbl = self.halfedges[bl];

                // Edge swapped on the other side of the hull; fix the reference.
                if hbl == EMPTY {
                    let mut e = self.hull_start;
                    loop {
                        if self.hull_tri[e] == bl {
                            self.hull_tri[e] = a;
                            break;
                        }
                        e = self.hull_prev[e];
                        if e == self.hull_start || e == EMPTY {
                            break;
                        }
                    }
                }

                self.link(a, hbl);
                self.link(b, self.halfedges[ar]);
                self.link(ar, bl);

                let br = b0 + (b + 1) % 3;
                self.edge_stack.push(br);
            } else {
                match self.edge_stack.pop() {
                    Some(next) => a = next,
                    None => break,
                }
            }
        }
        ar
    }
}

impl Triangulation {
    /// A triangulation without triangles (fewer than 3 usable sites).
    fn degenerate(points: &[Point2], hull: Vec<usize>) -> Self {
        let mut triangulation = Self {
            points: points.to_vec(),
            ..Self::default()
        };
        triangulation.set_hull(hull);
        triangulation
    }

    fn set_hull(&mut self, hull: Vec<usize>) {
        let n = self.points.len();
        self.hull_next = vec![EMPTY; n];
        self.hull_prev = vec![EMPTY; n];
        let len = hull.len();
        for (k, &site) in hull.iter().enumerate() {
            self.hull_next[site] = hull[(k + 1) % len];
            self.hull_prev[site] = hull[(k + len - 1) % len];
        }
        self.hull = hull;
    }
}

/// Picks the seed triangle, oriented counter-clockwise.
///
/// Returns `None` when all points are coincident or collinear.
fn seed_triangle(points: &[Point2]) -> Option<(usize, usize, usize)> {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let bbox_center = Point2::new((min_x + max_x) * 0.5, (min_y + max_y) * 0.5);

    let i0 = nearest(points, bbox_center, |_| true)?;
    let p0 = points[i0];
    let i1 = nearest(points, p0, |i| i != i0 && points[i].distance_sq(p0) > 0.0)?;
    let p1 = points[i1];

    let mut min_radius = f64::INFINITY;
    let mut i2 = None;
    for (i, &p) in points.iter().enumerate() {
        if i == i0 || i == i1 {
            continue;
        }
        let r = circumradius_sq(p0, p1, p);
        if r < min_radius {
            min_radius = r;
            i2 = Some(i);
        }
    }
    let i2 = i2?;

    if cross(p0, p1, points[i2]) < 0.0 {
        Some((i0, i2, i1))
    } else {
        Some((i0, i1, i2))
    }
}

fn nearest(points: &[Point2], target: Point2, accept: impl Fn(usize) -> bool) -> Option<usize> {
    let mut best = None;
    let mut best_d = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        if !accept(i) {
            continue;
        }
        let d = p.distance_sq(target);
        if d < best_d {
            best_d = d;
            best = Some(i);
        }
    }
    best
}

/// Distinct points of collinear input, ordered along the line.
fn collinear_hull(points: &[Point2]) -> Vec<usize> {
    let origin = points[0];
    let key = |p: Point2| {
        let dx = p.x - origin.x;
        if dx == 0.0 { p.y - origin.y } else { dx }
    };
    let mut ids: Vec<usize> = (0..points.len()).collect();
    ids.sort_by(|&a, &b| key(points[a]).total_cmp(&key(points[b])));

    let mut hull = Vec::with_capacity(ids.len());
    let mut last = f64::NEG_INFINITY;
    for id in ids {
        let d = key(points[id]);
        if d > last {
            hull.push(id);
            last = d;
        }
    }
    hull
}

/// Twice the signed area of `abc`; positive when counter-clockwise.
#[inline]
fn cross(a: Point2, b: Point2, c: Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// True when `p` lies strictly outside the counter-clockwise hull edge `a -> b`.
#[inline]
fn is_visible(p: Point2, a: Point2, b: Point2) -> bool {
    cross(a, b, p) < 0.0
}

/// True when `p` is strictly inside the circumcircle of counter-clockwise `abc`.
#[inline]
fn in_circle(a: Point2, b: Point2, c: Point2, p: Point2) -> bool {
    let dx = a.x - p.x;
    let dy = a.y - p.y;
    let ex = b.x - p.x;
    let ey = b.y - p.y;
    let fx = c.x - p.x;
    let fy = c.y - p.y;

    let ap = dx * dx + dy * dy;
    let bp = ex * ex + ey * ey;
    let cp = fx * fx + fy * fy;

    dx * (ey * cp - bp * fy) - dy * (ex * cp - bp * fx) + ap * (ex * fy - ey * fx) > 0.0
}

/// Squared circumradius; infinite or NaN for collinear input.
fn circumradius_sq(a: Point2, b: Point2, c: Point2) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let ex = c.x - a.x;
    let ey = c.y - a.y;

    let bl = dx * dx + dy * dy;
    let cl = ex * ex + ey * ey;
    let d = 0.5 / (dx * ey - dy * ex);

    let x = (ey * bl - dy * cl) * d;
    let y = (dx * cl - ex * bl) * d;
    x * x + y * y
}

fn circumcenter(a: Point2, b: Point2, c: Point2) -> Point2 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let ex = c.x - a.x;
    let ey = c.y - a.y;

    let bl = dx * dx + dy * dy;
    let cl = ex * ex + ey * ey;
    let d = 0.5 / (dx * ey - dy * ex);

    Point2::new(a.x + (ey * bl - dy * cl) * d, a.y + (dx * cl - ex * bl) * d)
}

/// Monotonic stand-in for `atan2`, mapped to `[0, 1]`.
#[inline]
fn pseudo_angle(dx: f64, dy: f64) -> f64 {
    let p = dx / (dx.abs() + dy.abs());
    if dy > 0.0 { (3.0 - p) / 4.0 } else { (1.0 + p) / 4.0 }
}
