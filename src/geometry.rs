//! Numeric kernel of the sweep: parabola intersections, circumcircles and the
//! orientation predicate. The event logic upstairs depends on the exact
//! contracts here, in particular on which degenerate branch wins when the
//! sweep line touches a focus.

use crate::Point;

/// Branch-selection tolerance. Calibrated for coordinate magnitudes up to
/// about 1e3; see the crate docs for the robustness contract.
pub const EPS: f64 = 1e-7;

/// A circle through three sites, as produced by [`circumcircle`].
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    /// The y coordinate of the lowest point of the circle. The sweep reaches
    /// the circle's event exactly here.
    pub fn bottom(&self) -> f64 {
        self.center.y - self.radius
    }
}

pub fn dist(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// The y of the parabola with the given focus and a horizontal directrix,
/// evaluated at x. Requires `focus.y != directrix`.
pub fn parabola_y(focus: Point, directrix: f64, x: f64) -> f64 {
    let dx = x - focus.x;
    (dx * dx + focus.y * focus.y - directrix * directrix) / (2.0 * (focus.y - directrix))
}

/// Intersection of the parabolas of foci `p` and `r` under a horizontal
/// directrix at `sweep`, selecting the root given by `sign` (±1).
///
/// Both foci must lie on or above the directrix. A focus on the directrix
/// degenerates to a vertical ray, which forces the intersection to that
/// focus' x regardless of `sign`; two foci at the same height meet only at
/// the midpoint x. The general branch solves the quadratic
///
/// `x = (p.y·r.x − p.x·r.y + (p.x − r.x)·sweep) / (p.y − r.y) ± |D| / (p.y − r.y)`
///
/// with `D = dist(p, r) · √(p.y − sweep) · √(r.y − sweep)`.
pub fn parabola_intersection(sweep: f64, p: Point, r: Point, sign: f64) -> Point {
    if (p.y - sweep).abs() < EPS {
        // p's parabola has no width yet
        let x = p.x;
        return Point::new(x, parabola_y(r, sweep, x));
    }
    if (r.y - sweep).abs() < EPS {
        let x = r.x;
        return Point::new(x, parabola_y(p, sweep, x));
    }
    if (p.y - r.y).abs() < EPS {
        // equal heights: a single intersection, on the vertical bisector
        let x = (p.x + r.x) / 2.0;
        return Point::new(x, parabola_y(p, sweep, x));
    }

    let term = (p.y * r.x - p.x * r.y + (p.x - r.x) * sweep) / (p.y - r.y);
    let rad = dist(p, r) * (p.y - sweep).sqrt() * (r.y - sweep).sqrt() / (p.y - r.y);
    let x = term + sign * rad.abs();
    Point::new(x, parabola_y(p, sweep, x))
}

/// Circumcircle of three points, `None` when they are colinear and the
/// denominator vanishes. Callers are expected to treat `None` as "no event".
pub fn circumcircle(p: Point, q: Point, r: Point) -> Option<Circle> {
    let sqr = |v: f64| v * v;

    let d = p.y * q.x - p.x * q.y - (p.y - q.y) * r.x + (p.x - q.x) * r.y;
    if d == 0.0 {
        return None;
    }

    let cx = 0.5
        * (p.y * sqr(q.x) + p.y * sqr(q.y)
            - (p.y - q.y) * sqr(r.x)
            - (p.y - q.y) * sqr(r.y)
            - (sqr(p.x) + sqr(p.y)) * q.y
            + (sqr(p.x) + sqr(p.y) - sqr(q.x) - sqr(q.y)) * r.y)
        / d;
    let cy = -0.5
        * (p.x * sqr(q.x) + p.x * sqr(q.y)
            - (p.x - q.x) * sqr(r.x)
            - (p.x - q.x) * sqr(r.y)
            - (sqr(p.x) + sqr(p.y)) * q.x
            + (sqr(p.x) + sqr(p.y) - sqr(q.x) - sqr(q.y)) * r.x)
        / d;

    let center = Point::new(cx, cy);
    Some(Circle {
        center,
        radius: dist(center, p),
    })
}

/// Signed twice-area of the triangle (v1, v0, p): positive on one side of the
/// directed line v1→v0, negative on the other, zero when colinear.
pub fn perp(p: Point, v0: Point, v1: Point) -> f64 {
    (p.x - v1.x) * (v0.y - v1.y) - (p.y - v1.y) * (v0.x - v1.x)
}
