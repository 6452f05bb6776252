//! Exact-enough geometric predicates, parameterized over the coordinate
//! [`Scalar`]. Orientation and in-circle get exact widened-integer
//! implementations for `i32`; everything else shares a single f64-based
//! default, since the spec allows `circumcenter` to return a degenerate
//! sentinel and does not require exactness there.

use crate::point::Point;
use crate::scalar::Scalar;

/// Sign of `orient2d`: counter-clockwise, clockwise, or collinear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
    Collinear,
}

impl Orientation {
    pub fn is_ccw(self) -> bool {
        self == Orientation::CounterClockwise
    }

    pub fn is_cw(self) -> bool {
        self == Orientation::Clockwise
    }

    pub fn is_collinear(self) -> bool {
        self == Orientation::Collinear
    }
}

/// The circumcircle of a triangle: center and squared radius.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle<T: Scalar> {
    pub center: Point<T>,
    pub radius_sq: T,
}

impl<T: GeomKernel> Circle<T> {
    pub fn of_triangle(a: Point<T>, b: Point<T>, c: Point<T>) -> Self {
        Circle {
            center: T::circumcenter(a, b, c),
            radius_sq: T::circumradius_sq(a, b, c),
        }
    }

    /// Whether the circumcenter computation degenerated (collinear input).
    pub fn is_degenerate(self) -> bool {
        !self.center.is_finite()
    }
}

/// The geometric-predicate kernel. A blanket default (f64-based) is
/// provided for every operation; `i32` overrides `orient2d`/`in_circle`
/// with exact widened `i128` arithmetic (see the `i128` helper below).
pub trait GeomKernel: Scalar {
    fn orient2d(a: Point<Self>, b: Point<Self>, c: Point<Self>) -> Orientation {
        let (ax, ay) = a.to_f64();
        let (bx, by) = b.to_f64();
        let (cx, cy) = c.to_f64();
        let area2 = (bx - ax) * (cy - ay) - (by - ay) * (cx - ax);
        if area2 > 0.0 {
            Orientation::CounterClockwise
        } else if area2 < 0.0 {
            Orientation::Clockwise
        } else {
            Orientation::Collinear
        }
    }

    fn in_circle(a: Point<Self>, b: Point<Self>, c: Point<Self>, p: Point<Self>) -> bool {
        let (ax, ay) = a.to_f64();
        let (bx, by) = b.to_f64();
        let (cx, cy) = c.to_f64();
        let (px, py) = p.to_f64();

        let dx = ax - px;
        let dy = ay - py;
        let ex = bx - px;
        let ey = by - py;
        let fx = cx - px;
        let fy = cy - py;

        let ap = dx * dx + dy * dy;
        let bp = ex * ex + ey * ey;
        let cp = fx * fx + fy * fy;

        let gx = ex * cp - fx * bp;
        let gy = ey * cp - fy * bp;

        (dx * gy - dy * gx) + ap * (ex * fy - ey * fx) > 0.0
    }

    fn circumcenter(a: Point<Self>, b: Point<Self>, c: Point<Self>) -> Point<Self> {
        let (ax, ay) = a.to_f64();
        let (bx, by) = b.to_f64();
        let (cx, cy) = c.to_f64();

        let dx = bx - ax;
        let dy = by - ay;
        let ex = cx - ax;
        let ey = cy - ay;

        let bl = dx * dx + dy * dy;
        let cl = ex * ex + ey * ey;
        let d = dx * ey - dy * ex;

        if d == 0.0 {
            return Point::new(Self::infinity(), Self::infinity());
        }

        let k = 0.5 / d;
        let x = ax + (ey * bl - dy * cl) * k;
        let y = ay + (dx * cl - ex * bl) * k;
        Point::new(Self::from_f64(x), Self::from_f64(y))
    }

    fn circumradius_sq(a: Point<Self>, b: Point<Self>, c: Point<Self>) -> Self {
        let center = Self::circumcenter(a, b, c);
        if !center.is_finite() {
            return Self::infinity();
        }
        let (cx, cy) = center.to_f64();
        let (ax, ay) = a.to_f64();
        let dx = ax - cx;
        let dy = ay - cy;
        Self::from_f64(dx * dx + dy * dy)
    }

    fn point_in_triangle(p: Point<Self>, a: Point<Self>, b: Point<Self>, c: Point<Self>) -> bool {
        let d1 = Self::orient2d(p, a, b);
        let d2 = Self::orient2d(p, b, c);
        let d3 = Self::orient2d(p, c, a);

        let has_neg = d1.is_cw() || d2.is_cw() || d3.is_cw();
        let has_pos = d1.is_ccw() || d2.is_ccw() || d3.is_ccw();

        !(has_neg && has_pos)
    }

    fn point_on_segment(p: Point<Self>, a: Point<Self>, b: Point<Self>) -> bool {
        if !Self::orient2d(a, b, p).is_collinear() {
            return false;
        }
        let (px, py) = p.to_f64();
        let (ax, ay) = a.to_f64();
        let (bx, by) = b.to_f64();
        px >= ax.min(bx) && px <= ax.max(bx) && py >= ay.min(by) && py <= ay.max(by)
    }

    fn segments_properly_intersect(
        a0: Point<Self>,
        a1: Point<Self>,
        b0: Point<Self>,
        b1: Point<Self>,
    ) -> bool {
        let d1 = Self::orient2d(b0, b1, a0);
        let d2 = Self::orient2d(b0, b1, a1);
        let d3 = Self::orient2d(a0, a1, b0);
        let d4 = Self::orient2d(a0, a1, b1);

        let straddles_ab = (d1.is_ccw() && d2.is_cw()) || (d1.is_cw() && d2.is_ccw());
        let straddles_ba = (d3.is_ccw() && d4.is_cw()) || (d3.is_cw() && d4.is_ccw());

        // Endpoint sharing returns false: collinear touches are excluded
        // by requiring a strict straddle on both segments.
        straddles_ab && straddles_ba
    }

    fn pseudo_angle(dx: Self, dy: Self) -> f64 {
        let dx = dx.to_f64();
        let dy = dy.to_f64();
        let sum = dx.abs() + dy.abs();
        if sum == 0.0 {
            return 0.0;
        }
        let k = dx / sum;
        (if dy > 0.0 { 3.0 - k } else { 1.0 + k }) / 4.0
    }

    fn is_convex_quadrilateral(
        a: Point<Self>,
        b: Point<Self>,
        c: Point<Self>,
        d: Point<Self>,
    ) -> bool {
        const EPSILON: f64 = 1e-10;
        let signed_area = |p: Point<Self>, q: Point<Self>, r: Point<Self>| -> f64 {
            let (px, py) = p.to_f64();
            let (qx, qy) = q.to_f64();
            let (rx, ry) = r.to_f64();
            (qx - px) * (ry - py) - (qy - py) * (rx - px)
        };

        signed_area(a, b, c) > EPSILON
            && signed_area(b, c, d) > EPSILON
            && signed_area(c, d, a) > EPSILON
            && signed_area(d, a, b) > EPSILON
    }
}

impl GeomKernel for f32 {}
impl GeomKernel for f64 {}

impl GeomKernel for i32 {
    fn orient2d(a: Point<Self>, b: Point<Self>, c: Point<Self>) -> Orientation {
        let ax = i128::from(a.x);
        let ay = i128::from(a.y);
        let bx = i128::from(b.x);
        let by = i128::from(b.y);
        let cx = i128::from(c.x);
        let cy = i128::from(c.y);

        let area2 = (bx - ax) * (cy - ay) - (by - ay) * (cx - ax);
        if area2 > 0 {
            Orientation::CounterClockwise
        } else if area2 < 0 {
            Orientation::Clockwise
        } else {
            Orientation::Collinear
        }
    }

    fn in_circle(a: Point<Self>, b: Point<Self>, c: Point<Self>, p: Point<Self>) -> bool {
        let dx = i128::from(a.x) - i128::from(p.x);
        let dy = i128::from(a.y) - i128::from(p.y);
        let ex = i128::from(b.x) - i128::from(p.x);
        let ey = i128::from(b.y) - i128::from(p.y);
        let fx = i128::from(c.x) - i128::from(p.x);
        let fy = i128::from(c.y) - i128::from(p.y);

        let ap = dx * dx + dy * dy;
        let bp = ex * ex + ey * ey;
        let cp = fx * fx + fy * fy;

        let gx = ex * cp - fx * bp;
        let gy = ey * cp - fy * bp;

        (dx * gy - dy * gx) + ap * (ex * fy - ey * fx) > 0
    }
}

#[cfg(feature = "fixed-point")]
impl GeomKernel for fixed::types::I32F32 {}
