use std::ops::{Add, Mul, Sub};

use crate::scalar::{ApproxEq, Scalar};

/// A 2D point/vector over a generic coordinate [`Scalar`].
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point<T: Scalar> {
    pub x: T,
    pub y: T,
}

impl<T: Scalar + std::fmt::Debug> std::fmt::Debug for Point<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{:?}, {:?}]", self.x, self.y)
    }
}

impl<T: Scalar> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Point { x, y }
    }

    /// The square of the length of `self`.
    pub fn length_squared(self) -> T {
        self.x * self.x + self.y * self.y
    }

    /// Returns `self` rotated by 90 degrees.
    pub fn perp(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// The perpendicular dot product of `self` and `other`.
    pub fn perp_dot(self, other: Self) -> T {
        self.x * other.y - self.y * other.x
    }

    /// The ordinary dot product of `self` and `other`.
    pub fn dot(self, other: Self) -> T {
        self.x * other.x + self.y * other.y
    }

    /// The square of the distance between `self` and `p`.
    pub fn distance_squared(self, p: Self) -> T {
        (self - p).length_squared()
    }

    pub fn nearly_equals(self, p: Self) -> bool
    where
        T: ApproxEq,
    {
        self.x.approx_eq(p.x) && self.y.approx_eq(p.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_f64(self) -> (f64, f64) {
        (self.x.to_f64(), self.y.to_f64())
    }
}

impl<T: Scalar> Add<Point<T>> for Point<T> {
    type Output = Point<T>;

    fn add(self, rhs: Self) -> Self::Output {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<T: Scalar> Sub<Point<T>> for Point<T> {
    type Output = Point<T>;

    fn sub(self, rhs: Self) -> Self::Output {
        Point {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl<T: Scalar> Mul<T> for Point<T> {
    type Output = Point<T>;

    fn mul(self, rhs: T) -> Self::Output {
        Point {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
