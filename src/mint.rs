//! Optional `mint` interop, so host applications built on `mint`'s
//! cross-crate math types can hand points in and out without wrapping them.

use mint::Point2;

use crate::point::Point;
use crate::scalar::Scalar;

impl<T: Scalar> From<Point2<T>> for Point<T> {
    fn from(other: Point2<T>) -> Self {
        Point::new(other.x, other.y)
    }
}

impl<T: Scalar> From<Point<T>> for Point2<T> {
    fn from(other: Point<T>) -> Self {
        Point2 {
            x: other.x,
            y: other.y,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mint_roundtrip() {
        let p = Point::new(1.5_f64, -2.5);
        let m: Point2<f64> = p.into();
        let back: Point<f64> = m.into();
        assert_eq!(p, back);
    }
}
