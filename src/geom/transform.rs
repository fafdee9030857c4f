use crate::geom::point::Point2;
use crate::geom::polygon::Polygon;
use num_traits::Float;

/// A rigid planar transformation (an element of SE(2)), stored as a
/// translation plus the sine and cosine of the rotation angle so that
/// composition never re-evaluates trigonometric functions.
#[derive(Debug, Copy, Clone)]
pub struct Transform2<F> {
    x: F,
    y: F,
    sin: F,
    cos: F,
}

impl<F: Float> Transform2<F> {
    pub fn identity() -> Self {
        Self {
            x: F::zero(),
            y: F::zero(),
            sin: F::zero(),
            cos: F::one(),
        }
    }

    /// Builds a transform from a translation and a rotation angle.
    pub fn new(x: F, y: F, theta: F) -> Self {
        Self {
            x,
            y,
            sin: theta.sin(),
            cos: theta.cos(),
        }
    }

    /// Exact integration of a constant twist (vx, vy, omega) over `duration`.
    ///
    /// The displacement uses the sinc/versine closed forms, which stay finite
    /// as the angular rate approaches zero.
    pub fn from_twist(vx: F, vy: F, omega: F, duration: F) -> Self {
        let theta = omega * duration;
        let s = sinc(theta);
        let v = versine(theta);
        Self {
            x: duration * (vx * s - vy * v),
            y: duration * (vx * v + vy * s),
            sin: theta.sin(),
            cos: theta.cos(),
        }
    }

    /// Composes `self` with `other` applied in the local frame of `self`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            x: self.cos * other.x - self.sin * other.y + self.x,
            y: self.sin * other.x + self.cos * other.y + self.y,
            sin: self.sin * other.cos + self.cos * other.sin,
            cos: self.cos * other.cos - self.sin * other.sin,
        }
    }

    /// Applies the transformation to a point.
    pub fn apply(&self, point: &Point2<F>) -> Point2<F> {
        Point2::new(
            self.cos * point.x - self.sin * point.y + self.x,
            self.sin * point.x + self.cos * point.y + self.y,
        )
    }

    /// Applies the transformation to every vertex of a polygon.
    pub fn apply_polygon(&self, polygon: &Polygon<F>) -> Polygon<F> {
        Polygon::new(polygon.vertices().iter().map(|v| self.apply(v)).collect())
    }

    pub fn x(&self) -> F {
        self.x
    }

    pub fn y(&self) -> F {
        self.y
    }

    /// The rotation angle in (-pi, pi].
    pub fn theta(&self) -> F {
        self.sin.atan2(self.cos)
    }
}

/// sin(theta) / theta, extended continuously to 1 at zero.
pub(crate) fn sinc<F: Float>(theta: F) -> F {
    if theta.abs() < epsilon() {
        F::one()
    } else {
        theta.sin() / theta
    }
}

/// (1 - cos(theta)) / theta, extended continuously to 0 at zero.
pub(crate) fn versine<F: Float>(theta: F) -> F {
    if theta.abs() < epsilon() {
        F::zero()
    } else {
        (F::one() - theta.cos()) / theta
    }
}

fn epsilon<F: Float>() -> F {
    F::from(1e-7).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn sinc_and_versine_limits() {
        assert_eq!(sinc(0.0), 1.0);
        assert_eq!(versine(0.0), 0.0);
        assert!((sinc(1e-9) - 1.0).abs() < 1e-12);
        assert!(versine(1e-9).abs() < 1e-12);
        assert!((sinc(PI) - 0.0).abs() < 1e-12);
        assert!((versine(PI) - 2.0 / PI).abs() < 1e-12);
    }

    #[test]
    fn identity_composition() {
        let pose = Transform2::new(1.0, -2.0, 0.7);
        let composed = pose.compose(&Transform2::identity());
        assert!((composed.x() - pose.x()).abs() < 1e-12);
        assert!((composed.y() - pose.y()).abs() < 1e-12);
        assert!((composed.theta() - pose.theta()).abs() < 1e-12);
    }

    #[test]
    fn zero_twist_is_identity() {
        let moved = Transform2::from_twist(0.0, 0.0, 0.0, 5.0);
        assert_eq!(moved.x(), 0.0);
        assert_eq!(moved.y(), 0.0);
        assert_eq!(moved.theta(), 0.0);
    }

    #[test]
    fn straight_twist_translates() {
        let moved = Transform2::from_twist(1.0, 0.0, 0.0, 2.5);
        assert!((moved.x() - 2.5).abs() < 1e-12);
        assert!(moved.y().abs() < 1e-12);
        assert!(moved.theta().abs() < 1e-12);
    }

    #[test]
    fn quarter_turn_arc() {
        // Unit forward speed with unit angular rate for a quarter turn ends
        // at (sin t, 1 - cos t) with heading t.
        let t = FRAC_PI_2;
        let moved = Transform2::from_twist(1.0, 0.0, 1.0, t);
        assert!((moved.x() - t.sin()).abs() < 1e-12);
        assert!((moved.y() - (1.0 - t.cos())).abs() < 1e-12);
        assert!((moved.theta() - t).abs() < 1e-12);
    }

    #[test]
    fn compose_rotation_then_translation() {
        let quarter = Transform2::new(0.0, 0.0, FRAC_PI_2);
        let step = Transform2::new(1.0, 0.0, 0.0);
        let pose = quarter.compose(&step);
        assert!(pose.x().abs() < 1e-12);
        assert!((pose.y() - 1.0).abs() < 1e-12);
        let p = pose.apply(&Point2::new(1.0, 0.0));
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }
}
