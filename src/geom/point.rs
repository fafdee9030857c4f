use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or displacement) in the planar workspace.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point2<F> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Point2<F> {
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::new(F::zero(), F::zero())
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Self) -> F {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl<F: Float> Add for Point2<F> {
    type Output = Point2<F>;

    fn add(self, rhs: Point2<F>) -> Point2<F> {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<F: Float> Sub for Point2<F> {
    type Output = Point2<F>;

    fn sub(self, rhs: Point2<F>) -> Point2<F> {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<F: Float> Mul<F> for Point2<F> {
    type Output = Point2<F>;

    fn mul(self, rhs: F) -> Point2<F> {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

/// An axis-aligned rectangle, used for workspace bounds.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect<F> {
    min: Point2<F>,
    max: Point2<F>,
}

impl<F: Float> Rect<F> {
    /// Creates a rectangle from two opposite corners, in any order.
    pub fn new(a: Point2<F>, b: Point2<F>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A degenerate rectangle containing only the origin.
    pub fn empty() -> Self {
        Self::new(Point2::origin(), Point2::origin())
    }

    pub fn min(&self) -> Point2<F> {
        self.min
    }

    pub fn max(&self) -> Point2<F> {
        self.max
    }

    pub fn width(&self) -> F {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> F {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: &Point2<F>) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// The smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}
