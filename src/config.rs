use crate::geom::Point2;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

/// A configuration: a fixed-dimension real vector describing a robot pose.
///
/// Configurations compare by exact floating-point value, coordinate by
/// coordinate, and order lexicographically. This makes them usable as keys
/// in ordered maps, at the cost that two configurations produced by
/// different arithmetic paths may describe the same physical pose yet
/// compare unequal. Comparing a configuration containing NaN panics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config<F> {
    values: Vec<F>,
}

/// A control input. Controls and configurations share one representation.
pub type Control<F> = Config<F>;

impl<F: Float> Config<F> {
    pub fn new(values: Vec<F>) -> Self {
        Self { values }
    }

    pub fn from_slice(values: &[F]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    /// The number of coordinates.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[F] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        self.values.iter().copied()
    }

    /// Projects the first two coordinates onto the workspace plane.
    pub fn planar(&self) -> Point2<F> {
        assert!(self.dimension() >= 2, "planar projection requires at least two coordinates");
        Point2::new(self.values[0], self.values[1])
    }
}

impl<F: Float> Index<usize> for Config<F> {
    type Output = F;

    fn index(&self, index: usize) -> &F {
        &self.values[index]
    }
}

impl<F: PartialEq> PartialEq for Config<F> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<F: Float> Eq for Config<F> {}

impl<F: Float> PartialOrd for Config<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Float> Ord for Config<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert_eq!(self.values.len(), other.values.len());
        for (a, b) in self.values.iter().zip(other.values.iter()) {
            match a.partial_cmp(b).expect("Cannot compare NaN coordinates") {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        self.values.len().cmp(&other.values.len())
    }
}

impl<F: Float + fmt::Display> fmt::Display for Config<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}
