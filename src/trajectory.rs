use crate::config::Control;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A timed sequence of controls describing a continuous motion.
///
/// Each segment is a control applied for a strictly positive duration.
/// Trajectories are built by appending and consumed by the robot's
/// interpolation routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory<F> {
    segments: Vec<(Control<F>, F)>,
}

impl<F: Float> Trajectory<F> {
    /// Creates an empty trajectory.
    pub fn new() -> Self {
        Self { segments: Vec::new() }
    }

    /// Creates a trajectory from a single segment.
    pub fn from_segment(control: Control<F>, duration: F) -> Self {
        let mut trajectory = Self::new();
        trajectory.push(control, duration);
        trajectory
    }

    /// Appends one segment.
    pub fn push(&mut self, control: Control<F>, duration: F) {
        assert!(duration > F::zero(), "segment duration must be positive");
        self.segments.push((control, duration));
    }

    /// Appends every segment of another trajectory, in order.
    pub fn append(&mut self, other: Trajectory<F>) {
        self.segments.extend(other.segments);
    }

    /// The number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn control(&self, index: usize) -> &Control<F> {
        &self.segments[index].0
    }

    pub fn duration(&self, index: usize) -> F {
        self.segments[index].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Control<F>, F)> {
        self.segments.iter().map(|(control, duration)| (control, *duration))
    }

    /// The total duration, accumulated with compensated (Kahan) summation so
    /// long trajectories of short segments do not drift.
    pub fn total_time(&self) -> F {
        let mut sum = F::zero();
        let mut compensation = F::zero();
        for (_, duration) in &self.segments {
            let y = *duration - compensation;
            let t = sum + y;
            compensation = (t - sum) - y;
            sum = t;
        }
        sum
    }
}

impl<F: Float> Default for Trajectory<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float + fmt::Display> fmt::Display for Trajectory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trajectory:")?;
        for (control, duration) in &self.segments {
            write!(f, " ({control}, {duration:.2})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn control(values: &[f64]) -> Control<f64> {
        Config::from_slice(values)
    }

    #[test]
    fn append_concatenates_in_order() {
        let mut first = Trajectory::from_segment(control(&[1.0, 0.0]), 0.5);
        first.push(control(&[0.0, 1.0]), 0.25);
        let second = Trajectory::from_segment(control(&[-1.0, 0.0]), 1.0);

        let t1 = first.total_time();
        let t2 = second.total_time();
        first.append(second);

        assert_eq!(first.len(), 3);
        assert_eq!(first.control(2), &control(&[-1.0, 0.0]));
        assert!((first.total_time() - (t1 + t2)).abs() < 1e-12);
    }

    #[test]
    fn total_time_is_compensated() {
        let mut trajectory = Trajectory::new();
        trajectory.push(control(&[0.0]), 1.0);
        for _ in 0..1_000_000 {
            trajectory.push(control(&[0.0]), 1e-10);
        }
        assert!((trajectory.total_time() - (1.0 + 1e-4)).abs() < 1e-12);
    }

    #[test]
    fn empty_trajectory() {
        let trajectory: Trajectory<f64> = Trajectory::new();
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.total_time(), 0.0);
    }

    #[test]
    #[should_panic]
    fn rejects_nonpositive_duration() {
        let _ = Trajectory::from_segment(control(&[1.0]), 0.0);
    }
}
