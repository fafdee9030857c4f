pub mod arm;
pub mod planar;

pub use arm::RobotArm;
pub use planar::PlanarRobot;

use crate::config::{Config, Control};
use crate::environment::Environment;
use crate::geom::{Polygon, Transform2};
use crate::trajectory::Trajectory;
use num_traits::{Float, FloatConst};
use rand::distributions::uniform::SampleUniform;
use rand::RngCore;

/// The capability set of a robot: its configuration space, metric, motion
/// model, and occupied planar area.
///
/// Robots are stateless. Planners hold one behind a `Box<dyn Robot<F>>` and
/// drive it through this interface only. Dimension mismatches between a
/// configuration and the robot are precondition violations and panic at the
/// public boundary.
pub trait Robot<F: Float + FloatConst + SampleUniform> {
    /// The dimension of the configuration space.
    fn dimension(&self) -> usize;

    /// A pseudometric between two configurations: non-negative, symmetric,
    /// and zero only for configurations equal under normalization. Used both
    /// as an edge weight and as an admissible search heuristic.
    fn metric(&self, q1: &Config<F>, q2: &Config<F>) -> F;

    /// Draws a configuration uniformly over the robot's configuration space,
    /// bounded by the environment's workspace where applicable.
    fn random_configuration(&self, environment: &Environment<F>, rng: &mut dyn RngCore) -> Config<F>;

    /// Draws a control uniformly from the robot's admissible control set.
    fn random_control(&self, rng: &mut dyn RngCore) -> Control<F>;

    /// The finite control set, or `None` when the control set is implicit.
    fn controls(&self) -> Option<&[Control<F>]> {
        None
    }

    /// Integrates the motion model exactly: the configuration reached by
    /// applying `control` for `duration`. Closed-form, so planning is
    /// reproducible.
    fn propagate(&self, configuration: &Config<F>, control: &Control<F>, duration: F) -> Config<F>;

    /// Connects two distinct configurations with a single-segment trajectory,
    /// ignoring obstacles. Returns `None` when the robot has no closed-form
    /// connection.
    fn steer(&self, _q1: &Config<F>, _q2: &Config<F>) -> Option<Trajectory<F>> {
        None
    }

    /// Whether [`Robot::steer`] is available for this robot.
    fn supports_steering(&self) -> bool {
        false
    }

    /// Wraps angular components of a configuration into [0, 2*pi).
    fn normalize(&self, configuration: &Config<F>) -> Config<F> {
        configuration.clone()
    }

    /// The fixed body shapes, in the robot's local frames.
    fn shapes(&self) -> &[Polygon<F>];

    /// The placement of each body shape for a configuration, in the same
    /// order as [`Robot::shapes`].
    fn transformations(&self, configuration: &Config<F>) -> Vec<Transform2<F>>;

    /// The planar region occupied at a configuration, as one transformed
    /// polygon per body shape.
    fn area(&self, configuration: &Config<F>) -> Vec<Polygon<F>> {
        self.transformations(configuration)
            .iter()
            .zip(self.shapes())
            .map(|(transform, shape)| transform.apply_polygon(shape))
            .collect()
    }

    /// The configurations visited by following `trajectory` from
    /// `configuration`, sampled every `resolution` time units. The returned
    /// sequence starts at the initial configuration and always contains the
    /// exact end configuration of every segment.
    fn interpolate(&self, configuration: &Config<F>, trajectory: &Trajectory<F>, resolution: F) -> Vec<Config<F>> {
        assert_eq!(
            configuration.dimension(),
            self.dimension(),
            "configuration dimension must match the robot"
        );
        let mut result = vec![configuration.clone()];
        let mut current = configuration.clone();
        for (control, duration) in trajectory.iter() {
            result.extend(self.interpolate_control(&current, control, duration, resolution));
            current = self.propagate(&current, control, duration);
        }
        result
    }

    /// The configurations visited by applying a single control, sampled at
    /// t = resolution, 2*resolution, ... plus the exact end time. The initial
    /// configuration is not included.
    fn interpolate_control(
        &self,
        configuration: &Config<F>,
        control: &Control<F>,
        duration: F,
        resolution: F,
    ) -> Vec<Config<F>> {
        let mut result = Vec::new();
        let mut time = resolution;
        while time < duration {
            result.push(self.propagate(configuration, control, time));
            time = time + resolution;
        }
        result.push(self.propagate(configuration, control, duration));
        result
    }
}

/// Wraps an angle into [0, 2*pi).
pub fn normalize_angle<F: Float + FloatConst>(x: F) -> F {
    let two_pi = F::PI() + F::PI();
    let remainder = x % two_pi;
    if remainder >= F::zero() {
        remainder
    } else {
        remainder + two_pi
    }
}

/// The absolute angular distance between two angles, in [0, pi].
pub fn angle_abs_diff<F: Float + FloatConst>(angle1: F, angle2: F) -> F {
    let two_pi = F::PI() + F::PI();
    let diff = normalize_angle(angle1 - angle2);
    (two_pi - diff).min(diff)
}

/// The signed shortest rotation from `angle1` to `angle2`, in (-pi, pi],
/// satisfying angle1 + signed_diff = angle2 (mod 2*pi).
pub fn angle_signed_diff<F: Float + FloatConst>(angle1: F, angle2: F) -> F {
    let two_pi = F::PI() + F::PI();
    let angle1 = normalize_angle(angle1);
    let angle2 = normalize_angle(angle2);
    let forward = if angle2 >= angle1 {
        angle2 - angle1
    } else {
        two_pi - angle1 + angle2
    };
    let backward = if angle2 <= angle1 {
        angle1 - angle2
    } else {
        two_pi - angle2 + angle1
    };
    if forward < backward {
        forward
    } else {
        -backward
    }
}
