use crate::config::{Config, Control};
use crate::environment::Environment;
use crate::geom::{Point2, Polygon, Transform2};
use crate::robot::{angle_abs_diff, angle_signed_diff, normalize_angle, Robot};
use crate::trajectory::Trajectory;
use num_traits::{Float, FloatConst};
use rand::distributions::uniform::SampleUniform;
use rand::{Rng, RngCore};

/// An articulated arm: a chain of equal revolute links anchored at the
/// origin. The configuration is one wrapped joint angle per link, so the
/// configuration space is a torus.
///
/// The arm is the one robot with a steering function: joints rotate along
/// their shortest signed differences, scaled so every joint finishes
/// together with the joint that has the farthest to travel. That makes it
/// the connecting robot for roadmap planning.
pub struct RobotArm<F> {
    shapes: Vec<Polygon<F>>,
}

impl<F: Float + FloatConst + SampleUniform> RobotArm<F> {
    /// Creates an arm with `links` revolute links.
    pub fn new(links: usize) -> Self {
        assert!(links > 0, "an arm requires at least one link");
        Self {
            shapes: (0..links).map(|_| link_rectangle()).collect(),
        }
    }
}

impl<F: Float + FloatConst + SampleUniform> Robot<F> for RobotArm<F> {
    fn dimension(&self) -> usize {
        self.shapes.len()
    }

    /// The sum of per-joint angular differences, each in [0, pi].
    fn metric(&self, q1: &Config<F>, q2: &Config<F>) -> F {
        assert_eq!(q1.dimension(), self.dimension(), "configuration dimension must match the robot");
        assert_eq!(q2.dimension(), self.dimension(), "configuration dimension must match the robot");
        q1.iter()
            .zip(q2.iter())
            .fold(F::zero(), |sum, (a, b)| sum + angle_abs_diff(a, b))
    }

    fn random_configuration(&self, _environment: &Environment<F>, rng: &mut dyn RngCore) -> Config<F> {
        let two_pi = F::PI() + F::PI();
        let angles = (0..self.dimension())
            .map(|_| rng.gen_range(F::zero()..F::one()) * two_pi)
            .collect();
        Config::new(angles)
    }

    /// The control set is implicit: each joint rate drawn uniformly from
    /// [-1, 1).
    fn random_control(&self, rng: &mut dyn RngCore) -> Control<F> {
        let rates = (0..self.dimension())
            .map(|_| rng.gen_range(F::zero()..F::one()) * F::from(2.0).unwrap() - F::one())
            .collect();
        Config::new(rates)
    }

    fn propagate(&self, configuration: &Config<F>, control: &Control<F>, duration: F) -> Config<F> {
        assert_eq!(configuration.dimension(), self.dimension(), "configuration dimension must match the robot");
        assert_eq!(control.dimension(), self.dimension(), "control dimension must match the robot");
        let angles = configuration
            .iter()
            .zip(control.iter())
            .map(|(angle, rate)| normalize_angle(angle + rate * duration))
            .collect();
        Config::new(angles)
    }

    fn steer(&self, q1: &Config<F>, q2: &Config<F>) -> Option<Trajectory<F>> {
        assert_eq!(q1.dimension(), self.dimension(), "configuration dimension must match the robot");
        assert_eq!(q2.dimension(), self.dimension(), "configuration dimension must match the robot");
        let mut differences = Vec::with_capacity(self.dimension());
        let mut control = Vec::with_capacity(self.dimension());
        let mut duration = F::zero();
        for (a, b) in q1.iter().zip(q2.iter()) {
            let difference = angle_signed_diff(a, b);
            control.push(if difference >= F::zero() { F::one() } else { -F::one() });
            let magnitude = difference.abs();
            differences.push(magnitude);
            if duration < magnitude {
                duration = magnitude;
            }
        }
        assert!(duration > F::zero(), "steering requires distinct configurations");
        for (rate, magnitude) in control.iter_mut().zip(differences.iter()) {
            *rate = *rate * (*magnitude / duration);
        }
        Some(Trajectory::from_segment(Config::new(control), duration))
    }

    fn supports_steering(&self) -> bool {
        true
    }

    fn normalize(&self, configuration: &Config<F>) -> Config<F> {
        assert_eq!(configuration.dimension(), self.dimension(), "configuration dimension must match the robot");
        Config::new(configuration.iter().map(normalize_angle).collect())
    }

    fn shapes(&self) -> &[Polygon<F>] {
        &self.shapes
    }

    /// Forward kinematics: each link is placed at the tip of the previous
    /// one, with orientations accumulating along the chain.
    fn transformations(&self, configuration: &Config<F>) -> Vec<Transform2<F>> {
        assert_eq!(configuration.dimension(), self.dimension(), "configuration dimension must match the robot");
        let width = link_width::<F>();
        let mut result = Vec::with_capacity(self.dimension());
        let mut x = F::zero();
        let mut y = F::zero();
        let mut theta = normalize_angle(configuration[0]);
        result.push(Transform2::new(x, y, theta));
        for i in 1..self.dimension() {
            x = x + width * theta.cos();
            y = y + width * theta.sin();
            theta = normalize_angle(theta + configuration[i]);
            result.push(Transform2::new(x, y, theta));
        }
        result
    }
}

fn link_width<F: Float>() -> F {
    (F::one() + F::from(5.0).unwrap().sqrt()) / F::from(2.0).unwrap()
}

/// A link: a thin rectangle extending along its local x-axis from the joint.
fn link_rectangle<F: Float>() -> Polygon<F> {
    let width = link_width::<F>();
    let half_height = F::from(0.3).unwrap() / F::from(2.0).unwrap();
    Polygon::new(vec![
        Point2::new(F::zero(), half_height),
        Point2::new(F::zero(), -half_height),
        Point2::new(width, -half_height),
        Point2::new(width, half_height),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn forward_kinematics_chain() {
        let arm: RobotArm<f64> = RobotArm::new(2);
        let width = link_width::<f64>();

        let straight = arm.transformations(&Config::new(vec![0.0, 0.0]));
        assert_eq!(straight.len(), 2);
        assert!(straight[0].x().abs() < 1e-12);
        assert!((straight[1].x() - width).abs() < 1e-12);
        assert!(straight[1].y().abs() < 1e-12);

        let bent = arm.transformations(&Config::new(vec![FRAC_PI_2, FRAC_PI_2]));
        assert!(bent[1].x().abs() < 1e-12);
        assert!((bent[1].y() - width).abs() < 1e-12);
        assert!((normalize_angle(bent[1].theta()) - PI).abs() < 1e-12);
    }

    #[test]
    fn metric_sums_joint_differences() {
        let arm: RobotArm<f64> = RobotArm::new(3);
        let q1 = Config::new(vec![0.0, 1.0, 2.0 * PI - 0.5]);
        let q2 = Config::new(vec![0.5, 1.0, 0.0]);
        assert!((arm.metric(&q1, &q2) - 1.0).abs() < 1e-12);
        assert!((arm.metric(&q1, &q2) - arm.metric(&q2, &q1)).abs() < 1e-12);
        assert_eq!(arm.metric(&q1, &q1), 0.0);
    }

    #[test]
    fn propagate_wraps_joints() {
        let arm: RobotArm<f64> = RobotArm::new(2);
        let q = Config::new(vec![2.0 * PI - 0.1, 0.0]);
        let u = Config::new(vec![1.0, -1.0]);
        let moved = arm.propagate(&q, &u, 0.2);
        assert!((moved[0] - 0.1).abs() < 1e-12);
        assert!((moved[1] - (2.0 * PI - 0.2)).abs() < 1e-12);
    }

    #[test]
    fn steering_reaches_the_target() {
        let arm: RobotArm<f64> = RobotArm::new(4);
        let mut rng = StdRng::seed_from_u64(7);
        let environment = Environment::new(Vec::new());
        for _ in 0..50 {
            let q1 = arm.random_configuration(&environment, &mut rng);
            let q2 = arm.random_configuration(&environment, &mut rng);
            if q1 == q2 {
                continue;
            }
            let trajectory = arm.steer(&q1, &q2).unwrap();
            assert_eq!(trajectory.len(), 1);
            let reached = arm.propagate(&q1, trajectory.control(0), trajectory.duration(0));
            let target = arm.normalize(&q2);
            for i in 0..4 {
                assert!(angle_abs_diff(reached[i], target[i]) < 1e-9);
            }
        }
    }

    #[test]
    fn steering_duration_is_largest_joint_move() {
        let arm: RobotArm<f64> = RobotArm::new(3);
        let q1 = Config::new(vec![0.0, 0.0, 0.0]);
        let q2 = Config::new(vec![0.5, 2.0 * PI - 0.25, 1.0]);
        let trajectory = arm.steer(&q1, &q2).unwrap();
        assert!((trajectory.duration(0) - 1.0).abs() < 1e-12);
        let control = trajectory.control(0);
        assert!((control[0] - 0.5).abs() < 1e-12);
        assert!((control[1] + 0.25).abs() < 1e-12);
        assert!((control[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn random_samples_stay_on_the_torus() {
        let arm: RobotArm<f64> = RobotArm::new(5);
        let environment = Environment::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            let q = arm.random_configuration(&environment, &mut rng);
            assert_eq!(q.dimension(), 5);
            for angle in q.iter() {
                assert!((0.0..2.0 * PI).contains(&angle));
            }
            let u = arm.random_control(&mut rng);
            for rate in u.iter() {
                assert!((-1.0..1.0).contains(&rate));
            }
        }
    }
}
