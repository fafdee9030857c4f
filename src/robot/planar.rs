use crate::config::{Config, Control};
use crate::environment::Environment;
use crate::geom::{Point2, Polygon, Transform2};
use crate::robot::{angle_abs_diff, normalize_angle, Robot};
use num_traits::{Float, FloatConst};
use rand::distributions::uniform::SampleUniform;
use rand::{Rng, RngCore};

const DIMENSION: usize = 3;

/// A rigid body moving in the plane, with configuration (x, y, theta).
///
/// Motion integrates a constant twist on SE(2) exactly. The admissible
/// controls are a finite preset selected by the factory used: a forward-only
/// car, a car with reverse, a differential drive, or an omnidirectional
/// body. Presets differ only in their control tables, not in behavior.
pub struct PlanarRobot<F> {
    shape: Polygon<F>,
    controls: Vec<Control<F>>,
}

impl<F: Float + FloatConst + SampleUniform> PlanarRobot<F> {
    fn new(shape: Polygon<F>, controls: Vec<Control<F>>) -> Self {
        Self { shape, controls }
    }

    /// A forward-only car: drive straight, or arc left or right.
    pub fn dubins_car() -> Self {
        Self::new(body_rectangle(), vec![control(1.0, 0.0, 0.0), control(1.0, 0.0, 1.0), control(1.0, 0.0, -1.0)])
    }

    /// A car that can also reverse through the same three motions.
    pub fn reeds_shepp_car() -> Self {
        Self::new(
            body_rectangle(),
            vec![
                control(1.0, 0.0, 0.0),
                control(1.0, 0.0, 1.0),
                control(1.0, 0.0, -1.0),
                control(-1.0, 0.0, 0.0),
                control(-1.0, 0.0, 1.0),
                control(-1.0, 0.0, -1.0),
            ],
        )
    }

    /// A differential drive: straight motion or turning in place.
    pub fn differential_drive() -> Self {
        Self::new(
            body_rectangle(),
            vec![
                control(1.0, 0.0, 0.0),
                control(-1.0, 0.0, 0.0),
                control(0.0, 0.0, 1.0),
                control(0.0, 0.0, -1.0),
            ],
        )
    }

    /// A triangular omnidirectional body: translation along the three body
    /// axes, pure rotation, and combined arcing motions.
    pub fn omnidirectional() -> Self {
        let c = F::from(3.0).unwrap().sqrt() / F::from(3.0).unwrap();
        let c2 = F::from(3.0).unwrap().sqrt() / F::from(1.5).unwrap();
        let third = F::one() / F::from(3.0).unwrap();
        let four_thirds = F::from(4.0).unwrap() / F::from(3.0).unwrap();
        let two_thirds = F::from(2.0).unwrap() / F::from(3.0).unwrap();
        let controls = vec![
            Config::new(vec![c, F::one(), F::zero()]),
            Config::new(vec![-c, -F::one(), F::zero()]),
            Config::new(vec![-c, F::one(), F::zero()]),
            Config::new(vec![c, -F::one(), F::zero()]),
            Config::new(vec![-c2, F::zero(), F::zero()]),
            Config::new(vec![c2, F::zero(), F::zero()]),
            Config::new(vec![F::zero(), F::zero(), F::one()]),
            Config::new(vec![F::zero(), F::zero(), -F::one()]),
            Config::new(vec![F::zero(), -four_thirds, third]),
            Config::new(vec![F::zero(), four_thirds, -third]),
            Config::new(vec![c2, two_thirds, third]),
            Config::new(vec![-c2, -two_thirds, -third]),
            Config::new(vec![-c2, two_thirds, third]),
            Config::new(vec![c2, -two_thirds, -third]),
        ];
        Self::new(body_triangle(), controls)
    }
}

impl<F: Float + FloatConst + SampleUniform> Robot<F> for PlanarRobot<F> {
    fn dimension(&self) -> usize {
        DIMENSION
    }

    /// The larger of the positional distance and the weighted angular
    /// difference, so either mismatch alone dominates.
    fn metric(&self, q1: &Config<F>, q2: &Config<F>) -> F {
        assert_eq!(q1.dimension(), self.dimension(), "configuration dimension must match the robot");
        assert_eq!(q2.dimension(), self.dimension(), "configuration dimension must match the robot");
        let distance = (q1[0] - q2[0]).hypot(q1[1] - q2[1]);
        distance.max(angle_weight::<F>() * angle_abs_diff(q1[2], q2[2]))
    }

    fn random_configuration(&self, environment: &Environment<F>, rng: &mut dyn RngCore) -> Config<F> {
        let bounds = environment.bounds();
        let x = rng.gen_range(F::zero()..F::one()) * bounds.width() + bounds.min().x;
        let y = rng.gen_range(F::zero()..F::one()) * bounds.height() + bounds.min().y;
        let theta = rng.gen_range(F::zero()..F::one()) * (F::PI() + F::PI());
        Config::new(vec![x, y, theta])
    }

    fn random_control(&self, rng: &mut dyn RngCore) -> Control<F> {
        self.controls[rng.gen_range(0..self.controls.len())].clone()
    }

    fn controls(&self) -> Option<&[Control<F>]> {
        Some(&self.controls)
    }

    fn propagate(&self, configuration: &Config<F>, control: &Control<F>, duration: F) -> Config<F> {
        assert_eq!(configuration.dimension(), self.dimension(), "configuration dimension must match the robot");
        assert_eq!(control.dimension(), self.dimension(), "control dimension must match the robot");
        let pose = Transform2::new(configuration[0], configuration[1], configuration[2]);
        let moved = pose.compose(&Transform2::from_twist(control[0], control[1], control[2], duration));
        Config::new(vec![moved.x(), moved.y(), normalize_angle(moved.theta())])
    }

    fn normalize(&self, configuration: &Config<F>) -> Config<F> {
        assert_eq!(configuration.dimension(), self.dimension(), "configuration dimension must match the robot");
        Config::new(vec![configuration[0], configuration[1], normalize_angle(configuration[2])])
    }

    fn shapes(&self) -> &[Polygon<F>] {
        std::slice::from_ref(&self.shape)
    }

    fn transformations(&self, configuration: &Config<F>) -> Vec<Transform2<F>> {
        assert_eq!(configuration.dimension(), self.dimension(), "configuration dimension must match the robot");
        vec![Transform2::new(configuration[0], configuration[1], configuration[2])]
    }
}

fn control<F: Float>(vx: f64, vy: f64, omega: f64) -> Control<F> {
    Config::new(vec![
        F::from(vx).unwrap(),
        F::from(vy).unwrap(),
        F::from(omega).unwrap(),
    ])
}

fn angle_weight<F: Float>() -> F {
    F::one()
}

fn golden_ratio<F: Float>() -> F {
    (F::one() + F::from(5.0).unwrap().sqrt()) / F::from(2.0).unwrap()
}

/// The rectangular car body, centered on the configuration point.
fn body_rectangle<F: Float>() -> Polygon<F> {
    let scale = F::from(0.2).unwrap();
    let half_width = scale * golden_ratio();
    let half_height = scale;
    Polygon::new(vec![
        Point2::new(-half_width, half_height),
        Point2::new(-half_width, -half_height),
        Point2::new(half_width, -half_height),
        Point2::new(half_width, half_height),
    ])
}

/// The triangular omnidirectional body, nose along the body x-axis.
fn body_triangle<F: Float>() -> Polygon<F> {
    let scale = F::from(0.2).unwrap();
    let half_width = scale * golden_ratio();
    let sqrt3 = F::from(3.0).unwrap().sqrt();
    let x = half_width / (F::from(2.0).unwrap() * sqrt3);
    let y = half_width / F::from(2.0).unwrap();
    Polygon::new(vec![
        Point2::new(half_width / sqrt3, F::zero()),
        Point2::new(-x, y),
        Point2::new(-x, -y),
    ])
}
