use crate::config::Config;
use crate::error::{PlanError, Result};
use crate::geom::{Point2, Polygon, Rect};
use crate::robot::Robot;
use crate::trajectory::Trajectory;
use log::info;
use num_traits::{Float, FloatConst};
use rand::distributions::uniform::SampleUniform;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// The workspace: a fixed set of closed polygonal obstacles plus the
/// bounding rectangle used for sampling.
///
/// The obstacle set is immutable after construction. The only mutable state
/// is a collision-check counter, incremented atomically so concurrent
/// validity checks stay safe.
pub struct Environment<F> {
    obstacles: Vec<Polygon<F>>,
    bounds: Rect<F>,
    collision_checks: AtomicU64,
}

impl<F: Float> Environment<F> {
    /// Creates an environment whose bounds are the bounding box of the
    /// obstacle union. With no obstacles the bounds collapse to the origin;
    /// use [`Environment::with_bounds`] for an open workspace.
    pub fn new(obstacles: Vec<Polygon<F>>) -> Self {
        let bounds = obstacles
            .iter()
            .map(|obstacle| obstacle.bounds())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(Rect::empty);
        Self::with_bounds(bounds, obstacles)
    }

    /// Creates an environment with explicit workspace bounds.
    pub fn with_bounds(bounds: Rect<F>, obstacles: Vec<Polygon<F>>) -> Self {
        Self {
            obstacles,
            bounds,
            collision_checks: AtomicU64::new(0),
        }
    }

    /// Reads obstacles from a file in the plain-text obstacle format.
    ///
    /// Line 1 holds the obstacle count; each obstacle is a vertex count
    /// followed by one `x y` line per vertex, implicitly closed. Malformed
    /// input is fatal: no partial obstacle set is ever produced.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }

    /// Parses the obstacle format from any buffered reader.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = LineReader::new(reader);
        let count = lines.count_line("obstacle count")?;
        let mut obstacles = Vec::with_capacity(count);
        for _ in 0..count {
            let vertex_count = lines.count_line("vertex count")?;
            if vertex_count < 3 {
                return Err(PlanError::Parse {
                    line: lines.line,
                    message: format!("a polygon requires at least three vertices, found {vertex_count}"),
                });
            }
            let mut vertices = Vec::with_capacity(vertex_count);
            for _ in 0..vertex_count {
                vertices.push(lines.vertex_line()?);
            }
            obstacles.push(Polygon::new(vertices));
        }
        info!("loaded {} obstacles", obstacles.len());
        Ok(Self::new(obstacles))
    }

    /// The axis-aligned bounds of the workspace.
    pub fn bounds(&self) -> Rect<F> {
        self.bounds
    }

    /// The obstacle outlines, for rendering.
    pub fn obstacles(&self) -> impl Iterator<Item = &Polygon<F>> {
        self.obstacles.iter()
    }

    /// The number of configuration validity checks performed so far.
    pub fn collision_checks(&self) -> u64 {
        self.collision_checks.load(Ordering::Relaxed)
    }
}

impl<F: Float + FloatConst + SampleUniform> Environment<F> {
    /// Checks whether the robot's occupied area at `configuration` avoids
    /// every obstacle. Every call increments the collision-check counter by
    /// exactly one, whatever the outcome.
    pub fn is_valid_configuration(&self, robot: &dyn Robot<F>, configuration: &Config<F>) -> bool {
        assert_eq!(
            configuration.dimension(),
            robot.dimension(),
            "configuration dimension must match the robot"
        );
        self.collision_checks.fetch_add(1, Ordering::Relaxed);
        robot
            .area(configuration)
            .iter()
            .all(|body| self.obstacles.iter().all(|obstacle| !obstacle.intersects_polygon(body)))
    }

    /// Checks every configuration of a path. Equivalent to checking each
    /// configuration in sequence; evaluation may stop at the first collision.
    pub fn is_valid_path(&self, robot: &dyn Robot<F>, path: &[Config<F>]) -> bool {
        path.iter().all(|configuration| self.is_valid_configuration(robot, configuration))
    }

    /// Checks a trajectory from `configuration`, interpolated at `resolution`.
    pub fn is_valid_motion(
        &self,
        robot: &dyn Robot<F>,
        configuration: &Config<F>,
        trajectory: &Trajectory<F>,
        resolution: F,
    ) -> bool {
        self.is_valid_path(robot, &robot.interpolate(configuration, trajectory, resolution))
    }

    /// Checks whether the robot's direct steering motion from `q1` to `q2`
    /// is collision-free. Fails with [`PlanError::SteeringUnsupported`] when
    /// the robot provides no steering function.
    pub fn is_steerable(
        &self,
        robot: &dyn Robot<F>,
        q1: &Config<F>,
        q2: &Config<F>,
        resolution: F,
    ) -> Result<bool> {
        assert_eq!(q1.dimension(), robot.dimension(), "configuration dimension must match the robot");
        assert_eq!(q2.dimension(), robot.dimension(), "configuration dimension must match the robot");
        let trajectory = robot.steer(q1, q2).ok_or(PlanError::SteeringUnsupported)?;
        Ok(self.is_valid_motion(robot, q1, &trajectory, resolution))
    }
}

/// Tracks line numbers while pulling tokens out of the obstacle format.
struct LineReader<R: BufRead> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self) -> Result<String> {
        self.line += 1;
        match self.lines.next() {
            Some(Ok(text)) => Ok(text),
            Some(Err(error)) => Err(PlanError::Io(error)),
            None => Err(PlanError::Parse {
                line: self.line,
                message: "unexpected end of input".to_string(),
            }),
        }
    }

    fn count_line(&mut self, what: &str) -> Result<usize> {
        let text = self.next_line()?;
        text.trim().parse().map_err(|_| PlanError::Parse {
            line: self.line,
            message: format!("expected {what}, found {text:?}"),
        })
    }

    fn vertex_line<F: Float>(&mut self) -> Result<Point2<F>> {
        let text = self.next_line()?;
        let mut tokens = text.split_whitespace();
        let x = self.coordinate(tokens.next(), &text)?;
        let y = self.coordinate(tokens.next(), &text)?;
        if tokens.next().is_some() {
            return Err(PlanError::Parse {
                line: self.line,
                message: format!("expected two coordinates, found {text:?}"),
            });
        }
        Ok(Point2::new(x, y))
    }

    fn coordinate<F: Float>(&self, token: Option<&str>, text: &str) -> Result<F> {
        token
            .and_then(|t| t.parse::<f64>().ok())
            .and_then(F::from)
            .ok_or_else(|| PlanError::Parse {
                line: self.line,
                message: format!("expected two coordinates, found {text:?}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::PlanarRobot;
    use std::io::Cursor;
    use std::io::Write;

    const TWO_SQUARES: &str = "2\n4\n0 0\n1 0\n1 1\n0 1\n4\n3 3\n5.5 3\n5.5 4\n3 4\n";

    fn unit_square() -> Polygon<f64> {
        Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn parses_the_obstacle_format() {
        let environment: Environment<f64> = Environment::parse(Cursor::new(TWO_SQUARES)).unwrap();
        assert_eq!(environment.obstacles().count(), 2);
        let bounds = environment.bounds();
        assert_eq!(bounds.min(), Point2::new(0.0, 0.0));
        assert_eq!(bounds.max(), Point2::new(5.5, 4.0));
    }

    #[test]
    fn loads_obstacles_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_SQUARES.as_bytes()).unwrap();
        let environment: Environment<f64> = Environment::from_file(file.path()).unwrap();
        assert_eq!(environment.obstacles().count(), 2);
    }

    #[test]
    fn rejects_malformed_input() {
        let cases = [
            "",                          // missing obstacle count
            "one\n",                     // non-numeric count
            "1\n4\n0 0\n1 0\n1 1\n",     // truncated vertex list
            "1\n2\n0 0\n1 0\n",          // too few vertices
            "1\n3\n0 0\n1 0\nx y\n",     // non-numeric coordinate
            "1\n3\n0 0\n1 0\n1 1 1\n",   // too many coordinates
        ];
        for case in cases {
            let result: Result<Environment<f64>> = Environment::parse(Cursor::new(case));
            assert!(result.is_err(), "accepted {case:?}");
        }
    }

    #[test]
    fn counter_increments_once_per_check() {
        let environment = Environment::new(vec![unit_square()]);
        let robot: PlanarRobot<f64> = PlanarRobot::dubins_car();
        assert_eq!(environment.collision_checks(), 0);
        let hit = Config::new(vec![0.5, 0.5, 0.0]);
        let miss = Config::new(vec![4.0, 4.0, 0.0]);
        assert!(!environment.is_valid_configuration(&robot, &hit));
        assert_eq!(environment.collision_checks(), 1);
        assert!(environment.is_valid_configuration(&robot, &miss));
        assert_eq!(environment.collision_checks(), 2);
    }

    #[test]
    fn path_validity_matches_per_configuration_checks() {
        let environment = Environment::new(vec![unit_square()]);
        let robot: PlanarRobot<f64> = PlanarRobot::dubins_car();
        let clear = vec![
            Config::new(vec![3.0, 3.0, 0.0]),
            Config::new(vec![4.0, 3.0, 0.0]),
        ];
        let blocked = vec![
            Config::new(vec![3.0, 3.0, 0.0]),
            Config::new(vec![0.5, 0.5, 0.0]),
        ];
        assert!(environment.is_valid_path(&robot, &clear));
        assert!(!environment.is_valid_path(&robot, &blocked));
    }

    #[test]
    fn motion_validity_interpolates_through_obstacles() {
        let environment = Environment::new(vec![unit_square()]);
        let robot: PlanarRobot<f64> = PlanarRobot::dubins_car();
        // Driving straight from the left of the square to its right passes
        // through it even though both endpoints are clear.
        let from = Config::new(vec![-2.0, 0.5, 0.0]);
        let forward = Config::new(vec![1.0, 0.0, 0.0]);
        let through = Trajectory::from_segment(forward.clone(), 5.0);
        assert!(!environment.is_valid_motion(&robot, &from, &through, 0.01));

        let clear_start = Config::new(vec![-2.0, 3.0, 0.0]);
        let past = Trajectory::from_segment(forward, 5.0);
        assert!(environment.is_valid_motion(&robot, &clear_start, &past, 0.01));
    }

    #[test]
    fn steering_requires_a_steering_function() {
        let environment = Environment::new(vec![unit_square()]);
        let robot: PlanarRobot<f64> = PlanarRobot::dubins_car();
        let q1 = Config::new(vec![2.0, 2.0, 0.0]);
        let q2 = Config::new(vec![3.0, 2.0, 0.0]);
        let result = environment.is_steerable(&robot, &q1, &q2, 0.01);
        assert!(matches!(result, Err(PlanError::SteeringUnsupported)));
    }

    #[test]
    fn explicit_bounds_override_the_union() {
        let bounds = Rect::new(Point2::new(-5.0, -5.0), Point2::new(5.0, 5.0));
        let environment: Environment<f64> = Environment::with_bounds(bounds, Vec::new());
        assert_eq!(environment.bounds(), bounds);
        assert_eq!(Environment::<f64>::new(Vec::new()).bounds(), Rect::empty());
    }
}
