pub mod prm;
pub mod rrt;

pub use prm::PrmPlanner;
pub use rrt::RrtPlanner;

use crate::config::Config;
use crate::environment::Environment;
use crate::geom::Point2;
use crate::robot::Robot;
use crate::trajectory::Trajectory;
use crate::util::OrderedFloat;
use log::debug;
use num_traits::{Float, FloatConst};
use rand::distributions::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BinaryHeap;
use std::time::Instant;

/// Time resolution for collision checking along interpolated motions.
pub(crate) fn resolution<F: Float>() -> F {
    F::from(0.01).unwrap()
}

/// State shared by every planner: the workspace, the robot, the normalized
/// query endpoints, and a deterministically seeded random generator so that
/// repeated runs with identical parameters draw identical samples.
pub struct PlannerCore<F: Float + FloatConst + SampleUniform> {
    pub(crate) environment: Environment<F>,
    pub(crate) robot: Box<dyn Robot<F>>,
    pub(crate) rng: StdRng,
    pub(crate) default_size: usize,
    start: Option<Config<F>>,
    goal: Option<Config<F>>,
    samples_drawn: u64,
    samples_free: u64,
}

impl<F: Float + FloatConst + SampleUniform> PlannerCore<F> {
    pub fn new(environment: Environment<F>, robot: Box<dyn Robot<F>>) -> Self {
        Self {
            environment,
            robot,
            rng: StdRng::seed_from_u64(0),
            default_size: 1000,
            start: None,
            goal: None,
            samples_drawn: 0,
            samples_free: 0,
        }
    }

    pub fn environment(&self) -> &Environment<F> {
        &self.environment
    }

    pub fn robot(&self) -> &dyn Robot<F> {
        self.robot.as_ref()
    }

    /// The normalized start of the current query.
    pub fn start(&self) -> &Config<F> {
        self.start.as_ref().expect("no query configured: call solve or query first")
    }

    /// The normalized goal of the current query.
    pub fn goal(&self) -> &Config<F> {
        self.goal.as_ref().expect("no query configured: call solve or query first")
    }

    /// Validates and normalizes a start/goal pair for a new query.
    pub(crate) fn set_endpoints(&mut self, start: &Config<F>, goal: &Config<F>) {
        assert_eq!(start.dimension(), self.robot.dimension(), "start dimension must match the robot");
        assert_eq!(goal.dimension(), self.robot.dimension(), "goal dimension must match the robot");
        self.start = Some(self.robot.normalize(start));
        self.goal = Some(self.robot.normalize(goal));
    }

    /// Draws one random configuration, recording whether it landed in free
    /// space. Costs exactly one collision check.
    pub(crate) fn sample_configuration(&mut self) -> (Config<F>, bool) {
        let configuration = self.robot.random_configuration(&self.environment, &mut self.rng);
        self.samples_drawn += 1;
        let free = self.environment.is_valid_configuration(self.robot.as_ref(), &configuration);
        if free {
            self.samples_free += 1;
        }
        (configuration, free)
    }

    /// The fraction of drawn random samples that landed in free space.
    pub fn free_sample_rate(&self) -> f64 {
        self.samples_free as f64 / self.samples_drawn as f64
    }
}

/// The planner life cycle shared by tree and roadmap planners.
///
/// [`Planner::solve`] is the full cycle: normalize the endpoints, reset and
/// re-seed the structures, grow them to the default size, and search.
/// [`Planner::grow`] adds samples without resetting, and
/// [`Planner::query`] answers a new endpoint pair against the existing
/// structures where the planner supports it.
pub trait Planner<F: Float + FloatConst + SampleUniform> {
    fn core(&self) -> &PlannerCore<F>;

    fn core_mut(&mut self) -> &mut PlannerCore<F>;

    /// Initializes the planner's structures for the current endpoints.
    fn setup(&mut self);

    /// Clears the planner's structures.
    fn reset(&mut self);

    /// Grows the planner's structures by `k` samples.
    fn grow_map(&mut self, k: usize);

    /// Searches the grown structures for a trajectory from start to goal.
    fn find_path(&self) -> Option<Trajectory<F>>;

    /// The number of nodes in the planner's structures.
    fn size(&self) -> usize;

    /// The edges of the planner's structures projected onto the workspace
    /// plane, for debugging overlays. Planners without an edge list return
    /// nothing.
    fn edges(&self) -> Vec<(Point2<F>, Point2<F>)> {
        Vec::new()
    }

    /// Plans a trajectory from `start` to `goal`, rebuilding the planner's
    /// structures from scratch.
    fn solve(&mut self, start: &Config<F>, goal: &Config<F>) -> Option<Trajectory<F>> {
        self.core_mut().set_endpoints(start, goal);
        self.reset();
        self.setup();
        let size = self.core().default_size;
        self.grow(size);
        self.find_path()
    }

    /// Grows the structures by `k` samples, logging the growth rate.
    fn grow(&mut self, k: usize) {
        assert!(k > 0, "growth amount must be positive");
        let started = Instant::now();
        self.grow_map(k);
        let seconds = started.elapsed().as_secs_f64();
        debug!("grew {} samples in {:.3}s ({:.0} samples/s)", k, seconds, k as f64 / seconds);
    }

    /// Answers a new start/goal pair. The default rebuilds from scratch;
    /// roadmap planners override this to reuse the grown roadmap.
    fn query(&mut self, start: &Config<F>, goal: &Config<F>) -> Option<Trajectory<F>> {
        self.solve(start, goal)
    }

    /// Changes the number of samples grown by [`Planner::solve`].
    fn set_default_size(&mut self, size: usize) {
        assert!(size > 0, "default size must be positive");
        self.core_mut().default_size = size;
    }

    /// The fraction of drawn random samples that landed in free space.
    fn free_sample_rate(&self) -> f64 {
        self.core().free_sample_rate()
    }
}

/// Finds the indices of the `k` candidates nearest to `query` under the
/// robot's metric, nearest first.
///
/// One pass with a bounded max-heap of size `k`: linear in the candidate
/// count, which is the intended cost at roadmap scale. Ties are broken
/// arbitrarily.
pub(crate) fn nearest_k<'a, F, I>(robot: &dyn Robot<F>, candidates: I, query: &Config<F>, k: usize) -> Vec<usize>
where
    F: Float + FloatConst + SampleUniform + 'a,
    I: IntoIterator<Item = &'a Config<F>>,
{
    let mut heap: BinaryHeap<(OrderedFloat<F>, usize)> = BinaryHeap::with_capacity(k + 1);
    for (index, candidate) in candidates.into_iter().enumerate() {
        let distance = OrderedFloat::from(robot.metric(query, candidate));
        if heap.len() < k {
            heap.push((distance, index));
        } else if let Some(farthest) = heap.peek() {
            if distance < farthest.0 {
                heap.pop();
                heap.push((distance, index));
            }
        }
    }
    heap.into_sorted_vec().into_iter().map(|(_, index)| index).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::RobotArm;

    #[test]
    fn nearest_k_matches_brute_force() {
        let arm: RobotArm<f64> = RobotArm::new(3);
        let environment = Environment::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(42);

        let candidates: Vec<Config<f64>> = (0..100)
            .map(|_| arm.random_configuration(&environment, &mut rng))
            .collect();
        let query = arm.random_configuration(&environment, &mut rng);

        let mut by_distance: Vec<(f64, usize)> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (arm.metric(&query, c), i))
            .collect();
        by_distance.sort_by(|a, b| a.partial_cmp(b).unwrap());

        for k in [1, 2, 5] {
            let found = nearest_k(&arm, candidates.iter(), &query, k);
            let expected: Vec<usize> = by_distance.iter().take(k).map(|&(_, i)| i).collect();
            assert_eq!(found, expected, "k = {k}");
        }
    }

    #[test]
    fn nearest_k_with_short_candidate_lists() {
        let arm: RobotArm<f64> = RobotArm::new(2);
        let candidates = vec![Config::new(vec![0.0, 0.0]), Config::new(vec![1.0, 1.0])];
        let query = Config::new(vec![0.9, 0.9]);
        assert_eq!(nearest_k(&arm, candidates.iter(), &query, 5), vec![1, 0]);
        let empty: Vec<Config<f64>> = Vec::new();
        assert!(nearest_k(&arm, empty.iter(), &query, 3).is_empty());
    }

    #[test]
    fn endpoints_are_normalized() {
        let environment = Environment::new(Vec::new());
        let mut core = PlannerCore::new(environment, Box::new(RobotArm::<f64>::new(2)));
        let start = Config::new(vec![-0.5, 7.0]);
        let goal = Config::new(vec![0.0, 0.0]);
        core.set_endpoints(&start, &goal);
        for angle in core.start().iter() {
            assert!((0.0..2.0 * std::f64::consts::PI).contains(&angle));
        }
        assert_eq!(core.goal(), &goal);
    }

    #[test]
    #[should_panic]
    fn endpoint_dimension_mismatch_panics() {
        let environment = Environment::new(Vec::new());
        let mut core = PlannerCore::new(environment, Box::new(RobotArm::<f64>::new(2)));
        core.set_endpoints(&Config::new(vec![0.0, 0.0, 0.0]), &Config::new(vec![0.0, 0.0]));
    }

    #[test]
    fn sampling_tracks_the_free_rate() {
        let environment = Environment::new(Vec::new());
        let mut core = PlannerCore::new(environment, Box::new(RobotArm::<f64>::new(2)));
        for _ in 0..10 {
            let (_, free) = core.sample_configuration();
            assert!(free);
        }
        assert_eq!(core.free_sample_rate(), 1.0);
        assert_eq!(core.environment().collision_checks(), 10);
    }
}
