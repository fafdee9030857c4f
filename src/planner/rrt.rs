use crate::config::{Config, Control};
use crate::environment::Environment;
use crate::geom::Point2;
use crate::planner::{nearest_k, resolution, Planner, PlannerCore};
use crate::robot::Robot;
use crate::trajectory::Trajectory;
use num_traits::{Float, FloatConst};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use std::collections::BTreeMap;

/// Duration of one expansion motion when random durations are disabled.
fn default_delta<F: Float>() -> F {
    F::from(0.1).unwrap()
}

/// A node of the exploration tree: a configuration plus the motion that
/// reached it. The root carries no motion.
struct RrtNode<F: Float> {
    config: Config<F>,
    parent: Option<usize>,
    control: Option<Control<F>>,
    duration: F,
}

/// A rapidly-exploring random tree over the robot's discrete control set.
///
/// Growth repeatedly draws a random configuration (occasionally substituting
/// the goal), finds its nearest tree nodes, and tries one random control from
/// each of them, keeping the collision-free results. The tree only ever
/// grows; every non-root node has exactly one parent, so it stays acyclic.
///
/// The returned trajectory ends at the tree node nearest the goal, which may
/// still be far from it: callers check the final-configuration error.
pub struct RrtPlanner<F: Float + FloatConst + SampleUniform> {
    core: PlannerCore<F>,
    nodes: Vec<RrtNode<F>>,
    index: BTreeMap<Config<F>, usize>,
    neighbors: usize,
    random_duration: bool,
    goal_bias: bool,
}

impl<F: Float + FloatConst + SampleUniform> RrtPlanner<F> {
    /// Creates a tree planner.
    ///
    /// Parameters:
    /// - `neighbors`: how many nearest tree nodes each sample expands from.
    /// - `random_duration`: draw each motion duration uniformly from
    ///   [0.05, 0.2) instead of the fixed default.
    /// - `goal_bias`: substitute the goal for one sample in a hundred.
    pub fn new(
        environment: Environment<F>,
        robot: Box<dyn Robot<F>>,
        neighbors: usize,
        random_duration: bool,
        goal_bias: bool,
    ) -> Self {
        assert!(neighbors > 0, "expansion needs at least one neighbor");
        Self {
            core: PlannerCore::new(environment, robot),
            nodes: Vec::new(),
            index: BTreeMap::new(),
            neighbors,
            random_duration,
            goal_bias,
        }
    }

    /// Tries to expand the tree from `parent` with one random control held
    /// for `duration`. The new node is kept only if the motion is
    /// collision-free and its end configuration is not already in the tree.
    fn expand(&mut self, parent: usize, duration: F) -> bool {
        let control = self.core.robot.random_control(&mut self.core.rng);
        let trajectory = Trajectory::from_segment(control.clone(), duration);
        let from = self.nodes[parent].config.clone();
        if !self
            .core
            .environment
            .is_valid_motion(self.core.robot(), &from, &trajectory, resolution())
        {
            return false;
        }
        let reached = self.core.robot.propagate(&from, &control, duration);
        if self.index.contains_key(&reached) {
            return false;
        }
        let id = self.nodes.len();
        self.index.insert(reached.clone(), id);
        self.nodes.push(RrtNode {
            config: reached,
            parent: Some(parent),
            control: Some(control),
            duration,
        });
        true
    }
}

impl<F: Float + FloatConst + SampleUniform> Planner<F> for RrtPlanner<F> {
    fn core(&self) -> &PlannerCore<F> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PlannerCore<F> {
        &mut self.core
    }

    fn setup(&mut self) {
        let start = self.core.start().clone();
        self.index.insert(start.clone(), 0);
        self.nodes.push(RrtNode {
            config: start,
            parent: None,
            control: None,
            duration: F::zero(),
        });
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    fn grow_map(&mut self, k: usize) {
        for _ in 0..k {
            let (mut sample, _) = self.core.sample_configuration();
            if self.goal_bias && self.core.rng.gen_range(0..100) == 0 {
                sample = self.core.goal().clone();
            }
            let nearest = nearest_k(
                self.core.robot(),
                self.nodes.iter().map(|node| &node.config),
                &sample,
                self.neighbors,
            );
            for parent in nearest {
                let duration = if self.random_duration {
                    self.core.rng.gen_range(F::from(0.05).unwrap()..F::from(0.2).unwrap())
                } else {
                    default_delta()
                };
                self.expand(parent, duration);
            }
        }
    }

    /// Back-chains from the tree node nearest the goal and concatenates the
    /// stored motions, start to finish.
    fn find_path(&self) -> Option<Trajectory<F>> {
        let nearest = nearest_k(
            self.core.robot(),
            self.nodes.iter().map(|node| &node.config),
            self.core.goal(),
            1,
        );
        let mut id = *nearest.first()?;
        let mut segments = Vec::new();
        while let Some(parent) = self.nodes[id].parent {
            let node = &self.nodes[id];
            let control = node.control.clone().expect("non-root nodes store their motion");
            segments.push((control, node.duration));
            id = parent;
        }
        segments.reverse();
        let mut trajectory = Trajectory::new();
        for (control, duration) in segments {
            trajectory.push(control, duration);
        }
        Some(trajectory)
    }

    fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Parent-to-child tree edges projected onto the workspace plane.
    fn edges(&self) -> Vec<(Point2<F>, Point2<F>)> {
        self.nodes
            .iter()
            .filter_map(|node| {
                node.parent
                    .map(|parent| (self.nodes[parent].config.planar(), node.config.planar()))
            })
            .collect()
    }
}
