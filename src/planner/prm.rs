use crate::config::Config;
use crate::environment::Environment;
use crate::error::{PlanError, Result};
use crate::planner::{nearest_k, resolution, Planner, PlannerCore};
use crate::robot::Robot;
use crate::trajectory::Trajectory;
use crate::util::OrderedFloat;
use log::warn;
use num_traits::{Float, FloatConst};
use rand::distributions::uniform::SampleUniform;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// How many nearest roadmap nodes a new node attempts to connect to.
/// The constant recommended for asymptotic optimality in the sampling-based
/// planning literature.
const CONNECTION_NEIGHBORS: usize = 15;

/// Rejection-sampling attempts per grown node.
const SAMPLE_ATTEMPTS: usize = 10;

/// Overall budget multiplier: growing `k` nodes may consume at most
/// `10 * k` rejection rounds before growth reports a stall.
const GROWTH_ROUND_FACTOR: usize = 10;

/// A roadmap node: a free configuration with its outgoing weighted edges.
struct PrmNode<F: Float> {
    config: Config<F>,
    edges: Vec<(usize, F)>,
}

/// A probabilistic roadmap with A* queries.
///
/// The roadmap is a directed weighted graph: each connection is verified by
/// steering in both directions independently, so an edge pair may exist in
/// one direction only. Construction requires a robot with a steering
/// function; [`PrmPlanner::new`] rejects robots without one.
pub struct PrmPlanner<F: Float + FloatConst + SampleUniform> {
    core: PlannerCore<F>,
    nodes: Vec<PrmNode<F>>,
    index: BTreeMap<Config<F>, usize>,
}

impl<F: Float + FloatConst + SampleUniform> PrmPlanner<F> {
    /// Creates a roadmap planner, failing with
    /// [`PlanError::SteeringUnsupported`] when the robot cannot steer.
    pub fn new(environment: Environment<F>, robot: Box<dyn Robot<F>>) -> Result<Self> {
        if !robot.supports_steering() {
            return Err(PlanError::SteeringUnsupported);
        }
        Ok(Self {
            core: PlannerCore::new(environment, robot),
            nodes: Vec::new(),
            index: BTreeMap::new(),
        })
    }

    fn get_or_insert(&mut self, config: &Config<F>) -> usize {
        if let Some(&id) = self.index.get(config) {
            return id;
        }
        let id = self.nodes.len();
        self.index.insert(config.clone(), id);
        self.nodes.push(PrmNode {
            config: config.clone(),
            edges: Vec::new(),
        });
        id
    }

    fn upsert_edge(&mut self, from: usize, to: usize, cost: F) {
        let edges = &mut self.nodes[from].edges;
        if let Some(edge) = edges.iter_mut().find(|(target, _)| *target == to) {
            edge.1 = cost;
        } else {
            edges.push((to, cost));
        }
    }

    /// Splices a free configuration into the roadmap: connects it to its
    /// nearest nodes, testing steerability independently in each direction
    /// and recording a metric-cost edge for every direction that verifies.
    fn add_vertex(&mut self, free: &Config<F>) {
        let neighbors = nearest_k(
            self.core.robot(),
            self.nodes.iter().map(|node| &node.config),
            free,
            CONNECTION_NEIGHBORS,
        );
        let id = self.get_or_insert(free);
        for neighbor in neighbors {
            if neighbor == id {
                continue;
            }
            let neighbor_config = self.nodes[neighbor].config.clone();
            let inbound = self
                .core
                .environment
                .is_steerable(self.core.robot(), &neighbor_config, free, resolution())
                .expect("steering support verified at construction");
            if inbound {
                let cost = self.core.robot.metric(free, &neighbor_config);
                self.upsert_edge(neighbor, id, cost);
            }
            let outbound = self
                .core
                .environment
                .is_steerable(self.core.robot(), free, &neighbor_config, resolution())
                .expect("steering support verified at construction");
            if outbound {
                let cost = self.core.robot.metric(&neighbor_config, free);
                self.upsert_edge(id, neighbor, cost);
            }
        }
    }

    /// Draws random configurations until one lands in free space, giving up
    /// after a bounded number of attempts.
    fn generate_free_configuration(&mut self) -> Option<Config<F>> {
        for _ in 0..SAMPLE_ATTEMPTS {
            let (configuration, free) = self.core.sample_configuration();
            if free {
                return Some(configuration);
            }
        }
        None
    }

    /// A* over the roadmap from `start` to `goal`, returning the node path.
    ///
    /// The open set orders entries by accumulated cost plus heuristic, then
    /// by configuration, so expansion order is deterministic. A shorter
    /// route to a queued node replaces its stale entry. The search succeeds
    /// on the first pop of the goal node itself.
    fn astar(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        let robot = self.core.robot();
        let goal_config = self.nodes[goal].config.clone();

        let mut open: BTreeSet<OpenEntry<F>> = BTreeSet::new();
        let mut records: BTreeMap<usize, SearchRecord<F>> = BTreeMap::new();

        let heuristic = OrderedFloat::from(robot.metric(&self.nodes[start].config, &goal_config));
        open.insert(OpenEntry {
            priority: heuristic,
            config: self.nodes[start].config.clone(),
            node: start,
        });
        records.insert(
            start,
            SearchRecord {
                cost: F::zero(),
                priority: heuristic,
                parent: None,
            },
        );

        while let Some(entry) = open.pop_first() {
            if entry.node == goal {
                return Some(back_chain(&records, goal));
            }
            let cost = records[&entry.node].cost;
            for &(successor, weight) in &self.nodes[entry.node].edges {
                let new_cost = cost + weight;
                let heuristic = robot.metric(&self.nodes[successor].config, &goal_config);
                let priority = OrderedFloat::from(new_cost + heuristic);
                if let Some(existing) = records.get(&successor) {
                    if existing.priority <= priority {
                        continue;
                    }
                    open.remove(&OpenEntry {
                        priority: existing.priority,
                        config: self.nodes[successor].config.clone(),
                        node: successor,
                    });
                }
                records.insert(
                    successor,
                    SearchRecord {
                        cost: new_cost,
                        priority,
                        parent: Some(entry.node),
                    },
                );
                open.insert(OpenEntry {
                    priority,
                    config: self.nodes[successor].config.clone(),
                    node: successor,
                });
            }
        }
        None
    }

    /// Steers along consecutive path configurations and concatenates the
    /// segments into one trajectory.
    fn convert_to_trajectory(&self, path: &[usize]) -> Trajectory<F> {
        let mut trajectory = Trajectory::new();
        for pair in path.windows(2) {
            let from = &self.nodes[pair[0]].config;
            let to = &self.nodes[pair[1]].config;
            let segment = self
                .core
                .robot
                .steer(from, to)
                .expect("steering support verified at construction");
            trajectory.append(segment);
        }
        trajectory
    }
}

impl<F: Float + FloatConst + SampleUniform> Planner<F> for PrmPlanner<F> {
    fn core(&self) -> &PlannerCore<F> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PlannerCore<F> {
        &mut self.core
    }

    fn setup(&mut self) {
        let start = self.core.start().clone();
        let goal = self.core.goal().clone();
        self.get_or_insert(&start);
        self.get_or_insert(&goal);
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    /// Grows the roadmap by `k` free samples. A sample whose rejection
    /// attempts all collide skips the growth step without counting it; an
    /// exhausted overall budget stops growth with a warning instead of
    /// looping forever in a workspace with vanishing free volume.
    fn grow_map(&mut self, k: usize) {
        let mut rounds = k.saturating_mul(GROWTH_ROUND_FACTOR);
        let mut grown = 0;
        while grown < k {
            if rounds == 0 {
                warn!("roadmap growth stalled: added {grown} of {k} nodes before exhausting the sampling budget");
                return;
            }
            rounds -= 1;
            if let Some(free) = self.generate_free_configuration() {
                self.add_vertex(&free);
                grown += 1;
            }
        }
    }

    fn find_path(&self) -> Option<Trajectory<F>> {
        let start = *self.index.get(self.core.start())?;
        let goal = *self.index.get(self.core.goal())?;
        let path = self.astar(start, goal)?;
        Some(self.convert_to_trajectory(&path))
    }

    /// Splices the new endpoints into the existing roadmap instead of
    /// rebuilding it, then searches.
    fn query(&mut self, start: &Config<F>, goal: &Config<F>) -> Option<Trajectory<F>> {
        self.core_mut().set_endpoints(start, goal);
        let start = self.core.start().clone();
        let goal = self.core.goal().clone();
        self.add_vertex(&start);
        self.add_vertex(&goal);
        self.find_path()
    }

    fn size(&self) -> usize {
        self.nodes.len()
    }
}

/// An open-set entry ordered by priority, then configuration.
#[derive(Clone)]
struct OpenEntry<F: Float> {
    priority: OrderedFloat<F>,
    config: Config<F>,
    node: usize,
}

impl<F: Float> PartialEq for OpenEntry<F> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.config == other.config
    }
}

impl<F: Float> Eq for OpenEntry<F> {}

impl<F: Float> PartialOrd for OpenEntry<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Float> Ord for OpenEntry<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.config.cmp(&other.config))
    }
}

struct SearchRecord<F: Float> {
    cost: F,
    priority: OrderedFloat<F>,
    parent: Option<usize>,
}

/// Follows parent pointers back to the root and reverses.
fn back_chain<F: Float>(records: &BTreeMap<usize, SearchRecord<F>>, node: usize) -> Vec<usize> {
    let mut path = vec![node];
    let mut current = node;
    while let Some(parent) = records[&current].parent {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}
