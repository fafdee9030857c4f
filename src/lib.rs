//! Sampling-based motion planning for planar robots.
//!
//! The crate plans collision-free motions through a 2-D workspace of
//! polygonal obstacles. Robots are described by the [`robot::Robot`]
//! capability trait (configuration dimension, metric, motion model, sampling)
//! with two concrete models: a rigid planar body moving on SE(2)
//! ([`robot::PlanarRobot`]) and an articulated arm on a torus
//! ([`robot::RobotArm`]). Two planners are provided: a tree planner
//! ([`planner::RrtPlanner`]) growing configurations reachable by discrete
//! controls, and a roadmap planner ([`planner::PrmPlanner`]) answering
//! queries with an A* search over steer-verified edges.

pub mod config;
pub mod environment;
pub mod error;
pub mod geom;
pub mod planner;
pub mod robot;
pub mod trajectory;
pub mod util;

pub use config::{Config, Control};
pub use environment::Environment;
pub use error::{PlanError, Result};
pub use planner::{Planner, PrmPlanner, RrtPlanner};
pub use robot::{PlanarRobot, Robot, RobotArm};
pub use trajectory::Trajectory;
