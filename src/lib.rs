//! Tabular Q-learning for control tasks with a continuous state space and a small discrete
//! action space, such as MountainCar.
//!
//! Observations are mapped onto a fixed grid by a [`Discretizer`](discretize::Discretizer), a
//! [`QTableAgent`](algo::QTableAgent) learns a dense table of action values over that grid, the
//! [`Trainer`](train::Trainer) runs episodes and checkpoints the agent, and the
//! [`Evaluator`](eval::Evaluator) measures how often a saved agent reaches the goal.

/// Implemented RL algorithms
pub mod algo;

/// Versioned agent checkpoints
pub mod checkpoint;

/// Continuous state discretization
pub mod discretize;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

pub mod error;

/// Greedy evaluation
pub mod eval;

/// Exploration policies
pub mod exploration;

/// Training loop
pub mod train;

/// Testing environments
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use error::{Error, ErrorKind, Result};
