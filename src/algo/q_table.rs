use std::path::Path;

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    checkpoint::{Hyperparameters, SavedAgent},
    discretize::{DiscreteState, Discretizer},
    ds::ValueTable,
    env::Exp,
    error::{Error, Result},
    exploration::EpsilonGreedy,
    util::check_interval,
};

/// Configuration for the [`QTableAgent`]
///
/// The defaults describe the MountainCar task: a `(position, velocity)` observation and three
/// actions (push left, coast, push right).
#[derive(Debug, Clone, PartialEq)]
pub struct QTableAgentConfig {
    /// Number of discrete actions
    ///
    /// **Default**: `3`
    pub n_actions: usize,
    /// Learning rate, in `(0,1]`
    ///
    /// **Default**: `0.1`
    pub alpha: f32,
    /// Discount factor, in `[0,1]`
    ///
    /// **Default**: `0.99`
    pub gamma: f32,
    /// Initial exploration rate, in `[0,1]`
    ///
    /// **Default**: `1.0`
    pub epsilon: f32,
    /// Multiplicative epsilon decay applied after every episode, in `(0,1]`
    ///
    /// **Default**: `0.995`
    pub epsilon_decay: f32,
    /// Floor for epsilon, in `[0,epsilon]`
    ///
    /// **Default**: `0.01`
    pub epsilon_min: f32,
    /// Bins per observation dimension
    ///
    /// **Default**: `[20, 20]`
    pub bins: Vec<usize>,
    /// `(low, high)` bounds per observation dimension
    ///
    /// **Default**: `[(-1.2, 0.6), (-0.07, 0.07)]`
    pub bounds: Vec<(f32, f32)>,
}

impl Default for QTableAgentConfig {
    fn default() -> Self {
        Self {
            n_actions: 3,
            alpha: 0.1,
            gamma: 0.99,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.01,
            bins: vec![20, 20],
            bounds: vec![(-1.2, 0.6), (-0.07, 0.07)],
        }
    }
}

/// Apply one Q-learning update to `table` and return the new value
///
/// The target is `reward` for a terminal transition and `reward + gamma * max_a Q(next_state, a)`
/// otherwise, regardless of which action the behavior policy takes next. The entry moves a step
/// of size `alpha` towards the target.
#[allow(clippy::too_many_arguments)]
pub fn q_update(
    table: &mut ValueTable,
    state: &[usize],
    action: usize,
    reward: f32,
    next_state: &[usize],
    done: bool,
    alpha: f32,
    gamma: f32,
) -> f32 {
    let q_value = table.get(state, action);
    let target = if done {
        reward
    } else {
        reward + gamma * table.max_value(next_state)
    };
    let new_q_value = q_value + alpha * (target - q_value);
    table.set(state, action, new_q_value);
    new_q_value
}

/// A Q-learning agent that learns a dense Q-table over a discretized continuous state space
#[derive(Debug, Clone)]
pub struct QTableAgent {
    table: ValueTable,
    discretizer: Discretizer,
    exploration: EpsilonGreedy,
    alpha: f32, // learning rate
    gamma: f32, // discount factor
    rng: StdRng,
}

impl QTableAgent {
    /// Initialize a new agent with a zeroed Q-table
    ///
    /// Fails with a configuration error if any hyperparameter is out of range, a bin count is
    /// zero, a bound pair is degenerate, or there are no actions.
    pub fn new(config: QTableAgentConfig) -> Result<Self> {
        check_interval!(open config.alpha, 0.0, 1.0, "alpha");
        check_interval!(config.gamma, 0.0, 1.0, "gamma");
        if config.n_actions == 0 {
            return Err(Error::NoActions);
        }
        let discretizer = Discretizer::new(config.bounds, config.bins)?;
        let exploration =
            EpsilonGreedy::new(config.epsilon, config.epsilon_decay, config.epsilon_min)?;
        Ok(Self {
            table: ValueTable::new(discretizer.bins(), config.n_actions),
            discretizer,
            exploration,
            alpha: config.alpha,
            gamma: config.gamma,
            rng: StdRng::from_entropy(),
        })
    }

    /// Seed the agent's random number generator for reproducible exploration
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn discretizer(&self) -> &Discretizer {
        &self.discretizer
    }

    pub fn epsilon(&self) -> f32 {
        self.exploration.epsilon()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn discretize(&self, observation: &[f32]) -> DiscreteState {
        self.discretizer.discretize(observation)
    }

    /// Choose an action for an observation, exploring only while `training`
    pub fn act(&mut self, observation: &[f32], training: bool) -> usize {
        let state = self.discretize(observation);
        self.exploration
            .select(&self.table, &state, training, &mut self.rng)
    }

    /// The best known action for an observation
    pub fn greedy_action(&self, observation: &[f32]) -> usize {
        self.table.best_action(&self.discretize(observation)).0
    }

    /// Learn from a given experience and update the table, returning the new action value
    pub fn learn<S: AsRef<[f32]>>(&mut self, experience: &Exp<S>) -> f32 {
        let state = self.discretize(experience.state.as_ref());
        let next_state = self.discretize(experience.next_state.as_ref());
        q_update(
            &mut self.table,
            &state,
            experience.action,
            experience.reward,
            &next_state,
            experience.done,
            self.alpha,
            self.gamma,
        )
    }

    /// Decay the exploration rate by one episode and return the new epsilon
    pub fn decay_epsilon(&mut self) -> f32 {
        self.exploration.decay()
    }

    /// Snapshot the agent's learned state and hyperparameters
    pub fn to_saved(&self) -> SavedAgent {
        SavedAgent::new(
            &self.table,
            self.exploration.epsilon(),
            &self.discretizer,
            Hyperparameters {
                learning_rate: self.alpha,
                discount_factor: self.gamma,
                epsilon_decay: self.exploration.decay_rate(),
                epsilon_min: self.exploration.min(),
            },
        )
    }

    /// Restore an agent from a snapshot, validating it as [`QTableAgent::new`] would
    ///
    /// Stored values that [`QTableAgent::new`] rejects are reported as
    /// [`Error::InvalidCheckpoint`], a storage error.
    pub fn from_saved(saved: SavedAgent) -> Result<Self> {
        saved.check_format()?;
        let SavedAgent {
            table,
            epsilon,
            bin_counts,
            state_bounds,
            hyperparameters,
            ..
        } = saved;
        let n_actions = table.shape.last().copied().unwrap_or_default();
        let mut agent = Self::new(QTableAgentConfig {
            n_actions,
            alpha: hyperparameters.learning_rate,
            gamma: hyperparameters.discount_factor,
            epsilon,
            epsilon_decay: hyperparameters.epsilon_decay,
            epsilon_min: hyperparameters.epsilon_min,
            bins: bin_counts,
            bounds: state_bounds,
        })
        .map_err(|err| Error::InvalidCheckpoint {
            source: Box::new(err),
        })?;
        agent.table = ValueTable::from_raw(table.shape, table.values)?;
        Ok(agent)
    }

    /// Write the agent to a checkpoint file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_saved().save_to_file(path)
    }

    /// Load an agent from a checkpoint file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_saved(SavedAgent::load_from_file(path)?)
    }
}
