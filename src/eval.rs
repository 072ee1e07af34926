//! Greedy evaluation of trained agents

use std::path::Path;

use log::{debug, info};

use crate::{algo::QTableAgent, env::Environment, error::Result, util::mean};

/// Position at which the MountainCar flag sits
pub const GOAL_POSITION: f32 = 0.5;

/// Result of one greedy rollout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeOutcome {
    pub steps: u32,
    pub reward: f32,
    pub max_position: f32,
    /// The rollout reached the goal position
    pub success: bool,
}

/// Outcomes of an evaluation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalMetrics {
    episodes: Vec<EpisodeOutcome>,
}

impl EvalMetrics {
    pub fn new(episodes: Vec<EpisodeOutcome>) -> Self {
        Self { episodes }
    }

    pub fn episodes(&self) -> &[EpisodeOutcome] {
        &self.episodes
    }

    pub fn n_episodes(&self) -> usize {
        self.episodes.len()
    }

    pub fn success_count(&self) -> usize {
        self.episodes.iter().filter(|e| e.success).count()
    }

    /// Fraction of episodes that reached the goal, `0.0` for an empty run
    pub fn success_rate(&self) -> f32 {
        if self.episodes.is_empty() {
            return 0.0;
        }
        self.success_count() as f32 / self.n_episodes() as f32
    }

    /// Mean step count over all episodes
    pub fn mean_steps(&self) -> Option<f32> {
        mean(self.episodes.iter().map(|e| e.steps as f32))
    }

    /// Mean step count over successful episodes only
    pub fn mean_steps_successful(&self) -> Option<f32> {
        mean(
            self.episodes
                .iter()
                .filter(|e| e.success)
                .map(|e| e.steps as f32),
        )
    }
}

/// Runs greedy rollouts of an agent without learning
#[derive(Debug, Clone)]
pub struct Evaluator {
    goal_position: f32,
    log_every: u32,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            goal_position: GOAL_POSITION,
            log_every: 20,
        }
    }
}

impl Evaluator {
    pub fn new(goal_position: f32) -> Self {
        Self {
            goal_position,
            ..Default::default()
        }
    }

    /// Log position and velocity every `log_every` steps, `0` to disable
    pub fn with_log_every(mut self, log_every: u32) -> Self {
        self.log_every = log_every;
        self
    }

    /// Load an agent from a checkpoint and evaluate it
    pub fn evaluate_file<E, P>(&self, path: P, env: &mut E, n_episodes: u32) -> Result<EvalMetrics>
    where
        E: Environment,
        P: AsRef<Path>,
    {
        let agent = match QTableAgent::load(path.as_ref()) {
            Ok(agent) => agent,
            Err(err) => {
                env.close();
                return Err(err);
            }
        };
        info!(
            "Evaluating {} (stored epsilon {:.3}, ignored)",
            path.as_ref().display(),
            agent.epsilon()
        );
        self.evaluate(&agent, env, n_episodes)
    }

    /// Roll out `agent` greedily for `n_episodes` and close the environment
    pub fn evaluate<E>(&self, agent: &QTableAgent, env: &mut E, n_episodes: u32) -> Result<EvalMetrics>
    where
        E: Environment,
    {
        let result = (1..=n_episodes)
            .map(|episode| self.rollout(agent, env, episode, n_episodes))
            .collect::<Result<Vec<_>>>();
        env.close();
        let metrics = EvalMetrics::new(result?);

        info!(
            "Success rate: {}/{} ({:.1}%)",
            metrics.success_count(),
            metrics.n_episodes(),
            metrics.success_rate() * 100.0
        );
        if let Some(steps) = metrics.mean_steps() {
            info!("Average steps: {steps:.1}");
        }
        if let Some(steps) = metrics.mean_steps_successful() {
            info!("Average steps (successful): {steps:.1}");
        }
        Ok(metrics)
    }

    fn rollout<E>(
        &self,
        agent: &QTableAgent,
        env: &mut E,
        episode: u32,
        n_episodes: u32,
    ) -> Result<EpisodeOutcome>
    where
        E: Environment,
    {
        let (mut state, _) = env.reset()?;
        let mut max_position = position(&state);
        let mut reward = 0.0;
        let mut steps = 0;
        debug!(
            "Episode {episode}/{n_episodes} initial state {:?}",
            state.as_ref()
        );

        loop {
            let action = agent.greedy_action(state.as_ref());
            let step = env.step(E::Action::from(action))?;
            max_position = max_position.max(position(&step.observation));
            reward += step.reward;
            steps += 1;
            let done = step.is_done();
            state = step.observation;

            if self.log_every > 0 && steps % self.log_every == 0 {
                debug!("  Step {steps}: state {:?}", state.as_ref());
            }
            if done {
                break;
            }
        }

        let success = max_position >= self.goal_position;
        if success {
            info!("Episode {episode}/{n_episodes}: reached goal in {steps} steps, reward {reward:.1}");
        } else {
            info!(
                "Episode {episode}/{n_episodes}: failed, max position {max_position:.3}, steps {steps}, reward {reward:.1}"
            );
        }
        Ok(EpisodeOutcome {
            steps,
            reward,
            max_position,
            success,
        })
    }
}

/// Load an agent from `agent_source` and evaluate it greedily with the default goal position
pub fn evaluate<E, P>(agent_source: P, env: &mut E, n_episodes: u32) -> Result<EvalMetrics>
where
    E: Environment,
    P: AsRef<Path>,
{
    Evaluator::default().evaluate_file(agent_source, env, n_episodes)
}

fn position<S: AsRef<[f32]>>(state: &S) -> f32 {
    state.as_ref().first().copied().unwrap_or(f32::NAN)
}
