//! Episodic training loop

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    algo::QTableAgent,
    env::{Environment, Exp},
    error::Result,
    util::mean,
};

/// Configuration for the [`Trainer`]
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Number of episodes to train for
    ///
    /// **Default**: `5000`
    pub episodes: u32,
    /// Log rolling metrics over the last `report_every` episodes at this interval
    ///
    /// **Default**: `100`
    pub report_every: u32,
    /// Write a checkpoint every `checkpoint_every` episodes
    ///
    /// **Default**: `1000`
    pub checkpoint_every: u32,
    /// Directory for checkpoints, or `None` to disable checkpointing
    ///
    /// **Default**: `Some("models")`
    pub checkpoint_dir: Option<PathBuf>,
    /// Episodes shorter than this many steps count as completed in progress reports
    ///
    /// **Default**: `200`
    pub step_threshold: u32,
    /// CSV file for per-episode metrics, or `None` to skip the export
    ///
    /// **Default**: `Some("training_metrics.csv")`
    pub metrics_path: Option<PathBuf>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            episodes: 5000,
            report_every: 100,
            checkpoint_every: 1000,
            checkpoint_dir: Some(PathBuf::from("models")),
            step_threshold: 200,
            metrics_path: Some(PathBuf::from("training_metrics.csv")),
        }
    }
}

/// Statistics of a single training episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    /// 1-based episode index
    pub episode: u32,
    pub reward: f32,
    pub steps: u32,
    /// Furthest position (first observation dimension) reached during the episode
    pub max_position: f32,
}

/// Aggregates over a window of episodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub episodes: usize,
    pub mean_reward: f32,
    pub mean_steps: f32,
    pub mean_max_position: f32,
    pub best_max_position: f32,
    /// Fraction of episodes that finished in fewer steps than the threshold
    pub completion_rate: f32,
}

/// Per-episode statistics of a training run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingMetrics {
    episodes: Vec<EpisodeStats>,
}

impl TrainingMetrics {
    pub fn push(&mut self, stats: EpisodeStats) {
        self.episodes.push(stats);
    }

    pub fn episodes(&self) -> &[EpisodeStats] {
        &self.episodes
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Summarize the last `window` episodes, or `None` if there are none
    pub fn summary(&self, window: usize, step_threshold: u32) -> Option<Summary> {
        let recent = &self.episodes[self.episodes.len().saturating_sub(window)..];
        let n = recent.len();
        let completed = recent.iter().filter(|e| e.steps < step_threshold).count();
        Some(Summary {
            episodes: n,
            mean_reward: mean(recent.iter().map(|e| e.reward))?,
            mean_steps: mean(recent.iter().map(|e| e.steps as f32))?,
            mean_max_position: mean(recent.iter().map(|e| e.max_position))?,
            best_max_position: recent
                .iter()
                .map(|e| e.max_position)
                .fold(f32::NEG_INFINITY, f32::max),
            completion_rate: completed as f32 / n as f32,
        })
    }

    /// Export the run as CSV with one row per episode
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;
        for stats in &self.episodes {
            wtr.serialize(stats)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Drives a [`QTableAgent`] through episodes of an [`Environment`], decaying exploration after
/// every episode and checkpointing the agent along the way
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Path of the checkpoint written after `episode`
    pub fn checkpoint_path(&self, episode: u32) -> Option<PathBuf> {
        self.config
            .checkpoint_dir
            .as_ref()
            .map(|dir| dir.join(format!("q_table_ep{episode}.json")))
    }

    /// Path of the checkpoint written when training completes
    pub fn final_path(&self) -> Option<PathBuf> {
        self.config
            .checkpoint_dir
            .as_ref()
            .map(|dir| dir.join("q_table_trained.json"))
    }

    /// Train `agent` for the configured number of episodes
    ///
    /// The environment is closed when the run ends, whether it succeeded or not. An environment
    /// failure aborts the run with that error; checkpoints written before it are left untouched.
    /// On success the final agent is checkpointed and the metrics exported.
    pub fn train<E>(&self, agent: &mut QTableAgent, env: &mut E) -> Result<TrainingMetrics>
    where
        E: Environment,
    {
        info!(
            "Starting Q-learning training: {} episodes, state bins {:?}",
            self.config.episodes,
            agent.discretizer().bins()
        );
        let result = self.run(agent, env);
        env.close();
        let metrics = result?;

        if let Some(path) = self.final_path() {
            agent.save(path)?;
        }
        if let Some(path) = &self.config.metrics_path {
            metrics.write_csv(path)?;
        }

        let window = self.config.report_every.max(1) as usize;
        if let Some(summary) = metrics.summary(window, self.config.step_threshold) {
            info!(
                "Training complete. Final epsilon: {:.3}, last {} episodes avg reward: {:.1}, avg steps: {:.1}",
                agent.epsilon(),
                summary.episodes,
                summary.mean_reward,
                summary.mean_steps
            );
        }
        Ok(metrics)
    }

    fn run<E>(&self, agent: &mut QTableAgent, env: &mut E) -> Result<TrainingMetrics>
    where
        E: Environment,
    {
        let mut metrics = TrainingMetrics::default();
        for episode in 1..=self.config.episodes {
            let stats = self.run_episode(agent, env, episode).inspect_err(|err| {
                warn!("Episode {episode} aborted: {err}");
            })?;
            metrics.push(stats);
            agent.decay_epsilon();

            if self.config.report_every > 0 && episode % self.config.report_every == 0 {
                self.report(&metrics, episode, agent.epsilon());
            }
            if self.config.checkpoint_every > 0 && episode % self.config.checkpoint_every == 0 {
                if let Some(path) = self.checkpoint_path(episode) {
                    agent.save(path)?;
                }
            }
        }
        Ok(metrics)
    }

    /// Run one episode from reset to termination or truncation, learning from every transition
    ///
    /// Epsilon is not decayed here.
    pub fn run_episode<E>(
        &self,
        agent: &mut QTableAgent,
        env: &mut E,
        episode: u32,
    ) -> Result<EpisodeStats>
    where
        E: Environment,
    {
        let (mut state, _) = env.reset()?;
        let mut stats = EpisodeStats {
            episode,
            reward: 0.0,
            steps: 0,
            max_position: position(&state),
        };

        loop {
            let action = agent.act(state.as_ref(), true);
            let step = env.step(E::Action::from(action))?;
            let done = step.is_done();
            stats.max_position = stats.max_position.max(position(&step.observation));

            agent.learn(&Exp {
                state: state.as_ref(),
                action,
                reward: step.reward,
                next_state: step.observation.as_ref(),
                done,
            });

            state = step.observation;
            stats.reward += step.reward;
            stats.steps += 1;

            if done {
                return Ok(stats);
            }
        }
    }

    fn report(&self, metrics: &TrainingMetrics, episode: u32, epsilon: f32) {
        let Some(summary) = metrics.summary(
            self.config.report_every as usize,
            self.config.step_threshold,
        ) else {
            return;
        };
        info!(
            "Episode {}/{} | avg reward {:.1} | avg steps {:.1} | avg max position {:.3} | best position {:.3} | completion rate {:.1}% | epsilon {:.3}",
            episode,
            self.config.episodes,
            summary.mean_reward,
            summary.mean_steps,
            summary.mean_max_position,
            summary.best_max_position,
            summary.completion_rate * 100.0,
            epsilon
        );
    }
}

fn position<S: AsRef<[f32]>>(state: &S) -> f32 {
    state.as_ref().first().copied().unwrap_or(f32::NAN)
}
