use rand::Rng;

use super::Choice;
use crate::{ds::ValueTable, error::Result, util::check_interval};

/// Epsilon greedy exploration policy with a multiplicatively decaying epsilon threshold
///
/// Epsilon is decayed once per episode as `max(min, epsilon * decay)`, so it never increases
/// and never drops below `min`.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f32,
    decay: f32,
    min: f32,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy from start value, decay factor, and floor
    ///
    /// Fails if `epsilon` is not in `[0,1]`, `decay` is not in `(0,1]`, or `min` is not in `[0,epsilon]`
    pub fn new(epsilon: f32, decay: f32, min: f32) -> Result<Self> {
        check_interval!(epsilon, 0.0, 1.0);
        check_interval!(open decay, 0.0, 1.0, "epsilon_decay");
        check_interval!(min, 0.0, epsilon, "epsilon_min");
        Ok(Self {
            epsilon,
            decay,
            min,
        })
    }

    /// A policy that never explores
    pub fn greedy() -> Self {
        Self {
            epsilon: 0.0,
            decay: 1.0,
            min: 0.0,
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn decay_rate(&self) -> f32 {
        self.decay
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    /// Decay epsilon by one episode and return the new value
    pub fn decay(&mut self) -> f32 {
        self.epsilon = (self.epsilon * self.decay).max(self.min);
        self.epsilon
    }

    /// Decide between exploring and exploiting with the current epsilon
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Select an action in `state`
    ///
    /// While `training`, a uniformly random action is taken with probability epsilon and the
    /// best known action otherwise. Outside of training the best known action is always taken,
    /// whatever the current epsilon.
    pub fn select<R: Rng + ?Sized>(
        &self,
        table: &ValueTable,
        state: &[usize],
        training: bool,
        rng: &mut R,
    ) -> usize {
        if training && self.choose(rng) == Choice::Explore {
            return rng.gen_range(0..table.n_actions());
        }
        table.best_action(state).0
    }
}
