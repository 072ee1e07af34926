use gym_rs::core::{ActionReward, Env};
use gym_rs::envs::classical_control::mountain_car::{MountainCarEnv, MountainCarObservation};
use gym_rs::utils::renderer::RenderMode;
use rand::seq::IteratorRandom;
use rand::thread_rng;
use strum::{EnumIter, FromRepr, IntoEnumIterator, VariantArray};

use crate::env::{Environment, Step};
use crate::error::Result;
use crate::eval::GOAL_POSITION;

/// Episode length limit of MountainCar-v0
pub const MAX_EPISODE_STEPS: u32 = 200;

fn obs2arr(observation: MountainCarObservation) -> [f32; 2] {
    Vec::from(observation)
        .into_iter()
        .map(|x| x as f32)
        .collect::<Vec<_>>()
        .try_into()
        .expect("vec is length 2")
}

/// Actions for the [`MountainCar`] environment
#[derive(FromRepr, EnumIter, VariantArray, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MCAction {
    PushLeft = 0,
    Coast = 1,
    PushRight = 2,
}

impl From<usize> for MCAction {
    fn from(value: usize) -> Self {
        Self::from_repr(value).expect("MCAction::from is only called with valid values [0, 2]")
    }
}

/// Human-readable view of a MountainCar observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateInfo {
    pub position: f32,
    pub velocity: f32,
    pub distance_to_goal: f32,
}

/// The classic MountainCar control task: an underpowered car in a valley has to rock back and
/// forth to build enough momentum to reach the flag on the right hill
///
/// This implementation is a thin wrapper around [gym_rs](https://github.com/MathisWellmann/gym-rs)
/// that adds the MountainCar-v0 time limit.
#[derive(Debug)]
pub struct MountainCar {
    gym_env: MountainCarEnv,
    max_episode_steps: u32,
    elapsed_steps: u32,
}

impl MountainCar {
    pub fn new(render_mode: RenderMode) -> Self {
        Self {
            gym_env: MountainCarEnv::new(render_mode),
            max_episode_steps: MAX_EPISODE_STEPS,
            elapsed_steps: 0,
        }
    }

    /// Override the number of steps after which an episode is truncated
    pub fn with_max_episode_steps(mut self, max_episode_steps: u32) -> Self {
        self.max_episode_steps = max_episode_steps;
        self
    }

    pub fn state_info(observation: &[f32; 2]) -> StateInfo {
        let [position, velocity] = *observation;
        StateInfo {
            position,
            velocity,
            distance_to_goal: GOAL_POSITION - position,
        }
    }
}

impl Environment for MountainCar {
    type State = [f32; 2];
    type Action = MCAction;
    type Info = ();

    fn reset(&mut self) -> Result<(Self::State, Self::Info)> {
        self.elapsed_steps = 0;
        let (observation, _) = self.gym_env.reset(None, false, None);
        Ok((obs2arr(observation), ()))
    }

    fn step(&mut self, action: Self::Action) -> Result<Step<Self::State, Self::Info>> {
        let ActionReward {
            observation,
            reward,
            done,
            ..
        } = self.gym_env.step(action as usize);
        self.elapsed_steps += 1;

        Ok(Step {
            observation: obs2arr(observation),
            reward: *reward as f32,
            terminated: done,
            truncated: !done && self.elapsed_steps >= self.max_episode_steps,
            info: (),
        })
    }

    fn random_action(&self) -> Self::Action {
        MCAction::iter().choose(&mut thread_rng()).unwrap()
    }

    fn close(&mut self) {
        self.gym_env.close();
    }
}
