#![allow(dead_code)]

use tabular_q::{
    env::{Environment, Step},
    Error, Result,
};

/// Deterministic two-state, two-action chain. States are observed as `0.5` and `1.5`.
///
/// | state | action | next state | reward |
/// |-------|--------|------------|--------|
/// | 0     | 0      | 0          | 0      |
/// | 0     | 1      | 1          | 1      |
/// | 1     | 0      | 0          | 2      |
/// | 1     | 1      | 1          | 0      |
pub struct ChainEnv {
    pub state: usize,
}

impl ChainEnv {
    pub const OBSERVATIONS: [f32; 2] = [0.5, 1.5];

    pub fn transition(state: usize, action: usize) -> (usize, f32) {
        match (state, action) {
            (0, 0) => (0, 0.0),
            (0, 1) => (1, 1.0),
            (1, 0) => (0, 2.0),
            (1, 1) => (1, 0.0),
            _ => unreachable!("chain has two states and two actions"),
        }
    }
}

/// Replays a fixed script of episodes. Each entry is `(steps, success)`: the position sits at
/// `-0.4` until the final step, where it jumps to `0.5` for a successful episode. Successful
/// episodes terminate, failed ones are truncated.
pub struct ScriptedEnv {
    script: Vec<(u32, bool)>,
    episode: Option<usize>,
    step: u32,
    pub closed: bool,
}

impl ScriptedEnv {
    pub fn new(script: Vec<(u32, bool)>) -> Self {
        Self {
            script,
            episode: None,
            step: 0,
            closed: false,
        }
    }
}

impl Environment for ScriptedEnv {
    type State = [f32; 2];
    type Action = usize;
    type Info = ();

    fn reset(&mut self) -> Result<(Self::State, Self::Info)> {
        let next = self.episode.map_or(0, |e| e + 1);
        if next >= self.script.len() {
            return Err(Error::environment("reset", "script exhausted"));
        }
        self.episode = Some(next);
        self.step = 0;
        Ok(([-0.5, 0.0], ()))
    }

    fn step(&mut self, _action: Self::Action) -> Result<Step<Self::State, Self::Info>> {
        let (steps, success) = self
            .episode
            .map(|e| self.script[e])
            .ok_or_else(|| Error::environment("step", "step before reset"))?;
        self.step += 1;
        let last = self.step >= steps;
        let position = if last && success { 0.5 } else { -0.4 };
        Ok(Step {
            observation: [position, 0.0],
            reward: -1.0,
            terminated: last && success,
            truncated: last && !success,
            info: (),
        })
    }

    fn random_action(&self) -> Self::Action {
        0
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
