use crate::error::Result;

/// An episodic control task with a continuous observation space and a finite action space,
/// driven by an agent through `reset` and `step`.
///
/// Implementations wrap a simulator. Failures of the simulator are reported as
/// [`Error::Environment`](crate::error::Error::Environment) and abort the current episode.
pub trait Environment {
    /// The observation handed to the agent, one `f32` per state dimension
    type State: AsRef<[f32]>;

    /// An action the agent can take. Agents select actions by index, so every index
    /// in `0..n_actions` must convert into a valid action.
    type Action: From<usize>;

    /// Auxiliary diagnostic information returned alongside observations
    type Info;

    /// Reset the environment to an initial state
    ///
    /// **Returns** `(observation, info)`
    fn reset(&mut self) -> Result<(Self::State, Self::Info)>;

    /// Advance the environment by one action
    fn step(&mut self, action: Self::Action) -> Result<Step<Self::State, Self::Info>>;

    /// Sample an action uniformly at random
    fn random_action(&self) -> Self::Action;

    /// Release any resources held by the environment
    fn close(&mut self) {}
}

/// The outcome of a single [`Environment::step`]
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S, I> {
    pub observation: S,
    pub reward: f32,
    /// The episode reached a terminal state of the task
    pub terminated: bool,
    /// The episode was cut short, e.g. by a time limit
    pub truncated: bool,
    pub info: I,
}

impl<S, I> Step<S, I> {
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Represents a single experience or transition in the environment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exp<S> {
    /// The observation before taking the action
    pub state: S,
    /// Index of the action taken in the given state
    pub action: usize,
    /// The reward received after taking the action
    pub reward: f32,
    /// The observation after the action is taken
    pub next_state: S,
    /// Whether the episode ended with this transition
    pub done: bool,
}
