use crate::error::{Error, Result};

/// A dense table of action values indexed by `(state, action)`
///
/// The table is stored row-major with shape `bins + [n_actions]`, so all action values of a
/// state are contiguous. Its shape is fixed at construction and entries are never removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    shape: Vec<usize>,
    values: Vec<f32>,
}

impl ValueTable {
    /// Initialize a zeroed table for a state grid with the given bin counts
    pub fn new(bins: &[usize], n_actions: usize) -> Self {
        let shape: Vec<usize> = bins.iter().copied().chain([n_actions]).collect();
        let len = shape.iter().product();
        Self {
            shape,
            values: vec![0.0; len],
        }
    }

    /// Rebuild a table from its shape and row-major contents
    pub fn from_raw(shape: Vec<usize>, values: Vec<f32>) -> Result<Self> {
        let expected = shape.iter().product();
        if shape.len() < 2 || values.len() != expected {
            return Err(Error::TableLength {
                shape,
                expected,
                found: values.len(),
            });
        }
        Ok(Self { shape, values })
    }

    /// Shape of the table, the state bin counts followed by the number of actions
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Row-major view of every entry
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn n_actions(&self) -> usize {
        self.shape[self.shape.len() - 1]
    }

    /// Offset of the first action value of `state`
    fn row_offset(&self, state: &[usize]) -> usize {
        debug_assert_eq!(state.len() + 1, self.shape.len(), "state rank mismatch");
        state
            .iter()
            .zip(&self.shape)
            .fold(0, |offset, (&ix, &dim)| {
                debug_assert!(ix < dim, "bin index {ix} out of range for dimension of size {dim}");
                offset * dim + ix
            })
            * self.n_actions()
    }

    /// All action values of a state, indexed by action
    pub fn row(&self, state: &[usize]) -> &[f32] {
        let start = self.row_offset(state);
        &self.values[start..start + self.n_actions()]
    }

    pub fn get(&self, state: &[usize], action: usize) -> f32 {
        self.row(state)[action]
    }

    pub fn set(&mut self, state: &[usize], action: usize, value: f32) {
        let start = self.row_offset(state);
        let n_actions = self.n_actions();
        self.values[start..start + n_actions][action] = value;
    }

    /// The action with the highest value in `state` along with that value
    ///
    /// Ties go to the lowest action index.
    pub fn best_action(&self, state: &[usize]) -> (usize, f32) {
        self.row(state)
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (action, value)| {
                if value > best.1 {
                    (action, value)
                } else {
                    best
                }
            })
    }

    /// The highest action value in `state`
    pub fn max_value(&self, state: &[usize]) -> f32 {
        self.best_action(state).1
    }
}
