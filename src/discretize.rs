use crate::error::{Error, Result};

/// Grid coordinates of a continuous observation, one bin index per dimension
pub type DiscreteState = Vec<usize>;

/// Map a continuous observation onto a fixed-resolution grid
///
/// For each dimension `i` the bin is `floor((x_i - low_i) / (high_i - low_i) * bins_i)`,
/// clamped into `[0, bins_i - 1]`. Values at or below `low_i` land in the first bin and values
/// at or above `high_i` land in the last, so this never fails for out-of-range input.
///
/// Dimensions are paired up positionally; extra entries in any argument are ignored.
pub fn discretize(observation: &[f32], bounds: &[(f32, f32)], bins: &[usize]) -> DiscreteState {
    observation
        .iter()
        .zip(bounds)
        .zip(bins)
        .map(|((&x, &(low, high)), &n)| bin_index(x, low, high, n))
        .collect()
}

fn bin_index(x: f32, low: f32, high: f32, n: usize) -> usize {
    let scaled = ((x - low) / (high - low) * n as f32).floor();
    // float to int casts saturate and map NaN to 0
    (scaled.max(0.0) as usize).min(n.saturating_sub(1))
}

/// Validated bounds and bin counts for a continuous state space
#[derive(Debug, Clone, PartialEq)]
pub struct Discretizer {
    bounds: Vec<(f32, f32)>,
    bins: Vec<usize>,
}

impl Discretizer {
    /// Initialize a discretizer from per-dimension `(low, high)` bounds and bin counts
    ///
    /// Fails with a configuration error if the dimensions disagree, a bin count is zero,
    /// or a bound pair is not finite with `low < high`.
    pub fn new(bounds: Vec<(f32, f32)>, bins: Vec<usize>) -> Result<Self> {
        if bins.is_empty() {
            return Err(Error::NoDimensions);
        }
        if bins.len() != bounds.len() {
            return Err(Error::DimensionMismatch {
                bins: bins.len(),
                bounds: bounds.len(),
            });
        }
        if let Some(dim) = bins.iter().position(|&n| n == 0) {
            return Err(Error::ZeroBins { dim });
        }
        for (dim, &(low, high)) in bounds.iter().enumerate() {
            if !(low.is_finite() && high.is_finite() && low < high) {
                return Err(Error::InvalidBounds { dim, low, high });
            }
        }
        Ok(Self { bounds, bins })
    }

    /// Bin indices of `observation`
    ///
    /// # Panics
    ///
    /// Panics if `observation` does not have one entry per dimension.
    pub fn discretize(&self, observation: &[f32]) -> DiscreteState {
        assert_eq!(
            observation.len(),
            self.bins.len(),
            "observation dimensionality does not match the discretizer"
        );
        discretize(observation, &self.bounds, &self.bins)
    }

    pub fn bounds(&self) -> &[(f32, f32)] {
        &self.bounds
    }

    pub fn bins(&self) -> &[usize] {
        &self.bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn mountain_car() -> Discretizer {
        Discretizer::new(vec![(-1.2, 0.6), (-0.07, 0.07)], vec![20, 20]).unwrap()
    }

    #[test]
    fn boundaries_map_to_edge_bins() {
        let d = mountain_car();
        assert_eq!(d.discretize(&[-1.2, -0.07]), vec![0, 0], "low maps to first bin");
        assert_eq!(d.discretize(&[0.6, 0.07]), vec![19, 19], "high maps to last bin");
    }

    #[test]
    fn out_of_range_values_clamp() {
        let d = mountain_car();
        assert_eq!(d.discretize(&[-5.0, -1.0]), vec![0, 0]);
        assert_eq!(d.discretize(&[5.0, 1.0]), vec![19, 19]);
        assert_eq!(d.discretize(&[f32::NEG_INFINITY, f32::INFINITY]), vec![0, 19]);
    }

    #[test]
    fn interior_values() {
        let d = Discretizer::new(vec![(0.0, 1.0)], vec![4]).unwrap();
        assert_eq!(d.discretize(&[0.1]), vec![0]);
        assert_eq!(d.discretize(&[0.3]), vec![1]);
        assert_eq!(d.discretize(&[0.6]), vec![2]);
        assert_eq!(d.discretize(&[0.9]), vec![3]);
    }

    #[test]
    fn free_function_matches_struct() {
        let d = mountain_car();
        let obs = [-0.5, 0.01];
        assert_eq!(discretize(&obs, d.bounds(), d.bins()), d.discretize(&obs));
        assert_eq!(d.discretize(&obs), vec![7, 11]);
    }

    #[test]
    fn single_bin_dimension() {
        let d = Discretizer::new(vec![(0.0, 1.0)], vec![1]).unwrap();
        assert_eq!(d.discretize(&[-3.0]), vec![0]);
        assert_eq!(d.discretize(&[0.5]), vec![0]);
        assert_eq!(d.discretize(&[3.0]), vec![0]);
    }

    #[test]
    #[should_panic(expected = "observation dimensionality")]
    fn wrong_observation_length_panics() {
        mountain_car().discretize(&[0.0]);
    }

    #[test]
    fn invalid_configurations() {
        let err = Discretizer::new(vec![(0.0, 1.0)], vec![0]).unwrap_err();
        assert!(matches!(err, Error::ZeroBins { dim: 0 }));
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = Discretizer::new(vec![(0.0, 1.0), (1.0, 1.0)], vec![2, 2]).unwrap_err();
        assert!(matches!(err, Error::InvalidBounds { dim: 1, .. }));

        let err = Discretizer::new(vec![(0.0, f32::NAN)], vec![2]).unwrap_err();
        assert!(matches!(err, Error::InvalidBounds { dim: 0, .. }));

        let err = Discretizer::new(vec![(0.0, 1.0)], vec![2, 2]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { bins: 2, bounds: 1 }));

        assert!(matches!(
            Discretizer::new(vec![], vec![]),
            Err(Error::NoDimensions)
        ));
    }
}
