//! Fitting configuration.
//!
//! [`FitConfig`] holds every parameter of a run: the target constraints,
//! the loss shape, the mutation strengths and the iteration budget.

use super::mutation::MutationStrengths;
use super::types::Constraints;
use crate::error::{FitError, Result};

/// Configuration for a skew-normal fitting run.
///
/// # Defaults
///
/// ```
/// use u_skewfit::fit::FitConfig;
///
/// let config = FitConfig::new(0.0, 5.0, 10.0);
/// assert_eq!(config.resolution, 200);
/// assert_eq!(config.n_mutations, 20);
/// assert!((config.edge_target - 0.05).abs() < 1e-15);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_skewfit::fit::{FitConfig, MutationStrengths};
///
/// let config = FitConfig::new(10.0, 12.0, 30.0)
///     .with_resolution(500)
///     .with_strengths(MutationStrengths::new(0.2, 0.02, 0.05))
///     .with_n_mutations(50)
///     .with_edge_target(0.1)
///     .with_iters(300)
///     .with_exponents(1.5, 0.8)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitConfig {
    /// Target shape.
    pub constraints: Constraints,

    /// Number of domain points used to estimate the mode. At least 2.
    pub resolution: usize,

    /// Mutation strengths for `a`, `loc` and `scale`. Each `>= 0`.
    pub strengths: MutationStrengths,

    /// Children generated per iteration (λ). At least 1.
    pub n_mutations: usize,

    /// Target probability mass in each tail, in `(0, 1)`.
    pub edge_target: f64,

    /// Number of iterations. 0 returns the seed unchanged.
    pub iters: usize,

    /// Exponent applied to each scaled tail-mass error.
    ///
    /// Values above 1 punish large deviations disproportionately; values
    /// below 1 flatten the landscape.
    pub edge_exp: f64,

    /// Exponent applied to the scaled modal-position error.
    pub modal_exp: f64,

    /// Whether to score children in parallel using rayon.
    ///
    /// Ignored unless the `parallel` feature is enabled. Results are
    /// identical to sequential scoring for the same seed.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl FitConfig {
    /// Default configuration for the given target shape.
    pub fn new(lower: f64, mode: f64, upper: f64) -> Self {
        Self::from_constraints(Constraints::new(lower, mode, upper))
    }

    pub fn from_constraints(constraints: Constraints) -> Self {
        Self {
            constraints,
            resolution: 200,
            strengths: MutationStrengths::default(),
            n_mutations: 20,
            edge_target: 0.05,
            iters: 100,
            edge_exp: 1.0,
            modal_exp: 1.0,
            parallel: false,
            seed: None,
        }
    }

    /// Sets the domain resolution.
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets all three mutation strengths.
    pub fn with_strengths(mut self, strengths: MutationStrengths) -> Self {
        self.strengths = strengths;
        self
    }

    /// Sets the number of children per iteration.
    pub fn with_n_mutations(mut self, n: usize) -> Self {
        self.n_mutations = n;
        self
    }

    /// Sets the target tail probability.
    pub fn with_edge_target(mut self, target: f64) -> Self {
        self.edge_target = target;
        self
    }

    /// Sets the number of iterations.
    pub fn with_iters(mut self, iters: usize) -> Self {
        self.iters = iters;
        self
    }

    /// Sets the tail and modal loss exponents.
    pub fn with_exponents(mut self, edge_exp: f64, modal_exp: f64) -> Self {
        self.edge_exp = edge_exp;
        self.modal_exp = modal_exp;
        self
    }

    /// Enables or disables parallel scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    ///
    /// Only structural problems are rejected. The ordering
    /// `lower < mode < upper` is deliberately left unchecked.
    pub fn validate(&self) -> Result<()> {
        let Constraints { lower, mode, upper } = self.constraints;
        for (name, value) in [
            ("lower", lower),
            ("mode", mode),
            ("upper", upper),
            ("edge_exp", self.edge_exp),
            ("modal_exp", self.modal_exp),
        ] {
            if !value.is_finite() {
                return Err(FitError::NonFiniteParameter { name, value });
            }
        }
        if self.resolution < 2 {
            return Err(FitError::InvalidResolution(self.resolution));
        }
        if self.n_mutations < 1 {
            return Err(FitError::InvalidMutationCount);
        }
        for (name, value) in [
            ("a", self.strengths.a),
            ("loc", self.strengths.loc),
            ("scale", self.strengths.scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FitError::InvalidMutationStrength { name, value });
            }
        }
        if !(self.edge_target > 0.0 && self.edge_target < 1.0) {
            return Err(FitError::InvalidEdgeTarget(self.edge_target));
        }
        Ok(())
    }
}
