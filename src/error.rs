//! Error types for skew-normal fitting.
//!
//! Only structurally invalid configuration is an error. Numerical trouble
//! during a run (non-convergent integrals, degenerate densities) is never
//! raised; it surfaces as a large or NaN loss instead.

/// Configuration errors reported before any fitting work starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    /// Returned when the domain would have fewer than two sample points.
    #[error("invalid resolution: {0} must be at least 2")]
    InvalidResolution(usize),

    /// Returned when an iteration would produce no children.
    #[error("invalid mutation count: n_mutations must be at least 1")]
    InvalidMutationCount,

    /// Returned when a mutation strength is negative or not finite.
    #[error("invalid mutation strength for '{name}': {value} must be finite and >= 0")]
    InvalidMutationStrength {
        /// Which parameter the strength applies to (`a`, `loc` or `scale`).
        name: &'static str,
        /// The offending strength.
        value: f64,
    },

    /// Returned when the tail target is not a probability in (0, 1).
    #[error("invalid edge target: {0} must be in (0.0, 1.0)")]
    InvalidEdgeTarget(f64),

    /// Returned when a bound, the mode or an exponent is NaN or infinite.
    #[error("non-finite value for '{name}': {value}")]
    NonFiniteParameter {
        /// The configuration field name.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
}

pub type Result<T> = core::result::Result<T, FitError>;
