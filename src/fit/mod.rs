//! Skew-normal fitting by a non-elitist `(1, λ)` evolution strategy.
//!
//! Each iteration produces λ = `n_mutations` children of the current
//! parameters by multiplicative Gaussian jitter, scores them with
//! [`LossEvaluator`], and replaces the current parameters with the best
//! child. The parent is never part of the selection pool, so a generation
//! in which every child is worse still moves: the loss trace is not
//! monotone.
//!
//! # Key Types
//!
//! - [`FitConfig`]: Constraints, loss shape, mutation strengths, budget
//! - [`FitRunner`]: Executes the evolution loop
//! - [`FitResult`] / [`RunLog`]: Final parameters and the full trace
//! - [`LossEvaluator`]: Tail-mass and modal-position loss
//! - [`FitObserver`]: Progress hook that cannot influence the run
//!
//! # Known Limitations
//!
//! - The modal-estimation domain is built once from the seed scale. If the
//!   fitted scale drifts far from it the modal estimate under-resolves or
//!   pins to a domain edge.
//! - Mutation cannot change the sign of a parameter or move one that is
//!   exactly zero.
//!
//! # References
//!
//! - Beyer & Schwefel (2002), "Evolution Strategies: A Comprehensive
//!   Introduction"

mod config;
mod loss;
pub mod mutation;
mod runner;
mod types;

pub use config::FitConfig;
pub use loss::{LossEvaluator, LossTerms, ERROR_SCALE};
pub use mutation::MutationStrengths;
pub use runner::{evolve_params, FitResult, FitRunner, RunLog};
pub use types::{Constraints, FitObserver, NoObserver};
