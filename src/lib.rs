//! Skew-normal shape fitting by evolution strategy.
//!
//! Finds skew-normal parameters (skewness, location, scale) whose density
//! peaks near a requested mode and leaves a requested probability mass in
//! each tail beyond a lower and an upper bound:
//!
//! - **Distribution model** ([`skewnorm`]): the parameter triple, its density
//!   and the fixed sampling grid used for modal estimation.
//! - **Quadrature** ([`quadrature`]): the definite-integral seam used for
//!   tail mass, with a double-exponential default.
//! - **Fitting** ([`fit`]): the loss evaluator, the multiplicative mutation
//!   operator and the non-elitist `(1, λ)` evolution loop.
//!
//! # Example
//!
//! ```
//! use u_skewfit::fit::{FitConfig, FitRunner};
//!
//! let config = FitConfig::new(0.0, 5.0, 10.0)
//!     .with_iters(20)
//!     .with_n_mutations(8)
//!     .with_seed(42);
//!
//! let result = FitRunner::run(&config).unwrap();
//! assert_eq!(result.log.params.len(), 21);
//! assert_eq!(result.log.loss.len(), 20);
//! ```
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `parallel` | Score the children of one iteration on the rayon pool | off |
//! | `serde` | `Serialize`/`Deserialize` on parameters, config and run log | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at run and iteration boundaries | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

mod error;
pub mod fit;
pub mod quadrature;
pub mod skewnorm;

pub use error::{FitError, Result};
