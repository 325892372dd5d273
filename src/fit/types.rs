//! Target constraints and the progress observer seam.

use crate::skewnorm::ShapeParams;

/// The target shape: peak near `mode`, tails beyond `lower` and `upper`.
///
/// Fixed for the whole run. `lower < mode < upper` gives sensible results
/// but is not enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraints {
    /// Bound whose left tail should hold `edge_target` mass.
    pub lower: f64,

    /// Desired modal position.
    pub mode: f64,

    /// Bound whose right tail should hold `edge_target` mass.
    pub upper: f64,
}

impl Constraints {
    pub fn new(lower: f64, mode: f64, upper: f64) -> Self {
        Self { lower, mode, upper }
    }

    /// Starting point of every run: `a = 1`, `loc = mode`, and
    /// `scale = ((mode - lower) + (upper - mode)) / 2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_skewfit::fit::Constraints;
    /// use u_skewfit::skewnorm::ShapeParams;
    ///
    /// let seed = Constraints::new(0.0, 5.0, 10.0).seed_params();
    /// assert_eq!(seed, ShapeParams::new(1.0, 5.0, 5.0));
    /// ```
    pub fn seed_params(&self) -> ShapeParams {
        ShapeParams {
            a: 1.0,
            loc: self.mode,
            scale: ((self.mode - self.lower) + (self.upper - self.mode)) / 2.0,
        }
    }
}

/// Watches a fitting run without influencing it.
///
/// Called once per completed iteration, after the winning child has been
/// appended to the run log. Useful for progress bars and live plots.
///
/// Closures `FnMut(usize, &ShapeParams, f64)` implement it directly;
/// [`NoObserver`] is the no-op.
pub trait FitObserver {
    /// `iteration` is 1-based; `params` and `loss` are the selected child.
    fn on_iteration(&mut self, iteration: usize, params: &ShapeParams, loss: f64);
}

/// Observer that ignores every iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl FitObserver for NoObserver {
    fn on_iteration(&mut self, _iteration: usize, _params: &ShapeParams, _loss: f64) {}
}

impl<F: FnMut(usize, &ShapeParams, f64)> FitObserver for F {
    fn on_iteration(&mut self, iteration: usize, params: &ShapeParams, loss: f64) {
        self(iteration, params, loss)
    }
}
