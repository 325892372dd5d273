//! Sampling grid for modal estimation.

use super::model::ShapeParams;
use crate::error::{FitError, Result};

/// An ordered, evenly spaced grid of x-values.
///
/// Built once per run from the *seed* parameters and never resized, so the
/// modal estimate loses resolution (or falls off the grid) if the fitted
/// scale drifts far from the seed scale.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<f64>", into = "Vec<f64>"))]
pub struct Domain {
    points: Vec<f64>,
}

impl Domain {
    /// Builds the fitting grid: `resolution` points from `lower - seed.scale`
    /// to `upper + seed.scale` inclusive.
    ///
    /// The one-scale padding keeps the peak and the tails on the grid even
    /// when the optimum lies outside `[lower, upper]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_skewfit::skewnorm::{Domain, ShapeParams};
    ///
    /// let seed = ShapeParams::new(1.0, 5.0, 5.0);
    /// let domain = Domain::build(0.0, 10.0, &seed, 200).unwrap();
    /// assert_eq!(domain.len(), 200);
    /// assert_eq!(domain.first(), -5.0);
    /// assert_eq!(domain.last(), 15.0);
    /// ```
    pub fn build(lower: f64, upper: f64, seed: &ShapeParams, resolution: usize) -> Result<Self> {
        Self::linspace(lower - seed.scale, upper + seed.scale, resolution)
    }

    /// `n` evenly spaced points from `start` to `end` inclusive.
    ///
    /// The endpoints are reproduced exactly; interior points are
    /// `start + i * step`.
    pub fn linspace(start: f64, end: f64, n: usize) -> Result<Self> {
        if n < 2 {
            return Err(FitError::InvalidResolution(n));
        }
        let step = (end - start) / (n - 1) as f64;
        let mut points: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
        points[n - 1] = end;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a domain has at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.points[0]
    }

    pub fn last(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Distance between neighbouring points.
    pub fn step(&self) -> f64 {
        (self.last() - self.first()) / (self.len() - 1) as f64
    }
}

/// Adopts an existing grid. Fewer than two points is rejected; spacing is
/// taken as given.
impl TryFrom<Vec<f64>> for Domain {
    type Error = FitError;

    fn try_from(points: Vec<f64>) -> Result<Self> {
        if points.len() < 2 {
            return Err(FitError::InvalidResolution(points.len()));
        }
        Ok(Self { points })
    }
}

impl From<Domain> for Vec<f64> {
    fn from(domain: Domain) -> Self {
        domain.points
    }
}
