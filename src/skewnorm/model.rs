//! Skew-normal parameters and density.

use super::domain::Domain;
use u_numflow::special::{standard_normal_cdf, standard_normal_pdf};

/// Shape parameters of a skew-normal distribution.
///
/// Values are never validated. A zero or negative `scale` is accepted and
/// produces degenerate (NaN, zero or negative) densities rather than an error;
/// the fitting loop relies on such candidates scoring poorly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeParams {
    /// Skewness. Positive values lean the mass to the right of `loc`.
    pub a: f64,

    /// Location.
    pub loc: f64,

    /// Scale.
    pub scale: f64,
}

impl ShapeParams {
    pub fn new(a: f64, loc: f64, scale: f64) -> Self {
        Self { a, loc, scale }
    }

    /// Binds these parameters to a density function.
    pub fn distribution(&self) -> SkewNormal {
        SkewNormal::new(*self)
    }
}

/// A skew-normal density bound to one [`ShapeParams`].
///
/// # Examples
///
/// ```
/// use u_skewfit::skewnorm::{ShapeParams, SkewNormal};
///
/// // a = 0 is the plain normal distribution.
/// let normal = SkewNormal::new(ShapeParams::new(0.0, 0.0, 1.0));
/// assert!((normal.pdf(0.0) - 0.3989422804014327).abs() < 1e-7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewNormal {
    params: ShapeParams,
}

impl SkewNormal {
    pub fn new(params: ShapeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> ShapeParams {
        self.params
    }

    /// Density at `x`: `2/scale · φ(z) · Φ(a·z)` with `z = (x - loc) / scale`.
    pub fn pdf(&self, x: f64) -> f64 {
        let ShapeParams { a, loc, scale } = self.params;
        let z = (x - loc) / scale;
        2.0 / scale * standard_normal_pdf(z) * standard_normal_cdf(a * z)
    }

    /// Evaluates the density at every domain point, in domain order.
    pub fn density_over(&self, domain: &Domain) -> Vec<f64> {
        domain.points().iter().map(|&x| self.pdf(x)).collect()
    }

    /// Domain point of maximum density.
    ///
    /// Ties resolve to the first (leftmost) point. NaN densities are skipped;
    /// returns `None` only when every density on the domain is NaN.
    pub fn mode_on(&self, domain: &Domain) -> Option<f64> {
        argmax_first(&self.density_over(domain)).map(|i| domain.points()[i])
    }
}

/// Index of the first maximum, ignoring NaN values.
fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
