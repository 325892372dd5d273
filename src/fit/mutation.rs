//! Multiplicative mutation of skew-normal parameters.
//!
//! Every parameter is multiplied by `|N(1, strength)|`. The jitter is
//! proportional to the parameter's own magnitude, so step sizes shrink and
//! grow with the parameters. The absolute value folds the sign out of the
//! multiplier, which has two consequences callers must live with:
//!
//! - a parameter never changes sign through mutation (`loc` only moves
//!   towards or away from zero);
//! - a parameter that is exactly `0.0` never moves, whatever the strength.

use crate::skewnorm::ShapeParams;
use rand::Rng;
use rand_distr::StandardNormal;

/// Per-parameter mutation strengths (standard deviations of the multiplier).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MutationStrengths {
    /// Strength applied to the skewness `a`.
    pub a: f64,

    /// Strength applied to the location `loc`.
    pub loc: f64,

    /// Strength applied to the scale.
    pub scale: f64,
}

impl MutationStrengths {
    pub fn new(a: f64, loc: f64, scale: f64) -> Self {
        Self { a, loc, scale }
    }

    /// Same strength for all three parameters.
    pub fn uniform(strength: f64) -> Self {
        Self::new(strength, strength, strength)
    }

    /// All strengths zero: mutation is the identity.
    pub fn none() -> Self {
        Self::uniform(0.0)
    }
}

impl Default for MutationStrengths {
    fn default() -> Self {
        Self::uniform(0.1)
    }
}

/// Draws from `N(1, strength)`.
pub fn sample_multiplier<R: Rng>(strength: f64, rng: &mut R) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    1.0 + strength * z
}

/// `value * |N(1, strength)|`.
///
/// A strength of `0.0` returns `value` exactly (one draw is still consumed).
///
/// # Examples
///
/// ```
/// use u_skewfit::fit::mutation::mutate;
///
/// let mut rng = u_numflow::random::create_rng(7);
/// assert_eq!(mutate(3.5, 0.0, &mut rng), 3.5);
/// assert!(mutate(-2.0, 0.5, &mut rng) <= 0.0);
/// ```
pub fn mutate<R: Rng>(value: f64, strength: f64, rng: &mut R) -> f64 {
    value * sample_multiplier(strength, rng).abs()
}

/// One child of `parent`, each parameter mutated independently.
pub fn mutate_params<R: Rng>(
    parent: &ShapeParams,
    strengths: &MutationStrengths,
    rng: &mut R,
) -> ShapeParams {
    ShapeParams {
        a: mutate(parent.a, strengths.a, rng),
        loc: mutate(parent.loc, strengths.loc, rng),
        scale: mutate(parent.scale, strengths.scale, rng),
    }
}

/// `n_mutations` independent children of the same parent.
pub fn generate_mutations<R: Rng>(
    parent: &ShapeParams,
    strengths: &MutationStrengths,
    n_mutations: usize,
    rng: &mut R,
) -> Vec<ShapeParams> {
    (0..n_mutations)
        .map(|_| mutate_params(parent, strengths, rng))
        .collect()
}
