//! Loss of a candidate parameter set against the target constraints.
//!
//! Three error terms are averaged:
//!
//! ```text
//! left  = (|edge_target - ∫_{-∞}^{lower} f| · 1000) ^ edge_exp
//! right = (|edge_target - ∫_{upper}^{+∞} f| · 1000) ^ edge_exp
//! modal = (|argmax_domain f - mode|       · 1000) ^ modal_exp
//! loss  = (left + right + modal) / 3
//! ```
//!
//! The ×1000 factor puts sub-unit mass errors and position errors on
//! comparable magnitudes before exponentiation.
//!
//! Nothing is caught: a failed integral or an all-NaN density yields a NaN
//! or very large loss.

use super::config::FitConfig;
use super::types::Constraints;
use crate::quadrature::{DoubleExponential, Integrator};
use crate::skewnorm::{Domain, ShapeParams};

/// Factor applied to every raw error before exponentiation.
pub const ERROR_SCALE: f64 = 1000.0;

/// Breakdown of one loss evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LossTerms {
    /// Probability mass left of `lower`.
    pub left_mass: f64,

    /// Probability mass right of `upper`.
    pub right_mass: f64,

    /// Domain point of maximum density (NaN if none).
    pub estimated_mode: f64,

    pub left_error: f64,

    pub right_error: f64,

    pub modal_error: f64,
}

impl LossTerms {
    /// Mean of the three error terms.
    pub fn total(&self) -> f64 {
        (self.left_error + self.right_error + self.modal_error) / 3.0
    }
}

/// Scores [`ShapeParams`] against fixed constraints on a fixed domain.
///
/// # Examples
///
/// ```
/// use u_skewfit::fit::{Constraints, LossEvaluator};
/// use u_skewfit::skewnorm::Domain;
///
/// let constraints = Constraints::new(0.0, 5.0, 10.0);
/// let seed = constraints.seed_params();
/// let domain = Domain::build(0.0, 10.0, &seed, 200).unwrap();
///
/// let evaluator = LossEvaluator::new(constraints, &domain, 0.05, 1.0, 1.0);
/// let terms = evaluator.terms(&seed);
/// assert!((terms.left_mass - 0.0251715).abs() < 1e-5);
/// assert!((evaluator.loss(&seed) - 943.26).abs() < 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct LossEvaluator<'d, I: Integrator = DoubleExponential> {
    constraints: Constraints,
    domain: &'d Domain,
    edge_target: f64,
    edge_exp: f64,
    modal_exp: f64,
    integrator: I,
}

impl<'d> LossEvaluator<'d, DoubleExponential> {
    pub fn new(
        constraints: Constraints,
        domain: &'d Domain,
        edge_target: f64,
        edge_exp: f64,
        modal_exp: f64,
    ) -> Self {
        Self {
            constraints,
            domain,
            edge_target,
            edge_exp,
            modal_exp,
            integrator: DoubleExponential::default(),
        }
    }

    /// Evaluator for the constraints and loss shape of `config`.
    pub fn from_config(config: &FitConfig, domain: &'d Domain) -> Self {
        Self::new(
            config.constraints,
            domain,
            config.edge_target,
            config.edge_exp,
            config.modal_exp,
        )
    }
}

impl<'d, I: Integrator> LossEvaluator<'d, I> {
    /// Replaces the integral routine used for tail mass.
    pub fn with_integrator<J: Integrator>(self, integrator: J) -> LossEvaluator<'d, J> {
        LossEvaluator {
            constraints: self.constraints,
            domain: self.domain,
            edge_target: self.edge_target,
            edge_exp: self.edge_exp,
            modal_exp: self.modal_exp,
            integrator,
        }
    }

    pub fn domain(&self) -> &Domain {
        self.domain
    }

    /// Scalar loss; lower is better.
    pub fn loss(&self, params: &ShapeParams) -> f64 {
        self.terms(params).total()
    }

    /// Full breakdown of the loss for `params`.
    pub fn terms(&self, params: &ShapeParams) -> LossTerms {
        let (left_mass, right_mass) = self.tail_masses(params);
        let estimated_mode = params
            .distribution()
            .mode_on(self.domain)
            .unwrap_or(f64::NAN);

        LossTerms {
            left_mass,
            right_mass,
            estimated_mode,
            left_error: scaled_error(self.edge_target, left_mass, self.edge_exp),
            right_error: scaled_error(self.edge_target, right_mass, self.edge_exp),
            modal_error: scaled_error(self.constraints.mode, estimated_mode, self.modal_exp),
        }
    }
}

impl<I: Integrator> LossEvaluator<'_, I> {
    /// `|∫ pdf|` below `lower` and above `upper`.
    ///
    /// For a positive scale the integral runs over the standard variable
    /// `z = (x - loc) / scale`, where the density is unit-width and centred
    /// near the origin wherever `loc` and `scale` have drifted. Other scales
    /// integrate the raw density.
    fn tail_masses(&self, params: &ShapeParams) -> (f64, f64) {
        let (lower, upper) = (self.constraints.lower, self.constraints.upper);
        let (dist, lower, upper) = if params.scale > 0.0 && params.scale.is_finite() {
            (
                ShapeParams::new(params.a, 0.0, 1.0).distribution(),
                (lower - params.loc) / params.scale,
                (upper - params.loc) / params.scale,
            )
        } else {
            (params.distribution(), lower, upper)
        };
        let pdf = |x: f64| dist.pdf(x);

        let left = self.integrator.integrate(pdf, f64::NEG_INFINITY, lower);
        let right = self.integrator.integrate(pdf, upper, f64::INFINITY);
        (left.abs(), right.abs())
    }
}

/// `(|target - actual| · 1000) ^ exponent`.
fn scaled_error(target: f64, actual: f64, exponent: f64) -> f64 {
    ((target - actual).abs() * ERROR_SCALE).powf(exponent)
}
