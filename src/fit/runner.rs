//! The `(1, λ)` evolution loop.
//!
//! [`FitRunner`] seeds the parameters from the constraints, builds the
//! domain once, then repeats for exactly `iters` iterations:
//! mutate λ children → score each child → replace the parent with the best
//! child. The parent never competes, so the logged loss can go up.

use super::config::FitConfig;
use super::loss::LossEvaluator;
use super::mutation::{generate_mutations, MutationStrengths};
use super::types::{Constraints, FitObserver, NoObserver};
use crate::error::Result;
use crate::quadrature::Integrator;
use crate::skewnorm::{Domain, ShapeParams};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use u_numflow::random::create_rng;

/// Append-only trace of a run.
///
/// `params[0]` is the seed; `params[i]`, `dists[i - 1]` and `loss[i - 1]`
/// describe the child selected in iteration `i`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunLog {
    /// Selected parameters, seed first. Length `iterations + 1`.
    pub params: Vec<ShapeParams>,

    /// Density of each selected child sampled over the run's domain.
    pub dists: Vec<Vec<f64>>,

    /// Loss of each selected child.
    pub loss: Vec<f64>,
}

impl RunLog {
    fn new(seed: ShapeParams) -> Self {
        Self {
            params: vec![seed],
            dists: Vec::new(),
            loss: Vec::new(),
        }
    }

    fn push(&mut self, params: ShapeParams, dist: Vec<f64>, loss: f64) {
        self.params.push(params);
        self.dists.push(dist);
        self.loss.push(loss);
    }

    /// Number of logged iterations.
    pub fn iterations(&self) -> usize {
        self.loss.len()
    }

    /// 1-based iteration with the lowest logged loss, first on ties.
    ///
    /// Because selection is non-elitist this can be earlier than the last
    /// iteration; `params[best_iteration]` recovers those parameters.
    /// `None` when nothing was logged or every loss is NaN.
    pub fn best_iteration(&self) -> Option<usize> {
        select_best(&self.loss).map(|i| i + 1)
    }
}

/// Result of a fitting run.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Parameters after the last completed iteration (the seed if none ran).
    pub params: ShapeParams,

    /// Full trace of the run.
    pub log: RunLog,

    /// The fixed grid every logged density was sampled on.
    pub domain: Domain,

    /// Iterations actually completed.
    pub iterations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,
}

/// Executes the skew-normal fitting loop.
///
/// # Usage
///
/// ```
/// use u_skewfit::fit::{FitConfig, FitRunner};
///
/// let config = FitConfig::new(0.0, 5.0, 10.0).with_iters(10).with_seed(1);
/// let result = FitRunner::run(&config).unwrap();
/// assert_eq!(result.iterations, 10);
/// assert_eq!(result.log.params.last(), Some(&result.params));
/// ```
pub struct FitRunner;

impl FitRunner {
    /// Runs the fit with an RNG seeded from `config.seed`.
    ///
    /// # Errors
    /// Returns the [`FitConfig::validate`] error for invalid configuration.
    pub fn run(config: &FitConfig) -> Result<FitResult> {
        Self::run_with_cancel(config, None)
    }

    /// Runs the fit with an optional cancellation token.
    ///
    /// The flag is checked before each iteration, never during one. A
    /// cancelled run returns everything completed so far.
    pub fn run_with_cancel(config: &FitConfig, cancel: Option<Arc<AtomicBool>>) -> Result<FitResult> {
        Self::run_with_observer(config, &mut NoObserver, cancel)
    }

    /// Runs the fit, reporting every iteration to `observer`.
    pub fn run_with_observer<O: FitObserver>(
        config: &FitConfig,
        observer: &mut O,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<FitResult> {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        Self::run_with_rng(config, &mut rng, observer, cancel)
    }

    /// Runs the fit drawing every mutation from `rng`.
    ///
    /// `config.seed` is ignored; the caller owns the random state.
    pub fn run_with_rng<R: Rng, O: FitObserver>(
        config: &FitConfig,
        rng: &mut R,
        observer: &mut O,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<FitResult> {
        config.validate()?;

        let seed = config.constraints.seed_params();
        let domain = Domain::build(
            config.constraints.lower,
            config.constraints.upper,
            &seed,
            config.resolution,
        )?;
        let evaluator = LossEvaluator::from_config(config, &domain);

        trace_info!(
            iters = config.iters,
            n_mutations = config.n_mutations,
            resolution = config.resolution,
            "skew-normal fit started"
        );

        let (params, log, cancelled) = evolve(
            &evaluator,
            seed,
            &config.strengths,
            config.n_mutations,
            config.iters,
            config.parallel,
            rng,
            observer,
            cancel.as_deref(),
        );

        trace_info!(
            iterations = log.iterations(),
            cancelled,
            a = params.a,
            loc = params.loc,
            scale = params.scale,
            "skew-normal fit finished"
        );

        Ok(FitResult {
            params,
            iterations: log.iterations(),
            log,
            domain,
            cancelled,
        })
    }
}

/// Fits skew-normal parameters with every option passed explicitly.
///
/// Equivalent to [`FitRunner::run_with_rng`] without observer or
/// cancellation. `parallel` scoring is off.
///
/// # Examples
///
/// ```
/// use u_skewfit::fit::evolve_params;
/// use u_skewfit::skewnorm::ShapeParams;
///
/// let mut rng = u_numflow::random::create_rng(0);
/// let (params, log) = evolve_params(
///     0.0, 5.0, 10.0, 200, 0.0, 0.0, 0.0, 1, 0.05, 0, 1.0, 1.0, &mut rng,
/// )
/// .unwrap();
/// assert_eq!(params, ShapeParams::new(1.0, 5.0, 5.0));
/// assert_eq!(log.params.len(), 1);
/// assert!(log.loss.is_empty());
/// ```
#[allow(clippy::too_many_arguments)]
pub fn evolve_params<R: Rng>(
    lower: f64,
    mode: f64,
    upper: f64,
    resolution: usize,
    a_mut: f64,
    loc_mut: f64,
    scale_mut: f64,
    n_mutations: usize,
    edge_target: f64,
    iters: usize,
    edge_exp: f64,
    modal_exp: f64,
    rng: &mut R,
) -> Result<(ShapeParams, RunLog)> {
    let config = FitConfig::from_constraints(Constraints::new(lower, mode, upper))
        .with_resolution(resolution)
        .with_strengths(MutationStrengths::new(a_mut, loc_mut, scale_mut))
        .with_n_mutations(n_mutations)
        .with_edge_target(edge_target)
        .with_iters(iters)
        .with_exponents(edge_exp, modal_exp);
    let result = FitRunner::run_with_rng(&config, rng, &mut NoObserver, None)?;
    Ok((result.params, result.log))
}

/// The iteration loop proper. Returns final params, log and cancellation.
#[allow(clippy::too_many_arguments)]
fn evolve<I: Integrator, R: Rng, O: FitObserver>(
    evaluator: &LossEvaluator<'_, I>,
    seed: ShapeParams,
    strengths: &MutationStrengths,
    n_mutations: usize,
    iters: usize,
    parallel: bool,
    rng: &mut R,
    observer: &mut O,
    cancel: Option<&AtomicBool>,
) -> (ShapeParams, RunLog, bool) {
    let mut current = seed;
    let mut log = RunLog::new(seed);

    for iteration in 1..=iters {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            trace_info!(iteration, "skew-normal fit cancelled");
            return (current, log, true);
        }

        // Children are drawn sequentially so the RNG stream does not depend
        // on how scoring is scheduled.
        let children = generate_mutations(&current, strengths, n_mutations, rng);
        let losses = score_children(evaluator, &children, parallel);

        let best = select_best(&losses).unwrap_or_else(|| {
            trace_warn!(iteration, "every child scored NaN, taking the first");
            0
        });

        // Non-elitist: the parent is replaced even if it scored better.
        current = children[best];
        let loss = losses[best];
        let dist = current.distribution().density_over(evaluator.domain());
        log.push(current, dist, loss);

        trace_debug!(
            iteration,
            loss,
            a = current.a,
            loc = current.loc,
            scale = current.scale,
            "iteration complete"
        );
        observer.on_iteration(iteration, &current, loss);
    }

    (current, log, false)
}

#[cfg(feature = "parallel")]
fn score_children<I: Integrator>(
    evaluator: &LossEvaluator<'_, I>,
    children: &[ShapeParams],
    parallel: bool,
) -> Vec<f64> {
    if parallel {
        children.par_iter().map(|c| evaluator.loss(c)).collect()
    } else {
        children.iter().map(|c| evaluator.loss(c)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn score_children<I: Integrator>(
    evaluator: &LossEvaluator<'_, I>,
    children: &[ShapeParams],
    _parallel: bool,
) -> Vec<f64> {
    children.iter().map(|c| evaluator.loss(c)).collect()
}

/// Index of the strictly smallest loss, first on ties, NaN never preferred.
///
/// `None` only when `losses` is empty or all NaN.
fn select_best(losses: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &loss) in losses.iter().enumerate() {
        if loss.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if loss >= b => {}
            _ => best = Some((i, loss)),
        }
    }
    best.map(|(i, _)| i)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_config() -> FitConfig {
        FitConfig::new(0.0, 5.0, 10.0)
            .with_resolution(200)
            .with_strengths(MutationStrengths::none())
            .with_n_mutations(1)
            .with_edge_target(0.05)
            .with_exponents(1.0, 1.0)
            .with_seed(42)
    }

    #[test]
    fn test_zero_iters_returns_seed() {
        let result = FitRunner::run(&reference_config().with_iters(0)).unwrap();
        assert_eq!(result.params, ShapeParams::new(1.0, 5.0, 5.0));
        assert_eq!(result.iterations, 0);
        assert_eq!(result.log.params, vec![result.params]);
        assert!(result.log.dists.is_empty());
        assert!(result.log.loss.is_empty());
        assert!(!result.cancelled);
    }

    #[test]
    fn test_single_noop_iteration_fixture() {
        let result = FitRunner::run(&reference_config().with_iters(1)).unwrap();
        assert_eq!(result.params, ShapeParams::new(1.0, 5.0, 5.0));
        assert_eq!(result.log.loss.len(), 1);
        assert!(
            (result.log.loss[0] - 943.2605330048544).abs() < 0.01,
            "loss {}",
            result.log.loss[0]
        );
    }

    #[test]
    fn test_zero_strength_loss_constant() {
        let result = FitRunner::run(&reference_config().with_iters(15)).unwrap();
        let first = result.log.loss[0];
        for (i, &loss) in result.log.loss.iter().enumerate() {
            assert_eq!(loss, first, "iteration {} loss changed", i + 1);
        }
        for params in &result.log.params {
            assert_eq!(*params, ShapeParams::new(1.0, 5.0, 5.0));
        }
    }

    #[test]
    fn test_log_lengths() {
        let config = FitConfig::new(0.0, 5.0, 10.0)
            .with_iters(12)
            .with_n_mutations(4)
            .with_resolution(64)
            .with_seed(7);
        let result = FitRunner::run(&config).unwrap();
        assert_eq!(result.log.params.len(), 13);
        assert_eq!(result.log.dists.len(), 12);
        assert_eq!(result.log.loss.len(), 12);
        for dist in &result.log.dists {
            assert_eq!(dist.len(), 64);
        }
        assert_eq!(result.domain.len(), 64);
        assert_eq!(*result.log.params.last().unwrap(), result.params);
    }

    #[test]
    fn test_logged_dist_matches_params() {
        let config = FitConfig::new(-2.0, 1.0, 6.0).with_iters(5).with_seed(3);
        let result = FitRunner::run(&config).unwrap();
        for (params, dist) in result.log.params[1..].iter().zip(&result.log.dists) {
            assert_eq!(*dist, params.distribution().density_over(&result.domain));
        }
    }

    #[test]
    fn test_domain_built_from_seed() {
        let config = FitConfig::new(2.0, 4.0, 12.0).with_iters(3).with_seed(11);
        let result = FitRunner::run(&config).unwrap();
        assert_eq!(result.domain.first(), 2.0 - 5.0);
        assert_eq!(result.domain.last(), 12.0 + 5.0);
    }

    #[test]
    fn test_same_seed_reproducible() {
        let config = FitConfig::new(0.0, 3.0, 10.0).with_iters(10).with_seed(99);
        let a = FitRunner::run(&config).unwrap();
        let b = FitRunner::run(&config).unwrap();
        assert_eq!(a.params, b.params);
        assert_eq!(a.log, b.log);
    }

    #[test]
    fn test_search_improves_on_seed() {
        let config = FitConfig::new(0.0, 3.0, 10.0)
            .with_iters(60)
            .with_n_mutations(16)
            .with_strengths(MutationStrengths::new(0.3, 0.05, 0.1))
            .with_seed(2024);
        let result = FitRunner::run(&config).unwrap();

        let domain = result.domain.clone();
        let evaluator = LossEvaluator::from_config(&config, &domain);
        let seed_loss = evaluator.loss(&result.log.params[0]);
        let best = result.log.best_iteration().unwrap();
        assert!(
            result.log.loss[best - 1] < seed_loss,
            "best logged loss {} should beat seed loss {seed_loss}",
            result.log.loss[best - 1]
        );
    }

    #[test]
    fn test_cancel_before_start() {
        let cancel = Arc::new(AtomicBool::new(true));
        let config = FitConfig::new(0.0, 5.0, 10.0).with_iters(1000).with_seed(1);
        let result = FitRunner::run_with_cancel(&config, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.log.params.len(), 1);
        assert_eq!(result.params, config.constraints.seed_params());
    }

    #[test]
    fn test_cancel_with_huge_budget() {
        let cancel = Arc::new(AtomicBool::new(true));
        let config = FitConfig::new(0.0, 5.0, 10.0)
            .with_iters(usize::MAX / 4)
            .with_seed(1);
        let result = FitRunner::run_with_cancel(&config, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.log.params.len(), 1);
        assert!(result.log.loss.is_empty());
    }

    #[test]
    fn test_cancel_from_observer_at_boundary() {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let mut observer = |iteration: usize, _p: &ShapeParams, _loss: f64| {
            if iteration == 4 {
                flag.store(true, Ordering::Relaxed);
            }
        };
        let config = FitConfig::new(0.0, 5.0, 10.0).with_iters(50).with_seed(5);
        let result = FitRunner::run_with_observer(&config, &mut observer, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.iterations, 4);
        assert_eq!(result.log.params.len(), 5);
        assert_eq!(result.log.dists.len(), 4);
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let mut seen = Vec::new();
        let mut observer = |iteration: usize, p: &ShapeParams, loss: f64| {
            seen.push((iteration, *p, loss));
        };
        let config = FitConfig::new(0.0, 5.0, 10.0).with_iters(6).with_seed(8);
        let result = FitRunner::run_with_observer(&config, &mut observer, None).unwrap();
        assert_eq!(seen.len(), 6);
        for (k, (iteration, p, loss)) in seen.iter().enumerate() {
            assert_eq!(*iteration, k + 1);
            assert_eq!(*p, result.log.params[k + 1]);
            assert_eq!(*loss, result.log.loss[k]);
        }
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = FitConfig::new(0.0, 5.0, 10.0).with_resolution(1);
        assert!(FitRunner::run(&config).is_err());
        let config = FitConfig::new(0.0, 5.0, 10.0).with_n_mutations(0);
        assert!(FitRunner::run(&config).is_err());
    }

    #[test]
    fn test_evolve_params_matches_runner() {
        let config = FitConfig::new(0.0, 5.0, 10.0)
            .with_strengths(MutationStrengths::new(0.2, 0.1, 0.1))
            .with_n_mutations(5)
            .with_iters(8);
        let via_runner =
            FitRunner::run_with_rng(&config, &mut create_rng(13), &mut NoObserver, None).unwrap();
        let (params, log) = evolve_params(
            0.0, 5.0, 10.0, 200, 0.2, 0.1, 0.1, 5, 0.05, 8, 1.0, 1.0,
            &mut create_rng(13),
        )
        .unwrap();
        assert_eq!(params, via_runner.params);
        assert_eq!(log, via_runner.log);
    }

    #[test]
    fn test_select_best_stable_first_minimum() {
        assert_eq!(select_best(&[3.0, 1.0, 1.0, 2.0]), Some(1));
        assert_eq!(select_best(&[0.5]), Some(0));
    }

    #[test]
    fn test_select_best_skips_nan() {
        assert_eq!(select_best(&[f64::NAN, 4.0, f64::NAN, 2.0]), Some(3));
        assert_eq!(select_best(&[f64::NAN, f64::INFINITY]), Some(1));
        assert_eq!(select_best(&[f64::NAN, f64::NAN]), None);
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn test_best_iteration_is_one_based() {
        let mut log = RunLog::new(ShapeParams::new(1.0, 0.0, 1.0));
        for loss in [5.0, 2.0, 3.0, 2.0] {
            log.push(ShapeParams::new(1.0, 0.0, 1.0), vec![], loss);
        }
        assert_eq!(log.best_iteration(), Some(2));
        assert_eq!(RunLog::new(ShapeParams::new(1.0, 0.0, 1.0)).best_iteration(), None);
    }

    // ---- Non-elitist replacement ----

    /// Reports exactly the target tail mass, so only the modal term scores.
    struct ExactTails;

    impl Integrator for ExactTails {
        fn integrate<F: Fn(f64) -> f64>(&self, _f: F, _a: f64, _b: f64) -> f64 {
            0.05
        }
    }

    #[test]
    fn test_parent_is_always_replaced() {
        // A normal centred on an integer grid point scores a perfect 0.
        let domain = Domain::linspace(0.0, 10.0, 11).unwrap();
        let evaluator = LossEvaluator::new(Constraints::new(2.0, 5.0, 8.0), &domain, 0.05, 1.0, 1.0)
            .with_integrator(ExactTails);
        let seed = ShapeParams::new(0.0, 5.0, 1.0);
        assert_eq!(evaluator.loss(&seed), 0.0);

        let mut rng = create_rng(17);
        let (params, log, cancelled) = evolve(
            &evaluator,
            seed,
            &MutationStrengths::new(0.0, 0.5, 0.2),
            1,
            20,
            false,
            &mut rng,
            &mut NoObserver,
            None,
        );
        assert!(!cancelled);
        assert_eq!(log.params.len(), 21);
        assert_eq!(params, log.params[20]);
        for pair in log.params.windows(2) {
            assert_ne!(pair[0], pair[1], "parent survived an iteration");
        }
        assert!(
            log.loss.iter().any(|&l| l > 0.0),
            "a perfect seed must still be replaced by worse children"
        );
    }

    // ---- All children NaN ----

    struct NanTails;

    impl Integrator for NanTails {
        fn integrate<F: Fn(f64) -> f64>(&self, _f: F, _a: f64, _b: f64) -> f64 {
            f64::NAN
        }
    }

    #[test]
    fn test_all_nan_generation_takes_first_child() {
        let constraints = Constraints::new(0.0, 5.0, 10.0);
        let seed = constraints.seed_params();
        let domain = Domain::build(0.0, 10.0, &seed, 50).unwrap();
        let evaluator =
            LossEvaluator::new(constraints, &domain, 0.05, 1.0, 1.0).with_integrator(NanTails);
        let strengths = MutationStrengths::new(0.2, 0.1, 0.1);

        let (params, log, cancelled) = evolve(
            &evaluator,
            seed,
            &strengths,
            3,
            1,
            false,
            &mut create_rng(23),
            &mut NoObserver,
            None,
        );
        let children = generate_mutations(&seed, &strengths, 3, &mut create_rng(23));

        assert!(!cancelled);
        assert_eq!(log.params.len(), 2);
        assert_eq!(log.params[1], children[0]);
        assert_eq!(params, children[0]);
        assert_ne!(children[0], seed);
        assert_eq!(log.loss.len(), 1);
        assert!(log.loss[0].is_nan());
        assert_eq!(log.dists[0], children[0].distribution().density_over(&domain));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let config = FitConfig::new(0.0, 4.0, 10.0)
            .with_iters(10)
            .with_n_mutations(12)
            .with_seed(31);
        let sequential = FitRunner::run(&config.clone().with_parallel(false)).unwrap();
        let parallel = FitRunner::run(&config.with_parallel(true)).unwrap();
        assert_eq!(sequential.log, parallel.log);
    }
}
