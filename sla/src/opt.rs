//! Multi-start bounded synthesis of the hardpoints.
//!
//! Each restart draws a start point inside the bounds and runs a Nelder-Mead
//! search over the free dimensions. The restarts are independent, so they are
//! mapped over a thread pool and then reduced to the lowest cost.
//!
//! ```
//! use sla::{opt::*, Corner, Schema, SuspensionState, TargetCurve};
//!
//! let base = SuspensionState::example();
//! let schema = Schema::full();
//! let guess = schema.encode(&base);
//! // Only the front camber offset is free
//! let mut bounds = guess.iter().map(|&x| [x, x]).collect::<Vec<_>>();
//! bounds[42] = [0., 10.];
//! let target = TargetCurve::new(vec![0.], vec![-1.]).unwrap();
//! let cfg = OptCfg { corner: Corner::Front, seed: Some(0), base, ..Default::default() };
//! let s = optimize(&target, &guess, &bounds.into(), 2, &cfg).unwrap();
//! assert!(s.cost < 1e-6);
//! ```
use crate::{kin, point::*, target::TargetCurve, vectorized::*, Error, SuspensionState};
use argmin::{
    core::{CostFunction, Executor, State, TerminationReason},
    solver::neldermead::NelderMead,
};
use rand::{rngs::StdRng, SeedableRng};

/// Cost of a sample that cannot be evaluated.
///
/// It exceeds the squared error of any camber angle.
pub const INFEASIBLE: f64 = 1e5;
// Weight of the squared distance outside the bounds
const PENALTY: f64 = 1e3;
// Edge of the initial simplex relative to the bound width
const SIMPLEX_STEP: f64 = 0.05;

/// Optimization settings.
#[derive(Clone, Debug)]
pub struct OptCfg {
    /// The corner compared with the target curve
    pub corner: Corner,
    /// Layout of the parameter vector
    pub schema: Schema,
    /// State providing the entries outside the schema
    pub base: SuspensionState,
    /// Tolerance of the standard deviation of the simplex costs
    pub tol: f64,
    /// Maximum iterations of each restart
    pub max_iters: u64,
    /// Random seed of the start points, a random one is used if not set
    pub seed: Option<u64>,
    /// Run the restarts in parallel
    pub parallel: bool,
}

impl Default for OptCfg {
    fn default() -> Self {
        Self {
            corner: Corner::Front,
            schema: Schema::full(),
            base: SuspensionState::default(),
            tol: 1e-8,
            max_iters: 5000,
            seed: None,
            parallel: true,
        }
    }
}

/// Report of one restart.
#[derive(Clone, Debug, PartialEq)]
pub struct Trial {
    /// Restart index
    pub restart: usize,
    /// Start point
    pub start: Vec<f64>,
    /// Best parameters of the restart
    pub xs: Vec<f64>,
    /// Cost of the best parameters
    pub cost: f64,
    /// Number of iterations
    pub iterations: u64,
    /// Return true if the tolerance was met before the iteration limit
    pub converged: bool,
}

/// Result of the optimization.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Best-fit state
    pub state: SuspensionState,
    /// Best parameters
    pub xs: Vec<f64>,
    /// Cost of the best parameters
    pub cost: f64,
    /// The seed of the start points
    pub seed: u64,
    /// Reports of all restarts in order
    pub trials: Vec<Trial>,
}

impl Solution {
    /// The restarts that hit the iteration limit.
    pub fn unconverged(&self) -> impl Iterator<Item = &Trial> {
        self.trials.iter().filter(|t| !t.converged)
    }
}

/// Cost of a parameter vector: the sum of squared camber errors at the
/// target displacements.
///
/// The decoded state is set to planar arms first. If the fitted corner has
/// points on the left side, every sample costs [`INFEASIBLE`], and each
/// unsolvable sample costs [`INFEASIBLE`]. The other corner is not checked.
pub fn objective(target: &TargetCurve, xs: &[f64], cfg: &OptCfg) -> Result<f64, Error> {
    let state = cfg.schema.decode(xs, &cfg.base)?.with_planar_arms();
    Ok(camber_err(target, &state, cfg.corner))
}

fn camber_err(target: &TargetCurve, state: &SuspensionState, corner: Corner) -> f64 {
    if state.validate_corner(corner).is_err() {
        return INFEASIBLE * target.len() as f64;
    }
    kin::cambers(state, corner, &target.displacement)
        .into_iter()
        .zip(&target.camber)
        .map(|(c, t)| c.map_or(INFEASIBLE, |c| (c - t).powi(2)))
        .sum()
}

/// Find the parameters whose camber curve fits the target best.
///
/// The initial guess only sets the expected length, every restart starts from
/// a uniform random point inside the bounds. The dimensions with zero width
/// are pinned.
///
/// The `y` and `z` of a forward chassis pickup follow its rearward pickup,
/// which searches the intersection of both bounds, and the `z` of a contact
/// patch stays on the ground. Return error if such a bound cannot be met, so
/// the reported state always encodes inside the bounds.
pub fn optimize(
    target: &TargetCurve,
    initial_guess: &[f64],
    bounds: &Bounds,
    restarts: usize,
    cfg: &OptCfg,
) -> Result<Solution, Error> {
    optimize_with(target, initial_guess, bounds, restarts, cfg, |_| ())
}

/// Same as [`optimize()`], with a callback invoked after each restart.
pub fn optimize_with<F>(
    target: &TargetCurve,
    initial_guess: &[f64],
    bounds: &Bounds,
    restarts: usize,
    cfg: &OptCfg,
    on_trial: F,
) -> Result<Solution, Error>
where
    F: Fn(&Trial) + Sync + Send,
{
    #[cfg(feature = "rayon")]
    use rayon::prelude::*;
    bounds.check(initial_guess)?;
    cfg.schema.check_dim("initial guess", initial_guess.len())?;
    if target.is_empty() {
        return Err(Error::config("empty target curve"));
    }
    if restarts == 0 {
        return Err(Error::config("at least one restart is required"));
    }
    if !(cfg.tol > 0.) || cfg.max_iters == 0 {
        return Err(Error::config(format!(
            "invalid solver settings: tol={}, max_iters={}",
            cfg.tol, cfg.max_iters
        )));
    }
    let ties = planar_ties(&cfg.schema, &cfg.base);
    let bounds = tie_bounds(bounds, &ties, &cfg.schema)?;
    let seed = cfg.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let starts = (0..restarts)
        .map(|_| {
            let mut xs = bounds.sample(&mut rng);
            apply_ties(&mut xs, &ties);
            xs
        })
        .collect::<Vec<_>>();
    let free = bounds.free_indices();
    let search = Search { target, cfg, bounds: &bounds, free: &free, ties: &ties };
    let task = |(restart, start): (usize, Vec<f64>)| {
        let trial = search.trial(restart, start);
        if let Ok(trial) = &trial {
            on_trial(trial);
        }
        trial
    };
    #[cfg(feature = "rayon")]
    let trials = if cfg.parallel {
        starts.into_par_iter().enumerate().map(&task).collect::<Result<Vec<_>, _>>()?
    } else {
        starts.into_iter().enumerate().map(&task).collect::<Result<Vec<_>, _>>()?
    };
    #[cfg(not(feature = "rayon"))]
    let trials = starts.into_iter().enumerate().map(&task).collect::<Result<Vec<_>, _>>()?;
    // The first minimum wins
    let best = trials
        .iter()
        .min_by(|a, b| a.cost.total_cmp(&b.cost))
        .ok_or_else(|| Error::config("no restart was run"))?;
    let cost = best.cost;
    let state = cfg.schema.decode(&best.xs, &cfg.base)?.with_planar_arms();
    let xs = cfg.schema.encode(&state);
    Ok(Solution { state, xs, cost, seed, trials })
}

// The value followed by a tied dimension
#[derive(Clone, Copy, Debug, PartialEq)]
enum Tie {
    Param(usize),
    Value(f64),
}

// Dimensions overwritten by the planar-arm regularization
fn planar_ties(schema: &Schema, base: &SuspensionState) -> Vec<(usize, Tie)> {
    let mut ties = Vec::new();
    for corner in Corner::ALL {
        for [fwd, rwd] in Hardpoint::ARMS {
            let Some(i) = schema.position(Key::new(corner, fwd)) else {
                continue;
            };
            let rwd = Key::new(corner, rwd);
            for c in [1, 2] {
                let tie = match schema.position(rwd) {
                    Some(j) => Tie::Param(j + c),
                    None => Tie::Value(base.get(rwd)[c]),
                };
                ties.push((i + c, tie));
            }
        }
        if let Some(i) = schema.position(Key::new(corner, Hardpoint::ContactPatch)) {
            ties.push((i + 2, Tie::Value(0.)));
        }
    }
    ties
}

// Narrow the bounds to the tied values, the tied dimensions are pinned
fn tie_bounds(bounds: &Bounds, ties: &[(usize, Tie)], schema: &Schema) -> Result<Bounds, Error> {
    let name = |i| match schema.locate(i) {
        Some((key, c)) => format!("{key}[{}]", ["x", "y", "z"][c]),
        None => i.to_string(),
    };
    let mut b = bounds.as_slice().to_vec();
    for &(i, tie) in ties {
        let [lo, hi] = b[i];
        match tie {
            Tie::Param(j) => {
                let [lo, hi] = [lo.max(b[j][0]), hi.min(b[j][1])];
                if lo > hi {
                    return Err(Error::config(format!(
                        "{} and {} must be equal but their bounds are disjoint",
                        name(i),
                        name(j)
                    )));
                }
                b[j] = [lo, hi];
                b[i] = [lo, lo];
            }
            Tie::Value(v) if (lo..=hi).contains(&v) => b[i] = [v, v],
            Tie::Value(v) => {
                return Err(Error::config(format!(
                    "{} is fixed to {v} which is outside [{lo}, {hi}]",
                    name(i)
                )))
            }
        }
    }
    Ok(Bounds::new(b))
}

fn apply_ties(xs: &mut [f64], ties: &[(usize, Tie)]) {
    for &(i, tie) in ties {
        xs[i] = match tie {
            Tie::Param(j) => xs[j],
            Tie::Value(v) => v,
        };
    }
}

struct Search<'a> {
    target: &'a TargetCurve,
    cfg: &'a OptCfg,
    bounds: &'a Bounds,
    free: &'a [usize],
    ties: &'a [(usize, Tie)],
}

impl Search<'_> {
    fn trial(&self, restart: usize, start: Vec<f64>) -> Result<Trial, Error> {
        match self.solve(&start) {
            Ok((xs, cost, iterations, converged)) => {
                Ok(Trial { restart, start, xs, cost, iterations, converged })
            }
            Err(e) => Err(Error::Trial { restart, start, reason: e.to_string() }),
        }
    }

    fn solve(&self, start: &[f64]) -> Result<(Vec<f64>, f64, u64, bool), argmin::core::Error> {
        let problem = Problem { search: self, start };
        if self.free.is_empty() {
            let (xs, _) = problem.expand(&[]);
            let cost = problem.eval(&xs)?;
            return Ok((xs, cost, 0, true));
        }
        let p0 = self.free.iter().map(|&i| start[i]).collect::<Vec<_>>();
        let mut simplex = vec![p0.clone()];
        for (k, &i) in self.free.iter().enumerate() {
            let [lo, hi] = self.bounds.as_slice()[i];
            let h = SIMPLEX_STEP * (hi - lo);
            let mut v = p0.clone();
            v[k] += if v[k] + h <= hi { h } else { -h };
            simplex.push(v);
        }
        let solver = NelderMead::new(simplex).with_sd_tolerance(self.cfg.tol)?;
        let res = Executor::new(problem, solver)
            .configure(|state| state.max_iters(self.cfg.max_iters))
            .run()?;
        let state = res.state();
        let p = state
            .get_best_param()
            .ok_or_else(|| argmin::core::Error::msg("no best parameters"))?;
        let converged = matches!(
            state.get_termination_reason(),
            Some(TerminationReason::SolverConverged)
        );
        let (xs, _) = problem.expand(p);
        let cost = problem.eval(&xs)?;
        Ok((xs, cost, state.get_iter(), converged))
    }
}

#[derive(Clone, Copy)]
struct Problem<'a> {
    search: &'a Search<'a>,
    start: &'a [f64],
}

impl Problem<'_> {
    // Full parameter vector clamped into the bounds, and the squared distance
    // outside them
    fn expand(&self, p: &[f64]) -> (Vec<f64>, f64) {
        let mut xs = self.start.to_vec();
        let mut out = 0.;
        for (&i, &v) in self.search.free.iter().zip(p) {
            let [lo, hi] = self.search.bounds.as_slice()[i];
            let c = v.clamp(lo, hi);
            out += (v - c).powi(2);
            xs[i] = c;
        }
        apply_ties(&mut xs, self.search.ties);
        (xs, out)
    }

    fn eval(&self, xs: &[f64]) -> Result<f64, argmin::core::Error> {
        objective(self.search.target, xs, self.search.cfg)
            .map_err(|e| argmin::core::Error::msg(e.to_string()))
    }
}

impl CostFunction for Problem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let (xs, out) = self.expand(p);
        Ok(self.eval(&xs)? + PENALTY * out)
    }
}
