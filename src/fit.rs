//! Exponential-decay fitting.
//!
//! Model: `y = amplitude · exp(-x / tau) + offset`, fitted by
//! Levenberg–Marquardt least squares.

use serde::{Deserialize, Serialize};

use crate::data::model::XySeries;
use crate::error::{Error, Result};

/// Number of free parameters in the model.
const N_PARAMS: usize = 3;

/// Damping bound past which the solver is considered stalled at a minimum.
const MAX_LAMBDA: f64 = 1e10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    pub max_iterations: usize,
    /// Relative change in residual or parameters that counts as converged.
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
        }
    }
}

// ---------------------------------------------------------------------------
// Model parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayParams {
    pub amplitude: f64,
    pub tau: f64,
    pub offset: f64,
}

impl DecayParams {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.amplitude * (-x / self.tau).exp() + self.offset
    }

    /// First y as amplitude, x span as lifetime, minimum y as offset.
    pub fn initial_guess(series: &XySeries) -> Self {
        let span = match (series.x.first(), series.x.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        let tau = if span > 0.0 { span } else { 1.0 };
        let offset = series.y.iter().copied().fold(f64::INFINITY, f64::min);
        Self {
            amplitude: series.y.first().copied().unwrap_or(0.0),
            tau,
            offset: if offset.is_finite() { offset } else { 0.0 },
        }
    }

    fn to_array(self) -> [f64; N_PARAMS] {
        [self.amplitude, self.tau, self.offset]
    }

    fn from_array(p: [f64; N_PARAMS]) -> Self {
        Self {
            amplitude: p[0],
            tau: p[1],
            offset: p[2],
        }
    }
}

// ---------------------------------------------------------------------------
// Fit result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub params: DecayParams,
    /// `false` when the iteration budget ran out or the solver broke down.
    pub converged: bool,
    pub iterations: usize,
    /// Residual sum of squares at `params`.
    pub rss: f64,
    /// Number of points the fit used.
    pub points: usize,
}

impl FitResult {
    /// Mean lifetime.
    pub fn tau(&self) -> f64 {
        self.params.tau
    }

    pub fn half_life(&self) -> f64 {
        self.params.tau * std::f64::consts::LN_2
    }

    pub fn decay_rate(&self) -> f64 {
        1.0 / self.params.tau
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.params.evaluate(x)
    }

    /// The fitted curve sampled at the x values of `series`.
    pub fn curve(&self, series: &XySeries) -> XySeries {
        let mut out = XySeries::default();
        for &x in &series.x {
            out.push(x, self.evaluate(x));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Levenberg–Marquardt
// ---------------------------------------------------------------------------

/// Fit the decay model to `series`.
pub fn fit_exponential(series: &XySeries, options: &FitOptions) -> Result<FitResult> {
    if series.len() < N_PARAMS {
        return Err(Error::Fit(format!(
            "need at least {N_PARAMS} points in the selected range, got {}",
            series.len()
        )));
    }
    if series.points().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(Error::Fit("selected points contain non-finite values".into()));
    }

    let mut p = DecayParams::initial_guess(series).to_array();
    let mut rss = residual_ss(series, p);
    if !rss.is_finite() {
        return Err(Error::Fit("initial guess does not evaluate to finite values".into()));
    }

    let mut lambda = 1e-3;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < options.max_iterations {
        iterations += 1;
        if rss == 0.0 {
            converged = true;
            break;
        }

        let (jtj, jtr) = normal_equations(series, p);
        let mut damped = jtj;
        for (i, row) in damped.iter_mut().enumerate() {
            row[i] += lambda * jtj[i][i].max(f64::EPSILON);
        }

        let Some(delta) = solve(damped, jtr) else {
            lambda *= 10.0;
            if lambda > MAX_LAMBDA {
                log::warn!("Normal equations stayed singular, giving up");
                break;
            }
            continue;
        };

        let trial = [p[0] + delta[0], p[1] + delta[1], p[2] + delta[2]];
        let trial_rss = residual_ss(series, trial);

        if trial_rss.is_finite() && trial_rss < rss {
            let rel_drop = (rss - trial_rss) / rss;
            let rel_step = (0..N_PARAMS)
                .map(|i| delta[i].abs() / (p[i].abs() + options.tolerance))
                .fold(0.0, f64::max);
            // Small steps only mean convergence when damping is not forcing them.
            let near_gauss_newton = lambda < 1.0;
            p = trial;
            rss = trial_rss;
            lambda = (lambda / 10.0).max(1e-12);
            if rel_drop < options.tolerance
                || (near_gauss_newton && rel_step < options.tolerance.sqrt())
            {
                converged = true;
                break;
            }
        } else {
            lambda *= 10.0;
            if lambda > MAX_LAMBDA {
                // No direction reduces the residual any further.
                converged = true;
                break;
            }
        }
    }

    let params = DecayParams::from_array(p);
    if converged {
        log::info!(
            "Fit converged after {iterations} iterations: tau = {:.4}, rss = {rss:.4e}",
            params.tau
        );
    } else {
        log::warn!(
            "Fit did not converge within {} iterations (tau = {:.4})",
            options.max_iterations,
            params.tau
        );
    }

    Ok(FitResult {
        params,
        converged,
        iterations,
        rss,
        points: series.len(),
    })
}

fn residual_ss(series: &XySeries, p: [f64; N_PARAMS]) -> f64 {
    let model = DecayParams::from_array(p);
    series
        .points()
        .map(|(x, y)| {
            let r = y - model.evaluate(x);
            r * r
        })
        .sum()
}

/// `JᵀJ` and `Jᵀr` for the current parameters.
fn normal_equations(
    series: &XySeries,
    p: [f64; N_PARAMS],
) -> ([[f64; N_PARAMS]; N_PARAMS], [f64; N_PARAMS]) {
    let [amplitude, tau, offset] = p;
    let mut jtj = [[0.0; N_PARAMS]; N_PARAMS];
    let mut jtr = [0.0; N_PARAMS];

    for (x, y) in series.points() {
        let e = (-x / tau).exp();
        let r = y - (amplitude * e + offset);
        let grad = [e, amplitude * e * x / (tau * tau), 1.0];
        for i in 0..N_PARAMS {
            jtr[i] += grad[i] * r;
            for j in 0..N_PARAMS {
                jtj[i][j] += grad[i] * grad[j];
            }
        }
    }
    (jtj, jtr)
}

/// Gaussian elimination with partial pivoting; `None` if singular.
fn solve(mut a: [[f64; N_PARAMS]; N_PARAMS], mut b: [f64; N_PARAMS]) -> Option<[f64; N_PARAMS]> {
    for col in 0..N_PARAMS {
        let pivot = (col..N_PARAMS).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if !a[pivot][col].is_normal() {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..N_PARAMS {
            let factor = a[row][col] / a[col][col];
            for k in col..N_PARAMS {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; N_PARAMS];
    for row in (0..N_PARAMS).rev() {
        let tail: f64 = (row + 1..N_PARAMS).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decay_series(amplitude: f64, tau: f64, offset: f64) -> XySeries {
        let mut s = XySeries::default();
        for i in 0..=100 {
            let x = i as f64 * 10.0;
            s.push(x, amplitude * (-x / tau).exp() + offset);
        }
        s
    }

    #[test]
    fn test_recovers_exact_parameters() {
        let series = decay_series(100.0, 250.0, 5.0);
        let fit = fit_exponential(&series, &FitOptions::default()).unwrap();

        assert!(fit.converged);
        assert!((fit.tau() - 250.0).abs() < 1e-3, "tau = {}", fit.tau());
        assert!((fit.params.amplitude - 100.0).abs() < 1e-3);
        assert!((fit.params.offset - 5.0).abs() < 1e-3);
        assert_eq!(fit.points, 101);
    }

    #[test]
    fn test_derived_quantities() {
        let fit = FitResult {
            params: DecayParams {
                amplitude: 1.0,
                tau: 2.0,
                offset: 0.0,
            },
            converged: true,
            iterations: 1,
            rss: 0.0,
            points: 3,
        };
        assert!((fit.half_life() - 2.0 * 2f64.ln()).abs() < 1e-12);
        assert!((fit.decay_rate() - 0.5).abs() < 1e-12);
        assert!((fit.evaluate(0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_points() {
        let mut s = XySeries::default();
        s.push(0.0, 10.0);
        s.push(1.0, 5.0);
        assert!(matches!(
            fit_exponential(&s, &FitOptions::default()),
            Err(Error::Fit(_))
        ));
    }

    #[test]
    fn test_initial_guess_from_series() {
        let series = decay_series(80.0, 100.0, 2.0);
        let guess = DecayParams::initial_guess(&series);
        assert_eq!(guess.amplitude, 82.0);
        assert_eq!(guess.tau, 1000.0);
        assert!(guess.offset > 2.0 && guess.offset < 2.01);
    }

    #[test]
    fn test_iteration_budget_reported() {
        let series = decay_series(100.0, 250.0, 5.0);
        let options = FitOptions {
            max_iterations: 1,
            tolerance: 0.0,
        };
        let fit = fit_exponential(&series, &options).unwrap();
        assert!(!fit.converged);
        assert_eq!(fit.iterations, 1);
    }

    #[test]
    fn test_singular_normal_equations_not_converged() {
        // tau = 2e-300 squares to zero, so the Jacobian is NaN at x = 0 while
        // the residual stays finite.
        let mut series = XySeries::default();
        for (x, y) in [(0.0, 3.0), (1e-300, 2.0), (2e-300, 1.0)] {
            series.push(x, y);
        }
        let fit = fit_exponential(&series, &FitOptions::default()).unwrap();
        assert!(!fit.converged);
        assert!(fit.iterations < FitOptions::default().max_iterations);
    }

    #[test]
    fn test_curve_samples_selection_x() {
        let series = decay_series(100.0, 250.0, 5.0);
        let fit = fit_exponential(&series, &FitOptions::default()).unwrap();
        let curve = fit.curve(&series);
        assert_eq!(curve.x, series.x);
        assert!((curve.y[0] - 105.0).abs() < 1e-2);
    }

    #[test]
    fn test_solve_identity_and_singular() {
        let id = [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 4.0]];
        assert_eq!(solve(id, [1.0, 2.0, 4.0]), Some([1.0, 1.0, 1.0]));
        assert_eq!(solve([[0.0; 3]; 3], [1.0, 0.0, 0.0]), None);
    }
}
