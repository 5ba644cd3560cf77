//! Numeric helpers shared by detectors and the confidence model

use crate::budget::Budget;
use crate::error::TimedOut;
use nalgebra::{DMatrix, DVector};

/// Singular values below this fraction of the largest make a fit singular
const RANK_TOLERANCE: f64 = 1e-12;

/// `|x - reference| <= atol + rtol * |reference|`
#[inline]
pub fn is_close(x: f64, reference: f64, rtol: f64, atol: f64) -> bool {
    (x - reference).abs() <= atol + rtol * reference.abs()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn mean_abs(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Consecutive differences
pub fn differences(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Ordinary least squares `y = slope * x + intercept`. None when x is constant.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let x_mean = mean(xs);
    let y_mean = mean(ys);

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        ss_xy += (x - x_mean) * (y - y_mean);
        ss_xx += (x - x_mean).powi(2);
    }

    if ss_xx == 0.0 {
        return None;
    }
    let slope = ss_xy / ss_xx;
    Some((slope, y_mean - slope * x_mean))
}

/// Least-squares polynomial over the points `(1, v[0]) .. (n, v[n-1])`
#[derive(Debug, Clone, PartialEq)]
pub struct PolyFit {
    /// Coefficients in the scaled variable `t = x / n`, lowest order first
    pub scaled: Vec<f64>,
    /// Coefficients in `x`, highest order first
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    /// Value at `x = n + 1`
    pub next_value: f64,
}

impl PolyFit {
    /// Leading coefficient is negligible next to the others
    pub fn leading_is_degenerate(&self, tolerance: f64) -> bool {
        let largest = self.scaled.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
        match self.scaled.last() {
            Some(lead) => lead.abs() <= tolerance * largest,
            None => true,
        }
    }
}

/// Fit a polynomial of `degree` by SVD least squares.
///
/// Abscissae are scaled into `(0, 1]` so the Vandermonde matrix stays well
/// conditioned for long sequences. `Ok(None)` when the system is singular.
pub fn polyfit(values: &[f64], degree: usize, budget: &Budget) -> Result<Option<PolyFit>, TimedOut> {
    let n = values.len();
    let cols = degree + 1;
    if n < cols {
        return Ok(None);
    }
    let scale = n as f64;

    let mut vandermonde = DMatrix::<f64>::zeros(n, cols);
    for row in 0..n {
        budget.tick(row, "polynomial")?;
        let t = (row + 1) as f64 / scale;
        let mut power = 1.0;
        for col in 0..cols {
            vandermonde[(row, col)] = power;
            power *= t;
        }
    }
    let rhs = DVector::from_column_slice(values);

    let svd = vandermonde.svd(true, true);
    let largest = svd.singular_values.iter().fold(0.0_f64, |acc, s| acc.max(*s));
    let smallest = svd.singular_values.iter().fold(f64::INFINITY, |acc, s| acc.min(*s));
    if largest == 0.0 || smallest <= largest * RANK_TOLERANCE {
        return Ok(None);
    }
    let solution = match svd.solve(&rhs, RANK_TOLERANCE * largest) {
        Ok(x) => x,
        Err(_) => return Ok(None),
    };
    let scaled: Vec<f64> = solution.iter().copied().collect();
    if scaled.iter().any(|c| !c.is_finite()) {
        return Ok(None);
    }

    let eval = |t: f64| scaled.iter().rev().fold(0.0, |acc, c| acc * t + c);

    let y_mean = mean(values);
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &y) in values.iter().enumerate() {
        budget.tick(i, "polynomial")?;
        let fitted = eval((i + 1) as f64 / scale);
        ss_res += (y - fitted).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    let coefficients = scaled
        .iter()
        .enumerate()
        .rev()
        .map(|(k, c)| c / scale.powi(k as i32))
        .collect();

    Ok(Some(PolyFit {
        next_value: eval((n + 1) as f64 / scale),
        coefficients,
        r_squared,
        scaled,
    }))
}
