//! Ordinary least-squares fit of `y = slope * x + intercept`

use serde::Serialize;

use crate::{Error, Result};

/// Result of a simple linear regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Number of points fitted
    pub n: usize,
}

impl LinearFit {
    /// Fit a line through `(xs[i], ys[i])`
    ///
    /// Needs at least two points and some spread in `x`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(Error::InvalidInput(format!(
                "regression input length mismatch: {} x values, {} y values",
                xs.len(),
                ys.len()
            )));
        }
        let n = xs.len();
        if n < 2 {
            return Err(Error::InvalidInput(format!(
                "regression needs at least 2 points, got {}",
                n
            )));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(Error::InvalidInput(
                "regression input contains non-finite values".to_string(),
            ));
        }

        let count = n as f64;
        let mean_x = xs.iter().sum::<f64>() / count;
        let mean_y = ys.iter().sum::<f64>() / count;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut syy = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        if sxx == 0.0 {
            return Err(Error::InvalidInput(
                "regression needs variance in x".to_string(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let ss_res: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| {
                let residual = y - (slope * x + intercept);
                residual * residual
            })
            .sum();

        // Flat y: the fit is exact when every residual vanishes
        let r_squared = if syy == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / syy
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
            n,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}
