use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinary least-squares line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl TrendFit {
    /// Fit a line through `(position, value)` points.
    ///
    /// `r_squared` is `0` when every value is equal.
    ///
    /// # Errors
    /// Returns [`AnalysisError::DegenerateWindow`] for fewer than two points
    /// or when all positions coincide.
    pub fn fit(points: &[(usize, f64)]) -> Result<Self, AnalysisError> {
        let n_points = points.len();
        if n_points < 2 {
            return Err(AnalysisError::DegenerateWindow { n_points });
        }

        let n = n_points as f64;
        let (mut x_sum, mut y_sum, mut xy_sum, mut x2_sum) = (0.0, 0.0, 0.0, 0.0);
        for &(x, y) in points {
            let x = x as f64;
            x_sum += x;
            y_sum += y;
            xy_sum += x * y;
            x2_sum += x * x;
        }

        let denominator = n * x2_sum - x_sum * x_sum;
        if denominator == 0.0 {
            return Err(AnalysisError::DegenerateWindow { n_points });
        }

        let slope = (n * xy_sum - x_sum * y_sum) / denominator;
        let intercept = (y_sum - slope * x_sum) / n;

        let y_mean = y_sum / n;
        let mut total_ss = 0.0;
        let mut residual_ss = 0.0;
        for &(x, y) in points {
            total_ss += (y - y_mean).powi(2);
            residual_ss += (y - (intercept + slope * x as f64)).powi(2);
        }
        let r_squared = if total_ss == 0.0 {
            0.0
        } else {
            1.0 - residual_ss / total_ss
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Value of the line at `position`.
    pub fn predict(&self, position: usize) -> f64 {
        self.intercept + self.slope * position as f64
    }
}

impl fmt::Display for TrendFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "y = {:.4}x + {:.2} (R² = {:.3})",
            self.slope, self.intercept, self.r_squared
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(values: &[f64]) -> Vec<(usize, f64)> {
        values.iter().copied().enumerate().collect()
    }

    #[test]
    fn recovers_exact_line() {
        let values: Vec<f64> = (0..10).map(|x| 3.0 * x as f64 + 2.0).collect();
        let fit = TrendFit::fit(&ranked(&values)).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-12);
        assert!((fit.intercept - 2.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!((fit.predict(20) - 62.0).abs() < 1e-9);
    }

    #[test]
    fn one_point_is_degenerate() {
        assert_eq!(
            TrendFit::fit(&[(0, 4.0)]),
            Err(AnalysisError::DegenerateWindow { n_points: 1 })
        );
        assert_eq!(
            TrendFit::fit(&[]),
            Err(AnalysisError::DegenerateWindow { n_points: 0 })
        );
    }

    #[test]
    fn shared_position_is_degenerate() {
        let points = [(3, 1.0), (3, 2.0), (3, 5.0)];
        assert_eq!(
            TrendFit::fit(&points),
            Err(AnalysisError::DegenerateWindow { n_points: 3 })
        );
    }

    #[test]
    fn flat_values_have_zero_r_squared() {
        let fit = TrendFit::fit(&ranked(&[4.0, 4.0, 4.0, 4.0])).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 4.0);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn noisy_line_has_partial_fit() {
        let fit = TrendFit::fit(&ranked(&[1.0, 3.0, 2.0, 5.0, 4.0])).unwrap();
        assert!((fit.slope - 0.8).abs() < 1e-12);
        assert!((fit.intercept - 1.4).abs() < 1e-12);
        assert!((fit.r_squared - 0.64).abs() < 1e-12);
    }

    #[test]
    fn caption_format() {
        let fit = TrendFit {
            slope: 1.0,
            intercept: 1.0,
            r_squared: 1.0,
        };
        assert_eq!(fit.to_string(), "y = 1.0000x + 1.00 (R² = 1.000)");
    }
}
