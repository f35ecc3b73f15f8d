use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Single-pass accumulator of the mean and the second to fourth central moment sums.
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    m2: f64,
    m3: f64,
    m4: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn add(&mut self, val: f64) {
        let n_prev = self.n_vals as f64;
        self.n_vals += 1;
        let n = self.n_vals as f64;

        let delta = val - self.mean;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term = delta * delta_n * n_prev;

        // Update higher moments first, they depend on the previous lower ones.
        self.m4 += term * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term;
        self.mean += delta_n;

        self.min = self.min.min(val);
        self.max = self.max.max(val);
    }

    pub fn count(&self) -> usize {
        self.n_vals
    }

    pub fn mean(&self) -> f64 {
        if self.n_vals == 0 {
            return f64::NAN;
        }
        self.mean
    }

    /// Sample variance, `0` for a single value.
    pub fn variance(&self) -> f64 {
        match self.n_vals {
            0 => f64::NAN,
            1 => 0.0,
            n => (self.m2 / (n as f64 - 1.0)).max(0.0),
        }
    }

    /// Bias-corrected sample skewness, `NaN` below three values or without spread.
    pub fn skewness(&self) -> f64 {
        let n = self.n_vals as f64;
        if self.n_vals < 3 || self.m2 <= 0.0 {
            return f64::NAN;
        }
        let std_dev = self.variance().sqrt();
        n * self.m3 / ((n - 1.0) * (n - 2.0) * std_dev.powi(3))
    }

    /// Sample excess kurtosis, `NaN` below four values or without spread.
    pub fn kurtosis(&self) -> f64 {
        let n = self.n_vals as f64;
        if self.n_vals < 4 || self.m2 <= 0.0 {
            return f64::NAN;
        }
        (n - 1.0) / ((n - 2.0) * (n - 3.0))
            * (n * (n + 1.0) * self.m4 / (self.m2 * self.m2) - 3.0 * (n - 1.0))
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary statistics of a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl DescriptiveStats {
    /// Compute the statistics of `sample`.
    ///
    /// # Errors
    /// Returns [`AnalysisError::EmptySample`] if `sample` is empty.
    pub fn compute(sample: &[f64]) -> Result<Self, AnalysisError> {
        if sample.is_empty() {
            return Err(AnalysisError::EmptySample);
        }

        let mut acc = Accumulator::new();
        for &val in sample {
            acc.add(val);
        }

        let mut sorted = sample.to_vec();
        sorted.sort_by(f64::total_cmp);

        let variance = acc.variance();
        Ok(Self {
            count: acc.count(),
            min: acc.min,
            max: acc.max,
            mean: acc.mean(),
            median: quantile_sorted(&sorted, 0.5),
            q1: quantile_sorted(&sorted, 0.25),
            q3: quantile_sorted(&sorted, 0.75),
            variance,
            std_dev: variance.sqrt(),
            skewness: acc.skewness(),
            kurtosis: acc.kurtosis(),
        })
    }

    /// Format as a multi-line report, two decimals like the summary panel.
    pub fn report(&self, label: &str) -> String {
        format!(
            "{label}:\n  Min: {:.2}\n  Q1(25%): {:.2}\n  Median(50%): {:.2}\n  Mean: {:.2}\n  Q3(75%): {:.2}\n  Max: {:.2}\n  Std Dev: {:.2}\n  Variance: {:.2}\n  Skewness: {:.2}\n  Kurtosis: {:.2}\n",
            self.min,
            self.q1,
            self.median,
            self.mean,
            self.q3,
            self.max,
            self.std_dev,
            self.variance,
            self.skewness,
            self.kurtosis
        )
    }
}

/// Quantile of an ascending sample by linear interpolation between order statistics.
///
/// Uses `h = (n - 1) * p` and interpolates between `sorted[floor(h)]` and
/// `sorted[ceil(h)]`. Returns `NaN` for an empty sample.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n_vals = sorted.len();
    if n_vals == 0 {
        return f64::NAN;
    }
    let h = (n_vals - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi || sorted[lo] == sorted[hi] {
        return sorted[lo];
    }
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
