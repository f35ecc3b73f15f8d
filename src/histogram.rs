use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Default number of bins requested from [`Histogram::compute`].
pub const DEFAULT_BINS: usize = 20;

/// Largest bin count a histogram view accepts.
pub const MAX_BINS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    /// Inclusive lower edge.
    pub x0: f64,
    /// Exclusive upper edge, inclusive for the last bin.
    pub x1: f64,
    pub count: usize,
}

/// Counts of a sample over bins bounded by round-number thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<Bin>,
}

impl Histogram {
    /// Bin `sample` over `[min, max]` with roughly `n_bins` bins.
    ///
    /// Interior thresholds are the [`nice_ticks`] of the sample's range, so
    /// the actual bin count may differ slightly from `n_bins`.
    ///
    /// # Errors
    /// Returns [`AnalysisError::EmptySample`] if `sample` is empty.
    pub fn compute(sample: &[f64], n_bins: usize) -> Result<Self, AnalysisError> {
        if sample.is_empty() {
            return Err(AnalysisError::EmptySample);
        }
        let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
        let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // A tick equal to `max` would open a zero-width bin; `max` goes to the
        // closed last bin instead.
        let thresholds: Vec<f64> = nice_ticks(min, max, n_bins)
            .into_iter()
            .filter(|&t| t > min && t < max)
            .collect();

        let mut edges = Vec::with_capacity(thresholds.len() + 2);
        edges.push(min);
        edges.extend(thresholds);
        edges.push(max);

        let mut bins: Vec<Bin> = edges
            .windows(2)
            .map(|w| Bin {
                x0: w[0],
                x1: w[1],
                count: 0,
            })
            .collect();

        for &val in sample {
            // Values equal to a threshold belong to the bin that starts there.
            let i_bin = edges[1..edges.len() - 1].partition_point(|&t| t <= val);
            bins[i_bin].count += 1;
        }

        Ok(Self { bins })
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Round-number ticks inside `[start, stop]`, about `count` of them.
///
/// Tick spacing is `1`, `2` or `5` times a power of ten, chosen so the number
/// of intervals is close to `count`.
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi, reverse) = if stop < start {
        (stop, start, true)
    } else {
        (start, stop, false)
    };

    let Some((i1, i2, inc)) = tick_spec(lo, hi, count as f64) else {
        return Vec::new();
    };
    let mut ticks: Vec<f64> = (i1..=i2)
        .map(|i| {
            if inc < 0.0 {
                i as f64 / -inc
            } else {
                i as f64 * inc
            }
        })
        .collect();
    if reverse {
        ticks.reverse();
    }
    ticks
}

/// Integer tick bounds and increment; a negative increment means "divide by".
fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let div = 10f64.powf(-power) / factor;
        i1 = (start * div).round() as i64;
        i2 = (stop * div).round() as i64;
        if (i1 as f64) / div < start {
            i1 += 1;
        }
        if (i2 as f64) / div > stop {
            i2 -= 1;
        }
        inc = -div;
    } else {
        let mul = 10f64.powf(power) * factor;
        i1 = (start / mul).round() as i64;
        i2 = (stop / mul).round() as i64;
        if (i1 as f64) * mul < start {
            i1 += 1;
        }
        if (i2 as f64) * mul > stop {
            i2 -= 1;
        }
        inc = mul;
    }

    if i2 < i1 {
        if (0.5..2.0).contains(&count) {
            return tick_spec(start, stop, count * 2.0);
        }
        return None;
    }
    Some((i1, i2, inc))
}
