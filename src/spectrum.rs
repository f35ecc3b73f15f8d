//! Power spectrum estimation via FFT.
//!
//! Provides the one-sided periodogram of a full series and a short-time
//! variant (spectrogram) built from the same estimator.

use crate::dates::serde_timestamps;
use crate::error::AnalysisError;
use crate::series::Series;
use chrono::NaiveDateTime;
use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};

/// How a bin index is turned into a frequency in cycles per sample.
///
/// `Original` labels bin `i` as `i / N` with the unpadded length `N`, as the
/// dashboard always has. The transform actually runs on the zero-padded
/// length `M`, so `Padded` reports the true bin spacing `i / M` instead.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyScale {
    Padded,
    #[default]
    Original,
}

impl FrequencyScale {
    fn frequency(&self, index: usize, input_len: usize, padded_len: usize) -> f64 {
        match self {
            FrequencyScale::Padded => index as f64 / padded_len as f64,
            FrequencyScale::Original => index as f64 / input_len as f64,
        }
    }
}

/// Taper applied to each spectrogram segment before the transform.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Taper {
    /// Rectangular (no tapering)
    Rect,
    /// Hann window
    #[default]
    Hann,
}

impl Taper {
    /// Weight of sample `n` in a segment of `len` samples.
    pub fn weight(&self, n: usize, len: usize) -> f64 {
        match self {
            Taper::Rect => 1.0,
            Taper::Hann => 0.5 - 0.5 * (2.0 * std::f64::consts::PI * n as f64 / len as f64).cos(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPoint {
    pub frequency_index: usize,
    pub frequency: f64,
    pub power: f64,
}

/// One-sided power spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub input_len: usize,
    pub padded_len: usize,
    pub frequency_scale: FrequencyScale,
    pub points: Vec<SpectrumPoint>,
}

impl Spectrum {
    /// Point with the highest power, skipping the mean (index 0).
    pub fn dominant(&self) -> Option<&SpectrumPoint> {
        self.points
            .iter()
            .skip(1)
            .max_by(|a, b| a.power.total_cmp(&b.power))
    }
}

/// Smallest power of two not below `n` (`1` for `n <= 1`).
pub fn padded_len(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Compute the periodogram of `values`.
///
/// The sequence is zero-padded to [`padded_len`], transformed, and the power
/// `re² + im²` is reported for bins `0..N/2` where `N` is the unpadded length.
///
/// # Errors
/// Returns [`AnalysisError::EmptyInput`] if `values` is empty.
pub fn periodogram(values: &[f64], scale: FrequencyScale) -> Result<Spectrum, AnalysisError> {
    periodogram_with(&mut FftPlanner::new(), values, scale)
}

fn periodogram_with(
    planner: &mut FftPlanner<f64>,
    values: &[f64],
    scale: FrequencyScale,
) -> Result<Spectrum, AnalysisError> {
    let input_len = values.len();
    if input_len == 0 {
        return Err(AnalysisError::EmptyInput);
    }
    let padded_len = padded_len(input_len);

    let mut data: Vec<Complex<f64>> = values
        .iter()
        .map(|&re| Complex { re, im: 0.0 })
        .collect();
    data.resize(padded_len, Complex { re: 0.0, im: 0.0 });

    let fft = planner.plan_fft_forward(padded_len);
    fft.process(&mut data);

    let points = data
        .iter()
        .take(input_len / 2)
        .enumerate()
        .map(|(i, c)| SpectrumPoint {
            frequency_index: i,
            frequency: scale.frequency(i, input_len, padded_len),
            power: c.norm_sqr(),
        })
        .collect();

    Ok(Spectrum {
        input_len,
        padded_len,
        frequency_scale: scale,
        points,
    })
}

/// Power over time: one periodogram column per segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrogram {
    /// First timestamp of every segment.
    #[serde(with = "serde_timestamps")]
    pub dates: Vec<NaiveDateTime>,
    /// Frequency of every row, shared by all columns.
    pub frequencies: Vec<f64>,
    /// `power[column][row]`.
    pub power: Vec<Vec<f64>>,
}

/// Short-time periodogram of a series.
///
/// Segments hold `segment_len` samples and start every `hop` samples; a
/// trailing partial segment is dropped.
///
/// # Errors
/// [`AnalysisError::EmptyInput`] for an empty series and
/// [`AnalysisError::InvalidSegment`] when no full segment fits.
pub fn spectrogram(
    series: &Series,
    segment_len: usize,
    hop: usize,
    taper: Taper,
    scale: FrequencyScale,
) -> Result<Spectrogram, AnalysisError> {
    let len = series.len();
    if len == 0 {
        return Err(AnalysisError::EmptyInput);
    }
    if segment_len < 2 || hop == 0 || len < segment_len {
        return Err(AnalysisError::InvalidSegment {
            segment_len,
            hop,
            len,
        });
    }

    let mut planner = FftPlanner::new();
    let mut dates = Vec::new();
    let mut power = Vec::new();
    let mut frequencies = Vec::new();

    let mut segment = Vec::with_capacity(segment_len);
    for start in (0..=len - segment_len).step_by(hop) {
        segment.clear();
        segment.extend(
            series.values()[start..start + segment_len]
                .iter()
                .enumerate()
                .map(|(i, v)| v * taper.weight(i, segment_len)),
        );

        let column = periodogram_with(&mut planner, &segment, scale)?;
        if frequencies.is_empty() {
            frequencies = column.points.iter().map(|p| p.frequency).collect();
        }
        dates.push(series.dates()[start]);
        power.push(column.points.into_iter().map(|p| p.power).collect());
    }

    log::debug!(
        "computed spectrogram with {} columns of {} rows",
        power.len(),
        frequencies.len()
    );

    Ok(Spectrogram {
        dates,
        frequencies,
        power,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesMeta;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn hourly(values: Vec<f64>) -> Series {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let dates = (0..values.len()).map(|i| t0 + Duration::hours(i as i64)).collect();
        Series::new(dates, values, SeriesMeta::default()).unwrap()
    }

    #[test]
    fn pads_to_next_power_of_two() {
        assert_eq!(padded_len(1), 1);
        assert_eq!(padded_len(5), 8);
        assert_eq!(padded_len(8), 8);
        assert_eq!(padded_len(9), 16);
        assert_eq!(padded_len(1024), 1024);
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(periodogram(&[], FrequencyScale::Padded), Err(AnalysisError::EmptyInput));
    }

    #[test]
    fn length_follows_unpadded_input() {
        let spectrum = periodogram(&[1.0, 2.0, 3.0, 4.0, 5.0], FrequencyScale::Padded).unwrap();
        assert_eq!(spectrum.padded_len, 8);
        assert_eq!(spectrum.points.len(), 2);
        // Bin 0 is the squared sum of the input.
        assert!((spectrum.points[0].power - 225.0).abs() < 1e-9);
        assert_eq!(spectrum.points[1].frequency, 1.0 / 8.0);

        let original = periodogram(&[1.0, 2.0, 3.0, 4.0, 5.0], FrequencyScale::Original).unwrap();
        assert_eq!(original.points[1].frequency, 1.0 / 5.0);
        assert_eq!(original.points[1].power, spectrum.points[1].power);
    }

    #[test]
    fn default_labels_use_unpadded_length() {
        assert_eq!(FrequencyScale::default(), FrequencyScale::Original);
        let spectrum = periodogram(&[1.0, 2.0, 3.0, 4.0, 5.0], FrequencyScale::default()).unwrap();
        assert_eq!(spectrum.padded_len, 8);
        assert_eq!(spectrum.points[1].frequency, 0.2);
    }

    #[test]
    fn single_sample_has_no_bins() {
        let spectrum = periodogram(&[4.0], FrequencyScale::Padded).unwrap();
        assert_eq!(spectrum.padded_len, 1);
        assert!(spectrum.points.is_empty());
        assert!(spectrum.dominant().is_none());
    }

    #[test]
    fn finds_pure_tone() {
        let n = 64;
        let values: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 8.0 * i as f64 / n as f64).sin())
            .collect();
        let spectrum = periodogram(&values, FrequencyScale::Padded).unwrap();
        let peak = spectrum.dominant().unwrap();
        assert_eq!(peak.frequency_index, 8);
        assert!((peak.power - (n as f64 / 2.0).powi(2)).abs() < 1e-6);
    }

    #[test]
    fn spectrogram_columns_follow_hop() {
        let series = hourly((0..20).map(|i| (i % 4) as f64).collect());
        let grid = spectrogram(&series, 8, 4, Taper::Hann, FrequencyScale::Padded).unwrap();
        // Segments start at 0, 4, 8, 12.
        assert_eq!(grid.dates.len(), 4);
        assert_eq!(grid.dates[1], series.dates()[4]);
        assert_eq!(grid.frequencies.len(), 4);
        assert!(grid.power.iter().all(|col| col.len() == 4));
    }

    #[test]
    fn spectrogram_rejects_bad_segments() {
        let series = hourly(vec![1.0; 10]);
        let err = spectrogram(&series, 16, 4, Taper::Rect, FrequencyScale::Padded).unwrap_err();
        assert_eq!(err, AnalysisError::InvalidSegment { segment_len: 16, hop: 4, len: 10 });
        assert!(spectrogram(&series, 4, 0, Taper::Rect, FrequencyScale::Padded).is_err());
        assert!(spectrogram(&series, 1, 1, Taper::Rect, FrequencyScale::Padded).is_err());
    }

    #[test]
    fn hann_taper_vanishes_at_segment_start() {
        assert_eq!(Taper::Hann.weight(0, 16), 0.0);
        assert!((Taper::Hann.weight(8, 16) - 1.0).abs() < 1e-12);
        assert_eq!(Taper::Rect.weight(3, 16), 1.0);
    }

    proptest! {
        #[test]
        fn proptest_spectrum_shape(values in proptest::collection::vec(-1e3f64..1e3, 1..300)) {
            let spectrum = periodogram(&values, FrequencyScale::Padded).unwrap();
            prop_assert_eq!(spectrum.points.len(), values.len() / 2);
            prop_assert!(spectrum.padded_len.is_power_of_two());
            prop_assert!(spectrum.padded_len >= values.len());
            prop_assert!(spectrum.points.iter().all(|p| p.power >= 0.0));
        }
    }
}
