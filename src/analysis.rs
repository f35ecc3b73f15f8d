use crate::config::ChartKind;
use crate::dashboard::{Dashboard, WindowUpdate};
use crate::dates::serde_timestamp;
use crate::error::AnalysisError;
use crate::gauge::{GaugeReading, GaugeScale};
use crate::histogram::Histogram;
use crate::series::{Series, SeriesMeta, SeriesWindow, TimeRange};
use crate::spectrum::{self, FrequencyScale, Spectrogram, Spectrum, SpectrumPoint, Taper};
use crate::stats::DescriptiveStats;
use crate::trend::TrendFit;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Loaded series by name.
pub type Catalog = BTreeMap<String, Series>;

/// Result of one sub-computation of a view.
///
/// A failed sub-computation keeps its reason so the other parts of the view
/// stay usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Ok(T),
    Unavailable { reason: String },
}

impl<T> Outcome<T> {
    pub fn ok(&self) -> Option<&T> {
        match self {
            Outcome::Ok(val) => Some(val),
            Outcome::Unavailable { .. } => None,
        }
    }
}

impl<T> From<Result<T, AnalysisError>> for Outcome<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(val) => Outcome::Ok(val),
            Err(err) => Outcome::Unavailable {
                reason: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedPoint {
    #[serde(with = "serde_timestamp")]
    pub date: NaiveDateTime,
    pub value: f64,
}

/// Trend of a visible window with the fitted line laid over its timestamps.
///
/// Positions are ranks inside the window, so the slope is "per sample" and
/// only reads as "per unit time" when samples are evenly spaced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowTrend {
    pub fit: TrendFit,
    /// Line equation shown beside the chart.
    pub caption: String,
    pub fitted: Vec<FittedPoint>,
}

/// Summary of two windows sharing a time axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairUpdate {
    pub range: TimeRange,
    pub first: WindowUpdate,
    pub second: WindowUpdate,
}

/// Computed content of one dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewReport {
    TimeSeries {
        series: String,
        meta: SeriesMeta,
        dominant: Option<SpectrumPoint>,
        windows: Vec<WindowUpdate>,
    },
    MultiSeries {
        series: [String; 2],
        windows: Vec<PairUpdate>,
    },
    Periodogram {
        series: String,
        spectrum: Outcome<Spectrum>,
    },
    Spectrogram {
        series: String,
        spectrogram: Outcome<Spectrogram>,
    },
    Histogram {
        series: String,
        range: TimeRange,
        histogram: Outcome<Histogram>,
    },
    Gauge {
        series: String,
        range: TimeRange,
        reading: Outcome<GaugeReading>,
    },
}

/// Entry point of the analysis core.
///
/// Holds only settings; every method is a pure function of its arguments.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    frequency_scale: FrequencyScale,
    gauge: GaugeScale,
}

impl Analyzer {
    pub fn new(frequency_scale: FrequencyScale, gauge: GaugeScale) -> Self {
        Self {
            frequency_scale,
            gauge,
        }
    }

    /// Statistics of the visible slice.
    pub fn summarize(&self, window: &SeriesWindow) -> Result<DescriptiveStats, AnalysisError> {
        DescriptiveStats::compute(window.values())
    }

    /// Statistics of two windows, each failing on its own.
    pub fn summarize_pair(
        &self,
        first: &SeriesWindow,
        second: &SeriesWindow,
    ) -> (
        Result<DescriptiveStats, AnalysisError>,
        Result<DescriptiveStats, AnalysisError>,
    ) {
        (self.summarize(first), self.summarize(second))
    }

    /// Linear trend of the visible slice, `None` when it has no usable trend.
    pub fn fit_trend(&self, window: &SeriesWindow) -> Option<WindowTrend> {
        let fit = match TrendFit::fit(&window.ranked_points()) {
            Ok(fit) => fit,
            Err(err) => {
                log::debug!("trend unavailable: {err}");
                return None;
            }
        };
        let fitted = window
            .dates()
            .iter()
            .enumerate()
            .map(|(i, &date)| FittedPoint {
                date,
                value: fit.predict(i),
            })
            .collect();
        Some(WindowTrend {
            caption: fit.to_string(),
            fit,
            fitted,
        })
    }

    /// Periodogram of the whole series, regardless of any window.
    pub fn spectrum(&self, series: &Series) -> Result<Spectrum, AnalysisError> {
        spectrum::periodogram(series.values(), self.frequency_scale)
    }

    pub fn spectrogram(
        &self,
        series: &Series,
        segment_len: usize,
        hop: usize,
        taper: Taper,
    ) -> Result<Spectrogram, AnalysisError> {
        spectrum::spectrogram(series, segment_len, hop, taper, self.frequency_scale)
    }

    pub fn histogram(&self, window: &SeriesWindow, bins: usize) -> Result<Histogram, AnalysisError> {
        Histogram::compute(window.values(), bins)
    }

    pub fn gauge(&self, window: &SeriesWindow) -> Result<GaugeReading, AnalysisError> {
        self.gauge.read(window.values())
    }

    /// Compute a view from the series in `catalog`.
    ///
    /// # Errors
    /// Returns [`AnalysisError::UnknownSeries`] if the view names a series
    /// missing from `catalog`. Failures of the computations themselves are
    /// reported inside the [`ViewReport`].
    pub fn run_view(&self, view: &ChartKind, catalog: &Catalog) -> Result<ViewReport, AnalysisError> {
        let lookup = |name: &str| {
            catalog.get(name).ok_or_else(|| AnalysisError::UnknownSeries {
                name: name.to_string(),
            })
        };

        let report = match view {
            ChartKind::TimeSeries {
                series: name,
                trendline,
                windows,
            } => {
                let series = lookup(name)?;
                let mut dashboard = Dashboard::load(self, series);
                dashboard.set_trendline(*trendline);
                dashboard.subscribe(|update| {
                    log::debug!(
                        "{name}: window {} to {} holds {} points",
                        update.range.lo(),
                        update.range.hi(),
                        update.count
                    );
                    if let Some(stats) = update.stats.ok() {
                        log::debug!("{}", stats.report(name));
                    }
                });

                let updates = if windows.is_empty() {
                    vec![dashboard.reset_window()]
                } else {
                    windows.iter().map(|&range| dashboard.set_window(range)).collect()
                };

                ViewReport::TimeSeries {
                    series: name.clone(),
                    meta: series.meta().clone(),
                    dominant: dashboard.spectrum().ok().and_then(|s| s.dominant().cloned()),
                    windows: updates,
                }
            }
            ChartKind::MultiSeries {
                series: names,
                trendline,
                windows,
            } => {
                let first = lookup(&names[0])?;
                let second = lookup(&names[1])?;

                let ranges = if windows.is_empty() {
                    joint_extent(first, second).into_iter().collect()
                } else {
                    windows.clone()
                };

                let windows = ranges
                    .into_iter()
                    .map(|range| self.compare(first, second, range, *trendline))
                    .collect();

                ViewReport::MultiSeries {
                    series: names.clone(),
                    windows,
                }
            }
            ChartKind::Periodogram { series: name } => ViewReport::Periodogram {
                series: name.clone(),
                spectrum: self.spectrum(lookup(name)?).into(),
            },
            ChartKind::Spectrogram {
                series: name,
                segment_len,
                hop,
                taper,
            } => ViewReport::Spectrogram {
                series: name.clone(),
                spectrogram: self
                    .spectrogram(lookup(name)?, *segment_len, *hop, *taper)
                    .into(),
            },
            ChartKind::Histogram {
                series: name,
                bins,
                window,
            } => {
                let window = window_or_full(lookup(name)?, *window);
                ViewReport::Histogram {
                    series: name.clone(),
                    range: window.range(),
                    histogram: self.histogram(&window, *bins).into(),
                }
            }
            ChartKind::Gauge {
                series: name,
                window,
            } => {
                let window = window_or_full(lookup(name)?, *window);
                ViewReport::Gauge {
                    series: name.clone(),
                    range: window.range(),
                    reading: self.gauge(&window).into(),
                }
            }
        };

        Ok(report)
    }

    fn compare(&self, first: &Series, second: &Series, range: TimeRange, trendline: bool) -> PairUpdate {
        let first = first.window(range);
        let second = second.window(range);
        let (first_stats, second_stats) = self.summarize_pair(&first, &second);

        let update = |window: &SeriesWindow, stats: Result<DescriptiveStats, AnalysisError>| WindowUpdate {
            range,
            count: window.len(),
            stats: stats.into(),
            trend: if trendline { self.fit_trend(window) } else { None },
        };

        PairUpdate {
            range,
            first: update(&first, first_stats),
            second: update(&second, second_stats),
        }
    }
}

fn window_or_full(series: &Series, range: Option<TimeRange>) -> SeriesWindow<'_> {
    match range {
        Some(range) => series.window(range),
        None => series.full_window(),
    }
}

/// Range spanning both series, `None` if both are empty.
fn joint_extent(first: &Series, second: &Series) -> Option<TimeRange> {
    match (first.extent(), second.extent()) {
        (Some(a), Some(b)) => TimeRange::new(a.lo().min(b.lo()), a.hi().max(b.hi())).ok(),
        (a, b) => a.or(b),
    }
}
